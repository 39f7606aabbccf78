//! Player vs obstacle collision on a wrap-around map
//!
//! Obstacles are circles; the player is a circle that can fly over anything
//! no taller than itself.

use glam::Vec2;

use super::obstacle::{Obstacle, ObstacleStore};
use crate::camera::PlayerPose;
use crate::toroidal_delta;

/// Shortest wrap-aware offset from `from` to `to`
#[inline]
pub fn toroidal_offset(from: Vec2, to: Vec2, map_size: Vec2) -> Vec2 {
    Vec2::new(
        toroidal_delta(to.x - from.x, map_size.x),
        toroidal_delta(to.y - from.y, map_size.y),
    )
}

/// First obstacle the player would overlap at `proposed`
///
/// The player's current position does not matter; only the destination is
/// tested.
pub fn first_collision<'a>(
    store: &'a ObstacleStore,
    player: &PlayerPose,
    proposed: Vec2,
    map_size: Vec2,
) -> Option<&'a Obstacle> {
    store.iter().find(|obs| {
        if player.height >= obs.height {
            return false;
        }
        let offset = toroidal_offset(obs.pos, proposed, map_size);
        let reach = obs.radius + player.radius;
        offset.length_squared() < reach * reach
    })
}

/// Whether moving the player to `proposed` hits any obstacle
pub fn check_collision(
    store: &ObstacleStore,
    player: &PlayerPose,
    proposed: Vec2,
    map_size: Vec2,
) -> bool {
    first_collision(store, player, proposed, map_size).is_some()
}
