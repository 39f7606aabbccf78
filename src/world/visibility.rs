//! Toroidal visibility pass and painter's-order sort
//!
//! Every obstacle is replicated over the wrap tiles that can fall inside the
//! render distance, then culled by distance, view angle and the near plane.
//! Survivors are sorted far to near so the host can draw sprites without a
//! depth buffer.

use glam::Vec2;

use super::obstacle::ObstacleStore;
use crate::camera::{CameraPose, PlayerPose};
use crate::consts::{FOV_SLACK, MAX_PROCESSED, NEAR_PLANE, SEARCH_RADIUS_SCALE, VISIBLE_STRIDE};
use crate::{angle_between, normalize_angle, toroidal_delta};

/// One visible obstacle copy, relative to the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleObstacle {
    pub obstacle_id: i32,
    /// Offset from camera to this wrap copy
    pub dx: f32,
    pub dy: f32,
    /// Always `dx * dx + dy * dy`
    pub dist_sq: f32,
    /// Tall enough and between camera and player along the view axis
    pub is_between: bool,
    pub kind: i32,
    /// Scan position, used to keep equal distances in scan order
    order: u32,
}

impl VisibleObstacle {
    /// Flat host layout: id, dx, dy, dist_sq, is_between (0/1), type
    #[inline]
    pub fn to_flat(&self) -> [f32; VISIBLE_STRIDE] {
        [
            self.obstacle_id as f32,
            self.dx,
            self.dy,
            self.dist_sq,
            if self.is_between { 1.0 } else { 0.0 },
            self.kind as f32,
        ]
    }
}

/// Inputs for one visibility pass
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery {
    /// Position, heading, fov and render distance are used
    pub camera: CameraPose,
    pub player: PlayerPose,
    /// Map width and height (world units)
    pub map_size: Vec2,
}

/// Sorted result of a visibility pass
#[derive(Debug, Clone, Copy)]
pub struct VisibleSet<'a> {
    /// Far to near
    pub records: &'a [VisibleObstacle],
    /// The scratch buffer filled up and scanning stopped early
    pub truncated: bool,
}

impl VisibleSet<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reusable visibility scratch buffer
#[derive(Debug, Clone)]
pub struct VisibilityProcessor {
    records: Vec<VisibleObstacle>,
    capacity: usize,
    truncated: bool,
}

impl Default for VisibilityProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityProcessor {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PROCESSED)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget the last pass
    pub fn clear(&mut self) {
        self.records.clear();
        self.truncated = false;
    }

    /// Result of the last pass
    pub fn last(&self) -> VisibleSet<'_> {
        VisibleSet {
            records: &self.records,
            truncated: self.truncated,
        }
    }

    /// Cull, replicate and sort the store's obstacles for this view
    pub fn process(&mut self, store: &ObstacleStore, query: &ViewQuery) -> VisibleSet<'_> {
        self.clear();

        let map = query.map_size;
        if store.is_empty() {
            log::debug!("Visibility pass skipped: no obstacles registered");
            return self.last();
        }
        if !(map.x > 0.0 && map.y > 0.0 && map.is_finite()) {
            log::warn!("Visibility pass skipped: bad map size {:?}", map);
            return self.last();
        }

        let camera = &query.camera;
        let cam = camera.pos;
        // Reduced once so every candidate needs at most one correction
        let heading = normalize_angle(camera.angle);
        let (sin_a, cos_a) = heading.sin_cos();
        let render_dist_sq = camera.render_distance * camera.render_distance;
        let max_angle = camera.fov / 2.0 + FOV_SLACK;

        // Player depth along the view axis, via the shortest wrap path
        let player_dx = toroidal_delta(query.player.pos.x - cam.x, map.x);
        let player_dy = toroidal_delta(query.player.pos.y - cam.y, map.y);
        let player_t = player_dx * cos_a + player_dy * sin_a;

        let search_radius = camera.render_distance * SEARCH_RADIUS_SCALE;
        let tiles_x = (search_radius / map.x).ceil() as i32;
        let tiles_y = (search_radius / map.y).ceil() as i32;

        let mut order = 0u32;
        'scan: for obs in store {
            for tx in -tiles_x..=tiles_x {
                for ty in -tiles_y..=tiles_y {
                    let dx = (obs.pos.x + tx as f32 * map.x) - cam.x;
                    let dy = (obs.pos.y + ty as f32 * map.y) - cam.y;
                    let dist_sq = dx * dx + dy * dy;
                    if dist_sq >= render_dist_sq {
                        continue;
                    }

                    if angle_between(dy.atan2(dx), heading) > max_angle {
                        continue;
                    }

                    let t = dx * cos_a + dy * sin_a;
                    if t <= NEAR_PLANE {
                        continue;
                    }

                    if self.records.len() >= self.capacity {
                        self.truncated = true;
                        break 'scan;
                    }

                    self.records.push(VisibleObstacle {
                        obstacle_id: obs.id,
                        dx,
                        dy,
                        dist_sq,
                        is_between: query.player.height < obs.height && t < player_t,
                        kind: obs.kind,
                        order,
                    });
                    order += 1;
                }
            }
        }

        if self.truncated {
            log::warn!(
                "Visibility scratch full ({}): remaining candidates skipped",
                self.capacity
            );
        }

        // Far to near; scan order breaks ties
        self.records.sort_unstable_by(|a, b| {
            b.dist_sq
                .total_cmp(&a.dist_sq)
                .then(a.order.cmp(&b.order))
        });

        self.last()
    }
}

/// Write records into a flat stride-6 host buffer
///
/// Returns the number of records written, limited by the buffer size.
pub fn write_records(records: &[VisibleObstacle], out: &mut [f32]) -> usize {
    let fits = out.len() / VISIBLE_STRIDE;
    if fits < records.len() {
        log::warn!(
            "Visible output buffer holds {} of {} records",
            fits,
            records.len()
        );
    }
    let mut written = 0;
    for (record, slot) in records.iter().zip(out.chunks_exact_mut(VISIBLE_STRIDE)) {
        slot.copy_from_slice(&record.to_flat());
        written += 1;
    }
    written
}
