//! Per-session context owning the obstacle registry and visibility scratch
//!
//! Hosts create one `FrameCore`, fill it at level start, and call into it once
//! per frame. Borrow rules keep registry writes and reads from overlapping.

use glam::Vec2;

use crate::camera::{GroundProjection, PlayerPose};
use crate::ground::{GroundTarget, MapTexture, SamplingPolicy, rasterize};
use crate::settings::{GroundSettings, MotionState};
use crate::world::{
    BatchReport, Obstacle, ObstacleStore, ViewQuery, VisibilityProcessor, VisibleSet,
    first_collision, write_records,
};

/// Obstacle registry, visibility scratch and ground settings
#[derive(Debug, Clone, Default)]
pub struct FrameCore {
    obstacles: ObstacleStore,
    visibility: VisibilityProcessor,
    pub settings: GroundSettings,
}

impl FrameCore {
    pub fn new(settings: GroundSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Core with explicit registry and scratch capacities
    pub fn with_capacities(max_obstacles: usize, max_visible: usize) -> Self {
        Self {
            obstacles: ObstacleStore::with_capacity(max_obstacles),
            visibility: VisibilityProcessor::with_capacity(max_visible),
            settings: GroundSettings::default(),
        }
    }

    // === Obstacle registry ===

    pub fn reset_obstacles(&mut self) {
        self.obstacles.reset();
        log::debug!("Obstacle registry reset");
    }

    /// Append flat `(x, y, radius, height, id, type)` records
    pub fn append_obstacle_batch(&mut self, data: &[f32], count: usize) -> BatchReport {
        let report = self.obstacles.append_batch(data, count);
        log::debug!(
            "Appended {}/{} obstacles ({} total)",
            report.accepted,
            report.requested,
            self.obstacles.len()
        );
        report
    }

    pub fn push_obstacle(&mut self, obstacle: Obstacle) -> bool {
        self.obstacles.push(obstacle)
    }

    #[inline]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn obstacles(&self) -> &ObstacleStore {
        &self.obstacles
    }

    // === Ground ===

    /// Render with the policy implied by the current settings
    pub fn render_ground(
        &self,
        target: &mut GroundTarget<'_>,
        map: &MapTexture<'_>,
        projection: &GroundProjection,
        motion: MotionState,
    ) {
        let policy = SamplingPolicy::from_settings(&self.settings, motion);
        rasterize(target, map, projection, &policy);
    }

    // === Visibility ===

    /// Visible obstacle copies for this view, far to near
    pub fn process_visible(&mut self, query: &ViewQuery) -> VisibleSet<'_> {
        self.visibility.process(&self.obstacles, query)
    }

    /// Run the visibility pass and write flat records into `out`
    ///
    /// Returns the number of records written; an empty `out` writes nothing
    /// and leaves an empty, untruncated last pass.
    pub fn process_visible_into(&mut self, query: &ViewQuery, out: &mut [f32]) -> usize {
        if out.is_empty() {
            log::warn!("Visible output buffer missing");
            self.visibility.clear();
            return 0;
        }
        let set = self.visibility.process(&self.obstacles, query);
        write_records(set.records, out)
    }

    /// Whether the last visibility pass hit the scratch capacity
    pub fn last_visibility_truncated(&self) -> bool {
        self.visibility.last().truncated
    }

    // === Collision ===

    pub fn check_collision(&self, player: &PlayerPose, proposed: Vec2, map_size: Vec2) -> bool {
        self.first_collision(player, proposed, map_size).is_some()
    }

    pub fn first_collision(
        &self,
        player: &PlayerPose,
        proposed: Vec2,
        map_size: Vec2,
    ) -> Option<&Obstacle> {
        first_collision(&self.obstacles, player, proposed, map_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraPose;
    use crate::settings::QualityPreset;
    use std::f32::consts::FRAC_PI_2;

    fn level() -> Vec<f32> {
        vec![
            // x, y, radius, height, id, type
            520.0, 500.0, 2.0, 6.0, 1.0, 0.0, //
            540.0, 500.0, 2.0, 6.0, 2.0, 1.0, //
            460.0, 500.0, 2.0, 6.0, 3.0, 0.0, //
        ]
    }

    fn view() -> ViewQuery {
        ViewQuery {
            camera: CameraPose {
                pos: Vec2::splat(500.0),
                angle: 0.0,
                fov: FRAC_PI_2,
                render_distance: 100.0,
                ..Default::default()
            },
            player: PlayerPose {
                pos: Vec2::new(530.0, 500.0),
                height: 1.0,
                radius: 2.0,
            },
            map_size: Vec2::splat(1000.0),
        }
    }

    #[test]
    fn test_frame_flow() {
        let mut core = FrameCore::new(GroundSettings::default());
        let report = core.append_obstacle_batch(&level(), 3);
        assert_eq!(report.accepted, 3);
        assert_eq!(core.obstacle_count(), 3);

        let mut out = vec![0.0f32; 6 * 8];
        let n = core.process_visible_into(&view(), &mut out);
        assert_eq!(n, 2);
        // Farthest first; the obstacle behind the camera is culled
        assert_eq!(out[0], 2.0);
        assert_eq!(out[4], 0.0);
        assert_eq!(out[6], 1.0);
        assert_eq!(out[10], 1.0);
        assert!(!core.last_visibility_truncated());

        let player = view().player;
        assert!(core.check_collision(&player, Vec2::new(521.0, 500.0), view().map_size));
        assert!(!core.check_collision(&player, Vec2::new(530.0, 500.0), view().map_size));

        core.reset_obstacles();
        assert_eq!(core.process_visible_into(&view(), &mut out), 0);
        assert!(!core.check_collision(&player, Vec2::new(521.0, 500.0), view().map_size));
    }

    #[test]
    fn test_missing_output_buffer_is_noop() {
        let mut core = FrameCore::default();
        core.append_obstacle_batch(&level(), 3);
        assert_eq!(core.process_visible_into(&view(), &mut []), 0);
    }

    #[test]
    fn test_missing_output_buffer_clears_truncation() {
        let mut core = FrameCore::with_capacities(16, 1);
        core.append_obstacle_batch(&level(), 3);
        let mut out = vec![0.0f32; 6 * 4];
        assert_eq!(core.process_visible_into(&view(), &mut out), 1);
        assert!(core.last_visibility_truncated());

        assert_eq!(core.process_visible_into(&view(), &mut []), 0);
        assert!(!core.last_visibility_truncated());
    }

    #[test]
    fn test_registry_capacity_reported() {
        let mut core = FrameCore::with_capacities(2, 16);
        let report = core.append_obstacle_batch(&level(), 3);
        assert_eq!(report.requested, 3);
        assert_eq!(report.accepted, 2);
        assert!(report.truncated());
        assert!(!core.push_obstacle(Obstacle::new(9, Vec2::ZERO, 1.0, 1.0, 0)));
    }

    #[test]
    fn test_render_ground_follows_settings() {
        let map: Vec<u8> = (0..64u8).flat_map(|i| [i, 255 - i, i / 2, 0]).collect();
        let texture = MapTexture::new(&map, 8, 8).unwrap();
        let projection = GroundProjection::new(1.0, 2.0, 0.8, 0.6, 90.0, 0.8);
        let (w, h) = (24, 16);

        let mut core = FrameCore::new(GroundSettings::from_preset(QualityPreset::High));
        let mut via_core = vec![0u8; w * h * 4];
        let mut target = GroundTarget::new(&mut via_core, w, h).unwrap();
        core.render_ground(&mut target, &texture, &projection, MotionState::default());

        let mut direct = vec![0u8; w * h * 4];
        crate::ground::render_quality(&mut direct, &map, w, h, 8, 8, &projection).unwrap();
        assert_eq!(via_core, direct);

        core.settings.apply_preset(QualityPreset::Low);
        let mut target = GroundTarget::new(&mut via_core, w, h).unwrap();
        core.render_ground(&mut target, &texture, &projection, MotionState::default());
        // Still camera with layered strides: row 1 is off its stride and repeats row 0
        assert_eq!(via_core[..w * 4], via_core[w * 4..w * 8]);
    }
}
