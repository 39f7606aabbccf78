//! Browser host bindings
//!
//! Flat-buffer surface for the JS game loop. Validation failures are logged
//! and treated as a no-op; nothing here throws into JS.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::camera::{CameraPose, GroundProjection, PlayerPose};
use crate::frame::FrameCore;
use crate::ground::{SamplingPolicy, render_performance, render_quality};
use crate::settings::{GroundSettings, MotionState};
use crate::world::ViewQuery;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Mode-7 core loaded");
}

/// Module health probe; always 42
#[wasm_bindgen]
pub fn self_test() -> i32 {
    42
}

/// One game session: obstacle registry plus per-frame passes
#[wasm_bindgen]
pub struct GameCore {
    inner: FrameCore,
    last_dropped: usize,
}

impl Default for GameCore {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GameCore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: FrameCore::new(GroundSettings::load()),
            last_dropped: 0,
        }
    }

    #[wasm_bindgen(js_name = resetObstacles)]
    pub fn reset_obstacles(&mut self) {
        self.inner.reset_obstacles();
        self.last_dropped = 0;
    }

    /// Append `count` records of `(x, y, radius, height, id, type)`
    ///
    /// Returns how many were stored; see `lastDroppedCount` for the rest.
    #[wasm_bindgen(js_name = appendObstacleBatch)]
    pub fn append_obstacle_batch(&mut self, data: &[f32], count: usize) -> usize {
        let report = self.inner.append_obstacle_batch(data, count);
        self.last_dropped = report.dropped();
        report.accepted
    }

    #[wasm_bindgen(js_name = lastDroppedCount)]
    pub fn last_dropped_count(&self) -> usize {
        self.last_dropped
    }

    #[wasm_bindgen(js_name = obstacleCount)]
    pub fn obstacle_count(&self) -> usize {
        self.inner.obstacle_count()
    }

    #[wasm_bindgen(js_name = renderGroundQuality)]
    #[allow(clippy::too_many_arguments)]
    pub fn render_ground_quality(
        &self,
        ground_pixels: &mut [u8],
        map_data: &[u8],
        ground_w: usize,
        ground_h: usize,
        map_w: usize,
        map_h: usize,
        camera_x: f32,
        camera_y: f32,
        cos_a: f32,
        sin_a: f32,
        focal_factor: f32,
        tan_half_fov: f32,
    ) {
        let projection =
            GroundProjection::new(camera_x, camera_y, cos_a, sin_a, focal_factor, tan_half_fov);
        if let Err(e) = render_quality(
            ground_pixels,
            map_data,
            ground_w,
            ground_h,
            map_w,
            map_h,
            &projection,
        ) {
            log::warn!("Ground render skipped: {}", e);
        }
    }

    #[wasm_bindgen(js_name = renderGroundPerformance)]
    #[allow(clippy::too_many_arguments)]
    pub fn render_ground_performance(
        &self,
        ground_pixels: &mut [u8],
        map_data: &[u8],
        ground_w: usize,
        ground_h: usize,
        map_w: usize,
        map_h: usize,
        camera_x: f32,
        camera_y: f32,
        cos_a: f32,
        sin_a: f32,
        focal_factor: f32,
        tan_half_fov: f32,
        base_res: i32,
        dynamic_res: bool,
        layered_res: bool,
        moving: bool,
        rotating: bool,
        tilt: f32,
    ) {
        let projection =
            GroundProjection::new(camera_x, camera_y, cos_a, sin_a, focal_factor, tan_half_fov);
        let policy = SamplingPolicy::Performance {
            base_resolution: base_res.max(1) as u32,
            layered: dynamic_res && layered_res,
            motion: MotionState {
                moving,
                rotating,
                tilt,
            },
        };
        if let Err(e) = render_performance(
            ground_pixels,
            map_data,
            ground_w,
            ground_h,
            map_w,
            map_h,
            &projection,
            &policy,
        ) {
            log::warn!("Ground render skipped: {}", e);
        }
    }

    /// Visible obstacles far to near, written as stride-6 records
    ///
    /// Returns the number of records written.
    #[wasm_bindgen(js_name = processVisibleObstacles)]
    #[allow(clippy::too_many_arguments)]
    pub fn process_visible_obstacles(
        &mut self,
        camera_x: f32,
        camera_y: f32,
        camera_z: f32,
        camera_angle: f32,
        player_x: f32,
        player_y: f32,
        player_height: f32,
        fov: f32,
        max_render_distance: f32,
        map_width: f32,
        map_height: f32,
        output: &mut [f32],
    ) -> usize {
        let query = ViewQuery {
            camera: CameraPose {
                pos: Vec2::new(camera_x, camera_y),
                height: camera_z,
                angle: camera_angle,
                fov,
                render_distance: max_render_distance,
                ..Default::default()
            },
            player: PlayerPose {
                pos: Vec2::new(player_x, player_y),
                height: player_height,
                radius: 0.0,
            },
            map_size: Vec2::new(map_width, map_height),
        };
        self.inner.process_visible_into(&query, output)
    }

    /// Whether the last visibility pass ran out of scratch space
    #[wasm_bindgen(js_name = visibilityTruncated)]
    pub fn visibility_truncated(&self) -> bool {
        self.inner.last_visibility_truncated()
    }

    #[wasm_bindgen(js_name = checkCollision)]
    #[allow(clippy::too_many_arguments)]
    pub fn check_collision(
        &self,
        player_x: f32,
        player_y: f32,
        player_radius: f32,
        player_height: f32,
        new_x: f32,
        new_y: f32,
        map_width: f32,
        map_height: f32,
    ) -> bool {
        let player = PlayerPose {
            pos: Vec2::new(player_x, player_y),
            height: player_height,
            radius: player_radius,
        };
        self.inner.check_collision(
            &player,
            Vec2::new(new_x, new_y),
            Vec2::new(map_width, map_height),
        )
    }

    /// Current ground settings as JSON
    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> String {
        serde_json::to_string(&self.inner.settings).unwrap_or_default()
    }

    /// Replace ground settings from JSON and persist them
    #[wasm_bindgen(js_name = setSettingsJson)]
    pub fn set_settings_json(&mut self, json: &str) {
        self.inner.settings = GroundSettings::from_json(json);
        self.inner.settings.save();
    }
}
