//! Mode-7 Core - per-frame compute for a pseudo-3D driving game
//!
//! Core modules:
//! - `ground`: Perspective ground rasterizer (quality and performance modes)
//! - `world`: Obstacle registry, toroidal visibility sort, collision test
//! - `frame`: `FrameCore` context object owning the registry and scratch buffers
//! - `settings`: Ground render configuration and quality presets
//! - `wasm`: Browser host bindings (wasm32 only)

pub mod camera;
pub mod error;
pub mod frame;
pub mod ground;
pub mod settings;
pub mod world;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use camera::{CameraPose, GroundProjection, PlayerPose};
pub use error::{CoreError, CoreResult};
pub use frame::FrameCore;
pub use settings::{GroundSettings, MotionState, QualityPreset, RenderMode};

/// Core configuration constants
pub mod consts {
    /// Default obstacle registry capacity
    pub const MAX_OBSTACLES: usize = 10_000;
    /// Default visibility scratch capacity (all wrap tiles of a dense map)
    pub const MAX_PROCESSED: usize = 20_000;

    /// Floats per obstacle record in a batch: x, y, radius, height, id, type
    pub const OBSTACLE_STRIDE: usize = 6;
    /// Floats per visible record: id, dx, dy, dist_sq, is_between, type
    pub const VISIBLE_STRIDE: usize = 6;
    /// Bytes per RGBA8 pixel
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Angular slack added to the half FOV before culling (radians)
    pub const FOV_SLACK: f32 = 0.5;
    /// Search radius multiplier applied to the render distance for wrap tiles
    pub const SEARCH_RADIUS_SCALE: f32 = 1.2;
    /// Minimum forward distance along the view axis to be drawn
    pub const NEAR_PLANE: f32 = 0.5;

    /// Tilt magnitude above which the camera counts as rotating
    pub const TILT_EPSILON: f32 = 0.0001;
    /// Fraction of ground rows in the far band
    pub const FAR_BAND_RATIO: f32 = 0.1;
    /// Fraction of ground rows in the mid band
    pub const MID_BAND_RATIO: f32 = 0.5;
}

/// Normalized angle to [-π, π)
///
/// One `rem_euclid` regardless of magnitude; large inputs keep only the
/// precision their f32 value carries.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Absolute angular distance between two headings, in [0, π]
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Wrap an integer texel coordinate into [0, modulus)
///
/// `modulus` must be positive.
#[inline]
pub fn wrap_coord(value: i32, modulus: i32) -> i32 {
    let r = value % modulus;
    if r < 0 { r + modulus } else { r }
}

/// Shortest toroidal offset along one axis
///
/// Applies a single correction of `size` when `delta` lies beyond half the
/// map. Inputs already within one map width of each other land in
/// [-size/2, size/2].
#[inline]
pub fn toroidal_delta(delta: f32, size: f32) -> f32 {
    let half = size / 2.0;
    if delta > half {
        delta - size
    } else if delta < -half {
        delta + size
    } else {
        delta
    }
}
