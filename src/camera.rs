//! Camera and player poses, and the derived ground projection
//!
//! The host integrates camera movement; this module only turns a pose into
//! the values the rasterizer and visibility pass consume.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Camera state supplied by the host each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World position (map units)
    pub pos: Vec2,
    /// Height above the ground plane
    pub height: f32,
    /// Heading (radians, 0 = +x)
    pub angle: f32,
    /// Full horizontal field of view (radians)
    pub fov: f32,
    /// Screen height times focal length; scales row depth
    pub focal_factor: f32,
    /// Visibility cutoff distance (map units)
    pub render_distance: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            height: 0.0,
            angle: 0.0,
            fov: std::f32::consts::FRAC_PI_2,
            focal_factor: 1.0,
            render_distance: 1.0,
        }
    }
}

impl CameraPose {
    /// Unit forward vector
    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Ground projection for this pose
    pub fn projection(&self) -> GroundProjection {
        GroundProjection::new(
            self.pos.x,
            self.pos.y,
            self.angle.cos(),
            self.angle.sin(),
            self.focal_factor,
            (self.fov / 2.0).tan(),
        )
    }
}

/// Player state used by occlusion tagging and collision
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    pub pos: Vec2,
    /// Height above ground; obstacles at or below it are flown over
    pub height: f32,
    pub radius: f32,
}

/// Precomputed camera terms for the ground rasterizer
///
/// Hosts that already carry `cos`/`sin` of the heading (the flat surface)
/// build this directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProjection {
    pub origin: Vec2,
    pub cos_a: f32,
    pub sin_a: f32,
    pub focal_factor: f32,
    pub tan_half_fov: f32,
}

/// World-space endpoints of one scanline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanline {
    pub left: Vec2,
    pub right: Vec2,
}

impl GroundProjection {
    pub fn new(
        cam_x: f32,
        cam_y: f32,
        cos_a: f32,
        sin_a: f32,
        focal_factor: f32,
        tan_half_fov: f32,
    ) -> Self {
        Self {
            origin: Vec2::new(cam_x, cam_y),
            cos_a,
            sin_a,
            focal_factor,
            tan_half_fov,
        }
    }

    /// Endpoints of screen row `y`
    ///
    /// Depth falls off as `focal_factor / (y + 1)`, which produces the fan.
    #[inline]
    pub fn scanline(&self, y: usize) -> Scanline {
        let i = y as f32 + 1.0;
        let dist = self.focal_factor / i;
        let lat = dist * self.tan_half_fov;

        let dist_cos = dist * self.cos_a;
        let dist_sin = dist * self.sin_a;
        let lat_sin = lat * self.sin_a;
        let lat_cos = lat * self.cos_a;

        Scanline {
            left: Vec2::new(
                self.origin.x + dist_cos - lat_sin,
                self.origin.y + dist_sin + lat_cos,
            ),
            right: Vec2::new(
                self.origin.x + dist_cos + lat_sin,
                self.origin.y + dist_sin - lat_cos,
            ),
        }
    }
}

impl From<&CameraPose> for GroundProjection {
    fn from(pose: &CameraPose) -> Self {
        pose.projection()
    }
}
