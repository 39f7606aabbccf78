//! Stride selection for the ground rasterizer
//!
//! Quality and performance rendering are the same projection; they differ only
//! in how many rows and columns get a fresh texel fetch.

use crate::consts::{FAR_BAND_RATIO, MID_BAND_RATIO};
use crate::settings::{GroundSettings, MotionState, RenderMode};

/// Depth band of a screen row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBand {
    /// Top rows, farthest ground
    Far,
    Mid,
    /// Bottom rows, closest ground
    Near,
}

/// Row thresholds splitting the ground into depth bands
#[derive(Debug, Clone, Copy)]
pub struct BandThresholds {
    far: f32,
    mid: f32,
}

impl BandThresholds {
    pub fn new(ground_h: usize) -> Self {
        let h = ground_h as f32;
        Self {
            far: h * FAR_BAND_RATIO,
            mid: h * (FAR_BAND_RATIO + MID_BAND_RATIO),
        }
    }

    /// Band for row `y` (compared as `y + 1`)
    #[inline]
    pub fn band(&self, y: usize) -> DepthBand {
        let i = y as f32 + 1.0;
        if i <= self.far {
            DepthBand::Far
        } else if i <= self.mid {
            DepthBand::Mid
        } else {
            DepthBand::Near
        }
    }
}

/// How densely the rasterizer samples the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingPolicy {
    /// One fetch per pixel
    Quality,
    /// Strided fetches; skipped rows reuse the last computed row
    Performance {
        base_resolution: u32,
        /// Per-band strides (dynamic and layered resolution both on)
        layered: bool,
        motion: MotionState,
    },
}

impl SamplingPolicy {
    pub fn from_settings(settings: &GroundSettings, motion: MotionState) -> Self {
        match settings.mode {
            RenderMode::Quality => SamplingPolicy::Quality,
            RenderMode::Performance => SamplingPolicy::Performance {
                base_resolution: settings.base_resolution,
                layered: settings.layered_active(),
                motion,
            },
        }
    }

    /// Fixed-stride performance policy
    pub fn fixed(base_resolution: u32) -> Self {
        SamplingPolicy::Performance {
            base_resolution,
            layered: false,
            motion: MotionState::default(),
        }
    }

    /// Stride for a row in `band`, never below 1
    pub fn step(&self, band: DepthBand) -> usize {
        let step = match *self {
            SamplingPolicy::Quality => 1,
            SamplingPolicy::Performance {
                base_resolution,
                layered: false,
                ..
            } => base_resolution,
            SamplingPolicy::Performance {
                layered: true,
                motion,
                ..
            } => {
                let rotating = motion.effective_rotating();
                match band {
                    DepthBand::Far => {
                        if rotating {
                            5
                        } else {
                            4
                        }
                    }
                    DepthBand::Mid => {
                        if rotating {
                            5
                        } else if motion.moving {
                            4
                        } else {
                            2
                        }
                    }
                    DepthBand::Near => {
                        if rotating {
                            8
                        } else if motion.moving {
                            6
                        } else {
                            2
                        }
                    }
                }
            }
        };
        step.max(1) as usize
    }
}
