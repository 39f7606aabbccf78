//! Ground render settings and per-frame motion state
//!
//! Settings are persisted in LocalStorage on the web; motion state comes from
//! the host every frame.

use serde::{Deserialize, Serialize};

use crate::consts::TILT_EPSILON;

/// Which rasterizer configuration to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// Every pixel sampled
    Quality,
    /// Strided sampling with row reuse
    #[default]
    Performance,
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Rasterizer mode for this preset
    pub fn render_mode(&self) -> RenderMode {
        match self {
            QualityPreset::Low | QualityPreset::Medium => RenderMode::Performance,
            QualityPreset::High => RenderMode::Quality,
        }
    }

    /// Fixed stride used when layered resolution is off
    pub fn base_resolution(&self) -> u32 {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 2,
            QualityPreset::High => 1,
        }
    }

    /// Whether motion-driven band strides are enabled
    pub fn dynamic_resolution(&self) -> bool {
        match self {
            QualityPreset::Low => true,
            QualityPreset::Medium => true,
            QualityPreset::High => false,
        }
    }
}

/// Ground rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundSettings {
    /// Preset the other fields were last derived from
    pub preset: QualityPreset,
    /// Quality or performance rasterizer
    pub mode: RenderMode,
    /// Stride when band strides are not in effect
    pub base_resolution: u32,
    /// Adapt stride to camera motion
    pub dynamic_resolution: bool,
    /// Use per-depth-band strides (needs `dynamic_resolution`)
    pub layered_resolution: bool,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self::from_preset(QualityPreset::Medium)
    }
}

impl GroundSettings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mode7_ground_settings";

    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self {
            preset,
            mode: RenderMode::Performance,
            base_resolution: 1,
            dynamic_resolution: false,
            layered_resolution: true,
        };
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates preset-dependent fields)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.preset = preset;
        self.mode = preset.render_mode();
        self.base_resolution = preset.base_resolution();
        self.dynamic_resolution = preset.dynamic_resolution();
    }

    /// Band strides are only used when both flags are set
    pub fn layered_active(&self) -> bool {
        self.dynamic_resolution && self.layered_resolution
    }

    /// Parse settings from JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed ground settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded ground settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default ground settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Ground settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Camera motion flags for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub moving: bool,
    pub rotating: bool,
    /// Camera tilt (radians); any noticeable tilt counts as rotation
    pub tilt: f32,
}

impl MotionState {
    /// Rotating, or tilted beyond the noise threshold
    #[inline]
    pub fn effective_rotating(&self) -> bool {
        self.rotating || self.tilt.abs() > TILT_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_round_trip_names() {
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert_eq!(QualityPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_high_preset_is_quality_mode() {
        let settings = GroundSettings::from_preset(QualityPreset::High);
        assert_eq!(settings.mode, RenderMode::Quality);
        assert!(!settings.layered_active());
    }

    #[test]
    fn test_low_preset_layers() {
        let settings = GroundSettings::from_preset(QualityPreset::Low);
        assert_eq!(settings.mode, RenderMode::Performance);
        assert_eq!(settings.base_resolution, 4);
        assert!(settings.layered_active());
    }

    #[test]
    fn test_from_json_falls_back() {
        assert_eq!(GroundSettings::from_json("{not json"), GroundSettings::default());

        let json = serde_json::to_string(&GroundSettings::from_preset(QualityPreset::Low))
            .expect("serialize");
        assert_eq!(
            GroundSettings::from_json(&json),
            GroundSettings::from_preset(QualityPreset::Low)
        );
    }

    #[test]
    fn test_tilt_counts_as_rotation() {
        let still = MotionState::default();
        assert!(!still.effective_rotating());

        let tilted = MotionState {
            tilt: -0.01,
            ..Default::default()
        };
        assert!(tilted.effective_rotating());

        let jitter = MotionState {
            tilt: 0.00005,
            ..Default::default()
        };
        assert!(!jitter.effective_rotating());
    }
}
