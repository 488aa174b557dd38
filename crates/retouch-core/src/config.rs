use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BLUR_RADIUS, DEFAULT_BLUR_STRENGTH, DEFAULT_DRAG_ZOOM_STEP, DEFAULT_EXPORT_QUALITY,
    DEFAULT_MAX_HISTORY, DEFAULT_MIN_CROP_DISPLAY_PX, DEFAULT_MIN_VIEWPORT_FRACTION,
    DEFAULT_WORKING_SCALE_CAP, DEFAULT_ZOOM_MAX, DEFAULT_ZOOM_MIN, DEFAULT_ZOOM_STEP,
};
use crate::error::{Result, RetouchError};
use crate::export::ExportFormat;

/// Every tunable of an edit session. Missing TOML keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Longest side of the working bitmap after load.
    pub working_scale_cap: u32,
    pub max_history: usize,
    /// Crop selections smaller than this in display pixels are ignored.
    pub min_crop_display_px: f64,
    pub zoom: ZoomConfig,
    pub blur: BlurConfig,
    pub export: ExportConfig,
    pub style: AnnotationStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            working_scale_cap: DEFAULT_WORKING_SCALE_CAP,
            max_history: DEFAULT_MAX_HISTORY,
            min_crop_display_px: DEFAULT_MIN_CROP_DISPLAY_PX,
            zoom: ZoomConfig::default(),
            blur: BlurConfig::default(),
            export: ExportConfig::default(),
            style: AnnotationStyle::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EditorConfig =
            toml::from_str(s).map_err(|e| RetouchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RetouchError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject values that would make the editor misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.max_history < 2 {
            return Err(RetouchError::Config(
                "max_history must be at least 2 to allow undo".into(),
            ));
        }
        if self.zoom.min <= 0.0 || self.zoom.min > 1.0 || self.zoom.max < 1.0 {
            return Err(RetouchError::Config(format!(
                "zoom bounds [{}, {}] must contain 1.0 and be positive",
                self.zoom.min, self.zoom.max
            )));
        }
        if self.zoom.step <= 1.0 || self.zoom.drag_step <= 0.0 || self.zoom.drag_step >= 1.0 {
            return Err(RetouchError::Config(
                "zoom.step must be > 1 and zoom.drag_step in (0, 1)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.zoom.min_viewport_fraction) {
            return Err(RetouchError::Config(
                "zoom.min_viewport_fraction must be in [0, 1]".into(),
            ));
        }
        if self.blur.radius <= 0.0 || self.blur.strength <= 0.0 || self.blur.strength > 1.0 {
            return Err(RetouchError::Config(
                "blur.radius must be > 0 and blur.strength in (0, 1]".into(),
            ));
        }
        if !(1..=100).contains(&self.export.quality) {
            return Err(RetouchError::Config("export.quality must be in 1..=100".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    /// Smallest viewport side as a fraction of the image side.
    pub min_viewport_fraction: f64,
    /// Button zoom factor.
    pub step: f64,
    /// Relative change per drag-zoom move event.
    pub drag_step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_ZOOM_MIN,
            max: DEFAULT_ZOOM_MAX,
            min_viewport_fraction: DEFAULT_MIN_VIEWPORT_FRACTION,
            step: DEFAULT_ZOOM_STEP,
            drag_step: DEFAULT_DRAG_ZOOM_STEP,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub radius: f32,
    pub strength: f32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLUR_RADIUS,
            strength: DEFAULT_BLUR_STRENGTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// JPEG quality, 1..=100. Ignored for PNG.
    pub quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: DEFAULT_EXPORT_QUALITY,
        }
    }
}

/// Colours (RGBA) and sizes used to draw annotations.
///
/// Sizes are for a 1000 px frame and scale with the rendered frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub marker_fill: [u8; 4],
    pub marker_text: [u8; 4],
    pub marker_radius: f32,
    pub label_text: [u8; 4],
    pub label_background: Option<[u8; 4]>,
    /// Pixel size of one 8x8 glyph cell.
    pub label_scale: u32,
    pub arrow_color: [u8; 4],
    pub arrow_width: f32,
    pub arrow_head: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            marker_fill: [220, 38, 38, 255],
            marker_text: [255, 255, 255, 255],
            marker_radius: 14.0,
            label_text: [255, 255, 255, 255],
            label_background: Some([0, 0, 0, 170]),
            label_scale: 2,
            arrow_color: [220, 38, 38, 255],
            arrow_width: 4.0,
            arrow_head: 18.0,
        }
    }
}
