/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Largest gaussian sigma convolved directly; wider blurs run downsampled.
pub const MAX_DIRECT_BLUR_SIGMA: f32 = 8.0;

/// Longest side of the working bitmap after the initial downscale.
pub const DEFAULT_WORKING_SCALE_CAP: u32 = 2560;

/// Number of history entries kept before the oldest is evicted.
pub const DEFAULT_MAX_HISTORY: usize = 15;

/// Cumulative zoom lower bound (viewport up to 5x the committed frame).
pub const DEFAULT_ZOOM_MIN: f64 = 0.2;

/// Cumulative zoom upper bound.
pub const DEFAULT_ZOOM_MAX: f64 = 8.0;

/// Smallest viewport side, as a fraction of the matching image side.
pub const DEFAULT_MIN_VIEWPORT_FRACTION: f64 = 1.0 / 15.0;

/// Factor applied by the zoom-in / zoom-out buttons.
pub const DEFAULT_ZOOM_STEP: f64 = 1.15;

/// Relative zoom change per pointer-move event in drag-to-zoom mode.
pub const DEFAULT_DRAG_ZOOM_STEP: f64 = 0.02;

/// Crop selections narrower or shorter than this (display pixels) are ignored.
pub const DEFAULT_MIN_CROP_DISPLAY_PX: f64 = 10.0;

/// Default blur brush radius in image pixels.
pub const DEFAULT_BLUR_RADIUS: f32 = 18.0;

/// Default blur strength; the Gaussian sigma is `strength * radius`.
pub const DEFAULT_BLUR_STRENGTH: f32 = 0.35;

/// Default JPEG export quality (1..=100).
pub const DEFAULT_EXPORT_QUALITY: u8 = 92;

/// Reference frame side used to scale annotation strokes and glyphs.
pub const ANNOTATION_REFERENCE_SIDE: f32 = 1000.0;

/// Neutral placeholder colour shown when no bitmap is loaded.
pub const PLACEHOLDER_RGBA: [u8; 4] = [248, 249, 250, 255];

/// Tolerance for floating-point geometry comparisons.
pub const EPSILON: f64 = 1e-9;
