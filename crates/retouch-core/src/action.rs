use serde::{Deserialize, Serialize};

use crate::error::{Result, RetouchError};
use crate::geometry::{Point, Rect};

/// A discrete edit, as issued by a toolbar button or an edit script.
///
/// Coordinates are in image space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditAction {
    RotateClockwise,
    RotateCounterClockwise,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Pan {
        dx: f64,
        dy: f64,
    },
    Crop {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Blur {
        points: Vec<Point>,
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default)]
        strength: Option<f32>,
    },
    Marker {
        x: f64,
        y: f64,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
    },
    Arrow {
        from: Point,
        to: Point,
    },
    ClearBlur,
    ClearAnnotations,
    ResetAll,
    /// Resample viewport, rotation and blur into a new base image.
    Bake,
    Undo,
    Redo,
}

impl EditAction {
    /// False when any coordinate or brush value is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            EditAction::Pan { dx, dy } => dx.is_finite() && dy.is_finite(),
            EditAction::Crop {
                x,
                y,
                width,
                height,
            } => Rect::new(*x, *y, *width, *height).is_finite(),
            EditAction::Blur {
                points,
                radius,
                strength,
            } => {
                points.iter().all(Point::is_finite)
                    && radius.map_or(true, f32::is_finite)
                    && strength.map_or(true, f32::is_finite)
            }
            EditAction::Marker { x, y } | EditAction::Label { x, y, .. } => {
                Point::new(*x, *y).is_finite()
            }
            EditAction::Arrow { from, to } => from.is_finite() && to.is_finite(),
            _ => true,
        }
    }
}

/// Result of applying an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The view changed and the change was recorded.
    Committed,
    /// The edit was invalid in the current state and left the view untouched.
    Ignored,
    /// An image is still decoding; the edit runs once it is ready.
    Queued,
}

/// A list of actions, as read from an edit script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    #[serde(default, rename = "action")]
    pub actions: Vec<EditAction>,
}

impl EditScript {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RetouchError::Config(e.to_string()))
    }
}
