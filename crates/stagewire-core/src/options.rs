//! Resize behavior configuration.

use crate::handles::HandleSelection;
use crate::input::PointerEvent;
use crate::stage::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum box dimension.
pub const DEFAULT_MIN_SIZE: f64 = 10.0;

/// Errors raised by option validation.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("minimum {axis} {min} exceeds maximum {max}")]
    MinExceedsMax {
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{axis} bound must be finite")]
    NonFinite { axis: &'static str },
}

/// Configuration for a resizable box.
///
/// Fields left out of a JSON document fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    /// Minimum box width.
    pub min_width: f64,
    /// Minimum box height.
    pub min_height: f64,
    /// Maximum box width; `None` means the container width.
    pub max_width: Option<f64>,
    /// Maximum box height; `None` means the container height.
    pub max_height: Option<f64>,
    /// Whether grabbing the box body (no handle) moves it.
    pub draggable: bool,
    /// Preserve the width/height ratio measured when a gesture begins.
    pub keep_aspect_ratio: bool,
    /// Skip the container-edge pre-clamp while a handle is dragged.
    pub invert_on_container_edge: bool,
    /// Which handles to attach.
    pub handles: HandleSelection,
    /// Bounding container node; `None` means the stage root.
    pub container: Option<NodeId>,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_SIZE,
            min_height: DEFAULT_MIN_SIZE,
            max_width: None,
            max_height: None,
            draggable: true,
            keep_aspect_ratio: false,
            invert_on_container_edge: false,
            handles: HandleSelection::default(),
            container: None,
        }
    }
}

impl ResizeOptions {
    /// Check the size bounds for consistency.
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (axis, min, max) in [
            ("width", self.min_width, self.max_width),
            ("height", self.min_height, self.max_height),
        ] {
            if !min.is_finite() {
                return Err(OptionsError::NonFinite { axis });
            }
            if let Some(max) = max {
                if !max.is_finite() {
                    return Err(OptionsError::NonFinite { axis });
                }
                if min > max {
                    return Err(OptionsError::MinExceedsMax { axis, min, max });
                }
            }
        }
        Ok(())
    }

    /// Serialize the options to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize options from JSON; missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Lifecycle callbacks invoked around a gesture.
#[derive(Default)]
pub struct ResizeCallbacks {
    /// Called when a gesture starts, after the dragging markers are set.
    pub on_start: Option<Box<dyn FnMut(&PointerEvent)>>,
    /// Called after every applied move.
    pub on_move: Option<Box<dyn FnMut(&PointerEvent)>>,
    /// Called when a gesture ends, after the dragging markers are cleared.
    pub on_end: Option<Box<dyn FnMut(&PointerEvent)>>,
}

impl ResizeCallbacks {
    /// Set the gesture-start callback.
    pub fn on_start(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Set the per-move callback.
    pub fn on_move(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    /// Set the gesture-end callback.
    pub fn on_end(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }
}
