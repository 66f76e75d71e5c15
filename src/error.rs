//! Error types for the layout engine and its JSON inputs.

use thiserror::Error;

use crate::layout::MarkerId;

/// Failures of layout operations.
///
/// None of these are fatal to the widget: the DOM binding logs them and keeps
/// the previous frame on screen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The container has not been laid out yet (zero width or height).
    #[error("container is not laid out yet ({width}x{height})")]
    ContainerNotReady { width: f64, height: f64 },

    #[error("unknown marker {0:?}")]
    UnknownMarker(MarkerId),

    #[error("no markers to lay out")]
    NoMarkers,
}

/// Failures while reading configuration or review records from JSON.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
