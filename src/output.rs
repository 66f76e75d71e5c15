//! Output types for the JavaScript side.
//!
//! A `FrameOutput` is serialized to JSON after every engine operation so a
//! renderer can apply it without knowing anything about the layout rules.

use serde::Serialize;

use crate::content::ReviewRecord;

/// A marker ready to be positioned
#[derive(Debug, Clone, Serialize)]
pub struct MarkerOutput {
    pub id: usize,
    pub review_id: String,
    pub x: f64,
    pub y: f64,
    pub z_index: i32,
    pub dragging: bool,
    pub selected: bool,
    /// The marker was pushed or reset; renderers should transition to the new position
    pub animate: bool,
}

/// The open detail view, if any
#[derive(Debug, Clone, Serialize)]
pub struct DetailOutput {
    pub marker: usize,
    pub review_id: String,
    /// `None` when the page supplied no record for this review id
    pub review: Option<ReviewRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// The combined output sent to JavaScript
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutput {
    pub markers: Vec<MarkerOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailOutput>,
    pub auto_rotate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl FrameOutput {
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(ErrorInfo { message: message.into() });
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("failed to serialize frame: {e}");
            "{\"markers\": [], \"auto_rotate\": false}".to_string()
        })
    }
}
