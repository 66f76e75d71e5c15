//! Widget configuration as passed from the page.
//!
//! Every field is optional in the JSON; missing ones take their defaults.
//! Layout fields sit at the top level next to the DOM-binding ones:
//!
//! ```json
//! { "radius": 28, "rotate_interval_ms": 16, "selectors": { "sphere": ".bubble" } }
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::layout::LayoutConfig;

/// CSS selectors and attributes the DOM binding looks for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DomSelectors {
    pub container: String,
    pub sphere: String,
    pub detail_panel: String,
    pub content_item: String,
    pub close_panel: String,
    pub auto_rotate_button: String,
    pub reset_button: String,
    /// Attribute on spheres and content items holding the review id.
    pub review_id_attr: String,
}

impl Default for DomSelectors {
    fn default() -> Self {
        Self {
            container: ".review-sphere-container".into(),
            sphere: ".review-sphere".into(),
            detail_panel: ".review-detail-panel".into(),
            content_item: ".review-content-item".into(),
            close_panel: ".close-panel".into(),
            auto_rotate_button: ".auto-rotate-btn".into(),
            reset_button: ".reset-btn".into(),
            review_id_attr: "data-review-id".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    #[serde(flatten)]
    pub layout: LayoutConfig,
    pub selectors: DomSelectors,
    /// Period of the auto-rotate timer.
    pub rotate_interval_ms: i32,
    /// Delay between attempts to place markers in a container that has no size yet.
    pub layout_retry_delay_ms: i32,
    pub max_layout_retries: u32,
    /// CSS transition length for pushed markers.
    pub push_transition_ms: u32,
    /// CSS transition length after a reset.
    pub reset_transition_ms: u32,
    /// Use the rendered sphere width instead of `radius` when it is available.
    pub measure_radius: bool,
    pub rotate_label: String,
    pub stop_label: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            selectors: DomSelectors::default(),
            rotate_interval_ms: 16,
            layout_retry_delay_ms: 100,
            max_layout_retries: 20,
            push_transition_ms: 200,
            reset_transition_ms: 500,
            measure_radius: true,
            rotate_label: "Auto rotate".into(),
            stop_label: "Stop".into(),
        }
    }
}

impl WidgetConfig {
    /// Parse and validate. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: WidgetConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        if self.rotate_interval_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "rotate_interval_ms must be positive, got {}",
                self.rotate_interval_ms
            )));
        }
        if self.layout_retry_delay_ms < 0 {
            return Err(ConfigError::Invalid("layout_retry_delay_ms must not be negative".into()));
        }
        Ok(())
    }
}
