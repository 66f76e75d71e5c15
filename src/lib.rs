//! Layout core for the storefront's review sphere widget.
//!
//! Review markers are scattered inside a container without overlapping,
//! can be dragged around (pushing their neighbours out of the way), rotate
//! on a circle on demand and open a detail view when clicked.

pub mod config;
pub mod content;
mod dom;
pub mod engine;
pub mod error;
pub mod layout;
pub mod output;
mod wasm;
mod widget;

pub use config::{DomSelectors, WidgetConfig};
pub use content::{ReviewCatalog, ReviewRecord, ReviewStats};
pub use engine::{Marker, PointerUp, RotateToggle, SphereEngine};
pub use error::{ConfigError, LayoutError};
pub use layout::{Bounds, LayoutConfig, MarkerId, Placement, PointF, Push, SizeF};
pub use output::{DetailOutput, FrameOutput, MarkerOutput};
pub use wasm::{mount_review_sphere, MountedSphere, ReviewSphere};
