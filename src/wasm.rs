//! WASM bindings for the review sphere core.
//!
//! Two ways in from JavaScript:
//! - `mount_review_sphere` binds directly to the page's elements and handles
//!   every event itself.
//! - `ReviewSphere` is a headless handle: the page forwards pointer events and
//!   timer ticks, and renders the returned frame JSON however it likes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::config::WidgetConfig;
use crate::content::ReviewCatalog;
use crate::engine::{RotateToggle, SphereEngine};
use crate::layout::{MarkerId, PointF, SizeF};
use crate::widget::Widget;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Reviews JSON is optional decoration; a bad payload leaves the detail panel empty.
fn catalog_or_empty(reviews_json: &str) -> ReviewCatalog {
    if reviews_json.trim().is_empty() {
        return ReviewCatalog::default();
    }
    ReviewCatalog::from_json(reviews_json).unwrap_or_else(|e| {
        log::warn!("ignoring review records: {e}");
        ReviewCatalog::default()
    })
}

/// Mount on the page's review sphere elements. Returns `undefined` when
/// they are not present.
#[wasm_bindgen]
pub fn mount_review_sphere(config_json: &str, reviews_json: &str) -> Option<MountedSphere> {
    let cfg = WidgetConfig::from_json(config_json).unwrap_or_else(|e| {
        log::warn!("invalid review sphere config, using defaults: {e}");
        WidgetConfig::default()
    });
    let window = web_sys::window()?;
    let widget = Widget::mount(window, cfg, catalog_or_empty(reviews_json))?;
    Some(MountedSphere { widget })
}

#[wasm_bindgen]
pub struct MountedSphere {
    widget: Widget,
}

#[wasm_bindgen]
impl MountedSphere {
    /// Current frame as JSON.
    pub fn frame(&self) -> String {
        self.widget
            .frame()
            .map(|f| f.to_json())
            .unwrap_or_else(|| "{\"markers\": [], \"auto_rotate\": false}".to_string())
    }

    pub fn stats(&self) -> String {
        self.widget.stats_json().unwrap_or_else(|| "{}".to_string())
    }

    /// Remove listeners and stop timers.
    pub fn unmount(self) {
        drop(self.widget);
    }
}

#[wasm_bindgen]
pub struct ReviewSphere {
    engine: SphereEngine,
    rng: StdRng,
}

#[wasm_bindgen]
impl ReviewSphere {
    /// `review_ids_json` is a JSON array with one review id per sphere, in render order.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, review_ids_json: &str, reviews_json: &str) -> Result<ReviewSphere, JsValue> {
        let cfg = WidgetConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let review_ids: Vec<String> =
            serde_json::from_str(review_ids_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let engine = SphereEngine::new(cfg.layout, review_ids, catalog_or_empty(reviews_json))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(ReviewSphere {
            engine,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn frame(&self) -> String {
        self.engine.frame().to_json()
    }

    /// Randomly place all markers in a `width` x `height` container.
    /// The frame carries an error while the container has no size.
    pub fn place(&mut self, width: f64, height: f64) -> String {
        self.engine.set_container(SizeF::new(width, height));
        match self.engine.place_initial(&mut self.rng) {
            Ok(()) => self.frame(),
            Err(e) => self.engine.frame().with_error(e.to_string()).to_json(),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) -> String {
        self.engine.resize(SizeF::new(width, height));
        self.frame()
    }

    pub fn pointer_down(&mut self, marker: usize, x: f64, y: f64) -> String {
        match self.engine.pointer_down(MarkerId(marker), PointF::new(x, y)) {
            Ok(()) => self.frame(),
            Err(e) => self.engine.frame().with_error(e.to_string()).to_json(),
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.engine.pointer_move(PointF::new(x, y));
        self.frame()
    }

    pub fn pointer_up(&mut self, now_ms: f64) -> String {
        self.engine.pointer_up(now_ms);
        self.frame()
    }

    pub fn pointer_cancel(&mut self) -> String {
        self.engine.pointer_cancel();
        self.frame()
    }

    pub fn activate(&mut self, marker: usize, now_ms: f64) -> String {
        match self.engine.activate(MarkerId(marker), now_ms) {
            Ok(_) => self.frame(),
            Err(e) => self.engine.frame().with_error(e.to_string()).to_json(),
        }
    }

    pub fn close_detail(&mut self) -> String {
        self.engine.close_detail();
        self.frame()
    }

    /// Returns true when auto-rotate is now on. The caller owns the timer
    /// that calls `tick` and must stop it when this returns false.
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.engine.toggle_auto_rotate() == RotateToggle::Started
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.engine.is_auto_rotating()
    }

    pub fn tick(&mut self, now_ms: f64) -> String {
        self.engine.tick(now_ms);
        self.frame()
    }

    pub fn reset(&mut self) -> String {
        match self.engine.reset() {
            Ok(()) => self.frame(),
            Err(e) => self.engine.frame().with_error(e.to_string()).to_json(),
        }
    }

    /// Rating summary of the supplied review records.
    pub fn stats(&self) -> String {
        serde_json::to_string(&self.engine.catalog().stats()).unwrap_or_else(|_| "{}".to_string())
    }
}
