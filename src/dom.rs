//! DOM access for the review sphere widget.
//!
//! Finds the widget's elements, reads container geometry and writes inline
//! position styles and state classes. Missing optional elements (panel,
//! buttons) just disable the matching feature; a missing container or an
//! empty sphere list means there is nothing to mount.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::{DomSelectors, WidgetConfig};
use crate::layout::{PointF, SizeF};
use crate::output::FrameOutput;

pub struct SphereElements {
    pub container: HtmlElement,
    pub spheres: Vec<HtmlElement>,
    pub detail_panel: Option<Element>,
    pub close_panel: Option<Element>,
    pub auto_rotate_button: Option<Element>,
    pub reset_button: Option<Element>,
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::debug!("failed to set {property}: {e:?}");
    }
}

fn toggle_class(el: &Element, class: &str, on: bool) {
    if let Err(e) = el.class_list().toggle_with_force(class, on) {
        log::debug!("failed to toggle class {class}: {e:?}");
    }
}

impl SphereElements {
    /// `None` when the container or every sphere is missing.
    pub fn discover(document: &Document, selectors: &DomSelectors) -> Option<Self> {
        let container = query(document, &selectors.container)?.dyn_into::<HtmlElement>().ok()?;
        let spheres: Vec<HtmlElement> = query_all(document, &selectors.sphere)
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        if spheres.is_empty() {
            return None;
        }

        Some(Self {
            container,
            spheres,
            detail_panel: query(document, &selectors.detail_panel),
            close_panel: query(document, &selectors.close_panel),
            auto_rotate_button: query(document, &selectors.auto_rotate_button),
            reset_button: query(document, &selectors.reset_button),
        })
    }

    /// Review id per sphere, falling back to the sphere's index.
    pub fn review_ids(&self, attr: &str) -> Vec<String> {
        self.spheres
            .iter()
            .enumerate()
            .map(|(i, s)| s.get_attribute(attr).unwrap_or_else(|| i.to_string()))
            .collect()
    }

    pub fn container_size(&self) -> SizeF {
        SizeF::new(self.container.offset_width() as f64, self.container.offset_height() as f64)
    }

    /// Convert viewport coordinates to container-local ones.
    pub fn to_local(&self, client_x: f64, client_y: f64) -> PointF {
        let rect = self.container.get_bounding_client_rect();
        PointF::new(client_x - rect.left(), client_y - rect.top())
    }

    /// Half the rendered width of the first sphere, if it has been laid out.
    pub fn measured_radius(&self) -> Option<f64> {
        let width = self.spheres.first()?.offset_width();
        (width > 0).then(|| width as f64 / 2.0)
    }

    pub fn render(&self, frame: &FrameOutput, cfg: &WidgetConfig, transition_ms: u32) {
        for m in &frame.markers {
            let Some(el) = self.spheres.get(m.id) else { continue };
            let transition = if m.animate {
                format!("left {transition_ms}ms ease, top {transition_ms}ms ease")
            } else {
                "none".to_string()
            };
            set_style(el, "transition", &transition);
            set_style(el, "left", &format!("{}px", m.x));
            set_style(el, "top", &format!("{}px", m.y));
            set_style(el, "z-index", &m.z_index.to_string());
            toggle_class(el, "dragging", m.dragging);
            toggle_class(el, "selected", m.selected);
        }

        if let Some(panel) = &self.detail_panel {
            toggle_class(panel, "active", frame.detail.is_some());
        }
        if let Some(button) = &self.auto_rotate_button {
            let label = if frame.auto_rotate { &cfg.stop_label } else { &cfg.rotate_label };
            button.set_text_content(Some(label.as_str()));
        }
    }

    /// Show the content item bound to the open detail view and hide the rest.
    pub fn render_detail(&self, document: &Document, frame: &FrameOutput, selectors: &DomSelectors) {
        let active = frame.detail.as_ref().map(|d| d.review_id.as_str());
        for item in query_all(document, &selectors.content_item) {
            let id = item.get_attribute(&selectors.review_id_attr);
            toggle_class(&item, "active", id.is_some() && id.as_deref() == active);
        }
    }
}
