//! Browser tests for the wasm entry points.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use review_sphere_core::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Two 40px spheres in a container of the given size, plus the control buttons.
fn set_page(width: u32, height: u32) {
    document().body().unwrap().set_inner_html(&format!(
        r#"<div class="review-sphere-container" style="position: relative; width: {width}px; height: {height}px">
             <div class="review-sphere" data-review-id="1" style="position: absolute; width: 40px; height: 40px"></div>
             <div class="review-sphere" data-review-id="2" style="position: absolute; width: 40px; height: 40px"></div>
           </div>
           <button class="auto-rotate-btn">Auto rotate</button>
           <button class="reset-btn">Reset</button>
           <div class="review-detail-panel"></div>"#
    ));
}

fn element(selector: &str) -> HtmlElement {
    document().query_selector(selector).unwrap().unwrap().dyn_into().unwrap()
}

fn positions(mounted: &MountedSphere) -> Vec<(f64, f64)> {
    let frame: serde_json::Value = serde_json::from_str(&mounted.frame()).unwrap();
    frame["markers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| (m["x"].as_f64().unwrap(), m["y"].as_f64().unwrap()))
        .collect()
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn mount_without_elements_is_inert() {
    assert!(mount_review_sphere("", "").is_none());
}

#[wasm_bindgen_test]
fn mount_on_page_elements() {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    body.set_inner_html(
        r#"<div class="review-sphere-container" style="position: relative; width: 400px; height: 300px">
             <div class="review-sphere" data-review-id="1" style="position: absolute; width: 40px; height: 40px"></div>
             <div class="review-sphere" data-review-id="2" style="position: absolute; width: 40px; height: 40px"></div>
           </div>
           <div class="review-detail-panel"></div>"#,
    );

    let mounted = mount_review_sphere("", r#"[{"id": 1, "text": "Nice"}]"#).unwrap();
    let frame: serde_json::Value = serde_json::from_str(&mounted.frame()).unwrap();
    assert_eq!(frame["markers"].as_array().unwrap().len(), 2);
    mounted.unmount();
    body.set_inner_html("");
}

#[wasm_bindgen_test]
fn zero_size_container_is_placed_after_resize() {
    set_page(0, 0);
    // No timer retries, so only the resize can place the markers
    let mounted = mount_review_sphere(r#"{"max_layout_retries": 0}"#, "").unwrap();
    assert!(positions(&mounted).is_empty());

    let container = element(".review-sphere-container");
    let style = container.style();
    style.set_property("width", "400px").unwrap();
    style.set_property("height", "300px").unwrap();
    web_sys::window().unwrap().dispatch_event(&Event::new("resize").unwrap()).unwrap();

    let placed = positions(&mounted);
    assert_eq!(placed.len(), 2);
    for (x, y) in placed {
        assert!((0.0..=400.0).contains(&x) && (0.0..=300.0).contains(&y));
    }
    mounted.unmount();
    document().body().unwrap().set_inner_html("");
}

#[wasm_bindgen_test]
async fn rotate_toggled_off_stops_the_timer() {
    set_page(400, 300);
    let mounted = mount_review_sphere(r#"{"rotate_interval_ms": 10}"#, "").unwrap();
    let button = element(".auto-rotate-btn");

    let scattered = positions(&mounted);
    button.click();
    sleep(60).await;
    assert_ne!(positions(&mounted), scattered);

    button.click();
    let frozen = positions(&mounted);
    sleep(60).await;
    assert_eq!(positions(&mounted), frozen);

    let frame: serde_json::Value = serde_json::from_str(&mounted.frame()).unwrap();
    assert_eq!(frame["auto_rotate"], false);
    mounted.unmount();
    document().body().unwrap().set_inner_html("");
}

#[wasm_bindgen_test]
fn headless_handle_round() {
    let mut sphere = ReviewSphere::new(r#"{"radius": 20, "margin": 5}"#, r#"["a", "b"]"#, "").unwrap();
    let frame: serde_json::Value = serde_json::from_str(&sphere.place(0.0, 0.0)).unwrap();
    assert!(frame["error"].is_string());

    let frame: serde_json::Value = serde_json::from_str(&sphere.place(400.0, 300.0)).unwrap();
    assert!(frame.get("error").is_none());
    assert!(sphere.toggle_auto_rotate());
    assert!(!sphere.toggle_auto_rotate());
}
