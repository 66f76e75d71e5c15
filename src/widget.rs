//! A review sphere widget mounted on live DOM elements.
//!
//! Event listeners, the auto-rotate interval and pending placement retries
//! only hold weak references to the widget state, so dropping the `Widget`
//! removes its listeners and, through `WidgetState`, clears the interval.
//!
//! Placement is retried on a timer while the container has no size. Once the
//! retries run out, the next resize or pointer-down that finds a sized
//! container places the markers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, MouseEvent, Window};

use crate::config::WidgetConfig;
use crate::content::ReviewCatalog;
use crate::dom::SphereElements;
use crate::engine::{PointerUp, RotateToggle, SphereEngine};
use crate::error::LayoutError;
use crate::layout::MarkerId;
use crate::output::FrameOutput;

type StateRef = Weak<RefCell<WidgetState>>;

fn now() -> f64 {
    js_sys::Date::now()
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// A running `setInterval`, cleared on drop.
struct Interval {
    window: Window,
    handle: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    fn start(window: &Window, period_ms: i32, f: impl FnMut() + 'static) -> Option<Self> {
        let closure = Closure::<dyn FnMut()>::new(f);
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), period_ms)
            .ok()?;
        Some(Self {
            window: window.clone(),
            handle,
            _closure: closure,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
    }
}

struct WidgetState {
    this: StateRef,
    engine: SphereEngine,
    elements: SphereElements,
    cfg: WidgetConfig,
    window: Window,
    document: Document,
    rotate_interval: Option<Interval>,
    layout_attempts: u32,
}

impl WidgetState {
    fn render(&self, transition_ms: u32) {
        let frame = self.engine.frame();
        self.elements.render(&frame, &self.cfg, transition_ms);
        self.elements.render_detail(&self.document, &frame, &self.cfg.selectors);
    }

    /// Pick up container size changes made by the page. A widget that never
    /// got placed is placed as soon as its container has a size again, even
    /// after the retry timer gave up.
    fn sync_container(&mut self) {
        let size = self.elements.container_size();
        if size != self.engine.container() {
            self.engine.resize(size);
        }
        if !self.engine.is_placed() && !size.is_empty() {
            self.layout_attempts = 0;
            self.place_or_retry();
        }
    }

    /// Place markers once the container has a size, retrying on a timer until it does.
    fn place_or_retry(&mut self) {
        let size = self.elements.container_size();
        self.engine.set_container(size);
        let mut rng = StdRng::from_entropy();

        let placed = self.engine.place_initial(&mut rng);
        match placed {
            Ok(()) => self.render(0),
            Err(LayoutError::ContainerNotReady { .. }) if self.layout_attempts < self.cfg.max_layout_retries => {
                self.layout_attempts += 1;
                log::debug!("container not laid out yet, retry {}", self.layout_attempts);
                let weak = self.this.clone();
                let callback = Closure::once_into_js(move || {
                    let Some(rc) = weak.upgrade() else { return };
                    let Ok(mut state) = rc.try_borrow_mut() else { return };
                    if !state.engine.is_placed() {
                        state.place_or_retry();
                    }
                });
                if self
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.unchecked_ref(),
                        self.cfg.layout_retry_delay_ms,
                    )
                    .is_err()
                {
                    log::warn!("could not schedule sphere placement retry");
                }
            }
            Err(e) => log::warn!("sphere placement deferred until the container is resized: {e}"),
        }
    }

    fn start_rotation(&mut self) {
        let weak = self.this.clone();
        self.rotate_interval = Interval::start(&self.window, self.cfg.rotate_interval_ms, move || {
            let Some(rc) = weak.upgrade() else { return };
            let Ok(mut state) = rc.try_borrow_mut() else { return };
            state.sync_container();
            if state.engine.tick(now()) {
                state.render(0);
            }
        });
        if self.rotate_interval.is_none() {
            log::warn!("could not start auto-rotate timer");
        }
    }

    fn stop_rotation(&mut self) {
        self.rotate_interval = None;
    }
}

pub struct Widget {
    state: Rc<RefCell<WidgetState>>,
    listeners: Vec<Listener>,
}

impl Widget {
    /// Mount on the elements named by `cfg.selectors`. `None` when the
    /// container or the spheres are missing.
    pub fn mount(window: Window, cfg: WidgetConfig, catalog: ReviewCatalog) -> Option<Self> {
        let document = window.document()?;
        let Some(elements) = SphereElements::discover(&document, &cfg.selectors) else {
            log::debug!("no review sphere elements, widget not mounted");
            return None;
        };

        let mut layout = cfg.layout.clone();
        if cfg.measure_radius {
            if let Some(radius) = elements.measured_radius() {
                layout.radius = radius;
            }
        }
        let review_ids = elements.review_ids(&cfg.selectors.review_id_attr);
        let engine = SphereEngine::new(layout, review_ids, catalog).ok()?;
        let count = engine.marker_count();

        let state = Rc::new_cyclic(|this| {
            RefCell::new(WidgetState {
                this: this.clone(),
                engine,
                elements,
                cfg,
                window,
                document,
                rotate_interval: None,
                layout_attempts: 0,
            })
        });

        let mut widget = Widget {
            state,
            listeners: Vec::new(),
        };
        widget.bind_events();
        widget.state.borrow_mut().place_or_retry();

        log::info!("review sphere mounted with {count} markers");
        Some(widget)
    }

    pub fn frame(&self) -> Option<FrameOutput> {
        self.state.try_borrow().ok().map(|s| s.engine.frame())
    }

    pub fn stats_json(&self) -> Option<String> {
        let state = self.state.try_borrow().ok()?;
        serde_json::to_string(&state.engine.catalog().stats()).ok()
    }

    fn listen(&mut self, target: &EventTarget, kind: &'static str, mut handler: impl FnMut(&mut WidgetState, &Event) + 'static) {
        let weak = Rc::downgrade(&self.state);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(rc) = weak.upgrade() else { return };
            let Ok(mut state) = rc.try_borrow_mut() else { return };
            handler(&mut state, &event);
        });
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("could not listen for {kind}");
            return;
        }
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    fn bind_events(&mut self) {
        let (spheres, document, window, close_panel, rotate_button, reset_button, push_ms, reset_ms) = {
            let s = self.state.borrow();
            (
                s.elements.spheres.clone(),
                s.document.clone(),
                s.window.clone(),
                s.elements.close_panel.clone(),
                s.elements.auto_rotate_button.clone(),
                s.elements.reset_button.clone(),
                s.cfg.push_transition_ms,
                s.cfg.reset_transition_ms,
            )
        };

        for (i, sphere) in spheres.iter().enumerate() {
            let id = MarkerId(i);
            self.listen(sphere, "pointerdown", move |state, event| {
                let Some(ev) = event.dyn_ref::<MouseEvent>() else { return };
                ev.prevent_default();
                state.sync_container();
                let p = state.elements.to_local(ev.client_x() as f64, ev.client_y() as f64);
                if let Err(e) = state.engine.pointer_down(id, p) {
                    log::debug!("pointer down: {e}");
                }
                state.render(push_ms);
            });
            self.listen(sphere, "click", move |state, _| match state.engine.activate(id, now()) {
                Ok(true) => state.render(push_ms),
                Ok(false) => {}
                Err(e) => log::debug!("click: {e}"),
            });
        }

        self.listen(&document, "pointermove", move |state, event| {
            if !state.engine.is_dragging() {
                return;
            }
            let Some(ev) = event.dyn_ref::<MouseEvent>() else { return };
            ev.prevent_default();
            let p = state.elements.to_local(ev.client_x() as f64, ev.client_y() as f64);
            state.engine.pointer_move(p);
            state.render(push_ms);
        });
        self.listen(&document, "pointerup", move |state, _| {
            if state.engine.pointer_up(now()) != PointerUp::Idle {
                state.render(push_ms);
            }
        });
        self.listen(&document, "pointercancel", move |state, _| {
            state.engine.pointer_cancel();
            state.render(push_ms);
        });
        self.listen(&window, "resize", move |state, _| {
            state.sync_container();
            state.render(0);
        });

        if let Some(close) = close_panel {
            self.listen(&close, "click", move |state, _| {
                state.engine.close_detail();
                state.render(0);
            });
        }
        if let Some(button) = rotate_button {
            self.listen(&button, "click", move |state, _| {
                match state.engine.toggle_auto_rotate() {
                    RotateToggle::Started => state.start_rotation(),
                    RotateToggle::Stopped => state.stop_rotation(),
                }
                state.render(push_ms);
            });
        }
        if let Some(button) = reset_button {
            self.listen(&button, "click", move |state, _| {
                state.stop_rotation();
                state.sync_container();
                if let Err(e) = state.engine.reset() {
                    log::debug!("reset: {e}");
                }
                state.render(reset_ms);
            });
        }
    }
}
