//! The sphere layout engine.
//!
//! One `SphereEngine` is created per mounted view. It owns the placement set,
//! the drag gesture in progress, the selection and the auto-rotate mode. It
//! never reads a clock or touches the DOM: callers pass `now_ms` in and render
//! the returned `FrameOutput`.

use rand::Rng;

use crate::content::ReviewCatalog;
use crate::error::LayoutError;
use crate::layout::{
    resolve_collisions, Bounds, LayoutConfig, MarkerId, Orbit, Placement, PlacementStrategy, PointF, Push, Scatter,
    SizeF,
};
use crate::output::{DetailOutput, FrameOutput, MarkerOutput};

/// Per-marker state that is not a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub review_id: String,
    pub z_index: i32,
    pub dragging: bool,
    pub selected: bool,
    pub animate: bool,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    marker: MarkerId,
    /// Pointer position minus marker origin at pointer-down.
    offset: PointF,
    down_at: PointF,
    /// Travelled past the drag threshold.
    moved: bool,
}

/// What a pointer release turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUp {
    /// Released without moving; the detail view was opened.
    Click(MarkerId),
    /// Released after a drag; clicks are suppressed for a short window.
    Dragged(MarkerId),
    /// No drag was in progress.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateToggle {
    Started,
    Stopped,
}

pub struct SphereEngine {
    cfg: LayoutConfig,
    container: SizeF,
    markers: Vec<Marker>,
    placement: Placement,
    catalog: ReviewCatalog,
    drag: Option<DragState>,
    suppress_clicks_until: f64,
    detail: Option<MarkerId>,
    rotating: bool,
}

impl SphereEngine {
    /// One marker per entry of `review_ids`, in render order.
    pub fn new(cfg: LayoutConfig, review_ids: Vec<String>, catalog: ReviewCatalog) -> Result<Self, LayoutError> {
        if review_ids.is_empty() {
            return Err(LayoutError::NoMarkers);
        }
        let markers = review_ids
            .into_iter()
            .enumerate()
            .map(|(i, review_id)| Marker {
                id: MarkerId(i),
                review_id,
                z_index: cfg.base_z_index,
                dragging: false,
                selected: false,
                animate: false,
            })
            .collect();

        Ok(Self {
            cfg,
            container: SizeF::default(),
            markers,
            placement: Placement::default(),
            catalog,
            drag: None,
            suppress_clicks_until: f64::NEG_INFINITY,
            detail: None,
            rotating: false,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    pub fn catalog(&self) -> &ReviewCatalog {
        &self.catalog
    }

    pub fn container(&self) -> SizeF {
        self.container
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::for_container(self.container, &self.cfg)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn position(&self, id: MarkerId) -> Option<PointF> {
        self.placement.get(id)
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn is_placed(&self) -> bool {
        self.placement.len() == self.markers.len()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.rotating
    }

    pub fn selected(&self) -> Option<MarkerId> {
        self.detail
    }

    fn marker_mut(&mut self, id: MarkerId) -> Result<&mut Marker, LayoutError> {
        self.markers.get_mut(id.0).ok_or(LayoutError::UnknownMarker(id))
    }

    fn clear_animation(&mut self) {
        for m in &mut self.markers {
            m.animate = false;
        }
    }

    /// Record the container size without moving anything.
    pub fn set_container(&mut self, size: SizeF) {
        self.container = size;
    }

    /// Replace every position with what `strategy` computes for the current
    /// container. The previous placement is kept on error.
    pub fn place_with<S: PlacementStrategy + ?Sized>(&mut self, strategy: &mut S) -> Result<(), LayoutError> {
        self.placement = strategy.place(self.markers.len(), self.container, &self.cfg)?;
        self.clear_animation();
        Ok(())
    }

    /// Random initial placement. Fails with `ContainerNotReady` until the
    /// container has a size; the caller retries later.
    pub fn place_initial<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), LayoutError> {
        self.place_with(&mut Scatter::new(rng))?;
        log::debug!("placed {} markers in {}x{}", self.markers.len(), self.container.w, self.container.h);
        Ok(())
    }

    /// Overwrite one position, clamped to the container. Used when restoring a layout.
    pub fn set_position(&mut self, id: MarkerId, p: PointF) -> Result<(), LayoutError> {
        self.marker_mut(id)?;
        let clamped = self.bounds().clamp(p);
        self.placement.set(id, clamped);
        Ok(())
    }

    /// Change the container size and pull every marker back inside.
    pub fn resize(&mut self, size: SizeF) {
        self.container = size;
        if size.is_empty() {
            return;
        }
        let bounds = self.bounds();
        self.placement.clamp_all(&bounds);
    }

    /// Start dragging `id`. Ignored while auto-rotate runs or another drag is active.
    pub fn pointer_down(&mut self, id: MarkerId, pointer: PointF) -> Result<(), LayoutError> {
        let origin = self.placement.get(id).ok_or(LayoutError::UnknownMarker(id))?;
        if self.rotating || self.drag.is_some() {
            log::debug!("pointer down on {id:?} ignored");
            return Ok(());
        }

        let drag_z = self.cfg.drag_z_index;
        let marker = self.marker_mut(id)?;
        marker.dragging = true;
        marker.z_index = drag_z;

        self.drag = Some(DragState {
            marker: id,
            offset: pointer - origin,
            down_at: pointer,
            moved: false,
        });
        Ok(())
    }

    /// Move the dragged marker toward `pointer` and push its neighbours away.
    pub fn pointer_move(&mut self, pointer: PointF) -> Vec<Push> {
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        if !drag.moved && pointer.distance(&drag.down_at) > self.cfg.drag_threshold {
            drag.moved = true;
        }
        let active = drag.marker;
        let offset = drag.offset;

        let bounds = Bounds::for_container(self.container, &self.cfg);
        let Some(current) = self.placement.get(active) else {
            return Vec::new();
        };
        let target = bounds.clamp(pointer - offset);
        let next = bounds.clamp(current.lerp(&target, self.cfg.drag_follow));
        self.placement.set(active, next);

        self.clear_animation();
        let pushes = resolve_collisions(active, &mut self.placement, &bounds, self.cfg.min_distance());
        for push in &pushes {
            if let Some(m) = self.markers.get_mut(push.marker.0) {
                m.animate = true;
            }
        }
        pushes
    }

    /// End the gesture. A release without movement opens the detail view.
    pub fn pointer_up(&mut self, now_ms: f64) -> PointerUp {
        let Some(drag) = self.drag.take() else {
            return PointerUp::Idle;
        };
        self.release_marker(drag.marker);

        if drag.moved {
            self.suppress_clicks_until = now_ms + self.cfg.click_suppression_ms;
            PointerUp::Dragged(drag.marker)
        } else {
            self.open_detail(drag.marker);
            PointerUp::Click(drag.marker)
        }
    }

    /// Abort a drag without activating anything.
    pub fn pointer_cancel(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.release_marker(drag.marker);
        }
    }

    fn release_marker(&mut self, id: MarkerId) {
        let base_z = self.cfg.base_z_index;
        if let Some(m) = self.markers.get_mut(id.0) {
            m.dragging = false;
            m.z_index = base_z;
        }
    }

    /// Click or tap on a marker. Returns whether the detail view was opened;
    /// clicks during a drag or right after one are ignored.
    pub fn activate(&mut self, id: MarkerId, now_ms: f64) -> Result<bool, LayoutError> {
        self.marker_mut(id)?;
        if self.drag.is_some() || now_ms < self.suppress_clicks_until {
            return Ok(false);
        }
        self.open_detail(id);
        Ok(true)
    }

    fn open_detail(&mut self, id: MarkerId) {
        for m in &mut self.markers {
            m.selected = m.id == id;
        }
        self.detail = Some(id);
    }

    pub fn close_detail(&mut self) {
        for m in &mut self.markers {
            m.selected = false;
        }
        self.detail = None;
    }

    pub fn toggle_auto_rotate(&mut self) -> RotateToggle {
        if self.rotating {
            self.rotating = false;
            log::debug!("auto-rotate stopped");
            RotateToggle::Stopped
        } else {
            self.pointer_cancel();
            self.rotating = true;
            log::debug!("auto-rotate started");
            RotateToggle::Started
        }
    }

    /// Advance auto-rotate to `now_ms`. Returns whether anything moved.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.rotating {
            return false;
        }
        let phase = now_ms * self.cfg.rotate_speed;
        self.place_with(&mut Orbit { phase }).is_ok()
    }

    /// Stop rotating, drop any gesture and selection, and return to the
    /// circular layout.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        self.rotating = false;
        self.pointer_cancel();
        self.close_detail();
        self.place_with(&mut Orbit::default())?;
        for m in &mut self.markers {
            m.animate = true;
        }
        Ok(())
    }

    pub fn detail(&self) -> Option<DetailOutput> {
        let id = self.detail?;
        let marker = self.markers.get(id.0)?;
        Some(DetailOutput {
            marker: id.0,
            review_id: marker.review_id.clone(),
            review: self.catalog.get(&marker.review_id).cloned(),
        })
    }

    pub fn frame(&self) -> FrameOutput {
        let markers = self
            .markers
            .iter()
            .filter_map(|m| {
                let p = self.placement.get(m.id)?;
                Some(MarkerOutput {
                    id: m.id.0,
                    review_id: m.review_id.clone(),
                    x: p.x,
                    y: p.y,
                    z_index: m.z_index,
                    dragging: m.dragging,
                    selected: m.selected,
                    animate: m.animate,
                })
            })
            .collect();

        FrameOutput {
            markers,
            detail: self.detail(),
            auto_rotate: self.rotating,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ReviewRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cfg() -> LayoutConfig {
        LayoutConfig { radius: 20.0, margin: 5.0, horizontal_padding: 0.0, ..LayoutConfig::default() }
    }

    fn engine_at(points: &[(f64, f64)]) -> SphereEngine {
        let ids = (0..points.len()).map(|i| format!("r{i}")).collect();
        let catalog = ReviewCatalog::new(vec![ReviewRecord {
            id: "r0".into(),
            text: "Soft fabric".into(),
            image_urls: vec![],
            rating: Some(4),
            author: None,
        }]);
        let mut engine = SphereEngine::new(cfg(), ids, catalog).unwrap();
        engine.set_container(SizeF::new(400.0, 300.0));
        for (i, &(x, y)) in points.iter().enumerate() {
            engine.set_position(MarkerId(i), PointF::new(x, y)).unwrap();
        }
        engine
    }

    #[test]
    fn test_no_markers() {
        assert!(matches!(
            SphereEngine::new(cfg(), vec![], ReviewCatalog::default()),
            Err(LayoutError::NoMarkers)
        ));
    }

    #[test]
    fn test_place_initial_waits_for_container() {
        let mut engine = SphereEngine::new(cfg(), vec!["a".into()], ReviewCatalog::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(engine.place_initial(&mut rng).is_err());
        assert!(!engine.is_placed());

        engine.set_container(SizeF::new(400.0, 300.0));
        engine.place_initial(&mut rng).unwrap();
        assert!(engine.is_placed());
    }

    #[test]
    fn test_place_with_strategy() {
        let mut engine = engine_at(&[(50.0, 50.0), (60.0, 60.0), (70.0, 70.0)]);
        engine.place_with(&mut Orbit { phase: 0.0 }).unwrap();
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(255.0, 130.0)));

        engine.place_with(&mut Scatter::new(StdRng::seed_from_u64(5))).unwrap();
        let bounds = engine.bounds();
        assert!(engine.placement().iter().all(|(_, p)| bounds.contains(&p)));
    }

    #[test]
    fn test_failed_strategy_keeps_placement() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        engine.set_container(SizeF::new(0.0, 0.0));
        assert!(engine.place_with(&mut Orbit::default()).is_err());
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(50.0, 50.0)));
    }

    #[test]
    fn test_non_finite_container_is_not_ready() {
        let mut engine = SphereEngine::new(cfg(), vec!["a".into()], ReviewCatalog::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        engine.set_container(SizeF::new(f64::INFINITY, 300.0));
        assert!(matches!(
            engine.place_initial(&mut rng),
            Err(LayoutError::ContainerNotReady { .. })
        ));
        engine.set_container(SizeF::new(400.0, f64::NAN));
        assert!(engine.place_initial(&mut rng).is_err());
        assert!(!engine.is_placed());

        // A non-finite resize leaves positions alone
        engine.set_container(SizeF::new(400.0, 300.0));
        engine.place_initial(&mut rng).unwrap();
        let before = engine.position(MarkerId(0));
        engine.resize(SizeF::new(f64::NAN, f64::NAN));
        assert_eq!(engine.position(MarkerId(0)), before);
    }

    #[test]
    fn test_drag_raises_and_restores_z() {
        let mut engine = engine_at(&[(50.0, 50.0), (200.0, 200.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(60.0, 60.0)).unwrap();
        assert!(engine.markers()[0].dragging);
        assert_eq!(engine.markers()[0].z_index, 20);

        engine.pointer_move(PointF::new(100.0, 60.0));
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(90.0, 50.0)));

        assert_eq!(engine.pointer_up(20.0), PointerUp::Dragged(MarkerId(0)));
        assert!(!engine.markers()[0].dragging);
        assert_eq!(engine.markers()[0].z_index, 1);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(50.0, 50.0)).unwrap();
        engine.pointer_move(PointF::new(-100.0, 1000.0));
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(0.0, 260.0)));
    }

    #[test]
    fn test_drag_follow_eases() {
        let mut engine = engine_at(&[(0.0, 0.0)]);
        engine.cfg.drag_follow = 0.5;
        engine.pointer_down(MarkerId(0), PointF::new(0.0, 0.0)).unwrap();
        engine.pointer_move(PointF::new(100.0, 0.0));
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(50.0, 0.0)));
    }

    #[test]
    fn test_click_opens_detail() {
        let mut engine = engine_at(&[(50.0, 50.0), (200.0, 200.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(60.0, 60.0)).unwrap();
        // Jitter under the threshold is still a click
        engine.pointer_move(PointF::new(62.0, 61.0));
        assert_eq!(engine.pointer_up(10.0), PointerUp::Click(MarkerId(0)));

        let detail = engine.detail().unwrap();
        assert_eq!(detail.review_id, "r0");
        assert_eq!(detail.review.unwrap().text, "Soft fabric");
        assert!(engine.markers()[0].selected);
        assert!(!engine.markers()[1].selected);
    }

    #[test]
    fn test_drag_suppresses_click() {
        let mut engine = engine_at(&[(50.0, 50.0), (200.0, 200.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(60.0, 60.0)).unwrap();
        engine.pointer_move(PointF::new(120.0, 60.0));
        engine.pointer_up(100.0);

        assert_eq!(engine.activate(MarkerId(0), 110.0), Ok(false));
        assert!(engine.detail().is_none());
        // After the window, clicks work again
        assert_eq!(engine.activate(MarkerId(0), 300.0), Ok(true));
    }

    #[test]
    fn test_single_detail_and_close() {
        let mut engine = engine_at(&[(50.0, 50.0), (200.0, 200.0)]);
        engine.activate(MarkerId(0), 0.0).unwrap();
        engine.activate(MarkerId(1), 1.0).unwrap();
        assert_eq!(engine.selected(), Some(MarkerId(1)));
        assert_eq!(engine.markers().iter().filter(|m| m.selected).count(), 1);
        // No record for r1
        assert!(engine.detail().unwrap().review.is_none());

        engine.close_detail();
        assert!(engine.detail().is_none());
        assert!(engine.markers().iter().all(|m| !m.selected));
    }

    #[test]
    fn test_unknown_marker() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        assert_eq!(
            engine.pointer_down(MarkerId(5), PointF::default()),
            Err(LayoutError::UnknownMarker(MarkerId(5)))
        );
        assert!(engine.activate(MarkerId(5), 0.0).is_err());
    }

    #[test]
    fn test_pushed_marker_is_flagged_for_animation() {
        let mut engine = engine_at(&[(50.0, 50.0), (150.0, 50.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(50.0, 50.0)).unwrap();
        let pushes = engine.pointer_move(PointF::new(140.0, 50.0));
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].marker, MarkerId(1));
        assert!(engine.markers()[1].animate);
        assert!(!engine.markers()[0].animate);
    }

    #[test]
    fn test_pointer_down_ignored_while_rotating() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        engine.toggle_auto_rotate();
        engine.pointer_down(MarkerId(0), PointF::new(50.0, 50.0)).unwrap();
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_starting_rotation_cancels_drag() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        engine.pointer_down(MarkerId(0), PointF::new(50.0, 50.0)).unwrap();
        assert_eq!(engine.toggle_auto_rotate(), RotateToggle::Started);
        assert!(!engine.is_dragging());
        assert_eq!(engine.pointer_up(2.0), PointerUp::Idle);
    }

    #[test]
    fn test_resize_reclamps() {
        let mut engine = engine_at(&[(350.0, 250.0)]);
        engine.resize(SizeF::new(200.0, 100.0));
        assert_eq!(engine.position(MarkerId(0)), Some(PointF::new(160.0, 60.0)));
    }

    #[test]
    fn test_frame_json() {
        let mut engine = engine_at(&[(50.0, 50.0)]);
        engine.activate(MarkerId(0), 0.0).unwrap();
        let json: serde_json::Value = serde_json::from_str(&engine.frame().to_json()).unwrap();
        assert_eq!(json["markers"][0]["x"], 50.0);
        assert_eq!(json["markers"][0]["selected"], true);
        assert_eq!(json["detail"]["review"]["rating"], 4);
        assert_eq!(json["auto_rotate"], false);
        assert!(json.get("error").is_none());
    }
}
