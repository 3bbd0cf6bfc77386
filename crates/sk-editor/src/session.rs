//! Annotation session.
//!
//! One `Session` per preview surface. It owns the overlay model, the
//! interaction machine, toggles, detector readiness, the sketch cache and
//! the notice log, and is the only place the model is written. Hosts feed
//! it pointer/key events, toolbar actions, container sizes and detection
//! results, then call [`Session::render`] when a frame is due.

use crate::input::InputEvent;
use crate::interaction::{InteractionMachine, PointerContext, Redraw, Transition};
use crate::mutation::{OverlayMutation, apply_mutation};
use crate::schedule::{FrameScheduler, ResizeDebouncer};
use crate::shortcuts::{ShortcutContext, ShortcutMap, UiAction};
use crate::ui_state::{UiInputs, UiState};
use sk_core::{
    AssetError, AssetFetcher, AssetStore, CanvasSize, DetectionError, DetectionTicket, Detections,
    DetectorKind, DetectorStatus, EngineConfig, Fit, GeometryError, InteractionMode,
    LandmarkDetector, Notice, NoticeLog, OverlayModel, Point, RgbaImage, fit_image_to_container,
    load_model_asset, rescale_factor,
};
use sk_render::{DrawSurface, RenderState, SketchCache, composite};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LoadedImage {
    generation: u64,
    natural_w: f32,
    natural_h: f32,
}

/// What a pointer or key event asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub redraw: Redraw,
    /// Toolbar or cursor state changed; re-read [`Session::ui_state`].
    pub ui_changed: bool,
}

pub struct Session {
    config: EngineConfig,
    model: OverlayModel,
    machine: InteractionMachine,
    image: Option<LoadedImage>,
    generation: u64,
    canvas: CanvasSize,
    fit: Option<Fit>,
    show_face: bool,
    show_pose: bool,
    show_sketch: bool,
    face_status: DetectorStatus,
    pose_status: DetectorStatus,
    /// Open face-selection prompt, holding the face count.
    face_prompt: Option<usize>,
    /// Faces arrived during grid definition; prompt once it ends.
    face_prompt_deferred: bool,
    detection_requests: SmallVec<[DetectionTicket; 2]>,
    sketch: SketchCache,
    notices: NoticeLog,
    frames: FrameScheduler,
    resize: ResizeDebouncer,
    /// Last face warned about from a render report.
    reported_face_issue: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let resize = ResizeDebouncer::new(config.resize_debounce_ms);
        Self {
            config,
            model: OverlayModel::new(),
            machine: InteractionMachine::new(),
            image: None,
            generation: 0,
            canvas: CanvasSize::ZERO,
            fit: None,
            show_face: false,
            show_pose: false,
            show_sketch: false,
            face_status: DetectorStatus::Loading,
            pose_status: DetectorStatus::Loading,
            face_prompt: None,
            face_prompt_deferred: false,
            detection_requests: SmallVec::new(),
            sketch: SketchCache::new(),
            notices: NoticeLog::new(),
            frames: FrameScheduler::new(),
            resize,
            reported_face_issue: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &OverlayModel {
        &self.model
    }

    pub fn mode(&self) -> InteractionMode {
        self.machine.mode()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn fit(&self) -> Option<Fit> {
        self.fit
    }

    pub fn image_generation(&self) -> Option<u64> {
        self.image.map(|i| i.generation)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn show_face(&self) -> bool {
        self.show_face
    }

    pub fn show_pose(&self) -> bool {
        self.show_pose
    }

    pub fn show_sketch(&self) -> bool {
        self.show_sketch
    }

    pub fn face_prompt(&self) -> Option<usize> {
        self.face_prompt
    }

    pub fn detector_status(&self, kind: DetectorKind) -> DetectorStatus {
        match kind {
            DetectorKind::Face => self.face_status,
            DetectorKind::Pose => self.pose_status,
        }
    }

    pub fn sketch_cache(&self) -> &SketchCache {
        &self.sketch
    }

    /// A render has been requested and not yet performed.
    pub fn frame_pending(&self) -> bool {
        self.frames.is_pending()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ─── Image lifecycle ─────────────────────────────────────────────────

    fn clear_image_state(&mut self) {
        self.model.clear();
        self.machine.reset();
        self.show_face = false;
        self.show_pose = false;
        self.face_prompt = None;
        self.face_prompt_deferred = false;
        self.detection_requests.clear();
        self.sketch.invalidate();
        self.resize.cancel();
        self.reported_face_issue = None;
    }

    /// Start a new image and fit it into the container. Returns the image
    /// generation that detection tickets will carry.
    pub fn load_image(
        &mut self,
        natural_w: f32,
        natural_h: f32,
        container_w: f32,
        container_h: f32,
    ) -> u64 {
        self.clear_image_state();
        self.generation += 1;
        self.image = Some(LoadedImage {
            generation: self.generation,
            natural_w,
            natural_h,
        });
        if let Err(e) = self.resize_container(container_w, container_h) {
            log::warn!("image {} loaded without a canvas: {e}", self.generation);
        }
        self.notices.push(Notice::success(
            "Image loaded. Ready for detection or manual grid.",
        ));
        self.frames.request();
        self.generation
    }

    /// Drop the image and every overlay. Late detection results become stale.
    pub fn reset(&mut self) {
        self.clear_image_state();
        self.generation += 1;
        self.image = None;
        self.canvas = CanvasSize::ZERO;
        self.fit = None;
        self.notices
            .push(Notice::info("Preview reset. Upload a new image or drop it here."));
        self.frames.request();
    }

    /// The image was loaded from another origin and its pixels cannot be read.
    pub fn warn_cross_origin(&mut self) {
        self.notices.push(Notice::warning(
            "Image loaded, but it's from a different origin without CORS headers. Landmark detection might not work.",
        ));
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Refit the canvas to a container size and rescale overlay geometry.
    ///
    /// # Errors
    /// Invalid dimensions or no image: the canvas and overlays are left
    /// untouched and the sketch cache is invalidated.
    pub fn resize_container(
        &mut self,
        container_w: f32,
        container_h: f32,
    ) -> Result<Fit, GeometryError> {
        let Some(image) = self.image else {
            log::warn!("resize skipped: no image");
            self.sketch.invalidate();
            return Err(GeometryError::NoImage);
        };
        let fit = match fit_image_to_container(
            image.natural_w,
            image.natural_h,
            container_w,
            container_h,
        ) {
            Ok(fit) => fit,
            Err(e) => {
                log::warn!("resize skipped: {e}");
                self.sketch.invalidate();
                return Err(e);
            }
        };

        let old = self.canvas;
        let new = CanvasSize::new(fit.rendered.width.max(0.0), fit.rendered.height.max(0.0));
        if new.pixel_dims() != old.pixel_dims() {
            self.sketch.invalidate();
        }
        self.canvas = new;
        self.fit = Some(fit);

        if let Some(factor) = rescale_factor(old, new, self.config.rescale_epsilon) {
            log::debug!(
                "rescale overlays by {factor} ({}x{} -> {}x{})",
                old.width,
                old.height,
                new.width,
                new.height
            );
            self.apply_one(OverlayMutation::Rescale(factor));
            self.machine.rescale(factor);
        } else if old.width <= 0.0
            && !new.is_empty()
            && self.model.poses.is_empty()
            && self.model.pose_raw.as_ref().is_some_and(|raw| !raw.is_empty())
        {
            self.apply_one(OverlayMutation::RestorePoses { canvas: new });
        }

        self.frames.request();
        Ok(fit)
    }

    /// Debounced resize; applied by [`Session::poll`] after the quiet period.
    pub fn request_resize(&mut self, container_w: f32, container_h: f32, now_ms: f64) {
        self.resize.schedule(container_w, container_h, now_ms);
    }

    /// Drive timers. Returns whether a render is due.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if let Some((w, h)) = self.resize.poll(now_ms)
            && let Err(e) = self.resize_container(w, h)
        {
            log::debug!("debounced resize to {w}x{h} not applied: {e}");
        }
        self.frames.is_pending()
    }

    // ─── Mutation plumbing ───────────────────────────────────────────────

    fn apply_one(&mut self, mutation: OverlayMutation) -> bool {
        let applied = apply_mutation(&mut self.model, &mutation);
        if !applied {
            log::debug!("mutation had no effect: {mutation:?}");
        }
        applied
    }

    fn apply(&mut self, transition: Transition) -> Outcome {
        let Transition {
            mutations,
            notices,
            redraw,
            ui_changed,
        } = transition;
        for mutation in mutations {
            self.apply_one(mutation);
        }
        self.notices.extend(notices);
        let prompted = self.open_deferred_face_prompt();
        if redraw != Redraw::None || prompted {
            self.frames.request();
        }
        Outcome {
            redraw,
            ui_changed: ui_changed || prompted,
        }
    }

    /// Open a face prompt held back during grid definition. Returns whether
    /// the prompt opened.
    fn open_deferred_face_prompt(&mut self) -> bool {
        if !self.face_prompt_deferred || self.machine.mode().is_defining_grid() {
            return false;
        }
        self.face_prompt_deferred = false;
        let count = self.model.face_count();
        if !self.show_face || count < 2 || self.model.selected_face.is_some() {
            return false;
        }
        self.notices.push(Notice::info("Select face for grid."));
        self.face_prompt = Some(count);
        true
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    fn pointer_blocked(&self) -> bool {
        self.image.is_none() || self.canvas.is_empty() || self.face_prompt.is_some()
    }

    pub fn pointer_down(&mut self, p: Point) -> Outcome {
        if self.pointer_blocked() {
            return Outcome::default();
        }
        let ctx = PointerContext {
            model: &self.model,
            canvas: self.canvas,
            pose_visible: self.show_pose,
            config: &self.config,
        };
        let t = self.machine.pointer_down(p, &ctx);
        self.apply(t)
    }

    pub fn pointer_move(&mut self, p: Point) -> Outcome {
        if self.pointer_blocked() {
            return Outcome::default();
        }
        let ctx = PointerContext {
            model: &self.model,
            canvas: self.canvas,
            pose_visible: self.show_pose,
            config: &self.config,
        };
        let t = self.machine.pointer_move(p, &ctx);
        self.apply(t)
    }

    pub fn pointer_up(&mut self) -> Outcome {
        let ctx = PointerContext {
            model: &self.model,
            canvas: self.canvas,
            pose_visible: self.show_pose,
            config: &self.config,
        };
        let t = self.machine.pointer_up(&ctx);
        self.apply(t)
    }

    /// Resolve a key through the shortcut map and dispatch it.
    /// Returns the action when one was bound and had an effect.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<UiAction> {
        let ctx = ShortcutContext {
            face_prompt: self.face_prompt,
            defining_grid: self.machine.mode().is_defining_grid(),
        };
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta, ctx)?;
        self.dispatch(action).then_some(action)
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Outcome {
        match event {
            InputEvent::PointerDown(p) => self.pointer_down(*p),
            InputEvent::PointerMove(p) => self.pointer_move(*p),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => match self.handle_key(key, *ctrl, *shift, *alt, *meta) {
                Some(_) => Outcome {
                    redraw: Redraw::Now,
                    ui_changed: true,
                },
                None => Outcome::default(),
            },
        }
    }

    // ─── UI actions ──────────────────────────────────────────────────────

    /// Apply a toolbar/prompt/keyboard action. Returns `false` when guarded off.
    pub fn dispatch(&mut self, action: UiAction) -> bool {
        log::debug!("dispatch {}", action.name());
        let changed = match action {
            UiAction::ToggleFace => self.toggle_face(),
            UiAction::TogglePose => self.toggle_pose(),
            UiAction::ToggleGrid => self.toggle_grid(),
            UiAction::ConfirmGrid => {
                let t = self.machine.confirm(&self.model);
                if t.is_noop() {
                    false
                } else {
                    self.apply(t);
                    true
                }
            }
            UiAction::CancelGrid => {
                if !self.machine.mode().is_defining_grid() {
                    return false;
                }
                self.notices
                    .push(Notice::info("Manual grid definition cancelled."));
                let t = self.machine.cancel_grid();
                self.apply(t);
                true
            }
            UiAction::SelectFace(index) => self.select_face(index),
            UiAction::CancelFaceSelection => {
                if self.face_prompt.take().is_none() {
                    return false;
                }
                self.notices.push(Notice::info("Face selection cancelled."));
                self.apply_one(OverlayMutation::SelectFace(None));
                true
            }
            UiAction::ToggleSketch => self.toggle_sketch(),
            UiAction::ClearOverlays => self.clear_overlays(),
        };
        if changed {
            self.frames.request();
        }
        changed
    }

    fn detector_toggle_enabled(&self, kind: DetectorKind) -> bool {
        self.image.is_some()
            && self.detector_status(kind).is_ready()
            && !self.machine.mode().is_defining_grid()
    }

    fn toggle_face(&mut self) -> bool {
        if !self.detector_toggle_enabled(DetectorKind::Face) {
            return false;
        }
        self.show_face = !self.show_face;
        if !self.show_face {
            self.notices.push(Notice::info("Hiding face landmarks/grid."));
            self.face_prompt = None;
            self.face_prompt_deferred = false;
            return true;
        }

        self.notices.push(Notice::info("Showing face landmarks/grid..."));
        match &self.model.faces {
            None => self.begin_detection(DetectorKind::Face),
            Some(faces) if faces.len() > 1 && self.model.selected_face.is_none() => {
                let count = faces.len();
                self.notices.push(Notice::info("Select face for grid."));
                self.face_prompt = Some(count);
            }
            Some(_) => {}
        }
        true
    }

    fn toggle_pose(&mut self) -> bool {
        if !self.detector_toggle_enabled(DetectorKind::Pose) {
            return false;
        }
        self.show_pose = !self.show_pose;
        if !self.show_pose {
            self.notices.push(Notice::info("Hiding pose landmarks."));
            return true;
        }

        self.notices.push(Notice::info("Showing pose landmarks..."));
        match &self.model.pose_raw {
            None => self.begin_detection(DetectorKind::Pose),
            Some(raw) if self.model.poses.is_empty() && !raw.is_empty() => {
                self.notices
                    .push(Notice::info("Restoring previous pose data..."));
                self.apply_one(OverlayMutation::RestorePoses {
                    canvas: self.canvas,
                });
            }
            Some(_) => {}
        }
        true
    }

    fn toggle_grid(&mut self) -> bool {
        if self.image.is_none() {
            return false;
        }

        // A confirmed grid turns the button into a show/hide switch.
        if self.model.confirmed.is_some() {
            let t = self.machine.cancel_grid();
            self.apply(t);
            let show = !self.model.show_confirmed;
            self.apply_one(OverlayMutation::SetConfirmedVisible(show));
            self.notices.push(Notice::info(if show {
                "Showing confirmed manual grid."
            } else {
                "Hiding confirmed manual grid."
            }));
            return true;
        }

        let mode = self.machine.mode();
        let t = match mode {
            InteractionMode::Idle => {
                self.face_prompt = None;
                self.machine.arm_grid()
            }
            m if m.is_defining_grid() => {
                let text = match m {
                    InteractionMode::DrawingGrid { .. } => {
                        "Manual grid drawing cancelled by icon click."
                    }
                    InteractionMode::GridArmed => "Exiting manual grid mode via icon click.",
                    _ => "Manual grid adjustment cancelled by icon click.",
                };
                self.notices.push(Notice::info(text));
                self.machine.cancel_grid()
            }
            _ => return false,
        };
        self.apply(t);
        true
    }

    fn select_face(&mut self, index: usize) -> bool {
        if !self.apply_one(OverlayMutation::SelectFace(Some(index))) {
            return false;
        }
        self.face_prompt = None;
        self.face_prompt_deferred = false;
        self.reported_face_issue = None;
        self.notices.push(Notice::success(format!(
            "Selected Face {} for grid.",
            index + 1
        )));
        true
    }

    fn toggle_sketch(&mut self) -> bool {
        if self.image.is_none() {
            return false;
        }
        self.show_sketch = !self.show_sketch;
        self.notices.push(Notice::info(if self.show_sketch {
            "Applying pencil sketch effect..."
        } else {
            "Removing pencil sketch effect."
        }));
        true
    }

    fn clear_overlays(&mut self) -> bool {
        if self.image.is_none() {
            self.notices
                .push(Notice::info("No image loaded to clear overlays from."));
            return false;
        }
        self.notices
            .push(Notice::info("Clearing overlays and detection data..."));

        let mut cleared = false;
        if self.show_face {
            self.show_face = false;
            self.face_prompt = None;
            self.face_prompt_deferred = false;
            self.apply_one(OverlayMutation::ClearFaces);
            cleared = true;
        }
        if self.show_pose {
            self.show_pose = false;
            self.apply_one(OverlayMutation::ClearPoses);
            cleared = true;
        }
        if self.model.show_confirmed
            || self.model.confirmed.is_some()
            || self.machine.mode().is_defining_grid()
        {
            self.apply_one(OverlayMutation::ClearGrid);
            cleared = true;
        }

        if cleared {
            self.machine.reset();
            self.detection_requests.clear();
        } else {
            self.notices.push(Notice::info("No active overlays to clear."));
        }
        cleared
    }

    // ─── Detection ───────────────────────────────────────────────────────

    fn begin_detection(&mut self, kind: DetectorKind) {
        let Some(generation) = self.image_generation() else {
            return;
        };
        if !self.detector_status(kind).is_ready() {
            self.notices.push(Notice::warning(format!(
                "{} landmarker not ready or no image.",
                kind.label()
            )));
            return;
        }
        self.notices.push(Notice::info(format!(
            "Running {} detection...",
            kind.label().to_lowercase()
        )));
        self.detection_requests.retain(|t| t.kind != kind);
        self.detection_requests
            .push(DetectionTicket { kind, generation });
    }

    /// Outstanding detection requests, handed to the host once.
    pub fn take_detection_requests(&mut self) -> Vec<DetectionTicket> {
        self.detection_requests.drain(..).collect()
    }

    /// Apply a detector result. Returns `false` when the ticket is stale or
    /// the overlay was switched off while the detector ran.
    pub fn finish_detection(
        &mut self,
        ticket: DetectionTicket,
        result: Result<Detections, DetectionError>,
    ) -> bool {
        if self.image_generation() != Some(ticket.generation) {
            log::debug!(
                "dropping stale {} result for image {}",
                ticket.kind.label(),
                ticket.generation
            );
            return false;
        }
        let showing = match ticket.kind {
            DetectorKind::Face => self.show_face,
            DetectorKind::Pose => self.show_pose,
        };
        if !showing {
            log::debug!("{} overlay is off, result dropped", ticket.kind.label());
            return false;
        }

        match (ticket.kind, result) {
            (DetectorKind::Face, Ok(faces)) if !faces.is_empty() => {
                let count = faces.len();
                self.notices
                    .push(Notice::success(format!("Found {count} face(s).")));
                self.apply_one(OverlayMutation::SetFaceDetections(faces));
                self.reported_face_issue = None;
                self.face_prompt_deferred = false;
                if count > 1 {
                    if self.machine.mode().is_defining_grid() {
                        log::debug!("face prompt deferred until grid definition ends");
                        self.face_prompt_deferred = true;
                    } else {
                        self.notices.push(Notice::info("Select face for grid."));
                        self.face_prompt = Some(count);
                    }
                }
            }
            (DetectorKind::Face, Ok(_)) => {
                self.notices.push(Notice::info("No faces detected."));
                self.apply_one(OverlayMutation::ClearFaces);
                self.show_face = false;
            }
            (DetectorKind::Face, Err(e)) => {
                self.notices.push(Notice::error(format!(
                    "Face detection failed: {}",
                    failure_reason(&e)
                )));
                self.apply_one(OverlayMutation::ClearFaces);
                self.show_face = false;
            }
            (DetectorKind::Pose, Ok(poses)) if !poses.is_empty() => {
                self.notices.push(Notice::success(format!(
                    "Found {} pose(s).",
                    poses.len()
                )));
                self.apply_one(OverlayMutation::SetPoseDetections {
                    raw: poses,
                    canvas: self.canvas,
                });
            }
            (DetectorKind::Pose, Ok(_)) => {
                self.notices.push(Notice::info("No poses detected."));
                self.apply_one(OverlayMutation::ClearPoses);
                self.show_pose = false;
            }
            (DetectorKind::Pose, Err(e)) => {
                self.notices.push(Notice::error(format!(
                    "Pose detection failed: {}",
                    failure_reason(&e)
                )));
                self.apply_one(OverlayMutation::ClearPoses);
                self.show_pose = false;
            }
        }
        self.frames.request();
        true
    }

    /// Run an in-process detector against its outstanding request, if any.
    pub fn run_detector(&mut self, detector: &mut dyn LandmarkDetector, image: &RgbaImage) -> bool {
        let kind = detector.kind();
        let Some(pos) = self.detection_requests.iter().position(|t| t.kind == kind) else {
            return false;
        };
        let ticket = self.detection_requests.remove(pos);
        let result = detector.detect(image);
        self.finish_detection(ticket, result)
    }

    pub fn set_detector_status(&mut self, kind: DetectorKind, status: DetectorStatus) {
        let previous = self.detector_status(kind);
        match kind {
            DetectorKind::Face => self.face_status = status,
            DetectorKind::Pose => self.pose_status = status,
        }
        match status {
            DetectorStatus::Ready if previous != DetectorStatus::Ready => {
                self.notices.push(Notice::success(format!(
                    "{} Landmarker loaded.",
                    kind.label()
                )));
            }
            DetectorStatus::Unavailable => {
                match kind {
                    DetectorKind::Face => {
                        self.show_face = false;
                        self.face_prompt = None;
                        self.face_prompt_deferred = false;
                    }
                    DetectorKind::Pose => self.show_pose = false,
                }
                self.detection_requests.retain(|t| t.kind != kind);
                self.frames.request();
            }
            _ => {}
        }
    }

    /// Fetch (or read from cache) the model asset for `kind`.
    ///
    /// # Errors
    /// The asset could not be obtained; the detector is marked unavailable.
    pub fn load_detector_asset(
        &mut self,
        kind: DetectorKind,
        store: &mut dyn AssetStore,
        fetcher: &mut dyn AssetFetcher,
    ) -> Result<Vec<u8>, AssetError> {
        let label = kind.label();
        self.notices.push(Notice::info(format!(
            "Loading {label} Landmarker model..."
        )));
        let asset = match kind {
            DetectorKind::Face => self.config.face_model.clone(),
            DetectorKind::Pose => self.config.pose_model.clone(),
        };
        load_model_asset(store, fetcher, &asset, &mut self.notices).inspect_err(|_| {
            self.notices.push(Notice::error(format!(
                "Failed to load {label} Landmarker model asset."
            )));
            self.set_detector_status(kind, DetectorStatus::Unavailable);
        })
    }

    // ─── Render ──────────────────────────────────────────────────────────

    /// Composite one frame onto `surface` (sized to [`Session::canvas`]) and
    /// return the UI state for it.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> UiState {
        self.frames.take();
        if surface.size() != self.canvas {
            log::debug!(
                "surface {:?} does not match canvas {:?}",
                surface.size(),
                self.canvas
            );
        }

        let state = RenderState {
            model: &self.model,
            mode: self.machine.mode(),
            show_face: self.show_face,
            show_pose: self.show_pose,
            show_sketch: self.show_sketch,
            image_generation: self.image_generation(),
            config: &self.config,
        };
        let report = composite(surface, &state, &mut self.sketch);

        if let Some(e) = report.sketch_failed {
            log::warn!("pencil sketch failed: {e}");
            self.show_sketch = false;
            self.sketch.invalidate();
            self.notices.push(Notice::warning(
                "Could not apply pencil sketch. Displaying original.",
            ));
        }

        let issue = report.face_grid_skipped.or(report.selected_face_empty);
        if issue.is_some() && issue != self.reported_face_issue {
            if let Some(index) = report.face_grid_skipped {
                self.notices.push(Notice::warning(format!(
                    "Could not determine size for face grid (Face {}).",
                    index + 1
                )));
            } else if let Some(index) = report.selected_face_empty {
                self.notices.push(Notice::info(format!(
                    "No landmarks available for selected Face {}.",
                    index + 1
                )));
            }
        }
        self.reported_face_issue = issue;

        self.ui_state()
    }

    pub fn ui_state(&self) -> UiState {
        UiState::build(
            &UiInputs {
                image_loaded: self.image.is_some(),
                mode: self.machine.mode(),
                hover: self.machine.hover(),
                show_face: self.show_face,
                show_pose: self.show_pose,
                show_sketch: self.show_sketch,
                face_status: self.face_status,
                pose_status: self.pose_status,
                model: &self.model,
                face_prompt: self.face_prompt,
                canvas: self.canvas,
            },
            self.config.handle_size,
        )
    }
}

fn failure_reason(e: &DetectionError) -> String {
    match e {
        DetectionError::Failed(reason) => reason.clone(),
        other => other.to_string(),
    }
}
