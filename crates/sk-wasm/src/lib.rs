//! WASM bridge for Sketchit: exposes the annotation session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM, the
//! detector runtimes and model fetching; everything else runs here.

mod render2d;

use render2d::Canvas2dSurface;
use sk_core::{
    DetectionError, DetectionTicket, Detections, DetectorKind, DetectorStatus, EngineConfig,
    Landmark, Point, Subject,
};
use sk_editor::{CanvasOrigin, Outcome, PointerSample, PointerSource, Redraw, Session, UiAction};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// The WASM-facing controller for one preview canvas.
///
/// Pointer methods take client coordinates plus the canvas element's
/// bounding-rect origin and return `true` when the page should redraw or
/// refresh its toolbar.
#[wasm_bindgen]
pub struct SketchCanvas {
    session: Session,
    /// Source of the last pointer sample, for touch default suppression.
    last_source: PointerSource,
}

#[wasm_bindgen]
impl SketchCanvas {
    /// Create a controller. `config_json` overrides [`EngineConfig`] fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SketchCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => EngineConfig::from_json(json)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?,
            _ => EngineConfig::default(),
        };
        Ok(Self {
            session: Session::new(config),
            last_source: PointerSource::Mouse,
        })
    }

    // ─── Image lifecycle ─────────────────────────────────────────────────

    /// Start a new image. Returns its generation number.
    pub fn load_image(
        &mut self,
        natural_w: f32,
        natural_h: f32,
        container_w: f32,
        container_h: f32,
    ) -> f64 {
        self.session
            .load_image(natural_w, natural_h, container_w, container_h) as f64
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn warn_cross_origin(&mut self) {
        self.session.warn_cross_origin();
    }

    pub fn has_image(&self) -> bool {
        self.session.has_image()
    }

    /// Canvas pixel width the `<canvas>` element should be sized to.
    pub fn canvas_width(&self) -> u32 {
        self.session.canvas().pixel_dims().0
    }

    pub fn canvas_height(&self) -> u32 {
        self.session.canvas().pixel_dims().1
    }

    // ─── Timers ──────────────────────────────────────────────────────────

    /// Container resized; applied after the debounce period by [`Self::tick`].
    pub fn request_resize(&mut self, container_w: f32, container_h: f32, now_ms: f64) {
        self.session.request_resize(container_w, container_h, now_ms);
    }

    /// Drive timers from `requestAnimationFrame`. Returns `true` when a frame is due.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.poll(now_ms)
    }

    pub fn frame_pending(&self) -> bool {
        self.session.frame_pending()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn mouse_down(&mut self, client_x: f32, client_y: f32, left: f32, top: f32) -> bool {
        let p = self.sample(PointerSample::mouse(client_x, client_y), left, top);
        changed(self.session.pointer_down(p))
    }

    pub fn mouse_move(&mut self, client_x: f32, client_y: f32, left: f32, top: f32) -> bool {
        let p = self.sample(PointerSample::mouse(client_x, client_y), left, top);
        changed(self.session.pointer_move(p))
    }

    /// Also used for `mouseleave`.
    pub fn mouse_up(&mut self) -> bool {
        self.last_source = PointerSource::Mouse;
        changed(self.session.pointer_up())
    }

    /// First touch of a `touchstart`.
    pub fn touch_start(&mut self, client_x: f32, client_y: f32, left: f32, top: f32) -> bool {
        let Some(sample) = PointerSample::touch(&[(client_x, client_y)]) else {
            return false;
        };
        let p = self.sample(sample, left, top);
        changed(self.session.pointer_down(p))
    }

    pub fn touch_move(&mut self, client_x: f32, client_y: f32, left: f32, top: f32) -> bool {
        let Some(sample) = PointerSample::touch(&[(client_x, client_y)]) else {
            return false;
        };
        let p = self.sample(sample, left, top);
        changed(self.session.pointer_move(p))
    }

    /// `touchend` and `touchcancel`.
    pub fn touch_end(&mut self) -> bool {
        self.last_source = PointerSource::Touch;
        changed(self.session.pointer_up())
    }

    /// Whether the current touch event should call `preventDefault()`.
    pub fn should_prevent_default(&self) -> bool {
        let sample = PointerSample {
            source: self.last_source,
            client_x: 0.0,
            client_y: 0.0,
        };
        sample.wants_default_prevented(self.session.mode().is_dragging())
    }

    // ─── Keyboard & toolbar ──────────────────────────────────────────────

    /// Returns `true` when the key was bound and acted on.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.session
            .handle_key(key, ctrl, shift, alt, meta)
            .is_some()
    }

    /// Run a toolbar action by name, e.g. `"toggle-face"` or
    /// `"select-face"` with a zero-based index.
    pub fn dispatch(&mut self, action: &str, index: Option<u32>) -> bool {
        match UiAction::parse(action, index.map(|i| i as usize)) {
            Some(a) => self.session.dispatch(a),
            None => {
                log::warn!("unknown action `{action}`");
                false
            }
        }
    }

    // ─── Detection ───────────────────────────────────────────────────────

    /// Pending detection requests as JSON: `[{"kind":"face","generation":1}]`.
    pub fn take_detection_requests(&mut self) -> String {
        let tickets = self.session.take_detection_requests();
        serde_json::to_string(&tickets).unwrap_or_else(|_| "[]".to_string())
    }

    /// Report a detector result. `landmarks_json` is the detector's
    /// `landmarks` array: one array of `{x, y, z, visibility}` per subject.
    pub fn finish_detection(&mut self, kind: &str, generation: f64, landmarks_json: &str) -> bool {
        let Some(kind) = parse_kind(kind) else {
            return false;
        };
        let ticket = DetectionTicket {
            kind,
            generation: generation as u64,
        };
        self.session
            .finish_detection(ticket, parse_landmarks(landmarks_json))
    }

    pub fn fail_detection(&mut self, kind: &str, generation: f64, reason: &str) -> bool {
        let Some(kind) = parse_kind(kind) else {
            return false;
        };
        let ticket = DetectionTicket {
            kind,
            generation: generation as u64,
        };
        self.session
            .finish_detection(ticket, Err(DetectionError::Failed(reason.to_string())))
    }

    /// `status` is `"loading"`, `"ready"` or `"unavailable"`.
    pub fn set_detector_status(&mut self, kind: &str, status: &str) -> bool {
        let (Some(kind), Some(status)) = (parse_kind(kind), parse_status(status)) else {
            log::warn!("unknown detector status `{kind}`/`{status}`");
            return false;
        };
        self.session.set_detector_status(kind, status);
        true
    }

    /// Model asset `{key, url}` for the page's fetch-and-cache step.
    pub fn model_asset(&self, kind: &str) -> String {
        let config = self.session.config();
        let asset = match parse_kind(kind) {
            Some(DetectorKind::Face) => &config.face_model,
            Some(DetectorKind::Pose) => &config.pose_model,
            None => return "null".to_string(),
        };
        serde_json::to_string(asset).unwrap_or_else(|_| "null".to_string())
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Composite one frame. Returns the UI state as JSON.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, image: Option<HtmlImageElement>) -> String {
        let mut surface = Canvas2dSurface::new(ctx, image.as_ref(), self.session.canvas());
        let ui = self.session.render(&mut surface);
        serde_json::to_string(&ui).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn ui_state(&self) -> String {
        serde_json::to_string(&self.session.ui_state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Notices since the last call, as `[{"level":"info","text":"..."}]`.
    pub fn drain_notices(&mut self) -> String {
        serde_json::to_string(&self.session.drain_notices()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl SketchCanvas {
    fn sample(&mut self, sample: PointerSample, left: f32, top: f32) -> Point {
        self.last_source = sample.source;
        sample.canvas_position(CanvasOrigin { left, top })
    }
}

fn changed(outcome: Outcome) -> bool {
    outcome.ui_changed || outcome.redraw != Redraw::None
}

fn parse_kind(kind: &str) -> Option<DetectorKind> {
    match kind {
        "face" => Some(DetectorKind::Face),
        "pose" => Some(DetectorKind::Pose),
        _ => None,
    }
}

fn parse_status(status: &str) -> Option<DetectorStatus> {
    match status {
        "loading" => Some(DetectorStatus::Loading),
        "ready" => Some(DetectorStatus::Ready),
        "unavailable" => Some(DetectorStatus::Unavailable),
        _ => None,
    }
}

fn parse_landmarks(json: &str) -> Result<Detections, DetectionError> {
    let subjects: Vec<Vec<Landmark>> = serde_json::from_str(json)
        .map_err(|e| DetectionError::Failed(format!("malformed landmarks: {e}")))?;
    Ok(Detections {
        subjects: subjects
            .into_iter()
            .map(|points| Subject { points })
            .collect(),
    })
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Sketchit WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn landmarks_from_detector_shape() {
        let json = r#"[[{"x":0.5,"y":0.25,"z":-0.1,"visibility":0.9},{"x":0.1,"y":0.2,"z":0}],[]]"#;
        let det = parse_landmarks(json).unwrap();
        assert_eq!(det.len(), 2);
        assert_eq!(
            det.subjects[0].points[0],
            Landmark {
                x: 0.5,
                y: 0.25,
                visibility: Some(0.9)
            }
        );
        assert_eq!(det.subjects[0].points[1].visibility, None);
        assert!(det.subjects[1].points.is_empty());
    }

    #[test]
    fn malformed_landmarks_are_a_detection_failure() {
        assert!(matches!(
            parse_landmarks("{\"oops\":1}"),
            Err(DetectionError::Failed(_))
        ));
    }

    #[test]
    fn detector_names() {
        assert_eq!(parse_kind("pose"), Some(DetectorKind::Pose));
        assert_eq!(parse_kind("hand"), None);
        assert_eq!(parse_status("unavailable"), Some(DetectorStatus::Unavailable));
        assert_eq!(parse_status("READY"), None);
    }

    #[test]
    fn only_live_outcomes_count_as_changes() {
        assert!(!changed(Outcome::default()));
        assert!(changed(Outcome {
            redraw: Redraw::Frame,
            ui_changed: false
        }));
    }
}
