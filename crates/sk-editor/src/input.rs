//! Input abstraction layer.
//!
//! Mouse and touch events both reduce to a [`PointerSample`]; one function
//! turns a sample into canvas coordinates.

use sk_core::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Viewport-relative top-left of the canvas element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasOrigin {
    pub left: f32,
    pub top: f32,
}

/// One pointer position in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub source: PointerSource,
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerSample {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        Self {
            source: PointerSource::Mouse,
            client_x,
            client_y,
        }
    }

    /// First active touch; `None` when the list is empty (touchend).
    pub fn touch(touches: &[(f32, f32)]) -> Option<Self> {
        touches.first().map(|&(client_x, client_y)| Self {
            source: PointerSource::Touch,
            client_x,
            client_y,
        })
    }

    pub fn canvas_position(&self, origin: CanvasOrigin) -> Point {
        Point::new(self.client_x - origin.left, self.client_y - origin.top)
    }

    /// Touch gestures on the canvas must suppress page scrolling while a drag is live.
    pub fn wants_default_prevented(&self, dragging: bool) -> bool {
        self.source == PointerSource::Touch && dragging
    }
}

/// A normalized input event, canvas-space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl InputEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown(p) | Self::PointerMove(p) => Some(*p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_and_touch_share_coordinates() {
        let origin = CanvasOrigin {
            left: 40.0,
            top: 12.5,
        };
        let m = PointerSample::mouse(140.0, 112.5).canvas_position(origin);
        let t = PointerSample::touch(&[(140.0, 112.5), (0.0, 0.0)])
            .unwrap()
            .canvas_position(origin);
        assert_eq!(m, Point::new(100.0, 100.0));
        assert_eq!(m, t);
    }

    #[test]
    fn empty_touch_list_has_no_sample() {
        assert_eq!(PointerSample::touch(&[]), None);
    }

    #[test]
    fn only_dragging_touch_prevents_default() {
        let t = PointerSample::touch(&[(1.0, 1.0)]).unwrap();
        assert!(t.wants_default_prevented(true));
        assert!(!t.wants_default_prevented(false));
        assert!(!PointerSample::mouse(1.0, 1.0).wants_default_prevented(true));
    }
}
