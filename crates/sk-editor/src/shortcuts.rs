//! UI actions and keyboard shortcut mapping.
//!
//! Toolbar buttons, the face-selection prompt and keyboard shortcuts all
//! resolve to a [`UiAction`]. The key map lives here so every host shares it.

/// Semantic actions from the toolbar, prompt, or keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ToggleFace,
    TogglePose,
    ToggleGrid,
    ConfirmGrid,
    /// Zero-based face index from the selection prompt.
    SelectFace(usize),
    CancelFaceSelection,
    /// Leave grid definition without touching the confirmed grid.
    CancelGrid,
    ToggleSketch,
    ClearOverlays,
}

impl UiAction {
    /// Parse a host action name. `index` is only read by `select-face`.
    pub fn parse(name: &str, index: Option<usize>) -> Option<Self> {
        Some(match name {
            "toggle-face" => Self::ToggleFace,
            "toggle-pose" => Self::TogglePose,
            "toggle-grid" => Self::ToggleGrid,
            "confirm-grid" => Self::ConfirmGrid,
            "select-face" => Self::SelectFace(index?),
            "cancel-face-selection" => Self::CancelFaceSelection,
            "cancel-grid" => Self::CancelGrid,
            "toggle-sketch" => Self::ToggleSketch,
            "clear-overlays" => Self::ClearOverlays,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleFace => "toggle-face",
            Self::TogglePose => "toggle-pose",
            Self::ToggleGrid => "toggle-grid",
            Self::ConfirmGrid => "confirm-grid",
            Self::SelectFace(_) => "select-face",
            Self::CancelFaceSelection => "cancel-face-selection",
            Self::CancelGrid => "cancel-grid",
            Self::ToggleSketch => "toggle-sketch",
            Self::ClearOverlays => "clear-overlays",
        }
    }
}

/// Session state that changes what a key means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutContext {
    /// Number of faces offered by an open selection prompt.
    pub face_prompt: Option<usize>,
    pub defining_grid: bool,
}

/// Resolves key events into UI actions.
///
/// `ctrl` and `meta` are interchangeable so ⌘ on macOS and Ctrl elsewhere
/// bind the same combos.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value. Returns `None` for unbound combos.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        ctx: ShortcutContext,
    ) -> Option<UiAction> {
        let cmd = ctrl || meta;

        if cmd {
            return match key {
                "Delete" | "Backspace" if !shift && !alt => Some(UiAction::ClearOverlays),
                _ => None,
            };
        }
        if alt {
            return None;
        }

        // The prompt is modal.
        if let Some(count) = ctx.face_prompt {
            return match key {
                "Escape" => Some(UiAction::CancelFaceSelection),
                _ => digit_index(key)
                    .filter(|&i| i < count)
                    .map(UiAction::SelectFace),
            };
        }

        match key {
            "f" | "F" => Some(UiAction::ToggleFace),
            "p" | "P" => Some(UiAction::TogglePose),
            "g" | "G" => Some(UiAction::ToggleGrid),
            "s" | "S" => Some(UiAction::ToggleSketch),
            "Enter" if ctx.defining_grid => Some(UiAction::ConfirmGrid),
            "Escape" if ctx.defining_grid => Some(UiAction::CancelGrid),
            _ => None,
        }
    }
}

/// `"1"`..=`"9"` → `0..=8`.
fn digit_index(key: &str) -> Option<usize> {
    match key.as_bytes() {
        [d @ b'1'..=b'9'] => Some((d - b'1') as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: ShortcutContext = ShortcutContext {
        face_prompt: None,
        defining_grid: false,
    };
    const DEFINING: ShortcutContext = ShortcutContext {
        face_prompt: None,
        defining_grid: true,
    };

    #[test]
    fn resolve_toggles() {
        assert_eq!(
            ShortcutMap::resolve("f", false, false, false, false, IDLE),
            Some(UiAction::ToggleFace)
        );
        assert_eq!(
            ShortcutMap::resolve("P", false, true, false, false, IDLE),
            Some(UiAction::TogglePose)
        );
        assert_eq!(
            ShortcutMap::resolve("g", false, false, false, false, DEFINING),
            Some(UiAction::ToggleGrid)
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, false, IDLE),
            Some(UiAction::ToggleSketch)
        );
    }

    #[test]
    fn resolve_enter_and_escape_only_while_defining() {
        assert_eq!(ShortcutMap::resolve("Enter", false, false, false, false, IDLE), None);
        assert_eq!(ShortcutMap::resolve("Escape", false, false, false, false, IDLE), None);
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, false, DEFINING),
            Some(UiAction::ConfirmGrid)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false, DEFINING),
            Some(UiAction::CancelGrid)
        );
    }

    #[test]
    fn resolve_cmd_delete_clears_overlays() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, true, IDLE),
            Some(UiAction::ClearOverlays)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", true, false, false, false, IDLE),
            Some(UiAction::ClearOverlays)
        );
        assert_eq!(ShortcutMap::resolve("Backspace", false, false, false, false, IDLE), None);
    }

    #[test]
    fn resolve_face_prompt_digits() {
        let prompt = ShortcutContext {
            face_prompt: Some(3),
            defining_grid: false,
        };
        assert_eq!(
            ShortcutMap::resolve("1", false, false, false, false, prompt),
            Some(UiAction::SelectFace(0))
        );
        assert_eq!(
            ShortcutMap::resolve("3", false, false, false, false, prompt),
            Some(UiAction::SelectFace(2))
        );
        assert_eq!(ShortcutMap::resolve("4", false, false, false, false, prompt), None);
        assert_eq!(ShortcutMap::resolve("0", false, false, false, false, prompt), None);
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false, prompt),
            Some(UiAction::CancelFaceSelection)
        );
        // Toggles are swallowed while the prompt is open.
        assert_eq!(ShortcutMap::resolve("f", false, false, false, false, prompt), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false, IDLE), None);
        assert_eq!(ShortcutMap::resolve("1", false, false, false, false, IDLE), None);
        assert_eq!(ShortcutMap::resolve("f", false, false, true, false, IDLE), None);
    }

    #[test]
    fn parse_action_names() {
        assert_eq!(UiAction::parse("toggle-grid", None), Some(UiAction::ToggleGrid));
        assert_eq!(UiAction::parse("select-face", Some(2)), Some(UiAction::SelectFace(2)));
        assert_eq!(UiAction::parse("select-face", None), None);
        assert_eq!(UiAction::parse("explode", None), None);
        assert_eq!(
            UiAction::parse(UiAction::ClearOverlays.name(), None),
            Some(UiAction::ClearOverlays)
        );
    }
}
