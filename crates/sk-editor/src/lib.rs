pub mod input;
pub mod interaction;
pub mod mutation;
pub mod schedule;
pub mod session;
pub mod shortcuts;
pub mod ui_state;

pub use input::{CanvasOrigin, InputEvent, PointerSample, PointerSource};
pub use interaction::{Hover, InteractionMachine, PointerContext, Redraw, Transition};
pub use mutation::{OverlayMutation, apply_mutation};
pub use schedule::{FrameScheduler, ResizeDebouncer};
pub use session::{Outcome, Session};
pub use shortcuts::{ShortcutContext, ShortcutMap, UiAction};
pub use ui_state::{CursorClass, DisabledReason, ToggleState, UiInputs, UiState};
