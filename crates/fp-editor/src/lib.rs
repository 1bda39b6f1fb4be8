pub mod input;
pub mod listen;
pub mod placement;
pub mod planner;
pub mod selection;
pub mod shortcuts;
pub mod zoom;

pub use input::{InputEvent, Modifiers};
pub use listen::{ListenTarget, ListenerGuard, ListenerRegistry};
pub use placement::ResourceSelection;
pub use planner::{ClickOutcome, Handled, LayoutMutation, PlannerSession, SaveStatus, Tooltip};
pub use selection::{AreaSelectTool, Cursor, SelectionPhase, Snapping};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use zoom::{ViewController, ZoomState};
