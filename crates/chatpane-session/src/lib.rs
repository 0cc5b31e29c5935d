//! Headless model of the chat page
//!
//! Everything the browser client decides lives here: which chat is open,
//! the sidebar rows and their edit/menu/removal phases, the transcript and
//! composer, the confirmation modal and toasts. The wasm crate only reads
//! this state into the DOM and feeds DOM events back in.

pub mod api;
pub mod controller;
pub mod nav;
pub mod overlay;
pub mod page;
pub mod sidebar;
pub mod state;
pub mod transcript;

pub use api::{ChatApi, Platform};
pub use controller::ChatController;
pub use nav::NavState;
pub use overlay::{ConfirmDialog, Dismissal, Toast, ToastId, ToastKind, ToastQueue};
pub use page::{
    ChatPage, Effects, Focus, LinkAction, Navigation, PageSeed, PendingDelete, PendingSend,
    RenamePlan,
};
pub use sidebar::{ChatRow, ClickTarget, RowPart, RowPhase, Sidebar};
pub use state::SessionState;
pub use transcript::{Bubble, BubbleKind, Composer, Transcript};
