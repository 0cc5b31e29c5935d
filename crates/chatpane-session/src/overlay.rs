//! Confirmation modal and toast notifications

use futures::channel::oneshot;

/// How a pending confirmation was dismissed without confirming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    NoButton,
    Backdrop,
    Escape,
}

struct PendingConfirmation {
    message: String,
    responder: oneshot::Sender<bool>,
}

/// Single confirmation modal.
///
/// At most one request is pending. Asking again supersedes the previous
/// request, which then resolves as declined (its sender is dropped).
#[derive(Default)]
pub struct ConfirmDialog {
    pending: Option<PendingConfirmation>,
}

impl std::fmt::Debug for ConfirmDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmDialog")
            .field("message", &self.message())
            .finish()
    }
}

impl ConfirmDialog {
    /// Show the modal. The receiver yields `true` only for an explicit yes;
    /// a dropped sender means the request was superseded.
    pub fn ask(&mut self, message: impl Into<String>) -> oneshot::Receiver<bool> {
        let (responder, receiver) = oneshot::channel();
        if self.pending.is_some() {
            log::debug!("Confirmation superseded by a newer request");
        }
        self.pending = Some(PendingConfirmation { message: message.into(), responder });
        receiver
    }

    pub fn is_visible(&self) -> bool {
        self.pending.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.message.as_str())
    }

    pub fn confirm(&mut self) -> bool {
        self.resolve(true)
    }

    pub fn dismiss(&mut self, how: Dismissal) -> bool {
        log::debug!("Confirmation dismissed via {:?}", how);
        self.resolve(false)
    }

    /// Close the modal and answer the pending request. False if nothing was pending.
    fn resolve(&mut self, answer: bool) -> bool {
        match self.pending.take() {
            Some(pending) => {
                // The asking flow may have gone away; nothing to do then.
                let _ = pending.responder.send(answer);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u32,
}

/// Visible toasts in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: ToastId,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind, duration_ms: u32) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast { id, message: message.into(), kind, duration_ms });
        id
    }

    /// Close a toast. The auto-dismiss timer and the close button may both
    /// fire; only the first one counts.
    pub fn close(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.toasts.iter().any(|toast| toast.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_confirm_yes() {
        let mut dialog = ConfirmDialog::default();
        let answer = dialog.ask("Delete?");
        assert_eq!(dialog.message(), Some("Delete?"));
        assert!(dialog.confirm());
        assert!(!dialog.is_visible());
        assert_eq!(block_on(answer), Ok(true));
    }

    #[test]
    fn test_every_dismissal_declines() {
        for how in [Dismissal::NoButton, Dismissal::Backdrop, Dismissal::Escape] {
            let mut dialog = ConfirmDialog::default();
            let answer = dialog.ask("Delete?");
            assert!(dialog.dismiss(how));
            assert_eq!(block_on(answer), Ok(false));
            assert!(!dialog.dismiss(how));
        }
    }

    #[test]
    fn test_last_request_wins() {
        let mut dialog = ConfirmDialog::default();
        let first = dialog.ask("first");
        let second = dialog.ask("second");
        assert_eq!(dialog.message(), Some("second"));
        assert!(block_on(first).is_err());
        dialog.confirm();
        assert_eq!(block_on(second), Ok(true));
    }

    #[test]
    fn test_toast_close_once() {
        let mut queue = ToastQueue::default();
        let a = queue.push("saved", ToastKind::Success, 4000);
        let b = queue.push("failed", ToastKind::Error, 4000);
        assert!(queue.close(a));
        assert!(!queue.close(a));
        assert!(queue.contains(b));
        assert_eq!(queue.toasts().len(), 1);
        assert_eq!(queue.toasts()[0].kind.css_class(), "error");
    }
}
