use chatpane_types::ChatId;

/// Page-wide UI state shared by every handler.
///
/// At most one sidebar row is being edited and at most one options menu is
/// open. Granting either slot hands back the previous holder so the caller
/// can restore it before the new one takes over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    current_chat_id: Option<ChatId>,
    waiting_for_response: bool,
    active_edit: Option<ChatId>,
    open_menu: Option<ChatId>,
}

impl SessionState {
    pub fn new(current_chat_id: Option<ChatId>) -> Self {
        Self { current_chat_id, ..Self::default() }
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    pub fn is_current(&self, chat_id: &str) -> bool {
        self.current_chat_id() == Some(chat_id)
    }

    /// Point the page at another chat. Refused while a send is in flight,
    /// since the outstanding request may still assign the id itself.
    pub fn set_current_chat(&mut self, chat_id: impl Into<ChatId>) -> bool {
        let chat_id = chat_id.into();
        if self.waiting_for_response && !self.is_current(&chat_id) {
            log::warn!("Refusing to switch to chat {} while a request is in flight", chat_id);
            return false;
        }
        self.current_chat_id = Some(chat_id);
        true
    }

    pub fn clear_current_chat(&mut self) -> Option<ChatId> {
        self.current_chat_id.take()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting_for_response
    }

    /// Enter the in-flight window. Returns false if a request is already out.
    pub fn begin_request(&mut self) -> bool {
        if self.waiting_for_response {
            return false;
        }
        self.waiting_for_response = true;
        true
    }

    pub fn end_request(&mut self) {
        self.waiting_for_response = false;
    }

    pub fn active_edit(&self) -> Option<&str> {
        self.active_edit.as_deref()
    }

    /// Give the edit slot to `chat_id`; returns the displaced holder, if any.
    pub fn grant_edit(&mut self, chat_id: &str) -> Option<ChatId> {
        match self.active_edit.replace(chat_id.to_string()) {
            Some(previous) if previous != chat_id => Some(previous),
            _ => None,
        }
    }

    /// Release the edit slot if `chat_id` holds it.
    pub fn release_edit(&mut self, chat_id: &str) -> bool {
        if self.active_edit.as_deref() == Some(chat_id) {
            self.active_edit = None;
            true
        } else {
            false
        }
    }

    pub fn open_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    /// Give the menu slot to `chat_id`; returns the displaced holder, if any.
    pub fn grant_menu(&mut self, chat_id: &str) -> Option<ChatId> {
        match self.open_menu.replace(chat_id.to_string()) {
            Some(previous) if previous != chat_id => Some(previous),
            _ => None,
        }
    }

    pub fn release_menu(&mut self) -> Option<ChatId> {
        self.open_menu.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_window() {
        let mut state = SessionState::new(None);
        assert!(state.begin_request());
        assert!(!state.begin_request());
        assert!(state.is_waiting());
        state.end_request();
        assert!(!state.is_waiting());
        assert!(state.begin_request());
    }

    #[test]
    fn test_current_chat_locked_while_waiting() {
        let mut state = SessionState::new(Some("abc".into()));
        state.begin_request();
        assert!(!state.set_current_chat("xyz"));
        assert!(state.set_current_chat("abc"));
        assert_eq!(state.current_chat_id(), Some("abc"));
        state.end_request();
        assert!(state.set_current_chat("xyz"));
        assert_eq!(state.current_chat_id(), Some("xyz"));
    }

    #[test]
    fn test_grant_edit_returns_displaced_holder() {
        let mut state = SessionState::default();
        assert_eq!(state.grant_edit("a"), None);
        assert_eq!(state.grant_edit("a"), None);
        assert_eq!(state.grant_edit("b"), Some("a".to_string()));
        assert!(!state.release_edit("a"));
        assert!(state.release_edit("b"));
        assert_eq!(state.active_edit(), None);
    }

    #[test]
    fn test_grant_menu_returns_displaced_holder() {
        let mut state = SessionState::default();
        assert_eq!(state.grant_menu("a"), None);
        assert_eq!(state.grant_menu("b"), Some("a".to_string()));
        assert_eq!(state.release_menu(), Some("b".to_string()));
        assert_eq!(state.open_menu(), None);
    }
}
