use chatpane_types::{ChatMessage, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    /// A real chat message
    Message,
    /// A client-side notice (errors, load failures), always rendered as plain text
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub kind: BubbleKind,
}

/// Messages of the open chat plus the loading placeholder.
///
/// Bubbles are only ever appended; the placeholder is the single marker of an
/// outstanding request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    bubbles: Vec<Bubble>,
    next_id: u64,
    loading: bool,
}

impl Transcript {
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn push_message(&mut self, message: ChatMessage) -> u64 {
        self.push(message.role, message.content, BubbleKind::Message)
    }

    pub fn push_notice(&mut self, content: impl Into<String>) -> u64 {
        self.push(Role::Bot, content.into(), BubbleKind::Notice)
    }

    fn push(&mut self, role: Role, content: String, kind: BubbleKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.bubbles.push(Bubble { id, role, content, kind });
        id
    }

    pub fn show_loading(&mut self) {
        self.loading = true;
    }

    /// Remove the placeholder. False if it was not shown.
    pub fn hide_loading(&mut self) -> bool {
        std::mem::replace(&mut self.loading, false)
    }
}

/// The message input and its submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    draft: String,
    enabled: bool,
    available: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self { draft: String::new(), enabled: true, available: true }
    }
}

impl Composer {
    /// A composer whose input elements are missing from the page
    pub fn unavailable() -> Self {
        Self { available: false, ..Self::default() }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut transcript = Transcript::default();
        let a = transcript.push_message(ChatMessage::user("hi"));
        let b = transcript.push_notice("Error: offline");
        assert!(b > a);
        assert_eq!(transcript.bubbles()[1].kind, BubbleKind::Notice);
        assert_eq!(transcript.bubbles()[1].role, Role::Bot);
    }

    #[test]
    fn test_loading_placeholder() {
        let mut transcript = Transcript::default();
        assert!(!transcript.hide_loading());
        transcript.show_loading();
        assert!(transcript.is_loading());
        assert!(transcript.hide_loading());
        assert!(!transcript.is_loading());
    }
}
