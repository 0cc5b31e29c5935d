use chatpane_types::text::truncate_title;
use chatpane_types::ChatId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPhase {
    Idle,
    /// Title input shown; `saving` while the rename request is out
    Editing { draft: String, saving: bool },
    /// Deleted on the server, animating out before detach
    Removing,
}

/// Sidebar projection of a chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRow {
    pub id: ChatId,
    /// Full title; the display text is derived from it
    pub title: String,
    pub active: bool,
    pub phase: RowPhase,
}

impl ChatRow {
    pub fn new(id: impl Into<ChatId>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), active: false, phase: RowPhase::Idle }
    }

    pub fn display_title(&self, max_chars: usize) -> String {
        truncate_title(&self.title, max_chars)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, RowPhase::Editing { .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.phase, RowPhase::Editing { saving: true, .. })
    }

    pub fn is_removing(&self) -> bool {
        self.phase == RowPhase::Removing
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.phase {
            RowPhase::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }
}

/// Where a click landed, relative to the sidebar rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Outside,
    Row { chat_id: ChatId, part: RowPart },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPart {
    Link,
    SettingsButton,
    Menu,
    EditArea,
    Body,
}

/// Ordered list of chat rows, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidebar {
    rows: Vec<ChatRow>,
}

impl Sidebar {
    pub fn new(rows: Vec<ChatRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ChatRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, chat_id: &str) -> Option<&ChatRow> {
        self.rows.iter().find(|row| row.id == chat_id)
    }

    fn get_mut(&mut self, chat_id: &str) -> Option<&mut ChatRow> {
        self.rows.iter_mut().find(|row| row.id == chat_id)
    }

    pub fn contains(&self, chat_id: &str) -> bool {
        self.get(chat_id).is_some()
    }

    pub fn active(&self) -> Option<&ChatRow> {
        self.rows.iter().find(|row| row.active)
    }

    /// Put a row at the top. An existing row with the same id is moved.
    pub fn insert_top(&mut self, chat_id: &str, title: &str) {
        self.rows.retain(|row| row.id != chat_id);
        self.rows.insert(0, ChatRow::new(chat_id, title));
    }

    /// Mark exactly one row active (or none). Returns whether the row exists.
    pub fn set_active(&mut self, chat_id: Option<&str>) -> bool {
        let mut found = false;
        for row in &mut self.rows {
            row.active = Some(row.id.as_str()) == chat_id;
            found |= row.active;
        }
        found
    }

    pub fn begin_edit(&mut self, chat_id: &str) -> bool {
        match self.get_mut(chat_id) {
            Some(row) if row.phase == RowPhase::Idle => {
                row.phase = RowPhase::Editing { draft: row.title.clone(), saving: false };
                true
            }
            Some(row) => row.is_editing(),
            None => false,
        }
    }

    /// Leave edit mode, discarding the draft.
    pub fn restore(&mut self, chat_id: &str) -> bool {
        match self.get_mut(chat_id) {
            Some(row) if row.is_editing() => {
                row.phase = RowPhase::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn set_draft(&mut self, chat_id: &str, text: &str) -> bool {
        match self.get_mut(chat_id).map(|row| &mut row.phase) {
            Some(RowPhase::Editing { draft, saving: false }) => {
                *draft = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_saving(&mut self, chat_id: &str, value: bool) -> bool {
        match self.get_mut(chat_id).map(|row| &mut row.phase) {
            Some(RowPhase::Editing { saving, .. }) => {
                *saving = value;
                true
            }
            _ => false,
        }
    }

    /// Store a server-confirmed title and leave edit mode.
    pub fn apply_title(&mut self, chat_id: &str, title: &str) -> bool {
        match self.get_mut(chat_id) {
            Some(row) => {
                row.title = title.to_string();
                if row.is_editing() {
                    row.phase = RowPhase::Idle;
                }
                true
            }
            None => false,
        }
    }

    pub fn mark_removing(&mut self, chat_id: &str) -> bool {
        match self.get_mut(chat_id) {
            Some(row) if !row.is_removing() => {
                row.phase = RowPhase::Removing;
                true
            }
            _ => false,
        }
    }

    /// Drop a row. False if it was already gone.
    pub fn detach(&mut self, chat_id: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != chat_id);
        self.rows.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sidebar() -> Sidebar {
        Sidebar::new(vec![ChatRow::new("a", "Alpha"), ChatRow::new("b", "Beta")])
    }

    #[test]
    fn test_insert_top_moves_existing() {
        let mut sidebar = sidebar();
        sidebar.insert_top("c", "Gamma");
        sidebar.insert_top("b", "Beta again");
        let ids: Vec<_> = sidebar.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(sidebar.get("b").unwrap().title, "Beta again");
    }

    #[test]
    fn test_set_active_is_exclusive() {
        let mut sidebar = sidebar();
        assert!(sidebar.set_active(Some("a")));
        assert!(sidebar.set_active(Some("b")));
        assert_eq!(sidebar.rows().iter().filter(|r| r.active).count(), 1);
        assert_eq!(sidebar.active().unwrap().id, "b");
        assert!(!sidebar.set_active(Some("zzz")));
        assert!(sidebar.active().is_none());
    }

    #[test]
    fn test_edit_cycle() {
        let mut sidebar = sidebar();
        assert!(sidebar.begin_edit("a"));
        assert_eq!(sidebar.get("a").unwrap().draft(), Some("Alpha"));
        assert!(sidebar.set_draft("a", "Renamed"));
        assert!(sidebar.set_saving("a", true));
        assert!(!sidebar.set_draft("a", "ignored while saving"));
        assert!(sidebar.apply_title("a", "Renamed"));
        let row = sidebar.get("a").unwrap();
        assert_eq!(row.phase, RowPhase::Idle);
        assert_eq!(row.title, "Renamed");
    }

    #[test]
    fn test_restore_discards_draft() {
        let mut sidebar = sidebar();
        sidebar.begin_edit("b");
        sidebar.set_draft("b", "Something else");
        assert!(sidebar.restore("b"));
        assert_eq!(sidebar.get("b").unwrap().title, "Beta");
        assert!(!sidebar.restore("b"));
    }

    #[test]
    fn test_detach_is_guarded() {
        let mut sidebar = sidebar();
        assert!(sidebar.mark_removing("a"));
        assert!(!sidebar.mark_removing("a"));
        assert!(!sidebar.begin_edit("a"));
        assert!(sidebar.detach("a"));
        assert!(!sidebar.detach("a"));
        assert_eq!(sidebar.len(), 1);
    }

    #[test]
    fn test_display_title_truncates() {
        let row = ChatRow::new("x", "x".repeat(50));
        assert_eq!(row.display_title(35).chars().count(), 38);
    }
}
