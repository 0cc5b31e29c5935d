//! The chat page as a whole: session state, sidebar, transcript, composer
//! and overlays, plus the effects the browser still has to carry out.

use chatpane_types::text::query_param;
use chatpane_types::{
    parse_history, AppEvent, ChatId, ChatMessage, ChatRequest, ChatResponse, ClientConfig,
    ClientError, DeleteChatRequest, DeleteChatResponse, ErrorKind, UpdateTitleRequest,
    UpdateTitleResponse,
};
use futures::channel::oneshot;

use crate::overlay::{ConfirmDialog, Dismissal, ToastId, ToastKind, ToastQueue};
use crate::sidebar::{ChatRow, ClickTarget, RowPart, Sidebar};
use crate::state::SessionState;
use crate::transcript::{Composer, Transcript};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Rewrite the address bar without reloading
    Push(String),
    /// Leave the page
    Assign(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Composer,
    TitleInput(ChatId),
}

/// Side effects produced by a state change, drained after every update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub events: Vec<AppEvent>,
    pub navigation: Option<Navigation>,
    pub focus: Option<Focus>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.navigation.is_none() && self.focus.is_none()
    }
}

/// What the server rendered into the page
#[derive(Debug, Clone, Default)]
pub struct PageSeed {
    /// `location.search`
    pub search: String,
    pub rows: Vec<ChatRow>,
    /// Serialized history, if the page embedded any
    pub history: Option<String>,
    pub composer_available: bool,
}

/// A send that has left the composer and awaits the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub request: ChatRequest,
}

impl PendingSend {
    pub fn is_first_message(&self) -> bool {
        self.request.chat_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenamePlan {
    /// Row missing, not in edit mode, or already saving
    Ignored,
    /// Draft equals the stored title; edit mode was left
    Unchanged,
    /// Draft is empty; edit mode stays
    Rejected,
    Submit(UpdateTitleRequest),
}

/// A delete waiting for the user's answer
#[derive(Debug)]
pub struct PendingDelete {
    pub request: DeleteChatRequest,
    pub answer: oneshot::Receiver<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// The link points at the open chat; suppress navigation
    Stay,
    /// Let the browser follow the link
    Follow,
}

#[derive(Debug)]
pub struct ChatPage {
    config: ClientConfig,
    state: SessionState,
    sidebar: Sidebar,
    transcript: Transcript,
    composer: Composer,
    title: String,
    confirm: ConfirmDialog,
    toasts: ToastQueue,
    effects: Effects,
}

impl ChatPage {
    pub fn load(config: ClientConfig, seed: PageSeed) -> Self {
        let current = query_param(&seed.search, &config.chat_id_param);
        log::info!("Initial chat id from URL: {}", current.as_deref().unwrap_or("None"));

        let composer = if seed.composer_available {
            Composer::default()
        } else {
            Composer::unavailable()
        };

        let mut page = Self {
            title: config.app_title.clone(),
            state: SessionState::new(current.clone()),
            sidebar: Sidebar::new(seed.rows),
            transcript: Transcript::default(),
            composer,
            confirm: ConfirmDialog::default(),
            toasts: ToastQueue::default(),
            effects: Effects::default(),
            config,
        };

        if let Some(json) = seed.history.as_deref() {
            page.load_history(json);
        }

        if !page.composer.is_available() {
            log::error!("Message input or submit button not found");
            page.transcript.push_notice(page.config.strings.composer_unavailable.clone());
        }

        let found = page.sidebar.set_active(current.as_deref());
        if let (Some(chat_id), false) = (current.as_deref(), found) {
            log::warn!("Current chat {} not found in sidebar", chat_id);
        }

        page.refresh_title(None);
        if page.composer.is_available() {
            page.effects.focus = Some(Focus::Composer);
        }
        page
    }

    fn load_history(&mut self, json: &str) {
        match parse_history(json) {
            Ok(messages) => {
                log::info!(
                    "Loading {} history messages for chat {}",
                    messages.len(),
                    self.state.current_chat_id().unwrap_or("None")
                );
                for message in messages {
                    self.transcript.push_message(message);
                }
            }
            Err(e) => {
                log::error!("Error parsing chat history: {}", e);
                self.transcript.push_notice(self.config.strings.history_load_failed.clone());
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn confirmation(&self) -> &ConfirmDialog {
        &self.confirm
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document_title(&self) -> String {
        format!("{}{}", self.title, self.config.document_title_suffix)
    }

    pub fn take_effects(&mut self) -> Effects {
        std::mem::take(&mut self.effects)
    }

    // ========================================================================
    // Title bar
    // ========================================================================

    /// Forced title, else the open chat's full title, else a default.
    pub fn derive_title(&self, forced: Option<&str>) -> String {
        if let Some(forced) = forced.map(str::trim).filter(|t| !t.is_empty()) {
            return forced.to_string();
        }
        match self.state.current_chat_id() {
            Some(chat_id) => self
                .sidebar
                .get(chat_id)
                .map(|row| row.title.trim())
                .filter(|t| !t.is_empty())
                .unwrap_or(self.config.default_chat_title.as_str())
                .to_string(),
            None => self.config.app_title.clone(),
        }
    }

    pub fn refresh_title(&mut self, forced: Option<&str>) {
        self.title = self.derive_title(forced);
        log::debug!("Main title: {}", self.title);
    }

    /// React to a cross-component event.
    pub fn handle_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ChatRenamed { chat_id, new_title } => {
                log::info!("Chat {} renamed to \"{}\"", chat_id, new_title);
                if self.state.is_current(chat_id) {
                    self.refresh_title(Some(new_title));
                }
            }
            AppEvent::ChatDeleted { chat_id } => {
                log::info!("Chat {} deleted", chat_id);
            }
        }
    }

    fn emit(&mut self, event: AppEvent) {
        self.handle_event(&event);
        self.effects.events.push(event);
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        self.toasts.push(message, kind, self.config.toast_duration_ms)
    }

    pub fn close_toast(&mut self, id: ToastId) -> bool {
        self.toasts.close(id)
    }

    pub fn ask_confirmation(&mut self, message: impl Into<String>) -> oneshot::Receiver<bool> {
        self.confirm.ask(message)
    }

    pub fn confirm_yes(&mut self) -> bool {
        self.confirm.confirm()
    }

    pub fn dismiss_confirmation(&mut self, how: Dismissal) -> bool {
        self.confirm.dismiss(how)
    }

    // ========================================================================
    // Sidebar
    // ========================================================================

    /// Open or close a row's options menu; opening closes every other
    /// menu and cancels edits on other rows.
    pub fn toggle_menu(&mut self, chat_id: &str) {
        if !self.sidebar.get(chat_id).is_some_and(|row| !row.is_removing()) {
            return;
        }
        self.cancel_other_edit(chat_id);

        if self.state.open_menu() == Some(chat_id) {
            self.close_menu();
        } else {
            if let Some(previous) = self.state.grant_menu(chat_id) {
                log::debug!("Closed options menu of {}", previous);
            }
            log::debug!("Opened options menu of {}", chat_id);
        }
    }

    pub fn close_menu(&mut self) -> bool {
        self.state.release_menu().is_some()
    }

    pub fn begin_rename(&mut self, chat_id: &str) -> bool {
        self.close_menu();
        if let Some(saving) = self
            .state
            .active_edit()
            .filter(|id| *id != chat_id && self.sidebar.get(id).is_some_and(ChatRow::is_saving))
        {
            log::warn!("Title of {} is still being saved", saving);
            return false;
        }
        self.cancel_other_edit(chat_id);

        if !self.sidebar.begin_edit(chat_id) {
            log::error!("Cannot enter edit mode for {}", chat_id);
            return false;
        }
        self.state.grant_edit(chat_id);
        self.effects.focus = Some(Focus::TitleInput(chat_id.to_string()));
        log::debug!("Entered edit mode for {}", chat_id);
        true
    }

    pub fn set_title_draft(&mut self, chat_id: &str, text: &str) -> bool {
        self.sidebar.set_draft(chat_id, text)
    }

    /// Leave edit mode restoring the stored title. Not while saving.
    pub fn cancel_edit(&mut self, chat_id: &str) -> bool {
        if self.sidebar.get(chat_id).is_some_and(ChatRow::is_saving) {
            return false;
        }
        self.exit_edit(chat_id)
    }

    fn exit_edit(&mut self, chat_id: &str) -> bool {
        let restored = self.sidebar.restore(chat_id);
        self.state.release_edit(chat_id);
        if restored {
            log::debug!("Exited edit mode for {}", chat_id);
        }
        restored
    }

    fn cancel_other_edit(&mut self, chat_id: &str) {
        if let Some(editing) = self.state.active_edit().filter(|id| *id != chat_id) {
            let editing = editing.to_string();
            self.cancel_edit(&editing);
        }
    }

    /// Document-level click, seen before any row handler: clicks outside the
    /// open menu close it, clicks outside the edited row cancel the edit.
    pub fn handle_click(&mut self, target: &ClickTarget) {
        if let Some(open) = self.state.open_menu() {
            let keep = match target {
                ClickTarget::Row { part: RowPart::SettingsButton, .. } => true,
                ClickTarget::Row { chat_id, part: RowPart::Menu } => chat_id == open,
                _ => false,
            };
            if !keep {
                self.close_menu();
            }
        }

        if let Some(editing) = self.state.active_edit() {
            let inside = matches!(target, ClickTarget::Row { chat_id, .. } if chat_id == editing);
            if !inside {
                let editing = editing.to_string();
                log::debug!("Click outside edited row, cancelling edit for {}", editing);
                self.cancel_edit(&editing);
            }
        }
    }

    pub fn select_chat(&mut self, chat_id: &str) -> LinkAction {
        self.cancel_other_edit(chat_id);
        self.close_menu();
        self.sidebar.set_active(Some(chat_id));

        if self.state.is_current(chat_id) {
            log::debug!("Already on chat {}, navigation suppressed", chat_id);
            self.refresh_title(None);
            LinkAction::Stay
        } else {
            LinkAction::Follow
        }
    }

    /// Returns true when the page navigates away to start a new chat.
    pub fn new_chat(&mut self) -> bool {
        if self.state.current_chat_id().is_some() {
            log::info!("New chat requested, navigating to {}", self.config.base_route);
            self.state.clear_current_chat();
            self.effects.navigation = Some(Navigation::Assign(self.config.base_route.clone()));
            true
        } else {
            self.effects.focus = Some(Focus::Composer);
            false
        }
    }

    /// Insert a row at the top and make it the active one.
    pub fn add_chat(&mut self, chat_id: &str, title: Option<&str>) {
        let full_title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.config.default_chat_title.as_str())
            .to_string();

        self.state.release_edit(chat_id);
        if self.state.open_menu() == Some(chat_id) {
            self.state.release_menu();
        }
        self.sidebar.insert_top(chat_id, &full_title);
        self.sidebar.set_active(Some(chat_id));
        log::info!("Added chat {} to sidebar: \"{}\"", chat_id, full_title);
    }

    pub fn prepare_rename(&mut self, chat_id: &str) -> RenamePlan {
        let Some(row) = self.sidebar.get(chat_id) else {
            return RenamePlan::Ignored;
        };
        let Some(draft) = row.draft() else {
            log::warn!("Save requested but {} is not in edit mode", chat_id);
            return RenamePlan::Ignored;
        };
        if row.is_saving() {
            return RenamePlan::Ignored;
        }

        let new_title = draft.trim().to_string();
        if new_title == row.title.trim() {
            log::debug!("Title unchanged for {}", chat_id);
            self.exit_edit(chat_id);
            return RenamePlan::Unchanged;
        }
        if new_title.is_empty() {
            log::warn!("Rename of {} rejected: {}", chat_id, ClientError::EmptyTitle);
            let message = self.config.strings.empty_title.clone();
            self.notify(message, ToastKind::Error);
            self.effects.focus = Some(Focus::TitleInput(chat_id.to_string()));
            return RenamePlan::Rejected;
        }

        self.sidebar.set_saving(chat_id, true);
        log::info!("Updating title of {} to \"{}\"", chat_id, new_title);
        RenamePlan::Submit(UpdateTitleRequest { chat_id: chat_id.to_string(), new_title })
    }

    pub fn finish_rename(
        &mut self,
        request: &UpdateTitleRequest,
        outcome: Result<UpdateTitleResponse, ClientError>,
    ) {
        let chat_id = request.chat_id.as_str();
        match outcome.and_then(accept_title_update) {
            Ok(reply) => {
                let title = reply
                    .new_title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(self.config.default_chat_title.as_str())
                    .to_string();
                if !self.sidebar.apply_title(chat_id, &title) {
                    log::warn!("Renamed chat {} is no longer in the sidebar", chat_id);
                }
                self.state.release_edit(chat_id);
                self.emit(AppEvent::ChatRenamed { chat_id: chat_id.to_string(), new_title: title });
            }
            Err(e) => {
                log::error!("Error updating title of {}: {}", chat_id, e);
                if self.sidebar.set_saving(chat_id, false) {
                    self.effects.focus = Some(Focus::TitleInput(chat_id.to_string()));
                }
                let message = format!("{}{}", self.config.strings.rename_failed, e);
                self.notify(message, ToastKind::Error);
            }
        }
    }

    /// Ask the user to confirm deleting a row.
    pub fn prepare_delete(&mut self, chat_id: &str) -> Option<PendingDelete> {
        self.close_menu();
        let row = self.sidebar.get(chat_id).filter(|row| !row.is_removing())?;
        let title = match row.title.trim() {
            "" => self.config.default_chat_title.as_str(),
            title => title,
        };
        let message = self.config.strings.delete_confirm.replace("{title}", title);
        let answer = self.confirm.ask(message);
        Some(PendingDelete {
            request: DeleteChatRequest { chat_id: chat_id.to_string() },
            answer,
        })
    }

    /// Apply the server's answer to a delete. True when the row starts
    /// animating out.
    pub fn finish_delete(
        &mut self,
        request: &DeleteChatRequest,
        outcome: Result<DeleteChatResponse, ClientError>,
    ) -> bool {
        let chat_id = request.chat_id.as_str();
        match outcome.and_then(accept_delete) {
            Ok(_) => {
                log::info!("Chat {} deleted on the server", chat_id);
                self.state.release_edit(chat_id);
                if self.state.open_menu() == Some(chat_id) {
                    self.state.release_menu();
                }
                self.sidebar.mark_removing(chat_id);
                self.emit(AppEvent::ChatDeleted { chat_id: chat_id.to_string() });
                true
            }
            Err(e) => {
                log::error!("Error deleting chat {}: {}", chat_id, e);
                let message = format!("{}{}", self.config.strings.delete_failed, e);
                self.notify(message, ToastKind::Error);
                false
            }
        }
    }

    /// Detach a row after its removal animation; leaves the page if it was
    /// the open chat.
    pub fn complete_removal(&mut self, chat_id: &str) -> bool {
        let detached = self.sidebar.detach(chat_id);
        if !detached {
            log::debug!("Row {} was already detached", chat_id);
        }
        if self.state.is_current(chat_id) {
            log::info!("Deleted the open chat, going back to {}", self.config.base_route);
            self.state.clear_current_chat();
            self.effects.navigation = Some(Navigation::Assign(self.config.base_route.clone()));
        }
        detached
    }

    // ========================================================================
    // Composer
    // ========================================================================

    pub fn set_composer_draft(&mut self, text: &str) {
        self.composer.set_draft(text);
    }

    /// Move the draft into the transcript and lock the composer. `None`
    /// when there is nothing to send or a request is already out.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if !self.composer.is_available() || self.state.is_waiting() {
            return None;
        }
        let message = self.composer.draft().trim().to_string();
        if message.is_empty() || !self.state.begin_request() {
            return None;
        }

        let chat_id = self.state.current_chat_id().map(str::to_string);
        log::info!("Sending message, chat: {}", chat_id.as_deref().unwrap_or("NEW CHAT"));

        self.transcript.push_message(ChatMessage::user(message.clone()));
        self.composer.clear();
        self.composer.set_enabled(false);
        self.transcript.show_loading();

        Some(PendingSend { request: ChatRequest { message, chat_id } })
    }

    /// Settle a send. Runs on every outcome and always unlocks the composer.
    pub fn finish_send(&mut self, pending: PendingSend, outcome: Result<ChatResponse, ClientError>) {
        self.state.end_request();
        self.transcript.hide_loading();

        match outcome {
            Ok(reply) => self.apply_chat_reply(&pending, reply),
            Err(e) => {
                log::error!("Error sending message: {}", e);
                let strings = &self.config.strings;
                let detail = match e.kind() {
                    ErrorKind::Transport => strings.send_failed.clone(),
                    _ => e.to_string(),
                };
                let notice = format!("{}{}", strings.error_prefix, detail);
                self.transcript.push_notice(notice);
            }
        }

        self.composer.set_enabled(true);
        self.effects.focus = Some(Focus::Composer);
    }

    fn apply_chat_reply(&mut self, pending: &PendingSend, reply: ChatResponse) {
        let ChatResponse { response, new_chat_id, title, error } = reply;

        let Some(text) = response.filter(|text| !text.is_empty()) else {
            let notice = match error {
                Some(error) => format!("{}{}", self.config.strings.bot_error_prefix, error),
                None => self.config.strings.unexpected_reply.clone(),
            };
            self.transcript.push_notice(notice);
            return;
        };

        self.transcript.push_message(ChatMessage::bot(text));

        let Some(new_chat_id) = new_chat_id else {
            return;
        };
        if !pending.is_first_message() || self.state.current_chat_id().is_some() {
            log::warn!("Received new_chat_id {} for an existing chat, ignoring it", new_chat_id);
            return;
        }

        log::info!(
            "New chat created: {} (title: {})",
            new_chat_id,
            title.as_deref().unwrap_or("None")
        );
        self.state.set_current_chat(new_chat_id.clone());
        self.effects.navigation = Some(Navigation::Push(self.config.chat_url(&new_chat_id)));
        self.add_chat(&new_chat_id, title.as_deref());
        let initial_title = self.derive_title(None);
        self.refresh_title(Some(&initial_title));
    }
}

fn accept_title_update(reply: UpdateTitleResponse) -> Result<UpdateTitleResponse, ClientError> {
    if reply.success {
        Ok(reply)
    } else {
        Err(ClientError::Rejected(
            reply.error.unwrap_or_else(|| "update was not applied".to_string()),
        ))
    }
}

fn accept_delete(reply: DeleteChatResponse) -> Result<DeleteChatResponse, ClientError> {
    if reply.success {
        Ok(reply)
    } else {
        Err(ClientError::Rejected(
            reply.error.unwrap_or_else(|| "chat was not deleted".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidebar::RowPhase;
    use pretty_assertions::assert_eq;

    fn seed(search: &str) -> PageSeed {
        PageSeed {
            search: search.to_string(),
            rows: vec![
                ChatRow::new("abc123", "Trip planning"),
                ChatRow::new("def456", "Recipes"),
            ],
            history: None,
            composer_available: true,
        }
    }

    fn page(search: &str) -> ChatPage {
        ChatPage::load(ClientConfig::default(), seed(search))
    }

    #[test]
    fn test_load_marks_current_row() {
        let mut page = page("?chat_id=abc123");
        assert_eq!(page.state().current_chat_id(), Some("abc123"));
        assert_eq!(page.sidebar().active().unwrap().id, "abc123");
        assert_eq!(page.title(), "Trip planning");
        assert_eq!(page.document_title(), "Trip planning - Gemini Chatbot");
        assert_eq!(page.take_effects().focus, Some(Focus::Composer));
    }

    #[test]
    fn test_load_base_route() {
        let page = page("");
        assert_eq!(page.state().current_chat_id(), None);
        assert!(page.sidebar().active().is_none());
        assert_eq!(page.title(), "Gemini Chat");
    }

    #[test]
    fn test_load_unknown_chat_uses_default_title() {
        let page = page("?chat_id=gone");
        assert_eq!(page.title(), "Untitled Chat");
    }

    #[test]
    fn test_load_broken_history_shows_notice() {
        let mut seed = seed("?chat_id=abc123");
        seed.history = Some("[{".to_string());
        let page = ChatPage::load(ClientConfig::default(), seed);
        let bubbles = page.transcript().bubbles();
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].content, ClientConfig::default().strings.history_load_failed);
    }

    #[test]
    fn test_missing_composer() {
        let mut seed = seed("");
        seed.composer_available = false;
        let mut page = ChatPage::load(ClientConfig::default(), seed);
        assert_eq!(page.transcript().bubbles().len(), 1);
        page.set_composer_draft("hello");
        assert!(page.begin_send().is_none());
    }

    #[test]
    fn test_forced_title_wins() {
        let page = page("?chat_id=abc123");
        assert_eq!(page.derive_title(Some("  Forced  ")), "Forced");
        assert_eq!(page.derive_title(Some("   ")), "Trip planning");
    }

    #[test]
    fn test_menu_toggle_is_exclusive() {
        let mut page = page("");
        page.toggle_menu("abc123");
        assert_eq!(page.state().open_menu(), Some("abc123"));
        page.toggle_menu("def456");
        assert_eq!(page.state().open_menu(), Some("def456"));
        page.toggle_menu("def456");
        assert_eq!(page.state().open_menu(), None);
        page.toggle_menu("missing");
        assert_eq!(page.state().open_menu(), None);
    }

    #[test]
    fn test_rename_other_row_restores_previous() {
        let mut page = page("");
        page.toggle_menu("abc123");
        assert!(page.begin_rename("abc123"));
        assert_eq!(page.state().open_menu(), None);
        page.set_title_draft("abc123", "half typed");

        assert!(page.begin_rename("def456"));
        let previous = page.sidebar().get("abc123").unwrap();
        assert_eq!(previous.phase, RowPhase::Idle);
        assert_eq!(previous.title, "Trip planning");
        assert_eq!(page.state().active_edit(), Some("def456"));
        assert_eq!(
            page.take_effects().focus,
            Some(Focus::TitleInput("def456".to_string()))
        );
    }

    #[test]
    fn test_opening_menu_cancels_other_edit() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.toggle_menu("def456");
        assert_eq!(page.state().active_edit(), None);
        assert!(!page.sidebar().get("abc123").unwrap().is_editing());
    }

    #[test]
    fn test_click_outside_closes_menu_and_cancels_edit() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "draft");
        page.toggle_menu("def456");
        page.begin_rename("def456");
        page.toggle_menu("abc123");

        page.handle_click(&ClickTarget::Outside);
        assert_eq!(page.state().open_menu(), None);
        assert_eq!(page.state().active_edit(), None);
    }

    #[test]
    fn test_click_inside_keeps_state() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.handle_click(&ClickTarget::Row {
            chat_id: "abc123".into(),
            part: RowPart::EditArea,
        });
        assert_eq!(page.state().active_edit(), Some("abc123"));

        page.toggle_menu("def456");
        page.handle_click(&ClickTarget::Row { chat_id: "def456".into(), part: RowPart::Menu });
        assert_eq!(page.state().open_menu(), Some("def456"));
        page.handle_click(&ClickTarget::Row { chat_id: "abc123".into(), part: RowPart::Body });
        assert_eq!(page.state().open_menu(), None);
    }

    #[test]
    fn test_select_current_chat_stays() {
        let mut page = page("?chat_id=abc123");
        assert_eq!(page.select_chat("abc123"), LinkAction::Stay);
        assert_eq!(page.select_chat("def456"), LinkAction::Follow);
        assert_eq!(page.sidebar().active().unwrap().id, "def456");
        assert_eq!(page.state().current_chat_id(), Some("abc123"));
    }

    #[test]
    fn test_new_chat() {
        let mut page = page("?chat_id=abc123");
        assert!(page.new_chat());
        assert_eq!(page.state().current_chat_id(), None);
        assert_eq!(
            page.take_effects().navigation,
            Some(Navigation::Assign("/chat/".to_string()))
        );

        let mut page = self::page("");
        page.take_effects();
        assert!(!page.new_chat());
        let effects = page.take_effects();
        assert_eq!(effects.navigation, None);
        assert_eq!(effects.focus, Some(Focus::Composer));
    }

    #[test]
    fn test_add_chat_defaults_title() {
        let mut page = page("");
        page.add_chat("new1", Some("   "));
        let row = &page.sidebar().rows()[0];
        assert_eq!(row.id, "new1");
        assert_eq!(row.title, "Untitled Chat");
        assert!(row.active);
    }

    #[test]
    fn test_empty_rename_rejected() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "   ");
        assert_eq!(page.prepare_rename("abc123"), RenamePlan::Rejected);
        assert!(page.sidebar().get("abc123").unwrap().is_editing());
        assert_eq!(page.toasts().toasts().len(), 1);
        assert_eq!(page.toasts().toasts()[0].kind, ToastKind::Error);
    }

    #[test]
    fn test_same_title_rename_exits() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "  Trip planning ");
        assert_eq!(page.prepare_rename("abc123"), RenamePlan::Unchanged);
        assert_eq!(page.state().active_edit(), None);
        assert!(!page.sidebar().get("abc123").unwrap().is_editing());
    }

    #[test]
    fn test_rename_failure_keeps_edit_mode() {
        let mut page = page("?chat_id=abc123");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "Holiday");
        let RenamePlan::Submit(request) = page.prepare_rename("abc123") else {
            panic!("expected a request");
        };
        assert!(page.sidebar().get("abc123").unwrap().is_saving());
        assert!(!page.cancel_edit("abc123"));

        page.finish_rename(&request, Err(ClientError::Network("offline".into())));
        let row = page.sidebar().get("abc123").unwrap();
        assert!(row.is_editing());
        assert!(!row.is_saving());
        assert_eq!(row.title, "Trip planning");
        assert_eq!(page.title(), "Trip planning");
        assert_eq!(page.toasts().toasts().len(), 1);
    }

    #[test]
    fn test_rename_unsuccessful_reply_is_failure() {
        let mut page = page("");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "Holiday");
        let RenamePlan::Submit(request) = page.prepare_rename("abc123") else {
            panic!("expected a request");
        };
        page.finish_rename(
            &request,
            Ok(UpdateTitleResponse { success: false, new_title: None, error: Some("nope".into()) }),
        );
        assert!(page.sidebar().get("abc123").unwrap().is_editing());
        assert!(page.toasts().toasts()[0].message.ends_with("nope"));
    }

    #[test]
    fn test_rename_success_uses_server_title() {
        let mut page = page("?chat_id=abc123");
        page.begin_rename("abc123");
        page.set_title_draft("abc123", "holiday");
        let RenamePlan::Submit(request) = page.prepare_rename("abc123") else {
            panic!("expected a request");
        };
        page.take_effects();
        page.finish_rename(
            &request,
            Ok(UpdateTitleResponse { success: true, new_title: Some("Holiday".into()), error: None }),
        );
        assert_eq!(page.sidebar().get("abc123").unwrap().title, "Holiday");
        assert_eq!(page.state().active_edit(), None);
        assert_eq!(page.title(), "Holiday");
        assert_eq!(
            page.take_effects().events,
            vec![AppEvent::ChatRenamed { chat_id: "abc123".into(), new_title: "Holiday".into() }]
        );
    }

    #[test]
    fn test_rename_of_other_chat_keeps_title() {
        let mut page = page("?chat_id=abc123");
        page.begin_rename("def456");
        page.set_title_draft("def456", "Dinner");
        let RenamePlan::Submit(request) = page.prepare_rename("def456") else {
            panic!("expected a request");
        };
        page.finish_rename(
            &request,
            Ok(UpdateTitleResponse { success: true, new_title: Some("Dinner".into()), error: None }),
        );
        assert_eq!(page.title(), "Trip planning");
    }

    #[test]
    fn test_delete_confirmation_names_chat() {
        let mut page = page("");
        page.toggle_menu("def456");
        let pending = page.prepare_delete("def456").unwrap();
        assert_eq!(page.state().open_menu(), None);
        assert!(page.confirmation().message().unwrap().contains("\"Recipes\""));
        assert_eq!(pending.request.chat_id, "def456");
        assert!(page.prepare_delete("missing").is_none());
    }

    #[test]
    fn test_delete_failure_leaves_row() {
        let mut page = page("");
        let pending = page.prepare_delete("def456").unwrap();
        page.confirm_yes();
        let deleted = page.finish_delete(
            &pending.request,
            Err(ClientError::Rejected("locked".into())),
        );
        assert!(!deleted);
        assert_eq!(page.sidebar().get("def456").unwrap().phase, RowPhase::Idle);
        assert_eq!(page.toasts().toasts().len(), 1);
    }

    #[test]
    fn test_removal_of_open_chat_redirects() {
        let mut page = page("?chat_id=abc123");
        let pending = page.prepare_delete("abc123").unwrap();
        assert!(page.finish_delete(
            &pending.request,
            Ok(DeleteChatResponse { success: true, deleted_count: Some(2), error: None }),
        ));
        assert!(page.sidebar().get("abc123").unwrap().is_removing());
        assert!(page.prepare_delete("abc123").is_none());
        page.take_effects();

        assert!(page.complete_removal("abc123"));
        assert!(!page.complete_removal("abc123"));
        assert_eq!(page.state().current_chat_id(), None);
        assert_eq!(
            page.take_effects().navigation,
            Some(Navigation::Assign("/chat/".to_string()))
        );
    }
}
