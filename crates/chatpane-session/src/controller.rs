use std::cell::RefCell;
use std::rc::Rc;

use chatpane_types::ChatId;

use crate::api::{ChatApi, Platform};
use crate::overlay::ToastId;
use crate::page::{ChatPage, RenamePlan};

/// Drives the page's async flows against a backend and a platform.
///
/// Every mutation goes through [`ChatController::update`], which renders
/// afterwards. No borrow of the page is held across an await; flows
/// re-read the state they need once a request settles.
pub struct ChatController<A, P> {
    page: Rc<RefCell<ChatPage>>,
    api: A,
    platform: P,
}

impl<A: ChatApi, P: Platform> ChatController<A, P> {
    pub fn new(page: ChatPage, api: A, platform: P) -> Self {
        Self { page: Rc::new(RefCell::new(page)), api, platform }
    }

    pub fn page(&self) -> &Rc<RefCell<ChatPage>> {
        &self.page
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutate the page, then render it together with the effects produced.
    pub fn update<R>(&self, f: impl FnOnce(&mut ChatPage) -> R) -> R {
        let (result, effects) = {
            let mut page = self.page.borrow_mut();
            let result = f(&mut page);
            (result, page.take_effects())
        };
        self.platform.render(&self.page.borrow(), effects);
        result
    }

    /// Render the current state, flushing pending effects.
    pub fn refresh(&self) {
        self.update(|_| ());
    }

    /// Submit the composer's draft. False when nothing was sent.
    pub async fn send(&self) -> bool {
        let Some(pending) = self.update(ChatPage::begin_send) else {
            return false;
        };

        let outcome = self.api.send_message(&pending.request).await;
        if let Err(e) = &outcome {
            log::warn!("Chat request failed: {}", e);
        }
        self.update(|page| page.finish_send(pending, outcome));
        true
    }

    /// Save the title being edited in a row. False unless a request was made.
    pub async fn save_title(&self, chat_id: &str) -> bool {
        let RenamePlan::Submit(request) = self.update(|page| page.prepare_rename(chat_id)) else {
            return false;
        };

        let outcome = self.api.update_title(&request).await;
        self.update(|page| page.finish_rename(&request, outcome));
        true
    }

    /// Confirm, delete on the server, animate the row out and detach it.
    /// True when the row was removed.
    pub async fn delete_chat(&self, chat_id: &str) -> bool {
        let Some(pending) = self.update(|page| page.prepare_delete(chat_id)) else {
            return false;
        };

        // A superseded request drops its sender, which counts as "no".
        let confirmed = pending.answer.await.unwrap_or(false);
        if !confirmed {
            log::debug!("Deletion of {} not confirmed", chat_id);
            return false;
        }

        let outcome = self.api.delete_chat(&pending.request).await;
        if !self.update(|page| page.finish_delete(&pending.request, outcome)) {
            return false;
        }

        let delay = self.page.borrow().config().row_removal_ms;
        self.platform.sleep(delay).await;
        self.update(|page| page.complete_removal(chat_id));
        true
    }

    /// Close a toast once its display time has passed.
    pub async fn expire_toast(&self, id: ToastId, duration_ms: u32) {
        self.platform.sleep(duration_ms).await;
        if self.update(|page| page.close_toast(id)) {
            log::debug!("Toast {} expired", id);
        }
    }

    pub fn current_chat_id(&self) -> Option<ChatId> {
        self.page.borrow().state().current_chat_id().map(str::to_string)
    }
}
