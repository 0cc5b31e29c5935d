use async_trait::async_trait;
use chatpane_types::{
    ChatRequest, ChatResponse, DeleteChatRequest, DeleteChatResponse, Result, UpdateTitleRequest,
    UpdateTitleResponse,
};

use crate::page::{ChatPage, Effects};

/// Chat backend - the three JSON endpoints the page talks to.
///
/// Implementations return the decoded reply for any JSON body; turning an
/// unsuccessful reply into an error is the page's job.
#[async_trait(?Send)]
pub trait ChatApi {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse>;

    async fn update_title(&self, request: &UpdateTitleRequest) -> Result<UpdateTitleResponse>;

    async fn delete_chat(&self, request: &DeleteChatRequest) -> Result<DeleteChatResponse>;
}

/// Host environment of the page: timers and the document.
#[async_trait(?Send)]
pub trait Platform {
    async fn sleep(&self, ms: u32);

    /// Bring the document in line with `page` and carry out `effects`.
    fn render(&self, page: &ChatPage, effects: Effects);
}
