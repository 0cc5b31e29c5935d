use async_trait::async_trait;
use chatpane_session::ChatApi;
use chatpane_types::text::{classify_response, cookie_value};
use chatpane_types::{
    ChatRequest, ChatResponse, ClientConfig, ClientError, DeleteChatRequest, DeleteChatResponse,
    Result, UpdateTitleRequest, UpdateTitleResponse,
};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::Document;

use crate::dom;

/// `ChatApi` over same-origin `fetch`, authenticated with the CSRF cookie
pub struct HttpChatApi {
    document: Document,
    config: ClientConfig,
}

impl HttpChatApi {
    pub fn new(document: Document, config: ClientConfig) -> Self {
        Self { document, config }
    }

    fn csrf_token(&self) -> Result<String> {
        cookie_value(&dom::cookies(&self.document), &self.config.csrf_cookie)
            .ok_or(ClientError::MissingCsrfToken)
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let token = self.csrf_token()?;

        let response = Request::post(endpoint)
            .header(&self.config.csrf_header, &token)
            .json(body)
            .map_err(|e| ClientError::Malformed(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response.headers().get("content-type");
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        log::debug!("POST {} -> {}", endpoint, status);
        classify_response(status, content_type.as_deref(), &text)
    }
}

#[async_trait(?Send)]
impl ChatApi for HttpChatApi {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.post_json(&self.config.chat_endpoint, request).await
    }

    async fn update_title(&self, request: &UpdateTitleRequest) -> Result<UpdateTitleResponse> {
        self.post_json(&self.config.update_title_endpoint, request).await
    }

    async fn delete_chat(&self, request: &DeleteChatRequest) -> Result<DeleteChatResponse> {
        self.post_json(&self.config.delete_chat_endpoint, request).await
    }
}
