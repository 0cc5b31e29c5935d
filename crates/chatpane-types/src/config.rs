//! Client configuration
//!
//! The page may embed a JSON object overriding any of these values; every
//! field has a default so an empty object (or no object at all) is valid.

use serde::Deserialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub chat_endpoint: String,
    pub update_title_endpoint: String,
    pub delete_chat_endpoint: String,
    /// Route of the chat page; also where the user lands after the open chat is deleted
    pub base_route: String,
    pub chat_id_param: String,
    pub csrf_cookie: String,
    pub csrf_header: String,
    pub history_element_id: String,
    pub default_chat_title: String,
    pub app_title: String,
    pub document_title_suffix: String,
    pub sidebar_title_max_chars: usize,
    pub row_removal_ms: u32,
    pub menu_hide_ms: u32,
    pub toast_duration_ms: u32,
    pub toast_fade_ms: u32,
    pub markdown_replies: bool,
    pub log_level: String,
    pub strings: UiStrings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: "/api/chat/".to_string(),
            update_title_endpoint: "/api/update-title/".to_string(),
            delete_chat_endpoint: "/api/delete-chat/".to_string(),
            base_route: "/chat/".to_string(),
            chat_id_param: "chat_id".to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            history_element_id: "chat-history-data".to_string(),
            default_chat_title: "Untitled Chat".to_string(),
            app_title: "Gemini Chat".to_string(),
            document_title_suffix: " - Gemini Chatbot".to_string(),
            sidebar_title_max_chars: 35,
            row_removal_ms: 300,
            menu_hide_ms: 150,
            toast_duration_ms: 4000,
            toast_fade_ms: 600,
            markdown_replies: true,
            log_level: "info".to_string(),
            strings: UiStrings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    /// Page URL for a chat, e.g. `/chat/?chat_id=abc`
    pub fn chat_url(&self, chat_id: &str) -> String {
        format!(
            "{}?{}={}",
            self.base_route,
            self.chat_id_param,
            urlencoding::encode(chat_id)
        )
    }

    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

/// User-visible strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiStrings {
    pub input_placeholder: String,
    pub waiting_placeholder: String,
    pub error_prefix: String,
    pub send_failed: String,
    pub bot_error_prefix: String,
    pub unexpected_reply: String,
    pub history_load_failed: String,
    pub composer_unavailable: String,
    pub no_chats: String,
    pub rename_failed: String,
    pub delete_failed: String,
    /// `{title}` is replaced by the chat's full title
    pub delete_confirm: String,
    pub empty_title: String,
    pub settings_label: String,
    pub rename_label: String,
    pub delete_label: String,
    pub save_label: String,
    pub cancel_label: String,
    pub close_notification_label: String,
}

impl Default for UiStrings {
    fn default() -> Self {
        Self {
            input_placeholder: "Type a message...".to_string(),
            waiting_placeholder: "Waiting for response...".to_string(),
            error_prefix: "Error: ".to_string(),
            send_failed: "Could not send the message. Please check your connection.".to_string(),
            bot_error_prefix: "Bot error: ".to_string(),
            unexpected_reply: "Received an unexpected reply from the bot.".to_string(),
            history_load_failed: "Error: could not load the chat history.".to_string(),
            composer_unavailable: "Error: could not initialise the message input.".to_string(),
            no_chats: "No conversations yet.".to_string(),
            rename_failed: "Could not update the title: ".to_string(),
            delete_failed: "Could not delete the conversation: ".to_string(),
            delete_confirm:
                "Delete the conversation \"{title}\"?\nThis action cannot be undone.".to_string(),
            empty_title: "Title cannot be empty.".to_string(),
            settings_label: "Options".to_string(),
            rename_label: "Rename".to_string(),
            delete_label: "Delete".to_string(),
            save_label: "Save".to_string(),
            cancel_label: "Cancel".to_string(),
            close_notification_label: "Close notification".to_string(),
        }
    }
}
