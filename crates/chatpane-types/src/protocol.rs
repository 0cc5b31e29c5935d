use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Chat ID type (opaque, assigned by the server)
pub type ChatId = String;

/// Who authored a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    User,
    Bot,
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Bot
        }
    }
}

/// One message of a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self { role: Role::Bot, content: content.into() }
    }
}

/// History entry as embedded in the page. The server renders either a
/// `content` string or a `parts` array.
#[derive(Debug, Clone, Default, Deserialize)]
struct HistoryEntry {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    parts: Option<Vec<Value>>,
}

impl HistoryEntry {
    fn into_message(self) -> Option<ChatMessage> {
        let role = self.role.filter(|r| !r.trim().is_empty())?;
        let content = match (self.content, self.parts) {
            (Some(Value::String(text)), _) => text,
            (_, Some(parts)) => parts
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => return None,
        };
        if content.trim().is_empty() {
            return None;
        }
        Some(ChatMessage { role: Role::from(role), content })
    }
}

/// Parse the serialized history embedded in the page.
///
/// Invalid or blank entries are skipped; a payload that is not an array
/// yields an empty history. Only unparseable JSON is an error.
pub fn parse_history(json: &str) -> Result<Vec<ChatMessage>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(json).map_err(|e| ClientError::InvalidHistory(e.to_string()))?;

    let Value::Array(entries) = value else {
        log::warn!("History payload is not an array, ignoring it");
        return Ok(Vec::new());
    };

    let mut messages = Vec::with_capacity(entries.len());
    for raw in entries {
        let entry: HistoryEntry = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping malformed history entry {}: {}", raw, e);
                continue;
            }
        };
        match entry.into_message() {
            Some(message) => messages.push(message),
            None => log::warn!("Skipping invalid/empty history entry: {}", raw),
        }
    }

    Ok(messages)
}

// ============================================================================
// Endpoint payloads
// ============================================================================

/// Body of `POST /api/chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chat_id: Option<ChatId>,
}

/// Reply of `POST /api/chat/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub new_chat_id: Option<ChatId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/update-title/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTitleRequest {
    pub chat_id: ChatId,
    pub new_title: String,
}

/// Reply of `POST /api/update-title/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTitleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub new_title: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/delete-chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteChatRequest {
    pub chat_id: ChatId,
}

/// Reply of `POST /api/delete-chat/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deleted_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Application events
// ============================================================================

/// Events broadcast between components after a sidebar mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ChatRenamed { chat_id: ChatId, new_title: String },
    ChatDeleted { chat_id: ChatId },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenamedDetail<'a> {
    chat_id: &'a str,
    new_title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedDetail<'a> {
    chat_id: &'a str,
}

impl AppEvent {
    pub const CHAT_RENAMED: &'static str = "chatRenamed";
    pub const CHAT_DELETED: &'static str = "chatDeleted";

    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ChatRenamed { .. } => Self::CHAT_RENAMED,
            AppEvent::ChatDeleted { .. } => Self::CHAT_DELETED,
        }
    }

    pub fn chat_id(&self) -> &str {
        match self {
            AppEvent::ChatRenamed { chat_id, .. } | AppEvent::ChatDeleted { chat_id } => chat_id,
        }
    }

    /// The `detail` payload carried by the DOM event
    pub fn detail(&self) -> Value {
        let detail = match self {
            AppEvent::ChatRenamed { chat_id, new_title } => serde_json::to_value(RenamedDetail {
                chat_id,
                new_title,
            }),
            AppEvent::ChatDeleted { chat_id } => serde_json::to_value(DeletedDetail { chat_id }),
        };
        detail.unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_history_content_and_parts() {
        let json = json!([
            {"role": "user", "content": "hi"},
            {"role": "model", "parts": ["hello", "there"]},
        ])
        .to_string();

        let history = parse_history(&json).unwrap();
        assert_eq!(
            history,
            vec![ChatMessage::user("hi"), ChatMessage::bot("hello\nthere")]
        );
    }

    #[test]
    fn test_parse_history_skips_invalid_entries() {
        let json = json!([
            {"role": "user", "content": "   "},
            {"content": "no role"},
            {"role": "assistant", "content": 42},
            "not an object",
            {"role": "assistant", "content": "kept"},
        ])
        .to_string();

        let history = parse_history(&json).unwrap();
        assert_eq!(history, vec![ChatMessage::bot("kept")]);
    }

    #[test]
    fn test_parse_history_non_array_is_empty() {
        assert!(parse_history(r#"{"role": "user"}"#).unwrap().is_empty());
        assert!(parse_history("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_history_rejects_broken_json() {
        let err = parse_history("[{").unwrap_err();
        assert!(matches!(err, ClientError::InvalidHistory(_)));
    }

    #[test]
    fn test_chat_request_omits_missing_chat_id() {
        let request = ChatRequest { message: "hello".into(), chat_id: None };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"message": "hello"}));

        let request = ChatRequest { message: "hello".into(), chat_id: Some("abc".into()) };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "hello", "chat_id": "abc"})
        );
    }

    #[test]
    fn test_event_detail_uses_camel_case() {
        let event = AppEvent::ChatRenamed { chat_id: "abc".into(), new_title: "Trip".into() };
        let detail = event.detail();
        assert_eq!(detail, json!({"chatId": "abc", "newTitle": "Trip"}));
        assert_eq!(event.name(), "chatRenamed");

        let deleted = AppEvent::ChatDeleted { chat_id: "abc".into() };
        assert_eq!(deleted.name(), "chatDeleted");
        assert_eq!(deleted.detail(), json!({"chatId": "abc"}));
    }
}
