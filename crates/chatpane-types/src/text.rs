use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Longest slice of a non-JSON body we are willing to show the user
const ERROR_DETAIL_MAX_CHARS: usize = 300;

const HTML_ERROR_PAGE: &str = "Server returned an HTML error page.";

/// Shorten a title for the sidebar, appending `...` when cut
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut short: String = title.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped text with newlines turned into line breaks
pub fn render_plain(content: &str) -> String {
    escape_html(content).replace('\n', "<br>")
}

/// Find a cookie value in a `document.cookie` style string.
///
/// Empty values count as missing.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| {
            let (key, value) = cookie.split_once('=')?;
            (key == name).then_some(value)
        })
        .map(|raw| match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
        .filter(|value| !value.is_empty())
}

/// Read a query parameter from a `location.search` string (with or without `?`).
///
/// Empty values count as missing.
pub fn query_param(search: &str, name: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key) == name).then(|| decode_component(value))
        })
        .filter(|value| !value.is_empty())
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Turn a raw HTTP reply into a typed payload or a classified error.
///
/// A non-JSON content type means the server failed outside the API (an HTML
/// error page, a proxy message); a JSON reply with an error status carries
/// its own `error` field.
pub fn classify_response<T: DeserializeOwned>(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<T> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    if !is_json {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| error_field(&value))
            .unwrap_or_else(|| {
                if body.trim_start().starts_with("<!DOCTYPE html>") {
                    HTML_ERROR_PAGE.to_string()
                } else {
                    body.chars().take(ERROR_DETAIL_MAX_CHARS).collect()
                }
            });
        return Err(ClientError::Server { status, detail });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(match error_field(&value) {
            Some(message) => ClientError::Rejected(message),
            None => ClientError::Server { status, detail: String::new() },
        });
    }

    serde_json::from_value(value).map_err(|e| ClientError::Malformed(e.to_string()))
}

fn error_field(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
