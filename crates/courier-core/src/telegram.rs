//! Telegram Bot API transport.
//!
//! Documents go out as `sendDocument` multipart posts; the chat-id
//! discovery command reads `getUpdates`. A delivery counts as sent only
//! when the HTTP status is 200 and the body says `ok`; anything else is
//! surfaced with the API's own description so the operator sees what
//! Telegram saw.

use crate::dispatch::{DocumentTransport, OutboundDocument, SendError};
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from non-delivery API calls
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Request could not be built or completed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `ok: false`
    #[error("API error: {0}")]
    Api(String),
}

/// Status envelope shared by Bot API responses.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl Chat {
    /// Group title, person's name, username, or the bare id.
    fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            if !title.is_empty() {
                return title.clone();
            }
        }
        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        if !full_name.is_empty() {
            return full_name;
        }
        if let Some(username) = &self.username {
            if !username.is_empty() {
                return format!("@{username}");
            }
        }
        self.id.to_string()
    }
}

/// One chat that recently messaged the bot.
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub id: i64,
    pub kind: String,
    pub display_name: String,
}

/// Blocking Bot API client. One instance per run; the underlying
/// connection pool is reused across files.
pub struct TelegramTransport {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramTransport {
    /// Build a client with the per-request timeout applied.
    pub fn new(api_base: &str, token: &str) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    /// Distinct chats seen in the bot's recent updates, first-seen order.
    ///
    /// Only covers updates Telegram still retains; a chat that has been
    /// quiet for a while will not appear until someone messages the bot
    /// again.
    pub fn recent_chats(&self) -> Result<Vec<ChatSummary>, TelegramError> {
        let response = self.client.get(self.endpoint("getUpdates")).send()?;
        let body: UpdatesResponse = response.json()?;
        if !body.ok {
            return Err(TelegramError::Api(
                body.description
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        Ok(collect_chats(body))
    }
}

fn collect_chats(body: UpdatesResponse) -> Vec<ChatSummary> {
    let mut seen = HashSet::new();
    let mut chats = Vec::new();
    for update in body.result {
        let Some(message) = update.message else {
            continue;
        };
        let chat = message.chat;
        if !seen.insert(chat.id) {
            continue;
        }
        let display_name = chat.display_name();
        chats.push(ChatSummary {
            id: chat.id,
            kind: chat.kind,
            display_name,
        });
    }
    chats
}

impl DocumentTransport for TelegramTransport {
    fn send_document(&self, doc: &OutboundDocument) -> Result<(), SendError> {
        let bytes =
            std::fs::read(&doc.path).map_err(|e| SendError::Transport(e.to_string()))?;
        let part = multipart::Part::bytes(bytes).file_name(doc.file_name.clone());
        let form = multipart::Form::new()
            .part("document", part)
            .text("chat_id", doc.chat_id.clone())
            .text("caption", doc.caption.clone());

        let response = self
            .client
            .post(self.endpoint("sendDocument"))
            .multipart(form)
            .send()
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        let body: ApiStatus = response
            .json()
            .map_err(|e| SendError::Transport(e.to_string()))?;

        if status == reqwest::StatusCode::OK && body.ok {
            debug!("delivered {} to chat {}", doc.file_name, doc.chat_id);
            return Ok(());
        }
        Err(SendError::Rejected(
            body.description
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let transport = TelegramTransport::new("https://api.telegram.org", "123:abc").unwrap();
        assert_eq!(
            transport.endpoint("sendDocument"),
            "https://api.telegram.org/bot123:abc/sendDocument"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let transport = TelegramTransport::new("http://127.0.0.1:8080/", "123:abc").unwrap();
        assert_eq!(
            transport.endpoint("getUpdates"),
            "http://127.0.0.1:8080/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_chat_display_name_prefers_title() {
        let chat = Chat {
            id: 5,
            kind: "group".to_string(),
            title: Some("Area 4 Reports".to_string()),
            first_name: Some("Ignored".to_string()),
            last_name: None,
            username: None,
        };
        assert_eq!(chat.display_name(), "Area 4 Reports");
    }

    #[test]
    fn test_chat_display_name_person_then_username_then_id() {
        let person = Chat {
            id: 5,
            kind: "private".to_string(),
            title: None,
            first_name: Some("Uy".to_string()),
            last_name: Some("Naro".to_string()),
            username: Some("unaro".to_string()),
        };
        assert_eq!(person.display_name(), "Uy Naro");

        let username_only = Chat {
            id: 5,
            kind: "private".to_string(),
            title: None,
            first_name: None,
            last_name: None,
            username: Some("unaro".to_string()),
        };
        assert_eq!(username_only.display_name(), "@unaro");

        let bare = Chat {
            id: 42,
            kind: "private".to_string(),
            title: None,
            first_name: None,
            last_name: None,
            username: None,
        };
        assert_eq!(bare.display_name(), "42");
    }

    #[test]
    fn test_collect_chats_dedupes_by_id() {
        let body: UpdatesResponse = serde_json::from_str(
            r#"{
                "ok": true,
                "result": [
                    {"update_id": 1, "message": {"message_id": 1, "chat": {"id": 10, "type": "private", "first_name": "Uy", "last_name": "Naro"}}},
                    {"update_id": 2, "message": {"message_id": 2, "chat": {"id": 10, "type": "private", "first_name": "Uy", "last_name": "Naro"}}},
                    {"update_id": 3},
                    {"update_id": 4, "message": {"message_id": 3, "chat": {"id": -20, "type": "group", "title": "Area 4 Reports"}}}
                ]
            }"#,
        )
        .unwrap();

        let chats = collect_chats(body);
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, 10);
        assert_eq!(chats[0].display_name, "Uy Naro");
        assert_eq!(chats[1].id, -20);
        assert_eq!(chats[1].kind, "group");
        assert_eq!(chats[1].display_name, "Area 4 Reports");
    }
}
