//! Telegram channel: long-polls the Bot API for updates.
//!
//! Native Rust Telegram Bot API implementation over `reqwest`. Text and
//! photo messages become form events, inline keyboard presses become
//! choices, and replies go out as messages with inline keyboards or as
//! photos re-sent by file id.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;
use crate::form::{ChoiceButton, Command, FormEvent, PhotoSize, Reply};
use crate::i18n::Translations;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Telegram channel: connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    allowed_users: Vec<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, allowed_users: Vec<String>) -> Self {
        Self {
            bot_token,
            allowed_users,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.bot_token, method)
    }

    /// Call a Bot API method with a JSON body and fail on non-2xx.
    async fn call(&self, method: &str, body: &Value) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("{method}: {e}"),
            })?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let err = resp.text().await.unwrap_or_default();
        Err(ChannelError::SendFailed {
            name: "telegram".into(),
            reason: format!("{method} returned {status}: {err}"),
        })
    }

    /// Send text, splitting at Telegram's limit. The keyboard, if any,
    /// rides on the last chunk.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        choices: &[Vec<ChoiceButton>],
    ) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let mut body = json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if i == last && !choices.is_empty() {
                body["reply_markup"] = inline_keyboard(choices);
            }
            self.call("sendMessage", &body).await?;
        }
        Ok(())
    }

    /// Re-send a previously uploaded photo by file id.
    async fn send_photo(
        &self,
        chat_id: &str,
        file_id: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        let body = json!({
            "chat_id": chat_id,
            "photo": file_id,
            "caption": caption,
        });
        self.call("sendPhoto", &body).await?;
        tracing::debug!(chat_id, "Telegram photo sent");
        Ok(())
    }

    /// Register the command menu, once per known language plus an
    /// unscoped default.
    pub async fn set_commands(&self, translations: &Translations) -> Result<(), ChannelError> {
        let scopes = std::iter::once(None).chain(translations.languages().into_iter().map(Some));

        for language in scopes {
            let l = translations.localize(language);
            let commands: Vec<Value> = Command::ALL
                .iter()
                .map(|c| {
                    json!({
                        "command": c.name(),
                        "description": l.get(c.description_key()),
                    })
                })
                .collect();

            let mut body = json!({ "commands": commands });
            if let Some(code) = language {
                body["language_code"] = Value::String(code.to_string());
            }
            self.call("setMyCommands", &body).await?;
        }

        tracing::info!("Telegram command menu registered");
        Ok(())
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let allowed_users = self.allowed_users.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;
            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if data.get("ok").and_then(Value::as_bool) == Some(false) {
                    let description = data
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    tracing::warn!(description, "Telegram getUpdates rejected");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }

                let Some(results) = data.get("result").and_then(Value::as_array) else {
                    continue;
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_update(update, &allowed_users) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(&self, msg: &IncomingMessage, reply: Reply) -> Result<(), ChannelError> {
        let chat_id = msg
            .meta_str("chat_id")
            .ok_or_else(|| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "No chat_id in message metadata".into(),
            })?;

        match reply {
            Reply::Text { text, choices } => self.send_message(chat_id, &text, &choices).await,
            Reply::Photo { file_id, caption } => {
                self.send_photo(chat_id, &file_id, &caption).await
            }
        }
    }

    /// Stop the button spinner and remove the pressed keyboard so stale
    /// options cannot be pressed again.
    async fn acknowledge(&self, msg: &IncomingMessage) -> Result<(), ChannelError> {
        let Some(callback_id) = msg.meta_str("callback_query_id") else {
            return Ok(());
        };
        self.call(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_id }),
        )
        .await?;

        if let (Some(chat_id), Some(message_id)) = (
            msg.meta_str("chat_id"),
            msg.metadata.get("message_id").and_then(Value::as_i64),
        ) {
            self.call(
                "editMessageReplyMarkup",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "reply_markup": { "inline_keyboard": [] },
                }),
            )
            .await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn api_url(token: &SecretString, method: &str) -> String {
    format!(
        "https://api.telegram.org/bot{}/{method}",
        token.expose_secret()
    )
}

/// Check if any identity in the iterator matches the allowed users list.
fn check_user_allowed<'a>(
    allowed_users: &[String],
    identities: impl IntoIterator<Item = &'a str>,
) -> bool {
    let ids: Vec<&str> = identities.into_iter().collect();
    allowed_users
        .iter()
        .any(|u| u == "*" || ids.contains(&u.as_str()))
}

/// Decode one update into an incoming message.
///
/// Returns `None` for update kinds the bot does not subscribe to and for
/// senders outside the allowlist.
fn parse_update(update: &Value, allowed_users: &[String]) -> Option<IncomingMessage> {
    let (from, chat, event, callback) = if let Some(message) = update.get("message") {
        (
            message.get("from")?,
            message.get("chat")?,
            message_event(message),
            None,
        )
    } else if let Some(query) = update.get("callback_query") {
        let message = query.get("message")?;
        let data = query.get("data").and_then(Value::as_str).unwrap_or_default();
        (
            query.get("from")?,
            message.get("chat")?,
            FormEvent::choice(data),
            Some((query.get("id")?.as_str()?, message.get("message_id")?)),
        )
    } else {
        return None;
    };

    let username = from.get("username").and_then(Value::as_str);
    let user_id = from.get("id").and_then(Value::as_i64)?.to_string();

    let identities = std::iter::once(user_id.as_str()).chain(username);
    if !check_user_allowed(allowed_users, identities) {
        tracing::warn!(
            username = username.unwrap_or("unknown"),
            user_id = %user_id,
            "Telegram: ignoring message from unauthorized user"
        );
        return None;
    }

    let chat_id = chat.get("id").and_then(Value::as_i64)?.to_string();
    let mut metadata = json!({
        "chat_id": chat_id,
        "username": username,
    });
    if let Some((callback_id, message_id)) = callback {
        metadata["callback_query_id"] = Value::String(callback_id.to_string());
        metadata["message_id"] = message_id.clone();
    }

    let mut incoming = IncomingMessage::new("telegram", user_id, event).with_metadata(metadata);

    if let Some(name) = from
        .get("first_name")
        .and_then(Value::as_str)
        .or(username)
    {
        incoming = incoming.with_user_name(name);
    }
    if let Some(code) = from.get("language_code").and_then(Value::as_str) {
        incoming = incoming.with_language(code);
    }
    Some(incoming)
}

/// Text (or command) for text messages, photo variants for photos,
/// `Unsupported` for everything else.
fn message_event(message: &Value) -> FormEvent {
    if let Some(text) = message.get("text").and_then(Value::as_str) {
        return FormEvent::from_text(text);
    }
    if let Some(photo) = message.get("photo") {
        match serde_json::from_value::<Vec<PhotoSize>>(photo.clone()) {
            Ok(sizes) => return FormEvent::Photo { sizes },
            Err(e) => tracing::warn!("Telegram: malformed photo sizes: {e}"),
        }
    }
    FormEvent::Unsupported
}

/// Telegram `InlineKeyboardMarkup` for option rows.
fn inline_keyboard(choices: &[Vec<ChoiceButton>]) -> Value {
    let rows: Vec<Vec<Value>> = choices
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.label, "callback_data": b.code }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((limit, _)) = remaining.char_indices().nth(max_len) else {
            chunks.push(remaining.to_string());
            break;
        };

        // Find a good split point
        let chunk = &remaining[..limit];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(limit);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { limit } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(token: &str, allowed: &[&str]) -> TelegramChannel {
        TelegramChannel::new(
            SecretString::from(token.to_string()),
            allowed.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn everyone() -> Vec<String> {
        vec!["*".to_string()]
    }

    fn text_update(text: &str) -> Value {
        json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": {"id": 42, "username": "alice", "first_name": "Alice", "language_code": "ru"},
                "chat": {"id": 4242, "type": "private"},
                "text": text
            }
        })
    }

    // ── Basic channel tests ─────────────────────────────────────────

    #[test]
    fn telegram_channel_name() {
        let ch = channel("fake-token", &["*"]);
        assert_eq!(ch.name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        let ch = channel("123:ABC", &[]);
        assert_eq!(
            ch.api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    // ── User allowlist tests ────────────────────────────────────────

    fn allowed(users: &[&str]) -> Vec<String> {
        users.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn telegram_user_allowed_wildcard() {
        assert!(check_user_allowed(&allowed(&["*"]), ["anyone"]));
    }

    #[test]
    fn telegram_user_allowed_specific() {
        let users = allowed(&["alice", "bob"]);
        assert!(check_user_allowed(&users, ["alice"]));
        assert!(!check_user_allowed(&users, ["eve"]));
    }

    #[test]
    fn telegram_user_denied_empty() {
        assert!(!check_user_allowed(&[], ["anyone"]));
    }

    #[test]
    fn telegram_user_exact_match_not_substring() {
        let users = allowed(&["alice"]);
        assert!(!check_user_allowed(&users, ["alice_bot"]));
        assert!(!check_user_allowed(&users, ["malice"]));
    }

    #[test]
    fn telegram_user_allowed_by_numeric_id_identity() {
        let users = allowed(&["123456789"]);
        assert!(check_user_allowed(&users, ["unknown", "123456789"]));
    }

    #[test]
    fn telegram_user_denied_when_none_of_identities_match() {
        let users = allowed(&["alice", "987654321"]);
        assert!(!check_user_allowed(&users, ["unknown", "123456789"]));
    }

    // ── Update parsing tests ────────────────────────────────────────

    #[test]
    fn parse_text_message() {
        let msg = parse_update(&text_update("Alice"), &everyone()).unwrap();
        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.user_name.as_deref(), Some("Alice"));
        assert_eq!(msg.language.as_deref(), Some("ru"));
        assert_eq!(msg.meta_str("chat_id"), Some("4242"));
        assert_eq!(msg.meta_str("username"), Some("alice"));
        assert_eq!(msg.event, FormEvent::from_text("Alice"));
        assert_eq!(msg.meta_str("callback_query_id"), None);
    }

    #[test]
    fn parse_command_message() {
        let msg = parse_update(&text_update("/fillform@form_bot"), &everyone()).unwrap();
        assert_eq!(
            msg.event,
            FormEvent::Command {
                command: Command::FillForm
            }
        );
    }

    #[test]
    fn parse_photo_message() {
        let update = json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": {"id": 42},
                "chat": {"id": 4242},
                "photo": [
                    {"file_id": "small", "file_unique_id": "us", "width": 90, "height": 90, "file_size": 1000},
                    {"file_id": "p1", "file_unique_id": "u1", "width": 800, "height": 600}
                ]
            }
        });
        let msg = parse_update(&update, &everyone()).unwrap();
        match msg.event {
            FormEvent::Photo { sizes } => {
                assert_eq!(sizes.len(), 2);
                assert_eq!(sizes[1].file_id, "p1");
                assert_eq!(sizes[1].file_unique_id, "u1");
            }
            other => panic!("expected photo, got {other:?}"),
        }
        assert!(msg.user_name.is_none());
        assert!(msg.language.is_none());
    }

    #[test]
    fn parse_sticker_is_unsupported() {
        let update = json!({
            "update_id": 3,
            "message": {
                "message_id": 12,
                "from": {"id": 42},
                "chat": {"id": 4242},
                "sticker": {"file_id": "s"}
            }
        });
        let msg = parse_update(&update, &everyone()).unwrap();
        assert_eq!(msg.event, FormEvent::Unsupported);
    }

    #[test]
    fn parse_callback_query() {
        let update = json!({
            "update_id": 4,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42, "username": "alice"},
                "message": {"message_id": 77, "chat": {"id": 4242}},
                "data": "male_gender"
            }
        });
        let msg = parse_update(&update, &everyone()).unwrap();
        assert_eq!(msg.event, FormEvent::choice("male_gender"));
        assert_eq!(msg.meta_str("callback_query_id"), Some("cb-1"));
        assert_eq!(msg.metadata["message_id"], 77);
        assert_eq!(msg.meta_str("chat_id"), Some("4242"));
    }

    #[test]
    fn parse_drops_unauthorized_sender() {
        let allowed = vec!["bob".to_string()];
        assert!(parse_update(&text_update("hi"), &allowed).is_none());

        let by_name = vec!["alice".to_string()];
        assert!(parse_update(&text_update("hi"), &by_name).is_some());

        let by_id = vec!["42".to_string()];
        assert!(parse_update(&text_update("hi"), &by_id).is_some());
    }

    #[test]
    fn parse_ignores_other_update_kinds() {
        let update = json!({"update_id": 5, "edited_message": {"text": "x"}});
        assert!(parse_update(&update, &everyone()).is_none());
    }

    // ── Keyboard tests ──────────────────────────────────────────────

    #[test]
    fn inline_keyboard_layout() {
        let choices = vec![
            vec![ChoiceButton::new("Yes", "yes_news"), ChoiceButton::new("No", "no_news")],
            vec![ChoiceButton::new("Maybe", "maybe")],
        ];
        let markup = inline_keyboard(&choices);
        assert_eq!(
            markup,
            json!({"inline_keyboard": [
                [{"text": "Yes", "callback_data": "yes_news"}, {"text": "No", "callback_data": "no_news"}],
                [{"text": "Maybe", "callback_data": "maybe"}]
            ]})
        );
    }

    // ── Sending without network ─────────────────────────────────────

    #[tokio::test]
    async fn respond_without_chat_id_fails() {
        let ch = channel("fake-token", &["*"]);
        let msg = IncomingMessage::new("telegram", "42", FormEvent::Unsupported);
        let err = ch.respond(&msg, Reply::text("hi")).await.unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }

    #[tokio::test]
    async fn acknowledge_plain_message_is_noop() {
        let ch = channel("fake-token", &["*"]);
        let msg = parse_update(&text_update("hi"), &everyone()).unwrap();
        assert!(ch.acknowledge(&msg).await.is_ok());
    }

    // ── Message splitting tests ─────────────────────────────────────

    #[test]
    fn split_message_short() {
        let chunks = split_message("Hello", 4096);
        assert_eq!(chunks, vec!["Hello"]);
    }

    #[test]
    fn split_message_exact_limit() {
        let msg = "a".repeat(4096);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(2000));
        assert_eq!(chunks[1], "b".repeat(3000));
    }

    #[test]
    fn split_message_no_good_split_point() {
        let msg = "a".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn split_message_counts_characters_not_bytes() {
        // Cyrillic letters are two bytes each.
        let msg = "я".repeat(4096);
        assert_eq!(split_message(&msg, 4096).len(), 1);

        let msg = "я".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4096);
        assert_eq!(chunks[1].chars().count(), 904);
    }
}
