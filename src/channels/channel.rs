//! Channel trait and the message types that flow through it.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::error::ChannelError;
use crate::form::{FormEvent, Reply};

/// A user event received from a channel, already decoded into a form event.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Name of the channel it arrived on. Replies are routed back by this.
    pub channel: String,
    /// Stable per-user identifier within the channel.
    pub user_id: String,
    /// Display name, if the channel knows one.
    pub user_name: Option<String>,
    /// Language code reported by the client (e.g. "ru", "en-US").
    pub language: Option<String>,
    pub event: FormEvent,
    /// Channel-specific routing data (chat id, callback id, ...).
    pub metadata: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(channel: impl Into<String>, user_id: impl Into<String>, event: FormEvent) -> Self {
        Self {
            channel: channel.into(),
            user_id: user_id.into(),
            user_name: None,
            language: None,
            event,
            metadata: serde_json::Value::Null,
            received_at: Utc::now(),
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// String field from the metadata object.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Stream of messages from one or more channels.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A bidirectional user-facing transport.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Begin receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a reply to the user who sent `msg`.
    async fn respond(&self, msg: &IncomingMessage, reply: Reply) -> Result<(), ChannelError>;

    /// Tell the transport `msg` was handled (e.g. stop a button's spinner).
    async fn acknowledge(&self, _msg: &IncomingMessage) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let msg = IncomingMessage::new("telegram", "42", FormEvent::from_text("Alice"))
            .with_user_name("Alice")
            .with_language("ru")
            .with_metadata(serde_json::json!({"chat_id": "99"}));

        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.user_name.as_deref(), Some("Alice"));
        assert_eq!(msg.language.as_deref(), Some("ru"));
        assert_eq!(msg.meta_str("chat_id"), Some("99"));
        assert_eq!(msg.meta_str("missing"), None);
    }

    #[test]
    fn default_metadata_is_null() {
        let msg = IncomingMessage::new("cli", "local-user", FormEvent::Unsupported);
        assert!(msg.metadata.is_null());
        assert_eq!(msg.meta_str("chat_id"), None);
    }
}
