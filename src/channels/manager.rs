//! ChannelManager: merges every channel's stream and routes replies back.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;
use crate::form::Reply;

/// Owns the registered channels, keyed by name.
#[derive(Default)]
pub struct ChannelManager {
    channels: HashMap<String, Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. A later channel with the same name replaces it.
    pub fn add(&mut self, channel: Box<dyn Channel>) {
        let name = channel.name().to_string();
        if self.channels.insert(name.clone(), channel).is_some() {
            tracing::warn!(channel = %name, "Replaced already registered channel");
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Start every channel and merge their streams.
    ///
    /// A channel that fails to start is logged and skipped; it is an error
    /// only when none start.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        let mut failures = Vec::new();

        for (name, channel) in &self.channels {
            match channel.start().await {
                Ok(stream) => {
                    tracing::info!(channel = %name, "Channel started");
                    streams.push(stream);
                }
                Err(e) => {
                    tracing::error!(channel = %name, error = %e, "Channel failed to start");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }

        if streams.is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "all".into(),
                reason: if failures.is_empty() {
                    "no channels registered".into()
                } else {
                    failures.join("; ")
                },
            });
        }

        Ok(stream::select_all(streams).boxed())
    }

    fn get(&self, name: &str) -> Result<&dyn Channel, ChannelError> {
        self.channels
            .get(name)
            .map(|c| c.as_ref())
            .ok_or_else(|| ChannelError::UnknownChannel(name.to_string()))
    }

    /// Send `reply` back on the channel `msg` arrived on.
    pub async fn respond(&self, msg: &IncomingMessage, reply: Reply) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.respond(msg, reply).await
    }

    pub async fn acknowledge(&self, msg: &IncomingMessage) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.acknowledge(msg).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for (name, channel) in &self.channels {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = %name, error = %e, "Channel shutdown failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::form::FormEvent;

    /// Emits a fixed list of messages and records replies.
    struct FakeChannel {
        name: &'static str,
        inbox: Vec<&'static str>,
        sent: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
    }

    impl FakeChannel {
        fn new(name: &'static str, inbox: Vec<&'static str>) -> Self {
            Self {
                name,
                inbox,
                sent: Arc::new(Mutex::new(Vec::new())),
                fail_start: false,
            }
        }
    }

    #[async_trait]
    impl Channel for FakeChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self) -> Result<MessageStream, ChannelError> {
            if self.fail_start {
                return Err(ChannelError::StartupFailed {
                    name: self.name.into(),
                    reason: "boom".into(),
                });
            }
            let name = self.name;
            let messages: Vec<IncomingMessage> = self
                .inbox
                .iter()
                .map(|text| IncomingMessage::new(name, "u", FormEvent::from_text(text)))
                .collect();
            Ok(stream::iter(messages).boxed())
        }

        async fn respond(&self, _msg: &IncomingMessage, reply: Reply) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(reply.content().to_string());
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn merges_streams_from_all_channels() {
        let mut manager = ChannelManager::new();
        manager.add(Box::new(FakeChannel::new("a", vec!["one", "two"])));
        manager.add(Box::new(FakeChannel::new("b", vec!["three"])));

        let stream = manager.start_all().await.unwrap();
        let mut texts: Vec<String> = stream
            .map(|m| match m.event {
                FormEvent::Text { text } => text,
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
            .await;
        texts.sort();
        assert_eq!(texts, ["one", "three", "two"]);
        assert_eq!(manager.names(), ["a", "b"]);
    }

    #[tokio::test]
    async fn respond_routes_by_channel_name() {
        let a = FakeChannel::new("a", vec![]);
        let b = FakeChannel::new("b", vec![]);
        let sent_a = Arc::clone(&a.sent);
        let sent_b = Arc::clone(&b.sent);

        let mut manager = ChannelManager::new();
        manager.add(Box::new(a));
        manager.add(Box::new(b));

        let msg = IncomingMessage::new("b", "u", FormEvent::Unsupported);
        manager.respond(&msg, Reply::text("hi")).await.unwrap();

        assert!(sent_a.lock().unwrap().is_empty());
        assert_eq!(*sent_b.lock().unwrap(), ["hi"]);
    }

    #[tokio::test]
    async fn respond_to_unknown_channel_fails() {
        let manager = ChannelManager::new();
        let msg = IncomingMessage::new("nope", "u", FormEvent::Unsupported);
        let err = manager.respond(&msg, Reply::text("hi")).await.unwrap_err();
        assert!(matches!(err, ChannelError::UnknownChannel(name) if name == "nope"));
    }

    #[tokio::test]
    async fn failing_channel_is_skipped() {
        let mut broken = FakeChannel::new("broken", vec![]);
        broken.fail_start = true;

        let mut manager = ChannelManager::new();
        manager.add(Box::new(broken));
        manager.add(Box::new(FakeChannel::new("ok", vec!["hello"])));

        let stream = manager.start_all().await.unwrap();
        assert_eq!(stream.count().await, 1);
    }

    #[tokio::test]
    async fn start_fails_when_nothing_starts() {
        let manager = ChannelManager::new();
        assert!(manager.start_all().await.is_err());
    }
}
