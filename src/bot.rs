//! Bot main loop: pulls messages from every channel and runs them through
//! the form engine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::channels::{ChannelManager, IncomingMessage};
use crate::error::Error;
use crate::form::FormEngine;
use crate::form::Reply;
use crate::i18n::MessageKey;

/// Number of tracked per-user tasks above which finished ones are dropped.
const PENDING_PRUNE_THRESHOLD: usize = 256;

/// Connects channels to the form engine.
#[derive(Clone)]
pub struct Bot {
    engine: Arc<FormEngine>,
    channels: Arc<ChannelManager>,
}

impl Bot {
    pub fn new(engine: Arc<FormEngine>, channels: Arc<ChannelManager>) -> Self {
        Self { engine, channels }
    }

    /// Run until Ctrl+C or until every channel stream ends.
    ///
    /// Each message is handled on its own task. Messages from the same
    /// user are chained so they are processed in arrival order; different
    /// users proceed concurrently.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;
        let mut pending: HashMap<String, JoinHandle<()>> = HashMap::new();

        tracing::info!(channels = ?self.channels.names(), "Form bot ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            if pending.len() >= PENDING_PRUNE_THRESHOLD {
                pending.retain(|_, handle| !handle.is_finished());
            }

            let key = format!("{}:{}", message.channel, message.user_id);
            let previous = pending.remove(&key);
            let bot = self.clone();
            let handle = tokio::spawn(async move {
                if let Some(previous) = previous {
                    // A panic in the previous task must not stall this user.
                    if let Err(e) = previous.await {
                        tracing::warn!(error = %e, "Previous message task failed");
                    }
                }
                bot.process(&message).await;
            });
            pending.insert(key, handle);
        }

        for (_, handle) in pending.drain() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Message task failed");
            }
        }

        self.channels.shutdown_all().await?;
        Ok(())
    }

    /// Handle one message end to end: acknowledge it, run the engine and
    /// deliver the replies. Failures are logged, never propagated.
    pub async fn process(&self, message: &IncomingMessage) {
        if let Err(e) = self.channels.acknowledge(message).await {
            tracing::warn!(channel = %message.channel, error = %e, "Failed to acknowledge message");
        }

        let replies = match self
            .engine
            .handle(&message.user_id, message.language.as_deref(), &message.event)
            .await
        {
            Ok(handled) => {
                tracing::debug!(
                    channel = %message.channel,
                    user_id = %message.user_id,
                    user_name = message.user_name.as_deref().unwrap_or(""),
                    transition = ?handled.transition,
                    latency_ms = (Utc::now() - message.received_at).num_milliseconds(),
                    "Message handled"
                );
                handled.replies
            }
            Err(e) => {
                tracing::error!(
                    channel = %message.channel,
                    user_id = %message.user_id,
                    user_name = message.user_name.as_deref().unwrap_or(""),
                    error = %e,
                    "Error handling message"
                );
                let l = self
                    .engine
                    .translations()
                    .localize(message.language.as_deref());
                vec![Reply::text(l.get(MessageKey::InternalError))]
            }
        };

        for reply in replies {
            if let Err(e) = self.channels.respond(message, reply).await {
                tracing::warn!(channel = %message.channel, error = %e, "Failed to send reply");
            }
        }
    }
}
