use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use form_bot::bot::Bot;
use form_bot::channels::{Channel, ChannelManager, CliChannel, TelegramChannel};
use form_bot::config::{BotConfig, StorageConfig};
use form_bot::form::FormEngine;
use form_bot::i18n::Translations;
use form_bot::routes::{ProfileRouteState, profile_routes};
use form_bot::store::{LibSqlBackend, MemoryStore, ProfileStore, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env().context("invalid configuration")?;

    // Initialize tracing. The guard flushes the file writer on exit.
    let (file_layer, _log_guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "form-bot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let translations = Arc::new(
        Translations::builtin()
            .with_default_language(&config.default_language)
            .context("invalid default language")?,
    );

    eprintln!("📝 Form Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Languages: {} (default {})",
        translations.languages().join(", "),
        translations.default_language()
    );

    // ── Storage ──────────────────────────────────────────────────────────
    let (sessions, profiles): (Arc<dyn SessionStore>, Arc<dyn ProfileStore>) =
        match &config.storage {
            StorageConfig::Memory => {
                eprintln!("   Storage: in-memory (lost on restart)");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn SessionStore>,
                    store as Arc<dyn ProfileStore>,
                )
            }
            StorageConfig::LibSql(path) => {
                let db = Arc::new(
                    LibSqlBackend::new_local(path)
                        .await
                        .with_context(|| format!("failed to open database at {}", path.display()))?,
                );
                eprintln!("   Storage: {}", path.display());
                (
                    db.clone() as Arc<dyn SessionStore>,
                    db as Arc<dyn ProfileStore>,
                )
            }
        };

    let engine = Arc::new(FormEngine::new(
        Arc::clone(&sessions),
        Arc::clone(&profiles),
        Arc::clone(&translations),
    ));

    // ── REST routes ──────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = profile_routes(ProfileRouteState {
            sessions: Arc::clone(&sessions),
            profiles: Arc::clone(&profiles),
        });
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        eprintln!("   Profile API: http://0.0.0.0:{port}/api/profiles/{{user_id}}");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Profile API server stopped");
            }
        });
    }

    // ── Channels ─────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();

    if let Some(telegram) = &config.telegram {
        eprintln!(
            "   Telegram: enabled (allowed: {})",
            if telegram.allows_everyone() {
                "everyone".to_string()
            } else {
                telegram.allowed_users.join(", ")
            }
        );

        let channel = TelegramChannel::new(
            telegram.bot_token.clone(),
            telegram.allowed_users.clone(),
        );
        if let Err(e) = channel.health_check().await {
            tracing::warn!(error = %e, "Telegram health check failed");
        }
        if let Err(e) = channel.set_commands(&translations).await {
            tracing::warn!(error = %e, "Failed to register Telegram commands");
        }
        channels.add(Box::new(channel));
    }

    if config.cli_enabled() {
        channels.add(Box::new(CliChannel::new(config.cli_language.clone())));
        eprintln!("   CLI: /fillform to begin, #code to pick an option, !photo <id> to upload.");
    }

    eprintln!("   Channels: {}\n", channels.names().join(", "));

    Bot::new(engine, Arc::new(channels)).run().await?;

    Ok(())
}
