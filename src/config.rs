//! Configuration types, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Database path used when `FORM_BOT_DB_PATH` is unset.
pub const DEFAULT_DB_PATH: &str = "./data/form-bot.db";

/// Where sessions and profiles live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process memory only; lost on restart.
    Memory,
    /// libSQL database file.
    LibSql(PathBuf),
}

/// Telegram channel settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Usernames or numeric ids; `*` admits everyone.
    pub allowed_users: Vec<String>,
}

impl TelegramConfig {
    pub fn allows_everyone(&self) -> bool {
        self.allowed_users.iter().any(|u| u == "*")
    }
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// `None` runs the CLI channel only.
    pub telegram: Option<TelegramConfig>,
    pub storage: StorageConfig,
    /// Port for the REST routes; disabled when `None`.
    pub http_port: Option<u16>,
    pub default_language: String,
    /// Run the CLI channel even when Telegram is configured.
    pub force_cli: bool,
    /// Language the CLI user is treated as speaking; the default when `None`.
    pub cli_language: Option<String>,
    /// Directory for daily-rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl BotConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram = get("TELEGRAM_BOT_TOKEN").map(|token| TelegramConfig {
            bot_token: SecretString::from(token),
            allowed_users: get("TELEGRAM_ALLOWED_USERS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        });

        let storage = match get("FORM_BOT_DB_PATH").as_deref() {
            Some(":memory:") => StorageConfig::Memory,
            Some(path) => StorageConfig::LibSql(PathBuf::from(path)),
            None => StorageConfig::LibSql(PathBuf::from(DEFAULT_DB_PATH)),
        };

        let http_port = get("FORM_BOT_HTTP_PORT")
            .map(|v| {
                v.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                    key: "FORM_BOT_HTTP_PORT".into(),
                    message: format!("'{v}': {e}"),
                })
            })
            .transpose()?;

        let force_cli = match get("FORM_BOT_CLI").as_deref() {
            None => false,
            Some(v) => parse_flag(v).ok_or_else(|| ConfigError::InvalidValue {
                key: "FORM_BOT_CLI".into(),
                message: format!("'{v}' is not a boolean"),
            })?,
        };

        Ok(Self {
            telegram,
            storage,
            http_port,
            default_language: get("FORM_BOT_DEFAULT_LANG").unwrap_or_else(|| "en".to_string()),
            force_cli,
            cli_language: get("FORM_BOT_CLI_LANG"),
            log_dir: get("FORM_BOT_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Whether the CLI channel should run.
    pub fn cli_enabled(&self) -> bool {
        self.force_cli || self.telegram.is_none()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.telegram.is_none());
        assert_eq!(cfg.storage, StorageConfig::LibSql(PathBuf::from(DEFAULT_DB_PATH)));
        assert_eq!(cfg.http_port, None);
        assert_eq!(cfg.default_language, "en");
        assert!(!cfg.force_cli);
        assert!(cfg.cli_enabled());
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn telegram_with_allowlist() {
        let cfg = config(&[
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("TELEGRAM_ALLOWED_USERS", "alice, 42,,"),
        ])
        .unwrap();
        let tg = cfg.telegram.as_ref().unwrap();
        assert_eq!(tg.bot_token.expose_secret(), "123:ABC");
        assert_eq!(tg.allowed_users, ["alice", "42"]);
        assert!(!tg.allows_everyone());
        assert!(!cfg.cli_enabled());
    }

    #[test]
    fn telegram_allows_everyone_by_default() {
        let cfg = config(&[("TELEGRAM_BOT_TOKEN", "t")]).unwrap();
        assert!(cfg.telegram.unwrap().allows_everyone());
    }

    #[test]
    fn blank_token_means_no_telegram() {
        let cfg = config(&[("TELEGRAM_BOT_TOKEN", "   ")]).unwrap();
        assert!(cfg.telegram.is_none());
    }

    #[test]
    fn memory_storage() {
        let cfg = config(&[("FORM_BOT_DB_PATH", ":memory:")]).unwrap();
        assert_eq!(cfg.storage, StorageConfig::Memory);
    }

    #[test]
    fn http_port_parsed_and_validated() {
        let cfg = config(&[("FORM_BOT_HTTP_PORT", "8080")]).unwrap();
        assert_eq!(cfg.http_port, Some(8080));

        let err = config(&[("FORM_BOT_HTTP_PORT", "eighty")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FORM_BOT_HTTP_PORT")
        );
    }

    #[test]
    fn cli_flag() {
        let cfg = config(&[("TELEGRAM_BOT_TOKEN", "t"), ("FORM_BOT_CLI", "true")]).unwrap();
        assert!(cfg.cli_enabled());

        assert!(config(&[("FORM_BOT_CLI", "maybe")]).is_err());
    }

    #[test]
    fn log_dir_and_language() {
        let cfg = config(&[
            ("FORM_BOT_LOG_DIR", "/var/log/form-bot"),
            ("FORM_BOT_DEFAULT_LANG", "ru"),
        ])
        .unwrap();
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/var/log/form-bot")));
        assert_eq!(cfg.default_language, "ru");
    }

    #[test]
    fn cli_language() {
        assert_eq!(config(&[]).unwrap().cli_language, None);

        let cfg = config(&[("FORM_BOT_CLI_LANG", " ru ")]).unwrap();
        assert_eq!(cfg.cli_language.as_deref(), Some("ru"));
    }
}
