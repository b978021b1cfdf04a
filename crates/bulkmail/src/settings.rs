//! Startup settings read from the environment.

use std::path::PathBuf;

use anyhow::{Context, bail};
use bulkmail_core::RelaySettings;

/// Primary token variable.
pub const TOKEN_VAR: &str = "BULKMAIL_BOT_TOKEN";
/// Token variable teloxide itself reads, accepted as a fallback.
pub const FALLBACK_TOKEN_VAR: &str = "TELOXIDE_TOKEN";

/// Everything the bot needs before it can start polling.
#[derive(Clone)]
pub struct BotSettings {
    /// Telegram bot token.
    pub token: String,
    /// Directory holding one `<user>_config.json` per user.
    pub config_dir: PathBuf,
    /// Outgoing mail relay.
    pub relay: RelaySettings,
}

impl std::fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotSettings")
            .field("token", &"<redacted>")
            .field("config_dir", &self.config_dir)
            .field("relay", &self.relay)
            .finish()
    }
}

impl BotSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a value is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let Some(token) = lookup(TOKEN_VAR).or_else(|| lookup(FALLBACK_TOKEN_VAR)) else {
            bail!("{TOKEN_VAR} is not set");
        };

        let config_dir = lookup("BULKMAIL_CONFIG_DIR")
            .map_or_else(default_config_dir, PathBuf::from);

        let mut relay = RelaySettings::default();
        if let Some(host) = lookup("BULKMAIL_SMTP_HOST") {
            relay.host = host.trim().to_string();
        }
        if let Some(port) = lookup("BULKMAIL_SMTP_PORT") {
            relay.port = port
                .trim()
                .parse()
                .with_context(|| format!("BULKMAIL_SMTP_PORT is not a valid port: {port}"))?;
        }
        if let Some(name) = lookup("BULKMAIL_HELO_NAME") {
            relay.hello_name = name.trim().to_string();
        }

        Ok(Self {
            token: token.trim().to_string(),
            config_dir,
            relay,
        })
    }
}

fn default_config_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("user_configs"),
        |dir| dir.join("bulkmail").join("user_configs"),
    )
}
