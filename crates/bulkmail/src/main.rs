//! `bulkmail` - Telegram bot for sending templated email in bulk
//!
//! Each user uploads a `config.json` with sender mailboxes, a receiver and a
//! subject template, then picks a sending mode from the menu.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod settings;
mod telegram;

use std::sync::Arc;

use anyhow::Context;
use bulkmail_core::{ConfigStore, Controller, SmtpMailer};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::BotSettings;
use telegram::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulkmail=info,bulkmail_core=info,bulkmail_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = BotSettings::from_env()?;
    info!(
        config_dir = %settings.config_dir.display(),
        relay = %settings.relay.host,
        port = settings.relay.port,
        "Starting bulkmail"
    );

    let configs = ConfigStore::new(&settings.config_dir);
    configs
        .ensure_dir()
        .await
        .with_context(|| format!("cannot create {}", configs.dir().display()))?;

    let app = Arc::new(Controller::new(configs, SmtpMailer::new(settings.relay)));
    let bot = Bot::new(settings.token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Stopped");
    Ok(())
}
