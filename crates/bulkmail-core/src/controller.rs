//! Entry points the chat transport calls for each incoming event.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, info, warn};

use crate::config::{ConfigStore, UserId, validate_config};
use crate::conversation::{Mode, SessionStore};
use crate::dispatch::dispatch;
use crate::mailer::Mailer;
use crate::menu::{self, MenuOption};
use crate::reply::{Reply, ReplySink};
use crate::upload::is_config_upload;

/// Owns the per-user stores and the mailer, and routes transport events to
/// the menu, the input dispatcher and the upload flow.
#[derive(Debug)]
pub struct Controller<M> {
    configs: ConfigStore,
    sessions: SessionStore,
    mailer: M,
}

impl<M: Mailer> Controller<M> {
    /// Creates a controller with empty conversation state.
    #[must_use]
    pub fn new(configs: ConfigStore, mailer: M) -> Self {
        Self {
            configs,
            sessions: SessionStore::new(),
            mailer,
        }
    }

    /// The configuration store.
    #[must_use]
    pub const fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    /// The mailer used for every send.
    #[must_use]
    pub const fn mailer(&self) -> &M {
        &self.mailer
    }

    /// The conversation state store.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles a menu button press.
    pub async fn select_option<R: ReplySink>(&self, user: UserId, option: &MenuOption, sink: &mut R) {
        let config = if option.requires_config() {
            self.configs.load(user).await
        } else {
            None
        };

        let outcome = menu::select(option, config.as_ref());
        match outcome.mode {
            Some(mode) => {
                info!(%user, mode = %mode, "Mode selected");
                self.sessions.set_mode(user, mode).await;
            }
            None => debug!(%user, option = option.callback_data(), "Mode unchanged"),
        }

        for reply in outcome.replies {
            sink.send(reply).await;
        }
    }

    /// Handles a free-text message according to the user's current mode.
    ///
    /// Without a stored configuration this does nothing.
    pub async fn handle_text<R: ReplySink>(&self, user: UserId, text: &str, sink: &mut R) {
        let state = self.sessions.snapshot(user).await;
        if !state.mode.needs_config() {
            debug!(%user, mode = %state.mode, "No input expected");
            return;
        }

        let Some(config) = self.configs.load(user).await else {
            debug!(%user, mode = %state.mode, "Config vanished before input");
            return;
        };

        let next = dispatch(&self.mailer, state.mode, text, &config, sink).await;
        self.sessions.set_mode(user, next).await;
    }

    /// Handles an uploaded document.
    ///
    /// Only `config.json` is accepted; `fetch` is called to download the
    /// content only then. The content is stored verbatim, after which any
    /// problems with it are reported as warnings.
    pub async fn handle_upload<F, Fut, E, R>(
        &self,
        user: UserId,
        file_name: Option<&str>,
        fetch: F,
        sink: &mut R,
    ) where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Vec<u8>, E>> + Send,
        E: Display + Send,
        R: ReplySink,
    {
        if !is_config_upload(file_name) {
            info!(%user, file_name = file_name.unwrap_or("<none>"), "Upload rejected");
            sink.send(Reply::ConfigRejected).await;
            return;
        }

        let contents = match fetch().await.map_err(|e| e.to_string()) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(%user, "Failed to download upload: {e}");
                sink.send(Reply::ConfigSaveFailed).await;
                return;
            }
        };

        if self.configs.save_raw(user, &contents).await.is_err() {
            sink.send(Reply::ConfigSaveFailed).await;
            return;
        }
        sink.send(Reply::ConfigSaved).await;

        match self.configs.load(user).await {
            None => sink.send(Reply::ConfigUnreadable).await,
            Some(config) => {
                if let Err(issues) = validate_config(&config) {
                    for issue in issues {
                        info!(%user, field = issue.field(), "Config warning: {issue}");
                        sink.send(Reply::ConfigWarning(issue)).await;
                    }
                }
            }
        }

        if self.sessions.snapshot(user).await.mode == Mode::AwaitingConfig {
            self.sessions.set_mode(user, Mode::Idle).await;
        }
    }
}
