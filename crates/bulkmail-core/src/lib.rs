//! # bulkmail-core
//!
//! Core logic for the bulkmail chat bot.
//!
//! This crate provides:
//! - Per-user configuration storage (one JSON file per user)
//! - The conversation state machine (automatic, manual, range, inverse)
//! - Menu handling and free-text input dispatch
//! - Email sending through an authenticated SMTP relay
//!
//! The chat transport stays outside: it feeds events into a
//! [`Controller`] and delivers the resulting [`Reply`] values through a
//! [`ReplySink`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod controller;
pub mod conversation;
pub mod dispatch;
mod error;
pub mod mailer;
pub mod menu;
mod reply;
pub mod template;
pub mod upload;

pub use config::{
    ConfigStore, SenderCredentials, UserConfig, UserId, ValidationError, ValidationResult,
    validate_config,
};
pub use controller::Controller;
pub use conversation::{ConversationState, ManualStep, Mode, RangeStep, SessionStore};
pub use error::{Error, Result};
pub use mailer::{MailError, Mailer, OutgoingMessage, RelaySettings, SmtpMailer};
pub use menu::{MenuOption, MenuOutcome};
pub use reply::{Reply, ReplySink};
