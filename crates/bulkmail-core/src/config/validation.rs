//! Advisory checks for uploaded configurations.
//!
//! Saving never depends on these; they produce warnings shown to the user
//! after an upload.

use super::model::UserConfig;
use crate::template;

/// Problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No sender mailboxes at all.
    NoSenders,
    /// Sender at this 1-based position has a malformed address.
    InvalidSenderEmail(usize),
    /// Sender at this 1-based position has an empty password.
    EmptySenderPassword(usize),
    /// Receiver address is malformed.
    InvalidReceiver,
    /// Subject contains more than one placeholder; only the first is filled.
    TooManyPlaceholders(usize),
}

impl ValidationError {
    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NoSenders | Self::InvalidSenderEmail(_) | Self::EmptySenderPassword(_) => {
                "senders"
            }
            Self::InvalidReceiver => "receiver",
            Self::TooManyPlaceholders(_) => "subject",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSenders => f.write_str("no senders are configured"),
            Self::InvalidSenderEmail(n) => write!(f, "sender {n} has an invalid email address"),
            Self::EmptySenderPassword(n) => write!(f, "sender {n} has an empty password"),
            Self::InvalidReceiver => f.write_str("receiver is not a valid email address"),
            Self::TooManyPlaceholders(n) => write!(
                f,
                "subject has {n} placeholders, only the first will be filled"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a configuration.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a configuration.
///
/// # Errors
///
/// Returns every problem found.
pub fn validate_config(config: &UserConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.senders.is_empty() {
        errors.push(ValidationError::NoSenders);
    }
    for (position, sender) in (1..).zip(&config.senders) {
        if !is_valid_email(&sender.email) {
            errors.push(ValidationError::InvalidSenderEmail(position));
        }
        if sender.password.is_empty() {
            errors.push(ValidationError::EmptySenderPassword(position));
        }
    }

    if !is_valid_email(&config.receiver) {
        errors.push(ValidationError::InvalidReceiver);
    }

    let placeholders = template::placeholder_count(&config.subject);
    if placeholders > 1 {
        errors.push(ValidationError::TooManyPlaceholders(placeholders));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}
