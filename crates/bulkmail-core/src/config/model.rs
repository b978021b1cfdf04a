//! Per-user configuration types.

use serde::{Deserialize, Serialize};

/// Chat user identifier that keys all per-user state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login for one sending mailbox.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderCredentials {
    /// Mailbox address, also used as the SMTP username.
    pub email: String,
    /// SMTP password (usually an app password).
    pub password: String,
}

impl SenderCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The uploaded `config.json`.
///
/// `senders` order matters: manual, range and inverse modes index into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Sending mailboxes, in upload order.
    pub senders: Vec<SenderCredentials>,
    /// Single destination address for every message.
    pub receiver: String,
    /// Subject template with at most one placeholder.
    pub subject: String,
    /// Literal message body.
    pub body: String,
}

impl UserConfig {
    /// Returns the sender at a 1-based position.
    #[must_use]
    pub fn sender(&self, position: usize) -> Option<&SenderCredentials> {
        position
            .checked_sub(1)
            .and_then(|index| self.senders.get(index))
    }
}
