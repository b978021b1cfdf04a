//! Sending one email through the fixed relay.
//!
//! [`Mailer`] is the seam between the conversation logic and the network:
//! the bot uses [`SmtpMailer`], tests plug in a recording fake.

mod message;

use std::future::Future;

use bulkmail_smtp::{Address, SUBMISSION_PORT};
use tracing::{debug, info};

pub use message::OutgoingMessage;

use crate::config::SenderCredentials;

/// Why a single send failed. Only success or failure reaches the chat;
/// the kind goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// Sender or receiver address is malformed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// TCP connect, greeting or EHLO failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// STARTTLS was refused or the handshake failed.
    #[error("TLS failed: {0}")]
    Tls(String),

    /// The relay refused the sender's credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The relay refused the envelope or the message.
    #[error("Send failed: {0}")]
    Rejected(String),
}

/// Transmits one email on behalf of a sender.
pub trait Mailer: Send + Sync {
    /// Sends `subject`/`body` from `sender` to `receiver`.
    fn send_email(
        &self,
        sender: &SenderCredentials,
        receiver: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Where outgoing mail is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Relay hostname, also used for TLS verification.
    pub host: String,
    /// Submission port.
    pub port: u16,
    /// Name announced in EHLO.
    pub hello_name: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: SUBMISSION_PORT,
            hello_name: "localhost".to_string(),
        }
    }
}

/// [`Mailer`] speaking SMTP with STARTTLS and AUTH PLAIN.
///
/// Opens a fresh connection for every message.
#[derive(Debug, Clone, Default)]
pub struct SmtpMailer {
    relay: RelaySettings,
}

impl SmtpMailer {
    /// Creates a mailer for the given relay.
    #[must_use]
    pub const fn new(relay: RelaySettings) -> Self {
        Self { relay }
    }
}

impl Mailer for SmtpMailer {
    async fn send_email(
        &self,
        sender: &SenderCredentials,
        receiver: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let relay = &self.relay;

        let from =
            Address::new(&sender.email).map_err(|e| MailError::InvalidAddress(e.to_string()))?;
        let to = Address::new(receiver).map_err(|e| MailError::InvalidAddress(e.to_string()))?;
        let message = OutgoingMessage::new(from.as_str(), to.as_str(), subject, body);

        let mut conn = bulkmail_smtp::connect(&relay.host, relay.port)
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;
        conn.ehlo(&relay.hello_name)
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;

        let mut conn = conn
            .starttls(&relay.host, &relay.hello_name)
            .await
            .map_err(|e| MailError::Tls(e.to_string()))?;

        conn.auth_plain(&sender.email, &sender.password)
            .await
            .map_err(refusal)?;

        conn.send_mail(&from, &[to], message.to_rfc5322().as_bytes())
            .await
            .map_err(refusal)?;

        // The message is already accepted; a failed QUIT changes nothing.
        if let Err(e) = conn.quit().await {
            debug!("QUIT after delivery failed: {e}");
        }

        info!(from = %from, to = %receiver, "Email sent");
        Ok(())
    }
}

/// Maps a refused AUTH or transaction step by what the relay said.
fn refusal(e: bulkmail_smtp::Error) -> MailError {
    if e.is_auth_failure() {
        MailError::Authentication(e.to_string())
    } else {
        MailError::Rejected(e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn refusals_are_classified_by_reply_code() {
        let bad_login = bulkmail_smtp::Error::rejected(535, "Username and Password not accepted");
        assert!(matches!(refusal(bad_login), MailError::Authentication(_)));

        let must_login = bulkmail_smtp::Error::rejected(530, "Authentication Required");
        assert!(matches!(refusal(must_login), MailError::Authentication(_)));

        let no_user = bulkmail_smtp::Error::rejected(550, "No such user");
        assert!(matches!(refusal(no_user), MailError::Rejected(_)));

        let unsupported = bulkmail_smtp::Error::NotSupported("AUTH PLAIN".into());
        assert!(matches!(refusal(unsupported), MailError::Rejected(_)));
    }

    #[test]
    fn default_relay_is_gmail_submission() {
        let relay = RelaySettings::default();
        assert_eq!(relay.host, "smtp.gmail.com");
        assert_eq!(relay.port, 587);
    }

    #[tokio::test]
    async fn invalid_sender_fails_before_connecting() {
        let mailer = SmtpMailer::new(RelaySettings {
            host: "relay.invalid".to_string(),
            port: 1,
            hello_name: "localhost".to_string(),
        });
        let sender = SenderCredentials::new("not-an-address", "p");
        let err = mailer
            .send_email(&sender, "desk@example.com", "s", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_connection_error() {
        let mailer = SmtpMailer::new(RelaySettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            hello_name: "localhost".to_string(),
        });
        let sender = SenderCredentials::new("a@example.com", "p");
        let err = mailer
            .send_email(&sender, "desk@example.com", "s", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Connection(_)));
    }
}
