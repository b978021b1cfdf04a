//! RFC 5322 message construction.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use chrono::{DateTime, Local};

/// A plain-text email ready to be serialized.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Date header value.
    pub date: DateTime<Local>,
}

impl OutgoingMessage {
    /// Creates a message dated now.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            date: Local::now(),
        }
    }

    /// Builds the RFC 5322 formatted message.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        let mut message = String::new();

        let _ = write!(message, "From: {}\r\n", header_value(&self.from));
        let _ = write!(message, "To: {}\r\n", header_value(&self.to));
        let _ = write!(message, "Subject: {}\r\n", encode_subject(&self.subject));
        let _ = write!(message, "Date: {}\r\n", self.date.to_rfc2822());
        let _ = write!(message, "Message-ID: {}\r\n", self.message_id());
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");

        // Empty line between headers and body
        message.push_str("\r\n");
        message.push_str(&self.body);

        message
    }

    fn message_id(&self) -> String {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);

        let domain = self
            .from
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain.trim());
        let stamp = self.date.timestamp_micros();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("<{stamp:x}.{seq:x}.{}@{domain}>", std::process::id())
    }
}

/// Strips line breaks so user-supplied text cannot inject headers.
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

/// Encodes a subject as an RFC 2047 word when it is not plain ASCII.
fn encode_subject(subject: &str) -> String {
    let subject = header_value(subject);
    if subject.is_ascii() {
        subject
    } else {
        let encoded = base64::engine::general_purpose::STANDARD.encode(subject.as_bytes());
        format!("=?UTF-8?B?{encoded}?=")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(subject: &str) -> OutgoingMessage {
        OutgoingMessage::new("a@example.com", "desk@example.com", subject, "Line one\nLine two")
    }

    #[test]
    fn headers_and_body() {
        let raw = message("Hello 555").to_rfc5322();
        assert!(raw.starts_with("From: a@example.com\r\nTo: desk@example.com\r\nSubject: Hello 555\r\n"));
        assert!(raw.contains("\r\nDate: "));
        assert!(raw.contains("\r\nMessage-ID: <"));
        assert!(raw.contains("@example.com>\r\n"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(raw.ends_with("\r\n\r\nLine one\nLine two"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        let raw = message("Привет 555").to_rfc5322();
        let expected = base64::engine::general_purpose::STANDARD.encode("Привет 555");
        assert!(raw.contains(&format!("Subject: =?UTF-8?B?{expected}?=\r\n")));
    }

    #[test]
    fn header_injection_is_neutralized() {
        let raw = message("555\r\nBcc: victim@example.com").to_rfc5322();
        assert!(raw.contains("Subject: 555  Bcc: victim@example.com\r\n"));
        assert!(!raw.contains("\r\nBcc:"));
    }

    #[test]
    fn message_ids_differ() {
        let msg = message("x");
        assert_ne!(msg.message_id(), msg.message_id());
    }
}
