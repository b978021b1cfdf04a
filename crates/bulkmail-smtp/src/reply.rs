//! SMTP reply types and parsing.

use crate::error::{Error, Result};

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_OK: Self = Self(235);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);

    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply text, one entry per line.
    pub lines: Vec<String>,
}

impl Reply {
    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full reply text as a single string.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Converts the reply into a rejection error.
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::rejected(self.code.as_u16(), self.text())
    }

    /// Parses a reply from its raw lines (line endings already stripped).
    ///
    /// SMTP replies can be single-line or multi-line:
    /// - Single: `250 OK`
    /// - Multi: `250-First`, `250-Second`, `250 Last`
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is empty, the code is not numeric, or
    /// the lines disagree on the code.
    pub fn parse(raw: &[String]) -> Result<Self> {
        let first = raw
            .first()
            .ok_or_else(|| Error::Protocol("Empty reply".into()))?;
        let code = parse_code(first)?;

        let mut lines = Vec::with_capacity(raw.len());
        for line in raw {
            if parse_code(line)? != code {
                return Err(Error::Protocol(format!("Inconsistent reply code: {line}")));
            }
            lines.push(line.get(4..).unwrap_or_default().to_string());
        }

        Ok(Self {
            code: ReplyCode(code),
            lines,
        })
    }
}

/// Checks if a line terminates a (possibly multi-line) reply.
///
/// Continuation lines use `-` after the code, the final line uses a space
/// or nothing at all.
#[must_use]
pub fn is_final_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        None => line.len() == 3,
        Some(b) => *b == b' ',
    }
}

fn parse_code(line: &str) -> Result<u16> {
    let digits = line
        .get(..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::Protocol(format!("Invalid reply line: {line}")))?;
    digits
        .parse()
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {digits}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_single_line_reply() {
        let reply = Reply::parse(&lines(&["250 OK"])).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.lines, vec!["OK"]);
        assert!(reply.is_success());
    }

    #[test]
    fn parse_multi_line_reply() {
        let reply = Reply::parse(&lines(&[
            "250-smtp.gmail.com at your service",
            "250-STARTTLS",
            "250 SMTPUTF8",
        ]))
        .unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(
            reply.lines,
            vec!["smtp.gmail.com at your service", "STARTTLS", "SMTPUTF8"]
        );
    }

    #[test]
    fn parse_bare_code() {
        let reply = Reply::parse(&lines(&["354"])).unwrap();
        assert_eq!(reply.code, ReplyCode::START_DATA);
        assert_eq!(reply.text(), "");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Reply::parse(&[]).is_err());
        assert!(Reply::parse(&lines(&["25"])).is_err());
        assert!(Reply::parse(&lines(&["ABC OK"])).is_err());
        assert!(Reply::parse(&lines(&["250-first", "550 second"])).is_err());
    }

    #[test]
    fn final_line_detection() {
        assert!(is_final_line("250 OK"));
        assert!(is_final_line("250"));
        assert!(!is_final_line("250-Continuing"));
        assert!(!is_final_line("25"));
    }

    #[test]
    fn into_error_keeps_code_and_text() {
        let reply = Reply::parse(&lines(&["535 5.7.8 Username and Password not accepted"])).unwrap();
        let err = reply.into_error();
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("Username and Password not accepted"));
    }
}
