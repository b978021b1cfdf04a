//! Server capabilities advertised in the EHLO reply.

use crate::reply::Reply;

/// Capabilities discovered from the most recent EHLO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Server hostname (first word of the EHLO reply).
    pub hostname: String,
    /// STARTTLS is offered.
    pub starttls: bool,
    /// Advertised SASL mechanisms, upper-cased.
    pub auth: Vec<String>,
    /// Maximum message size, if advertised with a value.
    pub max_size: Option<usize>,
}

impl Capabilities {
    /// Builds the capability set from an EHLO reply.
    #[must_use]
    pub fn from_ehlo(reply: &Reply) -> Self {
        let mut caps = Self {
            hostname: reply
                .lines
                .first()
                .and_then(|l| l.split_whitespace().next())
                .unwrap_or("unknown")
                .to_string(),
            ..Self::default()
        };

        for line in reply.lines.iter().skip(1) {
            let mut words = line.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };
            match keyword.to_ascii_uppercase().as_str() {
                "STARTTLS" => caps.starttls = true,
                "AUTH" => caps.auth.extend(words.map(str::to_ascii_uppercase)),
                "SIZE" => caps.max_size = words.next().and_then(|s| s.parse().ok()),
                _ => {}
            }
        }

        caps
    }

    /// Whether AUTH PLAIN may be attempted.
    ///
    /// Servers that advertise no AUTH line at all are given the benefit of
    /// the doubt.
    #[must_use]
    pub fn allows_plain(&self) -> bool {
        self.auth.is_empty() || self.auth.iter().any(|m| m == "PLAIN")
    }
}
