//! Conversation mode state machine.

use crate::config::SenderCredentials;

/// Step within manual sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualStep {
    /// Waiting for a 1-based sender number.
    AwaitingSelection,
    /// Sender chosen; waiting for identifiers to send with it.
    AwaitingIdentifiers(SenderCredentials),
}

/// Step within ranged sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeStep {
    /// Waiting for `start,end`.
    AwaitingRange,
    /// Senders chosen; waiting for identifiers to pair with them.
    AwaitingIdentifiers(Vec<SenderCredentials>),
}

/// What the next free-text message from a user means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Nothing selected yet (or after exit).
    #[default]
    Idle,
    /// Waiting for a `config.json` upload.
    AwaitingConfig,
    /// Identifiers are sent with the first sender.
    Automatic,
    /// One chosen sender sends every identifier.
    Manual(ManualStep),
    /// A chosen slice of senders, one identifier each.
    Range(RangeStep),
    /// Senders in reverse order, one identifier each.
    Inverse,
}

impl Mode {
    /// Entry state of manual sending.
    #[must_use]
    pub const fn manual() -> Self {
        Self::Manual(ManualStep::AwaitingSelection)
    }

    /// Entry state of ranged sending.
    #[must_use]
    pub const fn range() -> Self {
        Self::Range(RangeStep::AwaitingRange)
    }

    /// Whether handling input in this mode needs a stored configuration.
    #[must_use]
    pub const fn needs_config(&self) -> bool {
        !matches!(self, Self::Idle | Self::AwaitingConfig)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfig => "awaiting_config",
            Self::Automatic => "automatic",
            Self::Manual(_) => "manual",
            Self::Range(_) => "range",
            Self::Inverse => "inverse",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything remembered about one user between messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Current mode, including any scratch data of its sub-step.
    pub mode: Mode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        let state = ConversationState::default();
        assert_eq!(state.mode, Mode::Idle);
    }

    #[test]
    fn menu_entry_starts_at_first_step() {
        let sender = SenderCredentials::new("a@example.com", "p");
        assert_eq!(Mode::manual(), Mode::Manual(ManualStep::AwaitingSelection));
        assert_eq!(Mode::range(), Mode::Range(RangeStep::AwaitingRange));
        assert_ne!(
            Mode::manual(),
            Mode::Manual(ManualStep::AwaitingIdentifiers(sender))
        );
    }

    #[test]
    fn config_requirement() {
        assert!(!Mode::Idle.needs_config());
        assert!(!Mode::AwaitingConfig.needs_config());
        assert!(Mode::Automatic.needs_config());
        assert!(Mode::manual().needs_config());
        assert!(Mode::range().needs_config());
        assert!(Mode::Inverse.needs_config());
    }

    #[test]
    fn names() {
        assert_eq!(Mode::manual().to_string(), "manual");
        assert_eq!(Mode::AwaitingConfig.to_string(), "awaiting_config");
    }
}
