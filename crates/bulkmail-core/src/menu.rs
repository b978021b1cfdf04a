//! Menu options and the mode transitions they trigger.

use crate::config::UserConfig;
use crate::conversation::Mode;
use crate::reply::Reply;

/// A button of the main menu, identified by its callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOption {
    /// Send every identifier with the first sender.
    Automatic,
    /// Pick one sender, then send.
    Manual,
    /// Pick a slice of senders, then send.
    Range,
    /// Pair identifiers with senders in reverse order.
    Inverse,
    /// Upload a new `config.json`.
    AddConfig,
    /// Leave the menu.
    Exit,
    /// Anything else the transport delivered.
    Other(String),
}

impl MenuOption {
    /// The buttons shown in the menu, in display order.
    pub const BUTTONS: [Self; 6] = [
        Self::Automatic,
        Self::Manual,
        Self::Range,
        Self::Inverse,
        Self::AddConfig,
        Self::Exit,
    ];

    /// Maps callback data to an option. Unknown data becomes [`Self::Other`].
    #[must_use]
    pub fn from_callback(data: &str) -> Self {
        match data {
            "automatic" => Self::Automatic,
            "manual" => Self::Manual,
            "range" => Self::Range,
            "inverse" => Self::Inverse,
            "add_config" => Self::AddConfig,
            "exit" => Self::Exit,
            other => Self::Other(other.to_string()),
        }
    }

    /// Callback data carried by the button.
    #[must_use]
    pub fn callback_data(&self) -> &str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
            Self::Range => "range",
            Self::Inverse => "inverse",
            Self::AddConfig => "add_config",
            Self::Exit => "exit",
            Self::Other(data) => data,
        }
    }

    /// Button caption.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Automatic => "Automatic Sending",
            Self::Manual => "Manual Sending",
            Self::Range => "Send Emails in Range",
            Self::Inverse => "Inverse Sending",
            Self::AddConfig => "Add config.json file",
            Self::Exit => "Exit",
            Self::Other(_) => "Unknown",
        }
    }

    /// Whether choosing this option needs a stored configuration.
    #[must_use]
    pub const fn requires_config(&self) -> bool {
        matches!(
            self,
            Self::Automatic | Self::Manual | Self::Range | Self::Inverse
        )
    }
}

/// Result of choosing a menu option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOutcome {
    /// Replies to send, in order.
    pub replies: Vec<Reply>,
    /// New mode, or `None` to keep the current one.
    pub mode: Option<Mode>,
}

impl MenuOutcome {
    fn stay(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            mode: None,
        }
    }

    fn enter(mode: Mode, replies: Vec<Reply>) -> Self {
        Self {
            replies,
            mode: Some(mode),
        }
    }
}

/// Decides the replies and mode change for `option`.
///
/// `config` is the user's stored configuration, if any; it is only
/// consulted for options that need one.
#[must_use]
pub fn select(option: &MenuOption, config: Option<&UserConfig>) -> MenuOutcome {
    if option.requires_config() && config.is_none() {
        return MenuOutcome::stay(Reply::MissingConfig);
    }

    match option {
        MenuOption::Automatic => MenuOutcome::enter(Mode::Automatic, vec![Reply::AutomaticSelected]),
        MenuOption::Manual => {
            let mut replies = vec![Reply::ManualSelected];
            if let Some(config) = config {
                replies.extend((1..).zip(&config.senders).map(|(position, sender)| {
                    Reply::SenderChoice {
                        position,
                        email: sender.email.clone(),
                    }
                }));
            }
            MenuOutcome::enter(Mode::manual(), replies)
        }
        MenuOption::Range => MenuOutcome::enter(Mode::range(), vec![Reply::RangeSelected]),
        MenuOption::Inverse => MenuOutcome::enter(Mode::Inverse, vec![Reply::InverseSelected]),
        MenuOption::AddConfig => MenuOutcome::enter(Mode::AwaitingConfig, vec![Reply::UploadPrompt]),
        MenuOption::Exit => MenuOutcome::stay(Reply::Farewell),
        MenuOption::Other(_) => MenuOutcome::stay(Reply::InvalidOption),
    }
}
