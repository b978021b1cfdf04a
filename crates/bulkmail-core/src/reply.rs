//! Chat replies and the sink they are delivered through.

use std::future::Future;

use crate::config::ValidationError;

/// Everything the bot can say. `Display` renders the chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Greeting shown with the option menu.
    Welcome,
    /// A sending mode was chosen before any config was uploaded.
    MissingConfig,
    /// Automatic mode entered.
    AutomaticSelected,
    /// Manual mode entered; sender list follows.
    ManualSelected,
    /// One entry of the manual sender list.
    SenderChoice {
        /// 1-based position.
        position: usize,
        /// Sender address.
        email: String,
    },
    /// Range mode entered.
    RangeSelected,
    /// Inverse mode entered.
    InverseSelected,
    /// Upload requested.
    UploadPrompt,
    /// Exit chosen.
    Farewell,
    /// Unknown menu option.
    InvalidOption,
    /// Manual mode sender chosen.
    SenderSelected {
        /// Sender address.
        email: String,
    },
    /// Manual selection was not a valid sender number.
    InvalidSelection,
    /// Range mode senders chosen.
    RangeChosen {
        /// 1-based first sender.
        start: usize,
        /// 1-based last sender, inclusive.
        end: usize,
    },
    /// Range input could not be used.
    InvalidRange,
    /// The stored config has no senders to send with.
    NoSenders,
    /// One email was accepted by the relay.
    Sent {
        /// Trimmed identifier.
        identifier: String,
    },
    /// One email could not be sent.
    SendFailed {
        /// Trimmed identifier.
        identifier: String,
    },
    /// Upload stored.
    ConfigSaved,
    /// Upload could not be stored.
    ConfigSaveFailed,
    /// Upload had the wrong file name.
    ConfigRejected,
    /// Stored upload does not parse as a config.
    ConfigUnreadable,
    /// Stored upload parses but looks wrong.
    ConfigWarning(ValidationError),
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Welcome => f.write_str("Welcome to the Email Bot! Please choose an option:"),
            Self::MissingConfig => {
                f.write_str("No config file found. Please upload a config.json file first.")
            }
            Self::AutomaticSelected => f.write_str(
                "Automatic Sending selected. Enter phone numbers separated by commas.",
            ),
            Self::ManualSelected => f.write_str("Manual Sending selected. Choose a sender."),
            Self::SenderChoice { position, email } => write!(f, "{position}. {email}"),
            Self::RangeSelected => f.write_str(
                "Send Emails in Range selected. Enter range in 'start,end' format.",
            ),
            Self::InverseSelected => f.write_str(
                "Inverse Sending selected. Enter phone numbers separated by commas.",
            ),
            Self::UploadPrompt => f.write_str("Please upload your config.json file."),
            Self::Farewell => f.write_str("Exiting the bot. Thank you!"),
            Self::InvalidOption => f.write_str("Invalid option selected."),
            Self::SenderSelected { email } => write!(f, "Selected {email}. Enter phone number."),
            Self::InvalidSelection => f.write_str("Invalid selection. Please try again."),
            Self::RangeChosen { start, end } => write!(
                f,
                "Selected senders from {start} to {end}. Enter phone numbers."
            ),
            Self::InvalidRange => f.write_str("Invalid range. Please try again."),
            Self::NoSenders => {
                f.write_str("Your config.json has no senders. Please upload a new one.")
            }
            Self::Sent { identifier } => write!(f, "Email sent to {identifier} successfully!"),
            Self::SendFailed { identifier } => write!(f, "Failed to send email to {identifier}."),
            Self::ConfigSaved => f.write_str("Config file uploaded and saved successfully."),
            Self::ConfigSaveFailed => {
                f.write_str("Failed to save the config file. Please try again.")
            }
            Self::ConfigRejected => f.write_str("Please upload a valid config.json file."),
            Self::ConfigUnreadable => f.write_str(
                "Warning: the uploaded file is not a valid config and will be ignored until replaced.",
            ),
            Self::ConfigWarning(issue) => write!(f, "Warning: {issue}."),
        }
    }
}

/// Where replies go. Each reply is delivered before the caller continues,
/// so per-email outcomes reach the user while a batch is still running.
pub trait ReplySink: Send {
    /// Delivers one reply.
    fn send(&mut self, reply: Reply) -> impl Future<Output = ()> + Send;
}

impl ReplySink for Vec<Reply> {
    async fn send(&mut self, reply: Reply) {
        self.push(reply);
    }
}
