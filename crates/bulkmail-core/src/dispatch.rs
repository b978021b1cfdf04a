//! Free-text input handling per mode.

use tracing::{debug, warn};

use crate::config::{SenderCredentials, UserConfig};
use crate::conversation::{ManualStep, Mode, RangeStep};
use crate::mailer::Mailer;
use crate::reply::{Reply, ReplySink};
use crate::template::{render_subject, split_identifiers};

/// Handles one text message in `mode` and returns the mode to continue in.
///
/// Sends happen strictly one after another; each outcome is delivered to
/// `sink` before the next send starts. Invalid input leaves the mode as it
/// was so the user can retry.
pub async fn dispatch<M, R>(
    mailer: &M,
    mode: Mode,
    text: &str,
    config: &UserConfig,
    sink: &mut R,
) -> Mode
where
    M: Mailer,
    R: ReplySink,
{
    match mode {
        Mode::Automatic => {
            let Some(first) = config.senders.first() else {
                sink.send(Reply::NoSenders).await;
                return Mode::Automatic;
            };
            let ids = split_identifiers(text);
            debug!(count = ids.len(), sender = %first.email, "Automatic send");
            for id in ids {
                send_one(mailer, first, id, config, sink).await;
            }
            Mode::Automatic
        }
        Mode::Manual(ManualStep::AwaitingSelection) => match parse_selection(text, config) {
            Some(sender) => {
                sink.send(Reply::SenderSelected {
                    email: sender.email.clone(),
                })
                .await;
                Mode::Manual(ManualStep::AwaitingIdentifiers(sender.clone()))
            }
            None => {
                debug!(input = text, "Invalid sender selection");
                sink.send(Reply::InvalidSelection).await;
                Mode::manual()
            }
        },
        Mode::Manual(ManualStep::AwaitingIdentifiers(sender)) => {
            for id in split_identifiers(text) {
                send_one(mailer, &sender, id, config, sink).await;
            }
            Mode::Manual(ManualStep::AwaitingIdentifiers(sender))
        }
        Mode::Range(RangeStep::AwaitingRange) => match parse_range(text, config.senders.len()) {
            Some((start, end)) => {
                sink.send(Reply::RangeChosen { start, end }).await;
                let chosen = config.senders[start - 1..end].to_vec();
                Mode::Range(RangeStep::AwaitingIdentifiers(chosen))
            }
            None => {
                debug!(input = text, "Invalid range");
                sink.send(Reply::InvalidRange).await;
                Mode::range()
            }
        },
        Mode::Range(RangeStep::AwaitingIdentifiers(senders)) => {
            for (id, sender) in split_identifiers(text).into_iter().zip(&senders) {
                send_one(mailer, sender, id, config, sink).await;
            }
            Mode::Range(RangeStep::AwaitingIdentifiers(senders))
        }
        Mode::Inverse => {
            if config.senders.is_empty() {
                sink.send(Reply::NoSenders).await;
                return Mode::Inverse;
            }
            for (id, sender) in split_identifiers(text)
                .into_iter()
                .zip(config.senders.iter().rev())
            {
                send_one(mailer, sender, id, config, sink).await;
            }
            Mode::Inverse
        }
        waiting @ (Mode::Idle | Mode::AwaitingConfig) => {
            debug!(mode = %waiting, "Ignoring text");
            waiting
        }
    }
}

async fn send_one<M, R>(
    mailer: &M,
    sender: &SenderCredentials,
    identifier: &str,
    config: &UserConfig,
    sink: &mut R,
) where
    M: Mailer,
    R: ReplySink,
{
    let subject = render_subject(&config.subject, identifier);
    let identifier = identifier.to_string();
    match mailer
        .send_email(sender, &config.receiver, &subject, &config.body)
        .await
    {
        Ok(()) => sink.send(Reply::Sent { identifier }).await,
        Err(e) => {
            warn!(sender = %sender.email, identifier = %identifier, "Failed to send email: {e}");
            sink.send(Reply::SendFailed { identifier }).await;
        }
    }
}

/// Parses a 1-based sender number.
fn parse_selection<'a>(text: &str, config: &'a UserConfig) -> Option<&'a SenderCredentials> {
    let position: usize = text.trim().parse().ok()?;
    config.sender(position)
}

/// Parses `start,end` (1-based, inclusive) against `len` senders.
///
/// An `end` past the last sender is clamped to it.
fn parse_range(text: &str, len: usize) -> Option<(usize, usize)> {
    let (start, end) = text.split_once(',')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse::<usize>().ok()?.min(len);
    (1 <= start && start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("2,4", 5), Some((2, 4)));
        assert_eq!(parse_range(" 1 , 1 ", 1), Some((1, 1)));
        assert_eq!(parse_range("0,2", 5), None);
        assert_eq!(parse_range("3,2", 5), None);
        assert_eq!(parse_range("2,6", 5), Some((2, 5)));
        assert_eq!(parse_range("1,10", 5), Some((1, 5)));
        assert_eq!(parse_range("6,9", 5), None);
        assert_eq!(parse_range("1,1", 0), None);
        assert_eq!(parse_range("2", 5), None);
        assert_eq!(parse_range("2,4,5", 5), None);
        assert_eq!(parse_range("a,b", 5), None);
    }
}
