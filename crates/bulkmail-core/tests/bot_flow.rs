//! End-to-end conversation tests against a recording mailer.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use bulkmail_core::{
    ConfigStore, Controller, MailError, Mailer, ManualStep, MenuOption, Mode, RangeStep, Reply,
    SenderCredentials, UserConfig, UserId, ValidationError,
};
use tempfile::TempDir;

const USER: UserId = UserId(4242);

#[derive(Debug, Clone, PartialEq, Eq)]
struct SentMail {
    sender: String,
    receiver: String,
    subject: String,
    body: String,
}

/// Records every send; senders listed in `failing` get an error instead.
#[derive(Debug, Default)]
struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: Vec<String>,
}

impl RecordingMailer {
    fn failing_for(sender: &str) -> Self {
        Self {
            sent: Mutex::default(),
            failing: vec![sender.to_string()],
        }
    }

    fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    fn senders(&self) -> Vec<String> {
        self.sent().into_iter().map(|mail| mail.sender).collect()
    }
}

impl Mailer for RecordingMailer {
    async fn send_email(
        &self,
        sender: &SenderCredentials,
        receiver: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(SentMail {
            sender: sender.email.clone(),
            receiver: receiver.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.failing.contains(&sender.email) {
            return Err(MailError::Authentication("535 rejected".to_string()));
        }
        Ok(())
    }
}

fn config_with(count: usize) -> UserConfig {
    UserConfig {
        senders: (1..=count)
            .map(|n| SenderCredentials::new(format!("s{n}@example.com"), format!("p{n}")))
            .collect(),
        receiver: "desk@example.com".to_string(),
        subject: "Hello {}".to_string(),
        body: "Body text".to_string(),
    }
}

async fn controller_with(
    config: Option<&UserConfig>,
    mailer: RecordingMailer,
) -> (TempDir, Controller<RecordingMailer>) {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("user_configs"));
    if let Some(config) = config {
        store.save(USER, config).await.unwrap();
    }
    (dir, Controller::new(store, mailer))
}

async fn choose(controller: &Controller<RecordingMailer>, option: MenuOption) -> Vec<Reply> {
    let mut replies = Vec::new();
    controller.select_option(USER, &option, &mut replies).await;
    replies
}

async fn say(controller: &Controller<RecordingMailer>, text: &str) -> Vec<Reply> {
    let mut replies = Vec::new();
    controller.handle_text(USER, text, &mut replies).await;
    replies
}

async fn mode(controller: &Controller<RecordingMailer>) -> Mode {
    controller.sessions().snapshot(USER).await.mode
}

fn sent(identifier: &str) -> Reply {
    Reply::Sent {
        identifier: identifier.to_string(),
    }
}

#[tokio::test]
async fn automatic_sends_every_identifier_with_first_sender() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    assert_eq!(
        choose(&controller, MenuOption::Automatic).await,
        vec![Reply::AutomaticSelected]
    );
    let replies = say(&controller, "a,b,c,d").await;

    assert_eq!(replies, vec![sent("a"), sent("b"), sent("c"), sent("d")]);
    assert_eq!(controller.mailer().senders(), vec!["s1@example.com"; 4]);
    assert_eq!(mode(&controller).await, Mode::Automatic);
}

#[tokio::test]
async fn subject_gets_trimmed_identifier_and_fixed_fields() {
    let config = config_with(1);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Automatic).await;
    say(&controller, " 555 ").await;

    assert_eq!(
        controller.mailer().sent(),
        vec![SentMail {
            sender: "s1@example.com".to_string(),
            receiver: "desk@example.com".to_string(),
            subject: "Hello 555".to_string(),
            body: "Body text".to_string(),
        }]
    );
}

#[tokio::test]
async fn inverse_pairs_with_reversed_senders_and_stops_at_shorter_list() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Inverse).await;
    let replies = say(&controller, "x,y").await;

    assert_eq!(replies, vec![sent("x"), sent("y")]);
    assert_eq!(
        controller.mailer().senders(),
        vec!["s3@example.com", "s2@example.com"]
    );

    let replies = say(&controller, "1,2,3,4,5").await;
    assert_eq!(replies.len(), 3);
}

#[tokio::test]
async fn range_selects_inclusive_slice_then_zips() {
    let config = config_with(5);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    assert_eq!(
        choose(&controller, MenuOption::Range).await,
        vec![Reply::RangeSelected]
    );
    assert_eq!(
        say(&controller, "2,4").await,
        vec![Reply::RangeChosen { start: 2, end: 4 }]
    );
    assert_eq!(
        mode(&controller).await,
        Mode::Range(RangeStep::AwaitingIdentifiers(config.senders[1..4].to_vec()))
    );

    let replies = say(&controller, "a,b,c,d,e").await;
    assert_eq!(replies, vec![sent("a"), sent("b"), sent("c")]);
    assert_eq!(
        controller.mailer().senders(),
        vec!["s2@example.com", "s3@example.com", "s4@example.com"]
    );
}

#[tokio::test]
async fn invalid_range_keeps_waiting_for_range() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Range).await;
    assert_eq!(say(&controller, "4,9").await, vec![Reply::InvalidRange]);
    assert_eq!(say(&controller, "3,2").await, vec![Reply::InvalidRange]);
    assert_eq!(say(&controller, "two").await, vec![Reply::InvalidRange]);
    assert_eq!(mode(&controller).await, Mode::range());
    assert!(controller.mailer().sent().is_empty());
}

#[tokio::test]
async fn manual_selection_uses_chosen_sender() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    let replies = choose(&controller, MenuOption::Manual).await;
    assert_eq!(replies.len(), 4);

    assert_eq!(
        say(&controller, "2").await,
        vec![Reply::SenderSelected {
            email: "s2@example.com".to_string()
        }]
    );
    assert_eq!(
        mode(&controller).await,
        Mode::Manual(ManualStep::AwaitingIdentifiers(config.senders[1].clone()))
    );

    let replies = say(&controller, "q1, q2").await;
    assert_eq!(replies, vec![sent("q1"), sent("q2")]);
    assert_eq!(
        controller.mailer().senders(),
        vec!["s2@example.com", "s2@example.com"]
    );
}

#[tokio::test]
async fn manual_out_of_range_selection_changes_nothing() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Manual).await;
    assert_eq!(say(&controller, "9").await, vec![Reply::InvalidSelection]);
    assert_eq!(say(&controller, "0").await, vec![Reply::InvalidSelection]);
    assert_eq!(mode(&controller).await, Mode::manual());
    assert!(controller.mailer().sent().is_empty());
}

#[tokio::test]
async fn failed_send_does_not_stop_batch() {
    let config = config_with(3);
    let (_dir, controller) =
        controller_with(Some(&config), RecordingMailer::failing_for("s2@example.com")).await;

    choose(&controller, MenuOption::Inverse).await;
    let replies = say(&controller, "a,b,c").await;

    assert_eq!(
        replies,
        vec![
            sent("a"),
            Reply::SendFailed {
                identifier: "b".to_string()
            },
            sent("c"),
        ]
    );
    assert_eq!(controller.mailer().sent().len(), 3);
}

#[tokio::test]
async fn sending_mode_without_config_prompts_for_upload() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;

    for option in [
        MenuOption::Automatic,
        MenuOption::Manual,
        MenuOption::Range,
        MenuOption::Inverse,
    ] {
        assert_eq!(choose(&controller, option).await, vec![Reply::MissingConfig]);
        assert_eq!(mode(&controller).await, Mode::Idle);
    }
}

#[tokio::test]
async fn text_in_sending_mode_is_ignored_once_config_is_gone() {
    let config = config_with(2);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Automatic).await;
    tokio::fs::remove_file(controller.configs().path_for(USER))
        .await
        .unwrap();

    assert!(say(&controller, "a,b").await.is_empty());
    assert!(controller.mailer().sent().is_empty());
    assert_eq!(mode(&controller).await, Mode::Automatic);
}

#[tokio::test]
async fn text_while_idle_is_ignored() {
    let config = config_with(2);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    assert!(say(&controller, "a,b").await.is_empty());
    assert!(controller.mailer().sent().is_empty());
}

#[tokio::test]
async fn wrong_file_name_is_rejected_without_download() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;
    let mut replies = Vec::new();

    controller
        .handle_upload(
            USER,
            Some("data.json"),
            || async { Err::<Vec<u8>, _>("must not be fetched") },
            &mut replies,
        )
        .await;

    assert_eq!(replies, vec![Reply::ConfigRejected]);
    assert!(controller.configs().load(USER).await.is_none());
}

#[tokio::test]
async fn uploaded_config_round_trips_and_leaves_upload_mode() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;
    let config = config_with(2);
    let bytes = serde_json::to_vec(&config).unwrap();

    choose(&controller, MenuOption::AddConfig).await;
    assert_eq!(mode(&controller).await, Mode::AwaitingConfig);

    let mut replies = Vec::new();
    controller
        .handle_upload(
            USER,
            Some("config.json"),
            || async move { Ok::<_, std::io::Error>(bytes) },
            &mut replies,
        )
        .await;

    assert_eq!(replies, vec![Reply::ConfigSaved]);
    assert_eq!(controller.configs().load(USER).await, Some(config));
    assert_eq!(mode(&controller).await, Mode::Idle);
}

#[tokio::test]
async fn upload_with_problems_is_saved_with_warnings() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;
    let raw = br#"{"senders": [], "receiver": "nowhere", "subject": "{} {}", "body": ""}"#;

    let mut replies = Vec::new();
    controller
        .handle_upload(
            USER,
            Some("config.json"),
            || async { Ok::<_, std::io::Error>(raw.to_vec()) },
            &mut replies,
        )
        .await;

    assert_eq!(
        replies,
        vec![
            Reply::ConfigSaved,
            Reply::ConfigWarning(ValidationError::NoSenders),
            Reply::ConfigWarning(ValidationError::InvalidReceiver),
            Reply::ConfigWarning(ValidationError::TooManyPlaceholders(2)),
        ]
    );
}

#[tokio::test]
async fn unparsable_upload_is_kept_but_reported() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;

    let mut replies = Vec::new();
    controller
        .handle_upload(
            USER,
            Some("config.json"),
            || async { Ok::<_, std::io::Error>(b"not json".to_vec()) },
            &mut replies,
        )
        .await;

    assert_eq!(replies, vec![Reply::ConfigSaved, Reply::ConfigUnreadable]);
    assert!(controller.configs().path_for(USER).exists());
    assert_eq!(
        choose(&controller, MenuOption::Automatic).await,
        vec![Reply::MissingConfig]
    );
}

#[tokio::test]
async fn failed_download_reports_save_failure() {
    let (_dir, controller) = controller_with(None, RecordingMailer::default()).await;

    let mut replies = Vec::new();
    controller
        .handle_upload(
            USER,
            Some("config.json"),
            || async { Err::<Vec<u8>, _>("network down") },
            &mut replies,
        )
        .await;

    assert_eq!(replies, vec![Reply::ConfigSaveFailed]);
    assert!(!controller.configs().path_for(USER).exists());
}

#[tokio::test]
async fn menu_choice_resets_sticky_selection() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Manual).await;
    say(&controller, "3").await;
    choose(&controller, MenuOption::Manual).await;

    assert_eq!(mode(&controller).await, Mode::manual());
}

#[tokio::test]
async fn range_end_past_last_sender_is_clamped() {
    let config = config_with(5);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Range).await;
    assert_eq!(
        say(&controller, "2,6").await,
        vec![Reply::RangeChosen { start: 2, end: 5 }]
    );

    let replies = say(&controller, "a,b,c,d,e").await;
    assert_eq!(replies.len(), 4);
    assert_eq!(
        controller.mailer().senders(),
        vec![
            "s2@example.com",
            "s3@example.com",
            "s4@example.com",
            "s5@example.com"
        ]
    );
}

#[tokio::test]
async fn manual_non_numeric_selection_is_rejected() {
    let config = config_with(3);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Manual).await;
    assert_eq!(say(&controller, "abc").await, vec![Reply::InvalidSelection]);
    assert_eq!(say(&controller, "1,2").await, vec![Reply::InvalidSelection]);
    assert_eq!(mode(&controller).await, Mode::manual());

    assert_eq!(
        say(&controller, " 1 ").await,
        vec![Reply::SenderSelected {
            email: "s1@example.com".to_string()
        }]
    );
    assert!(controller.mailer().sent().is_empty());
}

#[tokio::test]
async fn empty_sender_list_sends_nothing() {
    let config = config_with(0);
    let (_dir, controller) = controller_with(Some(&config), RecordingMailer::default()).await;

    choose(&controller, MenuOption::Automatic).await;
    assert_eq!(say(&controller, "a,b").await, vec![Reply::NoSenders]);
    assert_eq!(mode(&controller).await, Mode::Automatic);

    choose(&controller, MenuOption::Inverse).await;
    assert_eq!(say(&controller, "a,b").await, vec![Reply::NoSenders]);
    assert_eq!(mode(&controller).await, Mode::Inverse);

    assert!(controller.mailer().sent().is_empty());
}
