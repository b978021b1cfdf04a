//! Telegram transport: update routing, the menu keyboard and reply delivery.

use std::error::Error;
use std::sync::Arc;

use bulkmail_core::{Controller, MenuOption, Reply, ReplySink, SmtpMailer};
use teloxide::dispatching::UpdateHandler;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    Document, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, UserId,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

/// Controller type the bot runs with.
pub type App = Controller<SmtpMailer>;

type HandlerError = Box<dyn Error + Send + Sync + 'static>;
type HandlerResult = Result<(), HandlerError>;

/// Supported bot commands.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    /// Show the main menu.
    #[command(description = "show the main menu")]
    Start,
}

/// Builds the update handler tree.
pub fn schema() -> UpdateHandler<HandlerError> {
    let messages = Update::filter_message()
        .branch(teloxide::filter_command::<Command, _>().endpoint(on_command))
        .branch(Message::filter_document().endpoint(on_document))
        .branch(Message::filter_text().endpoint(on_text));

    dptree::entry()
        .branch(messages)
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

/// The six-button main menu, one button per row.
pub fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(MenuOption::BUTTONS.iter().map(|option| {
        vec![InlineKeyboardButton::callback(
            option.label(),
            option.callback_data(),
        )]
    }))
}

/// State is keyed by the Telegram user, whatever chat the event came from.
const fn user_of(id: UserId) -> bulkmail_core::UserId {
    bulkmail_core::UserId::new(id.0)
}

async fn on_command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    match cmd {
        Command::Start => {
            info!(chat = msg.chat.id.0, "Menu requested");
            bot.send_message(msg.chat.id, Reply::Welcome.to_string())
                .reply_markup(menu_keyboard())
                .await?;
        }
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, app: Arc<App>) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        debug!("Callback without data");
        return Ok(());
    };

    // The first reply replaces the menu message, as long as it is still there.
    let mut replies = match &q.message {
        Some(menu) => ChatReplies::editing(bot, menu.chat().id, menu.id()),
        None => ChatReplies::new(bot, ChatId::from(q.from.id)),
    };
    app.select_option(user_of(q.from.id), &MenuOption::from_callback(data), &mut replies)
        .await;
    Ok(())
}

async fn on_text(bot: Bot, msg: Message, text: String, app: Arc<App>) -> HandlerResult {
    if text.starts_with('/') {
        debug!(text = %text, "Ignoring unknown command");
        return Ok(());
    }
    let Some(from) = msg.from.as_ref() else {
        debug!(chat = msg.chat.id.0, "Ignoring text without a sender");
        return Ok(());
    };

    let mut replies = ChatReplies::new(bot, msg.chat.id);
    app.handle_text(user_of(from.id), &text, &mut replies).await;
    Ok(())
}

async fn on_document(bot: Bot, msg: Message, doc: Document, app: Arc<App>) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        debug!(chat = msg.chat.id.0, "Ignoring upload without a sender");
        return Ok(());
    };
    let file_name = doc.file_name.clone();
    let mut replies = ChatReplies::new(bot.clone(), msg.chat.id);

    app.handle_upload(
        user_of(from.id),
        file_name.as_deref(),
        || download(bot, doc),
        &mut replies,
    )
    .await;
    Ok(())
}

async fn download(bot: Bot, doc: Document) -> anyhow::Result<Vec<u8>> {
    let file = bot.get_file(doc.file.id).await?;
    let mut contents = Vec::new();
    bot.download_file(&file.path, &mut contents).await?;
    debug!(bytes = contents.len(), "Downloaded upload");
    Ok(contents)
}

/// Delivers replies to one chat, in order.
///
/// When built with [`ChatReplies::editing`], the first reply is written into
/// that existing message and the rest are sent as new messages.
struct ChatReplies {
    bot: Bot,
    chat: ChatId,
    edit: Option<MessageId>,
}

impl ChatReplies {
    const fn new(bot: Bot, chat: ChatId) -> Self {
        Self {
            bot,
            chat,
            edit: None,
        }
    }

    const fn editing(bot: Bot, chat: ChatId, message: MessageId) -> Self {
        Self {
            bot,
            chat,
            edit: Some(message),
        }
    }
}

impl ReplySink for ChatReplies {
    async fn send(&mut self, reply: Reply) {
        let text = reply.to_string();
        if let Some(message) = self.edit.take() {
            match self.bot.edit_message_text(self.chat, message, &text).await {
                Ok(_) => return,
                Err(e) => debug!(chat = self.chat.0, "Menu edit failed, sending instead: {e}"),
            }
        }
        if let Err(e) = self.bot.send_message(self.chat, text).await {
            warn!(chat = self.chat.0, "Failed to deliver reply: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[test]
    fn keyboard_has_one_button_per_option() {
        let keyboard = menu_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), MenuOption::BUTTONS.len());

        let first = &keyboard.inline_keyboard[0][0];
        assert_eq!(first.text, "Automatic Sending");
        assert!(matches!(
            &first.kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "automatic"
        ));
    }

    #[test]
    fn state_follows_the_telegram_user() {
        assert_eq!(user_of(UserId(6_242_926)), bulkmail_core::UserId::new(6_242_926));
        assert_ne!(user_of(UserId(1)), user_of(UserId(2)));
    }

    #[test]
    fn start_command_parses() {
        assert!(matches!(
            Command::parse("/start", "bulkmail_bot"),
            Ok(Command::Start)
        ));
        assert!(Command::parse("/stop", "bulkmail_bot").is_err());
    }
}
