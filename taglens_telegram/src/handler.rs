use crate::{Command, Result, TelegramBot};
use taglens_core::{CommandSpec, GroupId};
use teloxide::{requests::Requester, types::Message};
use tracing::info;

/// What to do with an incoming text message.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    /// Chat is not on the allow-list
    Ignore,
    Command(Command),
    Chat,
}

/// Apply the allow-list, then tell commands from chat messages.
fn route(text: &str, configured: &[CommandSpec], allowed: bool) -> Route {
    if !allowed {
        return Route::Ignore;
    }
    Command::parse_from_text(text, configured).map_or(Route::Chat, Route::Command)
}

/// Handle bot commands
pub async fn handle_command(bot: TelegramBot, msg: Message, cmd: Command) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    let reply = match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            Command::welcome_text().to_string()
        }
        Command::Reset => {
            info!("[@{username}] Command: /reset");
            bot.reset_session(chat_id).await;
            "对话历史已重置".to_string()
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            Command::help_text(&bot.config.extractor.commands)
        }
        Command::Tags => {
            info!("[@{username}] Command: /tags");
            bot.extractor().describe_tags()
        }
        Command::Commands => {
            info!("[@{username}] Command: /commands");
            bot.extractor().describe_commands()
        }
        Command::Render(name) => {
            info!("[@{username}] Command: /{name}");
            let Some(reply) = bot
                .extractor()
                .run_command(&name, Some(&GroupId::from(chat_id)))
            else {
                return Ok(());
            };
            reply
        }
    };

    bot.bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    match route(text, &bot.config.extractor.commands, bot.is_allowed(chat_id)) {
        Route::Ignore => {
            info!("[@{username}] Ignoring message from chat {chat_id}");
            return Ok(());
        }
        Route::Command(cmd) => return handle_command(bot, msg, cmd).await,
        Route::Chat => {}
    }

    info!("[@{username}] Message: {text}");

    // Show typing indicator
    bot.bot
        .send_chat_action(msg.chat.id, teloxide::types::ChatAction::Typing)
        .await?;

    // Process message and get response
    let response = bot.process_message(chat_id, text.to_string()).await?;

    info!("[@{username}] Response: {response}");

    bot.bot.send_message(msg.chat.id, response).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Vec<CommandSpec> {
        vec![CommandSpec::new("think", "{name}在想：\n{think}")]
    }

    #[test]
    fn test_disallowed_chat_is_ignored_for_every_path() {
        let configured = configured();
        assert_eq!(route("/think", &configured, false), Route::Ignore);
        assert_eq!(route("/tags", &configured, false), Route::Ignore);
        assert_eq!(route("/start", &configured, false), Route::Ignore);
        assert_eq!(route("你好", &configured, false), Route::Ignore);
    }

    #[test]
    fn test_allowed_chat_routes_commands_and_messages() {
        let configured = configured();
        assert_eq!(
            route("/think", &configured, true),
            Route::Command(Command::Render("think".to_string()))
        );
        assert_eq!(route("/commands", &configured, true), Route::Command(Command::Commands));
        assert_eq!(route("你好", &configured, true), Route::Chat);
    }
}
