use std::fmt::Write as _;
use taglens_core::CommandSpec;
use teloxide::types::BotCommand;

/// Maximum command length accepted by the Telegram command menu.
const MAX_MENU_COMMAND_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Help,
    /// List configured tag variables.
    Tags,
    /// List configured render commands.
    Commands,
    /// A configured render command, by its configured name.
    Render(String),
}

impl Command {
    fn builtins() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", "开始使用机器人"),
            BotCommand::new("reset", "重置对话历史"),
            BotCommand::new("help", "显示帮助信息"),
            BotCommand::new("tags", "查看当前配置的所有标签"),
            BotCommand::new("commands", "查看当前配置的所有指令"),
        ]
    }

    /// Commands for the Telegram menu.
    ///
    /// Configured names Telegram cannot show in its menu are still handled
    /// when typed, they are only left out of the menu.
    #[must_use]
    pub fn bot_commands(configured: &[CommandSpec]) -> Vec<BotCommand> {
        let mut commands = Self::builtins();
        commands.extend(
            configured
                .iter()
                .filter(|c| is_menu_command(&c.name))
                .map(|c| BotCommand::new(c.name.clone(), format!("输出 {} 指令", c.name))),
        );
        commands
    }

    /// Parse `/command` or `/command@bot_name`, ignoring trailing arguments.
    ///
    /// Built-in commands take precedence over configured ones.
    #[must_use]
    pub fn parse_from_text(text: &str, configured: &[CommandSpec]) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/')?;
        let name = word.split('@').next().unwrap_or(word);
        if name.is_empty() {
            return None;
        }

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "reset" => Some(Self::Reset),
            "help" => Some(Self::Help),
            "tags" | "extractor.tags" | "extractor_tags" => Some(Self::Tags),
            "commands" | "extractor.commands" | "extractor_commands" => Some(Self::Commands),
            lower => configured
                .iter()
                .find(|c| c.name == name || c.name.to_lowercase() == lower)
                .map(|c| Self::Render(c.name.clone())),
        }
    }

    #[must_use]
    pub fn help_text(configured: &[CommandSpec]) -> String {
        let mut text = String::from(
            "🤖 TagLens Telegram Bot\n\n命令列表:\n\
             /start    - 开始使用机器人\n\
             /reset    - 重置对话历史\n\
             /help     - 显示此帮助信息\n\
             /tags     - 查看当前配置的所有标签\n\
             /commands - 查看当前配置的所有指令\n",
        );
        for command in configured {
            let _ = writeln!(text, "/{}", command.name);
        }
        text.push_str("\n直接发送消息即可开始对话！");
        text
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        r"
👋 欢迎使用 TagLens Telegram Bot！

直接和我聊天吧。我回复时的想法、记忆和对你的印象
都可以通过配置好的指令查看。

发送 /help 查看命令列表。
"
    }
}

fn is_menu_command(name: &str) -> bool {
    (1..=MAX_MENU_COMMAND_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("think", "{name}在想：\n{think}"),
            CommandSpec::new("思考", "{think}"),
        ]
    }

    #[test]
    fn test_parses_builtins() {
        assert_eq!(Command::parse_from_text("/start", &[]), Some(Command::Start));
        assert_eq!(Command::parse_from_text(" /HELP ", &[]), Some(Command::Help));
        assert_eq!(Command::parse_from_text("/reset@my_bot", &[]), Some(Command::Reset));
        assert_eq!(Command::parse_from_text("/extractor.tags", &[]), Some(Command::Tags));
        assert_eq!(Command::parse_from_text("/commands", &[]), Some(Command::Commands));
    }

    #[test]
    fn test_parses_configured_commands() {
        let configured = configured();
        assert_eq!(
            Command::parse_from_text("/think@my_bot now", &configured),
            Some(Command::Render("think".to_string()))
        );
        assert_eq!(
            Command::parse_from_text("/思考", &configured),
            Some(Command::Render("思考".to_string()))
        );
    }

    #[test]
    fn test_plain_text_and_unknown_commands_are_not_commands() {
        let configured = configured();
        assert_eq!(Command::parse_from_text("hello /think", &configured), None);
        assert_eq!(Command::parse_from_text("/unknown", &configured), None);
        assert_eq!(Command::parse_from_text("/", &configured), None);
        assert_eq!(Command::parse_from_text("   ", &configured), None);
    }

    #[test]
    fn test_menu_skips_names_telegram_rejects() {
        let menu = Command::bot_commands(&configured());
        let names: Vec<_> = menu.iter().map(|c| c.command.as_str()).collect();
        assert!(names.contains(&"think"));
        assert!(!names.contains(&"思考"));
        assert!(names.contains(&"tags"));
    }

    #[test]
    fn test_help_lists_configured_commands() {
        let help = Command::help_text(&configured());
        assert!(help.contains("/think\n"));
        assert!(help.contains("/思考\n"));
    }
}
