use crate::{Command, Error, Result};
use std::{collections::HashMap, sync::Arc, time::Duration};
use taglens_config::Config;
use taglens_core::{
    ChatMessage, Extractor, GroupId, LLMProvider, ResponseHub, Role, TagExtractor,
};
use taglens_providers::ZhipuProvider;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

/// Sent instead of an empty message when a reply held only hidden sections.
const EMPTY_REPLY: &str = "……";

/// Telegram Bot with AI integration
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Zhipu AI provider
    provider: ZhipuProvider,
    /// Extracts hidden sections from replies and renders commands
    extractor: Arc<Extractor>,
    /// Replies are published here, correlated by chat
    hub: Arc<ResponseHub>,
    /// Used to hide configured sections from the visible reply
    tag_extractor: Arc<TagExtractor>,
    /// Configuration
    pub config: Config,
    /// Recent messages per chat: `chat_id` -> history
    histories: Arc<Mutex<HashMap<i64, Vec<ChatMessage>>>>,
    /// Allowed chat IDs
    allowed_chats: Vec<i64>,
}

impl TelegramBot {
    /// Create a new Telegram bot
    pub fn new(
        token: String,
        provider: ZhipuProvider,
        config: Config,
        allowed_chats: &[String],
    ) -> Result<Self> {
        // Parse allowed chat IDs
        let allowed_chats = allowed_chats
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();

        let hub = Arc::new(ResponseHub::new());
        let mut extractor = Extractor::new(config.extractor.clone())?;
        extractor.attach(Some(Arc::clone(&hub)));
        let tag_extractor = extractor.tag_extractor();

        Ok(Self {
            bot: Bot::new(token),
            provider,
            extractor: Arc::new(extractor),
            hub,
            tag_extractor,
            config,
            histories: Arc::new(Mutex::new(HashMap::new())),
            allowed_chats,
        })
    }

    /// Check if a chat is allowed
    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    #[must_use]
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Reset conversation history for a chat
    pub async fn reset_session(&self, chat_id: i64) {
        self.histories.lock().await.remove(&chat_id);
    }

    /// Process a message and get the visible part of the response
    pub async fn process_message(&self, chat_id: i64, text: String) -> Result<String> {
        if !self.is_allowed(chat_id) {
            return Err(Error::Unauthorized(chat_id));
        }

        let mut messages = vec![ChatMessage::new(
            Role::System,
            self.config.agent.system_prompt.clone(),
        )];
        messages.extend(
            self.histories
                .lock()
                .await
                .get(&chat_id)
                .into_iter()
                .flatten()
                .cloned(),
        );
        messages.push(ChatMessage::new(Role::User, text.clone()));

        let turn = self.hub.begin_turn(Some(GroupId::from(chat_id)));
        let response = self
            .provider
            .chat(&messages, &self.config.agent.model)
            .await
            .map_err(Error::Provider)?;
        self.hub.complete(turn, response.content.clone());

        let visible = self.tag_extractor.strip(&response.content);
        self.remember(chat_id, text, response.content).await;

        if visible.is_empty() {
            Ok(EMPTY_REPLY.to_string())
        } else {
            Ok(visible)
        }
    }

    async fn remember(&self, chat_id: i64, user: String, assistant: String) {
        let limit = self.config.agent.history_limit;
        let mut histories = self.histories.lock().await;
        let history = histories.entry(chat_id).or_default();
        history.push(ChatMessage::new(Role::User, user));
        history.push(ChatMessage::new(Role::Assistant, assistant));
        if history.len() > limit {
            let excess = history.len() - limit;
            history.drain(..excess);
        }
    }

    /// Test connection to Telegram API with linear backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(bot_user) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        bot_user
                            .user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        bot_user.user.id
                    );
                    return;
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    // Only show detailed help on first failure
                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                        warn!("  - Proxy or VPN configuration required");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await;

        let menu = Command::bot_commands(&self.config.extractor.commands);
        if let Err(e) = self.bot.set_my_commands(menu).await {
            warn!("Failed to register command menu: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |_bot: Bot, msg: teloxide::types::Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
