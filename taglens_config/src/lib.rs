mod schema;

pub use schema::{AgentConfig, Config, ProviderConfig, ProvidersConfig, TelegramConfig};
