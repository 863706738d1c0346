use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

// The extractor section is owned by taglens_core so it can validate itself
use taglens_core::ExtractorSettings;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorSettings,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "AgentConfig::default_model")]
    pub model: String,
    #[serde(default = "AgentConfig::default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "AgentConfig::default_history_limit")]
    pub history_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            system_prompt: Self::default_system_prompt(),
            history_limit: Self::default_history_limit(),
        }
    }
}

impl AgentConfig {
    fn default_model() -> String {
        "glm-4-flash".to_string()
    }

    fn default_system_prompt() -> String {
        "You are a friendly group chat member. Before replying, write your private thoughts inside <think></think>, \
         what you want to remember inside <memory></memory> and how you see the user inside <relationship></relationship>."
            .to_string()
    }

    const fn default_history_limit() -> usize {
        20
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub zhipu: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub token: String,
    /// Chat IDs allowed to talk to the bot; empty allows everyone.
    #[serde(default)]
    pub allow_from: Vec<String>,
}

impl Config {
    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("taglens"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'taglens init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config document.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.extractor.validate()?;
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Zhipu API key and Telegram token");
        println!("   2. Adjust extractor.tags and extractor.commands to your character prompt");
        println!("   3. Run 'taglens telegram' to start the bot");
        println!();
        println!("🔧 Template variables:");
        println!("   - {{name}}: extractor.character_name");
        println!("   - {{<tag>}}: content of the latest <tag>...</tag> in the group");
        println!();
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "extractor": {
    "character_name": "AI",
    "tags": ["think", "memory", "relationship"],
    "commands": [
      { "name": "think", "format": "{name}在想：\n{think}" },
      { "name": "extract", "format": "{name}在想：\n{think}\n记忆是：\n{memory}\n我们现在的关系是：\n{relationship}" }
    ],
    "show_logs": false
  },
  "agent": {
    "model": "glm-4-flash",
    "history_limit": 20
  },
  "providers": {
    "zhipu": {
      "api_key": "your-zhipu-api-key-here"
    }
  },
  "telegram": {
    "enabled": true,
    "token": "",
    "allow_from": []
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::from_json(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.extractor, ExtractorSettings::default());
        assert_eq!(config.agent.history_limit, 20);
        assert!(config.telegram.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.extractor.character_name, "AI");
        assert_eq!(config.agent.model, "glm-4-flash");
        assert!(!config.telegram.enabled);
        assert!(config.telegram.allow_from.is_empty());
    }

    #[test]
    fn test_blank_tag_fails_to_load() {
        let result = Config::from_json(r#"{"extractor": {"tags": ["think", ""]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_command_fails_to_load() {
        let result = Config::from_json(
            r#"{"extractor": {"commands": [{"name": "a"}, {"name": "a"}]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_reads_file() {
        let path = std::env::temp_dir().join(format!("taglens-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"extractor": {"character_name": "syn", "show_logs": true}}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.extractor.character_name, "syn");
        assert!(config.extractor.show_logs);
    }
}
