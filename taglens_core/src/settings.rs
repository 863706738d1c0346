use crate::{CommandSpec, Error, Result, TagName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Static extractor configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorSettings {
    /// Substituted for `{name}` in command formats.
    #[serde(default = "ExtractorSettings::default_character_name")]
    pub character_name: String,
    /// Tags to extract; each is also a template variable.
    #[serde(default = "ExtractorSettings::default_tags")]
    pub tags: Vec<TagName>,
    #[serde(default = "ExtractorSettings::default_commands")]
    pub commands: Vec<CommandSpec>,
    /// Log every extraction at info level.
    #[serde(default)]
    pub show_logs: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            character_name: Self::default_character_name(),
            tags: Self::default_tags(),
            commands: Self::default_commands(),
            show_logs: false,
        }
    }
}

impl ExtractorSettings {
    fn default_character_name() -> String {
        "AI".to_string()
    }

    fn default_tags() -> Vec<TagName> {
        ["think", "memory", "relationship"]
            .into_iter()
            .filter_map(|t| TagName::new(t).ok())
            .collect()
    }

    fn default_commands() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("think", "{name}在想：\n{think}"),
            CommandSpec::new(
                "extract",
                "{name}在想：\n{think}\n记忆是：\n{memory}\n我们现在的关系是：\n{relationship}",
            ),
        ]
    }

    /// Reject duplicate tags and blank or duplicate command names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tag in &self.tags {
            if !seen.insert(tag.as_str()) {
                return Err(Error::DuplicateTag(tag.to_string()));
            }
        }

        let mut seen = HashSet::new();
        for command in &self.commands {
            if command.name.trim().is_empty() {
                return Err(Error::EmptyCommandName);
            }
            if !seen.insert(command.name.as_str()) {
                return Err(Error::DuplicateCommand(command.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: ExtractorSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ExtractorSettings::default());
        assert_eq!(settings.character_name, "AI");
        assert_eq!(settings.tags.len(), 3);
        assert_eq!(settings.commands[1].name, "extract");
        assert!(!settings.show_logs);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_lists_are_valid() {
        let settings: ExtractorSettings =
            serde_json::from_str(r#"{"tags": [], "commands": []}"#).unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let settings: ExtractorSettings =
            serde_json::from_str(r#"{"tags": ["think", "think"]}"#).unwrap();
        assert!(matches!(settings.validate(), Err(Error::DuplicateTag(t)) if t == "think"));
    }

    #[test]
    fn test_blank_command_name_is_rejected() {
        let settings: ExtractorSettings =
            serde_json::from_str(r#"{"commands": [{"name": " ", "format": "{think}"}]}"#).unwrap();
        assert!(matches!(settings.validate(), Err(Error::EmptyCommandName)));
    }
}
