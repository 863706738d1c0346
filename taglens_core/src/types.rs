use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a delimited region in model output, also usable as `{name}` in
/// templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyTagName);
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The literal template variable for this tag, e.g. `{think}`.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for TagName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(tag: TagName) -> Self {
        tag.0
    }
}

impl Borrow<str> for TagName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a conversation group (a chat, a guild channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty or whitespace-only id carries no group context.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for GroupId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-invocable command and the template it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default = "CommandSpec::default_format")]
    pub format: String,
}

impl CommandSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
        }
    }

    fn default_format() -> String {
        "{name}在想：\n{think}".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_tag_names_are_rejected() {
        assert!(matches!(TagName::new(""), Err(Error::EmptyTagName)));
        assert!(matches!(TagName::new("  \n"), Err(Error::EmptyTagName)));
        assert_eq!(TagName::new("think").map(|t| t.placeholder()).ok(), Some("{think}".to_string()));
    }

    #[test]
    fn test_tag_names_deserialize_through_validation() {
        let tags: Vec<TagName> = serde_json::from_str(r#"["think","memory"]"#).unwrap();
        assert_eq!(tags[1].as_str(), "memory");
        assert!(serde_json::from_str::<Vec<TagName>>(r#"["think",""]"#).is_err());
    }

    #[test]
    fn test_command_format_has_default() {
        let cmd: CommandSpec = serde_json::from_str(r#"{"name":"think"}"#).unwrap();
        assert_eq!(cmd.format, "{name}在想：\n{think}");
    }

    #[test]
    fn test_group_id_from_chat_id() {
        assert_eq!(GroupId::from(-1_001_234_i64).as_str(), "-1001234");
        assert!(!GroupId::from(0_i64).is_blank());
        assert!(GroupId::from(" ").is_blank());
    }
}
