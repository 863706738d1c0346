#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Tag extraction, per-group state and template rendering for character
//! bot replies.
//!
//! Model replies carry hidden sections such as `<think>...</think>`. The
//! [`Extractor`] pulls those sections out of every reply it observes, keeps
//! only the latest set per conversation group and renders them into text on
//! demand through configured command templates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;
pub mod extract;
pub mod ingest;
mod plugin;
pub mod render;
mod settings;
pub mod store;
mod types;

pub use error::{Error, Result};
pub use extract::{TagExtractor, extract};
pub use ingest::{
    IngestOutcome, Ingestor, ResponseEvent, ResponseHub, ResponseObserver, Subscription, Turn,
};
pub use plugin::{Extractor, NO_CONTENT_REPLY, NO_SESSION_REPLY};
pub use render::{fallback_marker, render};
pub use settings::ExtractorSettings;
pub use store::{GroupState, GroupStore};
pub use types::{CommandSpec, GroupId, TagName};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse>;
    fn get_default_model(&self) -> &str;
}
