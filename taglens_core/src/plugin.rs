use crate::{
    CommandSpec, ExtractorSettings, GroupId, GroupStore, Ingestor, ResponseHub, Result,
    Subscription, TagExtractor, render,
};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, warn};

/// Reply when a command arrives without any group context.
pub const NO_SESSION_REPLY: &str = "无法获取会话信息";

/// Reply when nothing has been extracted for the group yet.
pub const NO_CONTENT_REPLY: &str = "当前没有可用的标签内容";

/// The extractor as a host sees it: settings, store and hub subscription.
///
/// Rendering works whether or not a response source was attached; without
/// one, every command simply reports that no content is available.
pub struct Extractor {
    settings: ExtractorSettings,
    extractor: Arc<TagExtractor>,
    store: GroupStore,
    attachment: Option<(Arc<ResponseHub>, Subscription)>,
}

impl Extractor {
    pub fn new(settings: ExtractorSettings) -> Result<Self> {
        settings.validate()?;
        let extractor = Arc::new(TagExtractor::new(&settings.tags)?);

        Ok(Self {
            settings,
            extractor,
            store: GroupStore::new(),
            attachment: None,
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    #[must_use]
    pub const fn store(&self) -> &GroupStore {
        &self.store
    }

    #[must_use]
    pub fn tag_extractor(&self) -> Arc<TagExtractor> {
        Arc::clone(&self.extractor)
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Subscribe ingestion to `source`.
    ///
    /// With no source the ingestion path stays inactive and a diagnostic is
    /// logged. Returns whether ingestion is active afterwards.
    pub fn attach(&mut self, source: Option<Arc<ResponseHub>>) -> bool {
        let Some(hub) = source else {
            warn!("No model response source available; extraction is disabled");
            return self.is_attached();
        };

        self.dispose_subscription();
        let ingestor = Ingestor::new(
            Arc::clone(&self.extractor),
            self.store.clone(),
            self.settings.show_logs,
        );
        let subscription = hub.subscribe(Arc::new(ingestor));
        self.attachment = Some((hub, subscription));

        info!(
            "Extractor attached, tags: {}",
            self.settings
                .tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        true
    }

    /// Unsubscribe from the response source and drop all stored state.
    pub fn dispose(&mut self) {
        self.dispose_subscription();
        self.store.clear();
    }

    fn dispose_subscription(&mut self) {
        if let Some((hub, subscription)) = self.attachment.take() {
            hub.unsubscribe(subscription);
            info!("Extractor detached from response source");
        }
    }

    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.settings.commands.iter().find(|c| c.name == name)
    }

    /// Run the configured command `name` for `group`.
    ///
    /// Returns `None` if no such command is configured.
    #[must_use]
    pub fn run_command(&self, name: &str, group: Option<&GroupId>) -> Option<String> {
        self.command(name).map(|spec| self.render_for(spec, group))
    }

    /// Render `spec` against the latest state of `group`.
    #[must_use]
    pub fn render_for(&self, spec: &CommandSpec, group: Option<&GroupId>) -> String {
        let Some(group) = group.filter(|g| !g.is_blank()) else {
            return NO_SESSION_REPLY.to_string();
        };

        match self.store.get(group) {
            Some(state) if !state.is_empty() => render(
                &spec.format,
                &self.settings.character_name,
                &self.settings.tags,
                &state,
            ),
            _ => NO_CONTENT_REPLY.to_string(),
        }
    }

    /// Human-readable list of configured tag variables.
    #[must_use]
    pub fn describe_tags(&self) -> String {
        if self.settings.tags.is_empty() {
            return "当前没有配置任何标签。".to_string();
        }

        let mut out = String::from("当前配置的标签变量：");
        for tag in &self.settings.tags {
            let _ = write!(out, "\n- {}", tag.placeholder());
        }
        out
    }

    /// Human-readable list of configured commands and their formats.
    #[must_use]
    pub fn describe_commands(&self) -> String {
        if self.settings.commands.is_empty() {
            return "当前没有配置任何指令。".to_string();
        }

        let mut out = String::from("当前配置的指令：");
        for command in &self.settings.commands {
            let _ = write!(out, "\n- {}：{}", command.name, command.format);
        }
        out
    }
}

impl Drop for Extractor {
    fn drop(&mut self) {
        self.dispose_subscription();
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("settings", &self.settings)
            .field("groups", &self.store.len())
            .field("attached", &self.is_attached())
            .finish()
    }
}
