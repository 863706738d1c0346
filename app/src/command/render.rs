use super::{CommandStrategy, load_config, read_input};
use std::path::PathBuf;
use std::sync::Arc;
use taglens_core::{Extractor, GroupId, ResponseHub};

/// Group used for replies fed in from the command line.
const LOCAL_GROUP: &str = "local";

/// Input for the render command.
pub struct RenderInput {
    pub config: Option<PathBuf>,
    /// Name of a configured command
    pub command: String,
    pub file: Option<PathBuf>,
}

/// Strategy for rendering a configured command against one reply.
///
/// The reply goes through the same hub and ingestion path the bot uses.
pub struct RenderStrategy;

impl CommandStrategy for RenderStrategy {
    type Input = RenderInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = load_config(input.config.as_deref())?;
        let hub = Arc::new(ResponseHub::new());
        let mut extractor = Extractor::new(config.extractor)?;
        extractor.attach(Some(Arc::clone(&hub)));

        let text = read_input(input.file.as_ref())?;
        let group = GroupId::from(LOCAL_GROUP);
        hub.complete(hub.begin_turn(Some(group.clone())), text);

        let Some(output) = extractor.run_command(&input.command, Some(&group)) else {
            anyhow::bail!(
                "Unknown command: {}. Run 'taglens commands' to list configured commands.",
                input.command
            );
        };

        println!("{output}");
        Ok(())
    }
}
