use super::{CommandStrategy, load_config};
use std::path::PathBuf;
use taglens_core::Extractor;

/// What to list, with an optional config path.
pub enum ListInput {
    Tags(Option<PathBuf>),
    Commands(Option<PathBuf>),
}

/// Strategy for listing configured tags or commands.
///
/// Reads static configuration only.
#[derive(Debug, Clone, Copy)]
pub struct ListStrategy;

impl CommandStrategy for ListStrategy {
    type Input = ListInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (path, tags) = match input {
            ListInput::Tags(path) => (path, true),
            ListInput::Commands(path) => (path, false),
        };
        let extractor = Extractor::new(load_config(path.as_deref())?.extractor)?;

        if tags {
            println!("{}", extractor.describe_tags());
        } else {
            println!("{}", extractor.describe_commands());
        }
        Ok(())
    }
}
