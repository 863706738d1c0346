use super::{CommandStrategy, load_config, read_input};
use std::path::PathBuf;
use taglens_core::{TagExtractor, TagName, extract};

/// Input for the extract command.
pub struct ExtractInput {
    pub config: Option<PathBuf>,
    /// Extract only this tag instead of every configured one
    pub tag: Option<String>,
    pub file: Option<PathBuf>,
}

/// Strategy for printing the tag contents of a single reply.
pub struct ExtractStrategy;

impl CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        if let Some(tag) = input.tag {
            let tag = TagName::new(tag)?;
            let text = read_input(input.file.as_ref())?;
            print_tag(&tag, extract(&text, &tag)?.as_deref());
            return Ok(());
        }

        let tags = load_config(input.config.as_deref())?.extractor.tags;
        let extractor = TagExtractor::new(&tags)?;
        let text = read_input(input.file.as_ref())?;

        for (tag, content) in extractor.extract_all(&text) {
            print_tag(tag, content.as_deref());
        }

        Ok(())
    }
}

fn print_tag(tag: &TagName, content: Option<&str>) {
    println!("<{tag}>");
    println!("{}", content.unwrap_or("(none)"));
}
