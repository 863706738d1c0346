use taglens_config::Config;

/// Strategy for writing the starter config to `~/taglens/config.json`.
///
/// The template carries the default extractor section (character name `AI`,
/// tags `think`/`memory`/`relationship`, the `think` and `extract` commands)
/// plus empty Zhipu and Telegram credentials. An existing file is never
/// overwritten.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
