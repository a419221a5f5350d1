use mesabot_config::Config;

/// Strategy for writing the configuration template to `~/mesabot/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config().map(|_| ())
    }
}
