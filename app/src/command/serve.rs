use mesabot_config::Config;
use mesabot_conversation::spawn_idle_sweeper;
use mesabot_webhook::WebhookServer;
use std::path::PathBuf;
use tracing::info;

use super::build_engine;

/// Input parameters for the Serve command strategy.
#[derive(Debug, Clone)]
pub struct ServeInput {
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Port override
    pub port: Option<u16>,
}

/// Strategy for running the webhook server.
///
/// Builds the engine from the loaded config, starts the idle sweeper when
/// a timeout is configured, and serves until Ctrl-C.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load(input.config_path.as_deref())?;
        if let Some(port) = input.port {
            config.server.port = port;
        }

        info!(
            "Starting reservation bot for {} (hours {} - {})",
            config.restaurant.name,
            config.business_hours.opens_display(),
            config.business_hours.closes_display()
        );
        info!("Reservation log: {}", config.ledger.path.display());

        let (engine, store) = build_engine(&config);

        let sweeper = config.session.idle_timeout().map(|idle_timeout| {
            spawn_idle_sweeper(store, idle_timeout, config.session.sweep_interval())
        });

        let result = WebhookServer::new(engine, config.server).run().await;

        if let Some(handle) = sweeper {
            handle.abort();
        }

        result?;
        Ok(())
    }
}
