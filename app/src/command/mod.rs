//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a separate strategy type with its own input, so
//! dispatch is resolved at compile time.

use mesabot_config::Config;
use mesabot_conversation::{ConversationConfig, ConversationEngine, InMemorySessionStore};
use mesabot_core::{ReservationSink, SessionStore};
use mesabot_ledger::{FileReservationLog, RetryingSink};
use std::sync::Arc;
use tracing::info;

mod chat;
mod info;
mod init;
mod serve;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Map the file configuration onto the engine's static data.
fn build_conversation_config(config: &Config) -> ConversationConfig {
    ConversationConfig::default()
        .with_restaurant_name(config.restaurant.name.clone())
        .with_hours(config.business_hours)
        .with_menu(config.menu.clone())
        .with_keywords(config.keywords.clone())
}

/// Wire the in-memory session store and the retrying file log into an engine.
///
/// The store is returned separately so callers can attach the idle sweeper.
fn build_engine(config: &Config) -> (Arc<ConversationEngine>, Arc<dyn SessionStore>) {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let delays = config.ledger.retry_delays();
    info!(
        "Reservation log retries: {} (delays {:?}ms)",
        delays.len(),
        config.ledger.retry_delays_ms
    );
    let sink: Arc<dyn ReservationSink> = Arc::new(RetryingSink::new(
        FileReservationLog::new(config.ledger.path.clone()),
        delays,
    ));

    let engine = ConversationEngine::new(
        Arc::clone(&store),
        sink,
        build_conversation_config(config),
    );
    (Arc::new(engine), store)
}

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic with context")]
    fn test_conversation_config_follows_file() {
        let config = Config::from_json(
            r#"{
                "restaurant": { "name": "La Tasca" },
                "business_hours": { "opens": "13:00", "closes": "16:30" },
                "keywords": { "reservation": ["book"] }
            }"#,
        )
        .unwrap();

        let conversation = build_conversation_config(&config);
        assert_eq!(conversation.restaurant_name, "La Tasca");
        assert_eq!(conversation.hours.opens_display(), "13:00");
        assert_eq!(conversation.keywords.reservation, vec!["book".to_string()]);
        assert_eq!(conversation.menu, config.menu);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic with context")]
    async fn test_built_engine_shares_store() {
        let (engine, store) = build_engine(&Config::default());
        engine.handle("console:test", "reservar").await;
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
