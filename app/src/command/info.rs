use mesabot_config::Config;
use std::path::PathBuf;

/// Strategy for displaying the effective configuration.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load(input.as_deref())?;

        println!("=== mesabot Configuration ===\n");

        println!("Restaurant:");
        println!("  Name: {}", config.restaurant.name);
        println!(
            "  Hours: {} - {}",
            config.business_hours.opens_display(),
            config.business_hours.closes_display()
        );
        println!();

        println!("Menu: {} item(s)", config.menu.items.len());
        for line in config.menu.render().lines() {
            println!("  {line}");
        }
        println!();

        println!("Keywords:");
        println!("  Reservation: {}", config.keywords.reservation.join(", "));
        println!("  Greeting: {}", config.keywords.greeting.join(", "));
        println!("  Menu: {}", config.keywords.menu.join(", "));
        println!();

        println!("Server:");
        println!(
            "  Webhook: http://{}:{}{}",
            config.server.host, config.server.port, config.server.path
        );
        println!();

        println!("Ledger:");
        println!("  Path: {}", config.ledger.path.display());
        println!("  Retry delays (ms): {:?}", config.ledger.retry_delays_ms);
        println!();

        println!("Sessions:");
        match config.session.idle_timeout_secs {
            Some(secs) => {
                println!("  Idle timeout: {secs}s");
                println!("  Sweep interval: {}s", config.session.sweep_interval_secs);
            }
            None => println!("  Idle timeout: (disabled)"),
        }

        Ok(())
    }
}
