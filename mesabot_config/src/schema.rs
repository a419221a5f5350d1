use mesabot_core::{BusinessHours, Keywords, MenuCatalog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub restaurant: RestaurantConfig,
    #[serde(default)]
    pub business_hours: BusinessHours,
    #[serde(default)]
    pub menu: MenuCatalog,
    #[serde(default)]
    pub keywords: Keywords,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RestaurantConfig {
    #[serde(default = "RestaurantConfig::default_name")]
    pub name: String,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
        }
    }
}

impl RestaurantConfig {
    fn default_name() -> String {
        "Restaurante Inventado".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// Route the messaging provider posts to
    #[serde(default = "ServerConfig::default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            path: Self::default_path(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        5000
    }

    fn default_path() -> String {
        "/bot".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerConfig {
    #[serde(default = "LedgerConfig::default_path")]
    pub path: PathBuf,
    /// Backoff before each retry of a failed append
    #[serde(default = "LedgerConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            retry_delays_ms: Self::default_retry_delays_ms(),
        }
    }
}

impl LedgerConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("reservas.txt")
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![100, 500, 1000]
    }

    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Drop dialogues with no activity for this long; unset keeps them forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    #[serde(default = "SessionConfig::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            sweep_interval_secs: Self::default_sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    /// Upper bound for both session timers: one year.
    pub const MAX_SECS: u64 = 365 * 24 * 60 * 60;

    const fn default_sweep_interval_secs() -> u64 {
        60
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("mesabot"))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load from `path`, or from `~/mesabot/config.json` when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'mesabot init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::from_json(&content)?;
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Self::validate_route_path(&self.server.path)?;
        if self.restaurant.name.trim().is_empty() {
            anyhow::bail!("restaurant.name must not be empty");
        }
        if self.menu.items.iter().any(|i| !i.price.is_finite() || i.price < 0.0) {
            anyhow::bail!("menu prices must be non-negative numbers");
        }
        if self.keywords.reservation.iter().all(|k| k.trim().is_empty()) {
            anyhow::bail!("keywords.reservation needs at least one keyword");
        }
        if let Some(secs) = self.session.idle_timeout_secs {
            if secs == 0 || secs > SessionConfig::MAX_SECS {
                anyhow::bail!(
                    "session.idle_timeout_secs must be in 1..={}, got {secs}",
                    SessionConfig::MAX_SECS
                );
            }
        }
        if self.session.sweep_interval_secs > SessionConfig::MAX_SECS {
            anyhow::bail!(
                "session.sweep_interval_secs must be at most {}, got {}",
                SessionConfig::MAX_SECS,
                self.session.sweep_interval_secs
            );
        }
        Ok(())
    }

    /// The webhook route is a literal path: no captures or wildcards.
    fn validate_route_path(path: &str) -> anyhow::Result<()> {
        if !path.starts_with('/') {
            anyhow::bail!("server.path must start with '/', got {path:?}");
        }
        if path
            .split('/')
            .any(|segment| segment.contains([':', '*', '{', '}']))
        {
            anyhow::bail!(
                "server.path must be a literal path without ':', '*', '{{' or '}}', got {path:?}"
            );
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write a template with every default spelled out.
    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::template()?)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Set the restaurant name, opening hours and menu");
        println!("   2. Point your messaging provider's webhook at http://<host>:<port>/bot");
        println!("   3. Run 'mesabot serve' to start answering messages");
        println!();
        println!("🔧 Configuration options:");
        println!("   - business_hours: reservation window, HH:MM, both ends inclusive");
        println!("   - ledger.path: append-only log of confirmed reservations");
        println!("   - session.idle_timeout_secs: forget abandoned dialogues after this long");
        println!();
        Ok(config_path)
    }

    pub fn template() -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&Self::default())?)
    }
}
