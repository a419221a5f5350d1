//! JSON configuration loaded once at startup and immutable afterwards.

mod schema;

pub use schema::{Config, LedgerConfig, RestaurantConfig, ServerConfig, SessionConfig};
