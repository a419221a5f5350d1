//! HTTP webhook binding for the reservation dialogue.
//!
//! Decodes the provider's form payload into `(sender, text)`, rejects
//! payloads without a sender before they reach the engine, and wraps the
//! reply in the provider's XML envelope.

mod envelope;
mod error;
mod handler;
mod server;

pub use envelope::{InboundMessage, MessagingResponse, WebhookForm};
pub use error::{Error, Result};
pub use handler::handle_message;
pub use server::{AppState, WebhookServer, router};
