use axum::Form;
use axum::extract::State;
use tracing::info;

use crate::envelope::{InboundMessage, MessagingResponse, WebhookForm};
use crate::{AppState, Result};

/// Handle one inbound message from the provider.
pub async fn handle_message(
    State(state): State<AppState>,
    Form(form): Form<WebhookForm>,
) -> Result<MessagingResponse> {
    let inbound = InboundMessage::try_from(form)?;
    let sender = inbound.sender_id.as_str();

    info!("[{sender}] Message: {}", inbound.text);

    let reply = state.engine.handle(sender, &inbound.text).await;

    info!("[{sender}] Response: {}", reply.replace('\n', " / "));

    Ok(MessagingResponse::new(reply))
}

pub async fn health() -> &'static str {
    "ok"
}
