//! Messaging-provider wire formats.
//!
//! Inbound messages arrive as a form with `Body` and `From`; replies go
//! back as a `<Response><Message>` XML document.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use quick_xml::escape::escape;
use serde::Deserialize;

use crate::{Error, Result};

/// Raw webhook form. The provider sends many more fields; only these two
/// are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
}

impl TryFrom<WebhookForm> for InboundMessage {
    type Error = Error;

    fn try_from(form: WebhookForm) -> Result<Self> {
        let sender_id = form
            .from
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingField("From"))?;
        let text = form.body.ok_or(Error::MissingField("Body"))?;

        Ok(Self {
            sender_id,
            text: text.trim().to_string(),
        })
    }
}

/// Reply document wrapping exactly one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingResponse {
    message: String,
}

impl MessagingResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>{}</Message></Response>"#,
            escape(self.message.as_str())
        )
    }
}

impl IntoResponse for MessagingResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/xml")], self.to_xml()).into_response()
    }
}
