//! Inbound message from a channel: handled once by the gateway and then dropped.

/// A message received on the webhook. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// Message text, trimmed.
    pub body: String,
    /// Sender address as given by the channel (e.g. "whatsapp:+5511999999999").
    pub sender_address: String,
}

impl InboundMessage {
    pub fn new(body: &str, sender_address: &str) -> Self {
        Self {
            body: body.trim().to_string(),
            sender_address: sender_address.trim().to_string(),
        }
    }
}
