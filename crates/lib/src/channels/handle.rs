//! Outbound channel seam.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("channel api error: {0}")]
    Api(String),
}

/// Handle to a channel that can push a message to an address out-of-band.
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "twilio").
    fn id(&self) -> &str;
    /// Send a text message to a destination address. Best effort: one attempt, no retry.
    async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError>;
}
