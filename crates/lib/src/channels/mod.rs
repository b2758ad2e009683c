//! Messaging channels (Twilio WhatsApp).
//!
//! [`ChannelHandle`] is the outbound seam used by the brief dispatcher; inbound messages
//! arrive through the gateway webhook and are answered inline with TwiML.

mod handle;
mod inbound;
mod twilio;
mod twiml;

pub use handle::{ChannelError, ChannelHandle};
pub use inbound::InboundMessage;
pub use twilio::{expected_signature, validate_signature, TwilioChannel, MAX_BODY_CHARS};
pub use twiml::message_response;
