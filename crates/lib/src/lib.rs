//! projbot core library: WhatsApp project-brief assistant.
//!
//! Inbound messages arrive on the gateway webhook, are classified by [`intent`], and are either
//! answered inline ([`responder`]) or handed to the [`dispatch`] layer, which runs the
//! multi-agent [`crew`] against the Gemini backend and pushes the result through Twilio.

pub mod bootstrap;
pub mod channels;
pub mod config;
pub mod crew;
pub mod dispatch;
pub mod gateway;
pub mod init;
pub mod intent;
pub mod llm;
pub mod replies;
pub mod responder;
