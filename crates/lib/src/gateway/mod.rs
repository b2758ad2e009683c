//! Gateway: HTTP webhook for the WhatsApp channel.
//!
//! Single port serves the Twilio webhook (`POST /whatsapp`) and a health probe (`GET /`).
//! Every inbound message is answered inline with TwiML; full briefs are handed to the
//! dispatcher and delivered later through the Twilio Messages API.

mod server;

pub use server::{router, run_gateway, serve, GatewayState, SignatureCheck, WEBHOOK_PATH};
