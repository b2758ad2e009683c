//! Inline replies for everything except full briefs.

use crate::intent::Intent;
use crate::llm::{chat_with_timeout, ChatMessage, LlmBackend};
use crate::replies;
use std::time::Duration;

/// Build the inline reply for `intent`. Only `SupportQuestion` touches the network (one LLM call,
/// bounded by `timeout`); a failed call yields the support fallback text.
pub async fn respond(
    intent: Intent,
    body: &str,
    llm: &dyn LlmBackend,
    timeout: Duration,
) -> String {
    match intent {
        Intent::Greeting => replies::WELCOME.to_string(),
        Intent::Help => replies::HELP.to_string(),
        Intent::AmbiguousIdea => replies::CLARIFY.to_string(),
        Intent::FullBrief => replies::HOLDING.to_string(),
        Intent::SupportQuestion => {
            let messages = vec![ChatMessage::user(replies::support_prompt(body))];
            match chat_with_timeout(llm, messages, timeout).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("responder: support answer failed: {}", e);
                    replies::SUPPORT_FALLBACK.to_string()
                }
            }
        }
    }
}
