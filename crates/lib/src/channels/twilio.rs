//! Twilio WhatsApp channel: outbound Messages API and inbound request signatures.

use crate::channels::handle::{ChannelError, ChannelHandle};
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;
use std::time::Duration;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Twilio rejects message bodies longer than this many characters.
pub const MAX_BODY_CHARS: usize = 1600;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Deserialize)]
struct MessageResource {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Twilio channel connector: sends messages from the configured WhatsApp sender.
pub struct TwilioChannel {
    id: String,
    account_sid: String,
    auth_token: String,
    from: String,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioChannel {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
        api_base: Option<String>,
    ) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| TWILIO_API_BASE.to_string());
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            id: "twilio".to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            api_base,
            client,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }

    /// POST Messages.json with From/To/Body. One attempt.
    pub async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError> {
        let body = truncate_body(text);
        if body.len() < text.len() {
            log::warn!(
                "twilio: message to {} truncated to {} characters",
                to,
                MAX_BODY_CHARS
            );
        }
        let res = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from.as_str()), ("To", to), ("Body", body)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let raw = res.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiErrorBody>(&raw) {
                Ok(ApiErrorBody {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{} (code {})", message, code),
                _ => raw,
            };
            return Err(ChannelError::Api(format!("{} {}", status, detail)));
        }
        let resource: MessageResource = res.json().await?;
        log::debug!(
            "twilio: message {} queued with status {}",
            resource.sid.as_deref().unwrap_or("?"),
            resource.status.as_deref().unwrap_or("?")
        );
        Ok(())
    }
}

#[async_trait]
impl ChannelHandle for TwilioChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError> {
        TwilioChannel::send_message(self, to, text).await
    }
}

/// Cut `text` to at most [`MAX_BODY_CHARS`] characters on a char boundary.
fn truncate_body(text: &str) -> &str {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Signature Twilio computes for a request: base64(HMAC-SHA1(auth_token, url + sorted key/value pairs)).
pub fn expected_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let mut data = String::from(url);
    for (k, v) in sorted {
        data.push_str(k);
        data.push_str(v);
    }
    // HMAC accepts keys of any length
    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(data.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Check an `X-Twilio-Signature` header value for the given URL and form params.
pub fn validate_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    provided: &str,
) -> bool {
    let expected = expected_signature(auth_token, url, params);
    !expected.is_empty() && constant_time_eq(expected.as_bytes(), provided.trim().as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
