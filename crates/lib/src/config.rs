//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.projbot/config.json`) and environment.
//! Secrets (Gemini key, Twilio credentials) are normally supplied through the environment;
//! env always wins over the file, and blank values count as unset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Gemini model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Channel settings (Twilio WhatsApp).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Background brief execution limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Startup behaviour.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Gateway bind, port, and public address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// HTTP port (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1"; the tunnel forwards to loopback).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Public base URL the tunnel exposes (e.g. `https://abc.ngrok.app`). Overridden by PROJBOT_PUBLIC_URL.
    /// Twilio must be configured to POST to `<publicUrl>/whatsapp`.
    pub public_url: Option<String>,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            public_url: None,
        }
    }
}

/// Gemini model, sampling temperature, endpoint, and key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// API root (default https://generativelanguage.googleapis.com).
    pub base_url: Option<String>,

    /// Gemini API key. Overridden by GOOGLE_API_KEY env.
    pub api_key: Option<String>,
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub twilio: TwilioChannelConfig,
}

/// Twilio WhatsApp account. Each credential is overridden by its env var when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwilioChannelConfig {
    /// TWILIO_ACCOUNT_SID
    pub account_sid: Option<String>,
    /// TWILIO_AUTH_TOKEN
    pub auth_token: Option<String>,
    /// TWILIO_PHONE_NUMBER, e.g. "whatsapp:+14155238886".
    pub phone_number: Option<String>,
    /// API root (default https://api.twilio.com). Tests point this at a local server.
    pub api_base: Option<String>,
    /// Verify X-Twilio-Signature on inbound webhooks. Requires gateway.publicUrl.
    #[serde(default)]
    pub validate_signature: bool,
}

/// Limits for background brief generation and the inline support call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Maximum crew executions running at once; further briefs wait for a slot.
    #[serde(default = "default_max_concurrent_briefs")]
    pub max_concurrent_briefs: usize,

    /// Upper bound for one full crew execution.
    #[serde(default = "default_brief_timeout_secs")]
    pub brief_timeout_secs: u64,

    /// Upper bound for the inline support-question LLM call.
    #[serde(default = "default_support_timeout_secs")]
    pub support_timeout_secs: u64,
}

fn default_max_concurrent_briefs() -> usize {
    4
}

fn default_brief_timeout_secs() -> u64 {
    600
}

fn default_support_timeout_secs() -> u64 {
    60
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_briefs: default_max_concurrent_briefs(),
            brief_timeout_secs: default_brief_timeout_secs(),
            support_timeout_secs: default_support_timeout_secs(),
        }
    }
}

impl DispatchConfig {
    pub fn brief_timeout(&self) -> Duration {
        Duration::from_secs(self.brief_timeout_secs.max(1))
    }

    pub fn support_timeout(&self) -> Duration {
        Duration::from_secs(self.support_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    /// Run the self-description crew once before serving.
    #[serde(default)]
    pub self_describe: bool,
}

/// Boot-time configuration failures. Any of these stops the process before it serves.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required secret {0} (set the environment variable or the config file entry)")]
    MissingSecret(&'static str),
    #[error("signature validation requires gateway.publicUrl (or PROJBOT_PUBLIC_URL)")]
    PublicUrlRequired,
}

/// The four credentials the bot cannot run without.
#[derive(Clone)]
pub struct Secrets {
    pub google_api_key: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_phone_number", &self.twilio_phone_number)
            .finish_non_exhaustive()
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Lookup value for `name` if set and non-blank, otherwise the trimmed config value.
fn env_or<F>(lookup: &F, name: &str, from_config: Option<&String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|s| non_empty(&s))
        .or_else(|| from_config.and_then(|s| non_empty(s)))
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve all required secrets. Env overrides config; a missing one is fatal.
pub fn resolve_secrets(config: &Config) -> Result<Secrets, ConfigError> {
    resolve_secrets_with(config, process_env)
}

/// Same as [`resolve_secrets`] with an explicit variable lookup.
pub fn resolve_secrets_with<F>(config: &Config, lookup: F) -> Result<Secrets, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let twilio = &config.channels.twilio;
    let google_api_key = env_or(&lookup, "GOOGLE_API_KEY", config.llm.api_key.as_ref())
        .ok_or(ConfigError::MissingSecret("GOOGLE_API_KEY"))?;
    let twilio_account_sid = env_or(&lookup, "TWILIO_ACCOUNT_SID", twilio.account_sid.as_ref())
        .ok_or(ConfigError::MissingSecret("TWILIO_ACCOUNT_SID"))?;
    let twilio_auth_token = env_or(&lookup, "TWILIO_AUTH_TOKEN", twilio.auth_token.as_ref())
        .ok_or(ConfigError::MissingSecret("TWILIO_AUTH_TOKEN"))?;
    let twilio_phone_number = env_or(&lookup, "TWILIO_PHONE_NUMBER", twilio.phone_number.as_ref())
        .ok_or(ConfigError::MissingSecret("TWILIO_PHONE_NUMBER"))?;
    Ok(Secrets {
        google_api_key,
        twilio_account_sid,
        twilio_auth_token,
        twilio_phone_number,
    })
}

/// Resolve only the Gemini key (for commands that never touch Twilio).
pub fn resolve_google_api_key(config: &Config) -> Result<String, ConfigError> {
    env_or(&process_env, "GOOGLE_API_KEY", config.llm.api_key.as_ref())
        .ok_or(ConfigError::MissingSecret("GOOGLE_API_KEY"))
}

/// Resolve the public base URL: env PROJBOT_PUBLIC_URL overrides config. Trailing slashes are dropped.
pub fn resolve_public_url(config: &Config) -> Option<String> {
    env_or(&process_env, "PROJBOT_PUBLIC_URL", config.gateway.public_url.as_ref())
        .map(|u| u.trim_end_matches('/').to_string())
}

/// Full webhook URL Twilio should call (and sign).
pub fn webhook_url(public_url: &str) -> String {
    format!("{}{}", public_url.trim_end_matches('/'), crate::gateway::WEBHOOK_PATH)
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PROJBOT_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".projbot").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, PROJBOT_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
