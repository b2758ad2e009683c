//! Gateway HTTP server: Twilio webhook plus health probe.

use crate::bootstrap;
use crate::channels::{self, ChannelHandle, InboundMessage, TwilioChannel};
use crate::config::{self, Config, ConfigError};
use crate::crew::project_brief_crew;
use crate::dispatch::BriefDispatcher;
use crate::intent::{classify, word_count};
use crate::llm::{GeminiClient, LlmBackend};
use crate::replies;
use crate::responder::respond;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Path Twilio posts inbound WhatsApp messages to.
pub const WEBHOOK_PATH: &str = "/whatsapp";

const SIGNATURE_HEADER: &str = "X-Twilio-Signature";

/// Inputs for verifying inbound request signatures.
#[derive(Clone)]
pub struct SignatureCheck {
    pub auth_token: String,
    /// Full public URL Twilio signs, e.g. `https://abc.ngrok.app/whatsapp`.
    pub webhook_url: String,
}

/// Shared state for the gateway. Everything in it is immutable or internally synchronized.
#[derive(Clone)]
pub struct GatewayState {
    pub port: u16,
    pub llm: Arc<dyn LlmBackend>,
    pub dispatcher: BriefDispatcher,
    pub support_timeout: Duration,
    /// When Some, requests without a matching `X-Twilio-Signature` get 403.
    pub signature: Option<SignatureCheck>,
}

impl GatewayState {
    /// Wire backends into state using the dispatch limits from `config`.
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmBackend>,
        channel: Arc<dyn ChannelHandle>,
        signature: Option<SignatureCheck>,
    ) -> Self {
        let dispatcher = BriefDispatcher::new(
            Arc::new(project_brief_crew()),
            llm.clone(),
            channel,
            config.dispatch.max_concurrent_briefs,
            config.dispatch.brief_timeout(),
        );
        Self {
            port: config.gateway.port,
            llm,
            dispatcher,
            support_timeout: config.dispatch.support_timeout(),
            signature,
        }
    }
}

/// Routes: `GET /` health, `POST /whatsapp` webhook.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route(WEBHOOK_PATH, post(whatsapp_webhook))
        .with_state(state)
}

/// Serve `state` on an already bound listener until the future is dropped. Used by tests.
pub async fn serve(listener: tokio::net::TcpListener, state: GatewayState) -> Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("gateway server exited")
}

/// Resolve secrets, build the Gemini and Twilio clients, and serve until SIGINT/SIGTERM.
/// Missing secrets stop startup before anything binds.
pub async fn run_gateway(config: Config, self_describe: bool) -> Result<()> {
    let secrets = config::resolve_secrets(&config)?;
    let public_url = config::resolve_public_url(&config);

    let signature = if config.channels.twilio.validate_signature {
        let base = public_url.as_deref().ok_or(ConfigError::PublicUrlRequired)?;
        Some(SignatureCheck {
            auth_token: secrets.twilio_auth_token.clone(),
            webhook_url: config::webhook_url(base),
        })
    } else {
        log::warn!(
            "twilio signature validation is disabled; anyone who can reach {} can trigger LLM calls",
            WEBHOOK_PATH
        );
        None
    };

    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) && signature.is_none() {
        log::warn!("gateway bound to non-loopback address {} without signature validation", bind);
    }

    let llm: Arc<dyn LlmBackend> = Arc::new(GeminiClient::from_config(
        &config.llm,
        secrets.google_api_key.clone(),
    ));
    let channel: Arc<dyn ChannelHandle> = Arc::new(TwilioChannel::new(
        secrets.twilio_account_sid.clone(),
        secrets.twilio_auth_token.clone(),
        secrets.twilio_phone_number.clone(),
        config.channels.twilio.api_base.clone(),
    ));
    log::info!(
        "gemini model {}, outbound channel {} from {}",
        llm.model(),
        channel.id(),
        secrets.twilio_phone_number
    );

    if self_describe || config.bootstrap.self_describe {
        bootstrap::run_at_startup(llm.as_ref()).await;
    }

    let state = GatewayState::new(&config, llm, channel, signature);

    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);
    match public_url {
        Some(ref url) => log::info!(
            "set the Twilio WhatsApp webhook to POST {}",
            config::webhook_url(url)
        ),
        None => log::warn!(
            "no public URL configured; expose port {} through a tunnel and point Twilio at <public-url>{}",
            config.gateway.port,
            WEBHOOK_PATH
        ),
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Completes on SIGINT or SIGTERM. In-flight requests drain; detached brief tasks are not awaited.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /whatsapp: verify the optional signature, answer with TwiML.
async fn whatsapp_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let params = match form {
        Ok(Form(params)) => params,
        Err(e) => {
            log::warn!("webhook: unreadable form body, treating as empty: {}", e);
            Vec::new()
        }
    };
    if let Some(ref check) = state.signature {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !channels::validate_signature(&check.auth_token, &check.webhook_url, &params, provided) {
            log::warn!("webhook: rejected request with invalid signature");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let inbound = InboundMessage::new(form_value(&params, "Body"), form_value(&params, "From"));
    let reply = match AssertUnwindSafe(build_reply(&state, inbound)).catch_unwind().await {
        Ok(text) => text,
        Err(_) => {
            log::error!("webhook: reply construction panicked");
            replies::GENERIC_APOLOGY.to_string()
        }
    };
    twiml(&reply)
}

/// Long messages go to the dispatcher behind the holding reply; everything else is answered inline.
async fn build_reply(state: &GatewayState, inbound: InboundMessage) -> String {
    let words = word_count(&inbound.body);
    let intent = classify(&inbound.body);
    if intent.is_deferred() {
        log::info!(
            "webhook: {} sent a full brief ({} words), dispatching with {} crew slot(s) free",
            inbound.sender_address,
            words,
            state.dispatcher.available_slots()
        );
        drop(state.dispatcher.spawn(inbound.body, inbound.sender_address));
        return replies::HOLDING.to_string();
    }
    log::info!(
        "webhook: {} sent {} word(s), intent {}",
        inbound.sender_address,
        words,
        intent
    );
    respond(intent, &inbound.body, state.llm.as_ref(), state.support_timeout).await
}

fn form_value<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn twiml(text: &str) -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        channels::message_response(text),
    )
        .into_response()
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_finds_first_match_or_empty() {
        let params = vec![
            ("From".to_string(), "whatsapp:+1".to_string()),
            ("Body".to_string(), " oi ".to_string()),
        ];
        assert_eq!(form_value(&params, "Body"), " oi ");
        assert_eq!(form_value(&params, "To"), "");
    }
}
