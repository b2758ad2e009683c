//! Integration test: the Gemini and Twilio clients against local stand-in servers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Form, Json, Router,
};
use lib::channels::{ChannelHandle, TwilioChannel, MAX_BODY_CHARS};
use lib::llm::{ChatMessage, GeminiClient, LlmBackend, LlmError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://127.0.0.1:{}", port)
}

async fn fake_generate(
    State(seen): State<Seen>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    seen.lock()
        .unwrap()
        .push(json!({ "target": target, "key": key, "body": body }));
    if key != "good-key" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "API key not valid" } })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Plano " }, { "text": "pronto" }] } }
            ]
        })),
    )
}

#[tokio::test]
async fn gemini_client_posts_generate_content() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1beta/models/:target", post(fake_generate))
        .with_state(seen.clone());
    let base = spawn_app(app).await;

    let client = GeminiClient::new(Some(base), "gemini-2.0-flash", 0.7, "good-key");
    let text = client
        .chat(vec![
            ChatMessage::system("Você é um pesquisador"),
            ChatMessage::user("pesquise"),
        ])
        .await
        .expect("generateContent");
    assert_eq!(text, "Plano pronto");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["target"], "gemini-2.0-flash:generateContent");
    assert_eq!(seen[0]["key"], "good-key");
    assert_eq!(
        seen[0]["body"]["systemInstruction"]["parts"][0]["text"],
        "Você é um pesquisador"
    );
    assert_eq!(seen[0]["body"]["contents"][0]["role"], "user");
}

#[tokio::test]
async fn gemini_client_reports_api_errors() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1beta/models/:target", post(fake_generate))
        .with_state(seen);
    let base = spawn_app(app).await;

    let client = GeminiClient::new(Some(base), "gemini-2.0-flash", 0.7, "bad-key");
    let err = client
        .chat(vec![ChatMessage::user("oi")])
        .await
        .unwrap_err();
    match err {
        LlmError::Api(msg) => assert!(msg.contains("403")),
        other => panic!("unexpected error: {other}"),
    }
}

async fn fake_messages(
    State(seen): State<Seen>,
    Path(sid): Path<String>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let fields: serde_json::Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    seen.lock()
        .unwrap()
        .push(json!({ "sid": sid, "auth": auth, "fields": fields }));
    if sid == "ACdenied" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 20003, "message": "Authenticate", "status": 401 })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({ "sid": "SM123", "status": "queued" })),
    )
}

fn twilio_app(seen: Seen) -> Router {
    Router::new()
        .route("/2010-04-01/Accounts/:sid/Messages.json", post(fake_messages))
        .with_state(seen)
}

#[tokio::test]
async fn twilio_channel_sends_form_with_basic_auth() {
    let seen: Seen = Arc::default();
    let base = spawn_app(twilio_app(seen.clone())).await;

    let channel = TwilioChannel::new("AC123", "secret", "whatsapp:+14155238886", Some(base));
    channel
        .send_message("whatsapp:+5511999999999", "Seu plano está pronto")
        .await
        .expect("send");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["sid"], "AC123");
    assert!(seen[0]["auth"].as_str().unwrap().starts_with("Basic "));
    assert_eq!(seen[0]["fields"]["From"], "whatsapp:+14155238886");
    assert_eq!(seen[0]["fields"]["To"], "whatsapp:+5511999999999");
    assert_eq!(seen[0]["fields"]["Body"], "Seu plano está pronto");
}

#[tokio::test]
async fn twilio_channel_truncates_long_bodies() {
    let seen: Seen = Arc::default();
    let base = spawn_app(twilio_app(seen.clone())).await;

    let channel = TwilioChannel::new("AC123", "secret", "whatsapp:+1", Some(base));
    let long = "a".repeat(MAX_BODY_CHARS * 2);
    ChannelHandle::send_message(&channel, "whatsapp:+2", &long)
        .await
        .expect("send");

    let seen = seen.lock().unwrap();
    let body = seen[0]["fields"]["Body"].as_str().unwrap();
    assert_eq!(body.chars().count(), MAX_BODY_CHARS);
}

#[tokio::test]
async fn twilio_channel_surfaces_api_error_once() {
    let seen: Seen = Arc::default();
    let base = spawn_app(twilio_app(seen.clone())).await;

    let channel = TwilioChannel::new("ACdenied", "wrong", "whatsapp:+1", Some(base));
    let err = channel
        .send_message("whatsapp:+2", "oi")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Authenticate"), "{}", msg);
    assert!(msg.contains("20003"), "{}", msg);
    assert_eq!(seen.lock().unwrap().len(), 1);
}
