//! Webhook ingress for NovinHub events.
//!
//! POST /webhook takes the event envelope and routes by type; only
//! `leed_created` has side effects (the SMS dispatch path). Once the
//! envelope parses the endpoint always acks 200 - downstream failures are
//! logged, never surfaced, because the platform only cares that the
//! endpoint acknowledged.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{SecondsFormat, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::error::AppResult;
use crate::core::phone;
use crate::server::models::{
    AutoformPayload, CommentPayload, EventKind, HealthResponse, LeadPayload, MessagePayload, WebhookEvent,
    WebhookResponse,
};
use crate::sms::{DedupCache, SmsDispatcher};

/// Shared state for the webhook server.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SmsDispatcher>,
    pub dedup: DedupCache,
}

/// Builds the HTTP router. Split out from [`start_server`] so integration
/// tests can drive it without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds and serves the webhook endpoint until the process exits.
pub async fn start_server(addr: SocketAddr, state: AppState) -> AppResult<()> {
    log::info!("Starting webhook server on http://{}", addr);
    log::info!("  POST /webhook - NovinHub event ingress");
    log::info!("  GET  /health  - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// POST /webhook
async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> Response {
    log::info!("Raw webhook request received ({} bytes)", body.len());

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            log::error!("Failed to decode webhook payload: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::error("Invalid JSON payload")),
            )
                .into_response();
        }
    };

    log::info!(
        "Webhook event received (type={}, user_id={})",
        event.event_type,
        event.user_id
    );

    match event.kind() {
        EventKind::MessageCreated => handle_message_created(&event),
        EventKind::CommentCreated => handle_comment_created(&event),
        EventKind::AutoformCompleted => handle_autoform_completed(&event),
        EventKind::LeadCreated => handle_lead_created(&state, &event).await,
        EventKind::Revalidate => {
            log::info!("Processing revalidate event (user_id={})", event.user_id);
        }
        EventKind::Unknown(t) => {
            log::warn!("Unknown event type received: {}", t);
        }
    }

    // Downstream outcomes are not the caller's problem; ack once parsed.
    (StatusCode::OK, Json(WebhookResponse::success())).into_response()
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// `message_created`: observability only. Phones found in the text are
/// logged but never dispatched here - the lead event covers that, and
/// dispatching both would duplicate sends.
fn handle_message_created(event: &WebhookEvent) {
    log::info!("Processing message_created event (user_id={})", event.user_id);

    let message: MessagePayload = match event.parse_payload() {
        Ok(m) => m,
        Err(e) => {
            log::error!("Failed to parse message payload: {}", e);
            return;
        }
    };

    log::info!("Message details (message_id={}, text={})", message.id, message.text);

    if !message.text.is_empty() {
        let phones = phone::extract_phones(&message.text);
        for p in &phones {
            log::info!(
                "💡 Phone detected in direct message - awaiting lead event (phone={}, user_id={}, message_id={})",
                p,
                event.user_id,
                message.id
            );
        }
    }
}

/// `comment_created`: observability only.
fn handle_comment_created(event: &WebhookEvent) {
    log::info!("Processing comment_created event (user_id={})", event.user_id);

    match event.parse_payload::<CommentPayload>() {
        Ok(comment) => {
            log::info!("Comment details (comment_id={}, content={})", comment.id, comment.content);
        }
        Err(e) => log::error!("Failed to parse comment payload: {}", e),
    }
}

/// `autoform_completed`: observability only.
fn handle_autoform_completed(event: &WebhookEvent) {
    log::info!("Processing autoform_completed event (user_id={})", event.user_id);

    match event.parse_payload::<AutoformPayload>() {
        Ok(form) => log::info!("Form response details (form_id={})", form.id),
        Err(e) => log::error!("Failed to parse form response payload: {}", e),
    }
}

/// `leed_created`: the SMS path. Valid number leads go through the dedup
/// gate, then dispatch, then `mark_sent` on success.
async fn handle_lead_created(state: &AppState, event: &WebhookEvent) {
    log::info!("Processing leed_created event (user_id={})", event.user_id);

    let lead: LeadPayload = match event.parse_payload() {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to parse lead payload: {}", e);
            return;
        }
    };

    log::info!(
        "Lead details (lead_id={}, type={}, value={}, message_id={})",
        lead.id,
        lead.lead_type,
        lead.value,
        lead.message_id
    );

    if lead.lead_type != "number" || lead.value.is_empty() {
        return;
    }

    if !phone::is_valid(&lead.value) {
        log::warn!("Invalid phone number in lead (phone={}, lead_id={})", lead.value, lead.id);
        return;
    }

    log::info!(
        "🎯 Lead with valid phone number detected (phone={}, lead_id={}, user_id={})",
        lead.value,
        lead.id,
        event.user_id
    );

    if !state.dedup.should_send(&lead.value, &event.user_id).await {
        log::info!(
            "⏭️ SMS skipped - already sent today (phone={}, lead_id={})",
            lead.value,
            lead.id
        );
        return;
    }

    match state.dispatcher.send_pattern_sms(&lead.value, &event.user_id).await {
        Ok(_) => {
            state.dedup.mark_sent(&lead.value, &event.user_id).await;
            log::info!(
                "✅ SMS processing completed for lead (phone={}, lead_id={})",
                lead.value,
                lead.id
            );
        }
        Err(e) => {
            log::error!(
                "Failed to send SMS for lead (error={}, phone={}, lead_id={})",
                e,
                lead.value,
                lead.id
            );
        }
    }
}
