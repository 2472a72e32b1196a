use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha1::Sha1;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::TurnRequest;
use crate::services::dialog::{self, APOLOGY};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// `signature` is base64(HMAC-SHA1(secret, body)).
pub fn validate_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };
    let mut mac = match Hmac::<Sha1>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub async fn fulfillment_hook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.config.webhook_secret.is_empty() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing webhook signature");
            return AppError::Forbidden("missing signature".to_string()).into_response();
        }
        if !validate_signature(&state.config.webhook_secret, signature, &body) {
            tracing::warn!("invalid webhook signature");
            return AppError::Forbidden("invalid signature".to_string()).into_response();
        }
    }

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "turn body is not JSON");
            return close_with_apology(json!({}));
        }
    };
    let incoming_intent = raw
        .pointer("/sessionState/intent")
        .cloned()
        .unwrap_or_else(|| json!({}));

    let request: TurnRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "malformed turn");
            return close_with_apology(incoming_intent);
        }
    };

    let turn_id = Uuid::new_v4();
    let session = request.session_id.clone().unwrap_or_default();
    let span = tracing::info_span!("turn", %turn_id, session = %session);

    let result = span.in_scope(|| {
        tracing::info!(
            source = ?request.invocation_source,
            confirmation = ?request.session_state.intent.confirmation_state,
            "processing turn"
        );
        dialog::handle_turn(state.store.as_ref(), request)
    });

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!(error = %e, %turn_id, session = %session, "turn failed");
            close_with_apology(incoming_intent)
        }
    }
}

/// Ends the dialog, handing the caller's intent back untouched.
fn close_with_apology(intent: Value) -> Response {
    Json(json!({
        "sessionState": {
            "dialogAction": { "type": "Close" },
            "intent": intent,
        },
        "messages": [{ "contentType": "PlainText", "content": APOLOGY }],
    }))
    .into_response()
}
