use super::RelayState;
use super::types::{GenerateRequest, RelayFailure, RelayReply};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// `POST <relay-path>`: liveness ping or forwarded generation request.
pub async fn relay(State(state): State<RelayState>, body: Bytes) -> Result<Response, RelayFailure> {
    let Some(credential) = state.credential.as_deref() else {
        tracing::error!("rejecting relay request: no provider credential configured");
        return Err(RelayFailure::missing_credential());
    };

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| RelayFailure::bad_request(format!("request body is not valid JSON: {}", e)))?;

    if payload.get("ping").and_then(Value::as_bool) == Some(true) {
        tracing::debug!("relay ping answered");
        return Ok(Json(json!({ "status": "ok" })).into_response());
    }

    let request: GenerateRequest = serde_json::from_value(payload)
        .map_err(|e| RelayFailure::bad_request(format!("invalid generation request: {}", e)))?;
    request.validate().map_err(RelayFailure::bad_request)?;

    tracing::info!(
        provider = state.provider.name(),
        model = %request.model,
        turns = request.contents.len(),
        tools = request.tools.as_ref().map_or(0, Vec::len),
        "relaying generation request"
    );

    let response = state
        .provider
        .generate_content(
            &request.model,
            &request.to_provider_request(),
            credential.secret(),
        )
        .await
        .and_then(RelayReply::from_provider)
        .map_err(|e| {
            let message = credential.redact(&e.to_string());
            tracing::warn!(error = %message, "provider request failed");
            RelayFailure::provider(message)
        })?;

    tracing::debug!(
        function_calls = response.function_calls.len(),
        has_text = response.text.is_some(),
        "relay reply normalized"
    );

    Ok(Json(response).into_response())
}

/// `GET /health`: process liveness only; says nothing about the credential.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
