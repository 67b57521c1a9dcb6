use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::middleware::CredentialQuery;
use crate::types::credential::CredentialResponse;
use crate::{KeygateError, router::KeygateState};

/// GET /credentials?deviceId=..&credentialType=..
pub async fn credentials_handler(
    State(state): State<KeygateState>,
    CredentialQuery(request): CredentialQuery,
) -> Result<Json<CredentialResponse>, KeygateError> {
    let body = state.query.handle(request).await?;
    Ok(Json(body))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
