//! Token issuance for trades against signature-gated markets.

use crate::server::AppState;
use axum::{extract::State, Json};
use launch_account::AuthorizerError;
use launch_types::{APIError, IssueAuthorizationRequest, IssueAuthorizationResponse};
use std::time::{SystemTime, UNIX_EPOCH};

/// Handles POST /api/authorizations.
pub async fn issue_authorization(
	State(state): State<AppState>,
	Json(request): Json<IssueAuthorizationRequest>,
) -> Result<Json<IssueAuthorizationResponse>, APIError> {
	let Some(authorizer) = &state.authorizer else {
		return Err(APIError::ServiceUnavailable {
			error_type: "AUTHORIZER_NOT_CONFIGURED".to_string(),
			message: "this node does not issue authorizations".to_string(),
		});
	};

	let now = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|e| APIError::internal(e.to_string()))?
		.as_secs();

	let issued = authorizer
		.issue_at(request.origin, now, request.deadline)
		.await
		.map_err(|e| match e {
			AuthorizerError::DeadlineInPast { .. } => {
				APIError::bad_request("INVALID_DEADLINE", e.to_string())
			},
			other => {
				tracing::warn!(error = %other, "Authorization issuance failed");
				APIError::internal(other.to_string())
			},
		})?;

	tracing::info!(origin = %issued.origin, deadline = %issued.token.deadline, "Issued authorization");
	Ok(Json(IssueAuthorizationResponse {
		origin: issued.origin,
		deadline: issued.token.deadline,
		signature: issued.token.signature.clone(),
		fingerprint: issued.fingerprint,
		hook_data: issued.hook_data(request.referrer),
	}))
}
