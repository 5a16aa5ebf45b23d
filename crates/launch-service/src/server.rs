//! HTTP server for the guard API.
//!
//! Read-only views over guard state plus token issuance when an authorizer
//! is configured.

use crate::apis;
use axum::{
	routing::{get, post},
	Json, Router,
};
use launch_account::AuthorizerService;
use launch_config::ApiConfig;
use launch_guard::AuthorizationVerifier;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub guard: Arc<AuthorizationVerifier>,
	/// Token issuer; issuance endpoints answer 503 without one.
	pub authorizer: Option<Arc<AuthorizerService>>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.nest(
			"/api",
			Router::new()
				.route("/signers/{address}", get(apis::signers::get_signer))
				.route("/markets/{id}/config", get(apis::markets::get_config))
				.route(
					"/markets/{id}/remaining/{account}",
					get(apis::markets::get_remaining),
				)
				.route(
					"/authorizations",
					post(apis::authorizations::issue_authorization),
				),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Guard API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, U256};
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use launch_account::implementations::local::LocalAuthorizer;
	use launch_config::Config;
	use launch_guard::{GuardBuilder, GuardFactories};
	use launch_storage::implementations::memory;
	use launch_types::{
		authorization_digest, AuthorizationToken, CapConfigResponse, ErrorResponse,
		ImplementationRegistry, IssueAuthorizationResponse, RemainingCapResponse,
		TrustedSignerResponse,
	};
	use std::collections::HashMap;
	use std::time::Duration;
	use tower::ServiceExt;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const MARKET: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

	async fn state(with_authorizer: bool) -> AppState {
		let config: Config = r#"
[guard]
id = "api-test"
address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
engine = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
admin = "0xadadadadadadadadadadadadadadadadadadadad"
trusted_signers = ["0x3333333333333333333333333333333333333333"]

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();

		let guard = GuardBuilder::new(config)
			.build(GuardFactories {
				storage_factories: HashMap::from([(
					memory::Registry::NAME.to_string(),
					memory::Registry::factory(),
				)]),
			})
			.await
			.unwrap();

		let authorizer = with_authorizer.then(|| {
			Arc::new(AuthorizerService::new(
				Box::new(LocalAuthorizer::from_private_key(KEY).unwrap()),
				Duration::from_secs(300),
			))
		});

		AppState {
			guard: Arc::new(guard),
			authorizer,
		}
	}

	async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
		let response = app
			.oneshot(Request::get(uri).body(Body::empty()).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&body).unwrap())
	}

	async fn post_json<T: serde::de::DeserializeOwned>(
		app: Router,
		uri: &str,
		body: serde_json::Value,
	) -> (StatusCode, T) {
		let request = Request::post(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap();
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&body).unwrap())
	}

	#[tokio::test]
	async fn test_health() {
		let (status, body): (_, serde_json::Value) =
			get_json(router(state(false).await), "/health").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
	}

	#[tokio::test]
	async fn test_signer_lookup() {
		let app = router(state(false).await);
		let (status, body): (_, TrustedSignerResponse) = get_json(
			app.clone(),
			"/api/signers/0x3333333333333333333333333333333333333333",
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.trusted);

		let (_, body): (_, TrustedSignerResponse) = get_json(
			app.clone(),
			"/api/signers/0x4444444444444444444444444444444444444444",
		)
		.await;
		assert!(!body.trusted);

		let (status, body): (_, ErrorResponse) = get_json(app, "/api/signers/nope").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body.error, "INVALID_ADDRESS");
	}

	#[tokio::test]
	async fn test_unknown_market_views() {
		let app = router(state(false).await);
		let (status, body): (_, CapConfigResponse) =
			get_json(app.clone(), &format!("/api/markets/{}/config", MARKET)).await;
		assert_eq!(status, StatusCode::OK);
		assert!(!body.enabled);
		assert!(body.signature_required);
		assert_eq!(body.market_signer, None);

		let (status, body): (_, RemainingCapResponse) = get_json(
			app.clone(),
			&format!(
				"/api/markets/{}/remaining/0x4444444444444444444444444444444444444444",
				MARKET
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(!body.has_cap);
		assert_eq!(body.remaining, U256::ZERO);

		let (status, _): (_, ErrorResponse) =
			get_json(app, "/api/markets/0x12/config").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_issue_authorization() {
		let app = router(state(true).await);
		let origin = Address::repeat_byte(0x42);
		let (status, body): (_, IssueAuthorizationResponse) = post_json(
			app.clone(),
			"/api/authorizations",
			serde_json::json!({ "origin": origin, "deadline": 4_000_000_000u64 }),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body.deadline, U256::from(4_000_000_000u64));
		assert_eq!(
			body.fingerprint,
			authorization_digest(origin, U256::from(4_000_000_000u64))
		);
		let token = AuthorizationToken::from_hook_data(&body.hook_data).unwrap();
		assert_eq!(token.signature, body.signature);

		let (status, body): (_, ErrorResponse) = post_json(
			app,
			"/api/authorizations",
			serde_json::json!({ "origin": origin, "deadline": 1u64 }),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body.error, "INVALID_DEADLINE");
	}

	#[tokio::test]
	async fn test_issue_without_authorizer() {
		let (status, body): (_, ErrorResponse) = post_json(
			router(state(false).await),
			"/api/authorizations",
			serde_json::json!({ "origin": Address::repeat_byte(1) }),
		)
		.await;
		assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
		assert_eq!(body.error, "AUTHORIZER_NOT_CONFIGURED");
	}
}
