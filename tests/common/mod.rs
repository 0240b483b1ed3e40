//! Shared fixtures for the integration suites: re-exports plus builders wired to an `httpmock`
//! server.

#![allow(dead_code)]

pub use std::sync::Arc;

pub use time::{Duration, OffsetDateTime};
pub use zoho_crm_broker::{error::Error, url::Url};

// self
use zoho_crm_broker::{
	config::ZohoConfig,
	flows::ReqwestCoordinator,
	http::ReqwestHttpClient,
	leads::LeadClient,
	oauth::ReqwestTransportErrorMapper,
	reqwest::Client,
};

/// Client identifier used by test fixtures.
pub const TEST_CLIENT_ID: &str = "1000.test-client";
/// Client secret used by test fixtures.
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
/// Refresh token used by test fixtures.
pub const TEST_REFRESH_TOKEN: &str = "1000.test-refresh-token";

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Builds a fully credentialed configuration whose API and accounts domains both point at
/// `base_url`.
pub fn test_config(base_url: &str) -> ZohoConfig {
	let base = Url::parse(base_url).expect("Mock server URL should parse successfully.");

	ZohoConfig::new(base.clone(), base)
		.with_client_id(TEST_CLIENT_ID)
		.with_client_secret(TEST_CLIENT_SECRET)
		.with_refresh_token(TEST_REFRESH_TOKEN)
}

/// Constructs a [`ReqwestCoordinator`] using the insecure test transport.
pub fn build_test_coordinator(config: ZohoConfig) -> ReqwestCoordinator {
	ReqwestCoordinator::with_http_client(
		config,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

/// Constructs a [`LeadClient`] sharing a fresh coordinator built from `config`.
pub fn build_test_lead_client(config: ZohoConfig) -> (LeadClient, Arc<ReqwestCoordinator>) {
	let coordinator = Arc::new(build_test_coordinator(config));
	let client = LeadClient::with_http_client(coordinator.clone(), test_reqwest_http_client());

	(client, coordinator)
}
