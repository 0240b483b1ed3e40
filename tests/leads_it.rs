mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use zoho_crm_broker::leads::LeadFormData;

const TOKEN_PATH: &str = "/oauth/v2/token";
const LEADS_PATH: &str = "/crm/v3/Leads";

async fn mock_token<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-leads\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await
}

fn form() -> LeadFormData {
	LeadFormData {
		full_name: Some("Dr. Jane Doe".into()),
		email: Some("jane@example.ca".into()),
		institution: Some("QEII Health Sciences Centre".into()),
		specialty: Some("Cardiology".into()),
		membership_type: Some("Professional".into()),
		..Default::default()
	}
}

#[tokio::test]
async fn created_lead_reports_record_identifiers() {
	let server = MockServer::start_async().await;
	let (client, _) = build_test_lead_client(test_config(&server.base_url()));
	let token = mock_token(&server).await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(LEADS_PATH)
				.header("authorization", "Zoho-oauthtoken access-leads");
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":[{\"code\":\"SUCCESS\",\"status\":\"success\",\"message\":\"record added\",\"details\":{\"id\":\"5725767000000524157\",\"Created_Time\":\"2025-03-01T10:00:00-05:00\"}}]}",
			);
		})
		.await;
	let submission = client.create_lead(&form()).await;

	token.assert_async().await;
	leads.assert_async().await;

	assert!(submission.success, "Unexpected failure: {:?}.", submission.error);
	assert_eq!(submission.record_id.as_deref(), Some("5725767000000524157"));
	assert_eq!(submission.created_time.as_deref(), Some("2025-03-01T10:00:00-05:00"));
}

#[tokio::test]
async fn missing_name_is_sent_as_unknown() {
	let server = MockServer::start_async().await;
	let (client, _) = build_test_lead_client(test_config(&server.base_url()));
	let _token = mock_token(&server).await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(LEADS_PATH)
				.header("authorization", "Zoho-oauthtoken access-leads")
				.body_includes("\"Last_Name\":\"Unknown\"")
				.body_includes("\"Email\":\"anon@example.ca\"")
				.body_includes("\"Lead_Source\":\"Website\"");
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":[{\"code\":\"SUCCESS\",\"status\":\"success\",\"message\":\"record added\",\"details\":{\"id\":\"5725767000000524158\"}}]}",
			);
		})
		.await;
	let submission = client
		.create_lead(&LeadFormData { email: Some("anon@example.ca".into()), ..Default::default() })
		.await;

	leads.assert_async().await;

	assert!(submission.success, "Unexpected failure: {:?}.", submission.error);
	assert_eq!(submission.record_id.as_deref(), Some("5725767000000524158"));
}

#[tokio::test]
async fn nested_record_failure_is_reported() {
	let server = MockServer::start_async().await;
	let (client, _) = build_test_lead_client(test_config(&server.base_url()));
	let _token = mock_token(&server).await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST).path(LEADS_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":[{\"code\":\"DUPLICATE_DATA\",\"status\":\"error\",\"message\":\"duplicate data\",\"details\":{}}]}",
			);
		})
		.await;
	let submission = client.create_lead(&LeadFormData::default()).await;

	leads.assert_async().await;

	assert!(!submission.success);
	assert!(submission.record_id.is_none());
	assert!(
		submission.error.as_deref().is_some_and(|message| message.contains("duplicate data")),
		"Unexpected error: {:?}.",
		submission.error
	);
}

#[tokio::test]
async fn rate_limit_reports_the_retry_hint() {
	let server = MockServer::start_async().await;
	let (client, coordinator) = build_test_lead_client(test_config(&server.base_url()));
	let _token = mock_token(&server).await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST).path(LEADS_PATH);
			then.status(429)
				.header("content-type", "application/json")
				.header("retry-after", "30")
				.body("{\"code\":\"TOO_MANY_REQUESTS\"}");
		})
		.await;
	let err = client.submit_lead(&form()).await.expect_err("429 must fail the submission.");

	leads.assert_async().await;

	match &err {
		Error::RateLimited { retry_after, .. } =>
			assert_eq!(*retry_after, Some(Duration::seconds(30))),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(err.to_string().contains("30"));
	assert!(coordinator.cached_token().is_some());
}

#[tokio::test]
async fn unauthorized_evicts_the_cached_token() {
	let server = MockServer::start_async().await;
	let (client, coordinator) = build_test_lead_client(test_config(&server.base_url()));
	let token = mock_token(&server).await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST).path(LEADS_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"code\":\"INVALID_TOKEN\",\"message\":\"invalid oauth token\"}");
		})
		.await;
	let err = client.submit_lead(&form()).await.expect_err("401 must fail the submission.");

	assert!(matches!(err, Error::AuthFailed { .. }));
	assert!(coordinator.cached_token().is_none());

	let submission = client.create_lead(&form()).await;

	assert!(!submission.success);

	token.assert_calls_async(2).await;
	leads.assert_calls_async(2).await;
}

#[tokio::test]
async fn refresh_failure_becomes_a_failed_submission() {
	let server = MockServer::start_async().await;
	let (client, _) = build_test_lead_client(test_config(&server.base_url()));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_code\"}");
		})
		.await;
	let leads = server
		.mock_async(|when, then| {
			when.method(POST).path(LEADS_PATH);
			then.status(201);
		})
		.await;
	let submission = client.create_lead(&form()).await;

	token.assert_async().await;
	leads.assert_calls_async(0).await;

	assert!(!submission.success);
	assert!(
		submission.error.as_deref().is_some_and(|message| message.contains("invalid_code")),
		"Unexpected error: {:?}.",
		submission.error
	);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
	let server = MockServer::start_async().await;
	let mut config = test_config(&server.base_url());

	config.client_secret = None;

	let (client, _) = build_test_lead_client(config);
	let token = mock_token(&server).await;
	let submission = client.create_lead(&form()).await;

	token.assert_calls_async(0).await;

	assert!(!submission.success);
	assert!(
		submission.error.as_deref().is_some_and(|message| message.contains("ZOHO_CLIENT_SECRET")),
		"Unexpected error: {:?}.",
		submission.error
	);
}
