//! Submits one membership lead against a mock Zoho deployment: the coordinator refreshes the
//! access token once, and the lead client posts the mapped record.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use zoho_crm_broker::{
	config::ZohoConfig,
	flows::ReqwestCoordinator,
	leads::{LeadClient, LeadFormData},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let leads_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/crm/v3/Leads");
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":[{\"code\":\"SUCCESS\",\"status\":\"success\",\"message\":\"record added\",\"details\":{\"id\":\"5725767000000524157\",\"Created_Time\":\"2025-03-01T10:00:00-05:00\"}}]}",
			);
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let config = ZohoConfig::new(base.clone(), base)
		.with_client_id("1000.demo-client")
		.with_client_secret("demo-secret")
		.with_refresh_token("1000.demo-refresh");
	let coordinator = Arc::new(ReqwestCoordinator::new(config));
	let client = LeadClient::new(coordinator.clone()).with_lead_source("Membership Form");
	let form = LeadFormData {
		full_name: Some("Dr. Jane Doe".into()),
		email: Some("jane@example.ca".into()),
		province: Some("NS".into()),
		specialty: Some("Cardiology".into()),
		amyloidosis_type: Some("ATTR".into()),
		membership_type: Some("Professional".into()),
		privacy_consent: Some("true".into()),
		..Default::default()
	};
	let submission = client.create_lead(&form).await;

	println!("Submission result: {}.", serde_json::to_string(&submission)?);
	println!("Token refreshes: {}.", coordinator.refresh_metrics.attempts());

	token_mock.assert_async().await;
	leads_mock.assert_async().await;

	Ok(())
}
