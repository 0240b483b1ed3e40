//! Lead submission to the Zoho CRM `Leads` module.
//!
//! [`LeadClient::submit_lead`] asks the shared [`TokenCoordinator`] for an access token, maps the
//! form onto a [`LeadRecord`], and performs exactly one create call. A 401 evicts the rejected
//! token so the next submission refreshes. [`LeadClient::create_lead`] flattens the outcome into
//! the `{ success, recordId, createdTime, error }` shape returned to the browser.

pub mod form;
pub mod mapping;
pub mod response;

pub use form::*;
pub use mapping::*;
pub use response::CreatedLead;

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::TransportError,
	flows::TokenCoordinator,
	http::{ReqwestHttpClient, TokenHttpClient, parse_retry_after},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Uniform result handed back to the membership site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
	/// Whether the lead was created.
	pub success: bool,
	/// CRM record id on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub record_id: Option<String>,
	/// CRM creation timestamp on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub created_time: Option<String>,
	/// Failure message otherwise.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
impl From<Result<CreatedLead>> for LeadSubmission {
	fn from(result: Result<CreatedLead>) -> Self {
		match result {
			Ok(lead) => Self {
				success: true,
				record_id: Some(lead.record_id),
				created_time: lead.created_time,
				error: None,
			},
			Err(err) => Self {
				success: false,
				record_id: None,
				created_time: None,
				error: Some(err.to_string()),
			},
		}
	}
}

#[derive(Serialize)]
struct CreateLeadRequest<'a> {
	data: [&'a LeadRecord; 1],
	trigger: &'a [String],
}

/// Client for the CRM lead-create endpoint.
pub struct LeadClient<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	coordinator: Arc<TokenCoordinator<C, M>>,
	http_client: ReqwestHttpClient,
	lead_source: String,
	triggers: Vec<String>,
}
impl<C, M> LeadClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// `Lead_Source` value written when none is configured.
	pub const DEFAULT_LEAD_SOURCE: &str = "Website";
	/// Workflow trigger requested when none is configured.
	pub const DEFAULT_TRIGGER: &str = "workflow";

	/// Creates a client with its own reqwest transport for CRM calls.
	pub fn new(coordinator: Arc<TokenCoordinator<C, M>>) -> Self {
		Self::with_http_client(coordinator, ReqwestHttpClient::default())
	}

	/// Creates a client that sends CRM calls through `http_client`.
	pub fn with_http_client(
		coordinator: Arc<TokenCoordinator<C, M>>,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self {
			coordinator,
			http_client,
			lead_source: Self::DEFAULT_LEAD_SOURCE.into(),
			triggers: vec![Self::DEFAULT_TRIGGER.into()],
		}
	}

	/// Overrides the `Lead_Source` value.
	pub fn with_lead_source(mut self, lead_source: impl Into<String>) -> Self {
		self.lead_source = lead_source.into();

		self
	}

	/// Replaces the workflow triggers sent with each record; an empty list disables them.
	pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.triggers = triggers.into_iter().map(Into::into).collect();

		self
	}

	/// Coordinator supplying access tokens.
	pub fn coordinator(&self) -> &Arc<TokenCoordinator<C, M>> {
		&self.coordinator
	}

	/// Submits `form` and flattens the outcome; never fails.
	pub async fn create_lead(&self, form: &LeadFormData) -> LeadSubmission {
		self.submit_lead(form).await.into()
	}

	/// Submits `form` as one new lead.
	pub async fn submit_lead(&self, form: &LeadFormData) -> Result<CreatedLead> {
		const KIND: FlowKind = FlowKind::LeadCreate;

		let span = FlowSpan::new(KIND, "submit_lead");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.submit_inner(form)).await;

		match &result {
			Ok(lead) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				#[cfg(feature = "tracing")]
				{
					tracing::info!(record_id = %lead.record_id, "Zoho lead created.");
				}
				#[cfg(not(feature = "tracing"))]
				{
					let _ = lead;
				}
			},
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		result
	}

	async fn submit_inner(&self, form: &LeadFormData) -> Result<CreatedLead> {
		let token = self.coordinator.get_valid_access_token().await?;
		let record = LeadRecord::from_form(form, &self.lead_source);
		let payload = CreateLeadRequest { data: [&record], trigger: &self.triggers };
		let reply = self
			.http_client
			.post(self.coordinator.config.leads_endpoint())
			.header(AUTHORIZATION, authorization_header(&token))
			.json(&payload)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = reply.status().as_u16();
		let retry_after = parse_retry_after(reply.headers());
		let body = reply.bytes().await.map_err(TransportError::from)?;
		let result = response::interpret(status, retry_after, &body);

		if matches!(result, Err(Error::AuthFailed { .. })) {
			self.coordinator.invalidate(&token);
		}

		result
	}
}
impl<C, M> Debug for LeadClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LeadClient")
			.field("coordinator", &self.coordinator)
			.field("lead_source", &self.lead_source)
			.field("triggers", &self.triggers)
			.finish()
	}
}

/// Formats the CRM `Authorization` header value.
pub fn authorization_header(token: &TokenSecret) -> String {
	format!("Zoho-oauthtoken {}", token.expose())
}
