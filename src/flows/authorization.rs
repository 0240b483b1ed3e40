//! One-time authorization setup used to mint the long-lived refresh token.
//!
//! An operator opens [`TokenCoordinator::authorization_url`] in a browser, consents, and hands the
//! returned `code` to [`TokenCoordinator::exchange_authorization_code`]. The resulting refresh
//! token is what `ZOHO_REFRESH_TOKEN` carries afterwards. Nothing here touches the token cache.

// self
use crate::{
	_prelude::*,
	config::CLIENT_ID_VAR,
	error::ConfigError,
	flows::TokenCoordinator,
	http::TokenHttpClient,
	oauth::{AuthorizationGrant, BasicFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> TokenCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the Zoho consent URL requesting offline access for the configured scopes.
	///
	/// Requires the client id and redirect URI. Scopes are comma-joined the way Zoho expects.
	pub fn authorization_url(&self, state: Option<&str>) -> Result<Url> {
		let client_id = self
			.config
			.client_id
			.as_deref()
			.ok_or(ConfigError::MissingCredential { name: CLIENT_ID_VAR })?;
		let redirect_uri = self.config.require_redirect_uri()?;
		let mut url = self.config.authorization_endpoint();

		{
			let mut pairs = url.query_pairs_mut();

			pairs
				.append_pair("scope", &self.config.scopes.join(","))
				.append_pair("client_id", client_id)
				.append_pair("response_type", "code")
				.append_pair("access_type", "offline")
				.append_pair("redirect_uri", redirect_uri.as_str())
				.append_pair("prompt", "consent");

			if let Some(state) = state {
				pairs.append_pair("state", state);
			}
		}

		Ok(url)
	}

	/// Exchanges an authorization `code` for an access token and, with offline access, a refresh
	/// token.
	pub async fn exchange_authorization_code(&self, code: &str) -> Result<AuthorizationGrant> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "exchange_authorization_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_code_inner(code)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		result
	}

	async fn exchange_code_inner(&self, code: &str) -> Result<AuthorizationGrant> {
		let credentials = self.config.client_credentials()?;
		let redirect_uri = self.config.require_redirect_uri()?;
		let facade = <BasicFacade<C, M>>::from_config(
			&self.config,
			credentials,
			&*self.http_client,
			&*self.transport_mapper,
		);

		facade
			.exchange_authorization_code(code.trim(), redirect_uri)
			.await
			.map_err(Error::AuthorizationFailed)
	}
}
