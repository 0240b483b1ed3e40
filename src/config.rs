//! Environment-driven Zoho configuration.
//!
//! Credentials are optional at load time: a missing client id, client secret, or refresh token is
//! only reported when an operation that needs it runs, so a misconfigured deployment still boots
//! and fails per request instead of at startup.

// std
use std::env;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the OAuth client identifier.
pub const CLIENT_ID_VAR: &str = "ZOHO_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "ZOHO_CLIENT_SECRET";
/// Environment variable holding the long-lived refresh token.
pub const REFRESH_TOKEN_VAR: &str = "ZOHO_REFRESH_TOKEN";
/// Environment variable overriding the CRM API domain.
pub const API_DOMAIN_VAR: &str = "ZOHO_API_DOMAIN";
/// Environment variable overriding the accounts (OAuth) domain.
pub const ACCOUNTS_DOMAIN_VAR: &str = "ZOHO_ACCOUNTS_DOMAIN";
/// Environment variable holding the redirect URI registered for the setup flow.
pub const REDIRECT_URI_VAR: &str = "ZOHO_REDIRECT_URI";
/// Environment variable holding comma-separated OAuth scopes for the setup flow.
pub const SCOPES_VAR: &str = "ZOHO_SCOPES";

/// Zoho endpoints and credentials used by the coordinator and the lead client.
#[derive(Clone)]
pub struct ZohoConfig {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<TokenSecret>,
	/// Long-lived refresh token exchanged for access tokens.
	pub refresh_token: Option<TokenSecret>,
	/// Base URL of the CRM REST API.
	pub api_domain: Url,
	/// Base URL of the Zoho accounts server hosting the OAuth endpoints.
	pub accounts_domain: Url,
	/// Redirect URI registered with Zoho, used only by the authorization setup flow.
	pub redirect_uri: Option<Url>,
	/// Scopes requested by the authorization setup flow.
	pub scopes: Vec<String>,
}
impl ZohoConfig {
	/// Default CRM API domain (US data centre).
	pub const DEFAULT_API_DOMAIN: &str = "https://www.zohoapis.com";
	/// Default accounts domain (US data centre).
	pub const DEFAULT_ACCOUNTS_DOMAIN: &str = "https://accounts.zoho.com";
	/// Scope requested when none is configured.
	pub const DEFAULT_SCOPE: &str = "ZohoCRM.modules.leads.CREATE";

	/// Creates a configuration without credentials for the provided domains.
	pub fn new(api_domain: Url, accounts_domain: Url) -> Self {
		Self {
			client_id: None,
			client_secret: None,
			refresh_token: None,
			api_domain,
			accounts_domain,
			redirect_uri: None,
			scopes: vec![Self::DEFAULT_SCOPE.into()],
		}
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps variable names to values.
	///
	/// Blank values are treated as unset. Only malformed URL overrides fail here; missing
	/// credentials surface on first use.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let api_domain = match read(API_DOMAIN_VAR) {
			Some(raw) => parse_http_url(API_DOMAIN_VAR, &raw)?,
			None => default_url(API_DOMAIN_VAR, Self::DEFAULT_API_DOMAIN)?,
		};
		let accounts_domain = match read(ACCOUNTS_DOMAIN_VAR) {
			Some(raw) => parse_http_url(ACCOUNTS_DOMAIN_VAR, &raw)?,
			None => default_url(ACCOUNTS_DOMAIN_VAR, Self::DEFAULT_ACCOUNTS_DOMAIN)?,
		};
		let mut config = Self::new(api_domain, accounts_domain);

		config.client_id = read(CLIENT_ID_VAR);
		config.client_secret = read(CLIENT_SECRET_VAR).map(TokenSecret::from);
		config.refresh_token = read(REFRESH_TOKEN_VAR).map(TokenSecret::from);
		config.redirect_uri =
			read(REDIRECT_URI_VAR).map(|raw| parse_http_url(REDIRECT_URI_VAR, &raw)).transpose()?;

		if let Some(raw) = read(SCOPES_VAR) {
			let scopes = split_scopes(&raw);

			if !scopes.is_empty() {
				config.scopes = scopes;
			}
		}

		for (name, present) in [
			(CLIENT_ID_VAR, config.client_id.is_some()),
			(CLIENT_SECRET_VAR, config.client_secret.is_some()),
			(REFRESH_TOKEN_VAR, config.refresh_token.is_some()),
		] {
			if !present {
				#[cfg(feature = "tracing")]
				{
					tracing::warn!(var = name, "Zoho credential is not configured.");
				}
				#[cfg(not(feature = "tracing"))]
				{
					let _ = name;
				}
			}
		}

		Ok(config)
	}

	/// Sets the OAuth client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn with_client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the long-lived refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets the redirect URI used by the authorization setup flow.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Replaces the scopes requested by the authorization setup flow.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// OAuth token endpoint (`{accounts}/oauth/v2/token`).
	pub fn token_endpoint(&self) -> Url {
		join_path(&self.accounts_domain, "oauth/v2/token")
	}

	/// OAuth authorization endpoint (`{accounts}/oauth/v2/auth`).
	pub fn authorization_endpoint(&self) -> Url {
		join_path(&self.accounts_domain, "oauth/v2/auth")
	}

	/// Lead creation endpoint (`{api}/crm/v3/Leads`).
	pub fn leads_endpoint(&self) -> Url {
		join_path(&self.api_domain, "crm/v3/Leads")
	}

	/// Client credentials, failing when either half is missing.
	pub fn client_credentials(&self) -> Result<ClientCredentials<'_>, ConfigError> {
		let client_id = self
			.client_id
			.as_deref()
			.ok_or(ConfigError::MissingCredential { name: CLIENT_ID_VAR })?;
		let client_secret = self
			.client_secret
			.as_ref()
			.ok_or(ConfigError::MissingCredential { name: CLIENT_SECRET_VAR })?;

		Ok(ClientCredentials { client_id, client_secret })
	}

	/// Client credentials plus the refresh token required by every refresh.
	pub fn refresh_credentials(&self) -> Result<RefreshCredentials<'_>, ConfigError> {
		let client = self.client_credentials()?;
		let refresh_token = self
			.refresh_token
			.as_ref()
			.ok_or(ConfigError::MissingCredential { name: REFRESH_TOKEN_VAR })?;

		Ok(RefreshCredentials { client, refresh_token })
	}

	/// Redirect URI required by the setup flow.
	pub fn require_redirect_uri(&self) -> Result<&Url, ConfigError> {
		self.redirect_uri.as_ref().ok_or(ConfigError::MissingRedirectUri { name: REDIRECT_URI_VAR })
	}
}
impl Debug for ZohoConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ZohoConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("api_domain", &self.api_domain.as_str())
			.field("accounts_domain", &self.accounts_domain.as_str())
			.field("redirect_uri", &self.redirect_uri.as_ref().map(Url::as_str))
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// Borrowed client id + secret pair.
#[derive(Clone, Copy, Debug)]
pub struct ClientCredentials<'a> {
	/// OAuth client identifier.
	pub client_id: &'a str,
	/// OAuth client secret.
	pub client_secret: &'a TokenSecret,
}

/// Borrowed credentials needed by a `grant_type=refresh_token` call.
#[derive(Clone, Copy, Debug)]
pub struct RefreshCredentials<'a> {
	/// Client id + secret pair.
	pub client: ClientCredentials<'a>,
	/// Long-lived refresh token.
	pub refresh_token: &'a TokenSecret,
}

fn default_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(var = name, default = raw, "Using default Zoho domain.");
	}

	parse_http_url(name, raw)
}

fn parse_http_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		scheme => Err(ConfigError::UnsupportedScheme { name, scheme: scheme.to_owned() }),
	}
}

fn split_scopes(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|scope| !scope.is_empty()).map(str::to_owned).collect()
}

fn join_path(base: &Url, suffix: &str) -> Url {
	let mut url = base.clone();
	let path = format!("{}/{suffix}", base.path().trim_end_matches('/'));

	url.set_path(&path);
	url.set_query(None);

	url
}
