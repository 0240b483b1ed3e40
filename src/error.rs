//! Broker-level error types shared across the token coordinator and the lead client.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing credentials, malformed overrides).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The token endpoint refused or garbled a refresh; every waiter of the refresh sees this.
	#[error("Access token refresh failed: {0}")]
	RefreshFailed(#[from] TokenEndpointError),
	/// The one-time authorization code exchange failed.
	#[error("Authorization code exchange failed: {0}")]
	AuthorizationFailed(#[source] TokenEndpointError),
	/// Transport failure (DNS, TCP, TLS) while calling the CRM API.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The CRM API rejected the access token (HTTP 401).
	#[error("Zoho CRM rejected the access token: {message}.")]
	AuthFailed {
		/// Message extracted from the response body.
		message: String,
	},
	/// The CRM API throttled the request (HTTP 429).
	#[error("{message}")]
	RateLimited {
		/// Human-readable summary including the retry hint.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The CRM API answered with a non-success status.
	#[error("Zoho CRM request failed with status {status}: {message}.")]
	RequestFailed {
		/// HTTP status code.
		status: u16,
		/// Best-effort message extracted from the response body.
		message: String,
	},
	/// The CRM API answered 2xx with a body that does not match the expected shape.
	#[error("Zoho CRM returned an unexpected response: {message}.")]
	InvalidResponse {
		/// HTTP status code.
		status: u16,
		/// Parsing failure summary.
		message: String,
	},
	/// The CRM API accepted the request but reported a per-record failure.
	#[error("Zoho CRM rejected the lead: {message}.")]
	RecordRejected {
		/// Record-level code such as `MANDATORY_NOT_FOUND`, when present.
		code: Option<String>,
		/// Record-level message.
		message: String,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A credential required for the requested operation is not configured.
	#[error("Missing required Zoho credential `{name}`.")]
	MissingCredential {
		/// Environment variable naming the credential.
		name: &'static str,
	},
	/// A redirect URI is required for the authorization setup flow.
	#[error("Redirect URI is not configured (`{name}`).")]
	MissingRedirectUri {
		/// Environment variable naming the redirect URI.
		name: &'static str,
	},
	/// A configured URL cannot be parsed.
	#[error("Configured value `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Environment variable (or setting) that carried the URL.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S).
	#[error("Configured value `{name}` must use http or https, found `{scheme}`.")]
	UnsupportedScheme {
		/// Environment variable (or setting) that carried the URL.
		name: &'static str,
		/// Rejected scheme.
		scheme: String,
	},
}

/// Failures reported by the OAuth token endpoint.
///
/// One value is cloned into every caller that joined the same refresh.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenEndpointError {
	/// The provider answered with an OAuth error (`invalid_code`, `invalid_client`, ...).
	#[error("token endpoint rejected the request: {reason}.")]
	Rejected {
		/// Provider-supplied error code or description.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The response body could not be parsed into a token response.
	#[error("token endpoint returned a malformed response: {message}.")]
	MalformedResponse {
		/// Parsing failure summary.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("the expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("the expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// The token endpoint could not be reached.
	#[error("token endpoint could not be reached: {message}.")]
	Unreachable {
		/// Transport failure summary.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
}

/// Transport-level failures while calling the CRM API.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling Zoho CRM.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
