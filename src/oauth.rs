//! OAuth client facade for the Zoho accounts server.
//!
//! Zoho reports some token endpoint failures as `200 OK` with an `{"error": "..."}` body. The
//! `oauth2` crate surfaces those as parse failures, so `map_request_error` re-reads the body and
//! reports them as rejections instead of malformed responses.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	config::{ClientCredentials, ZohoConfig},
	error::TokenEndpointError,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// Maps HTTP transport failures into [`TokenEndpointError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a token endpoint error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> TokenEndpointError;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> TokenEndpointError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => unreachable_endpoint(meta, inner),
			HttpClientError::Io(inner) => unreachable_endpoint(meta, inner),
			HttpClientError::Other(message) => unreachable_endpoint(meta, message),
			_ => unreachable_endpoint(meta, "unknown HTTP client error"),
		}
	}
}

/// Access token plus the optional refresh token returned by an authorization code exchange.
#[derive(Clone, Debug)]
pub struct AuthorizationGrant {
	/// Access token minted by the exchange.
	pub token: CachedToken,
	/// Refresh token to persist as `ZOHO_REFRESH_TOKEN`; Zoho only returns it with
	/// `access_type=offline`.
	pub refresh_token: Option<TokenSecret>,
}

#[derive(Deserialize)]
struct ZohoErrorBody {
	error: String,
}

pub(crate) struct BasicFacade<'a, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> BasicFacade<'a, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &ZohoConfig,
		credentials: ClientCredentials<'_>,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Self {
		// Zoho expects the client credentials as form fields, not HTTP Basic.
		let oauth_client = BasicClient::new(ClientId::new(credentials.client_id.to_owned()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(config.authorization_endpoint()))
			.set_token_uri(TokenUrl::from_url(config.token_endpoint()))
			.set_auth_type(AuthType::RequestBody);

		Self { oauth_client, http_client, error_mapper }
	}

	pub(crate) async fn refresh_token(
		&self,
		refresh_token: &TokenSecret,
	) -> Result<CachedToken, TokenEndpointError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper))?;

		map_token_response(&response)
	}

	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: &Url,
	) -> Result<AuthorizationGrant, TokenEndpointError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let redirect_url = RedirectUrl::from_url(redirect_uri.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper))?;
		let token = map_token_response(&response)?;
		let refresh_token =
			response.refresh_token().map(|secret| TokenSecret::new(secret.secret().to_owned()));

		Ok(AuthorizationGrant { token, refresh_token })
	}
}

fn map_token_response(response: &FacadeTokenResponse) -> Result<CachedToken, TokenEndpointError> {
	let expires_in =
		response.expires_in().ok_or(TokenEndpointError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| TokenEndpointError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(TokenEndpointError::NonPositiveExpiresIn);
	}

	let access_token = response.access_token().secret();

	if access_token.trim().is_empty() {
		return Err(TokenEndpointError::MalformedResponse {
			message: "access_token is empty".into(),
			status: None,
		});
	}

	let issued_at = OffsetDateTime::now_utc();

	CachedToken::new(access_token.to_owned(), issued_at, Duration::seconds(expires_in))
		.ok_or(TokenEndpointError::ExpiresInOutOfRange)
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> TokenEndpointError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, body) => match serde_json::from_slice::<ZohoErrorBody>(&body)
		{
			Ok(ZohoErrorBody { error }) =>
				TokenEndpointError::Rejected { reason: error, status: meta_status(meta_ref) },
			Err(_) => TokenEndpointError::MalformedResponse {
				message: error.to_string(),
				status: meta_status(meta_ref),
			},
		},
		RequestTokenError::Other(message) =>
			TokenEndpointError::MalformedResponse { message, status: meta_status(meta_ref) },
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> TokenEndpointError {
	let reason = match response.error_description() {
		Some(description) => format!("{} ({description})", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	TokenEndpointError::Rejected { reason, status: meta_status(meta) }
}

fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> TokenEndpointError {
	if err.is_timeout() {
		return TokenEndpointError::Unreachable {
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		};
	}

	unreachable_endpoint(meta, err)
}

fn unreachable_endpoint(
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> TokenEndpointError {
	TokenEndpointError::Unreachable {
		message: message.to_string(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct FakeTransportError;
	impl Display for FakeTransportError {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("connection reset")
		}
	}
	impl StdError for FakeTransportError {}

	struct FakeMapper;
	impl TransportErrorMapper<FakeTransportError> for FakeMapper {
		fn map_transport_error(
			&self,
			meta: Option<&ResponseMetadata>,
			error: HttpClientError<FakeTransportError>,
		) -> TokenEndpointError {
			unreachable_endpoint(meta, format!("{error:?}"))
		}
	}

	fn parse_failure(body: &str) -> BasicRequestTokenError<HttpClientError<FakeTransportError>> {
		let source = serde_path_to_error::deserialize::<_, FacadeTokenResponse>(
			&mut serde_json::Deserializer::from_str(body),
		)
		.expect_err("Fixture body should not parse as a token response.");

		RequestTokenError::Parse(source, body.as_bytes().to_vec())
	}

	#[test]
	fn zoho_error_bodies_become_rejections() {
		let meta = ResponseMetadata { status: Some(200), retry_after: None };
		let err =
			map_request_error(Some(meta), parse_failure("{\"error\":\"invalid_code\"}"), &FakeMapper);

		assert_eq!(
			err,
			TokenEndpointError::Rejected { reason: "invalid_code".into(), status: Some(200) }
		);
	}

	fn token_response(expires_in: u64) -> FacadeTokenResponse {
		let mut response = FacadeTokenResponse::new(
			oauth2::AccessToken::new("access".into()),
			oauth2::basic::BasicTokenType::Bearer,
			oauth2::EmptyExtraTokenFields {},
		);

		response.set_expires_in(Some(&std::time::Duration::from_secs(expires_in)));

		response
	}

	#[test]
	fn token_lifetime_sets_the_expiry() {
		let token = map_token_response(&token_response(3600))
			.expect("A one hour lifetime should be accepted.");

		assert_eq!(token.expires_at - token.issued_at, Duration::hours(1));
	}

	#[test]
	fn unrepresentable_lifetimes_are_out_of_range() {
		assert_eq!(
			map_token_response(&token_response(1_000_000_000_000_000)),
			Err(TokenEndpointError::ExpiresInOutOfRange)
		);
		assert_eq!(
			map_token_response(&token_response(u64::MAX)),
			Err(TokenEndpointError::ExpiresInOutOfRange)
		);
	}

	#[test]
	fn unrecognised_bodies_are_malformed() {
		let err = map_request_error(None, parse_failure("{\"token\":42}"), &FakeMapper);

		assert!(matches!(err, TokenEndpointError::MalformedResponse { status: None, .. }));
	}

	#[test]
	fn transport_failures_keep_metadata() {
		let meta = ResponseMetadata { status: Some(503), retry_after: Some(Duration::seconds(7)) };
		let err = map_request_error(
			Some(meta),
			RequestTokenError::Request(HttpClientError::Reqwest(Box::new(FakeTransportError))),
			&FakeMapper,
		);

		match err {
			TokenEndpointError::Unreachable { status, retry_after, .. } => {
				assert_eq!(status, Some(503));
				assert_eq!(retry_after, Some(Duration::seconds(7)));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
