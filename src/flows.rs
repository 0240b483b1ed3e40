//! Token lifecycle orchestration: the cached access token, the single-flight refresh, and the
//! one-time authorization setup.

pub mod authorization;
pub mod refresh;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	config::ZohoConfig,
	error::TokenEndpointError,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
};

/// Outcome shared by every caller that joined one refresh.
type RefreshOutcome = Result<CachedToken, TokenEndpointError>;
/// In-flight refresh; the first caller to poll it performs the network call.
type RefreshTicket = AsyncOnceCell<RefreshOutcome>;

#[derive(Default)]
struct TokenState {
	cached: Option<CachedToken>,
	in_flight: Option<Arc<RefreshTicket>>,
}

/// Coordinator specialized for the crate's default reqwest transport stack.
pub type ReqwestCoordinator = TokenCoordinator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Owns the process-wide access token for one Zoho client.
///
/// Construct one per process and share it behind an [`Arc`]; clones share the same cache. The
/// coordinator hands out the cached token while it is outside the safety margin and otherwise
/// performs (or joins) exactly one `grant_type=refresh_token` call.
#[derive(Clone)]
pub struct TokenCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every token endpoint request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Endpoints and credentials.
	pub config: ZohoConfig,
	/// Tokens expiring within this window are refreshed before use.
	pub safety_margin: Duration,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	state: Arc<Mutex<TokenState>>,
}
impl<C, M> TokenCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Default safety margin applied before the expiry instant.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::minutes(5);

	/// Creates a coordinator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ZohoConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config,
			safety_margin: Self::DEFAULT_SAFETY_MARGIN,
			refresh_metrics: Default::default(),
			state: Default::default(),
		}
	}

	/// Overrides the safety margin (negative values are clamped to zero).
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Returns a snapshot of the cached token, if one is held.
	pub fn cached_token(&self) -> Option<CachedToken> {
		self.state.lock().cached.clone()
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().in_flight.is_some()
	}

	/// Drops the cached token if it still equals `rejected`.
	///
	/// Used after the CRM API answers 401 so the next caller refreshes. A token that was already
	/// replaced by a concurrent refresh is left untouched. Returns `true` when the cache was
	/// cleared.
	pub fn invalidate(&self, rejected: &TokenSecret) -> bool {
		let mut state = self.state.lock();

		if state.cached.as_ref().is_some_and(|token| token.access_token == *rejected) {
			state.cached = None;

			true
		} else {
			false
		}
	}
}
impl ReqwestCoordinator {
	/// Creates a coordinator that provisions its own reqwest transport.
	pub fn new(config: ZohoConfig) -> Self {
		Self::with_http_client(
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for TokenCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("TokenCoordinator")
			.field("config", &self.config)
			.field("safety_margin", &self.safety_margin)
			.field("cached", &state.cached)
			.field("refreshing", &state.in_flight.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn coordinator() -> ReqwestCoordinator {
		let config = ZohoConfig::from_lookup(|_| None)
			.expect("Empty environment should still load a configuration.");

		ReqwestCoordinator::new(config)
	}

	#[test]
	fn invalidate_only_clears_the_rejected_token() {
		let coordinator = coordinator();

		coordinator.state.lock().cached =
			CachedToken::new("current", OffsetDateTime::now_utc(), Duration::hours(1));

		assert!(!coordinator.invalidate(&TokenSecret::from("stale")));
		assert!(coordinator.cached_token().is_some());
		assert!(coordinator.invalidate(&TokenSecret::from("current")));
		assert!(coordinator.cached_token().is_none());
	}

	#[test]
	fn negative_margins_clamp_to_zero() {
		let coordinator = coordinator().with_safety_margin(Duration::seconds(-10));

		assert_eq!(coordinator.safety_margin, Duration::ZERO);
		assert!(!coordinator.is_refreshing());
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let coordinator = coordinator();

		coordinator.state.lock().cached =
			CachedToken::new("very-secret", OffsetDateTime::now_utc(), Duration::hours(1));

		assert!(!format!("{coordinator:?}").contains("very-secret"));
	}
}
