//! Single-flight access token refresh.
//!
//! [`TokenCoordinator::get_valid_access_token`] returns the cached token while it is outside the
//! safety margin. Otherwise the caller either joins the in-flight refresh ticket or installs a
//! new one. The ticket slot is only touched under the state mutex; the token endpoint call runs
//! outside it, inside the ticket's once-cell, so every waiter receives the same outcome and a
//! dropped leader hands the call to the next waiter instead of wedging the ticket.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::RefreshCredentials,
	flows::{RefreshOutcome, RefreshTicket, TokenCoordinator},
	http::TokenHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, TokenSource},
};

impl<C, M> TokenCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns an access token that stays valid beyond the safety margin.
	///
	/// Fails with [`Error::Config`] (and no network call) when credentials are missing, and with
	/// [`Error::RefreshFailed`] when the token endpoint refuses the refresh. Failures are not
	/// retried here; the next call starts a new refresh.
	pub async fn get_valid_access_token(&self) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "get_valid_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.resolve_access_token()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		result
	}

	async fn resolve_access_token(&self) -> Result<TokenSecret> {
		let credentials = self.config.refresh_credentials()?;
		let (ticket, source) = {
			let mut state = self.state.lock();
			let now = OffsetDateTime::now_utc();

			if let Some(token) =
				state.cached.as_ref().filter(|token| token.is_usable_at(now, self.safety_margin))
			{
				self.refresh_metrics.record_cache_hit();
				obs::record_token_lookup(TokenSource::Cache);

				return Ok(token.access_token.clone());
			}

			match state.in_flight.clone() {
				Some(ticket) => {
					self.refresh_metrics.record_joined();

					(ticket, TokenSource::Joined)
				},
				None => {
					let ticket = Arc::new(RefreshTicket::new());

					state.in_flight = Some(ticket.clone());

					(ticket, TokenSource::Refreshed)
				},
			}
		};
		let outcome = ticket.get_or_init(|| self.run_refresh(&ticket, credentials)).await;

		match outcome {
			Ok(token) => {
				obs::record_token_lookup(source);

				Ok(token.access_token.clone())
			},
			Err(err) => Err(Error::RefreshFailed(err.clone())),
		}
	}

	async fn run_refresh(
		&self,
		ticket: &Arc<RefreshTicket>,
		credentials: RefreshCredentials<'_>,
	) -> RefreshOutcome {
		self.refresh_metrics.record_attempt();

		let facade = <BasicFacade<C, M>>::from_config(
			&self.config,
			credentials.client,
			&*self.http_client,
			&*self.transport_mapper,
		);
		let outcome = facade.refresh_token(credentials.refresh_token).await;

		self.publish(ticket, &outcome);

		outcome
	}

	fn publish(&self, ticket: &Arc<RefreshTicket>, outcome: &RefreshOutcome) {
		let mut state = self.state.lock();

		match outcome {
			Ok(token) => {
				state.cached = Some(token.clone());

				self.refresh_metrics.record_success();
				obs::log_token_refreshed(token.expires_at);
			},
			Err(_) => {
				state.cached = None;

				self.refresh_metrics.record_failure();
			},
		}

		if state.in_flight.as_ref().is_some_and(|current| Arc::ptr_eq(current, ticket)) {
			state.in_flight = None;
		}
	}
}
