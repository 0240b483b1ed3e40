//! Optional observability helpers for token and lead flows.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `zoho_crm.flow` with `flow` and `stage` fields, plus
//!   warnings for failed flows.
//! - `metrics` increments the `zoho_crm_flow_total` counter for every attempt, success, and
//!   failure, labeled by `flow` and `outcome`, and `zoho_crm_token_lookup_total` for every access
//!   token handed out, labeled by `source`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// One-time authorization code exchange.
	AuthorizationCode,
	/// Access token lookup, refreshing when needed.
	Refresh,
	/// Lead submission to the CRM API.
	LeadCreate,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::LeadCreate => "lead_create",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure returned to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How an access token lookup was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// Served from the cache without I/O.
	Cache,
	/// Waited on a refresh started by another caller.
	Joined,
	/// Performed the token endpoint call.
	Refreshed,
}
impl TokenSource {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::Cache => "cache",
			TokenSource::Joined => "joined",
			TokenSource::Refreshed => "refreshed",
		}
	}
}
