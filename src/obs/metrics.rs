// self
use crate::obs::{FlowKind, FlowOutcome, TokenSource};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"zoho_crm_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how a successful token lookup was served (when enabled).
pub fn record_token_lookup(source: TokenSource) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("zoho_crm_token_lookup_total", "source" => source.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = source;
	}
}
