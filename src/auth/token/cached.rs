//! The single cached access token and its freshness rules.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Freshness of a [`CachedToken`] at a given instant, relative to a safety margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token stays valid beyond the safety margin and may be handed out.
	Fresh,
	/// Token is still valid but inside the safety margin; it must be refreshed before use.
	Expiring,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Immutable access token snapshot held by the coordinator.
///
/// A new value replaces the previous one wholesale on every refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant the token endpoint answered.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `issued_at + expires_in`.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a token that expires `expires_in` after `issued_at`.
	///
	/// Returns `None` when the expiry instant falls outside the representable date range.
	pub fn new(
		access_token: impl Into<TokenSecret>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?;

		Some(Self { access_token: access_token.into(), issued_at, expires_at })
	}

	/// Computes the freshness at `instant`, treating the last `margin` before expiry as expiring.
	pub fn status_at(&self, instant: OffsetDateTime, margin: Duration) -> TokenStatus {
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}
		if instant >= self.expires_at - margin {
			return TokenStatus::Expiring;
		}

		TokenStatus::Fresh
	}

	/// Returns `true` when the token may be handed to a consumer at `instant`.
	pub fn is_usable_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		matches!(self.status_at(instant, margin), TokenStatus::Fresh)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token() -> CachedToken {
		CachedToken::new(
			"access",
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::hours(1),
		)
		.expect("One hour after 2025 should be representable.")
	}

	#[test]
	fn status_respects_the_safety_margin() {
		let token = token();
		let margin = Duration::minutes(5);

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 00:54 UTC), margin),
			TokenStatus::Fresh
		);
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 00:55 UTC), margin),
			TokenStatus::Expiring
		);
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 01:00 UTC), margin),
			TokenStatus::Expired
		);
	}

	#[test]
	fn expiring_tokens_are_not_usable() {
		let token = token();
		let margin = Duration::minutes(5);

		assert!(token.is_usable_at(macros::datetime!(2025-01-01 00:10 UTC), margin));
		assert!(!token.is_usable_at(macros::datetime!(2025-01-01 00:58 UTC), margin));
		assert!(!token.is_usable_at(macros::datetime!(2025-01-01 02:00 UTC), margin));
	}

	#[test]
	fn unrepresentable_expiry_is_rejected() {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(CachedToken::new("access", issued_at, Duration::seconds(1_000_000_000_000_000))
			.is_none());
		assert!(CachedToken::new("access", issued_at, Duration::seconds(i64::MAX)).is_none());
	}

	#[test]
	fn debug_redacts_the_access_token() {
		let rendered = format!("{:?}", token());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("\"access\""));
	}
}
