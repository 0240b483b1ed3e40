//! Interpretation of `POST /crm/v3/Leads` responses.

// crates.io
use serde_json::Value;
// self
use crate::_prelude::*;

/// Identifiers of a newly created lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLead {
	/// CRM record id.
	pub record_id: String,
	/// `Created_Time` reported by the CRM, when present.
	pub created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
	data: Vec<RecordResult>,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	details: Option<RecordDetails>,
}

#[derive(Debug, Deserialize)]
struct RecordDetails {
	#[serde(default)]
	id: Option<String>,
	#[serde(default, rename = "Created_Time")]
	created_time: Option<String>,
}

/// Maps a lead-create response onto a [`CreatedLead`] or a typed failure.
pub(crate) fn interpret(
	status: u16,
	retry_after: Option<Duration>,
	body: &[u8],
) -> Result<CreatedLead> {
	match status {
		429 => Err(rate_limited(retry_after)),
		401 => Err(Error::AuthFailed { message: failure_message(body) }),
		200..=299 => parse_success(status, body),
		_ => Err(Error::RequestFailed { status, message: failure_message(body) }),
	}
}

fn rate_limited(retry_after: Option<Duration>) -> Error {
	let message = match retry_after {
		Some(delay) => format!(
			"Zoho CRM rate limit exceeded; retry after {} seconds.",
			delay.whole_seconds().max(0)
		),
		None => "Zoho CRM rate limit exceeded; retry later.".to_owned(),
	};

	Error::RateLimited { message, retry_after }
}

fn parse_success(status: u16, body: &[u8]) -> Result<CreatedLead> {
	let response: CreateResponse =
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
			.map_err(|err| Error::InvalidResponse { status, message: err.to_string() })?;
	let record = response.data.into_iter().next().ok_or_else(|| Error::InvalidResponse {
		status,
		message: "response data is empty".into(),
	})?;

	if !record.status.as_deref().is_some_and(|value| value.eq_ignore_ascii_case("success")) {
		return Err(Error::RecordRejected {
			message: record.message.unwrap_or_else(|| "record was not created".into()),
			code: record.code,
		});
	}

	let details = record.details.ok_or_else(|| Error::InvalidResponse {
		status,
		message: "record details are missing".into(),
	})?;
	let record_id = details.id.filter(|id| !id.is_empty()).ok_or_else(|| {
		Error::InvalidResponse { status, message: "record id is missing".into() }
	})?;

	Ok(CreatedLead { record_id, created_time: details.created_time })
}

/// Picks the most specific message from an error body: `data[0].message`, then `message`,
/// `error`, and `code`.
fn failure_message(body: &[u8]) -> String {
	let Ok(value) = serde_json::from_slice::<Value>(body) else {
		return "no error details returned".into();
	};

	[
		value.pointer("/data/0/message"),
		value.get("message"),
		value.get("error"),
		value.get("code"),
	]
	.into_iter()
	.flatten()
	.find_map(|candidate| candidate.as_str().filter(|text| !text.trim().is_empty()))
	.map_or_else(|| "no error details returned".into(), str::to_owned)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_yields_record_identifiers() {
		let body = br#"{"data":[{"code":"SUCCESS","status":"success","message":"record added",
			"details":{"id":"5725767000000524157","Created_Time":"2025-03-01T10:00:00-05:00"}}]}"#;
		let lead = interpret(201, None, body).expect("Successful response should parse.");

		assert_eq!(lead.record_id, "5725767000000524157");
		assert_eq!(lead.created_time.as_deref(), Some("2025-03-01T10:00:00-05:00"));
	}

	#[test]
	fn nested_failure_uses_the_record_message() {
		let body = br#"{"data":[{"code":"MANDATORY_NOT_FOUND","status":"error",
			"message":"required field not found","details":{"api_name":"Last_Name"}}]}"#;
		let err = interpret(200, None, body).expect_err("Nested error must fail.");

		match err {
			Error::RecordRejected { code, message } => {
				assert_eq!(code.as_deref(), Some("MANDATORY_NOT_FOUND"));
				assert_eq!(message, "required field not found");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn rate_limit_message_mentions_the_delay() {
		let err = interpret(429, Some(Duration::seconds(30)), b"{}")
			.expect_err("429 must be reported as a failure.");

		assert!(matches!(err, Error::RateLimited { retry_after: Some(_), .. }));
		assert!(err.to_string().contains("30"));
	}

	#[test]
	fn generic_failures_pick_the_first_message() {
		let err = interpret(400, None, br#"{"code":"INVALID_DATA","message":"bad email"}"#)
			.expect_err("400 must fail.");

		assert!(matches!(
			err,
			Error::RequestFailed { status: 400, ref message } if message == "bad email"
		));

		let err = interpret(500, None, b"<html>oops</html>").expect_err("500 must fail.");

		assert!(matches!(
			err,
			Error::RequestFailed { status: 500, ref message } if message == "no error details returned"
		));
	}

	#[test]
	fn unauthorized_maps_to_auth_failure() {
		let err = interpret(401, None, br#"{"code":"INVALID_TOKEN","message":"invalid oauth token"}"#)
			.expect_err("401 must fail.");

		assert!(matches!(err, Error::AuthFailed { ref message } if message == "invalid oauth token"));
	}

	#[test]
	fn malformed_success_bodies_are_invalid() {
		assert!(matches!(
			interpret(200, None, b"not json"),
			Err(Error::InvalidResponse { status: 200, .. })
		));
		assert!(matches!(
			interpret(200, None, br#"{"data":[]}"#),
			Err(Error::InvalidResponse { status: 200, .. })
		));
		assert!(matches!(
			interpret(201, None, br#"{"data":[{"status":"success","details":{}}]}"#),
			Err(Error::InvalidResponse { status: 201, .. })
		));
	}
}
