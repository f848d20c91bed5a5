//! Translation of raw FCM responses into [`FcmResponse`]
use tracing::warn;

use crate::models::{CanonicalId, FcmResponse, LegacyApiResponse, LegacyResultEntry};
use crate::transport::RawResponse;

pub const SUCCESS: &str = "success";
pub const BAD_REQUEST: &str = "Only applies for JSON requests. Indicates that the request could not be parsed as JSON, or it contained invalid fields.";
pub const UNAUTHORIZED: &str = "There was an error authenticating the sender account.";
pub const SERVICE_UNAVAILABLE: &str = "Server is temporarily unavailable.";
pub const INTERNAL_ERROR: &str =
    "There was an internal error in the FCM server while trying to process the request.";
pub const UNEXPECTED_STATUS: &str = "Unexpected response status from the FCM server.";

const NOT_REGISTERED: &str = "NotRegistered";

/// Human readable description of an FCM status code
pub fn describe_status(status_code: u16) -> &'static str {
    match status_code {
        200 => SUCCESS,
        400 => BAD_REQUEST,
        401 => UNAUTHORIZED,
        503 => SERVICE_UNAVAILABLE,
        500..=599 => INTERNAL_ERROR,
        _ => UNEXPECTED_STATUS,
    }
}

/// Classify a raw response
///
/// `registration_ids` is the ordered token list of a legacy send. When given
/// and the status is 200, `canonical_ids` and `not_registered_ids` are
/// populated by walking the body's `results` array in lockstep with it.
pub fn classify(raw: RawResponse, registration_ids: Option<&[String]>) -> FcmResponse {
    let status_code = raw.status;
    let response = describe_status(status_code);

    if status_code != 200 {
        warn!(status = status_code, response = %response, "FCM request not successful");
    }

    let (canonical_ids, not_registered_ids) = match registration_ids {
        Some(ids) if status_code == 200 => {
            let results = parse_results(&raw.body);
            (
                Some(build_canonical_ids(&results, ids)),
                Some(build_not_registered_ids(&results, ids)),
            )
        }
        _ => (None, None),
    };

    FcmResponse {
        status_code,
        response: response.to_string(),
        body: raw.body,
        headers: raw.headers,
        canonical_ids,
        not_registered_ids,
    }
}

fn parse_results(body: &str) -> Vec<LegacyResultEntry> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<LegacyApiResponse>(body)
        .map(|parsed| parsed.results)
        .unwrap_or_default()
}

fn build_canonical_ids(results: &[LegacyResultEntry], ids: &[String]) -> Vec<CanonicalId> {
    results
        .iter()
        .zip(ids)
        .filter_map(|(result, old)| match &result.registration_id {
            Some(new) if new != old => Some(CanonicalId {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn build_not_registered_ids(results: &[LegacyResultEntry], ids: &[String]) -> Vec<String> {
    results
        .iter()
        .zip(ids)
        .filter(|(result, _)| result.error.as_deref() == Some(NOT_REGISTERED))
        .map(|(_, id)| id.clone())
        .collect()
}
