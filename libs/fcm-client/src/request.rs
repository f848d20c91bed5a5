//! Request bodies and header sets for every FCM endpoint
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::errors::{FcmError, FcmResult};
use crate::models::{GroupOperation, MessageOptions, RegistrationIds};

/// Recipient field of a legacy send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LegacyTarget {
    RegistrationIds(RegistrationIds),
    /// `/topics/<name>` or a notification key
    To(String),
    Condition(String),
}

impl LegacyTarget {
    pub fn topic(topic: &str) -> Self {
        LegacyTarget::To(format!("/topics/{}", topic))
    }
}

/// Legacy `/fcm/send` body: the recipient merged with the message options
#[derive(Debug, Serialize)]
pub(crate) struct LegacySendRequest<'a> {
    #[serde(flatten)]
    pub target: &'a LegacyTarget,
    #[serde(flatten)]
    pub options: &'a MessageOptions,
}

/// Device group management body
#[derive(Debug, Serialize)]
pub(crate) struct DeviceGroupRequest<'a> {
    pub registration_ids: &'a RegistrationIds,
    pub operation: GroupOperation,
    pub notification_key_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_key: Option<&'a str>,
}

/// Instance ID batch (un)subscription body
#[derive(Debug, Serialize)]
pub(crate) struct BatchTopicRequest<'a> {
    pub to: String,
    pub registration_tokens: &'a RegistrationIds,
}

/// HTTP v1 send body
#[derive(Debug, Serialize)]
pub(crate) struct V1SendRequest<'a, M: Serialize> {
    pub message: &'a M,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_only: Option<bool>,
}

impl<'a, M: Serialize> V1SendRequest<'a, M> {
    pub fn new(message: &'a M, validate_only: bool) -> Self {
        Self {
            message,
            validate_only: validate_only.then_some(true),
        }
    }
}

/// Encode a request body
pub(crate) fn encode<T: Serialize>(body: &T) -> FcmResult<Vec<u8>> {
    Ok(serde_json::to_vec(body)?)
}

/// `Content-Type` + `Authorization: key=<api_key>`
pub(crate) fn legacy_headers(api_key: &str) -> FcmResult<HeaderMap> {
    let mut headers = json_headers();
    headers.insert(AUTHORIZATION, header_value(&format!("key={}", api_key))?);
    Ok(headers)
}

/// Legacy headers plus `Project-Id` for device group operations
pub(crate) fn group_headers(api_key: &str, project_id: &str) -> FcmResult<HeaderMap> {
    let mut headers = legacy_headers(api_key)?;
    headers.insert(
        HeaderName::from_static("project-id"),
        header_value(project_id)?,
    );
    Ok(headers)
}

/// Legacy headers plus `project_id` for notification key recovery
pub(crate) fn recovery_headers(api_key: &str, project_id: &str) -> FcmResult<HeaderMap> {
    let mut headers = legacy_headers(api_key)?;
    headers.insert(
        HeaderName::from_static("project_id"),
        header_value(project_id)?,
    );
    Ok(headers)
}

/// `Content-Type` + `Authorization: Bearer <token>`
pub(crate) fn bearer_headers(access_token: &str) -> FcmResult<HeaderMap> {
    let mut headers = json_headers();
    headers.insert(
        AUTHORIZATION,
        header_value(&format!("Bearer {}", access_token))?,
    );
    Ok(headers)
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn header_value(value: &str) -> FcmResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| FcmError::Config("header value contains invalid characters".to_string()))
}
