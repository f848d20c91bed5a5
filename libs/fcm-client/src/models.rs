use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registration tokens addressed by a legacy send or a device group operation
///
/// A single token and a one-element list produce the same
/// `registration_ids` array on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationIds(Vec<String>);

impl RegistrationIds {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for RegistrationIds {
    fn from(token: &str) -> Self {
        Self(vec![token.to_string()])
    }
}

impl From<String> for RegistrationIds {
    fn from(token: String) -> Self {
        Self(vec![token])
    }
}

impl From<&String> for RegistrationIds {
    fn from(token: &String) -> Self {
        Self(vec![token.clone()])
    }
}

impl From<Vec<String>> for RegistrationIds {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[String]> for RegistrationIds {
    fn from(tokens: &[String]) -> Self {
        Self(tokens.to_vec())
    }
}

impl From<Vec<&str>> for RegistrationIds {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RegistrationIds {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RegistrationIds {
    fn from(tokens: [&str; N]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// FCM Notification Payload (legacy API)
///
/// Platform specific keys (`icon`, `sound`, `click_action`, `badge`, ...) go
/// into `extra` and are sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Legacy message payload merged next to the recipient field
///
/// `extra` carries the remaining legacy options such as `priority`,
/// `time_to_live`, `collapse_key` or `dry_run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set any other top-level legacy option
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// FCM HTTP v1 message content
///
/// Platform override blocks are passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct V1Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<V1Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_options: Option<serde_json::Value>,
}

/// FCM HTTP v1 notification block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct V1Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Device group operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperation {
    Create,
    Add,
    Remove,
}

/// Firebase Service Account Key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default = "default_key_type")]
    pub key_type: String,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub auth_uri: String,
    pub token_uri: String,
}

fn default_key_type() -> String {
    "service_account".to_string()
}

/// Canonical ID remap returned by the legacy send endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalId {
    /// Token the request was sent to
    pub old: String,
    /// Token FCM wants the caller to use from now on
    pub new: String,
}

/// Normalized FCM response
///
/// `canonical_ids` and `not_registered_ids` are only set for legacy sends
/// addressed by registration ids that came back with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmResponse {
    pub status_code: u16,
    /// Human readable classification of the status code
    pub response: String,
    /// Raw response body
    pub body: String,
    /// Raw response headers, names lower-cased
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_ids: Option<Vec<CanonicalId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_registered_ids: Option<Vec<String>>,
}

impl FcmResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Parse the raw body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Legacy send response body
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LegacyApiResponse {
    #[serde(default)]
    pub results: Vec<LegacyResultEntry>,
}

/// Per-token entry of a legacy send response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LegacyResultEntry {
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
