//! Endpoint configuration for the FCM client
use reqwest::Url;
use serde::Deserialize;

use crate::errors::{FcmError, FcmResult};

/// Base URIs of the remote endpoints.
///
/// Defaults point at the production Google endpoints. Override them to talk to
/// a proxy or a mock server.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FcmConfig {
    /// Legacy HTTP endpoint host (`/fcm/send`)
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// HTTP v1 prefix; the project name and `/messages:send` are appended
    #[serde(default = "default_base_uri_v1")]
    pub base_uri_v1: String,

    /// Device group endpoint host (`/gcm/notification`)
    #[serde(default = "default_group_notification_base_uri")]
    pub group_notification_base_uri: String,

    /// Instance ID API host (`/iid/...`)
    #[serde(default = "default_instance_id_api")]
    pub instance_id_api: String,
}

fn default_base_uri() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_base_uri_v1() -> String {
    "https://fcm.googleapis.com/v1/projects/".to_string()
}

fn default_group_notification_base_uri() -> String {
    "https://android.googleapis.com".to_string()
}

fn default_instance_id_api() -> String {
    "https://iid.googleapis.com".to_string()
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            base_uri_v1: default_base_uri_v1(),
            group_notification_base_uri: default_group_notification_base_uri(),
            instance_id_api: default_instance_id_api(),
        }
    }
}

impl FcmConfig {
    /// Load configuration from `FCM_*` environment variables
    ///
    /// Reads `.env` first when present. Unset variables fall back to the
    /// production endpoints.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("FCM_").from_env()
    }

    /// Route every endpoint to a single host, e.g. a local mock server
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            base_uri: base.to_string(),
            base_uri_v1: format!("{}/v1/projects/", base),
            group_notification_base_uri: base.to_string(),
            instance_id_api: base.to_string(),
        }
    }

    pub(crate) fn send_url(&self) -> String {
        format!("{}/fcm/send", trim(&self.base_uri))
    }

    pub(crate) fn send_v1_url(&self, project_name: &str) -> String {
        let prefix = &self.base_uri_v1;
        if prefix.ends_with('/') {
            format!("{}{}/messages:send", prefix, project_name)
        } else {
            format!("{}/{}/messages:send", prefix, project_name)
        }
    }

    pub(crate) fn group_notification_url(&self) -> String {
        format!("{}/gcm/notification", trim(&self.group_notification_base_uri))
    }

    /// Tokens are caller input and get percent-encoded as a single path segment
    pub(crate) fn instance_info_url(&self, registration_id: &str) -> FcmResult<String> {
        join_segments(&self.instance_id_api, &["iid", "info", registration_id])
    }

    pub(crate) fn topic_relation_url(&self, registration_id: &str, topic: &str) -> FcmResult<String> {
        join_segments(
            &self.instance_id_api,
            &["iid", "v1", registration_id, "rel", "topics", topic],
        )
    }

    pub(crate) fn batch_add_url(&self) -> String {
        format!("{}/iid/v1:batchAdd", trim(&self.instance_id_api))
    }

    pub(crate) fn batch_remove_url(&self) -> String {
        format!("{}/iid/v1:batchRemove", trim(&self.instance_id_api))
    }
}

fn trim(uri: &str) -> &str {
    uri.trim_end_matches('/')
}

fn join_segments(base: &str, segments: &[&str]) -> FcmResult<String> {
    let mut url = Url::parse(base).map_err(|e| FcmError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| FcmError::InvalidUrl(format!("{}: cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
