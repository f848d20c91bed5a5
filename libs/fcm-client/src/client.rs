use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::classify;
use crate::config::FcmConfig;
use crate::credentials::{Credentials, ResolvedCredentials, TokenFetcher};
use crate::errors::{FcmError, FcmResult};
use crate::models::{FcmResponse, GroupOperation, MessageOptions, RegistrationIds};
use crate::request::{
    self, BatchTopicRequest, DeviceGroupRequest, LegacySendRequest, LegacyTarget, V1SendRequest,
};
use crate::transport::Transport;
use crate::validation::{validate_condition, validate_topic};

/// Firebase Cloud Messaging Client
///
/// Every operation issues exactly one HTTP request and turns the response
/// into an [`FcmResponse`]. Remote failures (4xx/5xx) are reported through
/// `status_code` and `response`, never as `Err`.
///
/// Legacy, device group and Instance ID operations need
/// [`Credentials::ApiKey`]; [`FcmClient::send_v1`] needs
/// [`Credentials::ServiceAccount`].
#[derive(Clone)]
pub struct FcmClient {
    config: Arc<FcmConfig>,
    credentials: Arc<ResolvedCredentials>,
    transport: Transport,
}

impl FcmClient {
    /// Create new FCM client against the production endpoints
    ///
    /// # Errors
    /// `FcmError::Config` when the API key or project name is empty,
    /// `FcmError::Credentials` when the service account source can't be read
    /// or its private key can't be parsed.
    pub fn new(credentials: Credentials) -> FcmResult<Self> {
        Self::with_config(credentials, FcmConfig::default())
    }

    /// Create new FCM client with custom endpoints
    pub fn with_config(credentials: Credentials, config: FcmConfig) -> FcmResult<Self> {
        let credentials = ResolvedCredentials::resolve(credentials)?;

        Ok(Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            transport: Transport::default(),
        })
    }

    /// Use a preconfigured reqwest client (proxy, timeouts, TLS roots)
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.transport = Transport::new(http_client);
        self
    }

    /// Use a custom access token source instead of the service account key
    ///
    /// Has no effect on API key clients.
    pub fn with_token_fetcher(mut self, token_fetcher: Arc<dyn TokenFetcher>) -> Self {
        if let ResolvedCredentials::ServiceAccount {
            token_fetcher: current,
            ..
        } = Arc::make_mut(&mut self.credentials)
        {
            *current = token_fetcher;
        }
        self
    }

    pub fn config(&self) -> &FcmConfig {
        &self.config
    }

    /// Send a legacy message to one or more registration tokens
    ///
    /// On HTTP 200 the response carries `canonical_ids` and
    /// `not_registered_ids`, matched positionally against `registration_ids`.
    pub async fn send(
        &self,
        registration_ids: impl Into<RegistrationIds>,
        options: &MessageOptions,
    ) -> FcmResult<FcmResponse> {
        let registration_ids = registration_ids.into();
        info!(recipients = registration_ids.len(), "Sending FCM legacy message");

        let target = LegacyTarget::RegistrationIds(registration_ids.clone());
        let raw = self.post_legacy(&target, options).await?;

        Ok(classify(raw, Some(registration_ids.as_slice())))
    }

    /// Send a legacy message to a device group by its notification key
    pub async fn send_with_notification_key(
        &self,
        notification_key: &str,
        options: &MessageOptions,
    ) -> FcmResult<FcmResponse> {
        let target = LegacyTarget::To(notification_key.to_string());
        let raw = self.post_legacy(&target, options).await?;
        Ok(classify(raw, None))
    }

    /// Send a legacy message to `/topics/<topic>`
    ///
    /// # Errors
    /// `FcmError::InvalidTopic` without sending anything when the name has
    /// characters outside `[a-zA-Z0-9-_.~%]`.
    pub async fn send_to_topic(
        &self,
        topic: &str,
        options: &MessageOptions,
    ) -> FcmResult<FcmResponse> {
        ensure_topic(topic)?;

        let raw = self.post_legacy(&LegacyTarget::topic(topic), options).await?;
        Ok(classify(raw, None))
    }

    /// Send a legacy message to every device matching a topic condition
    ///
    /// # Errors
    /// `FcmError::InvalidCondition` without sending anything when the
    /// expression contains anything but quoted topics, `in topics`, `&&`,
    /// `||` and parentheses, or when a quoted topic is invalid.
    pub async fn send_to_topic_condition(
        &self,
        condition: &str,
        options: &MessageOptions,
    ) -> FcmResult<FcmResponse> {
        if !validate_condition(condition) {
            warn!(condition = %condition, "Rejected invalid FCM topic condition");
            return Err(FcmError::InvalidCondition(condition.to_string()));
        }

        let target = LegacyTarget::Condition(condition.to_string());
        let raw = self.post_legacy(&target, options).await?;
        Ok(classify(raw, None))
    }

    /// Create a device group; the notification key is in the response body
    pub async fn create_device_group(
        &self,
        key_name: &str,
        project_id: &str,
        registration_ids: impl Into<RegistrationIds>,
    ) -> FcmResult<FcmResponse> {
        self.manage_device_group(
            GroupOperation::Create,
            key_name,
            project_id,
            None,
            registration_ids.into(),
        )
        .await
    }

    /// Add registration tokens to an existing device group
    pub async fn add_to_device_group(
        &self,
        key_name: &str,
        project_id: &str,
        notification_key: &str,
        registration_ids: impl Into<RegistrationIds>,
    ) -> FcmResult<FcmResponse> {
        self.manage_device_group(
            GroupOperation::Add,
            key_name,
            project_id,
            Some(notification_key),
            registration_ids.into(),
        )
        .await
    }

    /// Remove registration tokens from a device group
    pub async fn remove_from_device_group(
        &self,
        key_name: &str,
        project_id: &str,
        notification_key: &str,
        registration_ids: impl Into<RegistrationIds>,
    ) -> FcmResult<FcmResponse> {
        self.manage_device_group(
            GroupOperation::Remove,
            key_name,
            project_id,
            Some(notification_key),
            registration_ids.into(),
        )
        .await
    }

    /// Look up the notification key of a device group by its name
    pub async fn recover_notification_key(
        &self,
        key_name: &str,
        project_id: &str,
    ) -> FcmResult<FcmResponse> {
        let headers = request::recovery_headers(self.api_key()?, project_id)?;
        let raw = self
            .transport
            .get(
                &self.config.group_notification_url(),
                headers,
                &[("notification_key_name", key_name)],
            )
            .await?;
        Ok(classify(raw, None))
    }

    /// Subscribe a single registration token to a topic
    pub async fn topic_subscription(
        &self,
        topic: &str,
        registration_id: &str,
    ) -> FcmResult<FcmResponse> {
        ensure_topic(topic)?;

        info!(topic = %topic, token = %short_token(registration_id), "Subscribing token to FCM topic");

        let headers = request::legacy_headers(self.api_key()?)?;
        let url = self.config.topic_relation_url(registration_id, topic)?;
        let raw = self.transport.post(&url, headers, Vec::new()).await?;
        Ok(classify(raw, None))
    }

    /// Unsubscribe a single registration token from a topic
    pub async fn topic_unsubscription(
        &self,
        topic: &str,
        registration_id: &str,
    ) -> FcmResult<FcmResponse> {
        self.batch_topic_unsubscription(topic, registration_id).await
    }

    /// Subscribe many registration tokens to a topic in one call
    pub async fn batch_topic_subscription(
        &self,
        topic: &str,
        registration_ids: impl Into<RegistrationIds>,
    ) -> FcmResult<FcmResponse> {
        let url = self.config.batch_add_url();
        self.batch_topic(&url, topic, registration_ids.into()).await
    }

    /// Unsubscribe many registration tokens from a topic in one call
    pub async fn batch_topic_unsubscription(
        &self,
        topic: &str,
        registration_ids: impl Into<RegistrationIds>,
    ) -> FcmResult<FcmResponse> {
        let url = self.config.batch_remove_url();
        self.batch_topic(&url, topic, registration_ids.into()).await
    }

    /// Fetch Instance ID metadata for a registration token
    ///
    /// With `details` the response also lists topic subscriptions.
    pub async fn get_instance_id_info(
        &self,
        registration_id: &str,
        details: bool,
    ) -> FcmResult<FcmResponse> {
        let headers = request::legacy_headers(self.api_key()?)?;
        let query: &[(&str, &str)] = if details { &[("details", "true")] } else { &[] };
        debug!(token = %short_token(registration_id), details, "Fetching FCM instance info");

        let raw = self
            .transport
            .get(&self.config.instance_info_url(registration_id)?, headers, query)
            .await?;
        Ok(classify(raw, None))
    }

    /// Send a message through the HTTP v1 API
    ///
    /// `message` is nested under `message` as-is; use [`crate::V1Message`] or
    /// any serializable value such as `serde_json::Value`. With
    /// `validate_only` FCM checks the message without delivering it.
    pub async fn send_v1<M: Serialize>(
        &self,
        message: &M,
        validate_only: bool,
    ) -> FcmResult<FcmResponse> {
        let project_name = match self.credentials.as_ref() {
            ResolvedCredentials::ServiceAccount { project_name, .. } => project_name,
            ResolvedCredentials::ApiKey(_) => {
                return Err(FcmError::Config(
                    "the v1 API requires service account credentials".to_string(),
                ))
            }
        };

        let body = request::encode(&V1SendRequest::new(message, validate_only))?;
        let access_token = self.access_token().await?;
        let headers = request::bearer_headers(&access_token)?;

        info!(project = %project_name, validate_only, "Sending FCM v1 message");

        let raw = self
            .transport
            .post(&self.config.send_v1_url(project_name), headers, body)
            .await?;
        Ok(classify(raw, None))
    }

    /// Get an OAuth2 access token for the v1 API
    pub async fn access_token(&self) -> FcmResult<String> {
        match self.credentials.as_ref() {
            ResolvedCredentials::ServiceAccount { token_fetcher, .. } => {
                token_fetcher.fetch_access_token().await
            }
            ResolvedCredentials::ApiKey(_) => Err(FcmError::Config(
                "access tokens require service account credentials".to_string(),
            )),
        }
    }

    fn api_key(&self) -> FcmResult<&str> {
        match self.credentials.as_ref() {
            ResolvedCredentials::ApiKey(api_key) => Ok(api_key),
            ResolvedCredentials::ServiceAccount { .. } => Err(FcmError::Config(
                "legacy endpoints require an API key".to_string(),
            )),
        }
    }

    async fn post_legacy(
        &self,
        target: &LegacyTarget,
        options: &MessageOptions,
    ) -> FcmResult<crate::transport::RawResponse> {
        let headers = request::legacy_headers(self.api_key()?)?;
        let body = request::encode(&LegacySendRequest { target, options })?;
        self.transport
            .post(&self.config.send_url(), headers, body)
            .await
    }

    async fn manage_device_group(
        &self,
        operation: GroupOperation,
        key_name: &str,
        project_id: &str,
        notification_key: Option<&str>,
        registration_ids: RegistrationIds,
    ) -> FcmResult<FcmResponse> {
        let headers = request::group_headers(self.api_key()?, project_id)?;
        let body = request::encode(&DeviceGroupRequest {
            registration_ids: &registration_ids,
            operation,
            notification_key_name: key_name,
            notification_key,
        })?;

        info!(
            operation = ?operation,
            key_name = %key_name,
            recipients = registration_ids.len(),
            "Managing FCM device group"
        );

        let raw = self
            .transport
            .post(&self.config.group_notification_url(), headers, body)
            .await?;
        Ok(classify(raw, None))
    }

    async fn batch_topic(
        &self,
        url: &str,
        topic: &str,
        registration_ids: RegistrationIds,
    ) -> FcmResult<FcmResponse> {
        ensure_topic(topic)?;

        let headers = request::legacy_headers(self.api_key()?)?;
        let body = request::encode(&BatchTopicRequest {
            to: format!("/topics/{}", topic),
            registration_tokens: &registration_ids,
        })?;

        info!(
            topic = %topic,
            recipients = registration_ids.len(),
            "Updating FCM topic subscriptions"
        );

        let raw = self.transport.post(url, headers, body).await?;
        Ok(classify(raw, None))
    }
}

/// First 8 characters of a registration token, for log fields
fn short_token(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

fn ensure_topic(topic: &str) -> FcmResult<()> {
    if validate_topic(topic) {
        Ok(())
    } else {
        warn!(topic = %topic, "Rejected invalid FCM topic name");
        Err(FcmError::InvalidTopic(topic.to_string()))
    }
}
