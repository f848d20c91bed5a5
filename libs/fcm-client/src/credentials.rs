//! Legacy API key and service account (OAuth2) credentials
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::errors::{FcmError, FcmResult};
use crate::models::ServiceAccountKey;

/// OAuth2 scope required by the HTTP v1 send endpoint
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Where the service account JSON key comes from
#[derive(Clone)]
pub enum ServiceAccountSource {
    /// Path to a JSON key file
    FilePath(PathBuf),
    /// Raw JSON bytes, e.g. drained from a stream
    Json(Vec<u8>),
    /// Already parsed key
    Key(ServiceAccountKey),
}

impl ServiceAccountSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ServiceAccountSource::FilePath(path.into())
    }

    /// Drain an open stream into memory
    pub fn from_reader<R: Read>(mut reader: R) -> FcmResult<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| FcmError::Credentials(format!("failed to read key stream: {}", e)))?;
        Ok(ServiceAccountSource::Json(bytes))
    }

    pub fn from_key(key: ServiceAccountKey) -> Self {
        ServiceAccountSource::Key(key)
    }

    /// Normalize the source to JSON bytes for the OAuth2 credential loader
    pub fn to_json_bytes(&self) -> FcmResult<Vec<u8>> {
        match self {
            ServiceAccountSource::FilePath(path) => std::fs::read(path).map_err(|e| {
                FcmError::Credentials(format!("failed to read {}: {}", path.display(), e))
            }),
            ServiceAccountSource::Json(bytes) => Ok(bytes.clone()),
            ServiceAccountSource::Key(key) => Ok(serde_json::to_vec(key)?),
        }
    }
}

// Keys must not end up in logs
impl fmt::Debug for ServiceAccountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAccountSource::FilePath(path) => f.debug_tuple("FilePath").field(path).finish(),
            ServiceAccountSource::Json(bytes) => write!(f, "Json(<{} bytes>)", bytes.len()),
            ServiceAccountSource::Key(key) => write!(f, "Key({})", key.client_email),
        }
    }
}

/// Credentials a client is built with. Immutable once the client exists.
#[derive(Clone)]
pub enum Credentials {
    /// Legacy server key, sent as `Authorization: key=<api_key>`
    ApiKey(String),
    /// Service account used to mint OAuth2 bearer tokens for the v1 API
    ServiceAccount {
        source: ServiceAccountSource,
        project_name: String,
    },
}

impl Credentials {
    pub fn api_key(api_key: impl Into<String>) -> Self {
        Credentials::ApiKey(api_key.into())
    }

    pub fn service_account(source: ServiceAccountSource, project_name: impl Into<String>) -> Self {
        Credentials::ServiceAccount {
            source,
            project_name: project_name.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credentials::ServiceAccount {
                source,
                project_name,
            } => f
                .debug_struct("ServiceAccount")
                .field("source", source)
                .field("project_name", project_name)
                .finish(),
        }
    }
}

/// Credentials after construction-time checks
#[derive(Clone)]
pub(crate) enum ResolvedCredentials {
    ApiKey(String),
    ServiceAccount {
        project_name: String,
        token_fetcher: Arc<dyn TokenFetcher>,
    },
}

impl ResolvedCredentials {
    /// Check required fields and load the service account key, private key included
    pub fn resolve(credentials: Credentials) -> FcmResult<Self> {
        match credentials {
            Credentials::ApiKey(api_key) => {
                if api_key.trim().is_empty() {
                    return Err(FcmError::Config("API key must be provided".to_string()));
                }
                Ok(ResolvedCredentials::ApiKey(api_key))
            }
            Credentials::ServiceAccount {
                source,
                project_name,
            } => {
                if project_name.trim().is_empty() {
                    return Err(FcmError::Config(
                        "project name must be provided for the v1 API".to_string(),
                    ));
                }
                let key_json = source.to_json_bytes()?;
                let key = serde_json::from_slice::<ServiceAccountKey>(&key_json).map_err(|e| {
                    FcmError::Credentials(format!("malformed service account key: {}", e))
                })?;
                let token_fetcher = ServiceAccountTokenFetcher::from_json(&key_json)?;
                info!(
                    client_email = %key.client_email,
                    project = %project_name,
                    "Initialized service account token fetcher"
                );
                Ok(ResolvedCredentials::ServiceAccount {
                    project_name,
                    token_fetcher: Arc::new(token_fetcher),
                })
            }
        }
    }
}

/// Source of OAuth2 access tokens for the v1 API
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Return a currently valid access token; may hit the network
    async fn fetch_access_token(&self) -> FcmResult<String>;
}

/// Token fetcher backed by a service account key through `gcp_auth`
///
/// `gcp_auth` caches tokens and refreshes them once expired, so calling
/// [`TokenFetcher::fetch_access_token`] on every send is cheap.
pub struct ServiceAccountTokenFetcher {
    provider: CustomServiceAccount,
}

impl ServiceAccountTokenFetcher {
    /// Parse the key JSON and its PEM private key
    pub fn from_json(key_json: &[u8]) -> FcmResult<Self> {
        let json = std::str::from_utf8(key_json)
            .map_err(|e| FcmError::Credentials(format!("key is not valid UTF-8: {}", e)))?;
        let provider = CustomServiceAccount::from_json(json)
            .map_err(|e| FcmError::Credentials(e.to_string()))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl TokenFetcher for ServiceAccountTokenFetcher {
    async fn fetch_access_token(&self) -> FcmResult<String> {
        let token = self
            .provider
            .token(&[FIREBASE_MESSAGING_SCOPE])
            .await
            .map_err(|e| FcmError::Token(e.to_string()))?;
        Ok(token.as_str().to_string())
    }
}
