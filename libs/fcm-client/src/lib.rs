//! FCM Client Library
//!
//! Firebase Cloud Messaging client covering the legacy HTTP API, device
//! groups, the Instance ID API and the HTTP v1 API.
//!
//! It handles:
//! - Legacy send to registration tokens, notification keys, topics and topic conditions
//! - Topic and condition syntax checks before anything is sent
//! - Device group create/add/remove and notification key recovery
//! - Topic (un)subscription and instance info lookups
//! - HTTP v1 send with OAuth2 tokens from a service account key
//! - Translating status codes and bodies (canonical IDs, NotRegistered tokens)
//!   into an `FcmResponse`
//!
//! # Example
//!
//! ```no_run
//! use fcm_client::{Credentials, FcmClient, MessageOptions, Notification};
//!
//! # async fn run() -> fcm_client::FcmResult<()> {
//! let client = FcmClient::new(Credentials::api_key("server-key"))?;
//! let options = MessageOptions::new().with_notification(Notification::new("Hi", "There"));
//!
//! let response = client.send(vec!["token-1", "token-2"], &options).await?;
//! for remap in response.canonical_ids.unwrap_or_default() {
//!     println!("replace {} with {}", remap.old, remap.new);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod validation;

mod request;
mod transport;

pub use client::FcmClient;
pub use config::FcmConfig;
pub use credentials::{Credentials, ServiceAccountSource, ServiceAccountTokenFetcher, TokenFetcher};
pub use errors::{FcmError, FcmResult};
pub use models::{
    CanonicalId, FcmResponse, GroupOperation, MessageOptions, Notification, RegistrationIds,
    ServiceAccountKey, V1Message, V1Notification,
};
pub use transport::RawResponse;
