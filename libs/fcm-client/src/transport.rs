//! Thin HTTP dispatcher on top of reqwest
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Method, Url};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{FcmError, FcmResult};

/// Status, headers and body of an HTTP response, untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names lower-cased; repeated headers joined with `", "`
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// One request in, one response out. No retries, transport-default timeouts
/// and redirect policy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Transport {
    http_client: reqwest::Client,
}

impl Transport {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    pub async fn post(&self, url: &str, headers: HeaderMap, body: Vec<u8>) -> FcmResult<RawResponse> {
        self.execute(Method::POST, url, headers, &[], Some(body)).await
    }

    pub async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
    ) -> FcmResult<RawResponse> {
        self.execute(Method::GET, url, headers, query, None).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> FcmResult<RawResponse> {
        let (url, basic_auth) = split_userinfo(url)?;

        // Paths carry registration tokens; log the host only
        let host = url.host_str().unwrap_or_default().to_string();
        debug!(method = %method, host = %host, "Sending FCM request");

        // An explicit Authorization header wins over URL userinfo
        let use_basic_auth = !headers.contains_key(AUTHORIZATION);

        let mut request = self.http_client.request(method.clone(), url).headers(headers);
        if let Some((username, password)) = basic_auth.filter(|_| use_basic_auth) {
            request = request.basic_auth(username, password);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.text().await?;

        debug!(method = %method, host = %host, status, "FCM response received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Pull `user:pass@` out of the URL so it can be sent as a Basic header
fn split_userinfo(url: &str) -> FcmResult<(Url, Option<(String, Option<String>)>)> {
    let mut parsed =
        Url::parse(url).map_err(|e| FcmError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.username().is_empty() {
        return Ok((parsed, None));
    }

    let username = parsed.username().to_string();
    let password = parsed.password().map(str::to_string);
    parsed
        .set_password(None)
        .and_then(|_| parsed.set_username(""))
        .map_err(|_| FcmError::InvalidUrl(format!("{}: cannot strip credentials", url)))?;

    Ok((parsed, Some((username, password))))
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
