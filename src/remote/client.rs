use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use reqwest::Url;
use std::time::Duration;

use super::outcome::{RemoteFailure, RemoteOutcome};

pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteMethod::Get => write!(f, "GET"),
            RemoteMethod::Post => write!(f, "POST"),
            RemoteMethod::Put => write!(f, "PUT"),
            RemoteMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// One call against the remote API, relative to its base URL.
///
/// `segments` are raw path segments; each is percent-encoded on its own, so an
/// id such as `a/b?x=1` stays one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: RemoteMethod,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RemoteRequest {
    fn new(method: RemoteMethod, path: &str) -> Self {
        Self {
            method,
            segments: path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(RemoteMethod::Get, path)
    }

    pub fn post(path: &str, body: Value) -> Self {
        Self::new(RemoteMethod::Post, path).body(body)
    }

    pub fn put(path: &str, body: Value) -> Self {
        Self::new(RemoteMethod::Put, path).body(body)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(RemoteMethod::Delete, path)
    }

    /// Append one opaque segment, e.g. an entity id
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The remote aggregation API
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Single attempt. Every failure comes back as `RemoteOutcome::Failure`.
    async fn send(&self, request: RemoteRequest) -> RemoteOutcome<Value>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpRemoteBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpRemoteBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid remote base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("remote base URL cannot carry a path: {base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build remote HTTP client")?;

        Ok(Self { base_url, client })
    }

    fn url(&self, segments: &[String]) -> Result<Url, RemoteFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteFailure::Transport(format!("remote base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl RemoteBackend for HttpRemoteBackend {
    async fn send(&self, request: RemoteRequest) -> RemoteOutcome<Value> {
        let url = match self.url(&request.segments) {
            Ok(url) => url,
            Err(failure) => return RemoteOutcome::Failure(failure),
        };
        let builder = match request.method {
            RemoteMethod::Get => self.client.get(url.clone()),
            RemoteMethod::Post => self.client.post(url.clone()),
            RemoteMethod::Put => self.client.put(url.clone()),
            RemoteMethod::Delete => self.client.delete(url.clone()),
        };
        let builder = builder.query(&request.query);
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        tracing::debug!(method = %request.method, url = %url, "Calling remote backend");

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => return RemoteOutcome::Failure(RemoteFailure::Transport(e.to_string())),
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return RemoteOutcome::Failure(RemoteFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        match resp.json::<Value>().await {
            Ok(body) => RemoteOutcome::Success(body),
            Err(e) => RemoteOutcome::Failure(RemoteFailure::MalformedBody(e.to_string())),
        }
    }
}
