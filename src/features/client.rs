//! HTTP feature client.
//!
//! Plain GET per index with no timeout or retry of its own; the driver decides
//! when to ask again.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use super::types::parse_body;
use super::{FeatureKind, FeatureSource, FetchResult};
use crate::error::FeatureError;

/// Feature source backed by the analysis server's REST routes.
#[derive(Debug, Clone)]
pub struct HttpFeatureClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFeatureClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, kind: FeatureKind, index: u64) -> String {
        format!("{}{}", self.base_url, kind.path(index))
    }
}

async fn fetch_once(
    http: reqwest::Client,
    url: String,
    kind: FeatureKind,
    index: u64,
) -> FetchResult {
    let response = http.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeatureError::ServerStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }

    let bytes = response.bytes().await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    let sample = parse_body(kind, index, &body)?;

    if let Some(sample) = &sample {
        log::debug!("[FeatureClient] {} #{} -> {:?}", kind, index, sample);
    }
    Ok(sample)
}

impl FeatureSource for HttpFeatureClient {
    fn fetch(&self, kind: FeatureKind, index: u64) -> BoxFuture<'static, FetchResult> {
        fetch_once(self.http.clone(), self.url_for(kind, index), kind, index).boxed()
    }
}
