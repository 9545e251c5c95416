// Features module - typed audio descriptors polled from the analysis server
//
// Module organization:
// - types: FeatureKind, FeatureSample and wire-body parsing
// - client: HTTP implementation of FeatureSource
// - fixture: replay of a recorded features.json dump
// - history: bounded RMS window used by the metallic/water-ink rule
//
// Every source answers the same per-index contract, so the driver can poll
// a live server or a recording without knowing which one it talks to.

mod client;
mod fixture;
mod history;
mod types;

pub use client::HttpFeatureClient;
pub use fixture::{FixtureRecord, FixtureSource};
pub use history::{FeatureHistory, HISTORY_CAPACITY};
pub use types::{parse_body, FeatureKind, FeatureSample};

use futures::future::BoxFuture;

use crate::error::FeatureError;

/// Result of a single fetch.
///
/// `Ok(None)` is a 2xx body that carried neither the expected field nor an
/// `error` field; the sample is dropped and the index is not advanced.
pub type FetchResult = Result<Option<FeatureSample>, FeatureError>;

/// Per-index feature provider.
///
/// Returned futures own everything they need so the driver can keep any
/// number of them in flight while it keeps mutating its own state.
pub trait FeatureSource {
    fn fetch(&self, kind: FeatureKind, index: u64) -> BoxFuture<'static, FetchResult>;
}
