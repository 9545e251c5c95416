//! Recorded feature source.
//!
//! The analysis server appends every answered index to a `features.json` dump
//! (`[{ "index": 0, "zcr": 0.04, "rms": 0.01 }, ...]`). Replaying that file
//! through [`FixtureSource`] drives the visualizer deterministically without a
//! live server, answering each kind exactly the way the server routes do.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::parse_body;
use super::{FeatureKind, FeatureSource, FetchResult};
use crate::error::FeatureError;

/// One entry of a features dump.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zcr: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rms: Option<f32>,
    #[serde(
        default,
        alias = "dom_freq",
        alias = "dominant_frequency",
        skip_serializing_if = "Option::is_none"
    )]
    pub freq: Option<f32>,
}

impl FixtureRecord {
    /// Response body the server would have produced for this record.
    fn body(&self) -> Value {
        let mut map = Map::new();
        if let Some(zcr) = self.zcr {
            map.insert("zcr".into(), Value::from(zcr as f64));
        }
        if let Some(rms) = self.rms {
            map.insert("rms".into(), Value::from(rms as f64));
        }
        if let Some(freq) = self.freq {
            map.insert("freq".into(), Value::from(freq as f64));
        }
        Value::Object(map)
    }
}

/// In-memory replay of a features dump.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    records: Arc<BTreeMap<u64, FixtureRecord>>,
}

impl FixtureSource {
    pub fn new(records: impl IntoIterator<Item = FixtureRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.index, r)).collect();
        Self {
            records: Arc::new(records),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<FixtureRecord> =
            serde_json::from_str(json).context("parsing features dump")?;
        Ok(Self::new(records))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let source = Self::from_json_str(&contents)
            .with_context(|| format!("loading fixture {}", path.display()))?;
        log::info!(
            "[Fixture] Loaded {} records from {:?}",
            source.len(),
            path
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Answer a request synchronously.
    pub fn answer(&self, kind: FeatureKind, index: u64) -> FetchResult {
        match self.records.get(&index) {
            Some(record) => parse_body(kind, index, &record.body()),
            None => Err(FeatureError::RemoteFeature {
                message: format!(
                    "Index {} is out of range or no features available",
                    index
                ),
            }),
        }
    }
}

impl FeatureSource for FixtureSource {
    fn fetch(&self, kind: FeatureKind, index: u64) -> BoxFuture<'static, FetchResult> {
        future::ready(self.answer(kind, index)).boxed()
    }
}
