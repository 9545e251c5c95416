// Types module - feature kinds, samples and response-body parsing

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FeatureError;

/// Which server stream a request belongs to.
///
/// Each kind keeps its own index counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// `/get_zcr/{index}` -> `{ "zcr": f }`
    Zcr,
    /// `/get_dom_freq/{index}` -> `{ "freq": f }`
    DominantFrequency,
    /// `/get_features/{index}` -> `{ "zcr": f, "rms": f }`
    Features,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::Zcr,
        FeatureKind::DominantFrequency,
        FeatureKind::Features,
    ];

    /// Request path for an index, relative to the server base URL.
    pub fn path(self, index: u64) -> String {
        match self {
            FeatureKind::Zcr => format!("/get_zcr/{}", index),
            FeatureKind::DominantFrequency => format!("/get_dom_freq/{}", index),
            FeatureKind::Features => format!("/get_features/{}", index),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Zcr => "zcr",
            FeatureKind::DominantFrequency => "dom_freq",
            FeatureKind::Features => "features",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded server response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    pub kind: FeatureKind,
    pub index: u64,
    /// Zero-crossing rate, normally within [0, 1]
    pub zcr: Option<f32>,
    /// RMS energy of the frame
    pub rms: Option<f32>,
    /// Most energetic FFT bin in Hz
    pub dominant_frequency: Option<f32>,
}

impl FeatureSample {
    pub fn zcr(index: u64, zcr: f32) -> Self {
        Self {
            kind: FeatureKind::Zcr,
            index,
            zcr: Some(zcr),
            rms: None,
            dominant_frequency: None,
        }
    }

    pub fn dominant_frequency(index: u64, freq: f32) -> Self {
        Self {
            kind: FeatureKind::DominantFrequency,
            index,
            zcr: None,
            rms: None,
            dominant_frequency: Some(freq),
        }
    }

    pub fn features(index: u64, zcr: f32, rms: f32) -> Self {
        Self {
            kind: FeatureKind::Features,
            index,
            zcr: Some(zcr),
            rms: Some(rms),
            dominant_frequency: None,
        }
    }
}

fn number(body: &Value, field: &str) -> Option<f32> {
    body.get(field).and_then(Value::as_f64).map(|v| v as f32)
}

/// Decode a 2xx response body for `kind`.
///
/// Expected fields win over an `error` field. A body with neither yields
/// `Ok(None)`.
pub fn parse_body(
    kind: FeatureKind,
    index: u64,
    body: &Value,
) -> Result<Option<FeatureSample>, FeatureError> {
    let sample = match kind {
        FeatureKind::Zcr => number(body, "zcr").map(|zcr| FeatureSample::zcr(index, zcr)),
        FeatureKind::DominantFrequency => {
            number(body, "freq").map(|freq| FeatureSample::dominant_frequency(index, freq))
        }
        FeatureKind::Features => match (number(body, "zcr"), number(body, "rms")) {
            (Some(zcr), Some(rms)) => Some(FeatureSample::features(index, zcr, rms)),
            _ => None,
        },
    };

    if sample.is_some() {
        return Ok(sample);
    }

    match body.get("error") {
        Some(Value::String(message)) => Err(FeatureError::RemoteFeature {
            message: message.clone(),
        }),
        Some(other) if !other.is_null() => Err(FeatureError::RemoteFeature {
            message: other.to_string(),
        }),
        _ => Ok(None),
    }
}
