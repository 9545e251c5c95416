// Feature polling error types and constants

use crate::error::ErrorCode;
use crate::features::FeatureKind;
use log::error;
use std::fmt;

/// Feature error code constants
///
/// Error code range: 3001-3004
pub struct FeatureErrorCodes;

impl FeatureErrorCodes {
    /// Request never reached or never returned from the server
    pub const TRANSPORT: i32 = 3001;

    /// Server answered with a non-2xx status
    pub const SERVER_STATUS: i32 = 3002;

    /// Server answered 2xx with an explicit `error` field
    pub const REMOTE_FEATURE: i32 = 3003;

    /// Response body could not be decoded as JSON
    pub const MALFORMED_BODY: i32 = 3004;
}

/// Log a feature error with structured context
///
/// Errors are logged and swallowed by the driver; they never halt the
/// animation loop.
pub fn log_feature_error(err: &FeatureError, kind: FeatureKind, index: u64) {
    error!(
        "Feature error in {} poll: code={}, index={}, message={}",
        kind,
        err.code(),
        index,
        err.message()
    );
}

/// Errors surfaced by a feature fetch
///
/// None of these advance the stream's index counter.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// No response from the server (connection refused, reset, DNS, ...)
    Transport { details: String },

    /// Non-2xx HTTP status
    ServerStatus { status: u16, reason: String },

    /// Well-formed body carrying an explicit error, e.g. index out of range
    RemoteFeature { message: String },

    /// Body was not valid JSON
    MalformedBody { details: String },
}

impl FeatureError {
    /// Failures that say something about the requested index rather than the
    /// connection. Only these count towards the stall guard.
    pub fn is_index_failure(&self) -> bool {
        matches!(
            self,
            FeatureError::ServerStatus { .. } | FeatureError::RemoteFeature { .. }
        )
    }
}

impl ErrorCode for FeatureError {
    fn code(&self) -> i32 {
        match self {
            FeatureError::Transport { .. } => FeatureErrorCodes::TRANSPORT,
            FeatureError::ServerStatus { .. } => FeatureErrorCodes::SERVER_STATUS,
            FeatureError::RemoteFeature { .. } => FeatureErrorCodes::REMOTE_FEATURE,
            FeatureError::MalformedBody { .. } => FeatureErrorCodes::MALFORMED_BODY,
        }
    }

    fn message(&self) -> String {
        match self {
            FeatureError::Transport { details } => format!("Transport failure: {}", details),
            FeatureError::ServerStatus { status, reason } => {
                format!("Server responded with {}: {}", status, reason)
            }
            FeatureError::RemoteFeature { message } => format!("Error from server: {}", message),
            FeatureError::MalformedBody { details } => {
                format!("Malformed response body: {}", details)
            }
        }
    }
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeatureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FeatureError {}

impl From<reqwest::Error> for FeatureError {
    fn from(err: reqwest::Error) -> Self {
        FeatureError::Transport {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FeatureError {
    fn from(err: serde_json::Error) -> Self {
        FeatureError::MalformedBody {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_in_range() {
        let errors = [
            FeatureError::Transport {
                details: "refused".into(),
            },
            FeatureError::ServerStatus {
                status: 404,
                reason: "Not Found".into(),
            },
            FeatureError::RemoteFeature {
                message: "index not found".into(),
            },
            FeatureError::MalformedBody {
                details: "eof".into(),
            },
        ];

        let codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![3001, 3002, 3003, 3004]);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = FeatureError::RemoteFeature {
            message: "index not found".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("3003"));
        assert!(rendered.contains("index not found"));
    }

    #[test]
    fn only_status_and_remote_errors_count_as_index_failures() {
        assert!(FeatureError::ServerStatus {
            status: 500,
            reason: "Internal Server Error".into()
        }
        .is_index_failure());
        assert!(FeatureError::RemoteFeature {
            message: "out of range".into()
        }
        .is_index_failure());
        assert!(!FeatureError::Transport {
            details: "refused".into()
        }
        .is_index_failure());
        assert!(!FeatureError::MalformedBody {
            details: "eof".into()
        }
        .is_index_failure());
    }

    #[test]
    fn json_errors_map_to_malformed_body() {
        let err: FeatureError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), FeatureErrorCodes::MALFORMED_BODY);
    }
}
