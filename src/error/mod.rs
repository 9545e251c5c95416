// Error types for the particle visualizer
//
// This module defines the error taxonomy for feature polling, providing
// structured error handling with numeric codes suitable for telemetry and
// CLI reporting.

mod feature;

pub use feature::{log_feature_error, FeatureError, FeatureErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting across the
/// driver, telemetry, and CLI.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
