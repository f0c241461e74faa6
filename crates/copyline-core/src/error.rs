//! Error types for formatting and configuration.

use thiserror::Error;

/// Result alias for payload conversion and rendering.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result alias for configuration parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Raised when a payload cannot be rendered by either the structured
/// serializer or the to-string coercion.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The structured serializer rejected the value.
    #[error("failed to serialize structured payload")]
    Serialize {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The value's `Display` implementation reported an error.
    #[error("failed to render payload as text")]
    Display,
    /// A keyed-map entry value could not be serialized.
    #[error("failed to serialize keyed map entry")]
    MapEntry {
        /// Key text of the offending entry.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while reading formatter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sink selector was not one of the supported values.
    #[error("invalid sink selector")]
    InvalidSink {
        /// Sink value provided by the caller.
        value: String,
    },
    /// The `copyline` configuration section did not match the expected shape.
    #[error("invalid copyline configuration section")]
    InvalidSection {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
