//! Formatter configuration loaded from defaults, the environment, or a JSON
//! configuration document.
//!
//! # Design
//! - Every field has a default so partial documents are accepted.
//! - Environment parsing never fails; bad values are logged and replaced by defaults.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Placeholder emitted when a payload cannot be rendered.
pub const DEFAULT_PLACEHOLDER: &str = "<unserializable>";

/// Environment variable selecting the output sink.
pub const ENV_SINK: &str = "COPYLINE_SINK";
/// Environment variable overriding the placeholder token.
pub const ENV_PLACEHOLDER: &str = "COPYLINE_PLACEHOLDER";
/// Environment flag enabling [`LineMode::Escaped`].
pub const ENV_ESCAPE: &str = "COPYLINE_ESCAPE";

/// Key of the formatter section inside a larger configuration document.
const CONFIG_SECTION: &str = "copyline";

/// Formatter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    /// Token substituted for payloads that cannot be rendered.
    pub placeholder: String,
    /// How line terminators inside labels and text payloads are treated.
    pub line_mode: LineMode,
    /// Destination for emitted lines.
    pub sink: SinkKind,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            line_mode: LineMode::Verbatim,
            sink: SinkKind::Stdout,
        }
    }
}

impl FormatterConfig {
    /// Build configuration from `COPYLINE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(ENV_SINK).ok().as_deref(),
            std::env::var(ENV_PLACEHOLDER).ok(),
            std::env::var(ENV_ESCAPE).ok().as_deref(),
        )
    }

    /// Build configuration from raw string values.
    #[must_use]
    pub fn from_values(sink: Option<&str>, placeholder: Option<String>, escape: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = sink {
            match raw.parse::<SinkKind>() {
                Ok(kind) => config.sink = kind,
                Err(err) => warn!(error = %err, value = raw, "ignoring sink selector"),
            }
        }
        if let Some(placeholder) = placeholder.filter(|value| !value.is_empty()) {
            config.placeholder = placeholder;
        }
        if env_flag_value(escape) {
            config.line_mode = LineMode::Escaped;
        }
        config
    }

    /// Read the `copyline` section of a configuration document.
    ///
    /// A missing document or section yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSection`] if the section has unknown
    /// fields or values of the wrong type.
    pub fn from_json(document: Option<&Value>) -> ConfigResult<Self> {
        document
            .and_then(|value| value.get(CONFIG_SECTION))
            .map_or_else(
                || Ok(Self::default()),
                |section| {
                    Self::deserialize(section)
                        .map_err(|source| ConfigError::InvalidSection { source })
                },
            )
    }
}

/// Treatment of line terminators in labels and text payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMode {
    /// Emit text exactly as given.
    #[default]
    Verbatim,
    /// Escape control characters so the line can never split.
    Escaped,
}

/// Sink selector used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// `tracing` events at info level.
    Tracing,
}

impl SinkKind {
    /// Stable name used in configuration and flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Tracing => "tracing",
        }
    }
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "tracing" => Ok(Self::Tracing),
            _ => Err(ConfigError::InvalidSink {
                value: value.to_string(),
            }),
        }
    }
}

/// Interpret a flag value; only `1`, `true`, `yes` and `on` (any case) enable it.
#[must_use]
pub fn env_flag_value(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
