//! The copyable log formatter.
//!
//! # Design
//! - Classify, render, emit once, return the line.
//! - Failures never reach the caller: rendering errors become the configured
//!   placeholder and sink errors are logged.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::config::FormatterConfig;
use crate::payload::IntoPayload;
use crate::render;
use crate::sink::LineSink;

static DEFAULT_FORMATTER: Lazy<LogFormatter> = Lazy::new(|| {
    let config = FormatterConfig::from_env();
    debug!(sink = config.sink.as_str(), "initialising default copyline formatter");
    LogFormatter::from_config(config)
});

/// Format `label` and `payload` with the process-wide default formatter.
///
/// The default formatter is configured from `COPYLINE_*` environment
/// variables on first use.
pub fn copyable_log(label: &str, payload: impl IntoPayload) -> String {
    DEFAULT_FORMATTER.format(label, payload)
}

/// Renders labelled payloads into single-line strings and emits them.
#[derive(Clone)]
pub struct LogFormatter {
    config: FormatterConfig,
    sink: Arc<dyn LineSink>,
}

impl fmt::Debug for LogFormatter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LogFormatter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for LogFormatter {
    fn default() -> Self {
        Self::from_config(FormatterConfig::default())
    }
}

impl LogFormatter {
    /// Create a formatter writing to an explicit sink.
    #[must_use]
    pub fn new(config: FormatterConfig, sink: Arc<dyn LineSink>) -> Self {
        Self { config, sink }
    }

    /// Create a formatter writing to the sink named by `config.sink`.
    #[must_use]
    pub fn from_config(config: FormatterConfig) -> Self {
        let sink = config.sink.build();
        Self { config, sink }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Render the line, write it to the sink once, and return it.
    pub fn format(&self, label: &str, payload: impl IntoPayload) -> String {
        let line = self.render(label, payload);
        if let Err(err) = self.sink.emit_line(&line) {
            warn!(error = %err, label, "failed to emit copyable log line");
        }
        line
    }

    /// Render the line without emitting it.
    #[must_use]
    pub fn render(&self, label: &str, payload: impl IntoPayload) -> String {
        let rendered = payload
            .into_payload()
            .and_then(|payload| render::render_line(label, &payload, &self.config));
        match rendered {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, label, "payload could not be rendered; using placeholder");
                render::compose(label, &self.config.placeholder, self.config.line_mode, true)
            }
        }
    }
}
