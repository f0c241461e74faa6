//! Argument parsing, payload decoding, and dispatch.

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::builder::{StringValueParser, TypedValueParser};
use copyline_core::config::{
    DEFAULT_PLACEHOLDER, ENV_ESCAPE, ENV_PLACEHOLDER, ENV_SINK, env_flag_value,
};
use copyline_core::{
    FormatterConfig, KeyedEntries, LineMode, LineSink, LogFormatter, Payload, Scalar, SinkKind,
};
use copyline_telemetry::{DEFAULT_LOG_LEVEL, LoggingConfig, init_logging};
use serde_json::Value;
use tracing::debug;

use crate::error::{CliError, CliResult};

const STDIN_MARKER: &str = "-";

/// Parses CLI arguments, emits the formatted line, and returns the process
/// exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli.log_level);

    let sink = cli.sink.build();
    let stdin = io::stdin();
    let result = execute(&cli, &mut stdin.lock(), sink);

    match result {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn install_logging(level: &str) {
    let config = LoggingConfig {
        level,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err:#}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "copyline",
    about = "Format a labelled value as a single copyable log line"
)]
pub(crate) struct Cli {
    /// Label rendered inside the leading brackets.
    label: String,
    /// Payload text; `-` or omitted reads standard input.
    payload: Option<String>,
    /// Treat the payload as a JSON document.
    #[arg(long, conflicts_with = "pairs")]
    json: bool,
    /// Treat the payload as a JSON array of `[key, value]` pairs.
    #[arg(long)]
    pairs: bool,
    /// Destination for the emitted line.
    #[arg(long, env = ENV_SINK, value_parser = parse_sink, default_value = "stdout")]
    sink: SinkKind,
    /// Escape control characters in the label and text payloads.
    #[arg(
        long,
        env = ENV_ESCAPE,
        action = clap::ArgAction::Set,
        value_parser = StringValueParser::new().map(|value| env_flag_value(Some(&value))),
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value = "false"
    )]
    escape: bool,
    /// Token emitted when the payload cannot be rendered.
    #[arg(long, env = ENV_PLACEHOLDER, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,
    /// Diagnostic log level used when `RUST_LOG` is unset.
    #[arg(long, env = "COPYLINE_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Cli {
    fn formatter_config(&self) -> FormatterConfig {
        FormatterConfig {
            placeholder: self.placeholder.clone(),
            line_mode: if self.escape {
                LineMode::Escaped
            } else {
                LineMode::Verbatim
            },
            sink: self.sink,
        }
    }

    const fn mode(&self) -> PayloadMode {
        if self.pairs {
            PayloadMode::Pairs
        } else if self.json {
            PayloadMode::Json
        } else {
            PayloadMode::Text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadMode {
    Text,
    Json,
    Pairs,
}

fn parse_sink(value: &str) -> Result<SinkKind, String> {
    value.parse::<SinkKind>().map_err(|_| {
        format!("unsupported sink '{value}' (expected stdout, stderr, or tracing)")
    })
}

/// Decode the payload, emit the line to `sink`, and return it.
pub(crate) fn execute(
    cli: &Cli,
    input: &mut dyn Read,
    sink: Arc<dyn LineSink>,
) -> CliResult<String> {
    let raw = match cli.payload.as_deref() {
        Some(STDIN_MARKER) | None => read_input(input)?,
        Some(text) => text.to_string(),
    };
    let mode = cli.mode();
    debug!(?mode, sink = cli.sink.as_str(), "formatting payload");

    let payload = decode_payload(&raw, mode)?;
    let formatter = LogFormatter::new(cli.formatter_config(), sink);
    Ok(formatter.format(&cli.label, payload))
}

fn read_input(input: &mut dyn Read) -> CliResult<String> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("failed to read payload from stdin")
        .map_err(CliError::failure)?;
    Ok(raw.trim_end_matches(['\r', '\n']).to_string())
}

fn decode_payload(raw: &str, mode: PayloadMode) -> CliResult<Payload> {
    match mode {
        PayloadMode::Text => Ok(Payload::Scalar(Scalar::Text(raw.to_string()))),
        PayloadMode::Json => serde_json::from_str::<Value>(raw)
            .map(Payload::from_value)
            .map_err(|err| CliError::validation(format!("payload is not valid JSON: {err}"))),
        PayloadMode::Pairs => decode_pairs(raw).map(Payload::KeyedMap),
    }
}

fn decode_pairs(raw: &str) -> CliResult<KeyedEntries> {
    let pairs: Vec<(Value, Value)> = serde_json::from_str(raw).map_err(|err| {
        CliError::validation(format!(
            "payload must be a JSON array of [key, value] pairs: {err}"
        ))
    })?;
    let mut entries = KeyedEntries::new();
    for (key, value) in pairs {
        let key = match key {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => {
                return Err(CliError::validation(format!(
                    "pair keys must be strings, numbers, or booleans (got {other})"
                )));
            }
        };
        entries.insert(key.as_str(), value);
    }
    Ok(entries)
}
