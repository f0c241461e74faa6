//! Rendering of classified payloads into copyable lines.

use crate::config::{FormatterConfig, LineMode};
use crate::error::{FormatError, FormatResult};
use crate::payload::{KeyedEntries, Payload, Scalar};

/// Render `label` and `payload` into `[label] <payload>`.
///
/// # Errors
///
/// Returns a [`FormatError`] if the payload cannot be serialized.
pub fn render_line(label: &str, payload: &Payload, config: &FormatterConfig) -> FormatResult<String> {
    let body = render_payload(payload)?;
    // Structured bodies are JSON and already single-line.
    let escape_body = matches!(payload, Payload::Scalar(_));
    Ok(compose(label, &body, config.line_mode, escape_body))
}

/// Render only the payload portion of a line.
///
/// # Errors
///
/// Returns [`FormatError::Serialize`] if the structured serializer fails.
pub fn render_payload(payload: &Payload) -> FormatResult<String> {
    match payload {
        Payload::KeyedMap(entries) => render_keyed(entries),
        Payload::Structured(value) => {
            serde_json::to_string(value).map_err(|source| FormatError::Serialize { source })
        }
        Payload::Scalar(scalar) => Ok(render_scalar(scalar)),
    }
}

/// Join the label and an already-rendered body.
pub(crate) fn compose(label: &str, body: &str, mode: LineMode, escape_body: bool) -> String {
    match mode {
        LineMode::Verbatim => format!("[{label}] {body}"),
        LineMode::Escaped if escape_body => {
            format!("[{}] {}", escape_line(label), escape_line(body))
        }
        LineMode::Escaped => format!("[{}] {body}", escape_line(label)),
    }
}

fn render_keyed(entries: &KeyedEntries) -> FormatResult<String> {
    let mut out = String::from("{");
    for (idx, (key, value)) in entries.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let key = serde_json::to_string(key).map_err(|source| FormatError::Serialize { source })?;
        let value =
            serde_json::to_string(value).map_err(|source| FormatError::Serialize { source })?;
        out.push_str(&key);
        out.push(':');
        out.push_str(&value);
    }
    out.push('}');
    Ok(out)
}

/// Floats use Rust's `Display`: `NaN`, `inf`, `-inf`, and no exponent form.
fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(flag) => flag.to_string(),
        Scalar::Number(number) => number.to_string(),
        Scalar::Float(value) => value.to_string(),
        Scalar::Text(text) => text.clone(),
    }
}

/// Escape line terminators and other control characters.
#[must_use]
pub fn escape_line(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:04X}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}
