#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Single-line, copy-friendly log formatting.
//!
//! Layout: `payload.rs` (payload classification and adapter traits),
//! `render.rs` (line rendering), `sink.rs` (output channels), `config.rs`
//! (formatter settings), `formatter.rs` (`LogFormatter` and `copyable_log`).

pub mod config;
pub mod error;
pub mod formatter;
pub mod payload;
pub mod render;
pub mod sink;

pub use config::{FormatterConfig, LineMode, SinkKind};
pub use error::{ConfigError, ConfigResult, FormatError, FormatResult};
pub use formatter::{LogFormatter, copyable_log};
pub use payload::{IntoPayload, KeyedEntries, MapKey, Payload, Scalar};
pub use render::{escape_line, render_line, render_payload};
pub use sink::{ConsoleSink, LineSink, MemorySink, TracingSink};
