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

//! Diagnostic logging for copyline binaries.
//!
//! Layout: `init.rs` (subscriber installation and log format selection),
//! `line_stream.rs` (broadcast sink for emitted lines).

pub mod init;
pub mod line_stream;

pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_env,
};
pub use line_stream::{LINE_STREAM_CAPACITY, LineStream};
