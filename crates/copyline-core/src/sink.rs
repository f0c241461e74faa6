//! Line-oriented diagnostic sinks.
//!
//! # Design
//! - A sink receives one complete line per call and performs a single write.
//! - Console sinks hold the std handle lock for the write so concurrent lines
//!   never interleave.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::config::SinkKind;

/// Destination for rendered lines.
pub trait LineSink: Send + Sync {
    /// Write `line` followed by at most one line terminator.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the underlying channel rejects the write.
    fn emit_line(&self, line: &str) -> io::Result<()>;
}

/// Standard stream sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleSink {
    /// Process standard output.
    Stdout,
    /// Process standard error.
    Stderr,
}

impl LineSink for ConsoleSink {
    fn emit_line(&self, line: &str) -> io::Result<()> {
        match self {
            Self::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Self::Stderr => writeln!(io::stderr().lock(), "{line}"),
        }
    }
}

/// Sink forwarding each line as a single `tracing` info event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn emit_line(&self, line: &str) -> io::Result<()> {
        info!(target: "copyline", line, "copyable log line");
        Ok(())
    }
}

/// In-memory sink that retains every emitted line.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the lines emitted so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LineSink for MemorySink {
    fn emit_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

impl<S: LineSink + ?Sized> LineSink for Arc<S> {
    fn emit_line(&self, line: &str) -> io::Result<()> {
        (**self).emit_line(line)
    }
}

impl SinkKind {
    /// Construct the sink this selector names.
    #[must_use]
    pub fn build(self) -> Arc<dyn LineSink> {
        match self {
            Self::Stdout => Arc::new(ConsoleSink::Stdout),
            Self::Stderr => Arc::new(ConsoleSink::Stderr),
            Self::Tracing => Arc::new(TracingSink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn memory_sink_records_lines_in_order() -> io::Result<()> {
        let sink = MemorySink::new();
        sink.emit_line("[a] 1")?;
        sink.emit_line("[b] 2")?;
        assert_eq!(sink.lines(), vec!["[a] 1".to_string(), "[b] 2".to_string()]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.lines().is_empty());
        Ok(())
    }

    #[test]
    fn memory_sink_accepts_concurrent_writers() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for idx in 0..25 {
                        let _ = sink.emit_line(&format!("[w{worker}] {idx}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }
        assert_eq!(sink.lines().len(), 100);
    }

    #[test]
    fn console_and_tracing_sinks_accept_lines() -> io::Result<()> {
        ConsoleSink::Stderr.emit_line("[test] stderr")?;
        TracingSink.emit_line("[test] tracing")?;
        SinkKind::Tracing.build().emit_line("[test] built")?;
        Ok(())
    }
}
