//! Broadcast stream of emitted copyable lines.
//!
//! # Design
//! - Each emitted line is sent as one message on a bounded broadcast channel.
//! - Sending never blocks; slow receivers observe `Lagged` and skip ahead.
//! - An optional mirror sink keeps the lines visible on the console as well.

use std::io;
use std::sync::Arc;

use copyline_core::LineSink;
use tokio::sync::broadcast;

/// Default number of lines buffered for lagging receivers.
pub const LINE_STREAM_CAPACITY: usize = 1024;

/// Sink that fans emitted lines out to any number of subscribers.
#[derive(Clone)]
pub struct LineStream {
    sender: broadcast::Sender<String>,
    mirror: Option<Arc<dyn LineSink>>,
}

impl Default for LineStream {
    fn default() -> Self {
        Self::new(LINE_STREAM_CAPACITY)
    }
}

impl LineStream {
    /// Create a stream buffering up to `capacity` lines (minimum one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity.max(1)).0,
            mirror: None,
        }
    }

    /// Also write every line to `mirror`.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn LineSink>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Subscribe to lines emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl LineSink for LineStream {
    fn emit_line(&self, line: &str) -> io::Result<()> {
        if let Some(mirror) = &self.mirror {
            mirror.emit_line(line)?;
        }
        // No subscribers is not an error for a diagnostic stream.
        let _ = self.sender.send(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copyline_core::{FormatterConfig, LogFormatter, MemorySink};
    use serde_json::json;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn subscribers_receive_formatted_lines() -> Result<(), RecvError> {
        let stream = LineStream::default();
        let mut receiver = stream.subscribe();
        let formatter = LogFormatter::new(FormatterConfig::default(), Arc::new(stream.clone()));

        let line = formatter.format("Counts", json!({"a": 1}));
        assert_eq!(receiver.recv().await?, line);
        assert_eq!(line, r#"[Counts] {"a":1}"#);
        Ok(())
    }

    #[test]
    fn emitting_without_subscribers_succeeds() -> io::Result<()> {
        let stream = LineStream::new(4);
        assert_eq!(stream.receiver_count(), 0);
        stream.emit_line("[Init] ready")
    }

    #[test]
    fn mirror_receives_every_line() -> io::Result<()> {
        let mirror = Arc::new(MemorySink::new());
        let stream = LineStream::new(4).with_mirror(mirror.clone());
        stream.emit_line("[a] 1")?;
        stream.emit_line("[b] 2")?;
        assert_eq!(mirror.lines(), vec!["[a] 1".to_string(), "[b] 2".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn lagging_receiver_skips_ahead() -> io::Result<()> {
        let stream = LineStream::new(2);
        let mut receiver = stream.subscribe();
        for idx in 0..5 {
            stream.emit_line(&format!("[n] {idx}"))?;
        }
        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(receiver.recv().await.ok().as_deref(), Some("[n] 3"));
        Ok(())
    }
}
