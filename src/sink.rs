// src/sink.rs

//! Destinations for the payload's relayed output.
//!
//! Every line the payload prints is handed to a [`LogSink`] together with the
//! configured tag. The rendered form is always `"<tag> <line>"`.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::info;

/// Append-only sink for relayed output lines.
pub trait LogSink: Send + Sync {
    fn forward(&self, tag: &str, line: &str);
}

/// Render a relayed line the way every sink writes it.
pub fn format_line(tag: &str, line: &str) -> String {
    format!("{tag} {line}")
}

/// Writes relayed lines to stdout.
///
/// Our own logs go to stderr, so stdout carries nothing but payload output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn forward(&self, tag: &str, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the supervise loop down with it.
        let _ = writeln!(out, "{}", format_line(tag, line));
    }
}

/// Emits relayed lines as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn forward(&self, tag: &str, line: &str) {
        info!(target: "payload", "{}", format_line(tag, line));
    }
}

/// Keeps every rendered line in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything forwarded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn forward(&self, tag: &str, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format_line(tag, line));
    }
}
