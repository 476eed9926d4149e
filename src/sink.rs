//! Output targets for the status and results regions.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::render::Display;

/// Receives text updates for the UI regions.
///
/// Writes are independent: concurrent trigger cycles may interleave, and the
/// last write to a region wins.
pub trait UiSink: Send + Sync {
    /// Replaces the single-line status text.
    fn set_status(&self, text: &str);

    /// Replaces the results text. An empty string clears the region.
    fn set_results(&self, text: &str);

    /// Replaces the list of matched songs.
    fn set_matches(&self, _lines: &[String]) {}

    /// Writes a complete display in one go.
    fn show(&self, display: &Display) {
        self.set_status(&display.status);
        self.set_results(&display.results);
        self.set_matches(&display.matches);
    }
}

/// Line-oriented sink for non-interactive use.
///
/// Every status change is printed; results and matches only when non-empty.
pub struct StdoutSink<W: Write + Send> {
    out: Mutex<W>,
}

impl StdoutSink<std::io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl<W: Write + Send> StdoutSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consumes the sink, returning the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to output: {e}");
        }
    }
}

impl<W: Write + Send> UiSink for StdoutSink<W> {
    fn set_status(&self, text: &str) {
        self.write_line(text);
    }

    fn set_results(&self, text: &str) {
        if !text.is_empty() {
            self.write_line(text);
        }
    }

    fn set_matches(&self, lines: &[String]) {
        for line in lines {
            self.write_line(&format!("  {line}"));
        }
    }
}

/// Display state shared with the terminal screen, which redraws from snapshots.
#[derive(Clone, Default)]
pub struct SharedDisplay {
    inner: Arc<Mutex<Display>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current region contents.
    pub fn snapshot(&self) -> Display {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Display> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UiSink for SharedDisplay {
    fn set_status(&self, text: &str) {
        self.lock().status = text.to_string();
    }

    fn set_results(&self, text: &str) {
        self.lock().results = text.to_string();
    }

    fn set_matches(&self, lines: &[String]) {
        self.lock().matches = lines.to_vec();
    }
}
