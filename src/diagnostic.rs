//! Reporting channel for non-fatal problems hit while drawing or exporting.
//!
//! The image buffer owns a [`DiagnosticSink`] and hands it every event, so
//! callers choose whether diagnostics go to the log or get captured.

use std::{fmt::Display, path::PathBuf, sync::Mutex};

use log::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    TileOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    BlockOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    WriteFailed {
        path: PathBuf,
        reason: String,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::TileOutOfRange {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "Attempt to draw tile in out-of-range position {}, {}: the image buffer is only {} x {} pixels",
                x, y, width, height
            ),
            Diagnostic::BlockOutOfRange {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "Attempt to draw block in out-of-range position {}, {}: the image buffer is only {} x {} pixels",
                x, y, width, height
            ),
            Diagnostic::WriteFailed { path, reason } => {
                write!(f, "Unable to write {}: {}", path.display(), reason)
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade as a warning.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

/// Keeps diagnostics in memory until they are taken.
#[derive(Debug, Default)]
pub struct CollectDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned list is still a valid list.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DiagnosticSink for CollectDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_take() {
        let sink = CollectDiagnostics::new();
        sink.report(Diagnostic::TileOutOfRange {
            x: 1,
            y: 2,
            width: 8,
            height: 8,
        });
        assert_eq!(sink.len(), 1);
        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::BlockOutOfRange {
            x: 10,
            y: 4,
            width: 16,
            height: 16,
        };
        assert_eq!(
            d.to_string(),
            "Attempt to draw block in out-of-range position 10, 4: the image buffer is only 16 x 16 pixels"
        );
    }
}
