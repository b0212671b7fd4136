//! Build log sink.
//!
//! The premerge step emits human-readable progress messages to the build's
//! log. The sink is write-only: nothing in the engine consumes it back.

/// Write-only sink for human-readable build log output.
pub trait BuildLog: Send + Sync {
    /// Ordinary progress message.
    fn message(&self, text: &str);

    /// Recoverable-problem message.
    fn warning(&self, text: &str);

    /// Failure message.
    fn error(&self, text: &str);
}

/// Sink that discards everything. Useful for tests and embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl BuildLog for NullLog {
    fn message(&self, _text: &str) {}
    fn warning(&self, _text: &str) {}
    fn error(&self, _text: &str) {}
}
