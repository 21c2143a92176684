// src/progress.rs
/// Lightweight progress reporting for long-running ingestion runs.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of jurisdictions in the run.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One jurisdiction finished and its snapshot was written.
    fn item_done(&mut self, _jurisdiction: &str) {}

    /// One jurisdiction failed; nothing was written for it.
    fn item_failed(&mut self, _jurisdiction: &str, _msg: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
