//! Progress reporting
//!
//! Each run receives its own sink; nothing is shared between concurrent
//! requests.

use tracing::info;

pub trait ProgressSink {
    /// `percent` is in 0..=100
    fn update(&mut self, message: &str, percent: u8);
}

impl<F> ProgressSink for F
where
    F: FnMut(&str, u8),
{
    fn update(&mut self, message: &str, percent: u8) {
        (*self)(message, percent)
    }
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _message: &str, _percent: u8) {}
}

/// Logs every update at INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn update(&mut self, message: &str, percent: u8) {
        info!(percent, "{}", message);
    }
}

/// Clamps percentages so the reported value never goes down or past 100
#[derive(Debug, Clone)]
pub struct MonotonicProgress<S> {
    inner: S,
    last: u8,
}

impl<S: ProgressSink> MonotonicProgress<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, last: 0 }
    }

    pub fn last_percent(&self) -> u8 {
        self.last
    }
}

impl<S: ProgressSink> ProgressSink for MonotonicProgress<S> {
    fn update(&mut self, message: &str, percent: u8) {
        self.last = self.last.max(percent.min(100));
        self.inner.update(message, self.last);
    }
}

/// Percentage `done/total` of the way from `from` to `to`
pub(crate) fn scaled(from: u8, to: u8, done: usize, total: usize) -> u8 {
    if total == 0 || to <= from {
        return from;
    }
    let span = (to - from) as usize;
    from + (span * done.min(total) / total) as u8
}
