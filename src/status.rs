//! Progress reporting and cooperative cancellation for parallel transforms.
//!
//! Workers never report individual pixels. They accumulate progress locally
//! and push it through [`StatusMonitor::add`] in batches of at least
//! [`StatusMonitor::granularity`] pixels, so the shared counter sees little
//! contention.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::WarpError;

/// Default number of pixels between two progress reports.
pub const DEFAULT_GRANULARITY: usize = 65536;

/// Receives progress notifications. Returning `false` requests cancellation.
pub trait StatusCallback: Send + Sync {
    fn report(&self, done: usize, total: usize) -> bool;
}

impl<F> StatusCallback for F
where
    F: Fn(usize, usize) -> bool + Send + Sync,
{
    fn report(&self, done: usize, total: usize) -> bool {
        self(done, total)
    }
}

/// Shared progress counter with an optional callback.
pub struct StatusMonitor {
    callback: Option<Arc<dyn StatusCallback>>,
    count: AtomicUsize,
    total: AtomicUsize,
    cancelled: AtomicBool,
    granularity: usize,
}

impl StatusMonitor {
    pub fn new() -> Self {
        Self {
            callback: None,
            count: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            granularity: DEFAULT_GRANULARITY,
        }
    }

    pub fn with_callback(mut self, callback: Arc<dyn StatusCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Minimum number of pixels a worker accumulates before reporting.
    pub fn with_granularity(mut self, pixels: usize) -> Self {
        self.granularity = pixels.max(1);
        self
    }

    pub fn granularity(&self) -> usize {
        self.granularity
    }

    /// Reset the counter for a new process of `total` units. A pending
    /// cancellation is kept; see [`StatusMonitor::reset`].
    pub fn initialize(&self, total: usize) {
        self.count.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Clear the counters and any cancellation request.
    pub fn reset(&self) {
        self.initialize(0);
        self.cancelled.store(false, Ordering::Release);
    }

    /// Add `n` processed units and notify the callback.
    ///
    /// Fails with [`WarpError::Cancelled`] once cancellation has been requested,
    /// either by the callback or through [`StatusMonitor::cancel`].
    pub fn add(&self, n: usize) -> Result<(), WarpError> {
        if self.is_cancelled() {
            return Err(WarpError::Cancelled);
        }
        let done = self.count.fetch_add(n, Ordering::Relaxed) + n;
        if let Some(callback) = &self.callback {
            if !callback.report(done, self.total()) {
                self.cancel();
                return Err(WarpError::Cancelled);
            }
        }
        Ok(())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for StatusMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StatusMonitor {
    /// The clone shares the callback but starts with fresh counters.
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            count: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            granularity: self.granularity,
        }
    }
}

impl fmt::Debug for StatusMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusMonitor")
            .field("count", &self.count())
            .field("total", &self.total())
            .field("cancelled", &self.is_cancelled())
            .field("granularity", &self.granularity)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Per-worker progress accumulator flushing into a [`StatusMonitor`].
pub struct ProgressBatch<'a> {
    monitor: &'a StatusMonitor,
    pending: usize,
}

impl<'a> ProgressBatch<'a> {
    pub fn new(monitor: &'a StatusMonitor) -> Self {
        Self { monitor, pending: 0 }
    }

    /// Record `n` processed units, flushing when the batch is full.
    pub fn advance(&mut self, n: usize) -> Result<(), WarpError> {
        if self.monitor.is_cancelled() {
            return Err(WarpError::Cancelled);
        }
        self.pending += n;
        if self.pending >= self.monitor.granularity() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), WarpError> {
        if self.pending > 0 {
            let n = std::mem::take(&mut self.pending);
            self.monitor.add(n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_without_callback() {
        let m = StatusMonitor::new();
        m.initialize(100);
        m.add(40).unwrap();
        m.add(60).unwrap();
        assert_eq!(m.count(), 100);
        assert_eq!(m.total(), 100);
        assert!(!m.is_cancelled());
    }

    #[test]
    fn test_callback_cancels() {
        let m = StatusMonitor::new().with_callback(Arc::new(|done: usize, _total: usize| done < 50));
        m.initialize(100);
        assert!(m.add(30).is_ok());
        let err = m.add(30).unwrap_err();
        assert!(err.is_cancelled());
        assert!(m.is_cancelled());
        // Further updates keep failing
        assert!(m.add(1).is_err());
    }

    #[test]
    fn test_initialize_keeps_pending_cancellation() {
        let m = StatusMonitor::new();
        m.cancel();
        m.initialize(10);
        assert!(m.is_cancelled());
        assert!(m.add(1).is_err());

        m.reset();
        assert!(!m.is_cancelled());
        m.initialize(10);
        assert!(m.add(1).is_ok());
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_batch_flushes_at_granularity() {
        let m = StatusMonitor::new().with_granularity(10);
        m.initialize(100);
        let mut batch = ProgressBatch::new(&m);
        for _ in 0..4 {
            batch.advance(3).unwrap();
        }
        // 12 >= 10 flushed once after the fourth advance
        assert_eq!(m.count(), 12);
        batch.advance(3).unwrap();
        assert_eq!(m.count(), 12);
        batch.flush().unwrap();
        assert_eq!(m.count(), 15);
    }
}
