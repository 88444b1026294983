//! Concurrency probe: tracks how many work functions run at the same time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use taskdag::Task;

#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest number of simultaneously running bodies observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Number of bodies that ran to completion.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Task that holds a slot for `hold` while being counted.
    pub fn task(&self, id: &str, hold: Duration) -> Task<usize> {
        let probe = self.clone();
        Task::new(id, move |_ctx, _inputs| {
            let probe = probe.clone();
            async move {
                let now = probe.current.fetch_add(1, Ordering::SeqCst) + 1;
                probe.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(hold).await;
                probe.current.fetch_sub(1, Ordering::SeqCst);
                probe.total.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(now)
            }
        })
    }
}
