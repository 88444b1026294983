//! Small constructors for tasks used across the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use taskdag::{Inputs, Task};

/// Shared, ordered log of task ids, appended when a work function starts.
#[derive(Debug, Clone, Default)]
pub struct StartLog(Arc<Mutex<Vec<String>>>);

impl StartLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &str) {
        self.0.lock().unwrap().push(id.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.lock().unwrap().iter().any(|x| x == id)
    }

    /// Position of `id` in the log. Panics if absent.
    pub fn position(&self, id: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .position(|x| x == id)
            .unwrap_or_else(|| panic!("task {id} never started"))
    }
}

/// Task that returns `value`.
pub fn const_task<T>(id: &str, value: T) -> Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    Task::new(id, move |_ctx, _inputs| {
        let value = value.clone();
        async move { anyhow::Ok(value) }
    })
}

/// Task that records its start in `log` and returns `value`.
pub fn logged_task<T>(id: &str, value: T, log: &StartLog) -> Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    let log = log.clone();
    let name = id.to_string();
    Task::new(id, move |_ctx, _inputs| {
        log.record(&name);
        let value = value.clone();
        async move { anyhow::Ok(value) }
    })
}

/// Task whose result is the sum of its inputs plus `own`.
pub fn sum_task(id: &str, own: i64) -> Task<i64> {
    Task::new(id, move |_ctx, inputs: Inputs<i64>| async move {
        anyhow::Ok(own + inputs.values().sum::<i64>())
    })
}

/// Task that fails with `message`.
pub fn failing_task<T>(id: &str, message: &str) -> Task<T>
where
    T: Send + Sync + 'static,
{
    let message = message.to_string();
    Task::new(id, move |_ctx, _inputs| {
        let message = message.clone();
        async move { Err::<T, _>(anyhow!(message)) }
    })
}

/// Task that waits for `delay` (or cancellation) and counts invocations.
///
/// Returns an error if the context was cancelled first.
pub fn slow_task<T>(id: &str, delay: Duration, value: T, calls: Arc<AtomicUsize>) -> Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    Task::new(id, move |ctx, _inputs| {
        calls.fetch_add(1, Ordering::SeqCst);
        let value = value.clone();
        async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => Ok(value),
                _ = ctx.cancelled() => Err(anyhow!("cancelled")),
            }
        }
    })
}
