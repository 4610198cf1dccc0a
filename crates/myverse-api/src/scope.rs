use std::future::Future;
use std::sync::Mutex;

use tokio::task::{AbortHandle, JoinHandle};

/// Owns the background requests of one view.
///
/// Dropping the scope (view teardown) aborts every task still running, so a
/// late response can never write into state the view no longer shows.
pub struct ViewScope {
    name: String,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ViewScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(fut);
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle.abort_handle());
        handle
    }

    /// Tasks spawned in this scope that have not finished.
    pub fn active(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }

    /// Abort everything without dropping the scope.
    pub fn cancel_all(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        if !tasks.is_empty() {
            tracing::debug!(view = %self.name, count = tasks.len(), "aborting view requests");
        }
        for task in tasks {
            task.abort();
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
