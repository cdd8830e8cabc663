//! Tracks every task a subsystem spawns so the process can wait for them all
//! to finish on shutdown.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::error;

/// Owns the join handles for every task spawned under a given name.
pub struct TaskManager {
    name: String,
    handles: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl TaskManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), handles: std::sync::Mutex::new(Vec::new()) }
    }

    /// Spawn a future as a tracked task.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.handles.lock().expect("task manager lock poisoned").push(handle);
    }

    /// Await every tracked task, logging (not panicking on) any that
    /// panicked or was cancelled.
    pub async fn join(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock().expect("lock poisoned"));
        for handle in handles {
            if let Err(e) = handle.await {
                error!(target: "task_manager", manager = %self.name, error = %e, "task did not exit cleanly");
            }
        }
    }

    pub fn task_count(&self) -> usize {
        self.handles.lock().expect("lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test]
    async fn join_waits_for_all_spawned_tasks() {
        let manager = TaskManager::new("test");
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = counter.clone();
            manager.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(manager.task_count(), 5);
        manager.join().await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }
}
