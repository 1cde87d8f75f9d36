use tokio::task::JoinHandle;
use std::collections::HashMap;
use crate::error::{Error, Result};
use tracing::{info, error};

/// Task Supervisor - Tracks the dashboard's background tasks
///
/// ## Purpose
/// Owns the join handles of the refresh timer, the price stream and the
/// synthetic alert generator. A task that finishes on its own (for example
/// the stream after reconnect exhaustion) shows up in `check_health`.
///
/// ## Usage
/// ```ignore
/// let mut supervisor = TaskSupervisor::new();
///
/// supervisor.spawn("bulk_refresh", async move {
///     scheduler.run(cancel).await;
/// });
///
/// if let Err(e) = supervisor.check_health() {
///     warn!("{}", e);
/// }
/// ```
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a background task and register it under `name`
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        if let Some(previous) = self.tasks.insert(name.clone(), handle) {
            previous.abort();
            info!("Replaced running task: {}", name);
        }
        self
    }

    /// Returns an error naming every task that has already terminated.
    /// Terminated tasks are dropped from tracking.
    pub fn check_health(&mut self) -> Result<()> {
        let finished: Vec<String> = self.tasks.iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        for name in &finished {
            self.tasks.remove(name);
        }

        let error_msg = format!("Tasks terminated: {:?}", finished);
        error!("{}", error_msg);
        Err(Error::TaskFailed(error_msg))
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.tasks.get(name).is_some_and(|handle| !handle.is_finished())
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every task still tracked
    pub fn shutdown_all(&mut self) {
        info!("Shutting down {} background tasks", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            info!("Aborted task: {}", name);
        }
    }

    /// Wait for a specific task to complete
    pub async fn wait_for_task(&mut self, name: &str) -> Result<()> {
        let handle = self.tasks.remove(name)
            .ok_or_else(|| Error::TaskFailed(format!("Task {} not found", name)))?;

        match handle.await {
            Ok(()) => {
                info!("Task {} completed", name);
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                info!("Task {} was aborted", name);
                Ok(())
            }
            Err(e) => Err(Error::TaskFailed(format!("Task {} failed: {:?}", name, e))),
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finished_tasks_are_reported_once() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("quick", async {});
        supervisor.spawn("forever", std::future::pending::<()>());

        supervisor.wait_for_task("quick").await.unwrap();
        assert_eq!(supervisor.active_task_count(), 1);
        assert!(supervisor.check_health().is_ok());
        assert!(supervisor.is_running("forever"));

        supervisor.shutdown_all();
        assert_eq!(supervisor.active_task_count(), 0);
    }

    #[tokio::test]
    async fn check_health_flags_terminated_task() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("done", async {});
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let err = supervisor.check_health().unwrap_err();
        assert!(matches!(err, Error::TaskFailed(msg) if msg.contains("done")));
        assert_eq!(supervisor.active_task_count(), 0);
    }
}
