use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::record::Record;
use prodhub_core::storage::StoreError;
use prodhub_core::tasks::{
    filter_tasks, upcoming_tasks, Task, TaskFilter, UpdateTaskRequest, UPCOMING_TASK_HORIZON,
};
use prodhub_core::views;

use super::owned;
use crate::collection::CachedCollection;
use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Tasks of the signed-in user.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<CachedCollection<Task>>,
}

impl TaskService {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        Self {
            tasks: Arc::new(CachedCollection::new(gateway)),
        }
    }

    pub fn collection(&self) -> &Arc<CachedCollection<Task>> {
        &self.tasks
    }

    pub fn bind(&self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        self.tasks.bind(shutdown)
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.observe()
    }

    pub async fn reload(&self) {
        self.tasks.reload().await
    }

    // ==================== Mutations ====================

    pub async fn add(&self, task: Task) -> Result<String> {
        self.tasks.add(task).await
    }

    pub async fn update(&self, id: &str, request: &UpdateTaskRequest) -> Result<()> {
        self.tasks.update(id, request).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.tasks.remove(id).await
    }

    /// Flips `completed` based on the task as currently cached.
    pub async fn toggle_completed(&self, id: &str) -> Result<()> {
        let completed = self
            .get(id)
            .map(|task| task.completed)
            .ok_or_else(|| StoreError::not_found(Task::COLLECTION, id))?;
        self.update(id, &UpdateTaskRequest::new().with_completed(!completed))
            .await
    }

    pub async fn archive(&self, id: &str) -> Result<()> {
        self.update(id, &UpdateTaskRequest::new().with_archived(true))
            .await
    }

    /// Stores `ids` in the given order, writing each task's position to
    /// `order`. Stops at the first failed write.
    pub async fn reorder(&self, ids: &[String]) -> Result<()> {
        let patches: Vec<(String, UpdateTaskRequest)> = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), UpdateTaskRequest::new().with_order(position as i64)))
            .collect();
        self.tasks.batch_update(&patches).await
    }

    // ==================== Views ====================

    pub fn all(&self) -> Vec<Task> {
        self.tasks.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.with_snapshot(|tasks| views::find_by_id(tasks, id).cloned())
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks.with_snapshot(|tasks| owned(filter_tasks(tasks, filter)))
    }

    /// Open tasks due within the next 24 hours.
    pub fn upcoming(&self) -> Vec<Task> {
        let now = self.tasks.gateway().clock().now();
        self.tasks
            .with_snapshot(|tasks| owned(upcoming_tasks(tasks, now, UPCOMING_TASK_HORIZON)))
    }

    pub fn search(&self, query: &str) -> Vec<Task> {
        self.tasks.with_snapshot(|tasks| owned(views::search(tasks, query)))
    }

    pub fn with_tag(&self, tag: &str) -> Vec<Task> {
        self.tasks.with_snapshot(|tasks| owned(views::with_tag(tasks, tag)))
    }
}
