//! Task records in the session cache.

use super::DataStore;
use crate::error::JoinResult;
use crate::types::{CollectionKind, Task};
use tracing::info;

impl DataStore {
    /// Create a task and file it under a store-assigned id.
    pub async fn create_task(&mut self, mut task: Task) -> JoinResult<Task> {
        let mut tasks = self.tasks();
        let key = self
            .new_key(CollectionKind::Tasks, &task, |k| tasks.contains_key(k))
            .await;
        task.id = key.clone();
        tasks.insert(key, task.clone());
        self.update_tasks(tasks)?;
        info!(task_id = %task.id, category = %task.category, "Task created");
        Ok(task)
    }

    /// Look up a single task by id.
    pub fn find_task(&self, task_id: &str) -> Option<Task> {
        self.get_tasks().into_iter().find(|t| t.id == task_id)
    }
}
