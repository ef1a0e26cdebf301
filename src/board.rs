//! Board state machine.
//!
//! Every task sits in exactly one of the four categories. Drag-and-drop may
//! move a task to any column; the overlay move only offers the neighbouring
//! categories in board order. Each transition writes the whole task collection
//! through the [`DataStore`] before returning.

use crate::error::JoinResult;
use crate::forms::TaskDraft;
use crate::store::DataStore;
use crate::types::{Category, Task, to_collection};
use serde::Serialize;
use tracing::{debug, warn};

/// Direction of an overlay move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards "to do".
    Up,
    /// Towards "done".
    Down,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(MoveDirection::Up),
            "down" => Some(MoveDirection::Down),
            _ => None,
        }
    }

    /// Category reached from `from` in this direction, if any.
    pub fn target(&self, from: Category) -> Option<Category> {
        match self {
            MoveDirection::Up => from.previous(),
            MoveDirection::Down => from.next(),
        }
    }
}

/// A move offered by the overlay for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOption {
    pub direction: MoveDirection,
    pub target: Category,
}

/// Why a column rendered no cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyColumn {
    /// The category holds no tasks at all.
    NoTasks,
    /// The category has tasks, but none match the search.
    NoMatches,
}

/// One rendered column: its category and the cards that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub category: Category,
    pub tasks: Vec<Task>,
    pub empty: Option<EmptyColumn>,
}

/// In-memory board state.
#[derive(Debug, Clone, Default)]
pub struct Board {
    tasks: Vec<Task>,
    dragged: Option<String>,
    query: Option<String>,
}

impl Board {
    /// Build the board from the store's current tasks.
    pub fn load(store: &DataStore) -> Self {
        Self {
            tasks: store.get_tasks(),
            dragged: None,
            query: None,
        }
    }

    /// Re-read tasks from the store, keeping drag and search state.
    pub fn reload(&mut self, store: &DataStore) {
        self.tasks = store.get_tasks();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Set the search filter. Blank queries clear it; others are kept verbatim.
    pub fn set_query(&mut self, query: Option<&str>) {
        self.query = query
            .filter(|q| !q.trim().is_empty())
            .map(str::to_string);
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Remember which task is being dragged.
    pub fn start_dragging(&mut self, task_id: &str) {
        debug!(task_id = %task_id, "Drag started");
        self.dragged = Some(task_id.to_string());
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    /// Drop the dragged task into a column.
    ///
    /// Returns `false` when nothing is being dragged or the task is gone.
    pub fn drop_on(&mut self, category: Category, store: &mut DataStore) -> JoinResult<bool> {
        let Some(task_id) = self.dragged.take() else {
            debug!(column = category.column_id(), "Drop without a dragged task ignored");
            return Ok(false);
        };
        self.move_to(&task_id, category, store)
    }

    /// Put a task into `category`. Any category may follow any other.
    ///
    /// Entering "done" marks every subtask done; leaving it does not undo that.
    pub fn move_to(
        &mut self,
        task_id: &str,
        category: Category,
        store: &mut DataStore,
    ) -> JoinResult<bool> {
        self.update_task(task_id, store, |task| {
            task.category = category;
            if category == Category::Done {
                for subtask in &mut task.subtasks {
                    subtask.done = true;
                }
            }
        })
    }

    /// Moves the overlay offers for a task: only its neighbours in board order.
    pub fn move_options(&self, task_id: &str) -> Vec<MoveOption> {
        let Some(task) = self.task(task_id) else {
            return Vec::new();
        };
        [MoveDirection::Up, MoveDirection::Down]
            .into_iter()
            .filter_map(|direction| {
                direction
                    .target(task.category)
                    .map(|target| MoveOption { direction, target })
            })
            .collect()
    }

    /// Overlay move one step up or down.
    ///
    /// Returns `false` when the task is unknown or already at that end.
    pub fn move_task(
        &mut self,
        task_id: &str,
        direction: MoveDirection,
        store: &mut DataStore,
    ) -> JoinResult<bool> {
        let Some(target) = self
            .task(task_id)
            .and_then(|task| direction.target(task.category))
        else {
            return Ok(false);
        };
        self.move_to(task_id, target, store)
    }

    /// Flip a subtask's done flag.
    pub fn toggle_subtask(
        &mut self,
        task_id: &str,
        index: usize,
        store: &mut DataStore,
    ) -> JoinResult<bool> {
        if self
            .task(task_id)
            .is_none_or(|task| index >= task.subtasks.len())
        {
            return Ok(false);
        }
        self.update_task(task_id, store, |task| {
            task.subtasks[index].done = !task.subtasks[index].done;
        })
    }

    /// Apply an edit to one task and persist. Unknown ids are a no-op.
    pub fn update_task(
        &mut self,
        task_id: &str,
        store: &mut DataStore,
        edit: impl FnOnce(&mut Task),
    ) -> JoinResult<bool> {
        let previous = self.tasks.clone();
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            debug!(task_id = %task_id, "Update of unknown task ignored");
            return Ok(false);
        };
        edit(task);
        debug!(task_id = %task_id, category = %task.category, "Task updated");
        self.save(store, previous)?;
        Ok(true)
    }

    /// Replace a task's editable fields from a validated form.
    pub fn edit_task(
        &mut self,
        task_id: &str,
        draft: &TaskDraft,
        store: &mut DataStore,
    ) -> JoinResult<bool> {
        self.update_task(task_id, store, |task| draft.apply_to(task))
    }

    /// Remove a task.
    ///
    /// If the write fails the board rolls back to the list it had before.
    pub fn delete_task(&mut self, task_id: &str, store: &mut DataStore) -> JoinResult<bool> {
        let previous = self.tasks.clone();
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save(store, previous)?;
        debug!(task_id = %task_id, "Task deleted");
        Ok(true)
    }

    /// Create a task through the store and show it on the board.
    pub async fn add_task(&mut self, task: Task, store: &mut DataStore) -> JoinResult<Task> {
        let created = store.create_task(task).await?;
        self.reload(store);
        Ok(created)
    }

    /// Cards for one category after the search filter.
    pub fn column(&self, category: Category) -> ColumnView {
        let in_category: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.category == category)
            .collect();
        let tasks: Vec<Task> = in_category
            .iter()
            .filter(|t| self.query.as_deref().is_none_or(|q| t.matches_query(q)))
            .map(|t| (*t).clone())
            .collect();
        let empty = if in_category.is_empty() {
            Some(EmptyColumn::NoTasks)
        } else if tasks.is_empty() {
            Some(EmptyColumn::NoMatches)
        } else {
            None
        };
        ColumnView {
            category,
            tasks,
            empty,
        }
    }

    /// All four columns in board order.
    pub fn columns(&self) -> Vec<ColumnView> {
        Category::ALL.into_iter().map(|c| self.column(c)).collect()
    }

    fn save(&mut self, store: &mut DataStore, previous: Vec<Task>) -> JoinResult<()> {
        if let Err(e) = store.update_tasks(to_collection(self.tasks.iter().cloned())) {
            warn!(error = %e, "Task write failed; rolling back board");
            self.tasks = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Filter tasks with the board search: case-insensitive substring on title or
/// description. `None` or a blank query returns the list unchanged.
pub fn filter_tasks(tasks: &[Task], query: Option<&str>) -> Vec<Task> {
    match query.filter(|q| !q.trim().is_empty()) {
        Some(q) => tasks.iter().filter(|t| t.matches_query(q)).cloned().collect(),
        None => tasks.to_vec(),
    }
}
