//! Summary view: task counts per category, urgent work and the next deadline.

use crate::error::JoinResult;
use crate::session::{self, SUMMARY_TASKS_KEY, SessionStorage};
use crate::store::DataStore;
use crate::types::{Category, Collection, Priority, Task, to_collection, to_records};
use chrono::NaiveDate;
use serde::Serialize;

/// Aggregates shown on the summary page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub to_do: usize,
    pub in_progress: usize,
    pub await_feedback: usize,
    pub done: usize,
    pub total: usize,
    pub urgent: usize,
    /// Earliest due date among urgent tasks that are not done.
    pub upcoming_deadline: Option<NaiveDate>,
}

impl Summary {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::ToDo => self.to_do,
            Category::InProgress => self.in_progress,
            Category::AwaitFeedback => self.await_feedback,
            Category::Done => self.done,
        }
    }
}

/// Compute the summary for a task list.
pub fn summarize(tasks: &[Task]) -> Summary {
    let mut summary = Summary {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.category {
            Category::ToDo => summary.to_do += 1,
            Category::InProgress => summary.in_progress += 1,
            Category::AwaitFeedback => summary.await_feedback += 1,
            Category::Done => summary.done += 1,
        }
        if task.priority == Priority::Urgent {
            summary.urgent += 1;
            if task.category != Category::Done
                && let Ok(date) = NaiveDate::parse_from_str(&task.due_date, "%Y-%m-%d")
            {
                summary.upcoming_deadline = Some(match summary.upcoming_deadline {
                    Some(current) => current.min(date),
                    None => date,
                });
            }
        }
    }
    summary
}

/// Summarize the store's tasks and keep the list as the summary snapshot.
pub fn refresh(store: &DataStore) -> JoinResult<Summary> {
    let tasks = store.get_tasks();
    session::save_json(
        store.storage().as_ref(),
        SUMMARY_TASKS_KEY,
        &to_collection(tasks.iter().cloned()),
    )?;
    Ok(summarize(&tasks))
}

/// Tasks from the last summary snapshot, if one was taken this session.
pub fn load_snapshot(storage: &dyn SessionStorage) -> Option<Vec<Task>> {
    session::load_json::<Collection<Task>>(storage, SUMMARY_TASKS_KEY)
        .ok()
        .flatten()
        .map(|collection| to_records(&collection))
}

/// Greeting for the hour of day (0-23).
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}
