//! Core domain records for the Join board.
//!
//! Records travel as camelCase JSON because that is the shape the remote
//! document store and the session blob both hold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A collection as held by the remote store and the session cache:
/// generated key -> record.
pub type Collection<T> = BTreeMap<String, T>;

/// The three named collections mirrored by the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Tasks,
    Contacts,
    Users,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Tasks,
        CollectionKind::Contacts,
        CollectionKind::Users,
    ];

    /// Path segment used on the remote store.
    pub fn path(&self) -> &'static str {
        match self {
            CollectionKind::Tasks => "tasks",
            CollectionKind::Contacts => "contacts",
            CollectionKind::Users => "users",
        }
    }

    /// Prefix for locally generated ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            CollectionKind::Tasks => "task",
            CollectionKind::Contacts => "contactId",
            CollectionKind::Users => "user",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Board column a task lives in.
///
/// The order of the variants is the linear order used by the overlay move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "to do")]
    ToDo,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "await feedback")]
    AwaitFeedback,
    #[serde(rename = "done")]
    Done,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ToDo,
        Category::InProgress,
        Category::AwaitFeedback,
        Category::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ToDo => "to do",
            Category::InProgress => "in progress",
            Category::AwaitFeedback => "await feedback",
            Category::Done => "done",
        }
    }

    /// Human label used on column headers and move buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Category::ToDo => "To Do",
            Category::InProgress => "In Progress",
            Category::AwaitFeedback => "Await Feedback",
            Category::Done => "Done",
        }
    }

    /// Logical name of the board column container for this category.
    pub fn column_id(&self) -> &'static str {
        match self {
            Category::ToDo => "toDo",
            Category::InProgress => "inProgress",
            Category::AwaitFeedback => "awaitFeedback",
            Category::Done => "done",
        }
    }

    pub fn from_column_id(id: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.column_id() == id)
    }

    /// Parse either the stored value ("in progress") or the column id ("inProgress").
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.column_id().eq_ignore_ascii_case(s))
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// The category before this one in board order, if any.
    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Category::ALL[i])
    }

    /// The category after this one in board order, if any.
    pub fn next(&self) -> Option<Self> {
        Category::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Urgent, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a priority name. Returns medium for unrecognized values.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Priority::Urgent,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

/// A checklist item inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            done: false,
        }
    }
}

/// A task card on the board.
///
/// `id` is the collection key; it is not part of the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub category: Category,
    // The remote store drops empty arrays, so both lists default.
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Number of completed subtasks.
    pub fn subtasks_done(&self) -> usize {
        self.subtasks.iter().filter(|s| s.done).count()
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// A blank query matches everything; otherwise the text is used as given.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// An entry in the contact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Records that live in a keyed collection.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

macro_rules! impl_keyed {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }

            fn set_key(&mut self, key: String) {
                self.id = key;
            }
        })*
    };
}

impl_keyed!(Task, Contact, User);

/// Project a keyed mapping into an ordered sequence with each record's id filled in.
pub fn to_records<T: Keyed + Clone>(collection: &Collection<T>) -> Vec<T> {
    collection
        .iter()
        .map(|(key, record)| {
            let mut record = record.clone();
            record.set_key(key.clone());
            record
        })
        .collect()
}

/// Rebuild a keyed mapping from records carrying their ids.
pub fn to_collection<T: Keyed>(records: impl IntoIterator<Item = T>) -> Collection<T> {
    records
        .into_iter()
        .map(|record| (record.key().to_string(), record))
        .collect()
}
