//! Plain-text output for the command line.

use crate::board::{ColumnView, EmptyColumn};
use crate::summary::Summary;
use crate::types::{Category, Priority, Task};

/// Format the board columns as markdown.
pub fn format_board_markdown(columns: &[ColumnView], query: Option<&str>) -> String {
    let mut md = String::new();

    let total: usize = columns.iter().map(|c| c.tasks.len()).sum();
    match query {
        Some(q) => md.push_str(&format!("# Board ({} matching \"{}\")\n\n", total, q)),
        None => md.push_str(&format!("# Board ({})\n\n", total)),
    }

    for view in columns {
        md.push_str(&format!("## {} ({})\n\n", view.category.label(), view.tasks.len()));
        match view.empty {
            Some(EmptyColumn::NoTasks) => {
                md.push_str(&format!("_No tasks {}_\n", view.category.label()))
            }
            Some(EmptyColumn::NoMatches) => md.push_str("_No matching tasks found_\n"),
            None => {
                for task in &view.tasks {
                    md.push_str(&format_task_short(task));
                }
            }
        }
        md.push('\n');
    }

    md
}

/// Format a task in short form for lists.
fn format_task_short(task: &Task) -> String {
    let priority_marker = match task.priority {
        Priority::Urgent => "!!! ",
        Priority::Medium | Priority::Low => "",
    };

    let progress = if task.subtasks.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", task.subtasks_done(), task.subtasks.len())
    };

    let due = if task.due_date.is_empty() {
        String::new()
    } else {
        format!(" due {}", task.due_date)
    };

    format!(
        "- {}{} `{}`{}{}\n",
        priority_marker, task.title, task.id, due, progress
    )
}

/// Format summary metrics as markdown.
pub fn format_summary_markdown(summary: &Summary, greeting: &str, name: Option<&str>) -> String {
    let mut md = String::new();

    match name {
        Some(name) => md.push_str(&format!("# {}, {}\n\n", greeting, name)),
        None => md.push_str(&format!("# {}\n\n", greeting)),
    }

    for category in Category::ALL {
        md.push_str(&format!("- **{}**: {}\n", category.label(), summary.count(category)));
    }
    md.push_str(&format!("- **Tasks in Board**: {}\n", summary.total));
    md.push_str(&format!("- **Urgent**: {}\n", summary.urgent));
    if let Some(date) = summary.upcoming_deadline {
        md.push_str(&format!("- **Upcoming Deadline**: {}\n", date.format("%Y-%m-%d")));
    }

    md
}
