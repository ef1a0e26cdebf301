//! Board markup: columns, cards, the move overlay and the task detail view.

use super::{badge, html_escape, truncate, url_component};
use crate::board::{ColumnView, EmptyColumn, MoveDirection, MoveOption};
use crate::contacts::resolve_assignees;
use crate::types::{Category, Contact, Priority, Task};

/// Badges shown on a card before collapsing into "+N".
pub const MAX_CARD_BADGES: usize = 3;

/// Description length shown on a card.
pub const CARD_DESCRIPTION_LEN: usize = 50;

/// Board page body: search box plus the four columns.
pub fn board(columns: &[ColumnView], contacts: &[Contact], query: Option<&str>) -> String {
    format!(
        r##"<section class="board-header">
  <h1>Board</h1>
  <form method="get" action="/board" class="search">
    <input type="search" name="q" placeholder="Find Task" value="{query}"
      hx-get="/board/columns" hx-trigger="input changed delay:300ms" hx-target="#board" hx-swap="outerHTML">
  </form>
  <a class="button" href="/tasks/new">Add task +</a>
</section>
<div id="overlay"></div>
{columns}"##,
        query = html_escape(query.unwrap_or("")),
        columns = columns_fragment(columns, contacts, query),
    )
}

/// The swappable `#board` container holding all four columns.
pub fn columns_fragment(columns: &[ColumnView], contacts: &[Contact], query: Option<&str>) -> String {
    let mut html = String::from(r#"<div id="board" class="board">"#);
    for view in columns {
        html.push_str(&column(view, contacts, query));
    }
    html.push_str("</div>");
    html
}

/// One column container, identified by its logical column id.
pub fn column(view: &ColumnView, contacts: &[Contact], query: Option<&str>) -> String {
    let body = match view.empty {
        Some(empty) => placeholder(view.category, empty),
        None => view
            .tasks
            .iter()
            .map(|task| task_card(task, contacts, query))
            .collect(),
    };
    format!(
        r#"<div class="column-wrapper"><h2>{label} <a href="/tasks/new?category={column_id}" title="Add task">+</a></h2><div class="column" id="{column_id}">{body}</div></div>"#,
        label = view.category.label(),
        column_id = view.category.column_id(),
        body = body,
    )
}

/// Placeholder for an empty column.
pub fn placeholder(category: Category, empty: EmptyColumn) -> String {
    let text = match empty {
        EmptyColumn::NoTasks => format!("No tasks {}", category.label()),
        EmptyColumn::NoMatches => "No matching tasks found".to_string(),
    };
    format!(r#"<div class="placeholder">{}</div>"#, text)
}

fn type_class(task_type: &str) -> String {
    task_type
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn priority_marker(priority: Priority) -> String {
    format!(
        r#"<span class="priority priority-{0}" title="{0}">{1}</span>"#,
        priority.as_str(),
        match priority {
            Priority::Urgent => "&#8679;&#8679;",
            Priority::Medium => "=",
            Priority::Low => "&#8681;&#8681;",
        }
    )
}

fn progress(task: &Task) -> String {
    if task.subtasks.is_empty() {
        return String::new();
    }
    let done = task.subtasks_done();
    let total = task.subtasks.len();
    let percent = done * 100 / total;
    format!(
        r#"<div class="subtask-progress"><div class="progress"><div class="progress-bar" style="width: {}%"></div></div><span>{}/{} Subtasks</span></div>"#,
        percent, done, total
    )
}

fn assignee_badges(task: &Task, contacts: &[Contact], max: usize) -> String {
    let assignees = resolve_assignees(contacts, &task.assigned_to);
    let mut html: String = assignees.iter().take(max).map(|c| badge(c)).collect();
    if assignees.len() > max {
        html.push_str(&format!(
            r#"<span class="badge badge-more">+{}</span>"#,
            assignees.len() - max
        ));
    }
    html
}

/// A draggable task card.
pub fn task_card(task: &Task, contacts: &[Contact], query: Option<&str>) -> String {
    let q = url_component(query.unwrap_or(""));
    format!(
        r##"<article class="card" draggable="true" data-task-id="{id}">
  <span class="task-type {type_class}">{task_type}</span>
  <h3><a href="/board/tasks/{path_id}">{title}</a></h3>
  <p>{description}</p>
  {progress}
  <footer><div class="assignees">{badges}</div>{priority}</footer>
  <button class="move" hx-get="/board/tasks/{path_id}/move?q={q}" hx-target="#overlay" hx-swap="innerHTML">Move</button>
</article>"##,
        id = html_escape(&task.id),
        path_id = url_component(&task.id),
        type_class = type_class(&task.task_type),
        task_type = html_escape(&task.task_type),
        title = html_escape(&task.title),
        description = html_escape(&truncate(&task.description, CARD_DESCRIPTION_LEN)),
        progress = progress(task),
        badges = assignee_badges(task, contacts, MAX_CARD_BADGES),
        priority = priority_marker(task.priority),
        q = q,
    )
}

/// The touch-friendly move menu: one button per neighbouring category.
pub fn move_overlay(task: &Task, options: &[MoveOption], query: Option<&str>) -> String {
    let q = url_component(query.unwrap_or(""));
    let buttons: String = options
        .iter()
        .map(|option| {
            let arrow = match option.direction {
                MoveDirection::Up => "&#8593;",
                MoveDirection::Down => "&#8595;",
            };
            format!(
                r##"<button hx-post="/board/tasks/{id}/move/{direction}?q={q}" hx-target="#board" hx-swap="outerHTML">{arrow} Move to {label}</button>"##,
                id = url_component(&task.id),
                direction = option.direction.as_str(),
                q = q,
                arrow = arrow,
                label = option.target.label(),
            )
        })
        .collect();
    format!(
        r#"<div class="move-overlay" data-task-id="{}"><h3>Move to</h3>{}</div>"#,
        html_escape(&task.id),
        buttons
    )
}

/// Full task view with subtask checkboxes, edit and delete actions.
pub fn task_detail(task: &Task, contacts: &[Contact]) -> String {
    let assignees: String = resolve_assignees(contacts, &task.assigned_to)
        .iter()
        .map(|c| format!(r#"<li>{} {}</li>"#, badge(c), html_escape(&c.name)))
        .collect();
    let subtasks: String = task
        .subtasks
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                r#"<li><form method="post" action="/board/tasks/{id}/subtasks/{i}/toggle"><button type="submit" class="checkbox">{mark}</button> {title}</form></li>"#,
                id = url_component(&task.id),
                i = i,
                mark = if s.done { "&#9745;" } else { "&#9744;" },
                title = html_escape(&s.title),
            )
        })
        .collect();

    format!(
        r#"<article class="task-detail">
  <span class="task-type {type_class}">{task_type}</span>
  <h1>{title}</h1>
  <p>{description}</p>
  <dl>
    <dt>Due date:</dt><dd>{due_date}</dd>
    <dt>Priority:</dt><dd>{priority_name} {priority}</dd>
    <dt>Status:</dt><dd>{category}</dd>
  </dl>
  <h2>Assigned To:</h2><ul class="assignees">{assignees}</ul>
  <h2>Subtasks</h2><ul class="subtasks">{subtasks}</ul>
  <footer>
    <form method="post" action="/board/tasks/{id}/delete"><button type="submit">Delete</button></form>
    <a class="button" href="/board/tasks/{id}/edit">Edit</a>
  </footer>
</article>"#,
        type_class = type_class(&task.task_type),
        task_type = html_escape(&task.task_type),
        title = html_escape(&task.title),
        description = html_escape(&task.description),
        due_date = html_escape(&task.due_date),
        priority_name = task.priority.as_str(),
        priority = priority_marker(task.priority),
        category = task.category.label(),
        assignees = assignees,
        subtasks = subtasks,
        id = url_component(&task.id),
    )
}
