//! Summary page markup.

use super::html_escape;
use crate::summary::Summary;
use crate::types::{Category, User};

fn tile(href: &str, value: &str, label: &str) -> String {
    format!(
        r#"<a class="tile" href="{}"><span class="tile-value">{}</span><span class="tile-label">{}</span></a>"#,
        href, value, label
    )
}

/// Summary page body with per-category counts and the greeting.
pub fn summary(summary: &Summary, user: Option<&User>, greeting: &str) -> String {
    let deadline = summary
        .upcoming_deadline
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "No upcoming deadline".to_string());

    let categories: String = Category::ALL
        .iter()
        .map(|c| tile("/board", &summary.count(*c).to_string(), c.label()))
        .collect();

    let name = user.map(|u| html_escape(&u.name)).unwrap_or_default();

    format!(
        r#"<section class="summary">
  <h1>Join 360</h1>
  <div class="summary-grid">
    <div class="tiles">
      {categories}
      <a class="tile tile-urgent" href="/board"><span class="tile-value">{urgent}</span><span class="tile-label">Urgent</span><span class="deadline">{deadline}</span><span class="tile-label">Upcoming Deadline</span></a>
      {total}
    </div>
    <div class="greeting"><h2>{greeting},</h2><p class="user-name">{name}</p></div>
  </div>
</section>"#,
        categories = categories,
        urgent = summary.urgent,
        deadline = deadline,
        total = tile("/board", &summary.total.to_string(), "Tasks in Board"),
        greeting = html_escape(greeting),
        name = name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn shows_counts_deadline_and_greeting() {
        let s = Summary {
            to_do: 2,
            in_progress: 1,
            await_feedback: 0,
            done: 3,
            total: 6,
            urgent: 1,
            upcoming_deadline: NaiveDate::from_ymd_opt(2026, 11, 5),
        };
        let user = User {
            id: String::new(),
            name: "Anna Berg".into(),
            email: String::new(),
            password: String::new(),
        };
        let html = summary(&s, Some(&user), "Good morning");
        assert!(html.contains(r#"<span class="tile-value">6</span><span class="tile-label">Tasks in Board</span>"#));
        assert!(html.contains(r#"<span class="tile-value">3</span><span class="tile-label">Done</span>"#));
        assert!(html.contains("November 5, 2026"));
        assert!(html.contains("Good morning,"));
        assert!(html.contains("Anna Berg"));
    }

    #[test]
    fn no_deadline_placeholder() {
        let html = summary(&Summary::default(), None, "Good evening");
        assert!(html.contains("No upcoming deadline"));
    }
}
