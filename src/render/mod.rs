//! Pure HTML rendering.
//!
//! Every function here takes plain records and returns markup; none of them
//! touch the store. The page layout is embedded at compile time with
//! `include_str!` and filled with `{{placeholder}}` substitution.

pub mod board;
pub mod contacts;
pub mod forms;
pub mod summary;
pub mod text;

use crate::contacts::initials;
use crate::types::{Contact, User};

/// The page layout with header, navigation and content slot.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

/// Navigation entries: (path, label).
const NAV_ITEMS: [(&str, &str); 4] = [
    ("/summary", "Summary"),
    ("/tasks/new", "Add Task"),
    ("/board", "Board"),
    ("/contacts", "Contacts"),
];

/// Escape text for use in HTML content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode a path segment or query value for use inside an attribute.
pub fn url_component(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Wrap content in the page layout.
pub fn page(title: &str, active: &str, user: Option<&User>, content: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(path, label)| {
            let class = if *path == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, path, class, label)
        })
        .collect();
    let user_initials = user.map(|u| initials(&u.name)).unwrap_or_default();

    BASE_TEMPLATE
        .replace("{{title}}", &html_escape(title))
        .replace("{{nav}}", &nav)
        .replace("{{user_initials}}", &html_escape(&user_initials))
        .replace("{{content}}", content)
}

/// Round badge with a contact's initials in its color.
pub fn badge(contact: &Contact) -> String {
    format!(
        r#"<span class="badge" style="background-color: {}" title="{}">{}</span>"#,
        html_escape(contact.color.as_deref().unwrap_or("#2A3647")),
        html_escape(&contact.name),
        html_escape(&initials(&contact.name)),
    )
}

/// Inline message box; `kind` is "success" or "error".
pub fn message(kind: &str, text: &str) -> String {
    format!(
        r#"<div class="message message-{}">{}</div>"#,
        kind,
        html_escape(text)
    )
}

/// Cut text to `max` characters, appending "..." when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b a="1">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn page_marks_active_nav_and_user() {
        let user = User {
            id: "u1".into(),
            name: "Sofia Müller".into(),
            email: "sofia@join.dev".into(),
            password: String::new(),
        };
        let html = page("Board", "/board", Some(&user), "<p>hi</p>");
        assert!(html.contains(r#"<a href="/board" class="active">Board</a>"#));
        assert!(html.contains(">SM<"));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("<title>Board - Join</title>"));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Grüße aus Köln", 5), "Grüße...");
    }
}
