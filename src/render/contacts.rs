//! Contact list and detail markup.

use super::{badge, html_escape, url_component};
use crate::contacts::group_by_letter;
use crate::types::Contact;

/// Alphabetical contact list with letter headings, plus the selected contact.
pub fn contact_list(contacts: &[Contact], selected: Option<&Contact>) -> String {
    let mut html = String::from(
        r#"<section class="contacts"><div class="contact-list"><a class="button" href="/contacts?new=1">Add new contact</a>"#,
    );
    for (letter, group) in group_by_letter(contacts) {
        html.push_str(&format!(r#"<h3 class="letter">{}</h3><ul>"#, letter));
        for contact in &group {
            let class = if selected.is_some_and(|s| s.id == contact.id) {
                " selected"
            } else {
                ""
            };
            html.push_str(&format!(
                r#"<li class="contact{class}"><a href="/contacts/{id}">{badge}<span class="name">{name}</span><span class="email">{email}</span></a></li>"#,
                class = class,
                id = url_component(&contact.id),
                badge = badge(contact),
                name = html_escape(&contact.name),
                email = html_escape(&contact.email),
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    if let Some(contact) = selected {
        html.push_str(&contact_detail(contact));
    }
    html.push_str("</section>");
    html
}

/// Detail panel with edit and delete actions.
pub fn contact_detail(contact: &Contact) -> String {
    format!(
        r#"<div class="contact-detail">
  <div class="contact-head">{badge}<h2>{name}</h2></div>
  <h3>Contact Information</h3>
  <dl><dt>Email</dt><dd><a href="mailto:{email}">{email}</a></dd><dt>Phone</dt><dd>{phone}</dd></dl>
  <a class="button" href="/contacts/{id}?edit=1">Edit</a>
  <form method="post" action="/contacts/{id}/delete"><button type="submit">Delete</button></form>
</div>"#,
        badge = badge(contact),
        name = html_escape(&contact.name),
        email = html_escape(&contact.email),
        phone = html_escape(contact.phone.as_deref().unwrap_or("-")),
        id = url_component(&contact.id),
    )
}
