//! Form markup with inline errors.

use super::{badge, html_escape, message};
use crate::contacts::filter_by_name;
use crate::forms::{ContactForm, FieldSpec, FormErrors, FormInput, LoginForm, SignupForm, TaskForm};
use crate::types::{Category, Contact, Priority};

/// Task types offered in the add-task form.
pub const TASK_TYPES: [&str; 2] = ["Technical Task", "User Story"];

fn error_slot<F: FormInput>(errors: &FormErrors, field_id: &str) -> String {
    let error_id = F::FIELDS
        .iter()
        .find(|spec: &&FieldSpec| spec.field_id == field_id)
        .map(|spec| spec.error_id)
        .unwrap_or("formError");
    format!(
        r#"<div class="error" id="{}">{}</div>"#,
        error_id,
        html_escape(message_by_error_id(errors, error_id))
    )
}

fn message_by_error_id<'a>(errors: &'a FormErrors, error_id: &str) -> &'a str {
    errors
        .errors()
        .iter()
        .find(|e| e.error_id == error_id)
        .map(|e| e.message.as_str())
        .unwrap_or("")
}

/// Errors not tied to a declared field (e.g. storage failures).
fn form_level_error(errors: &FormErrors) -> String {
    errors
        .message_for("form")
        .map(|m| message("error", m))
        .unwrap_or_default()
}

/// Login page body.
pub fn login(form: &LoginForm, errors: &FormErrors, notice: Option<&str>) -> String {
    format!(
        r#"<section class="auth">
  <h1>Log in</h1>
  {notice}{form_error}
  <form method="post" action="/login" novalidate>
    <input type="email" name="email" id="email" placeholder="Email" value="{email}">
    {email_error}
    <input type="password" name="password" id="password" placeholder="Password">
    {password_error}
    <div class="error" id="loginError">{login_error}</div>
    <button type="submit">Log in</button>
  </form>
  <form method="post" action="/login/guest"><button type="submit">Guest Log in</button></form>
  <p>Not a Join user? <a href="/signup">Sign up</a></p>
</section>"#,
        notice = notice.map(|n| message("success", n)).unwrap_or_default(),
        form_error = form_level_error(errors),
        email = html_escape(&form.email),
        email_error = error_slot::<LoginForm>(errors, "email"),
        password_error = error_slot::<LoginForm>(errors, "password"),
        login_error = html_escape(message_by_error_id(errors, "loginError")),
    )
}

/// Sign-up page body.
pub fn signup(form: &SignupForm, errors: &FormErrors) -> String {
    format!(
        r#"<section class="auth">
  <h1>Sign up</h1>
  {form_error}
  <form method="post" action="/signup" novalidate>
    <input type="text" name="name" id="name" placeholder="Name" value="{name}">
    {name_error}
    <input type="email" name="email" id="email" placeholder="Email" value="{email}">
    {email_error}
    <input type="password" name="password" id="password" placeholder="Password">
    {password_error}
    <input type="password" name="confirm_password" id="confirm_password" placeholder="Confirm Password">
    {confirm_error}
    <label><input type="checkbox" name="accept_policy" {checked}> I accept the Privacy policy</label>
    {policy_error}
    <button type="submit">Sign up</button>
  </form>
</section>"#,
        form_error = form_level_error(errors),
        name = html_escape(&form.name),
        name_error = error_slot::<SignupForm>(errors, "name"),
        email = html_escape(&form.email),
        email_error = error_slot::<SignupForm>(errors, "email"),
        password_error = error_slot::<SignupForm>(errors, "password"),
        confirm_error = error_slot::<SignupForm>(errors, "confirm_password"),
        checked = if form.accept_policy.is_some() { "checked" } else { "" },
        policy_error = error_slot::<SignupForm>(errors, "accept_policy"),
    )
}

/// Contact picker options, filtered by name and with current selections ticked.
pub fn assignee_options(contacts: &[Contact], query: &str, selected: &[String]) -> String {
    let options: String = filter_by_name(contacts, query)
        .into_iter()
        .map(|contact| {
            let checked = if selected.iter().any(|id| *id == contact.id) {
                "checked"
            } else {
                ""
            };
            format!(
                r#"<label class="assignee">{badge} {name} <input type="checkbox" value="{id}" {checked} onchange="syncAssignees(this.form)"></label>"#,
                badge = badge(contact),
                name = html_escape(&contact.name),
                id = html_escape(&contact.id),
                checked = checked,
            )
        })
        .collect();
    format!(r#"<div id="assignee-options">{}</div>"#, options)
}

/// Add-task / edit-task form.
pub fn task_form(
    form: &TaskForm,
    errors: &FormErrors,
    contacts: &[Contact],
    action: &str,
    submit_label: &str,
) -> String {
    let selected = crate::forms::parse_assignees(&form.assigned_to);
    let current_priority = Priority::parse(&form.priority);
    let priorities: String = Priority::ALL
        .iter()
        .map(|p| {
            format!(
                r#"<label class="prio prio-{0}"><input type="radio" name="priority" value="{0}" {1}> {0}</label>"#,
                p.as_str(),
                if *p == current_priority { "checked" } else { "" }
            )
        })
        .collect();
    let types: String = TASK_TYPES
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{0}" {1}>{0}</option>"#,
                t,
                if form.task_type == *t { "selected" } else { "" }
            )
        })
        .collect();
    let category = Category::parse(&form.category).unwrap_or_default();

    format!(
        r##"<section class="task-form">
  {form_error}
  <form method="post" action="{action}" novalidate>
    <input type="hidden" name="category" value="{category}">
    <label>Title*<input type="text" name="title" id="title" value="{title}"></label>
    {title_error}
    <label>Description<textarea name="description" id="description">{description}</textarea></label>
    <label>Assigned to
      <input type="text" placeholder="Select contacts to assign" name="assignee_query"
        hx-get="/tasks/assignees" hx-trigger="input changed delay:200ms" hx-target="#assignee-options"
        hx-swap="outerHTML" hx-include="[name='assigned_to']">
    </label>
    <input type="hidden" name="assigned_to" value="{assigned_to}">
    {assignees}
    <label>Due date*<input type="date" name="due_date" id="due_date" value="{due_date}"></label>
    {due_date_error}
    <fieldset><legend>Prio</legend>{priorities}</fieldset>
    <label>Category*<select name="task_type" id="task_type"><option value="">Select task category</option>{types}</select></label>
    {task_type_error}
    <label>Subtasks (one per line)<textarea name="subtasks" id="subtasks">{subtasks}</textarea></label>
    <button type="reset">Clear</button>
    <button type="submit">{submit_label}</button>
  </form>
  <script>
    function syncAssignees(form) {{
      var ids = Array.from(form.querySelectorAll('#assignee-options input:checked')).map(function (c) {{ return c.value; }});
      form.querySelector('[name=assigned_to]').value = ids.join(',');
    }}
  </script>
</section>"##,
        form_error = form_level_error(errors),
        action = html_escape(action),
        category = category.as_str(),
        title = html_escape(&form.title),
        title_error = error_slot::<TaskForm>(errors, "title"),
        description = html_escape(&form.description),
        assigned_to = html_escape(&selected.join(",")),
        assignees = assignee_options(contacts, "", &selected),
        due_date = html_escape(&form.due_date),
        due_date_error = error_slot::<TaskForm>(errors, "due_date"),
        priorities = priorities,
        types = types,
        task_type_error = error_slot::<TaskForm>(errors, "task_type"),
        subtasks = html_escape(&form.subtasks),
        submit_label = html_escape(submit_label),
    )
}

/// Add-contact / edit-contact form.
pub fn contact_form(form: &ContactForm, errors: &FormErrors, action: &str, submit_label: &str) -> String {
    format!(
        r#"<section class="contact-form">
  {form_error}
  <form method="post" action="{action}" novalidate>
    <input type="text" name="name" id="name" placeholder="Name" value="{name}">
    {name_error}
    <input type="email" name="email" id="email" placeholder="Email" value="{email}">
    {email_error}
    <input type="tel" name="phone" id="phone" placeholder="Phone" value="{phone}">
    <a class="button" href="/contacts">Cancel</a>
    <button type="submit">{submit_label}</button>
  </form>
</section>"#,
        form_error = form_level_error(errors),
        action = html_escape(action),
        name = html_escape(&form.name),
        name_error = error_slot::<ContactForm>(errors, "name"),
        email = html_escape(&form.email),
        email_error = error_slot::<ContactForm>(errors, "email"),
        phone = html_escape(&form.phone),
        submit_label = html_escape(submit_label),
    )
}
