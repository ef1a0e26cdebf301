//! Form input, validation and record assembly.
//!
//! Every form declares a static list of fields, each paired with the id of the
//! element that shows its error and the rules it must satisfy. Validation walks
//! that list and collects one error per failing field; a form only turns into
//! a draft record when the list is clean.

use crate::types::{Category, Contact, Priority, Subtask, Task, User};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Check an address against the accepted email shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// A rule a field must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty after trimming.
    Required,
    /// Matches the email pattern.
    Email,
    /// At least [`MIN_PASSWORD_LEN`] characters.
    Password,
    /// Equal to the named field.
    Matches(&'static str),
    /// A `YYYY-MM-DD` date.
    Date,
    /// A checkbox that must be ticked.
    Checked,
}

impl Rule {
    fn message(&self) -> &'static str {
        match self {
            Rule::Required => "This field is required",
            Rule::Email => "Please enter a valid email address",
            Rule::Password => "Password must be at least 6 characters",
            Rule::Matches(_) => "Your passwords don't match. Please try again.",
            Rule::Date => "Please enter a valid date",
            Rule::Checked => "Please accept the privacy policy",
        }
    }
}

/// A field, the element showing its error, and its rules in check order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field_id: &'static str,
    pub error_id: &'static str,
    pub rules: &'static [Rule],
}

/// An inline error for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field_id: String,
    pub error_id: String,
    pub message: String,
}

/// Inline errors collected from one submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error for a single field, outside the declared rules (e.g. a taken email).
    pub fn single(field_id: &str, error_id: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field_id, error_id, message);
        errors
    }

    pub fn push(&mut self, field_id: &str, error_id: &str, message: &str) {
        self.0.push(FieldError {
            field_id: field_id.to_string(),
            error_id: error_id.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for a field, if it failed.
    pub fn message_for(&self, field_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.message.as_str())
    }
}

/// A submitted form that can be checked against its field list.
pub trait FormInput {
    const FIELDS: &'static [FieldSpec];

    /// Raw value of a field; `None` for absent inputs such as unticked checkboxes.
    fn value(&self, field_id: &str) -> Option<&str>;

    /// Run every field's rules; the first failing rule of a field is reported.
    fn check(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        for spec in Self::FIELDS {
            let value = self.value(spec.field_id).unwrap_or("");
            let failed = spec.rules.iter().find(|rule| match rule {
                Rule::Required => value.trim().is_empty(),
                Rule::Email => !is_valid_email(value),
                Rule::Password => value.chars().count() < MIN_PASSWORD_LEN,
                Rule::Matches(other) => self.value(other).unwrap_or("") != value,
                Rule::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_err(),
                Rule::Checked => value.is_empty(),
            });
            if let Some(rule) = failed {
                errors.push(spec.field_id, spec.error_id, rule.message());
            }
        }
        errors
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FormInput for LoginForm {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            field_id: "email",
            error_id: "emailError",
            rules: &[Rule::Required, Rule::Email],
        },
        FieldSpec {
            field_id: "password",
            error_id: "passwordError",
            rules: &[Rule::Required],
        },
    ];

    fn value(&self, field_id: &str) -> Option<&str> {
        match field_id {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub accept_policy: Option<String>,
}

impl FormInput for SignupForm {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            field_id: "name",
            error_id: "nameError",
            rules: &[Rule::Required],
        },
        FieldSpec {
            field_id: "email",
            error_id: "emailError",
            rules: &[Rule::Required, Rule::Email],
        },
        FieldSpec {
            field_id: "password",
            error_id: "passwordError",
            rules: &[Rule::Required, Rule::Password],
        },
        FieldSpec {
            field_id: "confirm_password",
            error_id: "confirmPasswordError",
            rules: &[Rule::Required, Rule::Matches("password")],
        },
        FieldSpec {
            field_id: "accept_policy",
            error_id: "policyError",
            rules: &[Rule::Checked],
        },
    ];

    fn value(&self, field_id: &str) -> Option<&str> {
        match field_id {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            "confirm_password" => Some(&self.confirm_password),
            "accept_policy" => self.accept_policy.as_deref(),
            _ => None,
        }
    }
}

impl SignupForm {
    /// Validate and build the user record.
    pub fn into_user(self) -> Result<User, FormErrors> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(User {
            id: String::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        })
    }
}

/// Add-task and edit-task form.
///
/// `assigned_to` is a comma-separated list of contact ids and `subtasks` holds
/// one subtask title per line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub subtasks: String,
}

impl FormInput for TaskForm {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            field_id: "title",
            error_id: "titleError",
            rules: &[Rule::Required],
        },
        FieldSpec {
            field_id: "due_date",
            error_id: "dueDateError",
            rules: &[Rule::Required, Rule::Date],
        },
        FieldSpec {
            field_id: "task_type",
            error_id: "taskTypeError",
            rules: &[Rule::Required],
        },
    ];

    fn value(&self, field_id: &str) -> Option<&str> {
        match field_id {
            "title" => Some(&self.title),
            "due_date" => Some(&self.due_date),
            "task_type" => Some(&self.task_type),
            _ => None,
        }
    }
}

impl TaskForm {
    /// Pre-fill the form from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.clone(),
            priority: task.priority.as_str().to_string(),
            task_type: task.task_type.clone(),
            category: task.category.as_str().to_string(),
            assigned_to: task.assigned_to.join(","),
            subtasks: task
                .subtasks
                .iter()
                .map(|s| s.title.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Validate and build a draft.
    pub fn into_draft(self) -> Result<TaskDraft, FormErrors> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
            priority: Priority::parse(&self.priority),
            task_type: self.task_type.trim().to_string(),
            category: Category::parse(&self.category).unwrap_or_default(),
            assigned_to: parse_assignees(&self.assigned_to),
            subtasks: self
                .subtasks
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(Subtask::new)
                .collect(),
        })
    }
}

/// Split a comma-separated id list into an ordered set.
pub fn parse_assignees(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// A validated task, ready to be created or applied to an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub task_type: String,
    pub category: Category,
    pub assigned_to: Vec<String>,
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    /// A new task record; the store assigns the id.
    pub fn into_task(self) -> Task {
        Task {
            id: String::new(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            task_type: self.task_type,
            category: self.category,
            assigned_to: self.assigned_to,
            subtasks: self.subtasks,
        }
    }

    /// Overwrite the editable fields of `task`.
    ///
    /// Category and type stay as they are. Subtasks whose title already
    /// existed keep their done flag.
    pub fn apply_to(&self, task: &mut Task) {
        task.title = self.title.clone();
        task.description = self.description.clone();
        task.due_date = self.due_date.clone();
        task.priority = self.priority;
        task.assigned_to = self.assigned_to.clone();
        task.subtasks = self
            .subtasks
            .iter()
            .map(|s| Subtask {
                title: s.title.clone(),
                done: task
                    .subtasks
                    .iter()
                    .any(|old| old.title == s.title && old.done),
            })
            .collect();
    }
}

/// Add-contact and edit-contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl FormInput for ContactForm {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            field_id: "name",
            error_id: "contactNameError",
            rules: &[Rule::Required],
        },
        FieldSpec {
            field_id: "email",
            error_id: "contactEmailError",
            rules: &[Rule::Required, Rule::Email],
        },
    ];

    fn value(&self, field_id: &str) -> Option<&str> {
        match field_id {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            _ => None,
        }
    }
}

impl ContactForm {
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone().unwrap_or_default(),
        }
    }

    /// Validate and build a new contact record (no id, no color yet).
    pub fn into_contact(self) -> Result<Contact, FormErrors> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(errors);
        }
        let phone = self.phone.trim();
        Ok(Contact {
            id: String::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            color: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email(" anna.berg@join.dev "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }

    #[test]
    fn login_reports_each_failing_field() {
        let form = LoginForm {
            email: "not-an-email".into(),
            password: String::new(),
        };
        let errors = form.check();
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.message_for("email"),
            Some("Please enter a valid email address")
        );
        assert_eq!(errors.errors()[1].error_id, "passwordError");
    }

    #[test]
    fn signup_checks_length_confirmation_and_policy() {
        let form = SignupForm {
            name: "Anna".into(),
            email: "anna@join.dev".into(),
            password: "12345".into(),
            confirm_password: "54321".into(),
            accept_policy: None,
        };
        let errors = form.into_user().unwrap_err();
        assert_eq!(
            errors.message_for("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            errors.message_for("confirm_password"),
            Some("Your passwords don't match. Please try again.")
        );
        assert!(errors.message_for("accept_policy").is_some());
    }

    #[test]
    fn signup_builds_trimmed_user() {
        let user = SignupForm {
            name: " Anna Berg ".into(),
            email: "anna@join.dev".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            accept_policy: Some("on".into()),
        }
        .into_user()
        .unwrap();
        assert_eq!(user.name, "Anna Berg");
        assert_eq!(user.password, "secret1");
    }

    #[test]
    fn task_form_requires_title_date_and_type() {
        let errors = TaskForm::default().into_draft().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field_id.as_str()).collect();
        assert_eq!(fields, vec!["title", "due_date", "task_type"]);

        let bad_date = TaskForm {
            title: "Plan".into(),
            due_date: "next friday".into(),
            task_type: "User Story".into(),
            ..Default::default()
        };
        assert_eq!(
            bad_date.into_draft().unwrap_err().message_for("due_date"),
            Some("Please enter a valid date")
        );
    }

    #[test]
    fn task_form_builds_draft() {
        let draft = TaskForm {
            title: " Kickoff ".into(),
            description: "Prepare agenda".into(),
            due_date: "2026-11-03".into(),
            priority: "urgent".into(),
            task_type: "User Story".into(),
            category: "awaitFeedback".into(),
            assigned_to: "c1, c2,c1,".into(),
            subtasks: "Book room\n\n Send invite \n".into(),
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.title, "Kickoff");
        assert_eq!(draft.priority, Priority::Urgent);
        assert_eq!(draft.category, Category::AwaitFeedback);
        assert_eq!(draft.assigned_to, vec!["c1", "c2"]);
        assert_eq!(draft.subtasks.len(), 2);
        assert_eq!(draft.subtasks[1].title, "Send invite");

        let task = draft.into_task();
        assert!(task.id.is_empty());
        assert!(task.subtasks.iter().all(|s| !s.done));
    }

    #[test]
    fn unknown_category_defaults_to_todo() {
        let draft = TaskForm {
            title: "x".into(),
            due_date: "2026-01-01".into(),
            task_type: "Technical Task".into(),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.category, Category::ToDo);
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn apply_to_keeps_category_and_done_flags() {
        let mut task = TaskDraft {
            title: "Old".into(),
            description: String::new(),
            due_date: "2026-01-01".into(),
            priority: Priority::Low,
            task_type: "Technical Task".into(),
            category: Category::InProgress,
            assigned_to: vec![],
            subtasks: vec![Subtask::new("Keep"), Subtask::new("Drop")],
        }
        .into_task();
        task.subtasks[0].done = true;

        let edit = TaskDraft {
            title: "New".into(),
            description: "More detail".into(),
            due_date: "2026-02-01".into(),
            priority: Priority::Urgent,
            task_type: "User Story".into(),
            category: Category::ToDo,
            assigned_to: vec!["c9".into()],
            subtasks: vec![Subtask::new("Keep"), Subtask::new("Fresh")],
        };
        edit.apply_to(&mut task);

        assert_eq!(task.title, "New");
        assert_eq!(task.category, Category::InProgress);
        assert_eq!(task.task_type, "Technical Task");
        assert!(task.subtasks[0].done);
        assert!(!task.subtasks[1].done);
    }

    #[test]
    fn contact_form_optional_phone() {
        let contact = ContactForm {
            name: "Tom".into(),
            email: "tom@join.dev".into(),
            phone: "  ".into(),
        }
        .into_contact()
        .unwrap();
        assert_eq!(contact.phone, None);
        assert_eq!(contact.color, None);

        let errors = ContactForm::default().into_contact().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
    }
}
