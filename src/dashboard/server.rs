//! HTTP server implementation for the web UI.
//!
//! Handlers lock the shared [`App`], run one store or board operation and
//! answer with a rendered page, an htmx fragment or a redirect.

use axum::{
    Router,
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use chrono::Timelike;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth;
use crate::board::{Board, MoveDirection};
use crate::config::UiConfig;
use crate::forms::{ContactForm, FormErrors, LoginForm, SignupForm, TaskForm, parse_assignees};
use crate::render::{self, message, page, url_component};
use crate::store::DataStore;
use crate::summary;
use crate::types::{Category, CollectionKind, Priority, User};

/// Store and board shared by all handlers.
pub struct App {
    pub store: DataStore,
    pub board: Board,
}

impl App {
    /// Hydrate the store and build the board from it.
    pub async fn start(mut store: DataStore) -> crate::error::JoinResult<Self> {
        store.initialize().await?;
        let board = Board::load(&store);
        Ok(Self { store, board })
    }

    /// Push the given collections when write-through is on.
    async fn sync(&self, kinds: &[CollectionKind]) {
        for kind in kinds {
            if self.store.write_through() && !self.store.sync(*kind).await {
                warn!(collection = %kind, "Write-through failed; change kept locally");
            }
        }
    }

    fn board_fragment(&mut self) -> String {
        self.board.reload(&self.store);
        let contacts = self.store.get_contacts();
        render::board::columns_fragment(&self.board.columns(), &contacts, self.board.query())
    }
}

/// Server state shared across handlers.
#[derive(Clone)]
pub struct JoinServer {
    app: Arc<Mutex<App>>,
}

impl JoinServer {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
        }
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct NoticeParams {
    msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewTaskParams {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssigneeParams {
    #[serde(default)]
    assignee_query: String,
    #[serde(default)]
    assigned_to: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContactParams {
    new: Option<String>,
    edit: Option<String>,
}

/// The logged-in user, or a redirect to the login page.
fn require_user(app: &App) -> Result<User, Response> {
    auth::current_user(&app.store).ok_or_else(|| Redirect::to("/login").into_response())
}

fn html_page(title: &str, active: &str, user: Option<&User>, content: &str) -> Response {
    Html(page(title, active, user, content)).into_response()
}

async fn root(State(state): State<JoinServer>) -> Redirect {
    let app = state.app.lock().await;
    match auth::current_user(&app.store) {
        Some(_) => Redirect::to("/summary"),
        None => Redirect::to("/login"),
    }
}

async fn login_page(Query(params): Query<NoticeParams>) -> Response {
    let notice = match params.msg.as_deref() {
        Some("signed-up") => Some("You Signed Up successfully"),
        _ => None,
    };
    html_page(
        "Log in",
        "",
        None,
        &render::forms::login(&LoginForm::default(), &FormErrors::new(), notice),
    )
}

async fn login_submit(State(state): State<JoinServer>, Form(form): Form<LoginForm>) -> Response {
    let app = state.app.lock().await;
    match auth::log_in(&app.store, form.clone()) {
        Ok(_) => Redirect::to("/summary").into_response(),
        Err(errors) => html_page("Log in", "", None, &render::forms::login(&form, &errors, None)),
    }
}

async fn login_guest(State(state): State<JoinServer>) -> Response {
    let app = state.app.lock().await;
    match auth::log_in_guest(&app.store) {
        Ok(_) => Redirect::to("/summary").into_response(),
        Err(e) => {
            warn!(error = %e, "Guest login failed");
            let errors = FormErrors::single("form", "formError", &e.message);
            html_page(
                "Log in",
                "",
                None,
                &render::forms::login(&LoginForm::default(), &errors, None),
            )
        }
    }
}

async fn logout(State(state): State<JoinServer>) -> Redirect {
    let app = state.app.lock().await;
    if let Err(e) = auth::log_out(&app.store) {
        warn!(error = %e, "Failed to clear current user");
    }
    Redirect::to("/login")
}

async fn signup_page() -> Response {
    html_page(
        "Sign up",
        "",
        None,
        &render::forms::signup(&SignupForm::default(), &FormErrors::new()),
    )
}

async fn signup_submit(State(state): State<JoinServer>, Form(form): Form<SignupForm>) -> Response {
    let mut app = state.app.lock().await;
    match auth::sign_up(&mut app.store, form.clone()).await {
        Ok(_) => {
            app.sync(&[CollectionKind::Users]).await;
            Redirect::to("/login?msg=signed-up").into_response()
        }
        Err(errors) => html_page("Sign up", "", None, &render::forms::signup(&form, &errors)),
    }
}

async fn summary_page(State(state): State<JoinServer>) -> Response {
    let app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let metrics = summary::refresh(&app.store).unwrap_or_else(|e| {
        warn!(error = %e, "Summary snapshot not saved");
        summary::summarize(&app.store.get_tasks())
    });
    let greeting = summary::greeting(chrono::Local::now().hour());
    html_page(
        "Summary",
        "/summary",
        Some(&user),
        &render::summary::summary(&metrics, Some(&user), greeting),
    )
}

async fn board_page(State(state): State<JoinServer>, Query(params): Query<SearchParams>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let App { store, board } = &mut *app;
    board.reload(store);
    board.set_query(params.q.as_deref());
    let contacts = store.get_contacts();
    html_page(
        "Board",
        "/board",
        Some(&user),
        &render::board::board(&board.columns(), &contacts, board.query()),
    )
}

async fn board_columns(State(state): State<JoinServer>, Query(params): Query<SearchParams>) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    app.board.set_query(params.q.as_deref());
    Html(app.board_fragment()).into_response()
}

async fn drag_start(State(state): State<JoinServer>, Path(task_id): Path<String>) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    app.board.start_dragging(&task_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn drop_on_column(
    State(state): State<JoinServer>,
    Path(column): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(category) = Category::from_column_id(&column) else {
        return (StatusCode::NOT_FOUND, "Unknown column").into_response();
    };
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    board.reload(store);
    board.set_query(params.q.as_deref());
    match board.drop_on(category, store) {
        Ok(true) => app.sync(&[CollectionKind::Tasks]).await,
        Ok(false) => {}
        Err(e) => warn!(error = %e, column = %column, "Drop failed"),
    }
    Html(app.board_fragment()).into_response()
}

async fn move_overlay(
    State(state): State<JoinServer>,
    Path(task_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    board.reload(store);
    let html = match board.task(&task_id) {
        Some(task) => render::board::move_overlay(task, &board.move_options(&task_id), params.q.as_deref()),
        None => message("error", "Task not found"),
    };
    Html(html).into_response()
}

async fn move_task(
    State(state): State<JoinServer>,
    Path((task_id, direction)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(direction) = MoveDirection::parse(&direction) else {
        return (StatusCode::NOT_FOUND, "Unknown direction").into_response();
    };
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    board.reload(store);
    board.set_query(params.q.as_deref());
    match board.move_task(&task_id, direction, store) {
        Ok(true) => app.sync(&[CollectionKind::Tasks]).await,
        Ok(false) => {}
        Err(e) => warn!(error = %e, task_id = %task_id, "Move failed"),
    }
    // Clear the overlay out of band alongside the refreshed columns.
    let html = format!(
        r#"{}<div id="overlay" hx-swap-oob="true"></div>"#,
        app.board_fragment()
    );
    Html(html).into_response()
}

async fn task_detail(State(state): State<JoinServer>, Path(task_id): Path<String>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let App { store, board } = &mut *app;
    board.reload(store);
    let contacts = store.get_contacts();
    match board.task(&task_id) {
        Some(task) => html_page(
            &task.title,
            "/board",
            Some(&user),
            &render::board::task_detail(task, &contacts),
        ),
        None => Redirect::to("/board").into_response(),
    }
}

/// Delete a task. A failed write is only logged: the board comes back unchanged.
async fn task_delete(State(state): State<JoinServer>, Path(task_id): Path<String>) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    board.reload(store);
    match board.delete_task(&task_id, store) {
        Ok(true) => app.sync(&[CollectionKind::Tasks]).await,
        Ok(false) => {}
        Err(e) => warn!(error = %e, task_id = %task_id, "Delete failed; board restored"),
    }
    Redirect::to("/board").into_response()
}

async fn toggle_subtask(
    State(state): State<JoinServer>,
    Path((task_id, index)): Path<(String, usize)>,
) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    board.reload(store);
    match board.toggle_subtask(&task_id, index, store) {
        Ok(true) => app.sync(&[CollectionKind::Tasks]).await,
        Ok(false) => {}
        Err(e) => warn!(error = %e, task_id = %task_id, "Subtask toggle failed"),
    }
    Redirect::to(&format!("/board/tasks/{}", url_component(&task_id))).into_response()
}

async fn edit_task_page(State(state): State<JoinServer>, Path(task_id): Path<String>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let Some(task) = app.store.find_task(&task_id) else {
        return Redirect::to("/board").into_response();
    };
    let contacts = app.store.get_contacts();
    let action = format!("/board/tasks/{}/edit", url_component(&task_id));
    html_page(
        "Edit Task",
        "/board",
        Some(&user),
        &render::forms::task_form(&TaskForm::from_task(&task), &FormErrors::new(), &contacts, &action, "Ok"),
    )
}

async fn edit_task_submit(
    State(state): State<JoinServer>,
    Path(task_id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let errors = match form.clone().into_draft() {
        Ok(draft) => {
            let App { store, board } = &mut *app;
            board.reload(store);
            match board.edit_task(&task_id, &draft, store) {
                Ok(_) => {
                    app.sync(&[CollectionKind::Tasks]).await;
                    return Redirect::to(&format!("/board/tasks/{}", url_component(&task_id))).into_response();
                }
                Err(e) => FormErrors::single("form", "formError", &e.message),
            }
        }
        Err(errors) => errors,
    };
    let contacts = app.store.get_contacts();
    let action = format!("/board/tasks/{}/edit", url_component(&task_id));
    html_page(
        "Edit Task",
        "/board",
        Some(&user),
        &render::forms::task_form(&form, &errors, &contacts, &action, "Ok"),
    )
}

async fn new_task_page(State(state): State<JoinServer>, Query(params): Query<NewTaskParams>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let form = TaskForm {
        priority: Priority::default().as_str().to_string(),
        category: params.category.unwrap_or_default(),
        ..Default::default()
    };
    let contacts = app.store.get_contacts();
    html_page(
        "Add Task",
        "/tasks/new",
        Some(&user),
        &render::forms::task_form(&form, &FormErrors::new(), &contacts, "/tasks/new", "Create Task"),
    )
}

async fn new_task_submit(State(state): State<JoinServer>, Form(form): Form<TaskForm>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let errors = match form.clone().into_draft() {
        Ok(draft) => {
            let App { store, board } = &mut *app;
            match board.add_task(draft.into_task(), store).await {
                Ok(task) => {
                    info!(task_id = %task.id, "Task added");
                    app.sync(&[CollectionKind::Tasks]).await;
                    return Redirect::to("/board").into_response();
                }
                Err(e) => FormErrors::single("form", "formError", &e.message),
            }
        }
        Err(errors) => errors,
    };
    let contacts = app.store.get_contacts();
    html_page(
        "Add Task",
        "/tasks/new",
        Some(&user),
        &render::forms::task_form(&form, &errors, &contacts, "/tasks/new", "Create Task"),
    )
}

async fn assignee_options(State(state): State<JoinServer>, Query(params): Query<AssigneeParams>) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let contacts = app.store.get_contacts();
    Html(render::forms::assignee_options(
        &contacts,
        &params.assignee_query,
        &parse_assignees(&params.assigned_to),
    ))
    .into_response()
}

async fn contacts_page(State(state): State<JoinServer>, Query(params): Query<ContactParams>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let contacts = app.store.get_contacts();
    let mut content = render::contacts::contact_list(&contacts, None);
    if params.new.is_some() {
        content.push_str(&render::forms::contact_form(
            &ContactForm::default(),
            &FormErrors::new(),
            "/contacts",
            "Create contact",
        ));
    }
    html_page("Contacts", "/contacts", Some(&user), &content)
}

async fn contact_page(
    State(state): State<JoinServer>,
    Path(contact_id): Path<String>,
    Query(params): Query<ContactParams>,
) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let contacts = app.store.get_contacts();
    let Some(contact) = crate::contacts::find(&contacts, &contact_id) else {
        return Redirect::to("/contacts").into_response();
    };
    let mut content = render::contacts::contact_list(&contacts, Some(contact));
    if params.edit.is_some() {
        content.push_str(&render::forms::contact_form(
            &ContactForm::from_contact(contact),
            &FormErrors::new(),
            &format!("/contacts/{}", url_component(&contact.id)),
            "Save",
        ));
    }
    html_page(&contact.name, "/contacts", Some(&user), &content)
}

async fn contact_create(State(state): State<JoinServer>, Form(form): Form<ContactForm>) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let errors = match form.clone().into_contact() {
        Ok(contact) => match app.store.create_contact(contact).await {
            Ok(created) => {
                app.sync(&[CollectionKind::Contacts]).await;
                return Redirect::to(&format!("/contacts/{}", url_component(&created.id))).into_response();
            }
            Err(e) => FormErrors::single("form", "formError", &e.message),
        },
        Err(errors) => errors,
    };
    let contacts = app.store.get_contacts();
    let content = format!(
        "{}{}",
        render::contacts::contact_list(&contacts, None),
        render::forms::contact_form(&form, &errors, "/contacts", "Create contact")
    );
    html_page("Contacts", "/contacts", Some(&user), &content)
}

async fn contact_update(
    State(state): State<JoinServer>,
    Path(contact_id): Path<String>,
    Form(form): Form<ContactForm>,
) -> Response {
    let mut app = state.app.lock().await;
    let user = match require_user(&app) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let errors = match form.clone().into_contact() {
        Ok(edited) => match app.store.edit_contact(
            &contact_id,
            &edited.name,
            &edited.email,
            edited.phone.as_deref(),
        ) {
            Ok(_) => {
                app.sync(&[CollectionKind::Contacts]).await;
                return Redirect::to(&format!("/contacts/{}", url_component(&contact_id))).into_response();
            }
            Err(e) => FormErrors::single("form", "formError", &e.message),
        },
        Err(errors) => errors,
    };
    let contacts = app.store.get_contacts();
    let selected = crate::contacts::find(&contacts, &contact_id);
    let content = format!(
        "{}{}",
        render::contacts::contact_list(&contacts, selected),
        render::forms::contact_form(&form, &errors, &format!("/contacts/{}", url_component(&contact_id)), "Save")
    );
    html_page("Contacts", "/contacts", Some(&user), &content)
}

/// Delete a contact; the board picks up the unassigned tasks right away.
async fn contact_delete(State(state): State<JoinServer>, Path(contact_id): Path<String>) -> Response {
    let mut app = state.app.lock().await;
    if let Err(redirect) = require_user(&app) {
        return redirect;
    }
    let App { store, board } = &mut *app;
    match store.delete_contact(&contact_id) {
        Ok(true) => {
            board.reload(store);
            app.sync(&[CollectionKind::Contacts, CollectionKind::Tasks]).await;
        }
        Ok(false) => {}
        Err(e) => warn!(error = %e, contact_id = %contact_id, "Contact delete failed"),
    }
    Redirect::to("/contacts").into_response()
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: JoinServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Auth
        .route("/", get(root))
        .route("/login", get(login_page).post(login_submit))
        .route("/login/guest", post(login_guest))
        .route("/logout", post(logout))
        .route("/signup", get(signup_page).post(signup_submit))
        // Pages
        .route("/summary", get(summary_page))
        .route("/board", get(board_page))
        .route("/board/tasks/{task_id}", get(task_detail))
        .route("/board/tasks/{task_id}/edit", get(edit_task_page).post(edit_task_submit))
        .route("/board/tasks/{task_id}/delete", post(task_delete))
        .route(
            "/board/tasks/{task_id}/subtasks/{index}/toggle",
            post(toggle_subtask),
        )
        .route("/tasks/new", get(new_task_page).post(new_task_submit))
        .route("/contacts", get(contacts_page).post(contact_create))
        .route("/contacts/{contact_id}", get(contact_page).post(contact_update))
        .route("/contacts/{contact_id}/delete", post(contact_delete))
        // htmx fragments
        .route("/board/columns", get(board_columns))
        .route("/board/drag/{task_id}", post(drag_start))
        .route("/board/drop/{column}", post(drop_on_column))
        .route("/board/tasks/{task_id}/move", get(move_overlay))
        .route("/board/tasks/{task_id}/move/{direction}", post(move_task))
        .route("/tasks/assignees", get(assignee_options))
        // API
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn start_server(
    app: App,
    ui: &UiConfig,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let router = build_router(JoinServer::new(app));

    let addr: SocketAddr = format!("{}:{}", ui.bind, ui.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Join board listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Join board shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::remote::MemoryRemote;
    use crate::session::{MemorySessionStorage, SessionStorage};
    use axum::http::header::LOCATION;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Session storage whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemorySessionStorage,
        fail_writes: AtomicBool,
    }

    impl FlakyStorage {
        fn check(&self) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::Relaxed) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            Ok(())
        }
    }

    impl SessionStorage for FlakyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check()?;
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.check()?;
            self.inner.remove_item(key)
        }

        fn clear(&self) -> Result<(), StorageError> {
            self.check()?;
            self.inner.clear()
        }
    }

    fn seeded_remote() -> Arc<MemoryRemote> {
        Arc::new(
            MemoryRemote::new()
                .with_collection(
                    "contacts",
                    json!({
                        "contactId2": {"name": "Ben Cole", "email": "ben@join.dev", "color": "#FF7A00"},
                        "contactId4": {"name": "Dora Eck", "email": "dora@join.dev", "color": "#FF5EB3"}
                    }),
                )
                .with_collection(
                    "tasks",
                    json!({
                        "task7": {
                            "title": "Plan offsite",
                            "description": "Agenda and login badges",
                            "dueDate": "2026-11-18",
                            "priority": "urgent",
                            "taskType": "User Story",
                            "category": "in progress",
                            "assignedTo": ["contactId2", "contactId4"]
                        },
                        "task8": {
                            "title": "Book venue",
                            "dueDate": "2026-11-25",
                            "priority": "low",
                            "taskType": "Technical Task",
                            "category": "to do",
                            "assignedTo": ["contactId4"]
                        }
                    }),
                ),
        )
    }

    async fn server_with(storage: Arc<dyn SessionStorage>, logged_in: bool) -> JoinServer {
        let store = DataStore::new(seeded_remote(), storage);
        let app = App::start(store).await.unwrap();
        if logged_in {
            auth::log_in_guest(&app.store).unwrap();
        }
        JoinServer::new(app)
    }

    async fn logged_in_server() -> JoinServer {
        server_with(Arc::new(MemorySessionStorage::new()), true).await
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn stored_assignees(state: &JoinServer, task_id: &str) -> Vec<String> {
        let app = state.app.lock().await;
        app.store.find_task(task_id).unwrap().assigned_to
    }

    async fn delete_dora(state: &JoinServer) {
        let response = contact_delete(State(state.clone()), Path("contactId4".into())).await;
        assert_eq!(location(&response), "/contacts");
        assert_eq!(stored_assignees(state, "task7").await, vec!["contactId2".to_string()]);
        assert!(stored_assignees(state, "task8").await.is_empty());
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[tokio::test]
    async fn drop_after_contact_delete_keeps_it_unassigned() {
        let state = logged_in_server().await;
        delete_dora(&state).await;

        let response = drag_start(State(state.clone()), Path("task7".into())).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = drop_on_column(
            State(state.clone()),
            Path("done".into()),
            Query(SearchParams::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let app = state.app.lock().await;
        let task = app.store.find_task("task7").unwrap();
        assert_eq!(task.category, Category::Done);
        assert_eq!(task.assigned_to, vec!["contactId2".to_string()]);
        assert!(app.store.find_task("task8").unwrap().assigned_to.is_empty());
    }

    #[tokio::test]
    async fn overlay_move_after_contact_delete_keeps_it_unassigned() {
        let state = logged_in_server().await;
        delete_dora(&state).await;

        let response = move_task(
            State(state.clone()),
            Path(("task8".into(), "down".into())),
            Query(SearchParams::default()),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains(r#"<div id="overlay" hx-swap-oob="true"></div>"#));

        let app = state.app.lock().await;
        let task = app.store.find_task("task8").unwrap();
        assert_eq!(task.category, Category::InProgress);
        assert!(task.assigned_to.is_empty());
        assert_eq!(app.store.find_task("task7").unwrap().assigned_to, vec!["contactId2".to_string()]);
    }

    #[tokio::test]
    async fn task_delete_after_contact_delete_keeps_it_unassigned() {
        let state = logged_in_server().await;
        delete_dora(&state).await;

        let response = task_delete(State(state.clone()), Path("task8".into())).await;
        assert_eq!(location(&response), "/board");

        let app = state.app.lock().await;
        assert!(app.store.find_task("task8").is_none());
        assert_eq!(app.store.find_task("task7").unwrap().assigned_to, vec!["contactId2".to_string()]);
    }

    #[tokio::test]
    async fn failed_task_delete_shows_unchanged_board() {
        let storage = Arc::new(FlakyStorage::default());
        let state = server_with(storage.clone(), true).await;

        storage.fail_writes.store(true, Ordering::Relaxed);
        let response = task_delete(State(state.clone()), Path("task7".into())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/board");
        assert!(state.app.lock().await.store.find_task("task7").is_some());

        let html = body_text(board_page(State(state.clone()), Query(SearchParams::default())).await).await;
        assert!(html.contains("Plan offsite"));
        assert!(!html.contains("message-error"));
        assert!(!html.contains("could not be deleted"));
    }

    #[tokio::test]
    async fn board_columns_apply_search_query() {
        let state = logged_in_server().await;

        let params = SearchParams {
            q: Some("LOGIN".into()),
        };
        let html = body_text(board_columns(State(state.clone()), Query(params)).await).await;
        assert!(html.contains("Plan offsite"));
        assert!(!html.contains("Book venue"));
        assert!(html.contains("No matching tasks found"));
        assert!(html.contains("/move?q=LOGIN"));

        let params = SearchParams { q: Some(" ".into()) };
        let html = body_text(board_columns(State(state.clone()), Query(params)).await).await;
        assert!(html.contains("Plan offsite"));
        assert!(html.contains("Book venue"));
    }

    #[tokio::test]
    async fn board_mutations_require_login() {
        let state = server_with(Arc::new(MemorySessionStorage::new()), false).await;

        let response = drag_start(State(state.clone()), Path("task7".into())).await;
        assert_eq!(location(&response), "/login");
        let response = contact_delete(State(state.clone()), Path("contactId4".into())).await;
        assert_eq!(location(&response), "/login");
        let response = task_delete(State(state.clone()), Path("task7".into())).await;
        assert_eq!(location(&response), "/login");

        let mut app = state.app.lock().await;
        assert!(app.board.dragged().is_none());
        assert!(app.store.find_task("task7").is_some());
        assert_eq!(app.store.get_contacts().len(), 2);
    }
}
