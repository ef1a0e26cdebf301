//! Web UI HTTP server module.
//!
//! Serves the login, summary, board, add-task and contacts pages as HTML
//! rendered on the server, with htmx fragments for the board.

mod server;

pub use server::{App, JoinServer, build_router, start_server};
