//! Layered configuration.
//!
//! Settings are read from up to three tiers and merged field by field:
//! 1. **Defaults** - compiled in (`Config::default()`)
//! 2. **Project** - `$CWD/join/config.yaml`
//! 3. **User** - `~/.join/config.yaml`
//!
//! Environment variables are applied on top, and command-line flags on top
//! of those (see `main`).
//!
//! ## Environment Variables
//! - `JOIN_CONFIG_PATH` - Explicit config file (replaces the tier merge)
//! - `JOIN_REMOTE_URL` - Remote database base URL
//! - `JOIN_SESSION_DIR` - Session storage directory
//! - `JOIN_UI_PORT` - Web UI port
//! - `JOIN_USER_DIR` - User config dir (default: `~/.join`)
//! - `JOIN_PROJECT_DIR` - Project config dir (default: `./join`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
