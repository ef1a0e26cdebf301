//! Sign-up, login and the logged-in user kept in session storage.

use crate::error::{JoinError, JoinResult};
use crate::forms::{FormErrors, FormInput, LoginForm, SignupForm};
use crate::session::{self, CURRENT_USER_KEY};
use crate::store::DataStore;
use crate::types::User;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Display name of the guest account.
pub const GUEST_NAME: &str = "Guest";

/// Register a new account.
///
/// Field errors come back inline. An email that already exists (compared
/// case-insensitively) is reported on the email field and nothing is written.
pub async fn sign_up(store: &mut DataStore, form: SignupForm) -> Result<User, FormErrors> {
    let user = form.into_user()?;
    if store.find_user_by_email(&user.email).is_some() {
        let err = JoinError::email_in_use();
        info!(email = %user.email, "Sign-up rejected: email in use");
        return Err(FormErrors::single("email", "emailError", &err.message));
    }
    store
        .create_user(user)
        .await
        .map_err(|e| FormErrors::single("form", "formError", &e.message))
}

/// Log in with email and password and remember the user for the session.
pub fn log_in(store: &DataStore, form: LoginForm) -> Result<User, FormErrors> {
    let errors = form.check();
    if !errors.is_empty() {
        return Err(errors);
    }
    let credentials_error = || {
        let err = JoinError::invalid_credentials();
        FormErrors::single("password", "loginError", &err.message)
    };
    let user = store
        .find_user_by_email(&form.email)
        .filter(|u| u.password == form.password)
        .ok_or_else(credentials_error)?;

    remember(store, &user).map_err(|e| FormErrors::single("form", "formError", &e.message))?;
    info!(user_id = %user.id, "User logged in");
    Ok(user)
}

/// Log in as the shared guest account.
pub fn log_in_guest(store: &DataStore) -> JoinResult<User> {
    let guest = User {
        id: String::new(),
        name: GUEST_NAME.to_string(),
        email: String::new(),
        password: String::new(),
    };
    remember(store, &guest)?;
    info!("Guest logged in");
    Ok(guest)
}

/// Forget the logged-in user.
pub fn log_out(store: &DataStore) -> JoinResult<()> {
    store.storage().remove_item(CURRENT_USER_KEY)?;
    Ok(())
}

/// The logged-in user, if any. Unreadable entries count as logged out.
pub fn current_user(store: &DataStore) -> Option<User> {
    match session::load_json::<SessionUser>(store.storage().as_ref(), CURRENT_USER_KEY) {
        Ok(user) => user.map(User::from),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable current user entry");
            None
        }
    }
}

pub fn is_guest(user: &User) -> bool {
    user.email.is_empty() && user.name == GUEST_NAME
}

/// Session copy of the logged-in user: keeps the id, never the password.
#[derive(Debug, Serialize, Deserialize)]
struct SessionUser {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    email: String,
}

impl From<SessionUser> for User {
    fn from(user: SessionUser) -> Self {
        User {
            id: user.id,
            name: user.name,
            email: user.email,
            password: String::new(),
        }
    }
}

fn remember(store: &DataStore, user: &User) -> JoinResult<()> {
    let stored = SessionUser {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
    };
    session::save_json(store.storage().as_ref(), CURRENT_USER_KEY, &stored)?;
    Ok(())
}
