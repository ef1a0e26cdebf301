//! User accounts in the session cache.

use super::DataStore;
use crate::error::JoinResult;
use crate::types::{CollectionKind, User};
use tracing::info;

impl DataStore {
    /// Find a user by email, ignoring case and surrounding whitespace.
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim();
        self.get_users()
            .into_iter()
            .find(|u| u.email.trim().eq_ignore_ascii_case(email))
    }

    /// Register a user record. Uniqueness is the caller's concern.
    pub async fn create_user(&mut self, mut user: User) -> JoinResult<User> {
        let mut users = self.users();
        let key = self
            .new_key(CollectionKind::Users, &user, |k| users.contains_key(k))
            .await;
        user.id = key.clone();
        users.insert(key, user.clone());
        self.update_users(users)?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }
}
