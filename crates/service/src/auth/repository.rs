use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// New user with the default role; `Conflict` when the email is taken.
    async fn create_user(&self, email: &str, name: &str, password_hash: String) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    /// Overwrite (or clear with `None`) the stored refresh-token hash.
    async fn set_refresh_token_hash(&self, user_id: Uuid, hash: Option<String>) -> Result<(), AuthError>;
    /// Replace the refresh-token hash only if it still equals `expected`.
    /// `false` means another rotation or a logout got there first.
    async fn rotate_refresh_token_hash(&self, user_id: Uuid, expected: &str, next: String) -> Result<bool, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use models::user::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, password_hash: String) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: email.to_string(), name: name.to_string(), role: Role::default() };
            users.insert(email.to_string(), user.clone());
            self.creds
                .lock()
                .unwrap()
                .insert(user.id, Credentials { user_id: user.id, password_hash, refresh_token_hash: None });
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn set_refresh_token_hash(&self, user_id: Uuid, hash: Option<String>) -> Result<(), AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = creds.get_mut(&user_id).ok_or(AuthError::NotFound)?;
            c.refresh_token_hash = hash;
            Ok(())
        }

        async fn rotate_refresh_token_hash(&self, user_id: Uuid, expected: &str, next: String) -> Result<bool, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            match creds.get_mut(&user_id) {
                Some(c) if c.refresh_token_hash.as_deref() == Some(expected) => {
                    c.refresh_token_hash = Some(next);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
