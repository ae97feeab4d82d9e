// src/services/accounts.rs

use crate::{
    error::AppError,
    models::user::{NewUser, User},
    store::{EntityStore, SharedStore},
    utils::hash::{hash_password, verify_password},
};

/// Registration, credential checks and user lookups.
#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
}

impl AccountService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Creates a user with an Argon2-hashed password. `Conflict` if the name is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Checks a username/password pair. Both unknown users and bad passwords are `AuthError`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, AppError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
