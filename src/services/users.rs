use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{CreateUserRequest, NewUser, User},
};

const USERNAME_MIN_CHARS: usize = 3;
const LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Registers a user; usernames are unique and a duplicate is rejected
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<User> {
        let new_user = validate_new_user(request)?;
        let user = self.store.create(new_user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))
    }

    /// The newest users, at most 100
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list(LIST_LIMIT).await
    }
}

fn validate_new_user(request: CreateUserRequest) -> AppResult<NewUser> {
    let username = request.username.trim().to_string();
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if username.chars().count() < USERNAME_MIN_CHARS || !valid_chars {
        return Err(AppError::InvalidInput(
            "username must be at least 3 characters of letters, numbers, underscores or hyphens"
                .to_string(),
        ));
    }

    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if let Some(email) = &email {
        let looks_valid = email
            .split_once('@')
            .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
        if !looks_valid {
            return Err(AppError::InvalidInput(format!("invalid email: {}", email)));
        }
    }

    let interests = request
        .interests
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    Ok(NewUser {
        username,
        email,
        interests,
    })
}
