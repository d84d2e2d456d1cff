use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::users::repo_types::{User, UserChanges};

/// Storage seam for user records.
///
/// Each method is a single atomic step: implementations must run the whole
/// check-then-write sequence under one lock so that email uniqueness holds
/// under concurrent requests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Inserts a new record. Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: User) -> AppResult<User>;

    /// Merges `changes` into the record with `id` and returns the new value.
    /// Fails with `NotFound` if absent, `Conflict` if the new email belongs to
    /// another record.
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Removes the record, returning it if it existed.
    async fn remove(&self, id: Uuid) -> AppResult<Option<User>>;

    /// All records, oldest first.
    async fn list(&self) -> AppResult<Vec<User>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict);
        }

        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, total = users.len(), "user inserted");
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut users = self.users.write().await;

        if let Some(email) = changes.email.as_deref() {
            if users.values().any(|u| u.id != id && u.email == email) {
                return Err(AppError::Conflict);
            }
        }

        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.apply(changes);
        debug!(user_id = %id, "user updated");
        Ok(user.clone())
    }

    async fn remove(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id);
        debug!(user_id = %id, removed = removed.is_some(), "user remove");
        Ok(removed)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_on.cmp(&b.created_on));
        Ok(all)
    }
}
