use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// User record held by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "uuid")]
    pub id: Uuid,                     // immutable, assigned at creation
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_on: OffsetDateTime,
    pub name: String,
    pub email: String,                // unique across the store, case-sensitive
    #[serde(skip_serializing, default)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub is_adm: bool,
}

/// Fields a profile edit may overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, is_adm: bool) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            created_on: now,
            updated_on: now,
            name,
            email,
            password_hash,
            is_adm,
        }
    }

    /// Shallow-merges `changes` over the record and bumps `updated_on`.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(hash) = changes.password_hash {
            self.password_hash = hash;
        }
        // updated_on must move forward even when the clock has not ticked.
        let now = OffsetDateTime::now_utc();
        self.updated_on = now.max(self.updated_on + Duration::nanoseconds(1));
    }
}
