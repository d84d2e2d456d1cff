//! Self-or-admin access rules.
//!
//! Decisions are pure: the caller resolves the requester's admin flag from
//! the store first, then asks [`authorize`] whether the action may proceed.

use tracing::warn;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// The authenticated caller, as far as access decisions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub subject: Uuid,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Owner only. Admins get no override here.
    EditProfile { target: Uuid },
    DeleteProfile { target: Uuid },
    ListUsers,
}

pub fn is_permitted(requester: &Requester, action: Action) -> bool {
    match action {
        Action::EditProfile { target } => target == requester.subject,
        Action::DeleteProfile { target } => requester.is_admin || target == requester.subject,
        Action::ListUsers => requester.is_admin,
    }
}

pub fn authorize(requester: &Requester, action: Action) -> AppResult<()> {
    if is_permitted(requester, action) {
        Ok(())
    } else {
        warn!(subject = %requester.subject, ?action, "access denied");
        Err(AppError::Forbidden)
    }
}
