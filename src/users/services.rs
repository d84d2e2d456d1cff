use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::AuthUser,
        password,
        policy::{self, Action},
        services::is_valid_email,
    },
    error::{AppError, AppResult},
    users::{
        dto::{RegisterRequest, UpdateUserRequest},
        repo::UserStore,
        repo_types::{User, UserChanges},
    },
};

fn check_email(email: &str) -> AppResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        warn!(email = %email, "invalid email");
        Err(AppError::BadRequest("Invalid email".into()))
    }
}

pub async fn register(users: &dyn UserStore, req: RegisterRequest) -> AppResult<User> {
    // Cheap rejection before paying for a hash; the store re-checks on insert.
    if users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::Conflict);
    }
    check_email(&req.email)?;

    let hash = password::hash(req.password).await?;
    let user = users
        .insert(User::new(req.name, req.email, hash, req.is_adm))
        .await?;

    info!(user_id = %user.id, is_adm = user.is_adm, "user registered");
    Ok(user)
}

pub async fn profile(users: &dyn UserStore, auth: &AuthUser) -> AppResult<User> {
    auth.account(users).await?.ok_or_else(|| {
        warn!(user_id = %auth.0.sub, "token refers to a missing account");
        AppError::NotFound
    })
}

pub async fn edit(
    users: &dyn UserStore,
    auth: &AuthUser,
    target: Uuid,
    req: UpdateUserRequest,
) -> AppResult<User> {
    if users.find_by_id(target).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let requester = auth.requester(users).await?;
    policy::authorize(&requester, Action::EditProfile { target })?;

    if let Some(email) = req.email.as_deref() {
        check_email(email)?;
    }
    let password_hash = match req.password {
        Some(plain) => Some(password::hash(plain).await?),
        None => None,
    };

    let user = users
        .update(
            target,
            UserChanges {
                name: req.name,
                email: req.email,
                password_hash,
            },
        )
        .await?;

    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

pub async fn delete(users: &dyn UserStore, auth: &AuthUser, target: Uuid) -> AppResult<()> {
    let requester = auth.requester(users).await?;
    policy::authorize(&requester, Action::DeleteProfile { target })?;

    match users.remove(target).await? {
        Some(_) => {
            info!(user_id = %target, by = %requester.subject, "user deleted");
            Ok(())
        }
        None => Err(AppError::NotFound),
    }
}

pub async fn list(users: &dyn UserStore) -> AppResult<Vec<User>> {
    users.list().await
}
