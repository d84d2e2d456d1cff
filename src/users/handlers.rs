use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::AppResult,
    json::AppJson,
    state::AppState,
    users::{
        dto::{RegisterRequest, UpdateUserRequest},
        repo_types::User,
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/profile", get(get_profile))
        .route("/users/:id", patch(edit_user).delete(delete_user))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip_all, fields(user_id = %auth.0.sub))]
pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<User>> {
    let user = services::profile(state.users.as_ref(), &auth).await?;
    Ok(Json(user))
}

#[instrument(skip(state, auth, payload), fields(by = %auth.0.sub))]
pub async fn edit_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let user = services::edit(state.users.as_ref(), &auth, id, payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state, auth), fields(by = %auth.0.sub))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete(state.users.as_ref(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(by = %admin.0.sub))]
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
) -> AppResult<Json<Vec<User>>> {
    let users = services::list(state.users.as_ref()).await?;
    Ok(Json(users))
}
