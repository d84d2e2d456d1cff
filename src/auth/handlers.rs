use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        jwt::JwtKeys,
        services::authenticate,
    },
    error::AppResult,
    json::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let token = authenticate(
        state.users.as_ref(),
        &keys,
        &payload.email,
        payload.password,
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}
