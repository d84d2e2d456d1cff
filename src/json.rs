use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// `Json` whose rejections (bad syntax, missing fields, wrong content type)
/// come back as a 400 `{ "message": ... }` body.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            warn!(error = %e, "rejected json body");
            AppError::BadRequest(e.body_text())
        })?;
        Ok(AppJson(data))
    }
}
