use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{
    claims::Claims,
    jwt::JwtKeys,
    policy::{self, Action, Requester},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{repo::UserStore, repo_types::User},
};

/// Verified token claims of the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The account this token was issued for: looked up by the email claim
    /// and accepted only if its id matches the subject. An email re-registered
    /// by someone else after the original account went away does not match.
    pub async fn account(&self, users: &dyn UserStore) -> AppResult<Option<User>> {
        let found = users.find_by_email(&self.0.email).await?;
        Ok(found.filter(|u| {
            let same = u.id == self.0.sub;
            if !same {
                warn!(sub = %self.0.sub, found = %u.id, "token email now belongs to another account");
            }
            same
        }))
    }

    /// Resolves the caller's admin flag from their own account. A vanished
    /// account counts as a non-admin.
    pub async fn requester(&self, users: &dyn UserStore) -> AppResult<Requester> {
        let is_admin = self.account(users).await?.is_some_and(|u| u.is_adm);
        Ok(Requester {
            subject: self.0.sub,
            is_admin,
        })
    }
}

/// Returns the token part of `Authorization: <scheme> <token>`. The scheme is
/// not checked.
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized("Missing authorization headers"))?;

        let token = bearer_token(header)
            .ok_or(AppError::Unauthorized("Invalid authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Gate for admin-only routes: a verified token whose account is an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let requester = auth.requester(state.users.as_ref()).await?;
        policy::authorize(&requester, Action::ListUsers)?;
        Ok(AdminUser(auth.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_takes_second_segment() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Token   abc"), Some("abc"));
        assert_eq!(bearer_token("abc"), None);
        assert_eq!(bearer_token(""), None);
    }
}
