use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{jwt::JwtKeys, password};
use crate::{
    error::{AppError, AppResult},
    users::repo::UserStore,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    // Unknown emails are checked against this so both login failures cost one
    // argon2 verify.
    static ref DUMMY_HASH: Option<String> = password::hash_password("no-such-account").ok();
}

/// Checks credentials and issues a token bound to the account.
///
/// Unknown email and wrong password fail identically so callers cannot probe
/// which accounts exist.
pub async fn authenticate(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    plain_password: String,
) -> AppResult<String> {
    let Some(user) = users.find_by_email(email).await? else {
        if let Some(dummy) = DUMMY_HASH.as_ref() {
            let _ = password::verify(plain_password, dummy.clone()).await;
        }
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify(plain_password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue(user.id, &user.email)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::users::repo_types::User;
    use axum::extract::FromRef;

    async fn state_with_user(email: &str, plain: &str) -> (AppState, User) {
        let state = AppState::fake();
        let hash = password::hash_password(plain).unwrap();
        let user = state
            .users
            .insert(User::new("A".into(), email.into(), hash, false))
            .await
            .unwrap();
        (state, user)
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn dummy_hash_is_real_argon2() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(dummy.starts_with("$argon2"));
        assert!(!password::verify_password("p", dummy).unwrap());
    }

    #[tokio::test]
    async fn authenticate_issues_token_for_account() {
        let (state, user) = state_with_user("a@x.com", "p").await;
        let keys = JwtKeys::from_ref(&state);

        let token = authenticate(state.users.as_ref(), &keys, "a@x.com", "p".into())
            .await
            .unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (state, _) = state_with_user("a@x.com", "p").await;
        let keys = JwtKeys::from_ref(&state);

        let wrong_pw = authenticate(state.users.as_ref(), &keys, "a@x.com", "nope".into())
            .await
            .unwrap_err();
        let unknown = authenticate(state.users.as_ref(), &keys, "b@x.com", "p".into())
            .await
            .unwrap_err();

        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }
}
