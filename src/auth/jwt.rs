use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = cfg.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        // Expiry is exact: the validity window ends at `exp`.
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
