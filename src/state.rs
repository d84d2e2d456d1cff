use crate::config::AppConfig;
use crate::users::repo::{InMemoryUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(config, Arc::new(InMemoryUserStore::new())))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60 * 24,
            },
        });

        Self::from_parts(config, Arc::new(InMemoryUserStore::new()))
    }
}
