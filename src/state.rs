use std::sync::Arc;

use chrono::Duration;

use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state. Cloned per request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.security.jwt_secret
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.config.security.jwt_expiry_secs)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config.security.bcrypt_cost
    }
}
