use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::utils::access::{AccessPolicy, ConfigCredentialStore, CredentialStore, RoleAccessPolicy};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub credentials: Arc<dyn CredentialStore>,
    pub policy: Arc<dyn AccessPolicy>,
}

impl AppState {
    /// Builds the state with the config-backed credential store and role-based admin policy.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, AppError> {
        let credentials = Arc::new(ConfigCredentialStore::from_config(&config)?);
        Ok(Self {
            pool,
            config,
            credentials,
            policy: Arc::new(RoleAccessPolicy),
        })
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
