// src/utils/access.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppError,
    utils::hash::{hash_password, verify_password},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

/// An authenticated caller, as established by a `CredentialStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

/// Resolves a username/password pair to an identity.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `Ok(None)` when the credentials are rejected.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<Option<Identity>, AppError>;
}

/// Decides whether an identity may perform admin-only catalog operations.
pub trait AccessPolicy: Send + Sync {
    fn can_administer(&self, identity: &Identity) -> bool;
}

/// Credential store backed by the configured admin account.
///
/// The admin password is kept only as an Argon2 hash. Any other non-empty
/// username/password pair is admitted as a student.
pub struct ConfigCredentialStore {
    admin: Option<(String, String)>,
}

impl ConfigCredentialStore {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let admin = match (&config.admin_username, &config.admin_password) {
            (Some(username), Some(password)) => Some((username.clone(), hash_password(password)?)),
            _ => None,
        };
        Ok(Self { admin })
    }
}

#[async_trait]
impl CredentialStore for ConfigCredentialStore {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Ok(None);
        }

        if let Some((admin_username, admin_hash)) = &self.admin {
            if username == admin_username.as_str() {
                if !verify_password(password, admin_hash)? {
                    return Ok(None);
                }
                return Ok(Some(Identity {
                    username: username.to_string(),
                    role: Role::Admin,
                }));
            }
        }

        Ok(Some(Identity {
            username: username.to_string(),
            role: Role::Student,
        }))
    }
}

/// Grants admin capability to identities holding the admin role.
pub struct RoleAccessPolicy;

impl AccessPolicy for RoleAccessPolicy {
    fn can_administer(&self, identity: &Identity) -> bool {
        identity.role == Role::Admin
    }
}
