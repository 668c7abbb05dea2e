// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::AppError,
    state::AppState,
    utils::access::{Identity, Role},
};

/// JWT Claims structure for login tokens.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the username.
    pub sub: String,
    /// Role granted at login.
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.sub.clone(),
            role: self.role,
        }
    }
}

/// Unix timestamp `seconds` from now.
pub fn expires_in(seconds: u64) -> Result<usize, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();
    Ok(now.saturating_add(seconds) as usize)
}

/// Signs any claims payload with HS256.
pub fn sign_token<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies signature and expiry, returning the decoded claims.
pub fn verify_token<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, AppError> {
    let token_data = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Signs a new login JWT for the identity.
pub fn sign_jwt(identity: &Identity, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let claims = Claims {
        sub: identity.username.clone(),
        role: identity.role,
        exp: expires_in(expiration_seconds)?,
    };

    sign_token(&claims, secret)
}

/// Verifies and decodes a login JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    verify_token(token, secret)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(AppError::AuthError("Please login first".to_string())),
    };

    let claims = verify_jwt(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Asks the configured `AccessPolicy`
/// whether the caller may administer the catalog; refuses with 403 otherwise.
pub async fn admin_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::AuthError("Please login first".to_string()))?;

    let identity = claims.identity();
    if !state.policy.can_administer(&identity) {
        tracing::warn!("Admin access denied for '{}'", identity.username);
        return Err(AppError::Forbidden(
            "Authorization required. You must be the administrator to access this panel."
                .to_string(),
        ));
    }

    Ok(next.run(req).await)
}
