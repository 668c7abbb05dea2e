// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{error::AppError, state::AppState, utils::jwt::sign_jwt};

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Authenticates a user and returns a JWT token.
///
/// The configured admin must present the admin password; anyone else with a
/// non-empty username and password signs in as a student.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let identity = state
        .credentials
        .authenticate(payload.username.trim(), &payload.password)
        .await?
        .ok_or(AppError::AuthError(
            "Invalid credentials or fields missing. Please try again.".to_string(),
        ))?;

    let token = sign_jwt(&identity, &state.config.jwt_secret, state.config.jwt_expiration)?;
    tracing::info!("'{}' logged in as {:?}", identity.username, identity.role);

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "username": identity.username,
        "role": identity.role,
    })))
}
