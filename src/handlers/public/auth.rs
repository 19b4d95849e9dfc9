// handlers/public/auth.rs - POST /api/auth/login handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::models::{normalize_email, UserView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::PermissionSet;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: UserView,
    /// Snapshot for UI gating only; every request re-checks the store
    pub permissions: Vec<String>,
}

/**
 * POST /api/auth/login - Exchange credentials for a JWT
 *
 * ```json
 * { "email": "editor@example.com", "password": "..." }
 * ```
 *
 * Unknown email, wrong password and deactivated accounts all answer with the
 * same 401 so the endpoint does not reveal which accounts exist.
 */
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let rejected = || ApiError::unauthorized("Invalid email or password");

    let user = match state.accounts.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::info!("Login failed for {}: unknown account", email);
            return Err(rejected());
        }
    };

    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!("Login failed for {}: wrong password", email);
        return Err(rejected());
    }

    if !user.active {
        tracing::info!("Login failed for {}: account inactive", email);
        return Err(rejected());
    }

    let permissions: PermissionSet = state
        .accounts
        .permissions_for_user(user.id)
        .await?
        .unwrap_or_default()
        .into_iter()
        .collect();

    let claims = Claims::new(user.id, user.email.clone(), &state.config.security);
    let token = generate_jwt(&claims, &state.config.security)?;

    tracing::info!("User {} logged in", user.email);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_at: claims.expires_at(),
        user: UserView::from(&user),
        permissions: permissions.to_sorted_vec(),
    }))
}
