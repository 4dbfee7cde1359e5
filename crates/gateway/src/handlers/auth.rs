//! Account handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use webloom_common::auth::{hash_password, normalize_email, verify_password};
use webloom_common::errors::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
}

/// Create an account and issue a token
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    signup_inner(state, body)
        .await
        .map_err(|e| e.into_route_error("Failed to create account"))
}

async fn signup_inner(
    state: AppState,
    body: CredentialsRequest,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (email, password) = require_credentials(&body)?;

    if password.len() < 6 {
        return Err(AppError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    let email = normalize_email(email);

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict {
            message: "Account already exists. Please log in.".to_string(),
        });
    }

    let password_hash = hash_password(password)?;
    let user_id = state.repo.create_user(&email, &password_hash).await?;
    let token = state.jwt.generate_token(user_id, &email)?;

    tracing::info!(user_id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully".to_string(),
            token,
            user: UserInfo { id: user_id, email },
        }),
    ))
}

/// Verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    login_inner(state, body)
        .await
        .map_err(|e| e.into_route_error("Failed to log in"))
}

async fn login_inner(state: AppState, body: CredentialsRequest) -> Result<Json<AuthResponse>> {
    let (email, password) = require_credentials(&body)?;
    let email = normalize_email(email);

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let token = state.jwt.generate_token(user.id, &user.email)?;

    tracing::info!(user_id = user.id, "Logged in");

    Ok(Json(AuthResponse {
        success: true,
        message: "Logged in successfully".to_string(),
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
        },
    }))
}

/// Both fields present and non-empty, or a 400
fn require_credentials(body: &CredentialsRequest) -> Result<(&str, &str)> {
    match (body.email.as_deref(), body.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(AppError::validation("Email and password are required")),
    }
}
