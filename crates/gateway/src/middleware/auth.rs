//! Authentication extractors
//!
//! `AuthUser` rejects requests without a valid bearer token;
//! `OptionalAuthUser` resolves to no user instead, for endpoints that
//! also serve anonymous callers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;

use crate::AppState;
use webloom_common::auth::extract_bearer;
use webloom_common::errors::AppError;

/// The authenticated caller, extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let Some(token) = extract_bearer(header) else {
            return Err(AppError::unauthorized("Authorization token required"));
        };

        let claims = state.jwt.validate_token(token)?;

        Ok(AuthUser {
            id: claims.user_id()?,
            email: claims.email,
        })
    }
}

/// Optional variant: missing or invalid credentials yield no user
/// rather than a rejection
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
