// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides Axum extractors that validate bearer tokens at the
//! server boundary. Routes that require a login use [`SessionUser`]; routes
//! that merely personalize their answer use [`OptionalSessionUser`].

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use presta_api::{AuthenticatedUser, AuthenticationService};
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated users.
///
/// Carries the user and the bearer token it was resolved from.
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Validate the token via `AuthenticationService::validate_session`,
///    which rejects and removes expired sessions
/// 3. Return the `AuthenticatedUser`
///
/// # Errors
///
/// Rejects with HTTP 401 when the header is missing or malformed, or the
/// session is unknown or expired.
pub struct SessionUser(pub AuthenticatedUser, pub String);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let user: AuthenticatedUser =
            AuthenticationService::validate_session(&mut persistence, &token).map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(
            account_id = user.account_id,
            role = user.role.as_str(),
            "Session validated"
        );
        Ok(Self(user, token))
    }
}

/// Extractor for routes that work with or without a login.
///
/// A missing header yields `None`. A token that no longer resolves to a
/// session is treated as anonymous.
pub struct OptionalSessionUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalSessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Self(None));
        };

        let mut persistence = state.persistence.lock().await;
        match AuthenticationService::validate_session(&mut persistence, &token) {
            Ok(user) => Ok(Self(Some(user))),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session on optional route");
                Ok(Self(None))
            }
        }
    }
}

/// Reads the bearer token, if an Authorization header is present.
fn bearer_token(parts: &Parts) -> Result<Option<String>, SessionError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value: &str = header.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        SessionError::InvalidAuthorizationHeader
    })?;
    let token: &str = value.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })?;
    Ok(Some(token.trim().to_string()))
}

/// Session extraction errors.
///
/// These are converted to 401 responses with the standard error body.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
