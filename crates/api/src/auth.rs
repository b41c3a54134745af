// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use presta_persistence::{AccountData, Persistence, PersistenceError, SessionData};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::error::AuthError;

/// Account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Platform operator: manages tests, achievements and moderation.
    Admin,
    /// Customer booking services.
    Client,
    /// Professional offering services.
    Provider,
}

impl Role {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
            Self::Provider => "provider",
        }
    }

    /// Parses a stored role.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "client" => Some(Self::Client),
            "provider" => Some(Self::Provider),
            _ => None,
        }
    }
}

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The account id, also the gamification and A/B subject id.
    pub account_id: i64,
    /// Lowercase login name.
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// The account role.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    #[must_use]
    pub const fn new(account_id: i64, login_name: String, display_name: String, role: Role) -> Self {
        Self {
            account_id,
            login_name,
            display_name,
            role,
        }
    }

    fn from_account(account: &AccountData) -> Result<Self, AuthError> {
        let role: Role =
            Role::parse(&account.role).ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", account.role),
            })?;
        Ok(Self::new(
            account.account_id,
            account.login_name.clone(),
            account.display_name.clone(),
            role,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that `user` is an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` otherwise.
    pub fn require_admin(user: &AuthenticatedUser, action: &str) -> Result<(), AuthError> {
        match user.role {
            Role::Admin => Ok(()),
            Role::Client | Role::Provider => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("admin"),
            }),
        }
    }
}

/// Authentication service for login, session validation and logout.
pub struct AuthenticationService;

impl AuthenticationService {
    /// How long a session stays valid after login.
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Authenticates a login and creates a session.
    ///
    /// Unknown logins and wrong passwords fail with the same reason.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `session`, `authenticated_user`).
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, SessionData, AuthenticatedUser), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let account: AccountData = persistence
            .get_account_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!("Login attempt for unknown account");
                invalid()
            })?;

        let password_valid: bool = Persistence::verify_password(password, &account.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_valid {
            warn!(account_id = account.account_id, "Login rejected: wrong password");
            return Err(invalid());
        }

        let user: AuthenticatedUser = AuthenticatedUser::from_account(&account)?;

        let now: OffsetDateTime = Self::now();
        let created_at: String = Self::format(now)?;
        let expires_at: String = Self::format(now + Self::DEFAULT_SESSION_EXPIRATION)?;
        let session_token: String = Self::generate_session_token();

        let session_id: i64 = persistence
            .create_session(&session_token, account.account_id, &created_at, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(account.account_id, &created_at)
            .map_err(Self::map_persistence_error)?;

        info!(account_id = account.account_id, session_id, "Login succeeded");

        let session: SessionData = SessionData {
            session_id,
            session_token: session_token.clone(),
            account_id: account.account_id,
            created_at: created_at.clone(),
            last_activity_at: created_at,
            expires_at,
        };
        Ok((session_token, session, user))
    }

    /// Validates a session token and returns the authenticated user.
    ///
    /// Expired sessions are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown, expired, or its account
    /// no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(&session.expires_at, &Rfc3339)
            .map_err(|e| AuthError::Internal {
                message: format!("Failed to parse session expiration: {e}"),
            })?;

        let now: OffsetDateTime = Self::now();
        if now > expires_at {
            warn!(session_id = session.session_id, "Rejected expired session");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(session.account_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        persistence
            .update_session_activity(session.session_id, &Self::format(now)?)
            .map_err(Self::map_persistence_error)?;

        AuthenticatedUser::from_account(&account)
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        let removed: usize = persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;
        info!(removed, "Logged out");
        Ok(())
    }

    /// Removes every expired session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_expired_sessions(persistence: &mut Persistence) -> Result<usize, AuthError> {
        let now: String = Self::format(Self::now())?;
        persistence
            .delete_expired_sessions(&now)
            .map_err(Self::map_persistence_error)
    }

    /// Generates an opaque 256-bit session token.
    fn generate_session_token() -> String {
        (0..4).fold(String::with_capacity(64), |mut token, _| {
            token.push_str(&format!("{:016x}", rand::random::<u64>()));
            token
        })
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
            .replace_nanosecond(0)
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn format(at: OffsetDateTime) -> Result<String, AuthError> {
        at.format(&Rfc3339).map_err(|e| AuthError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::Internal {
            message: format!("Database error: {err}"),
        }
    }
}
