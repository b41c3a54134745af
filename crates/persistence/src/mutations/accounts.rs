// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Creates a new account.
///
/// The `login_name` is normalized to lowercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (will be normalized)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - One of `admin`, `client`, `provider`
/// * `created_at` - RFC 3339 creation timestamp
///
/// # Errors
///
/// Returns `UniqueViolation` if the login name already exists, or another
/// error if the password cannot be hashed or the insert fails.
pub fn create_account(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_lowercase();

    info!(
        "Creating account with login_name: {}, role: {}",
        normalized_login, role
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(accounts::table)
        .values((
            accounts::login_name.eq(&normalized_login),
            accounts::display_name.eq(display_name.trim()),
            accounts::password_hash.eq(&password_hash),
            accounts::role.eq(role),
            accounts::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let account_id: i64 = conn.get_last_insert_rowid()?;

    info!(account_id, "Account created");
    Ok(account_id)
}

/// Updates the last login timestamp for an account.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    account_id: i64,
    logged_in_at: &str,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for account ID: {}", account_id);

    diesel::update(accounts::table)
        .filter(accounts::account_id.eq(account_id))
        .set(accounts::last_login_at.eq(Some(logged_in_at)))
        .execute(conn)?;

    Ok(())
}

/// Creates a new session for an account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `account_id` - The account ID
/// * `created_at` - RFC 3339 creation timestamp
/// * `expires_at` - RFC 3339 expiry timestamp
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    account_id: i64,
    created_at: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(
        "Creating session for account ID: {} with expiration: {}",
        account_id, expires_at
    );

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::account_id.eq(account_id),
            sessions::created_at.eq(created_at),
            sessions::last_activity_at.eq(created_at),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, account_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
    active_at: &str,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(active_at))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<usize, PersistenceError> {
    debug!("Deleting session by token");

    Ok(diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?)
}

/// Deletes every session that expired before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
