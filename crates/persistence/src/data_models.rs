// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: i64,
    /// Lowercase login name.
    pub login_name: String,
    pub display_name: String,
    /// Bcrypt hash.
    pub password_hash: String,
    /// One of `admin`, `client`, `provider`.
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub account_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    /// RFC 3339 expiry.
    pub expires_at: String,
}

/// A user's credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub user_id: i64,
    pub balance: i64,
    pub updated_at: String,
}
