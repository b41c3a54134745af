// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use crate::Persistence;

pub const CREATED_AT: &str = "2026-03-01T10:00:00Z";

/// Creates a client account and returns its id.
pub fn create_user(persistence: &mut Persistence, login_name: &str) -> i64 {
    persistence
        .create_account(login_name, login_name, "password123", "client", CREATED_AT)
        .expect("account should be created")
}
