// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use presta_persistence::Persistence;

use crate::handlers::{ensure_admin_account, register};
use crate::request_response::RegisterRequest;
use crate::{AuthenticatedUser, Role};

pub const TEST_PASSWORD: &str = "plombier75";

pub fn setup() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn register_request(login_name: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        login_name: String::from(login_name),
        display_name: format!("{login_name} display"),
        password: String::from(TEST_PASSWORD),
        role: String::from(role),
    }
}

pub fn create_admin(persistence: &mut Persistence) -> AuthenticatedUser {
    let account_id: i64 = ensure_admin_account(persistence, "admin", "Admin-2026")
        .unwrap()
        .unwrap();
    AuthenticatedUser::new(
        account_id,
        String::from("admin"),
        String::from("admin"),
        Role::Admin,
    )
}

pub fn create_client(persistence: &mut Persistence, login_name: &str) -> AuthenticatedUser {
    let response = register(persistence, &register_request(login_name, "client")).unwrap();
    AuthenticatedUser::new(
        response.account_id,
        response.login_name,
        format!("{login_name} display"),
        Role::Client,
    )
}

pub fn create_provider(persistence: &mut Persistence, login_name: &str) -> AuthenticatedUser {
    let response = register(persistence, &register_request(login_name, "provider")).unwrap();
    AuthenticatedUser::new(
        response.account_id,
        response.login_name,
        format!("{login_name} display"),
        Role::Provider,
    )
}
