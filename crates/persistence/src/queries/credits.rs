// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Credit balance and subscription queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presta_domain::{Subscription, SubscriptionPlan, SubscriptionStatus};
use std::str::FromStr;

use crate::data_models::CreditBalance;
use crate::diesel_schema::{subscriptions, user_credits};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
struct SubscriptionRow {
    plan: String,
    status: String,
    started_at: String,
    expires_at: Option<String>,
}

/// Retrieves a user's credit balance.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the user has no credit row.
pub fn get_credit_balance(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<CreditBalance>, PersistenceError> {
    let row: Option<(i64, i64, String)> = user_credits::table
        .filter(user_credits::user_id.eq(user_id))
        .select((
            user_credits::user_id,
            user_credits::balance,
            user_credits::updated_at,
        ))
        .first(conn)
        .optional()?;

    Ok(row.map(|(user_id, balance, updated_at)| CreditBalance {
        user_id,
        balance,
        updated_at,
    }))
}

/// Retrieves the user's most recent subscription.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn get_latest_subscription(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<Subscription>, PersistenceError> {
    let row: Option<SubscriptionRow> = subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .order((
            subscriptions::started_at.desc(),
            subscriptions::subscription_id.desc(),
        ))
        .select(SubscriptionRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        Ok(Subscription {
            plan: SubscriptionPlan::from_str(&row.plan)?,
            status: SubscriptionStatus::from_str(&row.status)?,
            started_at: row.started_at,
            expires_at: row.expires_at,
        })
    })
    .transpose()
}
