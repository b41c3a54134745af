// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gamification queries: stats, achievement definitions, and awards.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presta_domain::{Achievement, AchievementRule, StatMetric, UserAchievement, UserStats};
use std::str::FromStr;
use tracing::debug;

use crate::diesel_schema::{achievements, user_achievements, user_stats};
use crate::error::PersistenceError;

/// Diesel Queryable struct for user stats rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = user_stats)]
struct UserStatsRow {
    user_id: i64,
    xp: i64,
    level: i32,
    total_tasks_completed: i64,
    average_rating: f64,
    total_reviews: i64,
}

/// Diesel Queryable struct for achievement rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = achievements)]
struct AchievementRow {
    achievement_id: i64,
    code: String,
    name: String,
    description: String,
    icon: String,
    xp_reward: i64,
    metric: String,
    threshold: f64,
}

impl AchievementRow {
    fn into_achievement(self) -> Result<Achievement, PersistenceError> {
        Ok(Achievement {
            rule: AchievementRule::new(StatMetric::from_str(&self.metric)?, self.threshold),
            achievement_id: self.achievement_id,
            code: self.code,
            name: self.name,
            description: self.description,
            icon: self.icon,
            xp_reward: self.xp_reward,
        })
    }
}

/// Diesel Queryable struct for award rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = user_achievements)]
struct UserAchievementRow {
    user_id: i64,
    awarded_at: String,
    is_notified: i32,
}

/// Retrieves a user's stats.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the user has no stats row.
pub fn get_user_stats(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserStats>, PersistenceError> {
    debug!(user_id, "Loading user stats");

    let row: Option<UserStatsRow> = user_stats::table
        .filter(user_stats::user_id.eq(user_id))
        .select(UserStatsRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|row| UserStats {
        user_id: row.user_id,
        xp: row.xp,
        level: row.level,
        total_tasks_completed: row.total_tasks_completed,
        average_rating: row.average_rating,
        total_reviews: row.total_reviews,
    }))
}

/// Lists all achievement definitions ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored rule is invalid.
pub fn list_achievements(conn: &mut SqliteConnection) -> Result<Vec<Achievement>, PersistenceError> {
    achievements::table
        .order(achievements::achievement_id.asc())
        .select(AchievementRow::as_select())
        .load::<AchievementRow>(conn)?
        .into_iter()
        .map(AchievementRow::into_achievement)
        .collect()
}

/// Retrieves an achievement by code.
///
/// # Errors
///
/// Returns an error if the query fails or the stored rule is invalid.
pub fn get_achievement_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Option<Achievement>, PersistenceError> {
    achievements::table
        .filter(achievements::code.eq(code))
        .select(AchievementRow::as_select())
        .first::<AchievementRow>(conn)
        .optional()?
        .map(AchievementRow::into_achievement)
        .transpose()
}

/// Lists the ids of achievements a user holds.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_awarded_achievement_ids(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(user_achievements::table
        .filter(user_achievements::user_id.eq(user_id))
        .select(user_achievements::achievement_id)
        .load(conn)?)
}

/// Lists a user's awards with their definitions, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored rule is invalid.
pub fn list_user_achievements(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<UserAchievement>, PersistenceError> {
    let rows: Vec<(UserAchievementRow, AchievementRow)> = user_achievements::table
        .inner_join(achievements::table)
        .filter(user_achievements::user_id.eq(user_id))
        .order((
            user_achievements::awarded_at.desc(),
            user_achievements::user_achievement_id.desc(),
        ))
        .select((UserAchievementRow::as_select(), AchievementRow::as_select()))
        .load(conn)?;

    rows.into_iter()
        .map(|(award, achievement)| {
            Ok(UserAchievement {
                user_id: award.user_id,
                achievement: achievement.into_achievement()?,
                awarded_at: award.awarded_at,
                is_notified: award.is_notified != 0,
            })
        })
        .collect()
}
