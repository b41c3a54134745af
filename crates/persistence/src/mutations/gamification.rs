// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gamification mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use presta::InsertOutcome;
use presta_domain::{Achievement, NewAchievement, UserStats, level_for_xp};
use tracing::{debug, info};

use crate::diesel_schema::{achievements, user_achievements, user_stats};
use crate::error::PersistenceError;
use crate::queries::gamification::{get_achievement_by_code, get_user_stats};

/// Writes the activity counters of a user, creating the stats row if needed.
///
/// Experience and level are left as stored.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn save_user_activity(
    conn: &mut SqliteConnection,
    stats: &UserStats,
) -> Result<(), PersistenceError> {
    debug!(user_id = stats.user_id, "Saving user activity");

    diesel::insert_into(user_stats::table)
        .values((
            user_stats::user_id.eq(stats.user_id),
            user_stats::total_tasks_completed.eq(stats.total_tasks_completed),
            user_stats::average_rating.eq(stats.average_rating),
            user_stats::total_reviews.eq(stats.total_reviews),
        ))
        .on_conflict(user_stats::user_id)
        .do_update()
        .set((
            user_stats::total_tasks_completed.eq(excluded(user_stats::total_tasks_completed)),
            user_stats::average_rating.eq(excluded(user_stats::average_rating)),
            user_stats::total_reviews.eq(excluded(user_stats::total_reviews)),
        ))
        .execute(conn)?;

    Ok(())
}

/// Adds experience and stores the derived level, returning the new total.
fn add_user_xp(
    conn: &mut SqliteConnection,
    user_id: i64,
    amount: i64,
) -> Result<i64, PersistenceError> {
    let amount: i64 = amount.max(0);

    diesel::insert_into(user_stats::table)
        .values((
            user_stats::user_id.eq(user_id),
            user_stats::xp.eq(amount),
            user_stats::level.eq(level_for_xp(amount)),
        ))
        .on_conflict(user_stats::user_id)
        .do_update()
        .set(user_stats::xp.eq(user_stats::xp + amount))
        .execute(conn)?;

    let xp: i64 = user_stats::table
        .filter(user_stats::user_id.eq(user_id))
        .select(user_stats::xp)
        .first(conn)?;

    diesel::update(user_stats::table)
        .filter(user_stats::user_id.eq(user_id))
        .set(user_stats::level.eq(level_for_xp(xp)))
        .execute(conn)?;

    Ok(xp)
}

/// Defines an achievement unless its code is taken.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn insert_achievement(
    conn: &mut SqliteConnection,
    new_achievement: &NewAchievement,
) -> Result<InsertOutcome<Achievement>, PersistenceError> {
    let inserted: usize = diesel::insert_into(achievements::table)
        .values((
            achievements::code.eq(&new_achievement.code),
            achievements::name.eq(&new_achievement.name),
            achievements::description.eq(&new_achievement.description),
            achievements::icon.eq(&new_achievement.icon),
            achievements::xp_reward.eq(new_achievement.xp_reward),
            achievements::metric.eq(new_achievement.rule.metric.as_str()),
            achievements::threshold.eq(new_achievement.rule.threshold),
        ))
        .on_conflict_do_nothing()
        .execute(conn)?;

    let stored: Achievement = get_achievement_by_code(conn, &new_achievement.code)?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!("Achievement '{}'", new_achievement.code))
        })?;

    if inserted == 0 {
        return Ok(InsertOutcome::Existing(stored));
    }
    info!(
        achievement_id = stored.achievement_id,
        code = %stored.code,
        "Achievement defined"
    );
    Ok(InsertOutcome::Inserted(stored))
}

/// Records an award unless the user already holds it, crediting its
/// experience in the same transaction.
///
/// Returns the user's experience total after the call.
///
/// # Errors
///
/// Returns an error if any write fails; the transaction is rolled back so
/// neither the award nor the experience is stored.
pub fn award_achievement_if_absent(
    conn: &mut SqliteConnection,
    user_id: i64,
    achievement_id: i64,
    xp_reward: i64,
    awarded_at: &str,
) -> Result<InsertOutcome<i64>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let inserted: usize = diesel::insert_into(user_achievements::table)
            .values((
                user_achievements::user_id.eq(user_id),
                user_achievements::achievement_id.eq(achievement_id),
                user_achievements::awarded_at.eq(awarded_at),
                user_achievements::is_notified.eq(0),
            ))
            .on_conflict_do_nothing()
            .execute(conn)?;

        if inserted == 0 {
            debug!(user_id, achievement_id, "Achievement already awarded");
            let xp: i64 = get_user_stats(conn, user_id)?.map_or(0, |stats| stats.xp);
            return Ok(InsertOutcome::Existing(xp));
        }

        let xp: i64 = add_user_xp(conn, user_id, xp_reward)?;
        info!(user_id, achievement_id, xp_reward, xp, "Achievement awarded");
        Ok(InsertOutcome::Inserted(xp))
    })
}

/// Flags the user's pending awards among `achievement_ids` as notified.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn mark_achievements_notified(
    conn: &mut SqliteConnection,
    user_id: i64,
    achievement_ids: &[i64],
) -> Result<usize, PersistenceError> {
    let updated: usize = diesel::update(user_achievements::table)
        .filter(user_achievements::user_id.eq(user_id))
        .filter(user_achievements::achievement_id.eq_any(achievement_ids))
        .filter(user_achievements::is_notified.eq(0))
        .set(user_achievements::is_notified.eq(1))
        .execute(conn)?;

    debug!(user_id, updated, "Achievements marked as notified");
    Ok(updated)
}
