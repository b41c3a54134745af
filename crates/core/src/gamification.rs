// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The gamification engine.
//!
//! Awards are idempotent: the store guarantees one row per
//! `(user, achievement)` and grants the experience in the same write that
//! creates the row.

use crate::clock::now_timestamp;
use crate::error::CoreError;
use crate::store::{GamificationStore, InsertOutcome};
use presta_domain::{
    Achievement, DomainError, NewAchievement, UserAchievement, UserStats, level_for_xp,
};
use std::collections::BTreeSet;

/// Loads a user's stats, defaulting to an empty level-1 profile.
///
/// The level is always recomputed from experience.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_user_stats<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
) -> Result<UserStats, CoreError> {
    let mut stats: UserStats = store
        .get_user_stats(user_id)?
        .unwrap_or_else(|| UserStats::empty(user_id));
    stats.level = level_for_xp(stats.xp);
    Ok(stats)
}

/// Lists a user's awarded achievements, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_user_achievements<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
) -> Result<Vec<UserAchievement>, CoreError> {
    Ok(store.list_user_achievements(user_id)?)
}

/// Awards every achievement whose rule the user now satisfies.
///
/// Evaluation repeats until no new award is made, so experience granted by
/// one achievement can unlock another in the same call. Awards made by a
/// concurrent caller are skipped.
///
/// # Returns
///
/// The achievements awarded by this call, in definition order.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn check_and_award_achievements<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
) -> Result<Vec<Achievement>, CoreError> {
    let achievements: Vec<Achievement> = store.list_achievements()?;
    let mut awarded: BTreeSet<i64> = store
        .list_awarded_achievement_ids(user_id)?
        .into_iter()
        .collect();
    let mut stats: UserStats = get_user_stats(store, user_id)?;
    let mut newly_awarded: Vec<Achievement> = Vec::new();

    loop {
        let mut progressed: bool = false;

        for achievement in &achievements {
            if awarded.contains(&achievement.achievement_id)
                || !achievement.rule.is_satisfied_by(&stats)
            {
                continue;
            }

            let outcome: InsertOutcome<i64> = store.award_achievement_if_absent(
                user_id,
                achievement.achievement_id,
                achievement.xp_reward,
                &now_timestamp()?,
            )?;
            awarded.insert(achievement.achievement_id);

            let previous_xp: i64 = stats.xp;
            let inserted: bool = outcome.was_inserted();
            stats.xp = outcome.into_inner();
            stats.level = level_for_xp(stats.xp);
            if inserted {
                newly_awarded.push(achievement.clone());
            }
            // A concurrent award may also have raised experience.
            progressed |= inserted || stats.xp != previous_xp;
        }

        if !progressed {
            break;
        }
    }

    Ok(newly_awarded)
}

/// Marks the user's pending awards as notified.
///
/// Duplicate, foreign, unknown and already-notified ids are ignored.
///
/// # Returns
///
/// The number of awards updated.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn mark_as_notified<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
    achievement_ids: &[i64],
) -> Result<usize, CoreError> {
    let unique: Vec<i64> = achievement_ids
        .iter()
        .copied()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();
    if unique.is_empty() {
        return Ok(0);
    }
    Ok(store.mark_achievements_notified(user_id, &unique)?)
}

/// Counts a completed job and awards anything it unlocks.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn record_task_completed<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
) -> Result<Vec<Achievement>, CoreError> {
    let stats: UserStats = get_user_stats(store, user_id)?.with_task_completed();
    store.save_user_activity(&stats)?;
    check_and_award_achievements(store, user_id)
}

/// Folds a review rating into the user's average and awards anything it unlocks.
///
/// # Errors
///
/// Returns `InvalidRating` if `rating` is outside 1..=5, or a store error.
pub fn record_review_received<S: GamificationStore + ?Sized>(
    store: &mut S,
    user_id: i64,
    rating: i32,
) -> Result<Vec<Achievement>, CoreError> {
    let stats: UserStats = get_user_stats(store, user_id)?.with_review(rating)?;
    store.save_user_activity(&stats)?;
    check_and_award_achievements(store, user_id)
}

/// Defines a new achievement.
///
/// # Errors
///
/// Returns `DuplicateAchievementCode` if the code is taken, or a store error.
pub fn create_achievement<S: GamificationStore + ?Sized>(
    store: &mut S,
    new_achievement: &NewAchievement,
) -> Result<Achievement, CoreError> {
    match store.insert_achievement(new_achievement)? {
        InsertOutcome::Inserted(achievement) => Ok(achievement),
        InsertOutcome::Existing(_) => {
            Err(DomainError::DuplicateAchievementCode(new_achievement.code.clone()).into())
        }
    }
}
