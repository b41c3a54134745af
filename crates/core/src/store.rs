// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store contracts consumed by the engines.
//!
//! Uniqueness of `(test, subject)` assignments and `(user, achievement)`
//! awards is enforced by the store. The `*_if_absent` operations must be
//! atomic: when a concurrent writer has already created the row, they
//! report [`InsertOutcome::Existing`] with the stored value instead of
//! failing.

use crate::error::StoreError;
use presta_domain::{
    AbTest, Achievement, Assignment, NewAbTest, NewAchievement, NewConversion, UserAchievement,
    UserStats,
};

/// Result of an insert-if-absent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    /// This call created the row.
    Inserted(T),
    /// The row already existed; the stored value is returned.
    Existing(T),
}

impl<T> InsertOutcome<T> {
    /// Returns the wrapped value regardless of who created it.
    pub fn into_inner(self) -> T {
        match self {
            Self::Inserted(value) | Self::Existing(value) => value,
        }
    }

    /// Returns true if this call created the row.
    #[must_use]
    pub const fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Persistence operations needed by the A/B test engine.
pub trait AbTestStore {
    /// Looks up a test by its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_test_by_key(&mut self, key: &str) -> Result<Option<AbTest>, StoreError>;

    /// Looks up a test by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_test_by_id(&mut self, test_id: i64) -> Result<Option<AbTest>, StoreError>;

    /// Lists all tests ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_tests(&mut self) -> Result<Vec<AbTest>, StoreError>;

    /// Creates a running test with its variants.
    ///
    /// Returns `Existing` with the stored test when the key is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_test(
        &mut self,
        test: &NewAbTest,
        started_at: &str,
    ) -> Result<InsertOutcome<AbTest>, StoreError>;

    /// Ends a running test and returns the stored row.
    ///
    /// A test that has already ended is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the test does not exist.
    fn end_test(&mut self, test_id: i64, ended_at: &str) -> Result<AbTest, StoreError>;

    /// Looks up the assignment for a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_assignment(
        &mut self,
        test_id: i64,
        subject_key: &str,
    ) -> Result<Option<Assignment>, StoreError>;

    /// Stores an assignment unless one already exists for its subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_assignment_if_absent(
        &mut self,
        assignment: &Assignment,
    ) -> Result<InsertOutcome<Assignment>, StoreError>;

    /// Appends a conversion event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn append_conversion(&mut self, conversion: &NewConversion) -> Result<i64, StoreError>;

    /// Counts assignments per variant label.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn count_assignments_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, i64)>, StoreError>;

    /// Counts conversions per `(variant, conversion_type)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn count_conversions_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, String, i64)>, StoreError>;
}

/// Persistence operations needed by the gamification engine.
pub trait GamificationStore {
    /// Loads a user's stats, `None` if the user has no recorded activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_user_stats(&mut self, user_id: i64) -> Result<Option<UserStats>, StoreError>;

    /// Writes the activity counters (jobs, reviews, average rating).
    ///
    /// Experience and level are not touched; see
    /// [`Self::award_achievement_if_absent`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn save_user_activity(&mut self, stats: &UserStats) -> Result<(), StoreError>;

    /// Lists every achievement definition ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_achievements(&mut self) -> Result<Vec<Achievement>, StoreError>;

    /// Defines a new achievement. Returns `Existing` when the code is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_achievement(
        &mut self,
        achievement: &NewAchievement,
    ) -> Result<InsertOutcome<Achievement>, StoreError>;

    /// Lists ids of achievements already awarded to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_awarded_achievement_ids(&mut self, user_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Records an award unless the user already holds it, crediting
    /// `xp_reward` and the derived level in the same atomic write.
    ///
    /// Either the award row and the experience are both stored or neither
    /// is. Returns the user's experience total after the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; nothing is written in that case.
    fn award_achievement_if_absent(
        &mut self,
        user_id: i64,
        achievement_id: i64,
        xp_reward: i64,
        awarded_at: &str,
    ) -> Result<InsertOutcome<i64>, StoreError>;

    /// Lists a user's awards, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_user_achievements(&mut self, user_id: i64)
    -> Result<Vec<UserAchievement>, StoreError>;

    /// Flags the user's pending awards among `achievement_ids` as notified.
    ///
    /// Ids the user does not hold, or already notified, are skipped.
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn mark_achievements_notified(
        &mut self,
        user_id: i64,
        achievement_ids: &[i64],
    ) -> Result<usize, StoreError>;
}
