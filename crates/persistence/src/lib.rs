// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Presta marketplace.
//!
//! This crate stores accounts, sessions, A/B tests, gamification state, the
//! service catalog and user submissions in `SQLite` through Diesel.
//!
//! ## Layout
//!
//! - `backend`: Connection setup, migrations, raw-SQL helpers
//! - `queries`: Read-only Diesel queries
//! - `mutations`: Writes
//!
//! [`Persistence`] owns a single connection and exposes the operations the
//! API layer needs. It also implements the store traits consumed by the
//! A/B testing and gamification engines in the `presta` crate.
//!
//! ## Uniqueness
//!
//! Test keys, `(test, subject)` assignments and `(user, achievement)` awards
//! are guarded by unique indexes, so concurrent writers cannot create
//! duplicates. Writers insert with `ON CONFLICT DO NOTHING` and read back the
//! stored row.
//!
//! ## Testing
//!
//! Tests run against shared in-memory databases created by
//! [`Persistence::new_in_memory`]; each call gets a fresh database.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use presta::{AbTestStore, GamificationStore, InsertOutcome, StoreError};
use presta_domain::{
    AbTest, Achievement, Assignment, Category, District, NewAbTest, NewAchievement,
    NewContactMessage, NewConversion, NewReviewPhoto, NewTestimonial, PopularService, ReviewPhoto,
    Subscription, SubscriptionPlan, SubscriptionStatus, Testimonial, TestimonialStatus,
    UserAchievement, UserStats,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

// Links the bundled SQLite library used by diesel.
use libsqlite3_sys as _;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{AccountData, CreditBalance, SessionData};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// Counter for unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh shared in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_presta_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a database file.
    ///
    /// The file is created and migrated if needed, and WAL mode is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is active.
    ///
    /// # Errors
    ///
    /// Returns an error if enforcement is off or the check fails.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Creates an account and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the login name is taken.
    pub fn create_account(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_account(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
            created_at,
        )
    }

    /// Retrieves an account by login name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_account_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_account_by_id(
        &mut self,
        account_id: i64,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_id(&mut self.conn, account_id)
    }

    /// Counts accounts holding `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_accounts_with_role(&mut self, role: &str) -> Result<i64, PersistenceError> {
        queries::accounts::count_accounts_with_role(&mut self.conn, role)
    }

    /// Updates the last login timestamp for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(
        &mut self,
        account_id: i64,
        logged_in_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::accounts::update_last_login(&mut self.conn, account_id, logged_in_at)
    }

    /// Verifies a plain-text password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash cannot be parsed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        bcrypt::verify(password, password_hash)
            .map_err(|e| PersistenceError::Other(format!("Password verification failed: {e}")))
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        account_id: i64,
        created_at: &str,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_session(
            &mut self.conn,
            session_token,
            account_id,
            created_at,
            expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::accounts::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(
        &mut self,
        session_id: i64,
        active_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::accounts::update_session_activity(&mut self.conn, session_id, active_at)
    }

    /// Deletes a session by token. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<usize, PersistenceError> {
        mutations::accounts::delete_session(&mut self.conn, session_token)
    }

    /// Deletes every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::accounts::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Lists top-level categories ordered by position, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_categories(
        &mut self,
        include_inactive: bool,
    ) -> Result<Vec<Category>, PersistenceError> {
        queries::catalog::list_categories(&mut self.conn, include_inactive)
    }

    /// Retrieves a category by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_category_by_slug(&mut self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        queries::catalog::get_category_by_slug(&mut self.conn, slug)
    }

    /// Lists the active children of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_child_categories(
        &mut self,
        parent_id: i64,
    ) -> Result<Vec<Category>, PersistenceError> {
        queries::catalog::list_child_categories(&mut self.conn, parent_id)
    }

    /// Lists the districts of a city, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_districts(&mut self, city: &str) -> Result<Vec<District>, PersistenceError> {
        queries::catalog::list_districts(&mut self.conn, city)
    }

    /// Lists the most requested services.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_popular_services(
        &mut self,
        limit: i64,
        category_id: Option<i64>,
    ) -> Result<Vec<PopularService>, PersistenceError> {
        queries::catalog::list_popular_services(&mut self.conn, limit, category_id)
    }

    // ========================================================================
    // Credits and subscriptions
    // ========================================================================

    /// Retrieves a user's credit balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_credit_balance(
        &mut self,
        user_id: i64,
    ) -> Result<Option<CreditBalance>, PersistenceError> {
        queries::credits::get_credit_balance(&mut self.conn, user_id)
    }

    /// Sets a user's credit balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn set_credit_balance(
        &mut self,
        user_id: i64,
        balance: i64,
        updated_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::submissions::set_credit_balance(&mut self.conn, user_id, balance, updated_at)
    }

    /// Retrieves a user's most recent subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_latest_subscription(
        &mut self,
        user_id: i64,
    ) -> Result<Option<Subscription>, PersistenceError> {
        queries::credits::get_latest_subscription(&mut self.conn, user_id)
    }

    /// Records a subscription and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn create_subscription(
        &mut self,
        user_id: i64,
        plan: SubscriptionPlan,
        status: SubscriptionStatus,
        started_at: &str,
        expires_at: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::submissions::insert_subscription(
            &mut self.conn,
            user_id,
            plan,
            status,
            started_at,
            expires_at,
        )
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    /// Stores a contact message and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn create_contact_message(
        &mut self,
        message: &NewContactMessage,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::submissions::insert_contact_message(&mut self.conn, message, created_at)
    }

    /// Counts stored contact messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_contact_messages(&mut self) -> Result<i64, PersistenceError> {
        queries::submissions::count_contact_messages(&mut self.conn)
    }

    /// Stores a pending testimonial.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn create_testimonial(
        &mut self,
        testimonial: &NewTestimonial,
        created_at: &str,
    ) -> Result<Testimonial, PersistenceError> {
        mutations::submissions::insert_testimonial(&mut self.conn, testimonial, created_at)
    }

    /// Retrieves a testimonial by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_testimonial(
        &mut self,
        testimonial_id: i64,
    ) -> Result<Option<Testimonial>, PersistenceError> {
        queries::submissions::get_testimonial(&mut self.conn, testimonial_id)
    }

    /// Lists testimonials in `status`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_testimonials_by_status(
        &mut self,
        status: TestimonialStatus,
    ) -> Result<Vec<Testimonial>, PersistenceError> {
        queries::submissions::list_testimonials_by_status(&mut self.conn, status)
    }

    /// Moves a pending testimonial to `status`.
    ///
    /// Returns the number of rows changed; zero means it was not pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_testimonial_status(
        &mut self,
        testimonial_id: i64,
        status: TestimonialStatus,
        moderated_at: &str,
    ) -> Result<usize, PersistenceError> {
        mutations::submissions::update_testimonial_status(
            &mut self.conn,
            testimonial_id,
            status,
            moderated_at,
        )
    }

    /// Counts the photos attached to a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_review_photos(&mut self, review_id: i64) -> Result<i64, PersistenceError> {
        queries::submissions::count_review_photos(&mut self.conn, review_id)
    }

    /// Lists the photos attached to a review in upload order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_review_photos(&mut self, review_id: i64) -> Result<Vec<ReviewPhoto>, PersistenceError> {
        queries::submissions::list_review_photos(&mut self.conn, review_id)
    }

    /// Registers an uploaded review photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn create_review_photo(
        &mut self,
        photo: &NewReviewPhoto,
        created_at: &str,
    ) -> Result<ReviewPhoto, PersistenceError> {
        mutations::submissions::insert_review_photo(&mut self.conn, photo, created_at)
    }
}

impl AbTestStore for Persistence {
    fn find_test_by_key(&mut self, key: &str) -> Result<Option<AbTest>, StoreError> {
        Ok(queries::ab_tests::find_test_by_key(&mut self.conn, key)?)
    }

    fn find_test_by_id(&mut self, test_id: i64) -> Result<Option<AbTest>, StoreError> {
        Ok(queries::ab_tests::find_test_by_id(&mut self.conn, test_id)?)
    }

    fn list_tests(&mut self) -> Result<Vec<AbTest>, StoreError> {
        Ok(queries::ab_tests::list_tests(&mut self.conn)?)
    }

    fn insert_test(
        &mut self,
        test: &NewAbTest,
        started_at: &str,
    ) -> Result<InsertOutcome<AbTest>, StoreError> {
        Ok(mutations::ab_tests::insert_test(&mut self.conn, test, started_at)?)
    }

    fn end_test(&mut self, test_id: i64, ended_at: &str) -> Result<AbTest, StoreError> {
        Ok(mutations::ab_tests::end_test(&mut self.conn, test_id, ended_at)?)
    }

    fn find_assignment(
        &mut self,
        test_id: i64,
        subject_key: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(queries::ab_tests::find_assignment(&mut self.conn, test_id, subject_key)?)
    }

    fn insert_assignment_if_absent(
        &mut self,
        assignment: &Assignment,
    ) -> Result<InsertOutcome<Assignment>, StoreError> {
        Ok(mutations::ab_tests::insert_assignment_if_absent(&mut self.conn, assignment)?)
    }

    fn append_conversion(&mut self, conversion: &NewConversion) -> Result<i64, StoreError> {
        Ok(mutations::ab_tests::append_conversion(&mut self.conn, conversion)?)
    }

    fn count_assignments_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        Ok(queries::ab_tests::count_assignments_by_variant(&mut self.conn, test_id)?)
    }

    fn count_conversions_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, String, i64)>, StoreError> {
        Ok(queries::ab_tests::count_conversions_by_variant(&mut self.conn, test_id)?)
    }
}

impl GamificationStore for Persistence {
    fn get_user_stats(&mut self, user_id: i64) -> Result<Option<UserStats>, StoreError> {
        Ok(queries::gamification::get_user_stats(&mut self.conn, user_id)?)
    }

    fn save_user_activity(&mut self, stats: &UserStats) -> Result<(), StoreError> {
        Ok(mutations::gamification::save_user_activity(&mut self.conn, stats)?)
    }

    fn list_achievements(&mut self) -> Result<Vec<Achievement>, StoreError> {
        Ok(queries::gamification::list_achievements(&mut self.conn)?)
    }

    fn insert_achievement(
        &mut self,
        achievement: &NewAchievement,
    ) -> Result<InsertOutcome<Achievement>, StoreError> {
        Ok(mutations::gamification::insert_achievement(&mut self.conn, achievement)?)
    }

    fn list_awarded_achievement_ids(&mut self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(queries::gamification::list_awarded_achievement_ids(&mut self.conn, user_id)?)
    }

    fn award_achievement_if_absent(
        &mut self,
        user_id: i64,
        achievement_id: i64,
        xp_reward: i64,
        awarded_at: &str,
    ) -> Result<InsertOutcome<i64>, StoreError> {
        Ok(mutations::gamification::award_achievement_if_absent(
            &mut self.conn,
            user_id,
            achievement_id,
            xp_reward,
            awarded_at,
        )?)
    }

    fn list_user_achievements(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<UserAchievement>, StoreError> {
        Ok(queries::gamification::list_user_achievements(&mut self.conn, user_id)?)
    }

    fn mark_achievements_notified(
        &mut self,
        user_id: i64,
        achievement_ids: &[i64],
    ) -> Result<usize, StoreError> {
        debug!(user_id, count = achievement_ids.len(), "Marking achievements notified");
        Ok(mutations::gamification::mark_achievements_notified(
            &mut self.conn,
            user_id,
            achievement_ids,
        )?)
    }
}
