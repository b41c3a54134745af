// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod ab_testing;
mod clock;
mod error;
mod gamification;
mod store;

#[cfg(test)]
mod tests;

pub use ab_testing::{
    TestResults, TestSummary, VariantResult, create_test, end_test, get_all_tests,
    get_test_results, get_variant, track_conversion,
};
pub use clock::now_timestamp;
pub use error::{CoreError, StoreError};
pub use gamification::{
    check_and_award_achievements, create_achievement, get_user_achievements, get_user_stats,
    mark_as_notified, record_review_received, record_task_completed,
};
pub use store::{AbTestStore, GamificationStore, InsertOutcome};
