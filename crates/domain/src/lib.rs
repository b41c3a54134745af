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

mod ab_test;
mod catalog;
mod commission;
mod error;
mod gamification;
mod submission;

#[cfg(test)]
mod tests;

pub use ab_test::{
    AbTest, Assignment, MAX_TEST_KEY_LENGTH, MIN_VARIANT_COUNT, NewAbTest, NewConversion,
    SubjectIdentity, TestKey, TestStatus, VariantSet, select_variant, validate_conversion_type,
};
pub use catalog::{
    Category, DEFAULT_POPULAR_LIMIT, District, MAX_POPULAR_LIMIT, PopularService,
    clamp_popular_limit, validate_city,
};
pub use commission::{
    CONFIRMED_TIER_MIN_TASKS, CommissionTier, EXPERT_TIER_MIN_TASKS, Subscription,
    SubscriptionPlan, SubscriptionStatus, commission_rate_percent,
};
pub use error::DomainError;
pub use gamification::{
    Achievement, AchievementRule, LEVEL_THRESHOLDS, NewAchievement, StatMetric, UserAchievement,
    UserStats, level_for_xp, validate_rating, xp_for_next_level,
};
pub use submission::{
    ALLOWED_PHOTO_CONTENT_TYPES, MAX_CONTACT_MESSAGE_LENGTH, MAX_PHOTO_SIZE_BYTES,
    MAX_PHOTOS_PER_REVIEW, ModerationDecision, NewContactMessage, NewReviewPhoto, NewTestimonial,
    ReviewPhoto, Testimonial, TestimonialStatus, is_plausible_email, validate_photo_capacity,
};
