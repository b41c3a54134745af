// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Experience, levels, and achievement rules.
//!
//! Levels are a pure function of experience points. Achievement rules are
//! `metric >= threshold` comparisons evaluated against a user's stats.

use crate::error::DomainError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Experience required to reach each level, starting at level 1.
///
/// A user's level is the number of thresholds that are `<= xp`.
pub const LEVEL_THRESHOLDS: [i64; 10] = [0, 100, 250, 500, 1000, 2000, 3500, 5000, 7500, 10000];

/// Returns the level for an experience total.
///
/// Negative totals are treated as zero.
#[must_use]
pub fn level_for_xp(xp: i64) -> i32 {
    let reached: usize = LEVEL_THRESHOLDS
        .iter()
        .take_while(|threshold| **threshold <= xp.max(0))
        .count();
    i32::try_from(reached).unwrap_or(i32::MAX)
}

/// Returns the experience total needed for the next level, or `None` at max level.
#[must_use]
pub fn xp_for_next_level(xp: i64) -> Option<i64> {
    LEVEL_THRESHOLDS
        .iter()
        .copied()
        .find(|threshold| *threshold > xp)
}

/// A user statistic an achievement rule can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    /// Number of completed jobs.
    TasksCompleted,
    /// Experience points.
    Xp,
    /// Derived level.
    Level,
    /// Mean review rating. Undefined until the first review.
    AverageRating,
    /// Number of reviews received.
    ReviewsReceived,
}

impl StatMetric {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TasksCompleted => "tasks_completed",
            Self::Xp => "xp",
            Self::Level => "level",
            Self::AverageRating => "average_rating",
            Self::ReviewsReceived => "reviews_received",
        }
    }

    /// Reads this metric from a stats snapshot.
    ///
    /// Returns `None` for the average rating of a user with no reviews.
    #[must_use]
    pub fn value_of(&self, stats: &UserStats) -> Option<f64> {
        match self {
            Self::TasksCompleted => stats.total_tasks_completed.to_f64(),
            Self::Xp => stats.xp.to_f64(),
            Self::Level => Some(f64::from(stats.level)),
            Self::AverageRating => {
                (stats.total_reviews > 0).then_some(stats.average_rating)
            }
            Self::ReviewsReceived => stats.total_reviews.to_f64(),
        }
    }
}

impl FromStr for StatMetric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks_completed" => Ok(Self::TasksCompleted),
            "xp" => Ok(Self::Xp),
            "level" => Ok(Self::Level),
            "average_rating" => Ok(Self::AverageRating),
            "reviews_received" => Ok(Self::ReviewsReceived),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "stat metric",
                value: s.to_string(),
            }),
        }
    }
}

/// An achievement predicate: `metric >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AchievementRule {
    /// The compared statistic.
    pub metric: StatMetric,
    /// The inclusive lower bound.
    pub threshold: f64,
}

impl AchievementRule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(metric: StatMetric, threshold: f64) -> Self {
        Self { metric, threshold }
    }

    /// Returns true if the stats satisfy this rule.
    #[must_use]
    pub fn is_satisfied_by(&self, stats: &UserStats) -> bool {
        self.metric
            .value_of(stats)
            .is_some_and(|value| value >= self.threshold)
    }
}

/// Per-user gamification statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// The user these stats belong to.
    pub user_id: i64,
    /// Experience points. Never decreases.
    pub xp: i64,
    /// Level derived from `xp`.
    pub level: i32,
    /// Number of completed jobs.
    pub total_tasks_completed: i64,
    /// Mean review rating, `0.0` when there are no reviews.
    pub average_rating: f64,
    /// Number of reviews received.
    pub total_reviews: i64,
}

impl UserStats {
    /// Stats for a user with no recorded activity.
    #[must_use]
    pub const fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 1,
            total_tasks_completed: 0,
            average_rating: 0.0,
            total_reviews: 0,
        }
    }

    /// Experience needed for the next level, `None` at the top level.
    #[must_use]
    pub fn xp_for_next_level(&self) -> Option<i64> {
        xp_for_next_level(self.xp)
    }

    /// Returns the stats with one more completed job.
    #[must_use]
    pub fn with_task_completed(&self) -> Self {
        Self {
            total_tasks_completed: self.total_tasks_completed.saturating_add(1),
            ..self.clone()
        }
    }

    /// Returns the stats with one more review folded into the running average.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRating` if `rating` is outside 1..=5.
    pub fn with_review(&self, rating: i32) -> Result<Self, DomainError> {
        validate_rating(rating)?;
        let previous_total: f64 = self.total_reviews.to_f64().unwrap_or(0.0);
        let total_reviews: i64 = self.total_reviews.saturating_add(1);
        let new_total: f64 = previous_total + 1.0;
        let average_rating: f64 =
            self.average_rating.mul_add(previous_total, f64::from(rating)) / new_total;

        Ok(Self {
            average_rating,
            total_reviews,
            ..self.clone()
        })
    }
}

/// Validates a review rating.
///
/// # Errors
///
/// Returns `DomainError::InvalidRating` if `rating` is outside 1..=5.
pub fn validate_rating(rating: i32) -> Result<(), DomainError> {
    if !(1..=5).contains(&rating) {
        return Err(DomainError::InvalidRating(rating));
    }
    Ok(())
}

/// A persisted achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// Database identifier.
    pub achievement_id: i64,
    /// Unique slug (e.g. `first_three_jobs`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description shown to the user.
    pub description: String,
    /// Icon identifier.
    pub icon: String,
    /// Experience granted when awarded.
    pub xp_reward: i64,
    /// Award condition.
    pub rule: AchievementRule,
}

/// A validated request to define an achievement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAchievement {
    /// Unique slug.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Icon identifier.
    pub icon: String,
    /// Experience granted when awarded.
    pub xp_reward: i64,
    /// Award condition.
    pub rule: AchievementRule,
}

impl NewAchievement {
    /// Validates an achievement definition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAchievement` if the code or name is blank,
    /// the code contains characters outside `[a-z0-9_]`, or the reward or
    /// threshold is negative.
    pub fn new(
        code: &str,
        name: &str,
        description: &str,
        icon: &str,
        xp_reward: i64,
        rule: AchievementRule,
    ) -> Result<Self, DomainError> {
        let code: &str = code.trim();
        if code.is_empty() {
            return Err(DomainError::InvalidAchievement {
                field: "code",
                reason: String::from("cannot be empty"),
            });
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::InvalidAchievement {
                field: "code",
                reason: String::from("may only contain lowercase letters, digits and '_'"),
            });
        }
        let name: &str = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidAchievement {
                field: "name",
                reason: String::from("cannot be empty"),
            });
        }
        if xp_reward < 0 {
            return Err(DomainError::InvalidAchievement {
                field: "xp_reward",
                reason: format!("must not be negative, got {xp_reward}"),
            });
        }
        if !rule.threshold.is_finite() || rule.threshold < 0.0 {
            return Err(DomainError::InvalidAchievement {
                field: "threshold",
                reason: format!("must be a non-negative number, got {}", rule.threshold),
            });
        }

        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            description: description.trim().to_string(),
            icon: icon.trim().to_string(),
            xp_reward,
            rule,
        })
    }
}

/// An achievement awarded to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    /// The awarded user.
    pub user_id: i64,
    /// The achievement definition.
    pub achievement: Achievement,
    /// RFC 3339 award timestamp.
    pub awarded_at: String,
    /// Whether the user has been shown the award.
    pub is_notified: bool,
}
