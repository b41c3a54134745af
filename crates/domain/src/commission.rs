// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Provider commission tiers and subscription plans.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Completed jobs needed to reach the `Confirmed` tier.
pub const CONFIRMED_TIER_MIN_TASKS: i64 = 10;

/// Completed jobs needed to reach the `Expert` tier.
pub const EXPERT_TIER_MIN_TASKS: i64 = 50;

/// Subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// No paid plan.
    Free,
    /// Entry paid plan.
    Pro,
    /// Top paid plan.
    Premium,
}

impl SubscriptionPlan {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Premium => "premium",
        }
    }

    /// Percentage points removed from the commission rate while active.
    #[must_use]
    pub const fn commission_discount_points(&self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Pro => 1,
            Self::Premium => 2,
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "premium" => Ok(Self::Premium),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "subscription plan",
                value: s.to_string(),
            }),
        }
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Billing is current.
    Active,
    /// Cancelled by the user.
    Cancelled,
    /// Lapsed.
    Expired,
}

impl SubscriptionStatus {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "subscription status",
                value: s.to_string(),
            }),
        }
    }
}

/// A user's subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Plan.
    pub plan: SubscriptionPlan,
    /// Status.
    pub status: SubscriptionStatus,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 expiry timestamp, if the plan expires.
    pub expires_at: Option<String>,
}

/// Provider fee bracket, derived from completed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTier {
    /// Fewer than [`CONFIRMED_TIER_MIN_TASKS`] jobs.
    Standard,
    /// Up to [`EXPERT_TIER_MIN_TASKS`] jobs.
    Confirmed,
    /// [`EXPERT_TIER_MIN_TASKS`] jobs or more.
    Expert,
}

impl CommissionTier {
    /// Returns the tier for a completed job count.
    #[must_use]
    pub const fn for_tasks_completed(tasks_completed: i64) -> Self {
        if tasks_completed >= EXPERT_TIER_MIN_TASKS {
            Self::Expert
        } else if tasks_completed >= CONFIRMED_TIER_MIN_TASKS {
            Self::Confirmed
        } else {
            Self::Standard
        }
    }

    /// Base commission percentage before subscription discounts.
    #[must_use]
    pub const fn base_rate_percent(&self) -> u8 {
        match self {
            Self::Standard => 15,
            Self::Confirmed => 12,
            Self::Expert => 10,
        }
    }

    /// Returns the string representation used in JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Confirmed => "confirmed",
            Self::Expert => "expert",
        }
    }
}

/// Computes the effective commission percentage.
///
/// Only an `Active` subscription lowers the rate.
#[must_use]
pub fn commission_rate_percent(tier: CommissionTier, subscription: Option<&Subscription>) -> u8 {
    let discount: u8 = subscription
        .filter(|s| s.status == SubscriptionStatus::Active)
        .map_or(0, |s| s.plan.commission_discount_points());
    tier.base_rate_percent().saturating_sub(discount)
}
