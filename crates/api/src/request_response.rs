// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use presta::{TestResults, TestSummary, VariantResult};
use presta_domain::{
    AbTest, Achievement, Category, ModerationDecision, StatMetric, Subscription, UserStats,
};
use std::collections::BTreeMap;

// ============================================================================
// Generic
// ============================================================================

/// Acknowledgement for writes without a payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    /// Creates a successful acknowledgement.
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// API request to register an account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    /// Login name, unique case-insensitively.
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// Plain-text password.
    pub password: String,
    /// `client` or `provider`.
    pub role: String,
}

/// API response for a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterResponse {
    /// The new account id.
    pub account_id: i64,
    /// Normalized login name.
    pub login_name: String,
    /// The account role.
    pub role: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The login name.
    pub login_name: String,
    /// The password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// The account id.
    pub account_id: i64,
    /// The login name.
    pub login_name: String,
    /// The display name.
    pub display_name: String,
    /// The account role.
    pub role: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
}

/// API response for the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    /// The account id.
    pub account_id: i64,
    /// The login name.
    pub login_name: String,
    /// The display name.
    pub display_name: String,
    /// The account role.
    pub role: String,
}

// ============================================================================
// A/B testing
// ============================================================================

/// API response carrying the variant for a subject.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantResponse {
    /// The test key.
    pub test_key: String,
    /// The assigned variant label.
    pub variant: String,
}

/// API request to record a conversion.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackConversionRequest {
    /// Session id of an anonymous subject.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Free-form conversion type.
    pub conversion_type: String,
    /// Optional JSON payload stored with the event.
    #[serde(default)]
    pub conversion_data: Option<serde_json::Value>,
}

/// API request to create a test.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateTestRequest {
    /// Display name.
    pub name: String,
    /// Unique key.
    pub key: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// At least two distinct variant labels.
    pub variants: Vec<String>,
}

/// API representation of a test.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestResponse {
    /// Database identifier.
    pub id: i64,
    /// Unique key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Variant labels in declared order.
    pub variants: Vec<String>,
    /// `running` or `ended`.
    pub status: String,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 end timestamp.
    pub ended_at: Option<String>,
}

impl From<AbTest> for TestResponse {
    fn from(test: AbTest) -> Self {
        Self {
            id: test.test_id,
            key: test.key,
            name: test.name,
            description: test.description,
            variants: test.variants.labels().to_vec(),
            status: test.status.as_str().to_string(),
            started_at: test.started_at,
            ended_at: test.ended_at,
        }
    }
}

/// API representation of a test summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestSummaryResponse {
    /// Database identifier.
    pub id: i64,
    /// Unique key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// `running` or `ended`.
    pub status: String,
    /// Number of declared variants.
    pub variant_count: usize,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 end timestamp.
    pub ended_at: Option<String>,
}

impl From<TestSummary> for TestSummaryResponse {
    fn from(summary: TestSummary) -> Self {
        Self {
            id: summary.test_id,
            key: summary.key,
            name: summary.name,
            status: summary.status.as_str().to_string(),
            variant_count: summary.variant_count,
            started_at: summary.started_at,
            ended_at: summary.ended_at,
        }
    }
}

/// Per-variant results.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantResultResponse {
    /// Variant label.
    pub variant: String,
    /// Subjects assigned.
    pub assignments: i64,
    /// Conversion counts by type.
    pub conversions: BTreeMap<String, i64>,
    /// Sum of all conversions.
    pub total_conversions: i64,
    /// Conversions per assignment.
    pub conversion_rate: f64,
}

impl From<VariantResult> for VariantResultResponse {
    fn from(result: VariantResult) -> Self {
        Self {
            variant: result.variant,
            assignments: result.assignments,
            conversions: result.conversions,
            total_conversions: result.total_conversions,
            conversion_rate: result.conversion_rate,
        }
    }
}

/// API response for test results.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TestResultsResponse {
    /// The test.
    pub test: TestResponse,
    /// Variants in declared order.
    pub variants: Vec<VariantResultResponse>,
}

impl From<TestResults> for TestResultsResponse {
    fn from(results: TestResults) -> Self {
        Self {
            test: results.test.into(),
            variants: results.variants.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Gamification
// ============================================================================

/// API representation of a user's stats.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserStatsResponse {
    /// The user.
    pub user_id: i64,
    /// Experience points.
    pub xp: i64,
    /// Derived level.
    pub level: i32,
    /// Threshold of the next level, `null` at the top level.
    pub xp_for_next_level: Option<i64>,
    /// Completed jobs.
    pub total_tasks_completed: i64,
    /// Mean review rating, `0` before the first review.
    pub average_rating: f64,
    /// Reviews received.
    pub total_reviews: i64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(stats: UserStats) -> Self {
        Self {
            xp_for_next_level: stats.xp_for_next_level(),
            user_id: stats.user_id,
            xp: stats.xp,
            level: stats.level,
            total_tasks_completed: stats.total_tasks_completed,
            average_rating: stats.average_rating,
            total_reviews: stats.total_reviews,
        }
    }
}

/// API request to acknowledge awarded achievements.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkNotifiedRequest {
    /// Achievement ids to acknowledge.
    pub achievement_ids: Vec<i64>,
}

/// API response for an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkNotifiedResponse {
    /// Always `true`.
    pub success: bool,
    /// Rows changed.
    pub updated: usize,
}

/// API response listing newly awarded achievements.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AwardResponse {
    /// Always `true`.
    pub success: bool,
    /// Number of new awards.
    pub awarded_count: usize,
    /// The new awards, in definition order.
    pub awarded: Vec<Achievement>,
}

impl From<Vec<Achievement>> for AwardResponse {
    fn from(awarded: Vec<Achievement>) -> Self {
        Self {
            success: true,
            awarded_count: awarded.len(),
            awarded,
        }
    }
}

/// A domain event that moves a user's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamificationEvent {
    /// The user completed a job.
    TaskCompleted,
    /// The user received a review; needs a rating.
    ReviewReceived,
}

/// API request to record a gamification event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordEventRequest {
    /// The user the event belongs to.
    pub user_id: i64,
    /// The event.
    pub event: GamificationEvent,
    /// Review rating, 1 to 5.
    #[serde(default)]
    pub rating: Option<i32>,
}

/// API request to define an achievement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreateAchievementRequest {
    /// Unique slug.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Icon name.
    #[serde(default)]
    pub icon: String,
    /// Experience granted on award.
    pub xp_reward: i64,
    /// Statistic compared by the rule.
    pub metric: StatMetric,
    /// Minimum value of the statistic.
    pub threshold: f64,
}

// ============================================================================
// Catalog and credits
// ============================================================================

/// API response for a category with its active children.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryDetailResponse {
    /// The category.
    pub category: Category,
    /// Active sub-categories in display order.
    pub children: Vec<Category>,
}

/// API response for a credit summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreditSummaryResponse {
    /// Remaining credits.
    pub balance: i64,
    /// Most recent subscription, if any.
    pub subscription: Option<Subscription>,
    /// Effective commission percentage.
    pub commission_rate_percent: u8,
    /// Commission bracket.
    pub commission_tier: String,
}

// ============================================================================
// Submissions
// ============================================================================

/// API request carrying a contact form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactRequest {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
}

/// API response for a stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactResponse {
    /// Always `true`.
    pub success: bool,
    /// The stored message id.
    pub id: i64,
}

/// API request to submit a video testimonial.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubmitTestimonialRequest {
    /// Name shown with the testimonial.
    pub author_name: String,
    /// `https://` URL of the uploaded video.
    pub video_url: String,
    /// Optional caption.
    #[serde(default)]
    pub caption: Option<String>,
}

/// API request to moderate a testimonial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModerateTestimonialRequest {
    /// `approve` or `reject`.
    pub decision: ModerationDecision,
}

/// API request to register an uploaded review photo.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterPhotoRequest {
    /// Path of the stored file.
    pub storage_path: String,
    /// MIME type.
    pub content_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
}
