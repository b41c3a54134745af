// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each handler validates its input, enforces authorization, calls the
//! engines or the persistence layer, and translates every failure into an
//! [`ApiError`].

use presta::{TestResults, now_timestamp};
use presta_domain::{
    AbTest, Achievement, AchievementRule, Category, CommissionTier, District, NewAbTest,
    NewAchievement, NewContactMessage, NewReviewPhoto, NewTestimonial, PopularService,
    ReviewPhoto, Subscription, Testimonial, TestimonialStatus, UserAchievement, UserStats,
    clamp_popular_limit, commission_rate_percent, validate_city, validate_photo_capacity,
};
use presta_persistence::{AccountData, CreditBalance, Persistence, SessionData};
use tracing::{debug, info};

use crate::auth::{AuthenticatedUser, AuthenticationService, AuthorizationService, Role};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AwardResponse, CategoryDetailResponse, ContactRequest, ContactResponse,
    CreateAchievementRequest, CreateTestRequest, CreditSummaryResponse, GamificationEvent,
    LoginRequest, LoginResponse, MarkNotifiedRequest, MarkNotifiedResponse,
    ModerateTestimonialRequest, RecordEventRequest, RegisterPhotoRequest, RegisterRequest,
    RegisterResponse, SubmitTestimonialRequest, SuccessResponse, TestResponse,
    TestResultsResponse, TestSummaryResponse, TrackConversionRequest, UserStatsResponse,
    VariantResponse, WhoAmIResponse,
};

fn internal<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> ApiError + '_ {
    move |err| ApiError::Internal {
        message: format!("{context}: {err}"),
    }
}

fn timestamp() -> Result<String, ApiError> {
    now_timestamp().map_err(translate_core_error)
}

// ============================================================================
// Authentication
// ============================================================================

/// Registers a client or provider account.
///
/// # Errors
///
/// Returns an error if the role is not self-registrable, the password fails
/// the policy, or the login name is taken.
pub fn register(
    persistence: &mut Persistence,
    request: &RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    let login_name: &str = request.login_name.trim();
    if login_name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("login_name"),
            message: String::from("Login name cannot be empty"),
        });
    }
    if request.display_name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("display_name"),
            message: String::from("Display name cannot be empty"),
        });
    }
    let role: Role = match Role::parse(request.role.trim()) {
        Some(role @ (Role::Client | Role::Provider)) => role,
        _ => {
            return Err(ApiError::InvalidInput {
                field: String::from("role"),
                message: format!(
                    "Invalid role: {}. Must be 'client' or 'provider'",
                    request.role
                ),
            });
        }
    };

    PasswordPolicy::default().validate(&request.password, login_name, &request.display_name)?;

    let account_id: i64 = persistence
        .create_account(
            login_name,
            &request.display_name,
            &request.password,
            role.as_str(),
            &timestamp()?,
        )
        .map_err(|e| translate_persistence_error(e, "Account"))?;

    info!(account_id, role = role.as_str(), "Account registered");

    Ok(RegisterResponse {
        account_id,
        login_name: login_name.to_lowercase(),
        role: role.as_str().to_string(),
    })
}

/// Creates the first admin account unless an admin already exists.
///
/// Returns the new account id, or `None` when an admin was already present.
///
/// # Errors
///
/// Returns an error if the password fails the policy or the write fails.
pub fn ensure_admin_account(
    persistence: &mut Persistence,
    login_name: &str,
    password: &str,
) -> Result<Option<i64>, ApiError> {
    let admins: i64 = persistence
        .count_accounts_with_role(Role::Admin.as_str())
        .map_err(internal("Failed to count admins"))?;
    if admins > 0 {
        debug!(admins, "Admin account already present");
        return Ok(None);
    }

    PasswordPolicy::default().validate(password, login_name, login_name)?;

    let account_id: i64 = persistence
        .create_account(
            login_name,
            login_name,
            password,
            Role::Admin.as_str(),
            &timestamp()?,
        )
        .map_err(|e| translate_persistence_error(e, "Account"))?;

    info!(account_id, "Bootstrap admin account created");
    Ok(Some(account_id))
}

/// Logs in and returns a session token.
///
/// # Errors
///
/// Returns `AuthenticationFailed` for unknown logins or wrong passwords.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, session, user): (String, SessionData, AuthenticatedUser) =
        AuthenticationService::login(persistence, &request.login_name, &request.password)?;

    Ok(LoginResponse {
        session_token,
        account_id: user.account_id,
        login_name: user.login_name,
        display_name: user.display_name,
        role: user.role.as_str().to_string(),
        expires_at: session.expires_at,
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the authenticated account.
#[must_use]
pub fn whoami(user: &AuthenticatedUser) -> WhoAmIResponse {
    WhoAmIResponse {
        account_id: user.account_id,
        login_name: user.login_name.clone(),
        display_name: user.display_name.clone(),
        role: user.role.as_str().to_string(),
    }
}

// ============================================================================
// A/B testing
// ============================================================================

/// Returns the caller's variant for a running test.
///
/// # Errors
///
/// Returns an error if the test is not running or no subject is given.
pub fn get_variant(
    persistence: &mut Persistence,
    test_key: &str,
    user: Option<&AuthenticatedUser>,
    session_id: Option<&str>,
) -> Result<VariantResponse, ApiError> {
    let variant: String = presta::get_variant(
        persistence,
        test_key,
        user.map(|u| u.account_id),
        session_id,
    )
    .map_err(translate_core_error)?;

    Ok(VariantResponse {
        test_key: test_key.to_string(),
        variant,
    })
}

/// Records a conversion for the caller's assigned variant.
///
/// # Errors
///
/// Returns an error if the test is not running, the caller has no
/// assignment, or the conversion type is blank.
pub fn track_conversion(
    persistence: &mut Persistence,
    test_key: &str,
    user: Option<&AuthenticatedUser>,
    request: &TrackConversionRequest,
) -> Result<SuccessResponse, ApiError> {
    let conversion_data: Option<String> = request
        .conversion_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::InvalidInput {
            field: String::from("conversion_data"),
            message: e.to_string(),
        })?;

    let conversion_id: i64 = presta::track_conversion(
        persistence,
        test_key,
        user.map(|u| u.account_id),
        request.session_id.as_deref(),
        &request.conversion_type,
        conversion_data,
    )
    .map_err(translate_core_error)?;

    debug!(conversion_id, test_key, "Conversion tracked");
    Ok(SuccessResponse::ok())
}

/// Lists every test.
///
/// # Errors
///
/// Returns an error if the caller is not an admin.
pub fn list_tests(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<Vec<TestSummaryResponse>, ApiError> {
    AuthorizationService::require_admin(user, "list_tests")?;

    Ok(presta::get_all_tests(persistence)
        .map_err(translate_core_error)?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Returns the per-variant results of a test.
///
/// # Errors
///
/// Returns an error if the caller is not an admin or the test is unknown.
pub fn get_test_results(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    test_id: i64,
) -> Result<TestResultsResponse, ApiError> {
    AuthorizationService::require_admin(user, "get_test_results")?;

    let results: TestResults =
        presta::get_test_results(persistence, test_id).map_err(translate_core_error)?;
    Ok(results.into())
}

/// Creates a running test.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the request is invalid,
/// or the key is taken.
pub fn create_test(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: CreateTestRequest,
) -> Result<TestResponse, ApiError> {
    AuthorizationService::require_admin(user, "create_test")?;

    let new_test: NewAbTest = NewAbTest::new(
        &request.key,
        &request.name,
        request.description,
        request.variants,
    )
    .map_err(translate_domain_error)?;

    let test: AbTest = presta::create_test(persistence, &new_test).map_err(translate_core_error)?;
    info!(
        test_id = test.test_id,
        test_key = %test.key,
        admin = user.account_id,
        "A/B test created"
    );
    Ok(test.into())
}

/// Ends a test. Ending an ended test returns it unchanged.
///
/// # Errors
///
/// Returns an error if the caller is not an admin or the test is unknown.
pub fn end_test(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    test_id: i64,
) -> Result<TestResponse, ApiError> {
    AuthorizationService::require_admin(user, "end_test")?;

    let test: AbTest = presta::end_test(persistence, test_id).map_err(translate_core_error)?;
    info!(test_id, admin = user.account_id, "A/B test ended");
    Ok(test.into())
}

// ============================================================================
// Gamification
// ============================================================================

/// Returns the caller's stats.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_stats(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<UserStatsResponse, ApiError> {
    let stats: UserStats =
        presta::get_user_stats(persistence, user.account_id).map_err(translate_core_error)?;
    Ok(stats.into())
}

/// Lists the caller's awards, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_achievements(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<Vec<UserAchievement>, ApiError> {
    presta::get_user_achievements(persistence, user.account_id).map_err(translate_core_error)
}

/// Acknowledges some of the caller's awards.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn mark_as_notified(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &MarkNotifiedRequest,
) -> Result<MarkNotifiedResponse, ApiError> {
    let updated: usize =
        presta::mark_as_notified(persistence, user.account_id, &request.achievement_ids)
            .map_err(translate_core_error)?;
    Ok(MarkNotifiedResponse {
        success: true,
        updated,
    })
}

/// Awards every achievement the caller now qualifies for.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn check_achievements(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<AwardResponse, ApiError> {
    let awarded: Vec<Achievement> =
        presta::check_and_award_achievements(persistence, user.account_id)
            .map_err(translate_core_error)?;
    Ok(awarded.into())
}

/// Records a job or review event for a user and returns new awards.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the user is unknown, or
/// a review event carries no valid rating.
pub fn record_event(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &RecordEventRequest,
) -> Result<AwardResponse, ApiError> {
    AuthorizationService::require_admin(user, "record_event")?;

    let account: Option<AccountData> = persistence
        .get_account_by_id(request.user_id)
        .map_err(internal("Failed to load account"))?;
    if account.is_none() {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("User {} does not exist", request.user_id),
        });
    }

    let awarded: Vec<Achievement> = match request.event {
        GamificationEvent::TaskCompleted => {
            presta::record_task_completed(persistence, request.user_id)
        }
        GamificationEvent::ReviewReceived => {
            let rating: i32 = request.rating.ok_or_else(|| ApiError::InvalidInput {
                field: String::from("rating"),
                message: String::from("A rating is required for review events"),
            })?;
            presta::record_review_received(persistence, request.user_id, rating)
        }
    }
    .map_err(translate_core_error)?;

    info!(
        user_id = request.user_id,
        event = ?request.event,
        awarded = awarded.len(),
        "Gamification event recorded"
    );
    Ok(awarded.into())
}

/// Defines a new achievement.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the definition is
/// invalid, or the code is taken.
pub fn create_achievement(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &CreateAchievementRequest,
) -> Result<Achievement, ApiError> {
    AuthorizationService::require_admin(user, "create_achievement")?;

    let new_achievement: NewAchievement = NewAchievement::new(
        &request.code,
        &request.name,
        &request.description,
        &request.icon,
        request.xp_reward,
        AchievementRule::new(request.metric, request.threshold),
    )
    .map_err(translate_domain_error)?;

    presta::create_achievement(persistence, &new_achievement).map_err(translate_core_error)
}

// ============================================================================
// Catalog
// ============================================================================

/// Lists top-level categories.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_categories(
    persistence: &mut Persistence,
    include_inactive: bool,
) -> Result<Vec<Category>, ApiError> {
    persistence
        .list_categories(include_inactive)
        .map_err(internal("Failed to list categories"))
}

/// Returns an active category and its active children.
///
/// # Errors
///
/// Returns `ResourceNotFound` for unknown or inactive slugs.
pub fn get_category(
    persistence: &mut Persistence,
    slug: &str,
) -> Result<CategoryDetailResponse, ApiError> {
    let category: Category = persistence
        .get_category_by_slug(slug)
        .map_err(internal("Failed to load category"))?
        .filter(|c| c.is_active)
        .ok_or_else(|| {
            translate_domain_error(presta_domain::DomainError::CategoryNotFound(
                slug.to_string(),
            ))
        })?;
    let children: Vec<Category> = persistence
        .list_child_categories(category.category_id)
        .map_err(internal("Failed to list sub-categories"))?;

    Ok(CategoryDetailResponse { category, children })
}

/// Lists the districts of a city.
///
/// # Errors
///
/// Returns `InvalidInput` when the city is missing or blank.
pub fn list_districts(
    persistence: &mut Persistence,
    city: Option<&str>,
) -> Result<Vec<District>, ApiError> {
    let city: String = validate_city(city.unwrap_or_default()).map_err(translate_domain_error)?;
    persistence
        .list_districts(&city)
        .map_err(internal("Failed to list districts"))
}

/// Lists the most requested services, optionally within one category.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown category slug.
pub fn list_popular_services(
    persistence: &mut Persistence,
    limit: Option<i64>,
    category_slug: Option<&str>,
) -> Result<Vec<PopularService>, ApiError> {
    let category_id: Option<i64> = match category_slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Some(
            persistence
                .get_category_by_slug(slug)
                .map_err(internal("Failed to load category"))?
                .ok_or_else(|| {
                    translate_domain_error(presta_domain::DomainError::CategoryNotFound(
                        slug.to_string(),
                    ))
                })?
                .category_id,
        ),
        None => None,
    };

    persistence
        .list_popular_services(clamp_popular_limit(limit), category_id)
        .map_err(internal("Failed to list popular services"))
}

// ============================================================================
// Credits
// ============================================================================

/// Returns the caller's credits, subscription and commission rate.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_credit_summary(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<CreditSummaryResponse, ApiError> {
    let balance: i64 = persistence
        .get_credit_balance(user.account_id)
        .map_err(internal("Failed to load credits"))?
        .map_or(0, |credits: CreditBalance| credits.balance);
    let subscription: Option<Subscription> = persistence
        .get_latest_subscription(user.account_id)
        .map_err(internal("Failed to load subscription"))?;
    let stats: UserStats =
        presta::get_user_stats(persistence, user.account_id).map_err(translate_core_error)?;

    let tier: CommissionTier = CommissionTier::for_tasks_completed(stats.total_tasks_completed);
    Ok(CreditSummaryResponse {
        balance,
        commission_rate_percent: commission_rate_percent(tier, subscription.as_ref()),
        commission_tier: tier.as_str().to_string(),
        subscription,
    })
}

// ============================================================================
// Submissions
// ============================================================================

/// Stores a contact form.
///
/// # Errors
///
/// Returns `InvalidInput` naming the first invalid field.
pub fn submit_contact_message(
    persistence: &mut Persistence,
    request: &ContactRequest,
) -> Result<ContactResponse, ApiError> {
    let message: NewContactMessage = NewContactMessage::new(
        &request.name,
        &request.email,
        &request.subject,
        &request.message,
    )
    .map_err(translate_domain_error)?;

    let id: i64 = persistence
        .create_contact_message(&message, &timestamp()?)
        .map_err(internal("Failed to store contact message"))?;

    Ok(ContactResponse { success: true, id })
}

/// Submits a testimonial for moderation.
///
/// # Errors
///
/// Returns `InvalidInput` if the author or URL is invalid.
pub fn submit_testimonial(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: SubmitTestimonialRequest,
) -> Result<Testimonial, ApiError> {
    let testimonial: NewTestimonial = NewTestimonial::new(
        user.account_id,
        &request.author_name,
        &request.video_url,
        request.caption,
    )
    .map_err(translate_domain_error)?;

    persistence
        .create_testimonial(&testimonial, &timestamp()?)
        .map_err(internal("Failed to store testimonial"))
}

/// Lists approved testimonials, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_testimonials(persistence: &mut Persistence) -> Result<Vec<Testimonial>, ApiError> {
    persistence
        .list_testimonials_by_status(TestimonialStatus::Approved)
        .map_err(internal("Failed to list testimonials"))
}

/// Approves or rejects a pending testimonial.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the testimonial is
/// unknown, or it was already moderated.
pub fn moderate_testimonial(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    testimonial_id: i64,
    request: &ModerateTestimonialRequest,
) -> Result<Testimonial, ApiError> {
    AuthorizationService::require_admin(user, "moderate_testimonial")?;

    let current: Testimonial = load_testimonial(persistence, testimonial_id)?;
    let next: TestimonialStatus = current
        .status
        .moderate(testimonial_id, request.decision)
        .map_err(translate_domain_error)?;

    let updated: usize = persistence
        .update_testimonial_status(testimonial_id, next, &timestamp()?)
        .map_err(internal("Failed to moderate testimonial"))?;

    let stored: Testimonial = load_testimonial(persistence, testimonial_id)?;
    if updated == 0 {
        // Moderated by someone else since it was loaded.
        return Err(translate_domain_error(
            presta_domain::DomainError::TestimonialAlreadyModerated {
                testimonial_id,
                status: stored.status.as_str().to_string(),
            },
        ));
    }

    info!(
        testimonial_id,
        status = stored.status.as_str(),
        admin = user.account_id,
        "Testimonial moderated"
    );
    Ok(stored)
}

fn load_testimonial(
    persistence: &mut Persistence,
    testimonial_id: i64,
) -> Result<Testimonial, ApiError> {
    persistence
        .get_testimonial(testimonial_id)
        .map_err(internal("Failed to load testimonial"))?
        .ok_or_else(|| {
            translate_domain_error(presta_domain::DomainError::TestimonialNotFound(
                testimonial_id,
            ))
        })
}

/// Lists the photos of a review in upload order.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_review_photos(
    persistence: &mut Persistence,
    review_id: i64,
) -> Result<Vec<ReviewPhoto>, ApiError> {
    persistence
        .list_review_photos(review_id)
        .map_err(internal("Failed to list review photos"))
}

/// Registers an uploaded photo on a review.
///
/// # Errors
///
/// Returns an error if the photo is invalid or the review already has the
/// maximum number of photos.
pub fn register_review_photo(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    review_id: i64,
    request: &RegisterPhotoRequest,
) -> Result<ReviewPhoto, ApiError> {
    let photo: NewReviewPhoto = NewReviewPhoto::new(
        review_id,
        user.account_id,
        &request.storage_path,
        &request.content_type,
        request.size_bytes,
    )
    .map_err(translate_domain_error)?;

    let existing: i64 = persistence
        .count_review_photos(review_id)
        .map_err(internal("Failed to count review photos"))?;
    validate_photo_capacity(review_id, existing).map_err(translate_domain_error)?;

    let stored: ReviewPhoto = persistence
        .create_review_photo(&photo, &timestamp()?)
        .map_err(internal("Failed to store review photo"))?;
    info!(
        photo_id = stored.photo_id,
        review_id,
        user_id = user.account_id,
        "Review photo registered"
    );
    Ok(stored)
}
