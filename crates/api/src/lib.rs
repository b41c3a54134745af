// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the Presta marketplace backend.
//!
//! This crate sits between the HTTP server and the engines. It owns
//! authentication, role checks, request and response shapes, and the
//! translation of domain, core and persistence failures into [`ApiError`].
//! It performs no I/O of its own beyond the [`Persistence`] handle passed
//! to every handler.
//!
//! [`Persistence`]: presta_persistence::Persistence

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

mod auth;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedUser, AuthenticationService, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    check_achievements, create_achievement, create_test, end_test, ensure_admin_account,
    get_achievements, get_category, get_credit_summary, get_stats, get_test_results, get_variant,
    list_categories, list_districts, list_popular_services, list_review_photos, list_testimonials,
    list_tests, login, logout, mark_as_notified, moderate_testimonial, record_event, register,
    register_review_photo, submit_contact_message, submit_testimonial, track_conversion, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AwardResponse, CategoryDetailResponse, ContactRequest, ContactResponse,
    CreateAchievementRequest, CreateTestRequest, CreditSummaryResponse, GamificationEvent,
    LoginRequest, LoginResponse, MarkNotifiedRequest, MarkNotifiedResponse,
    ModerateTestimonialRequest, RecordEventRequest, RegisterPhotoRequest, RegisterRequest,
    RegisterResponse, SubmitTestimonialRequest, SuccessResponse, TestResponse,
    TestResultsResponse, TestSummaryResponse, TrackConversionRequest, UserStatsResponse,
    VariantResponse, VariantResultResponse, WhoAmIResponse,
};
