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
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use presta_api::{
    ApiError, AuthenticationService, AwardResponse, CategoryDetailResponse, ContactRequest,
    ContactResponse, CreateAchievementRequest, CreateTestRequest, CreditSummaryResponse,
    LoginRequest, LoginResponse, MarkNotifiedRequest, MarkNotifiedResponse,
    ModerateTestimonialRequest, RecordEventRequest, RegisterPhotoRequest, RegisterRequest,
    RegisterResponse, Role, SubmitTestimonialRequest, SuccessResponse, TestResponse,
    TestResultsResponse, TestSummaryResponse, TrackConversionRequest, UserStatsResponse,
    VariantResponse, WhoAmIResponse,
};
use presta_domain::{
    Achievement, Category, District, PopularService, ReviewPhoto, Testimonial, UserAchievement,
};
use presta_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{OptionalSessionUser, SessionUser};

/// How often expired sessions are swept from the store.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Presta Server - HTTP server for the Presta marketplace backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Login name of the admin account to create when none exists
    #[arg(long, requires = "admin_password")]
    admin_login: Option<String>,

    /// Password of the admin account to create when none exists
    #[arg(long, requires = "admin_login")]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// Engines are stateless; the only shared resource is the store.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, serialized behind an async mutex.
    persistence: Arc<Mutex<Persistence>>,
}

/// Query for variant lookups.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct VariantQuery {
    /// Anonymous visitor identifier.
    session_id: Option<String>,
}

/// Query for category listings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct CategoriesQuery {
    /// Include inactive categories. Honoured for admins only.
    include_inactive: Option<bool>,
}

/// Query for district listings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct DistrictsQuery {
    /// The city to list districts for.
    city: Option<String>,
}

/// Query for popular services.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct PopularServicesQuery {
    /// Maximum number of services to return.
    limit: Option<i64>,
    /// Restrict to one category slug.
    category: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Always `"ok"`.
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. }
            | ApiError::InvalidInput { .. }
            | ApiError::PasswordPolicyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Internal error while handling request");
            return Self {
                status,
                message: String::from("Internal server error"),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Handler for POST `/auth/register`.
async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), HttpError> {
    info!(login_name = %req.login_name, role = %req.role, "Handling register request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterResponse = presta_api::register(&mut persistence, &req)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = presta_api::login(&mut persistence, &req)?;

    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, token): SessionUser,
) -> Result<Json<SuccessResponse>, HttpError> {
    info!(account_id = user.account_id, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    presta_api::logout(&mut persistence, &token)?;

    Ok(Json(SuccessResponse::ok()))
}

/// Handler for GET `/auth/me`.
async fn handle_whoami(SessionUser(user, _): SessionUser) -> Json<WhoAmIResponse> {
    Json(presta_api::whoami(&user))
}

// ============================================================================
// A/B testing
// ============================================================================

/// Handler for GET `/ab-tests/{test}/variant`.
async fn handle_get_variant(
    AxumState(app_state): AxumState<AppState>,
    Path(test_key): Path<String>,
    Query(query): Query<VariantQuery>,
    OptionalSessionUser(user): OptionalSessionUser,
) -> Result<Json<VariantResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: VariantResponse = presta_api::get_variant(
        &mut persistence,
        &test_key,
        user.as_ref(),
        query.session_id.as_deref(),
    )?;

    Ok(Json(response))
}

/// Handler for POST `/ab-tests/{test}/conversion`.
async fn handle_track_conversion(
    AxumState(app_state): AxumState<AppState>,
    Path(test_key): Path<String>,
    OptionalSessionUser(user): OptionalSessionUser,
    Json(req): Json<TrackConversionRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: SuccessResponse =
        presta_api::track_conversion(&mut persistence, &test_key, user.as_ref(), &req)?;

    Ok(Json(response))
}

/// Handler for GET `/ab-tests`.
async fn handle_list_tests(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<Vec<TestSummaryResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TestSummaryResponse> = presta_api::list_tests(&mut persistence, &user)?;

    Ok(Json(response))
}

/// Handler for POST `/ab-tests`.
async fn handle_create_test(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<CreateTestRequest>,
) -> Result<(StatusCode, Json<TestResponse>), HttpError> {
    info!(
        account_id = user.account_id,
        test_key = %req.key,
        "Handling create_test request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: TestResponse = presta_api::create_test(&mut persistence, &user, req)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/ab-tests/{test}/results`.
async fn handle_get_test_results(
    AxumState(app_state): AxumState<AppState>,
    Path(test_id): Path<i64>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<TestResultsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TestResultsResponse =
        presta_api::get_test_results(&mut persistence, &user, test_id)?;

    Ok(Json(response))
}

/// Handler for POST `/ab-tests/{test}/end`.
async fn handle_end_test(
    AxumState(app_state): AxumState<AppState>,
    Path(test_id): Path<i64>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<TestResponse>, HttpError> {
    info!(account_id = user.account_id, test_id, "Handling end_test request");

    let mut persistence = app_state.persistence.lock().await;
    let response: TestResponse = presta_api::end_test(&mut persistence, &user, test_id)?;

    Ok(Json(response))
}

// ============================================================================
// Gamification
// ============================================================================

/// Handler for GET `/gamification/stats`.
async fn handle_get_stats(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<UserStatsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserStatsResponse = presta_api::get_stats(&mut persistence, &user)?;

    Ok(Json(response))
}

/// Handler for GET `/gamification/achievements`.
async fn handle_get_achievements(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<Vec<UserAchievement>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<UserAchievement> = presta_api::get_achievements(&mut persistence, &user)?;

    Ok(Json(response))
}

/// Handler for POST `/gamification/achievements`.
async fn handle_create_achievement(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<CreateAchievementRequest>,
) -> Result<(StatusCode, Json<Achievement>), HttpError> {
    info!(
        account_id = user.account_id,
        code = %req.code,
        "Handling create_achievement request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: Achievement = presta_api::create_achievement(&mut persistence, &user, &req)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/gamification/notified`.
async fn handle_mark_notified(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<MarkNotifiedRequest>,
) -> Result<Json<MarkNotifiedResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MarkNotifiedResponse =
        presta_api::mark_as_notified(&mut persistence, &user, &req)?;

    Ok(Json(response))
}

/// Handler for POST `/gamification/check`.
async fn handle_check_achievements(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<AwardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AwardResponse = presta_api::check_achievements(&mut persistence, &user)?;

    Ok(Json(response))
}

/// Handler for POST `/gamification/events`.
async fn handle_record_event(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<RecordEventRequest>,
) -> Result<Json<AwardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AwardResponse = presta_api::record_event(&mut persistence, &user, &req)?;

    Ok(Json(response))
}

// ============================================================================
// Catalog and credits
// ============================================================================

/// Handler for GET `/categories`.
async fn handle_list_categories(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CategoriesQuery>,
    OptionalSessionUser(user): OptionalSessionUser,
) -> Result<Json<Vec<Category>>, HttpError> {
    let include_inactive: bool = query.include_inactive.unwrap_or(false)
        && user.is_some_and(|u| u.role == Role::Admin);

    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<Category> =
        presta_api::list_categories(&mut persistence, include_inactive)?;

    Ok(Json(response))
}

/// Handler for GET `/categories/{slug}`.
async fn handle_get_category(
    AxumState(app_state): AxumState<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CategoryDetailResponse = presta_api::get_category(&mut persistence, &slug)?;

    Ok(Json(response))
}

/// Handler for GET `/districts`.
async fn handle_list_districts(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<DistrictsQuery>,
) -> Result<Json<Vec<District>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<District> =
        presta_api::list_districts(&mut persistence, query.city.as_deref())?;

    Ok(Json(response))
}

/// Handler for GET `/services/popular`.
async fn handle_list_popular_services(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<PopularServicesQuery>,
) -> Result<Json<Vec<PopularService>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<PopularService> = presta_api::list_popular_services(
        &mut persistence,
        query.limit,
        query.category.as_deref(),
    )?;

    Ok(Json(response))
}

/// Handler for GET `/users/me/credits`.
async fn handle_get_credits(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<CreditSummaryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CreditSummaryResponse = presta_api::get_credit_summary(&mut persistence, &user)?;

    Ok(Json(response))
}

// ============================================================================
// Submissions
// ============================================================================

/// Handler for POST `/contact`.
async fn handle_contact(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ContactResponse = presta_api::submit_contact_message(&mut persistence, &req)?;

    info!(contact_id = response.id, "Contact message received");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/testimonials`.
async fn handle_list_testimonials(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Testimonial>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<Testimonial> = presta_api::list_testimonials(&mut persistence)?;

    Ok(Json(response))
}

/// Handler for POST `/testimonials`.
async fn handle_submit_testimonial(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<SubmitTestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Testimonial = presta_api::submit_testimonial(&mut persistence, &user, req)?;

    info!(
        testimonial_id = response.testimonial_id,
        account_id = user.account_id,
        "Testimonial submitted"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/testimonials/{id}/moderate`.
async fn handle_moderate_testimonial(
    AxumState(app_state): AxumState<AppState>,
    Path(testimonial_id): Path<i64>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<ModerateTestimonialRequest>,
) -> Result<Json<Testimonial>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Testimonial =
        presta_api::moderate_testimonial(&mut persistence, &user, testimonial_id, &req)?;

    Ok(Json(response))
}

/// Handler for GET `/reviews/{id}/photos`.
async fn handle_list_review_photos(
    AxumState(app_state): AxumState<AppState>,
    Path(review_id): Path<i64>,
) -> Result<Json<Vec<ReviewPhoto>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<ReviewPhoto> = presta_api::list_review_photos(&mut persistence, review_id)?;

    Ok(Json(response))
}

/// Handler for POST `/reviews/{id}/photos`.
async fn handle_register_review_photo(
    AxumState(app_state): AxumState<AppState>,
    Path(review_id): Path<i64>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<RegisterPhotoRequest>,
) -> Result<(StatusCode, Json<ReviewPhoto>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ReviewPhoto =
        presta_api::register_review_photo(&mut persistence, &user, review_id, &req)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/ab-tests", get(handle_list_tests).post(handle_create_test))
        .route("/ab-tests/{test}/variant", get(handle_get_variant))
        .route("/ab-tests/{test}/conversion", post(handle_track_conversion))
        .route("/ab-tests/{test}/results", get(handle_get_test_results))
        .route("/ab-tests/{test}/end", post(handle_end_test))
        .route("/gamification/stats", get(handle_get_stats))
        .route(
            "/gamification/achievements",
            get(handle_get_achievements).post(handle_create_achievement),
        )
        .route("/gamification/notified", post(handle_mark_notified))
        .route("/gamification/check", post(handle_check_achievements))
        .route("/gamification/events", post(handle_record_event))
        .route("/categories", get(handle_list_categories))
        .route("/categories/{slug}", get(handle_get_category))
        .route("/districts", get(handle_list_districts))
        .route("/services/popular", get(handle_list_popular_services))
        .route("/users/me/credits", get(handle_get_credits))
        .route("/contact", post(handle_contact))
        .route(
            "/testimonials",
            get(handle_list_testimonials).post(handle_submit_testimonial),
        )
        .route(
            "/testimonials/{id}/moderate",
            post(handle_moderate_testimonial),
        )
        .route(
            "/reviews/{id}/photos",
            get(handle_list_review_photos).post(handle_register_review_photo),
        )
        .with_state(app_state)
}

/// Sweeps expired sessions on a fixed interval for the life of the process.
fn spawn_session_purge(persistence: Arc<Mutex<Persistence>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let mut persistence = persistence.lock().await;
            match AuthenticationService::purge_expired_sessions(&mut persistence) {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Failed to purge expired sessions"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Presta Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(login_name), Some(password)) = (&args.admin_login, &args.admin_password) {
        match presta_api::ensure_admin_account(&mut persistence, login_name, password)? {
            Some(account_id) => info!(account_id, "Created admin account"),
            None => info!("Admin account already exists, skipping bootstrap"),
        }
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };
    spawn_session_purge(Arc::clone(&app_state.persistence));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
