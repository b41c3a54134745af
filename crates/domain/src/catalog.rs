// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-mostly reference data: categories, districts, popular services.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default number of popular services returned.
pub const DEFAULT_POPULAR_LIMIT: i64 = 10;

/// Maximum number of popular services returned.
pub const MAX_POPULAR_LIMIT: i64 = 50;

/// A service category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Database identifier.
    pub category_id: i64,
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional icon identifier.
    pub icon: Option<String>,
    /// Parent category, for sub-categories.
    pub parent_id: Option<i64>,
    /// Sort position.
    pub position: i32,
    /// Whether the category is shown to clients.
    pub is_active: bool,
}

/// A city district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// Database identifier.
    pub district_id: i64,
    /// City name.
    pub city: String,
    /// District name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Optional postal code.
    pub postal_code: Option<String>,
}

/// A frequently requested service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularService {
    /// Database identifier.
    pub service_id: i64,
    /// Owning category.
    pub category_id: i64,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Number of client requests.
    pub request_count: i64,
    /// Mean quoted price, in cents.
    pub average_price_cents: Option<i64>,
}

/// Validates a city filter, returning it trimmed.
///
/// # Errors
///
/// Returns `DomainError::InvalidCity` if the city is blank.
pub fn validate_city(city: &str) -> Result<String, DomainError> {
    let city: &str = city.trim();
    if city.is_empty() {
        return Err(DomainError::InvalidCity(String::from(
            "City cannot be empty",
        )));
    }
    Ok(city.to_string())
}

/// Clamps a requested popular-services limit to `1..=MAX_POPULAR_LIMIT`.
#[must_use]
pub fn clamp_popular_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT)
}
