// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog lookups: categories, districts, popular services.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presta_domain::{Category, District, PopularService};
use tracing::debug;

use crate::diesel_schema::{categories, districts, popular_services};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = categories)]
struct CategoryRow {
    category_id: i64,
    slug: String,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    parent_id: Option<i64>,
    position: i32,
    is_active: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            category_id: row.category_id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            icon: row.icon,
            parent_id: row.parent_id,
            position: row.position,
            is_active: row.is_active != 0,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = districts)]
struct DistrictRow {
    district_id: i64,
    city: String,
    name: String,
    slug: String,
    postal_code: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = popular_services)]
struct PopularServiceRow {
    service_id: i64,
    category_id: i64,
    name: String,
    slug: String,
    request_count: i64,
    average_price_cents: Option<i64>,
}

/// Lists top-level categories ordered by position, then name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_categories(
    conn: &mut SqliteConnection,
    include_inactive: bool,
) -> Result<Vec<Category>, PersistenceError> {
    let mut query = categories::table
        .filter(categories::parent_id.is_null())
        .order((categories::position.asc(), categories::name.asc()))
        .select(CategoryRow::as_select())
        .into_boxed();
    if !include_inactive {
        query = query.filter(categories::is_active.eq(1));
    }

    let rows: Vec<CategoryRow> = query.load(conn)?;
    Ok(rows.into_iter().map(Category::from).collect())
}

/// Retrieves a category by slug.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_category_by_slug(
    conn: &mut SqliteConnection,
    slug: &str,
) -> Result<Option<Category>, PersistenceError> {
    debug!(slug, "Looking up category");

    let row: Option<CategoryRow> = categories::table
        .filter(categories::slug.eq(slug))
        .select(CategoryRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Category::from))
}

/// Lists the active children of a category ordered by position, then name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_child_categories(
    conn: &mut SqliteConnection,
    parent_id: i64,
) -> Result<Vec<Category>, PersistenceError> {
    let rows: Vec<CategoryRow> = categories::table
        .filter(categories::parent_id.eq(parent_id))
        .filter(categories::is_active.eq(1))
        .order((categories::position.asc(), categories::name.asc()))
        .select(CategoryRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Category::from).collect())
}

/// Lists the districts of a city, ignoring case, ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_districts(
    conn: &mut SqliteConnection,
    city: &str,
) -> Result<Vec<District>, PersistenceError> {
    debug!(city, "Listing districts");

    let rows: Vec<DistrictRow> = districts::table
        .filter(districts::city.eq(city))
        .order(districts::name.asc())
        .select(DistrictRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| District {
            district_id: row.district_id,
            city: row.city,
            name: row.name,
            slug: row.slug,
            postal_code: row.postal_code,
        })
        .collect())
}

/// Lists the most requested services, optionally within one category.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_popular_services(
    conn: &mut SqliteConnection,
    limit: i64,
    category_id: Option<i64>,
) -> Result<Vec<PopularService>, PersistenceError> {
    let mut query = popular_services::table
        .order((
            popular_services::request_count.desc(),
            popular_services::name.asc(),
        ))
        .select(PopularServiceRow::as_select())
        .limit(limit)
        .into_boxed();
    if let Some(category_id) = category_id {
        query = query.filter(popular_services::category_id.eq(category_id));
    }

    let rows: Vec<PopularServiceRow> = query.load(conn)?;
    Ok(rows
        .into_iter()
        .map(|row| PopularService {
            service_id: row.service_id,
            category_id: row.category_id,
            name: row.name,
            slug: row.slug,
            request_count: row.request_count,
            average_price_cents: row.average_price_cents,
        })
        .collect())
}
