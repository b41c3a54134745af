// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Testimonial, review photo, and contact message queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presta_domain::{ReviewPhoto, Testimonial, TestimonialStatus};
use std::str::FromStr;

use crate::diesel_schema::{contact_messages, review_photos, testimonials};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = testimonials)]
struct TestimonialRow {
    testimonial_id: i64,
    user_id: i64,
    author_name: String,
    video_url: String,
    caption: Option<String>,
    status: String,
    created_at: String,
    moderated_at: Option<String>,
}

impl TestimonialRow {
    fn into_testimonial(self) -> Result<Testimonial, PersistenceError> {
        Ok(Testimonial {
            status: TestimonialStatus::from_str(&self.status)?,
            testimonial_id: self.testimonial_id,
            user_id: self.user_id,
            author_name: self.author_name,
            video_url: self.video_url,
            caption: self.caption,
            created_at: self.created_at,
            moderated_at: self.moderated_at,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = review_photos)]
struct ReviewPhotoRow {
    photo_id: i64,
    review_id: i64,
    user_id: i64,
    storage_path: String,
    content_type: String,
    size_bytes: i64,
    created_at: String,
}

/// Retrieves a testimonial by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn get_testimonial(
    conn: &mut SqliteConnection,
    testimonial_id: i64,
) -> Result<Option<Testimonial>, PersistenceError> {
    testimonials::table
        .filter(testimonials::testimonial_id.eq(testimonial_id))
        .select(TestimonialRow::as_select())
        .first::<TestimonialRow>(conn)
        .optional()?
        .map(TestimonialRow::into_testimonial)
        .transpose()
}

/// Lists testimonials with the given status, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_testimonials_by_status(
    conn: &mut SqliteConnection,
    status: TestimonialStatus,
) -> Result<Vec<Testimonial>, PersistenceError> {
    testimonials::table
        .filter(testimonials::status.eq(status.as_str()))
        .order((
            testimonials::created_at.desc(),
            testimonials::testimonial_id.desc(),
        ))
        .select(TestimonialRow::as_select())
        .load::<TestimonialRow>(conn)?
        .into_iter()
        .map(TestimonialRow::into_testimonial)
        .collect()
}

/// Counts the photos attached to a review.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_review_photos(
    conn: &mut SqliteConnection,
    review_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(review_photos::table
        .filter(review_photos::review_id.eq(review_id))
        .count()
        .get_result(conn)?)
}

/// Lists the photos attached to a review ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_review_photos(
    conn: &mut SqliteConnection,
    review_id: i64,
) -> Result<Vec<ReviewPhoto>, PersistenceError> {
    let rows: Vec<ReviewPhotoRow> = review_photos::table
        .filter(review_photos::review_id.eq(review_id))
        .order(review_photos::photo_id.asc())
        .select(ReviewPhotoRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| ReviewPhoto {
            photo_id: row.photo_id,
            review_id: row.review_id,
            user_id: row.user_id,
            storage_path: row.storage_path,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            created_at: row.created_at,
        })
        .collect())
}

/// Counts stored contact messages.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_contact_messages(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(contact_messages::table.count().get_result(conn)?)
}
