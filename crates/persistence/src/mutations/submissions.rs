// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contact, testimonial, review photo, credit and subscription writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use presta_domain::{
    NewContactMessage, NewReviewPhoto, NewTestimonial, ReviewPhoto, SubscriptionPlan,
    SubscriptionStatus, Testimonial, TestimonialStatus,
};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{
    contact_messages, review_photos, subscriptions, testimonials, user_credits,
};
use crate::error::PersistenceError;
use crate::queries::submissions::get_testimonial;

/// Status given to stored contact messages.
pub const CONTACT_STATUS_RECEIVED: &str = "received";

/// Stores a contact message and returns its id.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn insert_contact_message(
    conn: &mut SqliteConnection,
    message: &NewContactMessage,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(contact_messages::table)
        .values((
            contact_messages::name.eq(&message.name),
            contact_messages::email.eq(&message.email),
            contact_messages::subject.eq(&message.subject),
            contact_messages::message.eq(&message.message),
            contact_messages::status.eq(CONTACT_STATUS_RECEIVED),
            contact_messages::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let message_id: i64 = conn.get_last_insert_rowid()?;
    info!(message_id, "Contact message stored");
    Ok(message_id)
}

/// Stores a pending testimonial.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn insert_testimonial(
    conn: &mut SqliteConnection,
    testimonial: &NewTestimonial,
    created_at: &str,
) -> Result<Testimonial, PersistenceError> {
    diesel::insert_into(testimonials::table)
        .values((
            testimonials::user_id.eq(testimonial.user_id),
            testimonials::author_name.eq(&testimonial.author_name),
            testimonials::video_url.eq(&testimonial.video_url),
            testimonials::caption.eq(testimonial.caption.as_deref()),
            testimonials::status.eq(TestimonialStatus::Pending.as_str()),
            testimonials::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let testimonial_id: i64 = conn.get_last_insert_rowid()?;
    info!(testimonial_id, user_id = testimonial.user_id, "Testimonial submitted");

    get_testimonial(conn, testimonial_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Testimonial {testimonial_id}")))
}

/// Moves a pending testimonial to `status`.
///
/// Returns the number of rows changed; zero means the testimonial was not
/// pending any more.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_testimonial_status(
    conn: &mut SqliteConnection,
    testimonial_id: i64,
    status: TestimonialStatus,
    moderated_at: &str,
) -> Result<usize, PersistenceError> {
    let updated: usize = diesel::update(testimonials::table)
        .filter(testimonials::testimonial_id.eq(testimonial_id))
        .filter(testimonials::status.eq(TestimonialStatus::Pending.as_str()))
        .set((
            testimonials::status.eq(status.as_str()),
            testimonials::moderated_at.eq(Some(moderated_at)),
        ))
        .execute(conn)?;

    info!(testimonial_id, status = status.as_str(), updated, "Testimonial moderated");
    Ok(updated)
}

/// Registers an uploaded review photo.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn insert_review_photo(
    conn: &mut SqliteConnection,
    photo: &NewReviewPhoto,
    created_at: &str,
) -> Result<ReviewPhoto, PersistenceError> {
    diesel::insert_into(review_photos::table)
        .values((
            review_photos::review_id.eq(photo.review_id),
            review_photos::user_id.eq(photo.user_id),
            review_photos::storage_path.eq(&photo.storage_path),
            review_photos::content_type.eq(&photo.content_type),
            review_photos::size_bytes.eq(photo.size_bytes),
            review_photos::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let photo_id: i64 = conn.get_last_insert_rowid()?;
    info!(photo_id, review_id = photo.review_id, "Review photo registered");

    Ok(ReviewPhoto {
        photo_id,
        review_id: photo.review_id,
        user_id: photo.user_id,
        storage_path: photo.storage_path.clone(),
        content_type: photo.content_type.clone(),
        size_bytes: photo.size_bytes,
        created_at: created_at.to_string(),
    })
}

/// Sets a user's credit balance.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn set_credit_balance(
    conn: &mut SqliteConnection,
    user_id: i64,
    balance: i64,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    diesel::insert_into(user_credits::table)
        .values((
            user_credits::user_id.eq(user_id),
            user_credits::balance.eq(balance),
            user_credits::updated_at.eq(updated_at),
        ))
        .on_conflict(user_credits::user_id)
        .do_update()
        .set((
            user_credits::balance.eq(excluded(user_credits::balance)),
            user_credits::updated_at.eq(excluded(user_credits::updated_at)),
        ))
        .execute(conn)?;

    info!(user_id, balance, "Credit balance set");
    Ok(())
}

/// Records a subscription for a user.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn insert_subscription(
    conn: &mut SqliteConnection,
    user_id: i64,
    plan: SubscriptionPlan,
    status: SubscriptionStatus,
    started_at: &str,
    expires_at: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(subscriptions::table)
        .values((
            subscriptions::user_id.eq(user_id),
            subscriptions::plan.eq(plan.as_str()),
            subscriptions::status.eq(status.as_str()),
            subscriptions::started_at.eq(started_at),
            subscriptions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let subscription_id: i64 = conn.get_last_insert_rowid()?;
    info!(subscription_id, user_id, plan = plan.as_str(), "Subscription recorded");
    Ok(subscription_id)
}
