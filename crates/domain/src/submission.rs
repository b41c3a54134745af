// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User submissions: contact messages, video testimonials, review photos.
//!
//! Each submission is validated here before it reaches persistence.
//! Delivery of contact mail and storage of photo bytes happen elsewhere.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum length of a contact message body, in characters.
pub const MAX_CONTACT_MESSAGE_LENGTH: usize = 5000;

/// Maximum accepted photo size (5 MiB).
pub const MAX_PHOTO_SIZE_BYTES: i64 = 5 * 1024 * 1024;

/// Maximum number of photos attached to a single review.
pub const MAX_PHOTOS_PER_REVIEW: i64 = 5;

/// Accepted photo content types.
pub const ALLOWED_PHOTO_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
}

fn required_contact_field(field: &'static str, value: &str) -> Result<String, DomainError> {
    let value: &str = value.trim();
    if value.is_empty() {
        return Err(DomainError::InvalidContactField {
            field,
            reason: String::from("is required"),
        });
    }
    Ok(value.to_string())
}

/// Performs a structural email check: one `@`, non-empty local part, and a
/// dotted domain with no empty labels.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

impl NewContactMessage {
    /// Validates a contact submission.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidContactField` naming the first invalid field.
    pub fn new(
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<Self, DomainError> {
        let name: String = required_contact_field("name", name)?;
        let email: String = required_contact_field("email", email)?;
        if !is_plausible_email(&email) {
            return Err(DomainError::InvalidContactField {
                field: "email",
                reason: format!("'{email}' is not a valid email address"),
            });
        }
        let subject: String = required_contact_field("subject", subject)?;
        let message: String = required_contact_field("message", message)?;
        if message.chars().count() > MAX_CONTACT_MESSAGE_LENGTH {
            return Err(DomainError::InvalidContactField {
                field: "message",
                reason: format!("cannot exceed {MAX_CONTACT_MESSAGE_LENGTH} characters"),
            });
        }

        Ok(Self {
            name,
            email,
            subject,
            message,
        })
    }
}

/// Moderation state of a testimonial.
///
/// `Pending` → `Approved` | `Rejected`; both outcomes are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestimonialStatus {
    /// Awaiting review.
    Pending,
    /// Publicly listed.
    Approved,
    /// Hidden.
    Rejected,
}

impl TestimonialStatus {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Applies a moderation decision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TestimonialAlreadyModerated` unless the
    /// testimonial is pending.
    pub fn moderate(
        self,
        testimonial_id: i64,
        decision: ModerationDecision,
    ) -> Result<Self, DomainError> {
        if self != Self::Pending {
            return Err(DomainError::TestimonialAlreadyModerated {
                testimonial_id,
                status: self.as_str().to_string(),
            });
        }
        Ok(match decision {
            ModerationDecision::Approve => Self::Approved,
            ModerationDecision::Reject => Self::Rejected,
        })
    }
}

impl FromStr for TestimonialStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "testimonial status",
                value: s.to_string(),
            }),
        }
    }
}

/// An administrator's moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationDecision {
    /// Publish the testimonial.
    Approve,
    /// Hide the testimonial.
    Reject,
}

/// A persisted testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    /// Database identifier.
    pub testimonial_id: i64,
    /// Submitting user.
    pub user_id: i64,
    /// Name shown with the video.
    pub author_name: String,
    /// HTTPS URL of the video.
    pub video_url: String,
    /// Optional caption.
    pub caption: Option<String>,
    /// Moderation status.
    pub status: TestimonialStatus,
    /// RFC 3339 submission timestamp.
    pub created_at: String,
    /// RFC 3339 moderation timestamp.
    pub moderated_at: Option<String>,
}

/// A validated testimonial submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    /// Submitting user.
    pub user_id: i64,
    /// Name shown with the video.
    pub author_name: String,
    /// HTTPS URL of the video.
    pub video_url: String,
    /// Optional caption.
    pub caption: Option<String>,
}

impl NewTestimonial {
    /// Validates a testimonial submission.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTestimonialField` if the author name is
    /// blank or the video URL is not an `https://` URL.
    pub fn new(
        user_id: i64,
        author_name: &str,
        video_url: &str,
        caption: Option<String>,
    ) -> Result<Self, DomainError> {
        let author_name: &str = author_name.trim();
        if author_name.is_empty() {
            return Err(DomainError::InvalidTestimonialField {
                field: "author_name",
                reason: String::from("is required"),
            });
        }
        let video_url: &str = video_url.trim();
        if video_url.len() <= "https://".len() || !video_url.starts_with("https://") {
            return Err(DomainError::InvalidTestimonialField {
                field: "video_url",
                reason: String::from("must be an https:// URL"),
            });
        }

        Ok(Self {
            user_id,
            author_name: author_name.to_string(),
            video_url: video_url.to_string(),
            caption: caption
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// A persisted review photo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPhoto {
    /// Database identifier.
    pub photo_id: i64,
    /// The review the photo belongs to.
    pub review_id: i64,
    /// Uploading user.
    pub user_id: i64,
    /// Location in blob storage.
    pub storage_path: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// RFC 3339 upload timestamp.
    pub created_at: String,
}

/// A validated review photo registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewPhoto {
    /// The review the photo belongs to.
    pub review_id: i64,
    /// Uploading user.
    pub user_id: i64,
    /// Location in blob storage.
    pub storage_path: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
}

impl NewReviewPhoto {
    /// Validates a photo registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is blank, the content type is not an
    /// accepted image type, or the size is zero or above
    /// [`MAX_PHOTO_SIZE_BYTES`].
    pub fn new(
        review_id: i64,
        user_id: i64,
        storage_path: &str,
        content_type: &str,
        size_bytes: i64,
    ) -> Result<Self, DomainError> {
        let storage_path: &str = storage_path.trim();
        if storage_path.is_empty() {
            return Err(DomainError::InvalidPhotoPath(String::from(
                "Storage path cannot be empty",
            )));
        }
        let content_type: String = content_type.trim().to_ascii_lowercase();
        if !ALLOWED_PHOTO_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(DomainError::InvalidPhotoContentType(content_type));
        }
        if size_bytes <= 0 || size_bytes > MAX_PHOTO_SIZE_BYTES {
            return Err(DomainError::PhotoTooLarge {
                size_bytes,
                max_bytes: MAX_PHOTO_SIZE_BYTES,
            });
        }

        Ok(Self {
            review_id,
            user_id,
            storage_path: storage_path.to_string(),
            content_type,
            size_bytes,
        })
    }
}

/// Checks that a review can take one more photo.
///
/// # Errors
///
/// Returns `DomainError::PhotoLimitReached` when `existing_count` is already
/// at [`MAX_PHOTOS_PER_REVIEW`].
pub const fn validate_photo_capacity(review_id: i64, existing_count: i64) -> Result<(), DomainError> {
    if existing_count >= MAX_PHOTOS_PER_REVIEW {
        return Err(DomainError::PhotoLimitReached {
            review_id,
            max_photos: MAX_PHOTOS_PER_REVIEW,
        });
    }
    Ok(())
}
