// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A stored or supplied enumeration value is not recognized.
    InvalidEnumValue {
        /// The kind of value being parsed (e.g. "test status").
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Test key is empty, too long, or contains forbidden characters.
    InvalidTestKey(String),
    /// Test name is empty.
    InvalidTestName(String),
    /// The variant list is too short, has blanks, or has duplicates.
    InvalidVariants(String),
    /// A test with this key already exists.
    DuplicateTestKey(String),
    /// No test exists with this identifier.
    TestNotFound(i64),
    /// The test key is unknown or the test has ended.
    TestNotAvailable(String),
    /// The subject has never been assigned a variant for this test.
    NoAssignment {
        /// The test key.
        test_key: String,
        /// The subject key that has no assignment.
        subject: String,
    },
    /// Neither a user id nor a session id was supplied.
    MissingSubject,
    /// Conversion type is empty.
    InvalidConversionType(String),
    /// An achievement field failed validation.
    InvalidAchievement {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
    /// An achievement with this code already exists.
    DuplicateAchievementCode(String),
    /// Review rating outside 1..=5.
    InvalidRating(i32),
    /// City filter is missing or blank.
    InvalidCity(String),
    /// No category exists with this slug.
    CategoryNotFound(String),
    /// A contact form field failed validation.
    InvalidContactField {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
    /// A testimonial field failed validation.
    InvalidTestimonialField {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
    /// No testimonial exists with this identifier.
    TestimonialNotFound(i64),
    /// The testimonial is no longer pending moderation.
    TestimonialAlreadyModerated {
        /// The testimonial id.
        testimonial_id: i64,
        /// Its current status.
        status: String,
    },
    /// Photo content type is not an accepted image type.
    InvalidPhotoContentType(String),
    /// Photo exceeds the size limit.
    PhotoTooLarge {
        /// The submitted size.
        size_bytes: i64,
        /// The maximum accepted size.
        max_bytes: i64,
    },
    /// Photo path is empty.
    InvalidPhotoPath(String),
    /// The review already carries the maximum number of photos.
    PhotoLimitReached {
        /// The review id.
        review_id: i64,
        /// The per-review limit.
        max_photos: i64,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnumValue { kind, value } => write!(f, "Invalid {kind}: '{value}'"),
            Self::InvalidTestKey(msg) => write!(f, "Invalid test key: {msg}"),
            Self::InvalidTestName(msg) => write!(f, "Invalid test name: {msg}"),
            Self::InvalidVariants(msg) => write!(f, "Invalid variants: {msg}"),
            Self::DuplicateTestKey(key) => write!(f, "A test with key '{key}' already exists"),
            Self::TestNotFound(id) => write!(f, "Test {id} not found"),
            Self::TestNotAvailable(key) => {
                write!(f, "Test '{key}' does not exist or is no longer running")
            }
            Self::NoAssignment { test_key, subject } => {
                write!(
                    f,
                    "Subject '{subject}' has not been assigned a variant for test '{test_key}'"
                )
            }
            Self::MissingSubject => write!(f, "A session id is required for anonymous subjects"),
            Self::InvalidConversionType(msg) => write!(f, "Invalid conversion type: {msg}"),
            Self::InvalidAchievement { field, reason } => {
                write!(f, "Invalid achievement {field}: {reason}")
            }
            Self::DuplicateAchievementCode(code) => {
                write!(f, "An achievement with code '{code}' already exists")
            }
            Self::InvalidRating(rating) => {
                write!(f, "Invalid rating: {rating}. Must be between 1 and 5")
            }
            Self::InvalidCity(msg) => write!(f, "Invalid city: {msg}"),
            Self::CategoryNotFound(slug) => write!(f, "Category '{slug}' not found"),
            Self::InvalidContactField { field, reason } => {
                write!(f, "Invalid contact {field}: {reason}")
            }
            Self::InvalidTestimonialField { field, reason } => {
                write!(f, "Invalid testimonial {field}: {reason}")
            }
            Self::TestimonialNotFound(id) => write!(f, "Testimonial {id} not found"),
            Self::TestimonialAlreadyModerated {
                testimonial_id,
                status,
            } => {
                write!(
                    f,
                    "Testimonial {testimonial_id} has already been moderated (status: {status})"
                )
            }
            Self::InvalidPhotoContentType(content_type) => {
                write!(f, "Unsupported photo content type: {content_type}")
            }
            Self::PhotoTooLarge {
                size_bytes,
                max_bytes,
            } => {
                write!(
                    f,
                    "Photo is {size_bytes} bytes; the maximum is {max_bytes} bytes"
                )
            }
            Self::InvalidPhotoPath(msg) => write!(f, "Invalid photo path: {msg}"),
            Self::PhotoLimitReached {
                review_id,
                max_photos,
            } => {
                write!(
                    f,
                    "Review {review_id} already has the maximum of {max_photos} photos"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
