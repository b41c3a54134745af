// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A/B test types and deterministic variant selection.
//!
//! A test owns an ordered, non-empty set of distinct variant labels. Each
//! subject (an authenticated user or an anonymous session) is mapped to one
//! label by hashing the test key together with the subject key, so repeated
//! calls land on the same variant even before anything is persisted.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::str::FromStr;

/// Maximum length of a test key.
pub const MAX_TEST_KEY_LENGTH: usize = 64;

/// Minimum number of variants a test must declare.
pub const MIN_VARIANT_COUNT: usize = 2;

/// Lifecycle of an A/B test.
///
/// `Running` → `Ended` is the only transition and it is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// The test accepts new assignments and conversions.
    Running,
    /// The test is closed.
    Ended,
}

impl TestStatus {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }

    /// Returns true while the test accepts assignments.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl FromStr for TestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "ended" => Ok(Self::Ended),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "test status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated test key.
///
/// Keys are lowercase ASCII letters, digits, `_` and `-`, at most
/// [`MAX_TEST_KEY_LENGTH`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestKey(String);

impl TestKey {
    /// Validates and wraps a test key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTestKey` if the key is empty, too long,
    /// or contains characters outside `[a-z0-9_-]`.
    pub fn new(key: &str) -> Result<Self, DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidTestKey(String::from(
                "Test key cannot be empty",
            )));
        }
        if key.len() > MAX_TEST_KEY_LENGTH {
            return Err(DomainError::InvalidTestKey(format!(
                "Test key cannot exceed {MAX_TEST_KEY_LENGTH} characters"
            )));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidTestKey(String::from(
                "Test key may only contain lowercase letters, digits, '_' and '-'",
            )));
        }
        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TestKey {
    type Error = DomainError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::new(&key)
    }
}

impl From<TestKey> for String {
    fn from(key: TestKey) -> Self {
        key.0
    }
}

/// The ordered set of variant labels declared by a test.
///
/// Order is the declaration order and is preserved everywhere results are
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct VariantSet {
    labels: Vec<String>,
}

impl VariantSet {
    /// Builds a variant set from labels in declaration order.
    ///
    /// Labels are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVariants` if fewer than
    /// [`MIN_VARIANT_COUNT`] labels are supplied, a label is blank, or a label
    /// appears twice.
    pub fn new(labels: Vec<String>) -> Result<Self, DomainError> {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.trim().to_string())
            .collect();

        if labels.len() < MIN_VARIANT_COUNT {
            return Err(DomainError::InvalidVariants(format!(
                "A test needs at least {MIN_VARIANT_COUNT} variants, got {}",
                labels.len()
            )));
        }
        if labels.iter().any(String::is_empty) {
            return Err(DomainError::InvalidVariants(String::from(
                "Variant labels cannot be empty",
            )));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(DomainError::InvalidVariants(format!(
                    "Variant '{label}' is declared more than once"
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Returns the labels in declaration order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of variants.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: a valid set holds at least two labels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl TryFrom<Vec<String>> for VariantSet {
    type Error = DomainError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<VariantSet> for Vec<String> {
    fn from(set: VariantSet) -> Self {
        set.labels
    }
}

/// The identity an assignment or conversion is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectIdentity {
    /// An authenticated user.
    User(i64),
    /// An anonymous browser session.
    Session(String),
}

impl SubjectIdentity {
    /// Returns the stable string form stored alongside assignments.
    ///
    /// The prefix keeps user ids and session tokens from ever colliding.
    #[must_use]
    pub fn subject_key(&self) -> String {
        match self {
            Self::User(user_id) => format!("user:{user_id}"),
            Self::Session(session_id) => format!("session:{session_id}"),
        }
    }
}

impl std::fmt::Display for SubjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subject_key())
    }
}

/// Picks the variant for a subject.
///
/// The first eight bytes of `SHA-256("{test_key}:{subject_key}")` are read
/// as a big-endian integer and reduced modulo the variant count. The result
/// is stable for a given subject and spreads subjects evenly.
#[must_use]
pub fn select_variant<'a>(
    test_key: &str,
    subject: &SubjectIdentity,
    variants: &'a VariantSet,
) -> &'a str {
    let mut hasher = Sha256::new();
    hasher.update(test_key.as_bytes());
    hasher.update(b":");
    hasher.update(subject.subject_key().as_bytes());
    let digest = hasher.finalize();

    let mut prefix: [u8; 8] = [0; 8];
    prefix.copy_from_slice(&digest[..8]);
    let bucket: u64 = u64::from_be_bytes(prefix);

    let count: u64 = u64::try_from(variants.len()).unwrap_or(u64::MAX);
    let index: usize = usize::try_from(bucket % count).unwrap_or(0);
    &variants.labels[index]
}

/// A persisted A/B test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbTest {
    /// Database identifier.
    pub test_id: i64,
    /// Unique key clients use to request variants.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Declared variants, in order.
    pub variants: VariantSet,
    /// Current status.
    pub status: TestStatus,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 end timestamp, set once when the test ends.
    pub ended_at: Option<String>,
}

/// A validated request to create a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAbTest {
    /// The unique key.
    pub key: TestKey,
    /// The display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Declared variants.
    pub variants: VariantSet,
}

impl NewAbTest {
    /// Validates all fields of a test creation request.
    ///
    /// # Errors
    ///
    /// Returns an error if the key, name, or variants are invalid.
    pub fn new(
        key: &str,
        name: &str,
        description: Option<String>,
        variants: Vec<String>,
    ) -> Result<Self, DomainError> {
        let key: TestKey = TestKey::new(key)?;
        let name: String = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidTestName(String::from(
                "Test name cannot be empty",
            )));
        }
        let variants: VariantSet = VariantSet::new(variants)?;
        let description: Option<String> = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            key,
            name,
            description,
            variants,
        })
    }
}

/// A subject's immutable variant assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The test this assignment belongs to.
    pub test_id: i64,
    /// The subject key (see [`SubjectIdentity::subject_key`]).
    pub subject_key: String,
    /// The assigned variant label.
    pub variant: String,
    /// RFC 3339 assignment timestamp.
    pub assigned_at: String,
    /// Session subject this assignment was copied from at login.
    ///
    /// Adopted rows carry on an existing assignment and are not counted
    /// again in results.
    pub adopted_from: Option<String>,
}

/// A conversion ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversion {
    /// The test the conversion is attributed to.
    pub test_id: i64,
    /// The converting subject.
    pub subject_key: String,
    /// The variant the subject was assigned.
    pub variant: String,
    /// Free-form conversion type (e.g. "click", "purchase").
    pub conversion_type: String,
    /// Optional JSON payload, already serialized.
    pub conversion_data: Option<String>,
    /// RFC 3339 timestamp.
    pub converted_at: String,
}

/// Validates a conversion type, returning it trimmed.
///
/// # Errors
///
/// Returns `DomainError::InvalidConversionType` if the type is blank.
pub fn validate_conversion_type(conversion_type: &str) -> Result<String, DomainError> {
    let trimmed: &str = conversion_type.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidConversionType(String::from(
            "Conversion type cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}
