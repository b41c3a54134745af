// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The A/B test engine.
//!
//! Every function is stateless and takes the store it operates on. A
//! subject keeps the first variant it was given for the lifetime of the
//! test; an anonymous session's variant follows the user once they log in.

use crate::clock::now_timestamp;
use crate::error::CoreError;
use crate::store::{AbTestStore, InsertOutcome};
use num_traits::ToPrimitive;
use presta_domain::{
    AbTest, Assignment, DomainError, NewAbTest, NewConversion, SubjectIdentity, TestStatus,
    select_variant, validate_conversion_type,
};
use std::collections::BTreeMap;

/// Summary row returned by [`get_all_tests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    /// Database identifier.
    pub test_id: i64,
    /// Unique key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: TestStatus,
    /// Number of declared variants.
    pub variant_count: usize,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 end timestamp.
    pub ended_at: Option<String>,
}

/// Aggregated outcome for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantResult {
    /// Variant label.
    pub variant: String,
    /// Number of subjects assigned to the variant.
    pub assignments: i64,
    /// Conversion counts keyed by conversion type.
    pub conversions: BTreeMap<String, i64>,
    /// Sum of all conversion counts.
    pub total_conversions: i64,
    /// `total_conversions / assignments`, `0.0` without assignments.
    pub conversion_rate: f64,
}

/// Results for a whole test, variants in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResults {
    /// The test.
    pub test: AbTest,
    /// One entry per declared variant.
    pub variants: Vec<VariantResult>,
}

/// Builds the subject list for a request, user first.
fn subjects(
    user_id: Option<i64>,
    session_id: Option<&str>,
) -> (Option<SubjectIdentity>, Option<SubjectIdentity>) {
    let user: Option<SubjectIdentity> = user_id.map(SubjectIdentity::User);
    let session: Option<SubjectIdentity> = session_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| SubjectIdentity::Session(s.to_string()));
    (user, session)
}

/// Loads a test by key and checks that it is running.
fn running_test<S: AbTestStore + ?Sized>(store: &mut S, test_key: &str) -> Result<AbTest, CoreError> {
    match store.find_test_by_key(test_key)? {
        Some(test) if test.status.is_running() => Ok(test),
        _ => Err(DomainError::TestNotAvailable(test_key.to_string()).into()),
    }
}

/// Returns the variant for a subject, assigning one on first contact.
///
/// When both identities are supplied the user's own assignment wins, then
/// the session's, which is copied to the user so it survives the session.
/// With no prior assignment the variant is selected deterministically from
/// the user identity if present, otherwise the session.
///
/// # Arguments
///
/// * `store` - The store to read and write assignments
/// * `test_key` - Key of a running test
/// * `user_id` - The authenticated user, if any
/// * `session_id` - The anonymous session token, if any
///
/// # Errors
///
/// Returns `TestNotAvailable` if the test is unknown or ended,
/// `MissingSubject` if neither identity is supplied, or a store error.
pub fn get_variant<S: AbTestStore + ?Sized>(
    store: &mut S,
    test_key: &str,
    user_id: Option<i64>,
    session_id: Option<&str>,
) -> Result<String, CoreError> {
    let test: AbTest = running_test(store, test_key)?;
    let (user, session) = subjects(user_id, session_id);

    let Some(primary) = user.as_ref().or(session.as_ref()) else {
        return Err(DomainError::MissingSubject.into());
    };

    let user_assignment: Option<Assignment> = match &user {
        Some(user) => store.find_assignment(test.test_id, &user.subject_key())?,
        None => None,
    };
    if let Some(existing) = user_assignment {
        return Ok(existing.variant);
    }

    let session_assignment: Option<Assignment> = match &session {
        Some(session) => store.find_assignment(test.test_id, &session.subject_key())?,
        None => None,
    };
    if let Some(existing) = session_assignment {
        let Some(user) = &user else {
            return Ok(existing.variant);
        };
        let adopted: Assignment = Assignment {
            test_id: test.test_id,
            subject_key: user.subject_key(),
            variant: existing.variant,
            assigned_at: now_timestamp()?,
            adopted_from: Some(existing.subject_key),
        };
        return Ok(store.insert_assignment_if_absent(&adopted)?.into_inner().variant);
    }

    let variant: &str = select_variant(&test.key, primary, &test.variants);
    let assignment: Assignment = Assignment {
        test_id: test.test_id,
        subject_key: primary.subject_key(),
        variant: variant.to_string(),
        assigned_at: now_timestamp()?,
        adopted_from: None,
    };

    Ok(store
        .insert_assignment_if_absent(&assignment)?
        .into_inner()
        .variant)
}

/// Records a conversion against the subject's existing assignment.
///
/// # Errors
///
/// Returns `TestNotAvailable` if the test is unknown or ended,
/// `InvalidConversionType` for a blank type, `MissingSubject` if neither
/// identity is supplied, or `NoAssignment` if the subject was never
/// assigned a variant.
pub fn track_conversion<S: AbTestStore + ?Sized>(
    store: &mut S,
    test_key: &str,
    user_id: Option<i64>,
    session_id: Option<&str>,
    conversion_type: &str,
    conversion_data: Option<String>,
) -> Result<i64, CoreError> {
    let test: AbTest = running_test(store, test_key)?;
    let conversion_type: String = validate_conversion_type(conversion_type)?;
    let (user, session) = subjects(user_id, session_id);

    if user.is_none() && session.is_none() {
        return Err(DomainError::MissingSubject.into());
    }

    let mut assignment: Option<Assignment> = None;
    for subject in [&user, &session].into_iter().flatten() {
        assignment = store.find_assignment(test.test_id, &subject.subject_key())?;
        if assignment.is_some() {
            break;
        }
    }

    let Some(assignment) = assignment else {
        let subject: String = user
            .as_ref()
            .or(session.as_ref())
            .map(SubjectIdentity::subject_key)
            .unwrap_or_default();
        return Err(DomainError::NoAssignment {
            test_key: test.key,
            subject,
        }
        .into());
    };

    let conversion: NewConversion = NewConversion {
        test_id: test.test_id,
        subject_key: assignment.subject_key,
        variant: assignment.variant,
        conversion_type,
        conversion_data,
        converted_at: now_timestamp()?,
    };

    Ok(store.append_conversion(&conversion)?)
}

/// Lists every test, ordered by id.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_all_tests<S: AbTestStore + ?Sized>(store: &mut S) -> Result<Vec<TestSummary>, CoreError> {
    Ok(store
        .list_tests()?
        .into_iter()
        .map(|test| TestSummary {
            test_id: test.test_id,
            variant_count: test.variants.len(),
            key: test.key,
            name: test.name,
            status: test.status,
            started_at: test.started_at,
            ended_at: test.ended_at,
        })
        .collect())
}

/// Aggregates assignments and conversions per variant.
///
/// # Errors
///
/// Returns `TestNotFound` for an unknown id, or a store error.
pub fn get_test_results<S: AbTestStore + ?Sized>(
    store: &mut S,
    test_id: i64,
) -> Result<TestResults, CoreError> {
    let test: AbTest = store
        .find_test_by_id(test_id)?
        .ok_or(DomainError::TestNotFound(test_id))?;

    let assignment_counts: BTreeMap<String, i64> =
        store.count_assignments_by_variant(test_id)?.into_iter().collect();

    let mut conversion_counts: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for (variant, conversion_type, count) in store.count_conversions_by_variant(test_id)? {
        *conversion_counts
            .entry(variant)
            .or_default()
            .entry(conversion_type)
            .or_default() += count;
    }

    let variants: Vec<VariantResult> = test
        .variants
        .labels()
        .iter()
        .map(|label| {
            let assignments: i64 = assignment_counts.get(label).copied().unwrap_or(0);
            let conversions: BTreeMap<String, i64> =
                conversion_counts.remove(label).unwrap_or_default();
            let total_conversions: i64 = conversions.values().sum();
            let conversion_rate: f64 = if assignments > 0 {
                total_conversions.to_f64().unwrap_or(0.0) / assignments.to_f64().unwrap_or(1.0)
            } else {
                0.0
            };
            VariantResult {
                variant: label.clone(),
                assignments,
                conversions,
                total_conversions,
                conversion_rate,
            }
        })
        .collect();

    Ok(TestResults { test, variants })
}

/// Creates a running test.
///
/// # Errors
///
/// Returns `DuplicateTestKey` if the key is already used, or a store error.
pub fn create_test<S: AbTestStore + ?Sized>(
    store: &mut S,
    new_test: &NewAbTest,
) -> Result<AbTest, CoreError> {
    let key: &str = new_test.key.value();
    if store.find_test_by_key(key)?.is_some() {
        return Err(DomainError::DuplicateTestKey(key.to_string()).into());
    }

    match store.insert_test(new_test, &now_timestamp()?)? {
        InsertOutcome::Inserted(test) => Ok(test),
        InsertOutcome::Existing(_) => Err(DomainError::DuplicateTestKey(key.to_string()).into()),
    }
}

/// Ends a test. Ending an ended test returns it unchanged.
///
/// # Errors
///
/// Returns `TestNotFound` for an unknown id, or a store error.
pub fn end_test<S: AbTestStore + ?Sized>(store: &mut S, test_id: i64) -> Result<AbTest, CoreError> {
    let test: AbTest = store
        .find_test_by_id(test_id)?
        .ok_or(DomainError::TestNotFound(test_id))?;
    if !test.status.is_running() {
        return Ok(test);
    }
    Ok(store.end_test(test_id, &now_timestamp()?)?)
}
