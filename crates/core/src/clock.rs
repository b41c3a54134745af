// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Returns the current UTC time as an RFC 3339 string with whole seconds.
///
/// Fixed precision keeps stored timestamps ordered when compared as text.
///
/// # Errors
///
/// Returns `CoreError::Internal` if the timestamp cannot be formatted.
pub fn now_timestamp() -> Result<String, CoreError> {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| CoreError::Internal(format!("Failed to truncate timestamp: {e}")))?
        .format(&Rfc3339)
        .map_err(|e| CoreError::Internal(format!("Failed to format timestamp: {e}")))
}
