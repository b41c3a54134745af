// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `accounts`: Accounts and sessions
//! - `ab_tests`: Tests, assignments, result aggregation
//! - `gamification`: Stats, achievement definitions, awards
//! - `catalog`: Categories, districts, popular services
//! - `credits`: Credit balances and subscriptions
//! - `submissions`: Testimonials, review photos, contact messages

pub mod accounts;
pub mod catalog;
pub mod credits;
pub mod gamification;
pub mod submissions;
