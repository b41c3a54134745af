// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! - `accounts`: Accounts and sessions
//! - `ab_tests`: Tests, assignments, conversions
//! - `gamification`: Stats, experience, awards
//! - `submissions`: Contact, testimonials, photos, credits, subscriptions

pub mod accounts;
pub mod gamification;
pub mod submissions;
