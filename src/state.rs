// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 The lendit-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Booking list filters.
//!
//! A listing call selects bookings through one of six filters. `Current`,
//! `Past` and `Future` are time-based and partition the timeline; `Waiting`
//! and `Rejected` are status-based and can overlap any time bucket. The six
//! are independent predicates, not a single partition: a waiting booking in
//! the future matches both `Future` and `Waiting`.
//!
//! Callers pass the filter as a string token (`"ALL"`, `"CURRENT"`, ...);
//! it is parsed once at the boundary and an unmapped token is a distinct
//! client error.

use crate::error::RentalError;
use crate::model::{Booking, BookingStatus};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Filter applied when listing bookings for a booker or an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingState {
    /// No filter.
    All,
    /// `start <= now <= end`.
    Current,
    /// `now > end`.
    Past,
    /// `now < start`.
    Future,
    /// Status is `Waiting`, regardless of time.
    Waiting,
    /// Status is `Rejected`, regardless of time.
    Rejected,
}

impl BookingState {
    /// Whether `booking` falls into this bucket relative to `now`.
    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => booking.is_current(now),
            BookingState::Past => booking.is_past(now),
            BookingState::Future => booking.is_future(now),
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

impl FromStr for BookingState {
    type Err = RentalError;

    /// Parses the wire token. Tokens are uppercase; anything else is an
    /// [`RentalError::UnknownState`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            other => Err(RentalError::UnknownState(other.to_string())),
        }
    }
}
