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

//! Persisted entities.
//!
//! These are the storage-side types. They are deliberately separate from the
//! response views in [`crate::view`]; the engine maps between the two so a
//! caller can never mutate persisted state through a returned value.
//!
//! Bookings follow a state machine:
//! - [`Waiting`] → [`Approved`] (owner approves)
//! - [`Waiting`] → [`Rejected`] (owner rejects)
//!
//! Both `Approved` and `Rejected` are terminal.
//!
//! [`Waiting`]: BookingStatus::Waiting
//! [`Approved`]: BookingStatus::Approved
//! [`Rejected`]: BookingStatus::Rejected

use crate::base::{BookingId, CommentId, ItemId, RequestId, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

/// A registered user. Owns items, books other users' items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A rentable item.
///
/// `available` gates bookability: an unavailable item rejects new bookings
/// but keeps its existing ones. `request` links back to the item request
/// this item was listed in answer to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner: UserId,
    pub request: Option<RequestId>,
}

/// Status of a booking. Created as `Waiting`; the item owner moves it to
/// `Approved` or `Rejected`, after which no further transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// A time-bounded booking of an item by a user.
///
/// Invariant: `start < end` strictly. Enforced at creation; no mutation path
/// changes the interval afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: ItemId,
    pub booker: UserId,
    pub status: BookingStatus,
}

impl Booking {
    /// `now` falls inside the interval, inclusive of both endpoints.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// The interval ended strictly before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        now > self.end
    }

    /// The interval starts strictly after `now`.
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        now < self.start
    }

    /// A completed rental: the interval ended strictly before `now`.
    /// This is the comment-eligibility precondition, status-independent.
    pub fn is_completed(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }
}

/// A comment left on an item by a renter after a completed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub item: ItemId,
    pub author: UserId,
    pub created: DateTime<Utc>,
}

/// A request for an item nobody has listed yet. Items may link back to the
/// request they answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    pub id: RequestId,
    pub description: String,
    pub requester: UserId,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(start_offset_h: i64, end_offset_h: i64, now: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId(1),
            start: now + Duration::hours(start_offset_h),
            end: now + Duration::hours(end_offset_h),
            item: ItemId(1),
            booker: UserId(1),
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn current_past_future_are_mutually_exclusive() {
        let now = Utc::now();
        for (s, e) in [(-3, -1), (-1, 1), (1, 3)] {
            let b = booking(s, e, now);
            let flags =
                [b.is_current(now), b.is_past(now), b.is_future(now)].iter().filter(|f| **f).count();
            assert_eq!(flags, 1, "exactly one time bucket must match");
        }
    }

    #[test]
    fn interval_endpoints_count_as_current() {
        let now = Utc::now();
        let at_start = booking(0, 2, now);
        assert!(at_start.is_current(now));
        let at_end = booking(-2, 0, now);
        assert!(at_end.is_current(now));
        assert!(!at_end.is_past(now));
        assert!(!at_end.is_completed(now));
    }

    #[test]
    fn completed_means_ended_strictly_before_now() {
        let now = Utc::now();
        assert!(booking(-3, -1, now).is_completed(now));
        assert!(!booking(-1, 1, now).is_completed(now));
    }

    #[test]
    fn status_display_matches_wire_tokens() {
        assert_eq!(BookingStatus::Waiting.to_string(), "WAITING");
        assert_eq!(BookingStatus::Approved.to_string(), "APPROVED");
        assert_eq!(BookingStatus::Rejected.to_string(), "REJECTED");
    }
}
