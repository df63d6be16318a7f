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

//! Error types for rental operations.
//!
//! Every error represents a caller mistake or a business-rule violation,
//! never a transient failure; nothing here is retried. [`RentalError::kind`]
//! groups the variants into the four client-visible classes an outer layer
//! would map to HTTP status codes.

use crate::base::{BookingId, ItemId, RequestId, UserId};
use thiserror::Error;

/// Rental operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RentalError {
    /// Referenced user does not exist
    #[error("user {0} is not found")]
    UserNotFound(UserId),

    /// Referenced item does not exist
    #[error("item {0} is not found")]
    ItemNotFound(ItemId),

    /// Referenced booking does not exist
    #[error("booking {0} is not found")]
    BookingNotFound(BookingId),

    /// Referenced item request does not exist
    #[error("request {0} is not found")]
    RequestNotFound(RequestId),

    /// Owner attempted to book their own item
    #[error("the owner cannot book their own item")]
    OwnBooking,

    /// Viewer is neither the booker nor the item owner
    #[error("a booking can only be viewed by its booker or the item owner")]
    NotParticipant,

    /// Acting user is not the owner of the item
    #[error("only the owner of the item can do this")]
    NotOwner,

    /// Item has `available = false`
    #[error("item {0} is unavailable")]
    ItemUnavailable(ItemId),

    /// Decision attempted on a booking that is no longer waiting
    #[error("booking {0} is already decided")]
    AlreadyDecided(BookingId),

    /// Commenting without a completed booking on the item
    #[error("the user has not completed a booking of this item")]
    NotEligible,

    /// Booking interval with `start >= end`
    #[error("booking start must be strictly before its end")]
    InvalidTimeRange,

    /// Booking starting at or before the current instant
    #[error("booking start must be in the future")]
    StartNotInFuture,

    /// Comment with blank text
    #[error("comment text must not be blank")]
    EmptyComment,

    /// Pagination with `size <= 0` or `from < 0`
    #[error("invalid page: from={from}, size={size}")]
    InvalidPage { from: i64, size: i64 },

    /// Unrecognized booking-state token from a caller
    #[error("unknown state: {0}")]
    UnknownState(String),
}

/// Client-visible error class, the 4xx-equivalent an outer layer would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
}

impl RentalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RentalError::UserNotFound(_)
            | RentalError::ItemNotFound(_)
            | RentalError::BookingNotFound(_)
            | RentalError::RequestNotFound(_) => ErrorKind::NotFound,
            RentalError::OwnBooking | RentalError::NotParticipant | RentalError::NotOwner => {
                ErrorKind::Forbidden
            }
            RentalError::ItemUnavailable(_)
            | RentalError::AlreadyDecided(_)
            | RentalError::NotEligible => ErrorKind::Conflict,
            RentalError::InvalidTimeRange
            | RentalError::StartNotInFuture
            | RentalError::EmptyComment
            | RentalError::InvalidPage { .. }
            | RentalError::UnknownState(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, RentalError};
    use crate::base::{BookingId, ItemId, UserId};

    #[test]
    fn error_display_messages() {
        assert_eq!(RentalError::UserNotFound(UserId(3)).to_string(), "user 3 is not found");
        assert_eq!(RentalError::ItemNotFound(ItemId(5)).to_string(), "item 5 is not found");
        assert_eq!(
            RentalError::BookingNotFound(BookingId(9)).to_string(),
            "booking 9 is not found"
        );
        assert_eq!(
            RentalError::OwnBooking.to_string(),
            "the owner cannot book their own item"
        );
        assert_eq!(
            RentalError::ItemUnavailable(ItemId(1)).to_string(),
            "item 1 is unavailable"
        );
        assert_eq!(
            RentalError::AlreadyDecided(BookingId(2)).to_string(),
            "booking 2 is already decided"
        );
        assert_eq!(
            RentalError::NotEligible.to_string(),
            "the user has not completed a booking of this item"
        );
        assert_eq!(
            RentalError::InvalidPage { from: -1, size: 10 }.to_string(),
            "invalid page: from=-1, size=10"
        );
        assert_eq!(
            RentalError::UnknownState("SOON".into()).to_string(),
            "unknown state: SOON"
        );
    }

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(RentalError::UserNotFound(UserId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(RentalError::OwnBooking.kind(), ErrorKind::Forbidden);
        assert_eq!(RentalError::NotOwner.kind(), ErrorKind::Forbidden);
        assert_eq!(RentalError::ItemUnavailable(ItemId(1)).kind(), ErrorKind::Conflict);
        assert_eq!(RentalError::AlreadyDecided(BookingId(1)).kind(), ErrorKind::Conflict);
        assert_eq!(RentalError::InvalidTimeRange.kind(), ErrorKind::Validation);
        assert_eq!(RentalError::UnknownState("x".into()).kind(), ErrorKind::Validation);
    }

    #[test]
    fn errors_are_cloneable() {
        let error = RentalError::NotEligible;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
