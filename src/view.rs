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

//! Response views.
//!
//! Views are what the engine returns to callers: plain serializable
//! snapshots assembled from the persisted entities at read time. They never
//! alias stored state, so mutating a returned view cannot leak back into the
//! store.

use crate::base::{BookingId, CommentId, ItemId, RequestId, UserId};
use crate::model::{Booking, BookingStatus, Comment, Item, ItemRequest, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(value: User) -> Self {
        let User { id, name, email } = value;
        Self { id, name, email }
    }
}

/// Item summary carried inside a [`BookingView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
}

impl From<Item> for ItemSummary {
    fn from(value: Item) -> Self {
        let Item {
            id,
            name,
            description,
            available,
            ..
        } = value;
        Self {
            id,
            name,
            description,
            available,
        }
    }
}

/// Booker summary carried inside a [`BookingView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookerSummary {
    pub id: UserId,
    pub name: String,
}

/// A booking as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatusView,
    pub item: ItemSummary,
    pub booker: BookerSummary,
}

impl BookingView {
    pub(crate) fn assemble(booking: Booking, item: Item, booker: User) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status.into(),
            item: item.into(),
            booker: BookerSummary {
                id: booker.id,
                name: booker.name,
            },
        }
    }
}

/// Wire form of a booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatusView {
    Waiting,
    Approved,
    Rejected,
}

impl From<BookingStatus> for BookingStatusView {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Waiting => Self::Waiting,
            BookingStatus::Approved => Self::Approved,
            BookingStatus::Rejected => Self::Rejected,
        }
    }
}

/// Compact booking reference on an [`ItemView`]: the owner's scheduling
/// context, without the nested summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSlot {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatusView,
    pub booker_id: UserId,
}

impl From<Booking> for BookingSlot {
    fn from(value: Booking) -> Self {
        let Booking {
            id,
            start,
            end,
            status,
            booker,
            ..
        } = value;
        Self {
            id,
            start,
            end,
            status: status.into(),
            booker_id: booker,
        }
    }
}

/// A comment with its author's display name denormalized at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

impl CommentView {
    pub(crate) fn assemble(comment: Comment, author_name: String) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author_name,
            created: comment.created,
        }
    }
}

/// Owner summary carried inside an [`ItemView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: UserId,
    pub name: String,
}

/// An item enriched with scheduling context and comments.
///
/// `last_booking` and `next_booking` are only present when the viewer owns
/// the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<RequestId>,
    pub owner: OwnerSummary,
    pub last_booking: Option<BookingSlot>,
    pub next_booking: Option<BookingSlot>,
    pub comments: Vec<CommentView>,
}

/// An item request with the items listed in answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: RequestId,
    pub description: String,
    pub created: DateTime<Utc>,
    pub items: Vec<ItemSummary>,
}

impl RequestView {
    pub(crate) fn assemble(request: ItemRequest, items: Vec<Item>) -> Self {
        Self {
            id: request.id,
            description: request.description,
            created: request.created,
            items: items.into_iter().map(ItemSummary::from).collect(),
        }
    }
}
