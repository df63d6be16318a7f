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

//! Entity store.
//!
//! [`Store`] is the persistence seam: lookup by id plus the filtered, sorted
//! and paginated booking queries the engine needs. Ownership checks in the
//! engine go through explicit `fetch by id` calls on this trait instead of
//! navigating an object graph.
//!
//! Two mutations carry transactional semantics the engine relies on:
//!
//! - [`Store::add_booking`] re-reads the item's availability while holding
//!   the item row, so a concurrent availability flip cannot slip a booking
//!   past the check.
//! - [`Store::transition_booking`] is a compare-and-transition from
//!   `Waiting`; when two decisions race, the store commits one winner.
//!
//! [`MemoryStore`] is the in-process implementation, backed by [`DashMap`]
//! so independent entities can be touched concurrently.

use crate::base::{BookingId, CommentId, ItemId, RequestId, UserId};
use crate::error::RentalError;
use crate::model::{Booking, BookingStatus, Comment, Item, ItemRequest, User};
use crate::page::PageRequest;
use crate::state::BookingState;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fields of an item about to be persisted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner: UserId,
    pub request: Option<RequestId>,
}

/// Partial update of an item. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Fields of a booking about to be persisted. Status is always `Waiting`;
/// no create path produces a decided booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: ItemId,
    pub booker: UserId,
}

/// Fields of a comment about to be persisted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub item: ItemId,
    pub author: UserId,
    pub created: DateTime<Utc>,
}

/// Persistence collaborator for users, items, bookings, comments and
/// requests.
pub trait Store: Send + Sync {
    // --- users ---

    fn add_user(&self, name: String, email: String) -> User;
    fn user(&self, id: UserId) -> Option<User>;
    /// All users, ordered by id ascending.
    fn users(&self) -> Vec<User>;
    fn update_user(&self, id: UserId, name: Option<String>, email: Option<String>)
    -> Option<User>;
    fn remove_user(&self, id: UserId) -> bool;

    // --- items ---

    fn add_item(&self, new: NewItem) -> Item;
    fn item(&self, id: ItemId) -> Option<Item>;
    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Option<Item>;
    /// Items owned by `owner`, ordered by id ascending.
    fn items_by_owner(&self, owner: UserId, page: PageRequest) -> Vec<Item>;
    /// Available items whose name or description contains `text`,
    /// case-insensitively, ordered by id ascending.
    fn search_items(&self, text: &str, page: PageRequest) -> Vec<Item>;
    /// Items listed in answer to `request`, ordered by id ascending.
    fn items_for_request(&self, request: RequestId) -> Vec<Item>;

    // --- bookings ---

    /// Persists a booking with status `Waiting`.
    ///
    /// The item's availability is re-read while the item row is held, so the
    /// insert and the availability check form one atomic step.
    ///
    /// # Errors
    ///
    /// - [`RentalError::ItemNotFound`] if the item row vanished.
    /// - [`RentalError::ItemUnavailable`] if the item is unavailable at
    ///   commit time.
    fn add_booking(&self, new: NewBooking) -> Result<Booking, RentalError>;

    fn booking(&self, id: BookingId) -> Option<Booking>;

    /// Atomically moves a `Waiting` booking to `to`.
    ///
    /// # Errors
    ///
    /// - [`RentalError::BookingNotFound`] if the booking does not exist.
    /// - [`RentalError::AlreadyDecided`] if the booking is no longer
    ///   waiting; the stored status is left unchanged.
    fn transition_booking(&self, id: BookingId, to: BookingStatus)
    -> Result<Booking, RentalError>;

    /// Bookings made by `booker` matching `state`, ordered by `start`
    /// descending.
    fn bookings_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Vec<Booking>;

    /// Bookings on items owned by `owner` matching `state`, ordered by
    /// `start` descending.
    fn bookings_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Vec<Booking>;

    /// The approved booking on `item` with the latest `start` before `now`.
    fn last_booking(&self, item: ItemId, now: DateTime<Utc>) -> Option<Booking>;

    /// The approved booking on `item` with the earliest `start` after `now`.
    fn next_booking(&self, item: ItemId, now: DateTime<Utc>) -> Option<Booking>;

    /// Whether `booker` has a booking on `item` that ended before `now`.
    /// Pure existence check; booking status is not consulted.
    fn has_completed_booking(&self, booker: UserId, item: ItemId, now: DateTime<Utc>) -> bool;

    // --- comments ---

    fn add_comment(&self, new: NewComment) -> Comment;
    /// All comments on `item`, oldest first.
    fn comments_for_item(&self, item: ItemId) -> Vec<Comment>;

    // --- requests ---

    fn add_request(&self, requester: UserId, description: String, created: DateTime<Utc>)
    -> ItemRequest;
    fn request(&self, id: RequestId) -> Option<ItemRequest>;
    /// Requests made by `requester`, newest first.
    fn requests_by_requester(&self, requester: UserId) -> Vec<ItemRequest>;
    /// Requests made by everyone except `requester`, newest first.
    fn requests_of_others(&self, requester: UserId, page: PageRequest) -> Vec<ItemRequest>;
}

/// In-memory [`Store`] keyed by the id newtypes.
///
/// Entity rows live in [`DashMap`]s; a held entry guard serializes writers
/// on that row, which is what gives [`Store::add_booking`] and
/// [`Store::transition_booking`] their single-winner behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    items: DashMap<ItemId, Item>,
    bookings: DashMap<BookingId, Booking>,
    comments: DashMap<CommentId, Comment>,
    requests: DashMap<RequestId, ItemRequest>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn bookings_where<F>(&self, pred: F, state: BookingState, now: DateTime<Utc>) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let mut rows: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| pred(entry.value()) && state.matches(entry.value(), now))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.start.cmp(&a.start));
        rows
    }
}

impl Store for MemoryStore {
    fn add_user(&self, name: String, email: String) -> User {
        let user = User {
            id: UserId(self.next_id()),
            name,
            email,
        };
        self.users.insert(user.id, user.clone());
        user
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    fn users(&self) -> Vec<User> {
        let mut rows: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        rows.sort_by_key(|u| u.id);
        rows
    }

    fn update_user(
        &self,
        id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> Option<User> {
        let mut entry = self.users.get_mut(&id)?;
        if let Some(name) = name {
            entry.name = name;
        }
        if let Some(email) = email {
            entry.email = email;
        }
        Some(entry.clone())
    }

    fn remove_user(&self, id: UserId) -> bool {
        self.users.remove(&id).is_some()
    }

    fn add_item(&self, new: NewItem) -> Item {
        let item = Item {
            id: ItemId(self.next_id()),
            name: new.name,
            description: new.description,
            available: new.available,
            owner: new.owner,
            request: new.request,
        };
        self.items.insert(item.id, item.clone());
        item
    }

    fn item(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).map(|entry| entry.value().clone())
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Option<Item> {
        let mut entry = self.items.get_mut(&id)?;
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(available) = patch.available {
            entry.available = available;
        }
        Some(entry.clone())
    }

    fn items_by_owner(&self, owner: UserId, page: PageRequest) -> Vec<Item> {
        let mut rows: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|i| i.id);
        page.slice(rows)
    }

    fn search_items(&self, text: &str, page: PageRequest) -> Vec<Item> {
        let needle = text.to_lowercase();
        let mut rows: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| {
                entry.available
                    && (entry.name.to_lowercase().contains(&needle)
                        || entry.description.to_lowercase().contains(&needle))
            })
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|i| i.id);
        page.slice(rows)
    }

    fn items_for_request(&self, request: RequestId) -> Vec<Item> {
        let mut rows: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| entry.request == Some(request))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|i| i.id);
        rows
    }

    fn add_booking(&self, new: NewBooking) -> Result<Booking, RentalError> {
        // Hold the item row across the insert. An availability flip needs a
        // write guard on the same entry, so it cannot interleave here.
        let item = self
            .items
            .get(&new.item)
            .ok_or(RentalError::ItemNotFound(new.item))?;
        if !item.available {
            return Err(RentalError::ItemUnavailable(new.item));
        }

        let booking = Booking {
            id: BookingId(self.next_id()),
            start: new.start,
            end: new.end,
            item: new.item,
            booker: new.booker,
            status: BookingStatus::Waiting,
        };
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn booking(&self, id: BookingId) -> Option<Booking> {
        self.bookings.get(&id).map(|entry| entry.value().clone())
    }

    fn transition_booking(
        &self,
        id: BookingId,
        to: BookingStatus,
    ) -> Result<Booking, RentalError> {
        let mut entry = self
            .bookings
            .get_mut(&id)
            .ok_or(RentalError::BookingNotFound(id))?;
        if entry.status != BookingStatus::Waiting {
            return Err(RentalError::AlreadyDecided(id));
        }
        entry.status = to;
        Ok(entry.clone())
    }

    fn bookings_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Vec<Booking> {
        page.slice(self.bookings_where(|b| b.booker == booker, state, now))
    }

    fn bookings_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Vec<Booking> {
        let owned: Vec<ItemId> = self
            .items
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.id)
            .collect();
        page.slice(self.bookings_where(|b| owned.contains(&b.item), state, now))
    }

    fn last_booking(&self, item: ItemId, now: DateTime<Utc>) -> Option<Booking> {
        self.bookings
            .iter()
            .filter(|e| {
                e.item == item && e.status == BookingStatus::Approved && e.start < now
            })
            .max_by_key(|e| e.start)
            .map(|e| e.value().clone())
    }

    fn next_booking(&self, item: ItemId, now: DateTime<Utc>) -> Option<Booking> {
        self.bookings
            .iter()
            .filter(|e| {
                e.item == item && e.status == BookingStatus::Approved && e.start > now
            })
            .min_by_key(|e| e.start)
            .map(|e| e.value().clone())
    }

    fn has_completed_booking(&self, booker: UserId, item: ItemId, now: DateTime<Utc>) -> bool {
        self.bookings
            .iter()
            .any(|e| e.booker == booker && e.item == item && e.end < now)
    }

    fn add_comment(&self, new: NewComment) -> Comment {
        let comment = Comment {
            id: CommentId(self.next_id()),
            text: new.text,
            item: new.item,
            author: new.author,
            created: new.created,
        };
        self.comments.insert(comment.id, comment.clone());
        comment
    }

    fn comments_for_item(&self, item: ItemId) -> Vec<Comment> {
        let mut rows: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.item == item)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        rows
    }

    fn add_request(
        &self,
        requester: UserId,
        description: String,
        created: DateTime<Utc>,
    ) -> ItemRequest {
        let request = ItemRequest {
            id: RequestId(self.next_id()),
            description,
            requester,
            created,
        };
        self.requests.insert(request.id, request.clone());
        request
    }

    fn request(&self, id: RequestId) -> Option<ItemRequest> {
        self.requests.get(&id).map(|entry| entry.value().clone())
    }

    fn requests_by_requester(&self, requester: UserId) -> Vec<ItemRequest> {
        let mut rows: Vec<ItemRequest> = self
            .requests
            .iter()
            .filter(|entry| entry.requester == requester)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created.cmp(&a.created));
        rows
    }

    fn requests_of_others(&self, requester: UserId, page: PageRequest) -> Vec<ItemRequest> {
        let mut rows: Vec<ItemRequest> = self
            .requests
            .iter()
            .filter(|entry| entry.requester != requester)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created.cmp(&a.created));
        page.slice(rows)
    }
}
