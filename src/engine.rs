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

//! Rental engine.
//!
//! The [`RentalEngine`] is the central component: it validates and executes
//! booking creation and decisions, classifies bookings into listing buckets,
//! assembles enriched item views and enforces who may see or change what.
//!
//! # Booking lifecycle
//!
//! - **Create**: booker and item must exist, the booker must not own the
//!   item, the item must be available. Persisted as `Waiting`.
//! - **Decide**: the item owner approves or rejects a `Waiting` booking.
//!   Both outcomes are terminal; re-deciding fails and leaves the status
//!   unchanged.
//! - **List**: bookings are bucketed by an explicit [`BookingState`] filter
//!   and returned newest-start first.
//!
//! # Concurrency
//!
//! All calls are synchronous request/response. Races on a single booking or
//! item (two decisions, or a create against an availability flip) are
//! resolved by the store's atomic mutations; see [`Store`].

use crate::base::{BookingId, ItemId, RequestId, UserId};
use crate::error::RentalError;
use crate::model::{Booking, BookingStatus, Item, User};
use crate::page::PageRequest;
use crate::state::BookingState;
use crate::store::{ItemPatch, MemoryStore, NewBooking, NewComment, NewItem, Store};
use crate::view::{
    BookerSummary, BookingSlot, BookingView, CommentView, ItemView, OwnerSummary, RequestView,
    UserView,
};
use chrono::{DateTime, Utc};

/// Peer-to-peer rental engine over a [`Store`].
///
/// # Invariants
///
/// - Every booking is created as `Waiting`; no create path produces a
///   decided booking.
/// - `Waiting -> Approved` and `Waiting -> Rejected` are the only status
///   transitions, and they never regress.
/// - Booking intervals satisfy `start < end` strictly.
pub struct RentalEngine<S = MemoryStore> {
    store: S,
}

impl RentalEngine<MemoryStore> {
    /// Creates an engine over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Default for RentalEngine<MemoryStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: Store> RentalEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // --- bookings ---

    /// Creates a booking of `item` by `booker` with status `Waiting`.
    ///
    /// # Errors
    ///
    /// - [`RentalError::InvalidTimeRange`] if `start >= end`.
    /// - [`RentalError::StartNotInFuture`] if `start` is not strictly in the
    ///   future.
    /// - [`RentalError::UserNotFound`] / [`RentalError::ItemNotFound`] for
    ///   dangling references.
    /// - [`RentalError::OwnBooking`] if the booker owns the item.
    /// - [`RentalError::ItemUnavailable`] if the item is not available.
    pub fn create_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BookingView, RentalError> {
        if start >= end {
            return Err(RentalError::InvalidTimeRange);
        }
        if start <= Utc::now() {
            return Err(RentalError::StartNotInFuture);
        }

        let booker = self.fetch_user(booker_id)?;
        let item = self.fetch_item(item_id)?;

        if booker.id == item.owner {
            return Err(RentalError::OwnBooking);
        }
        if !item.available {
            return Err(RentalError::ItemUnavailable(item.id));
        }

        // The store re-checks availability while holding the item row, so a
        // concurrent flip cannot race past the check above.
        let booking = self.store.add_booking(NewBooking {
            start,
            end,
            item: item.id,
            booker: booker.id,
        })?;
        tracing::info!(booking = %booking.id, item = %item.id, "booking created");
        Ok(BookingView::assemble(booking, item, booker))
    }

    /// Approves (`approved = true`) or rejects a waiting booking.
    ///
    /// Only the item owner may decide, and only while the booking is
    /// `Waiting`; both outcomes are terminal.
    ///
    /// # Errors
    ///
    /// - [`RentalError::UserNotFound`] / [`RentalError::BookingNotFound`].
    /// - [`RentalError::NotOwner`] if the actor does not own the item.
    /// - [`RentalError::AlreadyDecided`] if the booking is no longer
    ///   waiting; the stored status stays unchanged.
    pub fn decide_booking(
        &self,
        actor_id: UserId,
        booking_id: BookingId,
        approved: bool,
    ) -> Result<BookingView, RentalError> {
        let actor = self.fetch_user(actor_id)?;
        let booking = self.fetch_booking(booking_id)?;
        let item = self.fetch_item(booking.item)?;

        if actor.id != item.owner {
            return Err(RentalError::NotOwner);
        }
        if booking.status != BookingStatus::Waiting {
            return Err(RentalError::AlreadyDecided(booking.id));
        }

        let to = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        // Compare-and-transition; a racing decision loses here even though
        // both passed the check above.
        let booking = self.store.transition_booking(booking.id, to)?;
        tracing::info!(booking = %booking.id, status = %booking.status, "booking decided");
        Ok(self.assemble_booking(booking, item))
    }

    /// Fetches a single booking. Only the booker and the item owner may
    /// view it.
    pub fn get_booking(
        &self,
        viewer_id: UserId,
        booking_id: BookingId,
    ) -> Result<BookingView, RentalError> {
        let booking = self.fetch_booking(booking_id)?;
        let item = self.fetch_item(booking.item)?;
        if viewer_id != booking.booker && viewer_id != item.owner {
            return Err(RentalError::NotParticipant);
        }
        Ok(self.assemble_booking(booking, item))
    }

    /// Lists bookings made by `booker_id`, filtered by the `state` token,
    /// newest start first.
    ///
    /// # Errors
    ///
    /// - [`RentalError::UnknownState`] for an unrecognized token.
    /// - [`RentalError::InvalidPage`] for `size <= 0` or `from < 0`.
    /// - [`RentalError::UserNotFound`] if the booker does not exist.
    pub fn bookings_for_booker(
        &self,
        booker_id: UserId,
        state: &str,
        from: i64,
        size: i64,
    ) -> Result<Vec<BookingView>, RentalError> {
        let state = self.parse_state(state)?;
        let page = PageRequest::new(from, size)?;
        let booker = self.fetch_user(booker_id)?;
        let rows = self
            .store
            .bookings_for_booker(booker.id, state, Utc::now(), page);
        tracing::info!(count = rows.len(), booker = %booker.id, "bookings listed");
        rows.into_iter().map(|b| self.booking_view(b)).collect()
    }

    /// Lists bookings on items owned by `owner_id`, filtered by the `state`
    /// token, newest start first. Errors as [`Self::bookings_for_booker`].
    pub fn bookings_for_owner(
        &self,
        owner_id: UserId,
        state: &str,
        from: i64,
        size: i64,
    ) -> Result<Vec<BookingView>, RentalError> {
        let state = self.parse_state(state)?;
        let page = PageRequest::new(from, size)?;
        let owner = self.fetch_user(owner_id)?;
        let rows = self
            .store
            .bookings_for_owner(owner.id, state, Utc::now(), page);
        tracing::info!(count = rows.len(), owner = %owner.id, "bookings listed");
        rows.into_iter().map(|b| self.booking_view(b)).collect()
    }

    // --- items ---

    /// Lists a new item for `owner_id`, optionally answering a request.
    pub fn create_item(
        &self,
        owner_id: UserId,
        name: String,
        description: String,
        available: bool,
        request: Option<RequestId>,
    ) -> Result<ItemView, RentalError> {
        let owner = self.fetch_user(owner_id)?;
        if let Some(request_id) = request {
            self.store
                .request(request_id)
                .ok_or(RentalError::RequestNotFound(request_id))?;
        }
        let item = self.store.add_item(NewItem {
            name,
            description,
            available,
            owner: owner.id,
            request,
        });
        tracing::info!(item = %item.id, owner = %owner.id, "item created");
        Ok(self.item_view(Some(owner.id), item))
    }

    /// Edits an item. Only the owner may edit.
    pub fn update_item(
        &self,
        actor_id: UserId,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<ItemView, RentalError> {
        let actor = self.fetch_user(actor_id)?;
        let item = self.fetch_item(item_id)?;
        if actor.id != item.owner {
            return Err(RentalError::NotOwner);
        }
        let item = self
            .store
            .update_item(item.id, patch)
            .ok_or(RentalError::ItemNotFound(item_id))?;
        Ok(self.item_view(Some(actor.id), item))
    }

    /// Fetches an item enriched with comments and, for the owner, the
    /// nearest approved bookings on either side of now.
    pub fn get_item(&self, viewer_id: UserId, item_id: ItemId) -> Result<ItemView, RentalError> {
        let item = self.fetch_item(item_id)?;
        Ok(self.item_view(Some(viewer_id), item))
    }

    /// Lists the items owned by `owner_id`, each enriched as if the owner
    /// were viewing it.
    pub fn items_for_owner(
        &self,
        owner_id: UserId,
        from: i64,
        size: i64,
    ) -> Result<Vec<ItemView>, RentalError> {
        let page = PageRequest::new(from, size)?;
        let owner = self.fetch_user(owner_id)?;
        let rows = self.store.items_by_owner(owner.id, page);
        Ok(rows
            .into_iter()
            .map(|item| self.item_view(Some(owner.id), item))
            .collect())
    }

    /// Searches available items by name or description. An empty query
    /// returns no results. Search results carry no scheduling context.
    pub fn search_items(
        &self,
        text: &str,
        from: i64,
        size: i64,
    ) -> Result<Vec<ItemView>, RentalError> {
        let page = PageRequest::new(from, size)?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.store.search_items(text, page);
        tracing::info!(count = rows.len(), "items found");
        Ok(rows
            .into_iter()
            .map(|item| self.item_view(None, item))
            .collect())
    }

    // --- comments ---

    /// Adds a comment by `author_id` on `item_id`.
    ///
    /// # Errors
    ///
    /// - [`RentalError::EmptyComment`] for blank text.
    /// - [`RentalError::NotEligible`] unless the author has a booking on
    ///   the item that already ended.
    pub fn add_comment(
        &self,
        author_id: UserId,
        item_id: ItemId,
        text: String,
    ) -> Result<CommentView, RentalError> {
        if text.trim().is_empty() {
            return Err(RentalError::EmptyComment);
        }
        let author = self.fetch_user(author_id)?;
        let item = self.fetch_item(item_id)?;

        let now = Utc::now();
        if !self.store.has_completed_booking(author.id, item.id, now) {
            return Err(RentalError::NotEligible);
        }

        let comment = self.store.add_comment(NewComment {
            text,
            item: item.id,
            author: author.id,
            created: now,
        });
        tracing::info!(comment = %comment.id, item = %item.id, "comment added");
        Ok(CommentView::assemble(comment, author.name))
    }

    // --- users ---

    pub fn create_user(&self, name: String, email: String) -> UserView {
        let user = self.store.add_user(name, email);
        tracing::info!(user = %user.id, "user created");
        user.into()
    }

    pub fn get_user(&self, user_id: UserId) -> Result<UserView, RentalError> {
        self.fetch_user(user_id).map(UserView::from)
    }

    pub fn list_users(&self) -> Vec<UserView> {
        self.store.users().into_iter().map(UserView::from).collect()
    }

    pub fn update_user(
        &self,
        user_id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<UserView, RentalError> {
        self.store
            .update_user(user_id, name, email)
            .map(UserView::from)
            .ok_or(RentalError::UserNotFound(user_id))
    }

    pub fn delete_user(&self, user_id: UserId) -> Result<(), RentalError> {
        if !self.store.remove_user(user_id) {
            return Err(RentalError::UserNotFound(user_id));
        }
        tracing::info!(user = %user_id, "user removed");
        Ok(())
    }

    // --- requests ---

    /// Records a request for an item nobody has listed yet.
    pub fn create_request(
        &self,
        requester_id: UserId,
        description: String,
    ) -> Result<RequestView, RentalError> {
        let requester = self.fetch_user(requester_id)?;
        let request = self
            .store
            .add_request(requester.id, description, Utc::now());
        tracing::info!(request = %request.id, "request created");
        Ok(RequestView::assemble(request, Vec::new()))
    }

    /// The requester's own requests, newest first.
    pub fn requests_for_user(
        &self,
        requester_id: UserId,
    ) -> Result<Vec<RequestView>, RentalError> {
        let requester = self.fetch_user(requester_id)?;
        Ok(self
            .store
            .requests_by_requester(requester.id)
            .into_iter()
            .map(|r| {
                let items = self.store.items_for_request(r.id);
                RequestView::assemble(r, items)
            })
            .collect())
    }

    /// Everyone else's requests, newest first.
    pub fn all_requests(
        &self,
        viewer_id: UserId,
        from: i64,
        size: i64,
    ) -> Result<Vec<RequestView>, RentalError> {
        let page = PageRequest::new(from, size)?;
        let viewer = self.fetch_user(viewer_id)?;
        Ok(self
            .store
            .requests_of_others(viewer.id, page)
            .into_iter()
            .map(|r| {
                let items = self.store.items_for_request(r.id);
                RequestView::assemble(r, items)
            })
            .collect())
    }

    pub fn get_request(
        &self,
        viewer_id: UserId,
        request_id: RequestId,
    ) -> Result<RequestView, RentalError> {
        self.fetch_user(viewer_id)?;
        let request = self
            .store
            .request(request_id)
            .ok_or(RentalError::RequestNotFound(request_id))?;
        let items = self.store.items_for_request(request.id);
        Ok(RequestView::assemble(request, items))
    }

    // --- helpers ---

    fn parse_state(&self, token: &str) -> Result<BookingState, RentalError> {
        token.parse::<BookingState>().inspect_err(|_| {
            tracing::warn!(token, "unknown state token");
        })
    }

    fn fetch_user(&self, id: UserId) -> Result<User, RentalError> {
        self.store.user(id).ok_or(RentalError::UserNotFound(id))
    }

    fn fetch_item(&self, id: ItemId) -> Result<Item, RentalError> {
        self.store.item(id).ok_or(RentalError::ItemNotFound(id))
    }

    fn fetch_booking(&self, id: BookingId) -> Result<Booking, RentalError> {
        self.store
            .booking(id)
            .ok_or(RentalError::BookingNotFound(id))
    }

    fn booking_view(&self, booking: Booking) -> Result<BookingView, RentalError> {
        let item = self.fetch_item(booking.item)?;
        Ok(self.assemble_booking(booking, item))
    }

    fn assemble_booking(&self, booking: Booking, item: Item) -> BookingView {
        // The booker may have been deleted since; keep the booking.
        let booker_name = self
            .store
            .user(booking.booker)
            .map(|u| u.name)
            .unwrap_or_default();
        BookingView {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status.into(),
            item: item.into(),
            booker: BookerSummary {
                id: booking.booker,
                name: booker_name,
            },
        }
    }

    fn item_view(&self, viewer: Option<UserId>, item: Item) -> ItemView {
        let owner_name = self
            .store
            .user(item.owner)
            .map(|u| u.name)
            .unwrap_or_default();

        let (last_booking, next_booking) = if viewer == Some(item.owner) {
            let now = Utc::now();
            (
                self.store.last_booking(item.id, now).map(BookingSlot::from),
                self.store.next_booking(item.id, now).map(BookingSlot::from),
            )
        } else {
            (None, None)
        };

        let comments = self
            .store
            .comments_for_item(item.id)
            .into_iter()
            .map(|c| {
                // The author may have been deleted since; keep the comment.
                let author_name = self
                    .store
                    .user(c.author)
                    .map(|u| u.name)
                    .unwrap_or_default();
                CommentView::assemble(c, author_name)
            })
            .collect();

        ItemView {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request,
            owner: OwnerSummary {
                id: item.owner,
                name: owner_name,
            },
            last_booking,
            next_booking,
            comments,
        }
    }
}
