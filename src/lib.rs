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

//! # lendit
//!
//! This library provides a peer-to-peer item-rental engine: users list
//! items, other users request time-bounded bookings, owners approve or
//! reject them, and renters comment on items after a completed rental.
//!
//! ## Core Components
//!
//! - [`RentalEngine`]: validates and executes booking creation, decisions
//!   and the listing/aggregation queries
//! - [`BookingState`]: the six listing filters (`ALL`/`CURRENT`/`PAST`/
//!   `FUTURE`/`WAITING`/`REJECTED`)
//! - [`Store`] / [`MemoryStore`]: the persistence seam and its in-memory
//!   implementation
//! - [`RentalError`]: error taxonomy for every business-rule violation
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use lendit_rs::RentalEngine;
//!
//! let engine = RentalEngine::in_memory();
//! let ann = engine.create_user("ann".into(), "ann@example.com".into());
//! let bob = engine.create_user("bob".into(), "bob@example.com".into());
//! let drill = engine
//!     .create_item(ann.id, "drill".into(), "cordless drill".into(), true, None)
//!     .unwrap();
//!
//! // Bob books Ann's drill for tomorrow; the booking starts out WAITING.
//! let start = Utc::now() + Duration::days(1);
//! let booking = engine
//!     .create_booking(bob.id, drill.id, start, start + Duration::days(2))
//!     .unwrap();
//!
//! // Ann approves it.
//! let booking = engine.decide_booking(ann.id, booking.id, true).unwrap();
//! assert_eq!(booking.status, lendit_rs::BookingStatusView::Approved);
//! ```
//!
//! ## Thread Safety
//!
//! The engine is synchronous and shares its store across threads; racing
//! mutations on one booking or item are serialized by the store, which
//! commits a single winner.

pub mod base;
mod engine;
pub mod error;
pub mod model;
mod page;
mod state;
pub mod store;
pub mod view;

pub use base::{BookingId, CommentId, ItemId, RequestId, UserId};
pub use engine::RentalEngine;
pub use error::{ErrorKind, RentalError};
pub use model::BookingStatus;
pub use page::PageRequest;
pub use state::BookingState;
pub use store::{ItemPatch, MemoryStore, Store};
pub use view::{BookingStatusView, BookingView, CommentView, ItemView, RequestView, UserView};
