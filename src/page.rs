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

//! Pagination parameters.
//!
//! Callers supply `from` (a zero-based row offset used to compute a page
//! index, `from / size`) and `size` (page length). Page membership follows
//! `OFFSET (from / size) * size LIMIT size`.

use crate::error::RentalError;

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    from: i64,
    size: i64,
}

impl PageRequest {
    /// Validates `from >= 0` and `size > 0`.
    pub fn new(from: i64, size: i64) -> Result<Self, RentalError> {
        if size <= 0 || from < 0 {
            return Err(RentalError::InvalidPage { from, size });
        }
        Ok(Self { from, size })
    }

    /// Number of rows skipped before the page starts.
    pub fn offset(&self) -> usize {
        ((self.from / self.size) * self.size) as usize
    }

    /// Page length.
    pub fn limit(&self) -> usize {
        self.size as usize
    }

    /// Applies the window to an already-sorted sequence.
    pub fn slice<T>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter().skip(self.offset()).take(self.limit()).collect()
    }
}
