// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::metadata::tables::TableId;

/// A typed reference to a metadata table row.
///
/// `TableIndex` is the sole cross-table reference mechanism of the in-memory
/// model: rows, signature trees and IL operands all point at other rows with a
/// (table kind, row index) pair instead of direct object references, which is
/// what allows the re-order engine to relocate rows freely and fix every
/// reference up afterwards.
///
/// Row indices are zero-based positions into the owning table's row list.
/// Equality is structural.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableIndex {
    /// The table this reference points into.
    pub table: TableId,
    /// Zero-based row position within the table.
    pub row: u32,
}

impl TableIndex {
    /// Creates a new reference to `row` of `table`.
    #[must_use]
    pub fn new(table: TableId, row: u32) -> Self {
        TableIndex { table, row }
    }

    /// Returns a key that orders references the way the physical coded-index
    /// encoding does: row first, table ordinal as tie-break.
    ///
    /// Canonical-order comparers for tables whose sort column is a coded index
    /// (`CustomAttribute.Parent`, `MethodSemantics.Association`, ...) use this
    /// key.
    #[must_use]
    pub fn coded_key(&self) -> u64 {
        (u64::from(self.row) << 8) | self.table.ordinal() as u64
    }
}

impl fmt::Debug for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableIndex({:?}[{}])", self.table, self.row)
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.table, self.row)
    }
}
