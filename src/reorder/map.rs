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

//! Row-disposition bookkeeping for the re-order engine.
//!
//! [`ReorderMap`] records, per table kind, where every original row ended up:
//! either moved to a final position or merged into a surviving duplicate. The
//! engine threads one map through all phases, composing each pass's
//! permutation or merge set onto the dispositions recorded so far, so the
//! finished map always reads original index to final index in one step.

use strum::IntoEnumIterator;

use crate::{
    metadata::tables::{TableCollection, TableId, TableIndex, RESERVED_TABLE_SLOTS},
    Result,
};

/// Where one original row ended up after the engine ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    /// The row survives at this final index.
    Moved(u32),
    /// The row was removed as a duplicate; the surviving representative lives
    /// at this final index.
    Merged(u32),
}

impl RowDisposition {
    /// The final index this disposition resolves to, survivor or not.
    #[must_use]
    pub fn final_row(self) -> u32 {
        match self {
            RowDisposition::Moved(row) | RowDisposition::Merged(row) => row,
        }
    }

    /// Whether the row was removed as a duplicate.
    #[must_use]
    pub fn is_merged(self) -> bool {
        matches!(self, RowDisposition::Merged(_))
    }
}

/// Per-table original-index to final-index dispositions.
///
/// Slots are indexed by [`TableId::ordinal`]; the slot array is fixed at
/// [`RESERVED_TABLE_SLOTS`] entries so unknown future table kinds keep their
/// positions. Tables the engine never touches carry identity dispositions.
#[derive(Debug, Clone)]
pub struct ReorderMap {
    slots: Vec<Vec<RowDisposition>>,
}

impl ReorderMap {
    /// Creates an identity map sized to `tables`' current row counts.
    #[must_use]
    pub fn identity(tables: &TableCollection) -> Self {
        let mut slots = vec![Vec::new(); RESERVED_TABLE_SLOTS];
        for table in TableId::iter() {
            slots[table.ordinal()] = (0..tables.row_count(table))
                .map(RowDisposition::Moved)
                .collect();
        }
        ReorderMap { slots }
    }

    /// Dispositions for every original row of `table`, in original order.
    #[must_use]
    pub fn table(&self, table: TableId) -> &[RowDisposition] {
        &self.slots[table.ordinal()]
    }

    /// Resolves an original-position reference to its final position.
    ///
    /// Merged rows resolve to their surviving representative, so the result
    /// always names a row present in the reordered collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexOutOfRange`] when `index` does not name an
    /// original row.
    pub fn final_index(&self, index: TableIndex) -> Result<TableIndex> {
        let dispositions = &self.slots[index.table.ordinal()];
        match dispositions.get(index.row as usize) {
            Some(disposition) => Ok(TableIndex::new(index.table, disposition.final_row())),
            None => Err(crate::Error::IndexOutOfRange(index)),
        }
    }

    /// Whether every row of every table kept its original position.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.slots.iter().all(|dispositions| {
            dispositions
                .iter()
                .enumerate()
                .all(|(row, disposition)| *disposition == RowDisposition::Moved(row as u32))
        })
    }

    /// Composes a permutation of the current row positions onto `table`.
    ///
    /// `perm[current]` is the position the row currently at `current` moves
    /// to. Merge targets are redirected through the same permutation.
    pub(crate) fn apply_permutation(&mut self, table: TableId, perm: &[u32]) {
        for disposition in &mut self.slots[table.ordinal()] {
            *disposition = match *disposition {
                RowDisposition::Moved(current) => {
                    RowDisposition::Moved(perm[current as usize])
                }
                RowDisposition::Merged(survivor) => {
                    RowDisposition::Merged(perm[survivor as usize])
                }
            };
        }
    }

    /// Composes a merge pass onto `table`.
    ///
    /// `merged_into[current]` is `Some(survivor_current)` for rows removed as
    /// duplicates and `None` for kept rows; kept rows compact downward in
    /// order.
    pub(crate) fn apply_merges(&mut self, table: TableId, merged_into: &[Option<u32>]) {
        let mut compacted = vec![0u32; merged_into.len()];
        let mut next = 0u32;
        for (current, merge) in merged_into.iter().enumerate() {
            if merge.is_none() {
                compacted[current] = next;
                next += 1;
            }
        }

        let resolve = |mut current: u32| {
            while let Some(survivor) = merged_into[current as usize] {
                current = survivor;
            }
            compacted[current as usize]
        };

        for disposition in &mut self.slots[table.ordinal()] {
            *disposition = match *disposition {
                RowDisposition::Moved(current) => match merged_into[current as usize] {
                    Some(survivor) => RowDisposition::Merged(resolve(survivor)),
                    None => RowDisposition::Moved(compacted[current as usize]),
                },
                RowDisposition::Merged(survivor) => RowDisposition::Merged(resolve(survivor)),
            };
        }
    }
}

/// Tagged per-row state used while a dedup pass is in flight.
///
/// Replaces the null-row tombstone idea: a removed row explicitly names its
/// surviving representative's current position, and compaction is a total
/// function over the tag.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot<T> {
    /// The row is still present.
    Active(T),
    /// The row was removed as a duplicate of the row currently at this index.
    Merged(u32),
}

/// Compacts a slot list back into a plain row list.
///
/// Returns the surviving rows in order plus the merge vector consumed by
/// [`ReorderMap::apply_merges`].
pub(crate) fn compact<T>(slots: Vec<Slot<T>>) -> (Vec<T>, Vec<Option<u32>>) {
    let mut rows = Vec::with_capacity(slots.len());
    let mut merged_into = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Active(row) => {
                rows.push(row);
                merged_into.push(None);
            }
            Slot::Merged(survivor) => merged_into.push(Some(survivor)),
        }
    }
    (rows, merged_into)
}
