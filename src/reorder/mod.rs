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

//! The metadata re-order and de-duplication engine.
//!
//! [`Reorderer::run`] canonicalizes a caller-owned [`TableCollection`] in
//! three sequential phases:
//!
//! 1. **Structural reorder** — TypeDef rows are rearranged so enclosing types
//!    precede their nested types, the Field/MethodDef/Param tables are
//!    re-homed into the contiguous ranges the new order implies, and
//!    PropertyMap/EventMap rows sharing a parent are merged.
//! 2. **Duplicate elimination** — AssemblyRef, ModuleRef, TypeRef, TypeSpec,
//!    MemberRef, MethodSpec and StandAloneSig are collapsed under their
//!    table-specific equality rules while every signature and IL reference is
//!    rewritten to final positions.
//! 3. **Remaining-table sort** — simple foreign keys are rewritten and tables
//!    with a canonical order are stable-sorted; InterfaceImpl drops
//!    value-equal rows after its sort.
//!
//! The returned [`ReorderMap`] records, per table kind, where every original
//! row ended up. Running the engine on its own output yields the identity
//! map and leaves the collection unchanged.

mod dedup;
mod map;
mod sorting;
mod structural;

pub use map::{ReorderMap, RowDisposition};

use crate::{metadata::tables::TableCollection, Result};

/// Entry point for the re-order engine.
pub struct Reorderer;

impl Reorderer {
    /// Reorders and de-duplicates `tables` in place.
    ///
    /// On success the collection satisfies the canonical-order invariants and
    /// the returned map resolves every original row position to its final
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error for inconsistent child ranges, out-of-range row
    /// references, or nested-type / resolution-scope / type-specification
    /// reference cycles. No rollback is performed: after an error the
    /// collection may be left partially mutated and should be discarded.
    pub fn run(tables: &mut TableCollection) -> Result<ReorderMap> {
        let mut map = ReorderMap::identity(tables);
        structural::run(tables, &mut map)?;
        dedup::run(tables, &mut map)?;
        sorting::run(tables, &mut map)?;
        Ok(map)
    }
}
