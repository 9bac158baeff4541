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

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # cilcanon
//!
//! A library for manipulating .NET ECMA-335 metadata at the binary-table
//! level. Its core is a re-ordering and de-duplication engine that takes a
//! caller-built [`TableCollection`] and rewrites it into canonical form:
//! enclosing types before nested types, contiguous child ranges, reference
//! tables free of duplicates, every cross-table reference consistent with the
//! final row positions.
//!
//! ## Quick Start
//!
//! Add `cilcanon` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cilcanon = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use cilcanon::prelude::*;
//!
//! let mut tables = TableCollection::new();
//! // ... populate the collection from a loader or builder ...
//! let map = Reorderer::run(&mut tables)?;
//! assert!(map.is_identity());
//! # Ok::<(), cilcanon::Error>(())
//! ```
//!
//! ### Tracking rows across a reorder
//!
//! Every row of every table is accounted for in the returned [`ReorderMap`]:
//! moved rows report their final index, duplicate rows report the surviving
//! representative they merged into.
//!
//! ```rust
//! use cilcanon::prelude::*;
//!
//! let mut tables = TableCollection::new();
//! let map = Reorderer::run(&mut tables)?;
//! for disposition in map.table(TableId::TypeRef) {
//!     match disposition {
//!         RowDisposition::Moved(row) => println!("row now at {row}"),
//!         RowDisposition::Merged(row) => println!("duplicate of row {row}"),
//!     }
//! }
//! # Ok::<(), cilcanon::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `cilcanon` is organized into a handful of modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`metadata`] - The table, signature, identity and method-body model
//! - [`reorder`] - The re-order and de-duplication engine
//! - [`Error`] and [`Result`] - Error handling
//!
//! The engine runs three sequential phases (structural reorder, duplicate
//! elimination with reference rewrite, remaining-table sort); see the
//! [`reorder`] module documentation for the phase contracts.
//!
//! Binary PE parsing, heap encoding and stream serialization are deliberately
//! outside this crate: collaborators construct the in-memory model, hand it
//! to the engine, and serialize the mutated collection themselves using the
//! returned map to patch any external references.
//!
//! ## Standards Compliance
//!
//! Table shapes, signature forms and the assembly display-name grammar follow
//! the **ECMA-335 specification** (6th edition).
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use cilcanon::{metadata::identity::AssemblyIdentity, Error};
//!
//! match AssemblyIdentity::parse("MyLib, Version=not.a.version") {
//!     Ok(identity) => println!("parsed {}", identity.name),
//!     Err(Error::Malformed { message, .. }) => println!("bad name: {}", message),
//!     Err(e) => println!("other error: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use cilcanon::prelude::*;
///
/// let mut tables = TableCollection::new();
/// let map = Reorderer::run(&mut tables)?;
/// assert!(map.is_identity());
/// # Ok::<(), cilcanon::Error>(())
/// ```
pub mod prelude;

/// The in-memory metadata model: tables, signatures, identity, method bodies.
pub mod metadata;

/// The re-order and de-duplication engine.
pub mod reorder;

pub use error::Error;

/// The result type used throughout cilcanon.
pub type Result<T> = core::result::Result<T, Error>;

pub use metadata::tables::{TableCollection, TableId, TableIndex};
pub use reorder::{ReorderMap, Reorderer, RowDisposition};
