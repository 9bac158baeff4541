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

//! Metadata table model: table identifiers, row records and the collection.
//!
//! Every cross-table reference in the model is a [`TableIndex`]; the
//! [`TableCollection`] owns one ordered row list per table kind and exposes
//! the row-count, bounds and contiguous child-range queries collaborators
//! need.

mod collection;
mod id;
mod index;
mod rows;

pub use collection::TableCollection;
pub use id::{TableId, RESERVED_TABLE_SLOTS};
pub use index::TableIndex;
pub use rows::{
    AssemblyRefRow, AssemblyRow, ClassLayoutRow, ConstantRow, CustomAttributeRow, DeclSecurityRow,
    EventMapRow, EventRow, ExportedTypeRow, FieldLayoutRow, FieldMarshalRow, FieldRVARow, FieldRow,
    FileRow, GenericParamConstraintRow, GenericParamRow, ImplMapRow, InterfaceImplRow,
    ManifestResourceRow, MemberRefRow, MemberRefSignature, MethodDefRow, MethodImplRow,
    MethodSemanticsRow, MethodSpecRow, ModuleRefRow, ModuleRow, NestedClassRow, ParamRow,
    PropertyMapRow, PropertyRow, StandAloneSigRow, StandAloneSignature, TypeDefRow, TypeRefRow,
    TypeSpecRow,
};
