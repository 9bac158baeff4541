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

use strum::{EnumCount, EnumIter};

/// Number of reorder-map slots reserved per collection.
///
/// The ECMA-335 table numbering space is one byte wide; the reorder engine
/// sizes its per-table permutation storage to the full space so that new table
/// kinds can be added without changing the map layout.
pub const RESERVED_TABLE_SLOTS: usize = 256;

/// Identifiers for the metadata tables defined in the ECMA-335 specification.
///
/// Each variant represents a specific metadata table kind; the numeric values
/// are the table numbers from the CLI specification (Partition II, Section 22)
/// and double as the ordinal used to address per-table reorder state.
///
/// Only the tables the in-memory model carries are listed. Tables that exist
/// purely for edit-and-continue or portable-PDB scenarios are not part of the
/// model and have no variant here.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    /// `Module` table (0x00) - the current module. Exactly one row.
    Module = 0x00,
    /// `TypeRef` table (0x01) - references to types in external scopes.
    TypeRef = 0x01,
    /// `TypeDef` table (0x02) - type definitions within this assembly.
    TypeDef = 0x02,
    /// `Field` table (0x04) - field definitions, owned by `TypeDef` ranges.
    Field = 0x04,
    /// `MethodDef` table (0x06) - method definitions, owned by `TypeDef` ranges.
    MethodDef = 0x06,
    /// `Param` table (0x08) - parameter definitions, owned by `MethodDef` ranges.
    Param = 0x08,
    /// `InterfaceImpl` table (0x09) - interface implementations per type.
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A) - references to members of external types.
    MemberRef = 0x0A,
    /// `Constant` table (0x0B) - compile-time constants for fields, params, properties.
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C) - custom attribute applications.
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D) - marshalling information for fields and params.
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E) - declarative security permissions.
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F) - explicit layout information for types.
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10) - explicit field offsets.
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11) - standalone signatures (locals, calli sites).
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12) - maps types to their event ranges.
    EventMap = 0x12,
    /// `Event` table (0x14) - event definitions, owned by `EventMap` ranges.
    Event = 0x14,
    /// `PropertyMap` table (0x15) - maps types to their property ranges.
    PropertyMap = 0x15,
    /// `Property` table (0x17) - property definitions, owned by `PropertyMap` ranges.
    Property = 0x17,
    /// `MethodSemantics` table (0x18) - property/event accessor associations.
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19) - explicit method implementation mappings.
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A) - references to external modules.
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B) - type specifications (instantiated generics, arrays).
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C) - P/Invoke implementation mappings.
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D) - initialized-data addresses for fields.
    FieldRVA = 0x1D,
    /// `Assembly` table (0x20) - the current assembly's identity. At most one row.
    Assembly = 0x20,
    /// `AssemblyRef` table (0x23) - references to external assemblies.
    AssemblyRef = 0x23,
    /// `File` table (0x26) - files belonging to this assembly.
    File = 0x26,
    /// `ExportedType` table (0x27) - types exported from other modules of this assembly.
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28) - embedded or linked resources.
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29) - nested/enclosing type relationships.
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A) - generic parameter definitions.
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B) - generic method instantiations.
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C) - constraints on generic parameters.
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Returns the ordinal used to address per-table reorder state.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }
}
