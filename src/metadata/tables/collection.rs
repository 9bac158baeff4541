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

//! The mutable, caller-owned collection of metadata table rows.
//!
//! One ordered row list per table kind, addressed as plain struct fields so
//! the full table set is closed at compile time. The collection is built in
//! any order by a loading or construction collaborator, handed to
//! [`crate::reorder::Reorderer::run`] for canonicalization, and remains owned
//! by the caller afterwards.

use std::ops::Range;

use crate::{
    metadata::tables::{
        AssemblyRefRow, AssemblyRow, ClassLayoutRow, ConstantRow, CustomAttributeRow,
        DeclSecurityRow, EventMapRow, EventRow, ExportedTypeRow, FieldLayoutRow, FieldMarshalRow,
        FieldRVARow, FieldRow, FileRow, GenericParamConstraintRow, GenericParamRow, ImplMapRow,
        InterfaceImplRow, ManifestResourceRow, MemberRefRow, MethodDefRow, MethodImplRow,
        MethodSemanticsRow, MethodSpecRow, ModuleRefRow, ModuleRow, NestedClassRow, ParamRow,
        PropertyMapRow, PropertyRow, StandAloneSigRow, TableId, TableIndex, TypeDefRow, TypeRefRow,
        TypeSpecRow,
    },
    Result,
};

/// Ordered row lists for every metadata table kind the model carries.
///
/// Rows reference each other exclusively through [`TableIndex`] values, so the
/// re-order engine can relocate rows and rewrite references afterwards. The
/// collection performs no validation on construction; structural invariants
/// are established by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCollection {
    /// `Module` rows (0x00).
    pub module: Vec<ModuleRow>,
    /// `TypeRef` rows (0x01).
    pub type_ref: Vec<TypeRefRow>,
    /// `TypeDef` rows (0x02).
    pub type_def: Vec<TypeDefRow>,
    /// `Field` rows (0x04).
    pub field: Vec<FieldRow>,
    /// `MethodDef` rows (0x06).
    pub method_def: Vec<MethodDefRow>,
    /// `Param` rows (0x08).
    pub param: Vec<ParamRow>,
    /// `InterfaceImpl` rows (0x09).
    pub interface_impl: Vec<InterfaceImplRow>,
    /// `MemberRef` rows (0x0A).
    pub member_ref: Vec<MemberRefRow>,
    /// `Constant` rows (0x0B).
    pub constant: Vec<ConstantRow>,
    /// `CustomAttribute` rows (0x0C).
    pub custom_attribute: Vec<CustomAttributeRow>,
    /// `FieldMarshal` rows (0x0D).
    pub field_marshal: Vec<FieldMarshalRow>,
    /// `DeclSecurity` rows (0x0E).
    pub decl_security: Vec<DeclSecurityRow>,
    /// `ClassLayout` rows (0x0F).
    pub class_layout: Vec<ClassLayoutRow>,
    /// `FieldLayout` rows (0x10).
    pub field_layout: Vec<FieldLayoutRow>,
    /// `StandAloneSig` rows (0x11).
    pub stand_alone_sig: Vec<StandAloneSigRow>,
    /// `EventMap` rows (0x12).
    pub event_map: Vec<EventMapRow>,
    /// `Event` rows (0x14).
    pub event: Vec<EventRow>,
    /// `PropertyMap` rows (0x15).
    pub property_map: Vec<PropertyMapRow>,
    /// `Property` rows (0x17).
    pub property: Vec<PropertyRow>,
    /// `MethodSemantics` rows (0x18).
    pub method_semantics: Vec<MethodSemanticsRow>,
    /// `MethodImpl` rows (0x19).
    pub method_impl: Vec<MethodImplRow>,
    /// `ModuleRef` rows (0x1A).
    pub module_ref: Vec<ModuleRefRow>,
    /// `TypeSpec` rows (0x1B).
    pub type_spec: Vec<TypeSpecRow>,
    /// `ImplMap` rows (0x1C).
    pub impl_map: Vec<ImplMapRow>,
    /// `FieldRVA` rows (0x1D).
    pub field_rva: Vec<FieldRVARow>,
    /// `Assembly` rows (0x20).
    pub assembly: Vec<AssemblyRow>,
    /// `AssemblyRef` rows (0x23).
    pub assembly_ref: Vec<AssemblyRefRow>,
    /// `File` rows (0x26).
    pub file: Vec<FileRow>,
    /// `ExportedType` rows (0x27).
    pub exported_type: Vec<ExportedTypeRow>,
    /// `ManifestResource` rows (0x28).
    pub manifest_resource: Vec<ManifestResourceRow>,
    /// `NestedClass` rows (0x29).
    pub nested_class: Vec<NestedClassRow>,
    /// `GenericParam` rows (0x2A).
    pub generic_param: Vec<GenericParamRow>,
    /// `MethodSpec` rows (0x2B).
    pub method_spec: Vec<MethodSpecRow>,
    /// `GenericParamConstraint` rows (0x2C).
    pub generic_param_constraint: Vec<GenericParamConstraintRow>,
}

impl TableCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        TableCollection::default()
    }

    /// Returns the number of rows currently held for `table`.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        let count = match table {
            TableId::Module => self.module.len(),
            TableId::TypeRef => self.type_ref.len(),
            TableId::TypeDef => self.type_def.len(),
            TableId::Field => self.field.len(),
            TableId::MethodDef => self.method_def.len(),
            TableId::Param => self.param.len(),
            TableId::InterfaceImpl => self.interface_impl.len(),
            TableId::MemberRef => self.member_ref.len(),
            TableId::Constant => self.constant.len(),
            TableId::CustomAttribute => self.custom_attribute.len(),
            TableId::FieldMarshal => self.field_marshal.len(),
            TableId::DeclSecurity => self.decl_security.len(),
            TableId::ClassLayout => self.class_layout.len(),
            TableId::FieldLayout => self.field_layout.len(),
            TableId::StandAloneSig => self.stand_alone_sig.len(),
            TableId::EventMap => self.event_map.len(),
            TableId::Event => self.event.len(),
            TableId::PropertyMap => self.property_map.len(),
            TableId::Property => self.property.len(),
            TableId::MethodSemantics => self.method_semantics.len(),
            TableId::MethodImpl => self.method_impl.len(),
            TableId::ModuleRef => self.module_ref.len(),
            TableId::TypeSpec => self.type_spec.len(),
            TableId::ImplMap => self.impl_map.len(),
            TableId::FieldRVA => self.field_rva.len(),
            TableId::Assembly => self.assembly.len(),
            TableId::AssemblyRef => self.assembly_ref.len(),
            TableId::File => self.file.len(),
            TableId::ExportedType => self.exported_type.len(),
            TableId::ManifestResource => self.manifest_resource.len(),
            TableId::NestedClass => self.nested_class.len(),
            TableId::GenericParam => self.generic_param.len(),
            TableId::MethodSpec => self.method_spec.len(),
            TableId::GenericParamConstraint => self.generic_param_constraint.len(),
        };
        count as u32
    }

    /// Whether `index` refers to an existing row.
    #[must_use]
    pub fn contains(&self, index: TableIndex) -> bool {
        index.row < self.row_count(index.table)
    }

    /// Validates that `index` refers to an existing row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexOutOfRange`] when the row does not exist.
    pub fn bounds_check(&self, index: TableIndex) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(crate::Error::IndexOutOfRange(index))
        }
    }

    /// Returns the contiguous Field range owned by TypeDef row `type_def`.
    ///
    /// The range runs from the row's stored start to the next row's start, or
    /// to the end of the Field table for the last TypeDef.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexOutOfRange`] for a nonexistent TypeDef row
    /// and [`crate::Error::Malformed`] when the stored starts are inconsistent
    /// (a descending or out-of-table range).
    pub fn fields_of(&self, type_def: u32) -> Result<Range<u32>> {
        let starts: Vec<u32> = self.type_def.iter().map(|row| row.field_list).collect();
        child_range(&starts, type_def, self.field.len() as u32, TableId::TypeDef)
    }

    /// Returns the contiguous MethodDef range owned by TypeDef row `type_def`.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::fields_of`].
    pub fn methods_of(&self, type_def: u32) -> Result<Range<u32>> {
        let starts: Vec<u32> = self.type_def.iter().map(|row| row.method_list).collect();
        child_range(
            &starts,
            type_def,
            self.method_def.len() as u32,
            TableId::TypeDef,
        )
    }

    /// Returns the contiguous Param range owned by MethodDef row `method_def`.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::fields_of`].
    pub fn params_of(&self, method_def: u32) -> Result<Range<u32>> {
        let starts: Vec<u32> = self.method_def.iter().map(|row| row.param_list).collect();
        child_range(
            &starts,
            method_def,
            self.param.len() as u32,
            TableId::MethodDef,
        )
    }

    /// Returns the contiguous Event range owned by EventMap row `event_map`.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::fields_of`].
    pub fn events_of(&self, event_map: u32) -> Result<Range<u32>> {
        let starts: Vec<u32> = self.event_map.iter().map(|row| row.event_list).collect();
        child_range(
            &starts,
            event_map,
            self.event.len() as u32,
            TableId::EventMap,
        )
    }

    /// Returns the contiguous Property range owned by PropertyMap row
    /// `property_map`.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::fields_of`].
    pub fn properties_of(&self, property_map: u32) -> Result<Range<u32>> {
        let starts: Vec<u32> = self
            .property_map
            .iter()
            .map(|row| row.property_list)
            .collect();
        child_range(
            &starts,
            property_map,
            self.property.len() as u32,
            TableId::PropertyMap,
        )
    }
}

/// Computes the child range implied by a list of range-start indices.
///
/// `starts[owner]` is the first child; the range ends at `starts[owner + 1]`
/// or at `table_len` for the last owner.
fn child_range(
    starts: &[u32],
    owner: u32,
    table_len: u32,
    owner_table: TableId,
) -> Result<Range<u32>> {
    let Some(&start) = starts.get(owner as usize) else {
        return Err(crate::Error::IndexOutOfRange(TableIndex::new(
            owner_table,
            owner,
        )));
    };

    let end = starts.get(owner as usize + 1).copied().unwrap_or(table_len);
    if start > end || end > table_len {
        return Err(malformed_error!(
            "{:?} row {} implies an invalid child range {}..{} (table length {})",
            owner_table,
            owner,
            start,
            end,
            table_len
        ));
    }

    Ok(start..end)
}
