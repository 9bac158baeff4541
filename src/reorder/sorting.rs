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

//! Final foreign-key rewrite and canonical sort of the remaining tables.
//!
//! Every simple (non-signature) foreign key still carrying an original row
//! position is rewritten exactly once through the finished dispositions of
//! the earlier phases, then each table with a canonical order is stable-sorted
//! and the sort recorded. InterfaceImpl additionally drops value-equal rows
//! after its sort. CustomAttribute goes last: its parent may reference nearly
//! any table, including ones this pass itself permutes.

use crate::{
    metadata::tables::{TableCollection, TableId},
    reorder::{
        dedup::{dedup_in_place, record_merges},
        map::ReorderMap,
        structural::permute,
    },
    Result,
};

pub(crate) fn run(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    // Unsorted tables with foreign keys to rewrite.
    for row in &mut tables.type_def {
        if let Some(extends) = row.extends {
            row.extends = Some(map.final_index(extends)?);
        }
    }
    for row in &mut tables.event {
        if let Some(event_type) = row.event_type {
            row.event_type = Some(map.final_index(event_type)?);
        }
    }
    for row in &mut tables.exported_type {
        row.implementation = map.final_index(row.implementation)?;
    }
    for row in &mut tables.manifest_resource {
        if let Some(implementation) = row.implementation {
            row.implementation = Some(map.final_index(implementation)?);
        }
    }

    for row in &mut tables.interface_impl {
        row.class = map.final_index(row.class)?;
        row.interface = map.final_index(row.interface)?;
    }
    sort_rows(&mut tables.interface_impl, map, TableId::InterfaceImpl, |row| {
        (row.class.coded_key(), row.interface.coded_key())
    });
    // Value-equal pairs sit adjacent after the sort; keep the first.
    let merged = dedup_in_place(&mut tables.interface_impl, |row| (row.class, row.interface));
    record_merges(map, TableId::InterfaceImpl, &merged);

    for row in &mut tables.constant {
        row.parent = map.final_index(row.parent)?;
    }
    sort_rows(&mut tables.constant, map, TableId::Constant, |row| {
        row.parent.coded_key()
    });

    for row in &mut tables.field_marshal {
        row.parent = map.final_index(row.parent)?;
    }
    sort_rows(&mut tables.field_marshal, map, TableId::FieldMarshal, |row| {
        row.parent.coded_key()
    });

    for row in &mut tables.decl_security {
        row.parent = map.final_index(row.parent)?;
    }
    sort_rows(&mut tables.decl_security, map, TableId::DeclSecurity, |row| {
        row.parent.coded_key()
    });

    for row in &mut tables.class_layout {
        row.parent = map.final_index(row.parent)?;
    }
    sort_rows(&mut tables.class_layout, map, TableId::ClassLayout, |row| {
        row.parent.row
    });

    for row in &mut tables.field_layout {
        row.field = map.final_index(row.field)?;
    }
    sort_rows(&mut tables.field_layout, map, TableId::FieldLayout, |row| {
        row.field.row
    });

    for row in &mut tables.method_semantics {
        row.method = map.final_index(row.method)?;
        row.association = map.final_index(row.association)?;
    }
    sort_rows(
        &mut tables.method_semantics,
        map,
        TableId::MethodSemantics,
        |row| row.association.coded_key(),
    );

    for row in &mut tables.method_impl {
        row.class = map.final_index(row.class)?;
        row.method_body = map.final_index(row.method_body)?;
        row.method_declaration = map.final_index(row.method_declaration)?;
    }
    sort_rows(&mut tables.method_impl, map, TableId::MethodImpl, |row| {
        row.class.row
    });

    for row in &mut tables.impl_map {
        row.member_forwarded = map.final_index(row.member_forwarded)?;
        row.import_scope = map.final_index(row.import_scope)?;
    }
    sort_rows(&mut tables.impl_map, map, TableId::ImplMap, |row| {
        row.member_forwarded.coded_key()
    });

    for row in &mut tables.field_rva {
        row.field = map.final_index(row.field)?;
    }
    sort_rows(&mut tables.field_rva, map, TableId::FieldRVA, |row| {
        row.field.row
    });

    // NestedClass references were already moved to final TypeDef positions by
    // the structural phase; only the ordering remains.
    sort_rows(&mut tables.nested_class, map, TableId::NestedClass, |row| {
        row.nested_class.row
    });

    // GenericParam must reach its final order before anything pointing into
    // it is rewritten.
    for row in &mut tables.generic_param {
        row.owner = map.final_index(row.owner)?;
    }
    sort_rows(&mut tables.generic_param, map, TableId::GenericParam, |row| {
        (row.owner.coded_key(), row.number)
    });

    for row in &mut tables.generic_param_constraint {
        row.owner = map.final_index(row.owner)?;
        row.constraint = map.final_index(row.constraint)?;
    }
    sort_rows(
        &mut tables.generic_param_constraint,
        map,
        TableId::GenericParamConstraint,
        |row| row.owner.row,
    );

    for row in &mut tables.custom_attribute {
        row.parent = map.final_index(row.parent)?;
        row.constructor = map.final_index(row.constructor)?;
    }
    sort_rows(
        &mut tables.custom_attribute,
        map,
        TableId::CustomAttribute,
        |row| row.parent.coded_key(),
    );

    Ok(())
}

/// Stable-sorts a table by `key_of` and records the permutation.
///
/// Ties keep their current relative order. An already-sorted table leaves the
/// dispositions untouched.
fn sort_rows<T, K, F>(rows: &mut Vec<T>, map: &mut ReorderMap, table: TableId, key_of: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut order: Vec<u32> = (0..rows.len() as u32).collect();
    order.sort_by_key(|&current| key_of(&rows[current as usize]));

    let mut perm = vec![0u32; rows.len()];
    let mut identity = true;
    for (new_pos, &current) in order.iter().enumerate() {
        perm[current as usize] = new_pos as u32;
        identity &= current as usize == new_pos;
    }
    if identity {
        return;
    }

    *rows = permute(std::mem::take(rows), &perm);
    map.apply_permutation(table, &perm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{
        ConstantRow, CustomAttributeRow, GenericParamRow, InterfaceImplRow, TableIndex,
        TypeDefRow,
    };
    use crate::reorder::map::RowDisposition;

    fn type_defs(tables: &mut TableCollection, count: u32) {
        for i in 0..count {
            tables.type_def.push(TypeDefRow {
                flags: 0,
                name: format!("T{i}"),
                namespace: String::new(),
                extends: None,
                field_list: 0,
                method_list: 0,
            });
        }
    }

    #[test]
    fn test_interface_impl_sorts_and_dedups() {
        let mut tables = TableCollection::new();
        type_defs(&mut tables, 3);
        let pair = |class, interface| InterfaceImplRow {
            class: TableIndex::new(TableId::TypeDef, class),
            interface: TableIndex::new(TableId::TypeDef, interface),
        };
        tables.interface_impl.push(pair(2, 0));
        tables.interface_impl.push(pair(1, 0));
        tables.interface_impl.push(pair(2, 0));

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();

        assert_eq!(tables.interface_impl.len(), 2);
        assert_eq!(tables.interface_impl[0].class.row, 1);
        assert_eq!(tables.interface_impl[1].class.row, 2);
        assert_eq!(
            map.table(TableId::InterfaceImpl)[0],
            RowDisposition::Moved(1)
        );
        assert_eq!(
            map.table(TableId::InterfaceImpl)[1],
            RowDisposition::Moved(0)
        );
        assert_eq!(
            map.table(TableId::InterfaceImpl)[2],
            RowDisposition::Merged(1)
        );
    }

    #[test]
    fn test_constant_sorts_by_parent() {
        let mut tables = TableCollection::new();
        for i in 0..4 {
            tables.param.push(crate::metadata::tables::ParamRow {
                flags: 0,
                sequence: i,
                name: String::new(),
            });
        }
        tables.constant.push(ConstantRow {
            const_type: 0x08,
            parent: TableIndex::new(TableId::Param, 3),
            value: vec![1],
        });
        tables.constant.push(ConstantRow {
            const_type: 0x08,
            parent: TableIndex::new(TableId::Param, 1),
            value: vec![2],
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        assert_eq!(tables.constant[0].parent.row, 1);
        assert_eq!(map.table(TableId::Constant)[0], RowDisposition::Moved(1));
    }

    #[test]
    fn test_generic_param_sorts_by_owner_then_number() {
        let mut tables = TableCollection::new();
        type_defs(&mut tables, 2);
        let param = |owner: u32, number: u16, name: &str| GenericParamRow {
            number,
            flags: 0,
            owner: TableIndex::new(TableId::TypeDef, owner),
            name: name.to_string(),
        };
        tables.generic_param.push(param(1, 0, "U"));
        tables.generic_param.push(param(0, 1, "T2"));
        tables.generic_param.push(param(0, 0, "T1"));

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        let names: Vec<&str> = tables.generic_param.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["T1", "T2", "U"]);
    }

    #[test]
    fn test_custom_attribute_parent_follows_sorted_target() {
        let mut tables = TableCollection::new();
        type_defs(&mut tables, 2);
        tables.generic_param.push(GenericParamRow {
            number: 0,
            flags: 0,
            owner: TableIndex::new(TableId::TypeDef, 1),
            name: "U".to_string(),
        });
        tables.generic_param.push(GenericParamRow {
            number: 0,
            flags: 0,
            owner: TableIndex::new(TableId::TypeDef, 0),
            name: "T".to_string(),
        });
        // Attribute on the generic parameter that moves from row 0 to row 1.
        tables.custom_attribute.push(CustomAttributeRow {
            parent: TableIndex::new(TableId::GenericParam, 0),
            constructor: TableIndex::new(TableId::MemberRef, 0),
            value: Vec::new(),
        });
        tables.member_ref.push(crate::metadata::tables::MemberRefRow {
            class: TableIndex::new(TableId::TypeDef, 0),
            name: ".ctor".to_string(),
            signature: crate::metadata::tables::MemberRefSignature::Method(Default::default()),
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        assert_eq!(
            tables.custom_attribute[0].parent,
            TableIndex::new(TableId::GenericParam, 1)
        );
    }

    #[test]
    fn test_sorted_input_is_identity() {
        let mut tables = TableCollection::new();
        type_defs(&mut tables, 2);
        tables.interface_impl.push(InterfaceImplRow {
            class: TableIndex::new(TableId::TypeDef, 0),
            interface: TableIndex::new(TableId::TypeDef, 1),
        });
        tables.interface_impl.push(InterfaceImplRow {
            class: TableIndex::new(TableId::TypeDef, 1),
            interface: TableIndex::new(TableId::TypeDef, 0),
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        assert!(map.is_identity());
    }
}
