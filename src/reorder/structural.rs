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

//! Structural reorder: nested-type ordering and contiguous child ranges.
//!
//! Repairs TypeDef order so every enclosing type precedes its nested types,
//! re-homing the Field, MethodDef and Param tables into the contiguous ranges
//! the new order implies. Afterwards, PropertyMap and EventMap rows sharing a
//! parent are merged and their child ranges re-concatenated, so each owning
//! type appears at most once per map table.

use std::collections::VecDeque;
use std::ops::Range;

use crate::{
    metadata::tables::{TableCollection, TableId, TableIndex},
    reorder::map::ReorderMap,
    Result,
};

pub(crate) fn run(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    if nested_order_violated(tables) {
        restructure_type_defs(tables, map)?;
    }
    merge_event_maps(tables, map)?;
    merge_property_maps(tables, map)?;
    Ok(())
}

/// Whether any nested type currently precedes its enclosing type.
fn nested_order_violated(tables: &TableCollection) -> bool {
    tables
        .nested_class
        .iter()
        .any(|row| row.nested_class.row < row.enclosing_class.row)
}

/// Rebuilds TypeDef in enclosing-before-nested order and re-homes the child
/// tables that hang off it.
fn restructure_type_defs(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    let type_count = tables.type_def.len();

    // Child counts must be captured from the range starts before any row
    // moves.
    let field_starts: Vec<u32> = tables.type_def.iter().map(|row| row.field_list).collect();
    let method_starts: Vec<u32> = tables.type_def.iter().map(|row| row.method_list).collect();
    let field_ranges = range_partition(&field_starts, tables.field.len() as u32, TableId::TypeDef)?;
    let method_ranges =
        range_partition(&method_starts, tables.method_def.len() as u32, TableId::TypeDef)?;

    let param_starts: Vec<u32> = tables.method_def.iter().map(|row| row.param_list).collect();
    let param_ranges =
        range_partition(&param_starts, tables.param.len() as u32, TableId::MethodDef)?;

    // Enclosing-to-nested adjacency from the NestedClass table. A nested
    // type has exactly one enclosing class; a repeated nested index is
    // malformed input, not a cycle.
    let mut children: Vec<Vec<u32>> = vec![Vec::new(); type_count];
    let mut is_nested = vec![false; type_count];
    for row in &tables.nested_class {
        tables.bounds_check(row.nested_class)?;
        tables.bounds_check(row.enclosing_class)?;
        if is_nested[row.nested_class.row as usize] {
            return Err(malformed_error!(
                "TypeDef row {} has multiple enclosing classes",
                row.nested_class.row
            ));
        }
        children[row.enclosing_class.row as usize].push(row.nested_class.row);
        is_nested[row.nested_class.row as usize] = true;
    }

    // Walk original order; each non-nested type roots a breadth-first
    // emission of its nested descendants. Parent pointers are unique, so
    // the walk never revisits a type.
    let mut placed: Vec<u32> = Vec::with_capacity(type_count);
    let mut visited = vec![false; type_count];
    for root in 0..type_count as u32 {
        if is_nested[root as usize] {
            continue;
        }
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            visited[current as usize] = true;
            placed.push(current);
            for &child in &children[current as usize] {
                queue.push_back(child);
            }
        }
    }
    if placed.len() != type_count {
        // Every unplaced type sits on an enclosing-chain cycle, unreachable
        // from any non-nested root.
        let orphan = (0..type_count as u32)
            .find(|&i| !visited[i as usize])
            .unwrap_or(0);
        return Err(crate::Error::ReferenceCycle(TableIndex::new(
            TableId::TypeDef,
            orphan,
        )));
    }

    let mut type_perm = vec![0u32; type_count];
    for (new_pos, &orig) in placed.iter().enumerate() {
        type_perm[orig as usize] = new_pos as u32;
    }

    // Re-home Field and MethodDef into the contiguous ranges the new TypeDef
    // order implies, recording child permutations as ranges are laid out.
    let mut field_perm = vec![0u32; tables.field.len()];
    let mut method_perm = vec![0u32; tables.method_def.len()];
    let mut method_order: Vec<u32> = Vec::with_capacity(tables.method_def.len());
    let mut new_type_defs = Vec::with_capacity(type_count);
    let mut next_field = 0u32;
    let mut next_method = 0u32;
    for &orig in &placed {
        let mut row = tables.type_def[orig as usize].clone();
        row.field_list = next_field;
        row.method_list = next_method;
        for field in field_ranges[orig as usize].clone() {
            field_perm[field as usize] = next_field;
            next_field += 1;
        }
        for method in method_ranges[orig as usize].clone() {
            method_perm[method as usize] = next_method;
            method_order.push(method);
            next_method += 1;
        }
        new_type_defs.push(row);
    }
    tables.type_def = new_type_defs;
    tables.field = permute(std::mem::take(&mut tables.field), &field_perm);

    // Params follow their methods.
    let mut param_perm = vec![0u32; tables.param.len()];
    let mut new_methods = Vec::with_capacity(tables.method_def.len());
    let mut next_param = 0u32;
    for &orig in &method_order {
        let mut row = tables.method_def[orig as usize].clone();
        row.param_list = next_param;
        for param in param_ranges[orig as usize].clone() {
            param_perm[param as usize] = next_param;
            next_param += 1;
        }
        new_methods.push(row);
    }
    tables.method_def = new_methods;
    tables.param = permute(std::mem::take(&mut tables.param), &param_perm);

    // NestedClass and the map tables point at TypeDef rows that just moved.
    for row in &mut tables.nested_class {
        row.nested_class.row = type_perm[row.nested_class.row as usize];
        row.enclosing_class.row = type_perm[row.enclosing_class.row as usize];
    }
    for row in &mut tables.event_map {
        tables_check_type_def(type_perm.len(), row.parent)?;
        row.parent.row = type_perm[row.parent.row as usize];
    }
    for row in &mut tables.property_map {
        tables_check_type_def(type_perm.len(), row.parent)?;
        row.parent.row = type_perm[row.parent.row as usize];
    }

    map.apply_permutation(TableId::TypeDef, &type_perm);
    map.apply_permutation(TableId::Field, &field_perm);
    map.apply_permutation(TableId::MethodDef, &method_perm);
    map.apply_permutation(TableId::Param, &param_perm);
    Ok(())
}

fn tables_check_type_def(type_count: usize, parent: TableIndex) -> Result<()> {
    if (parent.row as usize) < type_count {
        Ok(())
    } else {
        Err(crate::Error::IndexOutOfRange(parent))
    }
}

fn merge_event_maps(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    let starts: Vec<u32> = tables.event_map.iter().map(|row| row.event_list).collect();
    let ranges = range_partition(&starts, tables.event.len() as u32, TableId::EventMap)?;
    let parents: Vec<TableIndex> = tables.event_map.iter().map(|row| row.parent).collect();

    let Some(merge) = merge_map_parents(&parents, &ranges) else {
        return Ok(());
    };

    let mut new_map_rows = Vec::new();
    for (current, row) in tables.event_map.iter().enumerate() {
        if merge.merged_into[current].is_none() {
            let mut row = row.clone();
            row.event_list = merge.new_starts[new_map_rows.len()];
            new_map_rows.push(row);
        }
    }
    tables.event_map = new_map_rows;
    tables.event = permute(std::mem::take(&mut tables.event), &merge.child_perm);

    map.apply_merges(TableId::EventMap, &merge.merged_into);
    map.apply_permutation(TableId::Event, &merge.child_perm);
    Ok(())
}

fn merge_property_maps(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    let starts: Vec<u32> = tables
        .property_map
        .iter()
        .map(|row| row.property_list)
        .collect();
    let ranges = range_partition(&starts, tables.property.len() as u32, TableId::PropertyMap)?;
    let parents: Vec<TableIndex> = tables.property_map.iter().map(|row| row.parent).collect();

    let Some(merge) = merge_map_parents(&parents, &ranges) else {
        return Ok(());
    };

    let mut new_map_rows = Vec::new();
    for (current, row) in tables.property_map.iter().enumerate() {
        if merge.merged_into[current].is_none() {
            let mut row = row.clone();
            row.property_list = merge.new_starts[new_map_rows.len()];
            new_map_rows.push(row);
        }
    }
    tables.property_map = new_map_rows;
    tables.property = permute(std::mem::take(&mut tables.property), &merge.child_perm);

    map.apply_merges(TableId::PropertyMap, &merge.merged_into);
    map.apply_permutation(TableId::Property, &merge.child_perm);
    Ok(())
}

struct MapMerge {
    /// Per current map row: `Some(first_row_with_same_parent)` for duplicates.
    merged_into: Vec<Option<u32>>,
    /// New child-range start per surviving map row, in surviving order.
    new_starts: Vec<u32>,
    /// Child-table permutation implied by re-concatenating the ranges.
    child_perm: Vec<u32>,
}

/// Plans the merge of map rows sharing a parent.
///
/// Duplicate parents keep their first-seen row; the duplicates' child ranges
/// are appended after the first row's range, in map-row order. Returns `None`
/// when no parent repeats and the layout already stands.
fn merge_map_parents(parents: &[TableIndex], ranges: &[Range<u32>]) -> Option<MapMerge> {
    let mut first_of_parent: Vec<(TableIndex, u32)> = Vec::new();
    let mut merged_into: Vec<Option<u32>> = Vec::with_capacity(parents.len());
    // Ranges to concatenate, grouped under each surviving row.
    let mut grouped: Vec<Vec<Range<u32>>> = Vec::new();

    for (current, parent) in parents.iter().enumerate() {
        match first_of_parent.iter().find(|(p, _)| p == parent) {
            Some(&(_, first)) => {
                merged_into.push(Some(first));
                let group = first_of_parent.iter().position(|(p, _)| p == parent);
                if let Some(group) = group {
                    grouped[group].push(ranges[current].clone());
                }
            }
            None => {
                first_of_parent.push((*parent, current as u32));
                merged_into.push(None);
                grouped.push(vec![ranges[current].clone()]);
            }
        }
    }

    if merged_into.iter().all(Option::is_none) {
        return None;
    }

    let child_count: u32 = ranges.iter().map(|r| r.end - r.start).sum();
    let mut child_perm = vec![0u32; child_count as usize];
    let mut new_starts = Vec::with_capacity(grouped.len());
    let mut next_child = 0u32;
    for group in &grouped {
        new_starts.push(next_child);
        for range in group {
            for child in range.clone() {
                child_perm[child as usize] = next_child;
                next_child += 1;
            }
        }
    }

    Some(MapMerge {
        merged_into,
        new_starts,
        child_perm,
    })
}

/// Splits a non-decreasing list of range starts into per-owner child ranges.
fn range_partition(starts: &[u32], table_len: u32, owner_table: TableId) -> Result<Vec<Range<u32>>> {
    let mut ranges = Vec::with_capacity(starts.len());
    for (owner, &start) in starts.iter().enumerate() {
        let end = starts.get(owner + 1).copied().unwrap_or(table_len);
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
        ranges.push(start..end);
    }
    Ok(ranges)
}

/// Rebuilds a row list under `perm`, where `perm[current] = new position`.
pub(crate) fn permute<T>(rows: Vec<T>, perm: &[u32]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = rows.into_iter().map(Some).collect();
    let mut out: Vec<Option<T>> = (0..slots.len()).map(|_| None).collect();
    for (current, slot) in slots.iter_mut().enumerate() {
        out[perm[current] as usize] = slot.take();
    }
    out.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{
        EventMapRow, EventRow, NestedClassRow, PropertyMapRow, TypeDefRow,
    };
    use crate::reorder::map::RowDisposition;

    fn type_def(name: &str) -> TypeDefRow {
        TypeDefRow {
            flags: 0,
            name: name.to_string(),
            namespace: String::new(),
            extends: None,
            field_list: 0,
            method_list: 0,
        }
    }

    #[test]
    fn test_nested_before_enclosing_reorders() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("A"));
        tables.type_def.push(type_def("B"));
        tables.type_def.push(type_def("C"));
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 0),
            enclosing_class: TableIndex::new(TableId::TypeDef, 1),
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();

        assert_eq!(tables.type_def[0].name, "B");
        assert_eq!(tables.type_def[1].name, "A");
        assert_eq!(tables.type_def[2].name, "C");
        assert_eq!(map.table(TableId::TypeDef)[0], RowDisposition::Moved(1));
        assert_eq!(map.table(TableId::TypeDef)[1], RowDisposition::Moved(0));
        assert_eq!(map.table(TableId::TypeDef)[2], RowDisposition::Moved(2));

        let row = &tables.nested_class[0];
        assert!(row.enclosing_class.row < row.nested_class.row);
    }

    #[test]
    fn test_already_ordered_is_identity() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("Outer"));
        tables.type_def.push(type_def("Inner"));
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 1),
            enclosing_class: TableIndex::new(TableId::TypeDef, 0),
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        assert!(map.is_identity());
        assert_eq!(tables.type_def[0].name, "Outer");
    }

    #[test]
    fn test_nesting_cycle_is_an_error() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("A"));
        tables.type_def.push(type_def("B"));
        // A encloses B and B encloses A.
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 0),
            enclosing_class: TableIndex::new(TableId::TypeDef, 1),
        });
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 1),
            enclosing_class: TableIndex::new(TableId::TypeDef, 0),
        });

        let mut map = ReorderMap::identity(&tables);
        assert!(matches!(
            run(&mut tables, &mut map),
            Err(crate::Error::ReferenceCycle(_))
        ));
    }

    #[test]
    fn test_multiple_enclosing_classes_is_malformed() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("A"));
        tables.type_def.push(type_def("B"));
        tables.type_def.push(type_def("C"));
        // A claims to be nested in both B and C.
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 0),
            enclosing_class: TableIndex::new(TableId::TypeDef, 1),
        });
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 0),
            enclosing_class: TableIndex::new(TableId::TypeDef, 2),
        });

        let mut map = ReorderMap::identity(&tables);
        assert!(matches!(
            run(&mut tables, &mut map),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_duplicate_event_map_parents_merge() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("T"));
        for name in ["E0", "E1", "E2"] {
            tables.event.push(EventRow {
                flags: 0,
                name: name.to_string(),
                event_type: None,
            });
        }
        // Same parent mapped twice: rows 0..1 and 1..3.
        tables.event_map.push(EventMapRow {
            parent: TableIndex::new(TableId::TypeDef, 0),
            event_list: 0,
        });
        tables.event_map.push(EventMapRow {
            parent: TableIndex::new(TableId::TypeDef, 0),
            event_list: 1,
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();

        assert_eq!(tables.event_map.len(), 1);
        assert_eq!(tables.event_map[0].event_list, 0);
        assert_eq!(map.table(TableId::EventMap)[1], RowDisposition::Merged(0));
        // Children keep their concatenated order.
        let names: Vec<&str> = tables.event.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["E0", "E1", "E2"]);
    }

    #[test]
    fn test_distinct_property_map_parents_untouched() {
        let mut tables = TableCollection::new();
        tables.type_def.push(type_def("A"));
        tables.type_def.push(type_def("B"));
        tables.property_map.push(PropertyMapRow {
            parent: TableIndex::new(TableId::TypeDef, 0),
            property_list: 0,
        });
        tables.property_map.push(PropertyMapRow {
            parent: TableIndex::new(TableId::TypeDef, 1),
            property_list: 0,
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();
        assert_eq!(tables.property_map.len(), 2);
        assert!(map.is_identity());
    }

    #[test]
    fn test_child_tables_follow_type_order() {
        let mut tables = TableCollection::new();
        // Types [A, B] with B enclosing A; fields A:[f0], B:[f1 f2].
        let mut a = type_def("A");
        a.field_list = 0;
        let mut b = type_def("B");
        b.field_list = 1;
        tables.type_def.push(a);
        tables.type_def.push(b);
        for name in ["f0", "f1", "f2"] {
            tables.field.push(crate::metadata::tables::FieldRow {
                flags: 0,
                name: name.to_string(),
                signature: Default::default(),
            });
        }
        tables.nested_class.push(NestedClassRow {
            nested_class: TableIndex::new(TableId::TypeDef, 0),
            enclosing_class: TableIndex::new(TableId::TypeDef, 1),
        });

        let mut map = ReorderMap::identity(&tables);
        run(&mut tables, &mut map).unwrap();

        // New order [B, A]; B's fields first.
        let names: Vec<&str> = tables.field.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f1", "f2", "f0"]);
        assert_eq!(tables.type_def[0].field_list, 0);
        assert_eq!(tables.type_def[1].field_list, 2);
        assert_eq!(map.table(TableId::Field)[0], RowDisposition::Moved(2));
    }
}
