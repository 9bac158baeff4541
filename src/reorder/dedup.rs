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

//! Duplicate elimination with reference rewrite.
//!
//! Tables are processed in dependency order so that every reference a later
//! table carries points at already-finalized rows: AssemblyRef and ModuleRef
//! first, then TypeRef (whose resolution scopes may chain through other
//! TypeRef rows), then TypeSpec (whose signatures may nest other TypeSpec
//! rows), then a sweep rewriting every remaining signature, then MemberRef,
//! MethodSpec and StandAloneSig, and finally the IL streams, whose exception
//! handlers are also put in inner-before-outer order. After this pass no
//! signature or IL operand needs further fixing.

use std::collections::HashMap;
use std::hash::Hash;

use crate::{
    metadata::{
        method::Operand,
        signatures::visit::{
            visit_field_indices_mut, visit_locals_indices_mut, visit_method_indices_mut,
            visit_method_spec_indices_mut, visit_property_indices_mut, visit_type_indices_mut,
        },
        tables::{
            MemberRefSignature, StandAloneSignature, TableCollection, TableId, TableIndex,
            TypeRefRow, TypeSpecRow,
        },
    },
    reorder::map::{compact, ReorderMap, Slot},
    Result,
};

pub(crate) fn run(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    let merged = dedup_in_place(&mut tables.assembly_ref, |row| row.identity());
    record_merges(map, TableId::AssemblyRef, &merged);

    let merged = dedup_in_place(&mut tables.module_ref, Clone::clone);
    record_merges(map, TableId::ModuleRef, &merged);

    dedup_type_refs(tables, map)?;
    dedup_type_specs(tables, map)?;
    rewrite_signatures(tables, map)?;

    for row in &mut tables.member_ref {
        row.class = map.final_index(row.class)?;
    }
    let merged = dedup_in_place(&mut tables.member_ref, |row| {
        (row.class, row.name.clone(), row.signature.clone())
    });
    record_merges(map, TableId::MemberRef, &merged);

    for row in &mut tables.method_spec {
        row.method = map.final_index(row.method)?;
    }
    let merged = dedup_in_place(&mut tables.method_spec, |row| {
        (row.method, row.instantiation.clone())
    });
    record_merges(map, TableId::MethodSpec, &merged);

    // Duplicate standalone signatures are legal but pointless; collapse them.
    let merged = dedup_in_place(&mut tables.stand_alone_sig, |row| row.signature.clone());
    record_merges(map, TableId::StandAloneSig, &merged);

    rewrite_il(tables, map)
}

/// Marks later value-equal rows as merged into the first occurrence and
/// compacts the list, returning the merge vector in pre-compaction space.
pub(crate) fn dedup_in_place<T, K, F>(rows: &mut Vec<T>, key_of: F) -> Vec<Option<u32>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashMap<K, u32> = HashMap::new();
    let mut slots: Vec<Slot<T>> = Vec::with_capacity(rows.len());
    for (current, row) in std::mem::take(rows).into_iter().enumerate() {
        match seen.get(&key_of(&row)) {
            Some(&first) => slots.push(Slot::Merged(first)),
            None => {
                seen.insert(key_of(&row), current as u32);
                slots.push(Slot::Active(row));
            }
        }
    }
    let (kept, merged_into) = compact(slots);
    *rows = kept;
    merged_into
}

pub(crate) fn record_merges(map: &mut ReorderMap, table: TableId, merged_into: &[Option<u32>]) {
    if merged_into.iter().any(Option::is_some) {
        map.apply_merges(table, merged_into);
    }
}

/// Deduplicates TypeRef after rewriting resolution scopes.
///
/// A scope that is itself a TypeRef (nested-type resolution) must be
/// finalized before its dependents, so rows are first arranged so every
/// TypeRef scope points backward; a scope chain that revisits a row is a
/// cycle and is rejected.
fn dedup_type_refs(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    let rows = std::mem::take(&mut tables.type_ref);
    let count = rows.len();

    // Every row has at most one outgoing edge, so topological order falls
    // out of walking each scope chain and emitting it deepest-first.
    const UNVISITED: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;
    let mut state = vec![UNVISITED; count];
    let mut order: Vec<u32> = Vec::with_capacity(count);
    for root in 0..count as u32 {
        if state[root as usize] == DONE {
            continue;
        }
        let mut path = Vec::new();
        let mut current = root;
        loop {
            if state[current as usize] == ON_PATH {
                return Err(crate::Error::ReferenceCycle(TableIndex::new(
                    TableId::TypeRef,
                    current,
                )));
            }
            state[current as usize] = ON_PATH;
            path.push(current);

            match rows[current as usize].resolution_scope {
                Some(scope) if scope.table == TableId::TypeRef => {
                    if scope.row as usize >= count {
                        return Err(crate::Error::IndexOutOfRange(scope));
                    }
                    if state[scope.row as usize] == DONE {
                        break;
                    }
                    current = scope.row;
                }
                _ => break,
            }
        }
        for node in path.into_iter().rev() {
            state[node as usize] = DONE;
            order.push(node);
        }
    }

    let mut topo_of_orig = vec![0u32; count];
    for (topo, &orig) in order.iter().enumerate() {
        topo_of_orig[orig as usize] = topo as u32;
    }

    // Scan in dependency order, rewriting each scope as the row is placed
    // and collapsing rows that become value-equal.
    let mut final_of_topo = vec![0u32; count];
    let mut merged_into = vec![None; count];
    let mut seen: HashMap<(Option<TableIndex>, String, String), (u32, u32)> = HashMap::new();
    let mut kept: Vec<TypeRefRow> = Vec::new();
    for (topo, &orig) in order.iter().enumerate() {
        let mut row = rows[orig as usize].clone();
        if let Some(scope) = row.resolution_scope.as_mut() {
            if scope.table == TableId::TypeRef {
                scope.row = final_of_topo[topo_of_orig[scope.row as usize] as usize];
            } else {
                *scope = map.final_index(*scope)?;
            }
        }

        let key = (row.resolution_scope, row.name.clone(), row.namespace.clone());
        match seen.get(&key) {
            Some(&(first_topo, final_row)) => {
                merged_into[topo] = Some(first_topo);
                final_of_topo[topo] = final_row;
            }
            None => {
                let final_row = kept.len() as u32;
                seen.insert(key, (topo as u32, final_row));
                final_of_topo[topo] = final_row;
                kept.push(row);
            }
        }
    }

    tables.type_ref = kept;
    map.apply_permutation(TableId::TypeRef, &topo_of_orig);
    record_merges(map, TableId::TypeRef, &merged_into);
    Ok(())
}

/// Deduplicates TypeSpec after rewriting signature-embedded references.
///
/// Rows are visited in dependency order over direct TypeSpec-to-TypeSpec
/// signature references (depth-first, referenced rows first) so a nested
/// reference can be rewritten to its final position in the same pass. A
/// recursive instantiation chain that loops back on itself is rejected.
fn dedup_type_specs(tables: &mut TableCollection, map: &mut ReorderMap) -> Result<()> {
    use crate::metadata::signatures::visit::collect_type_indices;

    let rows = std::mem::take(&mut tables.type_spec);
    let count = rows.len();

    let mut references: Vec<Vec<u32>> = Vec::with_capacity(count);
    for row in &rows {
        let mut direct = Vec::new();
        for index in collect_type_indices(&row.signature) {
            if index.table == TableId::TypeSpec {
                if index.row as usize >= count {
                    return Err(crate::Error::IndexOutOfRange(index));
                }
                direct.push(index.row);
            }
        }
        references.push(direct);
    }

    const UNVISITED: u8 = 0;
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;
    let mut state = vec![UNVISITED; count];
    let mut order: Vec<u32> = Vec::with_capacity(count);
    for root in 0..count as u32 {
        if state[root as usize] != UNVISITED {
            continue;
        }
        state[root as usize] = ON_STACK;
        let mut stack: Vec<(u32, usize)> = vec![(root, 0)];
        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;
            if let Some(&child) = references[node as usize].get(*cursor) {
                *cursor += 1;
                match state[child as usize] {
                    UNVISITED => {
                        state[child as usize] = ON_STACK;
                        stack.push((child, 0));
                    }
                    ON_STACK => {
                        return Err(crate::Error::ReferenceCycle(TableIndex::new(
                            TableId::TypeSpec,
                            child,
                        )));
                    }
                    _ => {}
                }
            } else {
                state[node as usize] = DONE;
                order.push(node);
                stack.pop();
            }
        }
    }

    let mut topo_of_orig = vec![0u32; count];
    for (topo, &orig) in order.iter().enumerate() {
        topo_of_orig[orig as usize] = topo as u32;
    }

    let mut final_of_orig = vec![0u32; count];
    let mut merged_into = vec![None; count];
    let mut seen: HashMap<crate::metadata::signatures::TypeSignature, (u32, u32)> = HashMap::new();
    let mut kept: Vec<TypeSpecRow> = Vec::new();
    for (topo, &orig) in order.iter().enumerate() {
        let mut row = rows[orig as usize].clone();
        visit_type_indices_mut(&mut row.signature, &mut |index| {
            if index.table == TableId::TypeSpec {
                // Dependency order guarantees the referenced row is final.
                index.row = final_of_orig[index.row as usize];
                Ok(())
            } else {
                *index = map.final_index(*index)?;
                Ok(())
            }
        })?;

        match seen.get(&row.signature) {
            Some(&(first_topo, final_row)) => {
                merged_into[topo] = Some(first_topo);
                final_of_orig[orig as usize] = final_row;
            }
            None => {
                let final_row = kept.len() as u32;
                seen.insert(row.signature.clone(), (topo as u32, final_row));
                final_of_orig[orig as usize] = final_row;
                kept.push(row);
            }
        }
    }

    tables.type_spec = kept;
    map.apply_permutation(TableId::TypeSpec, &topo_of_orig);
    record_merges(map, TableId::TypeSpec, &merged_into);
    Ok(())
}

/// Rewrites every signature outside TypeSpec to final type positions.
fn rewrite_signatures(tables: &mut TableCollection, map: &ReorderMap) -> Result<()> {
    let mut rewrite = |index: &mut TableIndex| -> Result<()> {
        *index = map.final_index(*index)?;
        Ok(())
    };

    for row in &mut tables.field {
        visit_field_indices_mut(&mut row.signature, &mut rewrite)?;
    }
    for row in &mut tables.method_def {
        visit_method_indices_mut(&mut row.signature, &mut rewrite)?;
    }
    for row in &mut tables.member_ref {
        match &mut row.signature {
            MemberRefSignature::Method(signature) => {
                visit_method_indices_mut(signature, &mut rewrite)?;
            }
            MemberRefSignature::Field(signature) => {
                visit_field_indices_mut(signature, &mut rewrite)?;
            }
        }
    }
    for row in &mut tables.stand_alone_sig {
        match &mut row.signature {
            StandAloneSignature::LocalVariables(signature) => {
                visit_locals_indices_mut(signature, &mut rewrite)?;
            }
            StandAloneSignature::Method(signature) => {
                visit_method_indices_mut(signature, &mut rewrite)?;
            }
            StandAloneSignature::Field(signature) => {
                visit_field_indices_mut(signature, &mut rewrite)?;
            }
        }
    }
    for row in &mut tables.property {
        visit_property_indices_mut(&mut row.signature, &mut rewrite)?;
    }
    for row in &mut tables.method_spec {
        visit_method_spec_indices_mut(&mut row.instantiation, &mut rewrite)?;
    }
    Ok(())
}

/// Rewrites IL-level references: locals signatures, exception types and
/// token operands. Branch and switch targets are plain offsets and stay
/// untouched. Each body's exception handlers are then put in canonical
/// order: inner protected regions before the regions enclosing them.
fn rewrite_il(tables: &mut TableCollection, map: &ReorderMap) -> Result<()> {
    for row in &mut tables.method_def {
        let Some(body) = &mut row.body else { continue };

        if let Some(local_signature) = body.local_signature {
            body.local_signature = Some(map.final_index(local_signature)?);
        }
        for handler in &mut body.exception_handlers {
            if let Some(exception_type) = handler.exception_type {
                handler.exception_type = Some(map.final_index(exception_type)?);
            }
        }
        for instruction in &mut body.instructions {
            if let Operand::Token(token) = &mut instruction.operand {
                *token = map.final_index(*token)?;
            }
        }

        // Nested try regions end no later and start no earlier than the
        // regions enclosing them, so this key emits inner handlers first.
        body.exception_handlers.sort_by_key(|handler| {
            (
                u64::from(handler.try_offset) + u64::from(handler.try_length),
                std::cmp::Reverse(handler.try_offset),
                handler.handler_offset,
            )
        });
    }
    Ok(())
}
