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

//! Maximum evaluation-stack depth calculation.
//!
//! A single forward scan over a body's instruction stream, carrying a running
//! depth plus an offset-indexed table of minimum depths. The table is seeded
//! from exception-handler entry points (handler and filter code always start
//! with the exception object on the stack) and extended as branches propagate
//! their post-instruction depth to their targets. Call-like instructions have
//! no static stack effect; their true effect is resolved from the callee
//! signature by probing MethodDef, MemberRef, StandAloneSig and MethodSpec.

use std::collections::HashMap;

use crate::metadata::{
    method::{FlowType, Operand},
    signatures::SignatureMethod,
    tables::{MemberRefSignature, StandAloneSignature, TableCollection, TableId, TableIndex},
};

/// Computes the maximum evaluation-stack depth required by `method`'s body.
///
/// Returns `-1` when `method` is not a valid MethodDef index, the method has
/// no IL body, or a call site's token cannot be resolved to a method
/// signature.
#[must_use]
pub fn max_stack_depth(tables: &TableCollection, method: TableIndex) -> i32 {
    if method.table != TableId::MethodDef {
        return -1;
    }
    let Some(row) = tables.method_def.get(method.row as usize) else {
        return -1;
    };
    let Some(body) = &row.body else {
        return -1;
    };

    // Handler and filter entry points begin with the exception object pushed.
    let mut recorded: HashMap<u32, u32> = HashMap::new();
    for handler in &body.exception_handlers {
        record_depth(&mut recorded, handler.handler_offset, 1);
        if let Some(filter_offset) = handler.filter_offset {
            record_depth(&mut recorded, filter_offset, 1);
        }
    }

    let mut running: u32 = 0;
    let mut max_depth: u32 = 0;

    for instruction in &body.instructions {
        let depth = match recorded.get(&instruction.offset) {
            Some(&entry) => running.max(entry),
            None => running,
        };

        let (pops, pushes) = if instruction.opcode.flow_type == FlowType::Call {
            let Operand::Token(token) = instruction.operand else {
                return -1;
            };
            let Some(signature) = resolve_callee(tables, token) else {
                return -1;
            };

            let mut pops = signature.argument_slots();
            if instruction.opcode.mnemonic == "calli" {
                pops += 1;
            }
            let pushes = u32::from(
                signature.returns_value() || instruction.opcode.mnemonic == "newobj",
            );
            (pops, pushes)
        } else {
            (
                instruction.opcode.stack_behavior.pops,
                instruction.opcode.stack_behavior.pushes,
            )
        };

        let after = depth.saturating_sub(pops) + pushes;
        max_depth = max_depth.max(depth).max(after);

        match &instruction.operand {
            Operand::Target(target)
                if matches!(
                    instruction.opcode.flow_type,
                    FlowType::ConditionalBranch | FlowType::UnconditionalBranch | FlowType::Leave
                ) =>
            {
                record_depth(&mut recorded, *target as u32, after);
            }
            Operand::Switch(targets) => {
                for target in targets {
                    record_depth(&mut recorded, *target as u32, after);
                }
            }
            _ => {}
        }

        running = if instruction.opcode.flow_type.ends_basic_block() {
            0
        } else {
            after
        };
    }

    max_depth as i32
}

fn record_depth(recorded: &mut HashMap<u32, u32>, offset: u32, depth: u32) {
    let entry = recorded.entry(offset).or_insert(0);
    *entry = (*entry).max(depth);
}

/// Resolves a call-site token to the method signature it invokes.
///
/// MethodSpec rows are followed through to the underlying MethodDef or
/// MemberRef. Field references and locals signatures resolve to `None`.
fn resolve_callee(tables: &TableCollection, token: TableIndex) -> Option<&SignatureMethod> {
    match token.table {
        TableId::MethodDef => tables
            .method_def
            .get(token.row as usize)
            .map(|row| &row.signature),
        TableId::MemberRef => match tables.member_ref.get(token.row as usize)?.signature {
            MemberRefSignature::Method(ref signature) => Some(signature),
            MemberRefSignature::Field(_) => None,
        },
        TableId::StandAloneSig => match tables.stand_alone_sig.get(token.row as usize)?.signature {
            StandAloneSignature::Method(ref signature) => Some(signature),
            _ => None,
        },
        TableId::MethodSpec => {
            let row = tables.method_spec.get(token.row as usize)?;
            resolve_callee(tables, row.method)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        method::{opcodes, ExceptionHandler, Immediate, Instruction, MethodBody},
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        tables::{MemberRefRow, MethodDefRow, MethodSpecRow},
    };

    fn method_row(name: &str, signature: SignatureMethod, body: Option<MethodBody>) -> MethodDefRow {
        MethodDefRow {
            rva: 0,
            impl_flags: 0,
            flags: 0,
            name: name.to_string(),
            signature,
            param_list: 0,
            body,
        }
    }

    fn int_to_int_signature() -> SignatureMethod {
        SignatureMethod {
            return_type: SignatureParameter {
                base: TypeSignature::I4,
                ..Default::default()
            },
            params: vec![SignatureParameter {
                base: TypeSignature::I4,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_straight_line_with_call() {
        let mut tables = TableCollection::new();
        tables
            .method_def
            .push(method_row("Callee", int_to_int_signature(), None));

        let body = MethodBody {
            instructions: vec![
                Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(7))),
                Instruction::new(
                    5,
                    opcodes::CALL,
                    Operand::Token(TableIndex::new(TableId::MethodDef, 0)),
                ),
                Instruction::new(10, opcodes::POP, Operand::None),
                Instruction::new(11, opcodes::RET, Operand::None),
            ],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Caller", SignatureMethod::default(), Some(body)));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 1)),
            1
        );
    }

    #[test]
    fn test_handler_entry_seeds_depth_one() {
        let mut tables = TableCollection::new();
        let body = MethodBody {
            instructions: vec![
                Instruction::new(0, opcodes::NOP, Operand::None),
                Instruction::new(1, opcodes::LEAVE, Operand::Target(8)),
                // Handler entry: exception object already on the stack.
                Instruction::new(6, opcodes::POP, Operand::None),
                Instruction::new(7, opcodes::LEAVE, Operand::Target(8)),
                Instruction::new(8, opcodes::RET, Operand::None),
            ],
            exception_handlers: vec![ExceptionHandler::typed(
                0,
                6,
                6,
                2,
                TableIndex::new(TableId::TypeRef, 0),
            )],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Guarded", SignatureMethod::default(), Some(body)));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            1
        );
    }

    #[test]
    fn test_branch_propagates_depth_to_target() {
        let mut tables = TableCollection::new();
        let body = MethodBody {
            instructions: vec![
                Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(1))),
                Instruction::new(5, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(2))),
                Instruction::new(10, opcodes::BR, Operand::Target(15)),
                // Running depth is reset here; the recorded depth at 15 is 2.
                Instruction::new(15, opcodes::ADD, Operand::None),
                Instruction::new(16, opcodes::POP, Operand::None),
                Instruction::new(17, opcodes::RET, Operand::None),
            ],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Branchy", SignatureMethod::default(), Some(body)));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            2
        );
    }

    #[test]
    fn test_calli_pops_function_pointer() {
        let mut tables = TableCollection::new();
        tables.stand_alone_sig.push(crate::metadata::tables::StandAloneSigRow {
            signature: StandAloneSignature::Method(int_to_int_signature()),
        });

        let body = MethodBody {
            instructions: vec![
                Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(7))),
                Instruction::new(5, opcodes::LDNULL, Operand::None),
                Instruction::new(
                    6,
                    opcodes::CALLI,
                    Operand::Token(TableIndex::new(TableId::StandAloneSig, 0)),
                ),
                Instruction::new(11, opcodes::POP, Operand::None),
                Instruction::new(12, opcodes::RET, Operand::None),
            ],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Indirect", SignatureMethod::default(), Some(body)));

        // Peak is 2 (arg + fnptr); calli pops both and pushes the result.
        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            2
        );
    }

    #[test]
    fn test_method_spec_resolves_through_member_ref() {
        let mut tables = TableCollection::new();
        tables.member_ref.push(MemberRefRow {
            class: TableIndex::new(TableId::TypeRef, 0),
            name: "Generic".to_string(),
            signature: MemberRefSignature::Method(int_to_int_signature()),
        });
        tables.method_spec.push(MethodSpecRow {
            method: TableIndex::new(TableId::MemberRef, 0),
            instantiation: Default::default(),
        });

        let body = MethodBody {
            instructions: vec![
                Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(3))),
                Instruction::new(
                    5,
                    opcodes::CALL,
                    Operand::Token(TableIndex::new(TableId::MethodSpec, 0)),
                ),
                Instruction::new(10, opcodes::RET, Operand::None),
            ],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Caller", SignatureMethod::default(), Some(body)));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            1
        );
    }

    #[test]
    fn test_missing_body_and_invalid_index() {
        let mut tables = TableCollection::new();
        tables
            .method_def
            .push(method_row("Abstract", SignatureMethod::default(), None));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            -1
        );
        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 5)),
            -1
        );
        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::TypeDef, 0)),
            -1
        );
    }

    #[test]
    fn test_unresolvable_call_token() {
        let mut tables = TableCollection::new();
        let body = MethodBody {
            instructions: vec![Instruction::new(
                0,
                opcodes::CALL,
                Operand::Token(TableIndex::new(TableId::MemberRef, 9)),
            )],
            ..Default::default()
        };
        tables
            .method_def
            .push(method_row("Broken", SignatureMethod::default(), Some(body)));

        assert_eq!(
            max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
            -1
        );
    }
}
