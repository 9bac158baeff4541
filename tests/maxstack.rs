//! Maximum evaluation-stack depth over realistic bodies.

use cilcanon::{
    metadata::{
        method::{
            opcodes, ExceptionHandler, Immediate, Instruction, MethodBody, Operand,
        },
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        tables::{MethodDefRow, TableCollection},
    },
    prelude::*,
};

fn method(name: &str, signature: SignatureMethod, body: Option<MethodBody>) -> MethodDefRow {
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

fn int_to_int() -> SignatureMethod {
    let int = SignatureParameter {
        base: TypeSignature::I4,
        ..Default::default()
    };
    SignatureMethod {
        return_type: int.clone(),
        params: vec![int],
        ..Default::default()
    }
}

#[test]
fn test_constant_call_pop_sequence() {
    // ldc.i4 ; call int32(int32) ; pop ; ret — the call consumes the constant
    // and leaves its return value, so the peak depth stays at 1.
    let mut tables = TableCollection::new();
    tables.method_def.push(method("Callee", int_to_int(), None));

    let body = MethodBody {
        instructions: vec![
            Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(42))),
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
        .push(method("Caller", Default::default(), Some(body)));

    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 1)),
        1
    );
}

#[test]
fn test_handler_entry_counts_exception_object() {
    // The protected region never exceeds depth 0, but the handler starts with
    // the exception object on the stack and loads a constant on top of it.
    let mut tables = TableCollection::new();
    let body = MethodBody {
        instructions: vec![
            Instruction::new(0, opcodes::NOP, Operand::None),
            Instruction::new(1, opcodes::LEAVE, Operand::Target(13)),
            Instruction::new(6, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(1))),
            Instruction::new(11, opcodes::POP, Operand::None),
            // Still holding the exception object here.
            Instruction::new(12, opcodes::THROW, Operand::None),
            Instruction::new(13, opcodes::RET, Operand::None),
        ],
        exception_handlers: vec![ExceptionHandler::typed(
            0,
            6,
            6,
            7,
            TableIndex::new(TableId::TypeRef, 0),
        )],
        ..Default::default()
    };
    tables
        .method_def
        .push(method("Guarded", Default::default(), Some(body)));

    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
        2
    );
}

#[test]
fn test_switch_propagates_depth_to_all_cases() {
    let mut tables = TableCollection::new();
    let body = MethodBody {
        instructions: vec![
            Instruction::new(0, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(2))),
            Instruction::new(5, opcodes::LDC_I4, Operand::Immediate(Immediate::Int32(0))),
            Instruction::new(10, opcodes::SWITCH, Operand::Switch(vec![23, 25])),
            Instruction::new(22, opcodes::POP, Operand::None),
            // Case targets each still hold the first constant.
            Instruction::new(23, opcodes::POP, Operand::None),
            Instruction::new(24, opcodes::RET, Operand::None),
            Instruction::new(25, opcodes::POP, Operand::None),
            Instruction::new(26, opcodes::RET, Operand::None),
        ],
        ..Default::default()
    };
    tables
        .method_def
        .push(method("Switchy", Default::default(), Some(body)));

    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
        2
    );
}

#[test]
fn test_bodyless_and_invalid_methods_report_minus_one() {
    let mut tables = TableCollection::new();
    tables
        .method_def
        .push(method("Abstract", Default::default(), None));

    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 0)),
        -1
    );
    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::MethodDef, 7)),
        -1
    );
    assert_eq!(
        max_stack_depth(&tables, TableIndex::new(TableId::Field, 0)),
        -1
    );
}
