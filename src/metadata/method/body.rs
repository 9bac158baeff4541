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

//! In-memory IL model: instructions with decoded operands plus the method
//! body envelope (locals signature, exception handlers, computed max stack).
//!
//! Decoding raw IL bytes and the full opcode table are external collaborators'
//! concerns; the model carries per-instruction opcode info (mnemonic, control
//! flow, static stack effect) so the re-order engine and the max-stack
//! calculator can operate without a decoder. A handful of well-known opcodes
//! are provided as constants in [`opcodes`].

use std::fmt;

use crate::metadata::{method::ExceptionHandler, tables::TableIndex};

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Normal execution continues to the next instruction
    Sequential,
    /// Conditional branch to another location
    ConditionalBranch,
    /// Always branches to another location (unconditional jump)
    UnconditionalBranch,
    /// Call to another method
    Call,
    /// Returns from the current method
    Return,
    /// Multi-way branch (switch statement)
    Switch,
    /// Exception throwing
    Throw,
    /// End of a finally or fault block
    EndFinally,
    /// Leave a protected region (try/catch/finally)
    Leave,
}

impl FlowType {
    /// Whether execution never falls through to the next instruction.
    ///
    /// The max-stack calculator resets its running depth to zero after these.
    #[must_use]
    pub fn ends_basic_block(self) -> bool {
        matches!(
            self,
            FlowType::UnconditionalBranch
                | FlowType::Return
                | FlowType::Throw
                | FlowType::EndFinally
                | FlowType::Leave
        )
    }
}

/// Static stack effect of an instruction.
///
/// Call-like instructions carry zeros here; their true effect depends on the
/// callee signature and is resolved by the max-stack calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackBehavior {
    /// Number of values popped from the evaluation stack.
    pub pops: u32,
    /// Number of values pushed onto the evaluation stack.
    pub pushes: u32,
}

/// Immediate value embedded in an instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// Signed 8-bit immediate value
    Int8(i8),
    /// Signed 16-bit immediate value
    Int16(i16),
    /// Signed 32-bit immediate value
    Int32(i32),
    /// Signed 64-bit immediate value
    Int64(i64),
    /// 32-bit floating point immediate value
    Float32(f32),
    /// 64-bit floating point immediate value
    Float64(f64),
}

/// Decoded instruction operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// Immediate value embedded in the instruction
    Immediate(Immediate),
    /// Relative branch target (byte offset from the next instruction's start,
    /// already resolved to an absolute IL offset by the model's producer)
    Target(i32),
    /// Switch table with one absolute IL offset per case
    Switch(Vec<i32>),
    /// Metadata table reference (method, field, type, signature or spec)
    Token(TableIndex),
}

/// Static description of an opcode: mnemonic, control flow and stack effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpCode {
    /// Instruction mnemonic (e.g. `call`, `ldc.i4`).
    pub mnemonic: &'static str,
    /// Control-flow behavior.
    pub flow_type: FlowType,
    /// Static stack effect; zeros for call-like instructions.
    pub stack_behavior: StackBehavior,
}

/// A single decoded IL instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset of this instruction within its body's IL stream.
    pub offset: u32,
    /// Static opcode description.
    pub opcode: OpCode,
    /// Decoded operand.
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction at `offset`.
    #[must_use]
    pub fn new(offset: u32, opcode: OpCode, operand: Operand) -> Self {
        Instruction {
            offset,
            opcode,
            operand,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::None => write!(f, "IL_{:04x}: {}", self.offset, self.opcode.mnemonic),
            operand => write!(
                f,
                "IL_{:04x}: {} {:?}",
                self.offset, self.opcode.mnemonic, operand
            ),
        }
    }
}

/// A method's IL unit: instruction stream, exception blocks and locals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Declared maximum evaluation-stack depth.
    pub max_stack: u32,
    /// Whether locals are zero-initialized on entry.
    pub init_locals: bool,
    /// Local-variable signature; index into StandAloneSig.
    pub local_signature: Option<TableIndex>,
    /// Instructions in offset order.
    pub instructions: Vec<Instruction>,
    /// Exception-handling blocks.
    pub exception_handlers: Vec<ExceptionHandler>,
}

/// Static opcode descriptions for the well-known instructions the crate's own
/// logic and tests need. The complete ECMA-335 opcode table lives in the
/// decoding collaborator.
pub mod opcodes {
    use super::{FlowType, OpCode, StackBehavior};

    const fn op(mnemonic: &'static str, flow_type: FlowType, pops: u32, pushes: u32) -> OpCode {
        OpCode {
            mnemonic,
            flow_type,
            stack_behavior: StackBehavior { pops, pushes },
        }
    }

    /// `nop` (0x00)
    pub const NOP: OpCode = op("nop", FlowType::Sequential, 0, 0);
    /// `ldarg.0` (0x02)
    pub const LDARG_0: OpCode = op("ldarg.0", FlowType::Sequential, 0, 1);
    /// `ldloc.0` (0x06)
    pub const LDLOC_0: OpCode = op("ldloc.0", FlowType::Sequential, 0, 1);
    /// `stloc.0` (0x0A)
    pub const STLOC_0: OpCode = op("stloc.0", FlowType::Sequential, 1, 0);
    /// `ldnull` (0x14)
    pub const LDNULL: OpCode = op("ldnull", FlowType::Sequential, 0, 1);
    /// `ldc.i4` (0x20)
    pub const LDC_I4: OpCode = op("ldc.i4", FlowType::Sequential, 0, 1);
    /// `dup` (0x25)
    pub const DUP: OpCode = op("dup", FlowType::Sequential, 1, 2);
    /// `pop` (0x26)
    pub const POP: OpCode = op("pop", FlowType::Sequential, 1, 0);
    /// `call` (0x28) - stack effect resolved from the callee signature
    pub const CALL: OpCode = op("call", FlowType::Call, 0, 0);
    /// `calli` (0x29) - pops the function pointer in addition to arguments
    pub const CALLI: OpCode = op("calli", FlowType::Call, 0, 0);
    /// `ret` (0x2A)
    pub const RET: OpCode = op("ret", FlowType::Return, 0, 0);
    /// `br` (0x38)
    pub const BR: OpCode = op("br", FlowType::UnconditionalBranch, 0, 0);
    /// `brfalse` (0x39)
    pub const BRFALSE: OpCode = op("brfalse", FlowType::ConditionalBranch, 1, 0);
    /// `brtrue` (0x3A)
    pub const BRTRUE: OpCode = op("brtrue", FlowType::ConditionalBranch, 1, 0);
    /// `switch` (0x45)
    pub const SWITCH: OpCode = op("switch", FlowType::Switch, 1, 0);
    /// `callvirt` (0x6F) - stack effect resolved from the callee signature
    pub const CALLVIRT: OpCode = op("callvirt", FlowType::Call, 0, 0);
    /// `ldstr` (0x72)
    pub const LDSTR: OpCode = op("ldstr", FlowType::Sequential, 0, 1);
    /// `newobj` (0x73) - stack effect resolved from the constructor signature
    pub const NEWOBJ: OpCode = op("newobj", FlowType::Call, 0, 0);
    /// `throw` (0x7A)
    pub const THROW: OpCode = op("throw", FlowType::Throw, 1, 0);
    /// `add` (0x58)
    pub const ADD: OpCode = op("add", FlowType::Sequential, 2, 1);
    /// `leave` (0xDD)
    pub const LEAVE: OpCode = op("leave", FlowType::Leave, 0, 0);
    /// `endfinally` (0xDC)
    pub const ENDFINALLY: OpCode = op("endfinally", FlowType::EndFinally, 0, 0);
    /// `ldfld` (0x7B)
    pub const LDFLD: OpCode = op("ldfld", FlowType::Sequential, 1, 1);
    /// `ldtoken` (0xD0)
    pub const LDTOKEN: OpCode = op("ldtoken", FlowType::Sequential, 0, 1);
}
