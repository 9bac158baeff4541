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

//! Method-body model and IL-level analysis.
//!
//! [`MethodBody`] carries a method's decoded instruction stream, exception
//! blocks and locals reference. [`stack`] computes the maximum evaluation
//! stack depth a body requires, resolving call-site stack effects against the
//! owning table collection.

mod body;
mod exceptions;
pub mod stack;

pub use body::{
    opcodes, FlowType, Immediate, Instruction, MethodBody, OpCode, Operand, StackBehavior,
};
pub use exceptions::{ExceptionHandler, ExceptionHandlerFlags};
