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

//! Exception handler representation for CIL method bodies.
//!
//! Models try/catch/filter/finally/fault regions as offset/length pairs into
//! the owning body's IL, per ECMA-335 II.25.4.6. Typed handlers reference the
//! caught exception type through a [`TableIndex`]; the re-order engine
//! rewrites that reference when type rows move.

use bitflags::bitflags;

use crate::metadata::tables::TableIndex;

bitflags! {
    /// Exception handler flags defining the kind of handling clause.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExceptionHandlerFlags: u16 {
        /// A typed exception clause; `exception_type` names the caught type.
        const EXCEPTION = 0x0000;

        /// An exception filter clause; `filter_offset` locates the filter code.
        const FILTER = 0x0001;

        /// A finally clause, executed on both normal and exceptional exit.
        const FINALLY = 0x0002;

        /// A fault clause, executed only on exceptional exit.
        const FAULT = 0x0004;
    }
}

/// An exception-handling block within a method body.
///
/// All offsets and lengths are byte positions into the owning body's IL
/// stream. Handler and filter entry points start executing with exactly one
/// item (the exception object) on the evaluation stack, which is why the
/// max-stack calculator seeds its depth table from these offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionHandler {
    /// The kind of handling clause.
    pub flags: ExceptionHandlerFlags,
    /// Byte offset of the protected region.
    pub try_offset: u32,
    /// Byte length of the protected region.
    pub try_length: u32,
    /// Byte offset of the handler code.
    pub handler_offset: u32,
    /// Byte length of the handler code.
    pub handler_length: u32,
    /// The caught type for typed clauses: TypeDef, TypeRef or TypeSpec.
    pub exception_type: Option<TableIndex>,
    /// Byte offset of the filter expression for filter clauses.
    pub filter_offset: Option<u32>,
}

impl ExceptionHandler {
    /// Creates a typed exception clause catching `exception_type`.
    #[must_use]
    pub fn typed(
        try_offset: u32,
        try_length: u32,
        handler_offset: u32,
        handler_length: u32,
        exception_type: TableIndex,
    ) -> Self {
        ExceptionHandler {
            flags: ExceptionHandlerFlags::EXCEPTION,
            try_offset,
            try_length,
            handler_offset,
            handler_length,
            exception_type: Some(exception_type),
            filter_offset: None,
        }
    }

    /// Creates a finally clause.
    #[must_use]
    pub fn finally(
        try_offset: u32,
        try_length: u32,
        handler_offset: u32,
        handler_length: u32,
    ) -> Self {
        ExceptionHandler {
            flags: ExceptionHandlerFlags::FINALLY,
            try_offset,
            try_length,
            handler_offset,
            handler_length,
            exception_type: None,
            filter_offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::TableId;

    #[test]
    fn test_typed_handler_carries_type() {
        let handler =
            ExceptionHandler::typed(0, 8, 8, 4, TableIndex::new(TableId::TypeRef, 2));
        assert_eq!(handler.flags, ExceptionHandlerFlags::EXCEPTION);
        assert_eq!(
            handler.exception_type,
            Some(TableIndex::new(TableId::TypeRef, 2))
        );
        assert_eq!(handler.filter_offset, None);
    }

    #[test]
    fn test_finally_handler_has_no_type() {
        let handler = ExceptionHandler::finally(0, 8, 8, 4);
        assert_eq!(handler.flags, ExceptionHandlerFlags::FINALLY);
        assert_eq!(handler.exception_type, None);
    }
}
