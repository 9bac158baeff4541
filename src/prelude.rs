//! # cilcanon Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the cilcanon library. Import this module to get quick access to the
//! essential types for metadata canonicalization.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilcanon operations
pub use crate::Error;

/// The result type used throughout cilcanon
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The re-order and de-duplication engine
pub use crate::reorder::Reorderer;

/// Per-table row dispositions produced by a reorder run
pub use crate::reorder::{ReorderMap, RowDisposition};

// ================================================================================================
// Metadata Tables
// ================================================================================================

/// The caller-owned collection of metadata table rows
pub use crate::metadata::tables::TableCollection;

/// Table-kind identification and cross-table references
pub use crate::metadata::tables::{TableId, TableIndex};

// ================================================================================================
// Assembly Identity
// ================================================================================================

/// Assembly identity parsing and rendering
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, StrongName};

// ================================================================================================
// Method Bodies
// ================================================================================================

/// Method body model and exception handlers
pub use crate::metadata::method::{ExceptionHandler, ExceptionHandlerFlags, MethodBody};

/// Maximum evaluation-stack depth calculation
pub use crate::metadata::method::stack::max_stack_depth;
