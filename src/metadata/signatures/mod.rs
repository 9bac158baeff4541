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

//! Signature trees for types, methods, fields, properties, locals and generic
//! method instantiations, modeled as closed sum types per ECMA-335 II.23.2.
//!
//! Signatures are stored decoded inside table rows (blob encoding is an
//! external collaborator's concern). Any node that denotes a concrete type
//! carries a [`crate::metadata::tables::TableIndex`] into TypeDef, TypeRef or
//! TypeSpec; [`visit`] provides the exhaustive traversals the re-order engine
//! uses to rewrite those references.

mod types;
pub mod visit;

pub use types::{
    ArrayDimension, SignatureArray, SignatureField, SignatureLocalVariable,
    SignatureLocalVariables, SignatureMethod, SignatureMethodSpec, SignatureParameter,
    SignaturePointer, SignatureProperty, SignatureSzArray, TypeSignature,
};
