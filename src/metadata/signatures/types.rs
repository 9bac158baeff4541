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

use crate::metadata::tables::TableIndex;

/// Dimension bounds of a multi-dimensional array signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArrayDimension {
    /// Number of elements in this dimension, if encoded.
    pub size: Option<u32>,
    /// Lower bound of this dimension, if encoded.
    pub lower_bound: Option<i32>,
}

/// Represents a parsed type in various signatures (ECMA-335 II.23.2.12).
///
/// Every variant that denotes "this is type X" carries a [`TableIndex`] into
/// the TypeDef, TypeRef or TypeSpec table. The re-order engine rewrites those
/// embedded references after relocating rows; traversal lives in
/// [`crate::metadata::signatures::visit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSignature {
    /// void
    #[default]
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// System.Object
    Object,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// Type is referenced during runtime
    TypedByRef,
    /// A pointer to a type
    Ptr(SignaturePointer),
    /// Type passed by reference
    ByRef(Box<TypeSignature>),
    /// CIL value-type; index into TypeDef/TypeRef/TypeSpec
    ValueType(TableIndex),
    /// CIL class; index into TypeDef/TypeRef/TypeSpec
    Class(TableIndex),
    /// Generic type parameter (index into the owning type's GenericParam list)
    GenericParamType(u32),
    /// Generic method parameter (index into the owning method's GenericParam list)
    GenericParamMethod(u32),
    /// Multi-dimensional array
    Array(SignatureArray),
    /// Single-dimension, zero-based array
    SzArray(SignatureSzArray),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Function pointer
    FnPtr(Box<SignatureMethod>),
    /// A pinned type (local variable signatures only)
    Pinned(Box<TypeSignature>),
    /// Required modifier; indices into TypeDef/TypeRef, applied to the inner type
    ModifiedRequired(Vec<TableIndex>, Box<TypeSignature>),
    /// Optional modifier; indices into TypeDef/TypeRef, applied to the inner type
    ModifiedOptional(Vec<TableIndex>, Box<TypeSignature>),
}

/// A multi-dimensional array shape (II.23.2.13).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureArray {
    /// The element type of the array
    pub base: Box<TypeSignature>,
    /// The number of dimensions
    pub rank: u32,
    /// The dimensions (can be fewer than `rank`, in order from 0..count)
    pub dimensions: Vec<ArrayDimension>,
}

/// A single-dimension array with optional custom modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureSzArray {
    /// Custom modifiers - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// The element type of the array
    pub base: Box<TypeSignature>,
}

/// A pointer to a type with optional custom modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignaturePointer {
    /// Custom modifiers - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// The type pointed to
    pub base: Box<TypeSignature>,
}

/// Parameter with optional custom modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureParameter {
    /// Custom modifiers of the parameter - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

/// Represents a method definition or reference signature (II.23.2.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureMethod {
    /// Encodes the keyword `instance` in the calling convention, see II.15.3
    pub has_this: bool,
    /// Encodes the keyword `explicit` in the calling convention, see II.15.3
    pub explicit_this: bool,
    /// Encodes the keyword `vararg` in the calling convention, see II.15.3
    pub vararg: bool,
    /// Number of generic parameters, when the method is generic
    pub param_count_generic: u32,
    /// The return type of this method
    pub return_type: SignatureParameter,
    /// The declared parameters of this method
    pub params: Vec<SignatureParameter>,
    /// The vararg parameters supplied at a call site (after the sentinel)
    pub varargs: Vec<SignatureParameter>,
}

/// Field signature (II.23.2.4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureField {
    /// Custom modifiers - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// The type of the field
    pub base: TypeSignature,
}

/// Property signature (II.23.2.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureProperty {
    /// Indicates the passing of a `this` pointer
    pub has_this: bool,
    /// Custom modifiers - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// The type of the property
    pub base: TypeSignature,
    /// The parameters of this property (indexers)
    pub params: Vec<SignatureParameter>,
}

/// Local variable signature (II.23.2.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureLocalVariables {
    /// The local variables, in slot order
    pub locals: Vec<SignatureLocalVariable>,
}

/// A single local variable slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureLocalVariable {
    /// Custom modifiers - indices into TypeDef/TypeRef/TypeSpec
    pub modifiers: Vec<TableIndex>,
    /// Is passed by reference
    pub is_byref: bool,
    /// This variable is pinned
    pub is_pinned: bool,
    /// The type of this variable
    pub base: TypeSignature,
}

/// Generic method instantiation signature (II.23.2.15).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureMethodSpec {
    /// Types of the generic arguments
    pub generic_args: Vec<TypeSignature>,
}

impl SignatureMethod {
    /// Total number of values a call site pops for arguments: declared
    /// parameters plus call-site varargs plus the `this` pointer when present.
    #[must_use]
    pub fn argument_slots(&self) -> u32 {
        let this = u32::from(self.has_this);
        this + self.params.len() as u32 + self.varargs.len() as u32
    }

    /// Whether invoking this method leaves a value on the stack.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.return_type.base != TypeSignature::Void
    }
}
