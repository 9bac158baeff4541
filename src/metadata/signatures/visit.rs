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

//! Exhaustive traversal of [`TableIndex`] references embedded in signature trees.
//!
//! The re-order engine relocates TypeDef/TypeRef/TypeSpec rows and must then
//! rewrite every type reference buried inside signatures. These walkers match
//! on every variant of the closed signature sum types, so adding a variant
//! that carries an index without extending the walk is a compile error.

use crate::{
    metadata::{
        signatures::{
            SignatureField, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
            SignatureParameter, SignatureProperty, TypeSignature,
        },
        tables::TableIndex,
    },
    Result,
};

/// Applies `f` to every [`TableIndex`] embedded in a type signature, depth first.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_type_indices_mut<F>(sig: &mut TypeSignature, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    match sig {
        TypeSignature::Void
        | TypeSignature::Boolean
        | TypeSignature::Char
        | TypeSignature::I1
        | TypeSignature::U1
        | TypeSignature::I2
        | TypeSignature::U2
        | TypeSignature::I4
        | TypeSignature::U4
        | TypeSignature::I8
        | TypeSignature::U8
        | TypeSignature::R4
        | TypeSignature::R8
        | TypeSignature::String
        | TypeSignature::Object
        | TypeSignature::I
        | TypeSignature::U
        | TypeSignature::TypedByRef
        | TypeSignature::GenericParamType(_)
        | TypeSignature::GenericParamMethod(_) => Ok(()),
        TypeSignature::ValueType(index) | TypeSignature::Class(index) => f(index),
        TypeSignature::Ptr(ptr) => {
            for modifier in &mut ptr.modifiers {
                f(modifier)?;
            }
            visit_type_indices_mut(&mut ptr.base, f)
        }
        TypeSignature::ByRef(inner) | TypeSignature::Pinned(inner) => {
            visit_type_indices_mut(inner, f)
        }
        TypeSignature::Array(array) => visit_type_indices_mut(&mut array.base, f),
        TypeSignature::SzArray(array) => {
            for modifier in &mut array.modifiers {
                f(modifier)?;
            }
            visit_type_indices_mut(&mut array.base, f)
        }
        TypeSignature::GenericInst(base, args) => {
            visit_type_indices_mut(base, f)?;
            for arg in args {
                visit_type_indices_mut(arg, f)?;
            }
            Ok(())
        }
        TypeSignature::FnPtr(method) => visit_method_indices_mut(method, f),
        TypeSignature::ModifiedRequired(modifiers, inner)
        | TypeSignature::ModifiedOptional(modifiers, inner) => {
            for modifier in modifiers {
                f(modifier)?;
            }
            visit_type_indices_mut(inner, f)
        }
    }
}

fn visit_parameter_indices_mut<F>(param: &mut SignatureParameter, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    for modifier in &mut param.modifiers {
        f(modifier)?;
    }
    visit_type_indices_mut(&mut param.base, f)
}

/// Applies `f` to every [`TableIndex`] embedded in a method signature.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_method_indices_mut<F>(sig: &mut SignatureMethod, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    visit_parameter_indices_mut(&mut sig.return_type, f)?;
    for param in &mut sig.params {
        visit_parameter_indices_mut(param, f)?;
    }
    for param in &mut sig.varargs {
        visit_parameter_indices_mut(param, f)?;
    }
    Ok(())
}

/// Applies `f` to every [`TableIndex`] embedded in a field signature.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_field_indices_mut<F>(sig: &mut SignatureField, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    for modifier in &mut sig.modifiers {
        f(modifier)?;
    }
    visit_type_indices_mut(&mut sig.base, f)
}

/// Applies `f` to every [`TableIndex`] embedded in a property signature.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_property_indices_mut<F>(sig: &mut SignatureProperty, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    for modifier in &mut sig.modifiers {
        f(modifier)?;
    }
    visit_type_indices_mut(&mut sig.base, f)?;
    for param in &mut sig.params {
        visit_parameter_indices_mut(param, f)?;
    }
    Ok(())
}

/// Applies `f` to every [`TableIndex`] embedded in a local-variables signature.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_locals_indices_mut<F>(sig: &mut SignatureLocalVariables, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    for local in &mut sig.locals {
        for modifier in &mut local.modifiers {
            f(modifier)?;
        }
        visit_type_indices_mut(&mut local.base, f)?;
    }
    Ok(())
}

/// Applies `f` to every [`TableIndex`] embedded in a generic method instantiation.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn visit_method_spec_indices_mut<F>(sig: &mut SignatureMethodSpec, f: &mut F) -> Result<()>
where
    F: FnMut(&mut TableIndex) -> Result<()>,
{
    for arg in &mut sig.generic_args {
        visit_type_indices_mut(arg, f)?;
    }
    Ok(())
}

/// Collects every [`TableIndex`] embedded in a type signature, depth first.
#[must_use]
pub fn collect_type_indices(sig: &TypeSignature) -> Vec<TableIndex> {
    let mut indices = Vec::new();
    let mut scratch = sig.clone();
    // Walking a clone keeps a single exhaustive traversal implementation.
    let _ = visit_type_indices_mut(&mut scratch, &mut |index| {
        indices.push(*index);
        Ok(())
    });
    indices
}
