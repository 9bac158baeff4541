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

//! Row records for the metadata tables the in-memory model carries.
//!
//! Rows are plain data: fields are scalar values, strings, decoded signature
//! trees, or [`TableIndex`] / `Option<TableIndex>` references into other
//! tables. Rows have no identity beyond their position in their table's row
//! list; heap offsets and physical encoding are an external collaborator's
//! concern, so names and blobs are stored directly.

use uguid::Guid;

use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion, StrongName},
    method::MethodBody,
    signatures::{
        SignatureField, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
        SignatureProperty, TypeSignature,
    },
    tables::TableIndex,
};

/// `Module` table row (0x00). Exactly one per collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRow {
    /// Generation; reserved, zero in well-formed modules.
    pub generation: u16,
    /// Module name, including extension.
    pub name: String,
    /// Module version identifier.
    pub mvid: Guid,
}

/// `TypeRef` table row (0x01).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRefRow {
    /// Resolution scope: Module, ModuleRef, AssemblyRef, or an enclosing
    /// TypeRef for nested types. `None` for types resolved via ExportedType.
    pub resolution_scope: Option<TableIndex>,
    /// Type name.
    pub name: String,
    /// Type namespace; empty for the global namespace.
    pub namespace: String,
}

/// `TypeDef` table row (0x02).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefRow {
    /// Type attribute flags (II.23.1.15), kept raw.
    pub flags: u32,
    /// Type name.
    pub name: String,
    /// Type namespace; empty for the global namespace.
    pub namespace: String,
    /// Base type: TypeDef, TypeRef or TypeSpec. `None` for interfaces and
    /// `System.Object`.
    pub extends: Option<TableIndex>,
    /// First index of this type's contiguous range in the Field table.
    pub field_list: u32,
    /// First index of this type's contiguous range in the MethodDef table.
    pub method_list: u32,
}

/// `Field` table row (0x04).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    /// Field attribute flags (II.23.1.5), kept raw.
    pub flags: u16,
    /// Field name.
    pub name: String,
    /// Decoded field signature.
    pub signature: SignatureField,
}

/// `MethodDef` table row (0x06).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefRow {
    /// Relative virtual address of the method body; zero for abstract/extern.
    pub rva: u32,
    /// Implementation flags (II.23.1.11), kept raw.
    pub impl_flags: u16,
    /// Method attribute flags (II.23.1.10), kept raw.
    pub flags: u16,
    /// Method name.
    pub name: String,
    /// Decoded method signature.
    pub signature: SignatureMethod,
    /// First index of this method's contiguous range in the Param table.
    pub param_list: u32,
    /// Decoded IL body, when the method has one.
    pub body: Option<MethodBody>,
}

/// `Param` table row (0x08).
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    /// Parameter attribute flags (II.23.1.13), kept raw.
    pub flags: u16,
    /// One-based parameter position; zero denotes the return value.
    pub sequence: u16,
    /// Parameter name; may be empty.
    pub name: String,
}

/// `InterfaceImpl` table row (0x09).
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceImplRow {
    /// The implementing type; index into TypeDef.
    pub class: TableIndex,
    /// The implemented interface: TypeDef, TypeRef or TypeSpec.
    pub interface: TableIndex,
}

/// Signature carried by a `MemberRef` row: method or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRefSignature {
    /// Reference to a method.
    Method(SignatureMethod),
    /// Reference to a field.
    Field(SignatureField),
}

/// `MemberRef` table row (0x0A).
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRefRow {
    /// Declaring scope: TypeDef, TypeRef, TypeSpec, ModuleRef or MethodDef.
    pub class: TableIndex,
    /// Member name.
    pub name: String,
    /// Decoded member signature.
    pub signature: MemberRefSignature,
}

/// `Constant` table row (0x0B).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantRow {
    /// Element type of the constant (II.23.1.16), kept raw.
    pub const_type: u8,
    /// Owner: Field, Param or Property.
    pub parent: TableIndex,
    /// Raw constant value bytes.
    pub value: Vec<u8>,
}

/// `CustomAttribute` table row (0x0C).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeRow {
    /// The attributed element; may reference nearly any table.
    pub parent: TableIndex,
    /// The attribute constructor: MethodDef or MemberRef.
    pub constructor: TableIndex,
    /// Raw attribute value blob.
    pub value: Vec<u8>,
}

/// `FieldMarshal` table row (0x0D).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarshalRow {
    /// Owner: Field or Param.
    pub parent: TableIndex,
    /// Raw native-type descriptor.
    pub native_type: Vec<u8>,
}

/// `DeclSecurity` table row (0x0E).
#[derive(Debug, Clone, PartialEq)]
pub struct DeclSecurityRow {
    /// Security action code (II.22.11), kept raw.
    pub action: u16,
    /// Owner: TypeDef, MethodDef or Assembly.
    pub parent: TableIndex,
    /// Raw permission set blob.
    pub permission_set: Vec<u8>,
}

/// `ClassLayout` table row (0x0F).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayoutRow {
    /// Field packing alignment in bytes.
    pub packing_size: u16,
    /// Total type size in bytes; zero to defer to the runtime.
    pub class_size: u32,
    /// The laid-out type; index into TypeDef.
    pub parent: TableIndex,
}

/// `FieldLayout` table row (0x10).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayoutRow {
    /// Byte offset of the field within its type.
    pub offset: u32,
    /// The positioned field; index into Field.
    pub field: TableIndex,
}

/// Signature carried by a `StandAloneSig` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StandAloneSignature {
    /// Local-variable slots of a method body.
    LocalVariables(SignatureLocalVariables),
    /// A method signature, used at `calli` sites.
    Method(SignatureMethod),
    /// A field signature; rare but permitted by the format.
    Field(SignatureField),
}

/// `StandAloneSig` table row (0x11).
#[derive(Debug, Clone, PartialEq)]
pub struct StandAloneSigRow {
    /// The decoded standalone signature.
    pub signature: StandAloneSignature,
}

/// `EventMap` table row (0x12).
#[derive(Debug, Clone, PartialEq)]
pub struct EventMapRow {
    /// The owning type; index into TypeDef.
    pub parent: TableIndex,
    /// First index of the owner's contiguous range in the Event table.
    pub event_list: u32,
}

/// `Event` table row (0x14).
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// Event attribute flags (II.23.1.4), kept raw.
    pub flags: u16,
    /// Event name.
    pub name: String,
    /// Delegate type of the event: TypeDef, TypeRef or TypeSpec.
    pub event_type: Option<TableIndex>,
}

/// `PropertyMap` table row (0x15).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapRow {
    /// The owning type; index into TypeDef.
    pub parent: TableIndex,
    /// First index of the owner's contiguous range in the Property table.
    pub property_list: u32,
}

/// `Property` table row (0x17).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    /// Property attribute flags (II.23.1.14), kept raw.
    pub flags: u16,
    /// Property name.
    pub name: String,
    /// Decoded property signature.
    pub signature: SignatureProperty,
}

/// `MethodSemantics` table row (0x18).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSemanticsRow {
    /// Semantics flags: getter, setter, adder, remover, fire, other.
    pub semantics: u16,
    /// The accessor method; index into MethodDef.
    pub method: TableIndex,
    /// The owning Event or Property row.
    pub association: TableIndex,
}

/// `MethodImpl` table row (0x19).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodImplRow {
    /// The type providing the implementation; index into TypeDef.
    pub class: TableIndex,
    /// The implementing method: MethodDef or MemberRef.
    pub method_body: TableIndex,
    /// The declaration being implemented: MethodDef or MemberRef.
    pub method_declaration: TableIndex,
}

/// `ModuleRef` table row (0x1A).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRefRow {
    /// Referenced module name.
    pub name: String,
}

/// `TypeSpec` table row (0x1B).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpecRow {
    /// The decoded type signature.
    pub signature: TypeSignature,
}

/// `ImplMap` table row (0x1C).
#[derive(Debug, Clone, PartialEq)]
pub struct ImplMapRow {
    /// P/Invoke mapping flags (II.23.1.8), kept raw.
    pub mapping_flags: u16,
    /// The forwarded member: Field or MethodDef.
    pub member_forwarded: TableIndex,
    /// Unmanaged entry-point name.
    pub import_name: String,
    /// The unmanaged module; index into ModuleRef.
    pub import_scope: TableIndex,
}

/// `FieldRVA` table row (0x1D).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRVARow {
    /// Relative virtual address of the field's initial data.
    pub rva: u32,
    /// The initialized field; index into Field.
    pub field: TableIndex,
}

/// `Assembly` table row (0x20). At most one per collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyRow {
    /// Hash algorithm identifier (II.23.1.1), kept raw.
    pub hash_alg_id: u32,
    /// Assembly version.
    pub version: AssemblyVersion,
    /// Assembly flags (II.23.1.2), kept raw.
    pub flags: u32,
    /// Full public key, when the assembly is strong-named.
    pub public_key: Option<Vec<u8>>,
    /// Simple assembly name.
    pub name: String,
    /// Culture; `None` for culture-neutral assemblies.
    pub culture: Option<String>,
}

/// `AssemblyRef` table row (0x23).
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyRefRow {
    /// Referenced assembly version.
    pub version: AssemblyVersion,
    /// Assembly flags (II.23.1.2), kept raw.
    pub flags: u32,
    /// Full public key or 8-byte token of the referenced assembly.
    pub public_key_or_token: Option<Vec<u8>>,
    /// Simple name of the referenced assembly.
    pub name: String,
    /// Culture; `None` for culture-neutral references.
    pub culture: Option<String>,
    /// Hash of the referenced assembly's file, when recorded.
    pub hash_value: Option<Vec<u8>>,
}

impl AssemblyRefRow {
    /// Returns the identity tuple of the referenced assembly.
    ///
    /// An empty `public_key_or_token` blob is treated as absent, matching the
    /// duplicate rule of the re-order engine. Keys and tokens are not
    /// distinguished here; 8-byte blobs are rendered as tokens.
    #[must_use]
    pub fn identity(&self) -> AssemblyIdentity {
        let strong_name = match &self.public_key_or_token {
            Some(blob) if blob.len() == 8 => {
                let mut token = [0u8; 8];
                token.copy_from_slice(blob);
                Some(StrongName::Token(token))
            }
            Some(blob) if !blob.is_empty() => Some(StrongName::Key(blob.clone())),
            _ => None,
        };

        AssemblyIdentity::new(
            self.name.clone(),
            self.version,
            self.culture.clone().filter(|c| !c.is_empty()),
            strong_name,
        )
    }
}

/// `File` table row (0x26).
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    /// File attribute flags (II.23.1.6), kept raw.
    pub flags: u32,
    /// File name.
    pub name: String,
    /// Hash of the file contents.
    pub hash_value: Vec<u8>,
}

/// `ExportedType` table row (0x27).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTypeRow {
    /// Type attribute flags (II.23.1.15), kept raw.
    pub flags: u32,
    /// Hint: the TypeDef row id in the defining module, kept raw.
    pub type_def_id: u32,
    /// Exported type name.
    pub name: String,
    /// Exported type namespace.
    pub namespace: String,
    /// Where the type lives: File, AssemblyRef or an enclosing ExportedType.
    pub implementation: TableIndex,
}

/// `ManifestResource` table row (0x28).
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestResourceRow {
    /// Byte offset of the resource within its file.
    pub offset: u32,
    /// Resource attribute flags (II.23.1.9), kept raw.
    pub flags: u32,
    /// Resource name.
    pub name: String,
    /// Containing File or AssemblyRef; `None` for resources in this module.
    pub implementation: Option<TableIndex>,
}

/// `NestedClass` table row (0x29).
#[derive(Debug, Clone, PartialEq)]
pub struct NestedClassRow {
    /// The nested type; index into TypeDef.
    pub nested_class: TableIndex,
    /// The enclosing type; index into TypeDef.
    pub enclosing_class: TableIndex,
}

/// `GenericParam` table row (0x2A).
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParamRow {
    /// Zero-based ordinal of the parameter within its owner.
    pub number: u16,
    /// Generic parameter flags (II.23.1.7), kept raw.
    pub flags: u16,
    /// Owner: TypeDef or MethodDef.
    pub owner: TableIndex,
    /// Parameter name.
    pub name: String,
}

/// `MethodSpec` table row (0x2B).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpecRow {
    /// The instantiated generic method: MethodDef or MemberRef.
    pub method: TableIndex,
    /// The decoded instantiation signature.
    pub instantiation: SignatureMethodSpec,
}

/// `GenericParamConstraint` table row (0x2C).
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParamConstraintRow {
    /// The constrained parameter; index into GenericParam.
    pub owner: TableIndex,
    /// The constraint: TypeDef, TypeRef or TypeSpec.
    pub constraint: TableIndex,
}
