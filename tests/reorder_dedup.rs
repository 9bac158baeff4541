//! Duplicate elimination across the reference tables.

use std::collections::HashSet;

use cilcanon::{
    metadata::{
        signatures::TypeSignature,
        tables::{
            AssemblyRefRow, InterfaceImplRow, MemberRefRow, MemberRefSignature, MethodSpecRow,
            ModuleRefRow, TableCollection, TypeDefRow, TypeRefRow, TypeSpecRow,
        },
    },
    prelude::*,
};

fn assembly_ref(name: &str, culture: Option<&str>) -> AssemblyRefRow {
    AssemblyRefRow {
        version: AssemblyVersion::new(1, 0, 0, 0),
        flags: 0,
        public_key_or_token: None,
        name: name.to_string(),
        culture: culture.map(str::to_string),
        hash_value: None,
    }
}

fn type_ref(scope: Option<TableIndex>, name: &str) -> TypeRefRow {
    TypeRefRow {
        resolution_scope: scope,
        name: name.to_string(),
        namespace: "N".to_string(),
    }
}

#[test]
fn test_identical_assembly_refs_collapse() {
    let mut tables = TableCollection::new();
    tables.assembly_ref.push(assembly_ref("Foo", None));
    tables.assembly_ref.push(assembly_ref("Foo", None));
    tables.assembly_ref.push(assembly_ref("Foo", Some("en-US")));

    let map = Reorderer::run(&mut tables).unwrap();

    assert_eq!(tables.assembly_ref.len(), 2);
    assert_eq!(tables.assembly_ref[0].culture, None);
    assert_eq!(tables.assembly_ref[1].culture, Some("en-US".to_string()));

    // Both original duplicates resolve to the same final row.
    let first = map.final_index(TableIndex::new(TableId::AssemblyRef, 0)).unwrap();
    let second = map.final_index(TableIndex::new(TableId::AssemblyRef, 1)).unwrap();
    assert_eq!(first, second);
    assert!(map.table(TableId::AssemblyRef)[1].is_merged());
    assert!(!map.table(TableId::AssemblyRef)[2].is_merged());
}

#[test]
fn test_type_refs_dedup_after_scope_collapse() {
    // Two TypeRefs become identical only once their duplicate AssemblyRef
    // scopes have been merged.
    let mut tables = TableCollection::new();
    tables.assembly_ref.push(assembly_ref("Lib", None));
    tables.assembly_ref.push(assembly_ref("Lib", None));
    tables.type_ref.push(type_ref(
        Some(TableIndex::new(TableId::AssemblyRef, 0)),
        "Widget",
    ));
    tables.type_ref.push(type_ref(
        Some(TableIndex::new(TableId::AssemblyRef, 1)),
        "Widget",
    ));

    let map = Reorderer::run(&mut tables).unwrap();

    assert_eq!(tables.assembly_ref.len(), 1);
    assert_eq!(tables.type_ref.len(), 1);
    assert_eq!(
        tables.type_ref[0].resolution_scope,
        Some(TableIndex::new(TableId::AssemblyRef, 0))
    );
    assert!(map.table(TableId::TypeRef)[1].is_merged());
}

#[test]
fn test_recursive_type_spec_chain_dedups() {
    // Two structurally identical two-level generic instantiation chains.
    let mut tables = TableCollection::new();
    tables.type_ref.push(type_ref(None, "List`1"));

    let list = TypeSignature::Class(TableIndex::new(TableId::TypeRef, 0));
    let list_of_int =
        TypeSignature::GenericInst(Box::new(list.clone()), vec![TypeSignature::I4]);
    let wrap = |inner: u32| {
        TypeSignature::GenericInst(
            Box::new(list.clone()),
            vec![TypeSignature::Class(TableIndex::new(TableId::TypeSpec, inner))],
        )
    };
    tables.type_spec.push(TypeSpecRow {
        signature: list_of_int.clone(),
    });
    tables.type_spec.push(TypeSpecRow { signature: wrap(0) });
    tables.type_spec.push(TypeSpecRow {
        signature: list_of_int,
    });
    tables.type_spec.push(TypeSpecRow { signature: wrap(2) });

    let map = Reorderer::run(&mut tables).unwrap();

    assert_eq!(tables.type_spec.len(), 2);
    assert_eq!(
        map.final_index(TableIndex::new(TableId::TypeSpec, 1)).unwrap(),
        map.final_index(TableIndex::new(TableId::TypeSpec, 3)).unwrap()
    );
}

#[test]
fn test_member_refs_dedup_through_rewritten_class() {
    let mut tables = TableCollection::new();
    tables.assembly_ref.push(assembly_ref("Lib", None));
    tables.assembly_ref.push(assembly_ref("Lib", None));
    tables.type_ref.push(type_ref(
        Some(TableIndex::new(TableId::AssemblyRef, 0)),
        "Widget",
    ));
    tables.type_ref.push(type_ref(
        Some(TableIndex::new(TableId::AssemblyRef, 1)),
        "Widget",
    ));
    let member = |class: u32| MemberRefRow {
        class: TableIndex::new(TableId::TypeRef, class),
        name: "Frob".to_string(),
        signature: MemberRefSignature::Method(Default::default()),
    };
    tables.member_ref.push(member(0));
    tables.member_ref.push(member(1));
    tables.method_spec.push(MethodSpecRow {
        method: TableIndex::new(TableId::MemberRef, 0),
        instantiation: Default::default(),
    });
    tables.method_spec.push(MethodSpecRow {
        method: TableIndex::new(TableId::MemberRef, 1),
        instantiation: Default::default(),
    });

    let map = Reorderer::run(&mut tables).unwrap();

    assert_eq!(tables.member_ref.len(), 1);
    assert_eq!(tables.method_spec.len(), 1);
    assert!(map.table(TableId::MemberRef)[1].is_merged());
    assert!(map.table(TableId::MethodSpec)[1].is_merged());
}

#[test]
fn test_no_duplicates_survive_anywhere() {
    let mut tables = TableCollection::new();
    tables.type_def.push(TypeDefRow {
        flags: 0,
        name: "T".to_string(),
        namespace: String::new(),
        extends: None,
        field_list: 0,
        method_list: 0,
    });
    tables.assembly_ref.push(assembly_ref("A", None));
    tables.assembly_ref.push(assembly_ref("A", None));
    tables.module_ref.push(ModuleRefRow { name: "m".to_string() });
    tables.module_ref.push(ModuleRefRow { name: "m".to_string() });
    tables.type_ref.push(type_ref(Some(TableIndex::new(TableId::AssemblyRef, 0)), "R"));
    tables.type_ref.push(type_ref(Some(TableIndex::new(TableId::AssemblyRef, 1)), "R"));
    tables.type_spec.push(TypeSpecRow { signature: TypeSignature::I4 });
    tables.type_spec.push(TypeSpecRow { signature: TypeSignature::I4 });
    tables.interface_impl.push(InterfaceImplRow {
        class: TableIndex::new(TableId::TypeDef, 0),
        interface: TableIndex::new(TableId::TypeRef, 0),
    });
    tables.interface_impl.push(InterfaceImplRow {
        class: TableIndex::new(TableId::TypeDef, 0),
        interface: TableIndex::new(TableId::TypeRef, 1),
    });

    Reorderer::run(&mut tables).unwrap();

    let identities: HashSet<String> = tables
        .assembly_ref
        .iter()
        .map(|r| r.identity().display_name())
        .collect();
    assert_eq!(identities.len(), tables.assembly_ref.len());

    let modules: HashSet<&str> = tables.module_ref.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(modules.len(), tables.module_ref.len());

    let refs: HashSet<_> = tables
        .type_ref
        .iter()
        .map(|r| (r.resolution_scope, r.name.clone(), r.namespace.clone()))
        .collect();
    assert_eq!(refs.len(), tables.type_ref.len());

    let specs: HashSet<_> = tables.type_spec.iter().map(|r| r.signature.clone()).collect();
    assert_eq!(specs.len(), tables.type_spec.len());

    let impls: HashSet<_> = tables
        .interface_impl
        .iter()
        .map(|r| (r.class, r.interface))
        .collect();
    assert_eq!(impls.len(), tables.interface_impl.len());
    // The two InterfaceImpl rows pointed at TypeRefs that merged into one.
    assert_eq!(tables.interface_impl.len(), 1);
}
