//! Lookups across nested scopes.

use pretty_assertions::assert_eq;
use veil_core::{PrimitiveType, RowCount, ScopeTree, SqlError, TypedRelation};

fn relation(name: &str, columns: &[(&str, PrimitiveType)]) -> TypedRelation {
    TypedRelation::new(
        name,
        columns.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
        RowCount::UnlimitedRows,
    )
}

#[test]
fn local_columns_shadow_parent_columns() {
    let mut tree = ScopeTree::new();
    let outer = tree.create_scope(None);
    let inner = tree.create_scope(Some(outer));

    let outer_table = tree
        .create_base_table(outer, &relation("t", &[("x", PrimitiveType::Numeric)]), "o")
        .unwrap();
    let inner_table = tree
        .create_base_table(inner, &relation("t", &[("x", PrimitiveType::String)]), "i")
        .unwrap();

    let x = tree.find_column(inner, None, "x").unwrap();
    assert_eq!(x.table, inner_table);
    assert_eq!(tree.column_type(x).unwrap(), PrimitiveType::String);

    let x = tree.find_column(outer, None, "x").unwrap();
    assert_eq!(x.table, outer_table);
}

#[test]
fn child_scope_sees_parent_aliases() {
    let mut tree = ScopeTree::new();
    let outer = tree.create_scope(None);
    let inner = tree.create_scope(Some(outer));
    tree.create_base_table(outer, &relation("t", &[("x", PrimitiveType::Bool)]), "outerAlias")
        .unwrap();
    tree.create_base_table(inner, &relation("u", &[("x", PrimitiveType::Bool)]), "innerAlias")
        .unwrap();

    let column = tree.find_column(inner, Some("outerAlias"), "x").unwrap();
    assert_eq!(tree.column_scope(column), outer);

    assert_eq!(
        tree.find_column(outer, Some("innerAlias"), "x"),
        Err(SqlError::UnresolvedColumn("innerAlias.x".into()))
    );
}

#[test]
fn ambiguity_is_reported_before_walking_outward() {
    let mut tree = ScopeTree::new();
    let outer = tree.create_scope(None);
    let inner = tree.create_scope(Some(outer));
    tree.create_base_table(outer, &relation("t", &[("x", PrimitiveType::Bool)]), "t")
        .unwrap();
    tree.create_base_table(inner, &relation("a", &[("x", PrimitiveType::Bool)]), "a")
        .unwrap();
    tree.create_base_table(inner, &relation("b", &[("x", PrimitiveType::Bool)]), "b")
        .unwrap();

    assert_eq!(
        tree.find_column(inner, None, "x"),
        Err(SqlError::AmbiguousColumn("x".into()))
    );
}

#[test]
fn queued_tables_register_together_before_first_lookup() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope(None);

    let first = tree.create_output();
    tree.set_output_names(first, vec![Some("a".into())]).unwrap();
    let second = tree.create_output();
    tree.set_output_names(second, vec![Some("b".into())]).unwrap();

    tree.create_temporary_table(root, first, "s1");
    tree.create_temporary_table(root, second, "s2");

    assert_eq!(tree.local_columns(root).unwrap().len(), 2);
    assert!(tree.find_column(root, Some("s1"), "a").is_ok());
    assert!(tree.find_column(root, None, "b").is_ok());
    assert!(tree.local_base_tables(root).unwrap().is_empty());
}

#[test]
fn alias_reuse_between_base_and_temporary_table_fails() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope(None);
    let output = tree.create_output();
    tree.set_output_names(output, vec![Some("a".into())]).unwrap();

    tree.create_temporary_table(root, output, "t");
    tree.create_base_table(root, &relation("t", &[("z", PrimitiveType::Bool)]), "t")
        .unwrap();

    assert_eq!(
        tree.find_column(root, None, "z"),
        Err(SqlError::DuplicateAlias("t".into()))
    );
}

#[test]
fn columns_in_table_walks_outward() {
    let mut tree = ScopeTree::new();
    let outer = tree.create_scope(None);
    let inner = tree.create_scope(Some(outer));
    tree.create_base_table(
        outer,
        &relation("t", &[("x", PrimitiveType::Bool), ("y", PrimitiveType::Numeric)]),
        "t",
    )
    .unwrap();

    assert_eq!(tree.columns_in_table(inner, "t").unwrap().len(), 2);
    assert_eq!(tree.local_base_columns(outer).unwrap().len(), 2);
    assert_eq!(tree.local_base_columns(inner).unwrap().len(), 0);
}

#[test]
fn base_columns_expose_equality_arguments() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope(None);
    tree.create_base_table(root, &relation("t", &[("x", PrimitiveType::Bool)]), "t")
        .unwrap();
    let x = tree.find_column(root, None, "x").unwrap();
    let arg = tree.column(x).unwrap().equality_arg().cloned();
    assert_eq!(arg.map(|a| a.to_string()), Some("t.x".to_string()));
}
