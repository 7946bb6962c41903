use super::*;

fn university() -> Schema {
    Schema::new(vec![
        SchemaTable::new("programs")
            .with_columns(vec![
                ColumnInfo::new("id", "INTEGER"),
                ColumnInfo::new("name", "VARCHAR"),
                ColumnInfo::new("department_id", "INTEGER"),
            ])
            .with_foreign_keys(vec![ForeignKey {
                column: "department_id".into(),
                references_table: "departments".into(),
                references_column: "id".into(),
            }])
            .with_unique_key(true),
        SchemaTable::new("departments")
            .with_columns(vec![
                ColumnInfo::new("id", "INTEGER"),
                ColumnInfo::new("name", "VARCHAR"),
            ])
            .with_unique_key(true),
    ])
}

#[test]
fn test_tables_sorted_by_name() {
    let schema = university();
    let names: Vec<String> = schema
        .table_names()
        .into_iter()
        .map(|n| n.into_inner())
        .collect();
    assert_eq!(names, vec!["departments", "programs"]);
}

#[test]
fn test_duplicate_tables_collapse() {
    let schema = Schema::new(vec![
        SchemaTable::new("faqs"),
        SchemaTable::new("FAQS"),
    ]);
    assert_eq!(schema.tables().len(), 1);
}

#[test]
fn test_get_is_case_insensitive() {
    let schema = university();
    assert!(schema.get("DEPARTMENTS").is_some());
    assert!(schema.get("public.programs").is_some());
    assert!(schema.get("courses").is_none());
}

#[test]
fn test_describe_renders_columns_and_relationships() {
    let text = university().describe();
    assert!(text.starts_with("Available tables in database:"));
    assert!(text.contains("departments(\n  id INTEGER,\n  name VARCHAR,\n)"));
    assert!(text.contains("DATABASE RELATIONSHIPS:"));
    assert!(text.contains("programs.department_id -> departments.id"));
}

#[test]
fn test_describe_empty_schema() {
    let text = Schema::empty().describe();
    assert!(text.contains("(none)"));
    assert!(!text.contains("DATABASE RELATIONSHIPS"));
}

#[test]
fn test_describe_without_foreign_keys_has_no_relationship_section() {
    let schema = Schema::new(vec![SchemaTable::new("faqs")
        .with_columns(vec![ColumnInfo::new("question", "TEXT")])]);
    assert!(!schema.describe().contains("DATABASE RELATIONSHIPS"));
}

#[test]
fn test_whitelist_resolves_canonical_name() {
    let whitelist = Whitelist::from_names(["Departments", "courses"]);
    assert!(whitelist.contains("departments"));
    assert!(whitelist.contains("\"COURSES\""));
    assert_eq!(whitelist.resolve("DEPARTMENTS"), Some("Departments"));
    assert_eq!(whitelist.resolve("users"), None);
    assert_eq!(whitelist.len(), 2);
}

#[test]
fn test_empty_whitelist_admits_nothing() {
    let whitelist = Schema::empty().whitelist();
    assert!(whitelist.is_empty());
    assert!(!whitelist.contains("departments"));
}

#[test]
fn test_parents_skip_self_reference() {
    let table = SchemaTable::new("courses").with_foreign_keys(vec![
        ForeignKey {
            column: "prerequisite_id".into(),
            references_table: "courses".into(),
            references_column: "id".into(),
        },
        ForeignKey {
            column: "program_id".into(),
            references_table: "programs".into(),
            references_column: "id".into(),
        },
    ]);
    let parents: Vec<&str> = table.parents().collect();
    assert_eq!(parents, vec!["programs"]);
}
