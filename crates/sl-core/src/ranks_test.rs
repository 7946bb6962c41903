use super::*;
use crate::schema::{ForeignKey, SchemaTable};

fn fk(column: &str, parent: &str) -> ForeignKey {
    ForeignKey {
        column: column.into(),
        references_table: parent.into(),
        references_column: "id".into(),
    }
}

fn catalog() -> Schema {
    Schema::new(vec![
        SchemaTable::new("departments"),
        SchemaTable::new("programs").with_foreign_keys(vec![fk("department_id", "departments")]),
        SchemaTable::new("courses").with_foreign_keys(vec![
            fk("program_id", "programs"),
            fk("department_id", "departments"),
        ]),
        SchemaTable::new("faqs"),
    ])
}

#[test]
fn test_university_ranks() {
    let ranks = DependencyRanks::university();
    assert_eq!(ranks.rank_of("departments"), 1);
    assert_eq!(ranks.rank_of("programs"), 2);
    assert_eq!(ranks.rank_of("courses"), 3);
    assert_eq!(ranks.rank_of("exams"), 4);
    assert_eq!(ranks.rank_of("faculty_members"), 5);
    assert_eq!(ranks.rank_of("admissions"), 6);
    assert_eq!(ranks.rank_of("faqs"), 7);
    assert_eq!(ranks.rank_of("student_clubs"), 7);
}

#[test]
fn test_unknown_table_is_unranked() {
    let ranks = DependencyRanks::university();
    assert_eq!(ranks.rank_of("parking_permits"), UNRANKED);
    assert!(!ranks.is_ranked("parking_permits"));
}

#[test]
fn test_rank_lookup_is_case_insensitive() {
    let ranks = DependencyRanks::university();
    assert_eq!(ranks.rank_of("Departments"), 1);
    assert_eq!(ranks.rank_of("public.COURSES"), 3);
}

#[test]
fn test_deserialize_from_yaml_normalizes_keys() {
    let ranks: DependencyRanks = serde_yaml::from_str("Departments: 1\nPrograms: 2\n").unwrap();
    assert_eq!(ranks.rank_of("departments"), 1);
    assert_eq!(ranks.rank_of("programs"), 2);
    assert_eq!(ranks.len(), 2);
}

#[test]
fn test_entries_ordered_by_rank_then_name() {
    let ranks = DependencyRanks::new([("faqs", 7), ("departments", 1), ("campus_services", 7)]);
    let entries = ranks.entries();
    assert_eq!(
        entries,
        vec![("departments", 1), ("campus_services", 7), ("faqs", 7)]
    );
}

#[test]
fn test_merged_with_overrides_win() {
    let merged = DependencyRanks::university()
        .merged_with(&DependencyRanks::new([("faqs", 2), ("parking_permits", 8)]));
    assert_eq!(merged.rank_of("faqs"), 2);
    assert_eq!(merged.rank_of("parking_permits"), 8);
    assert_eq!(merged.rank_of("departments"), 1);
}

#[test]
fn test_from_foreign_keys_layers_parents_first() {
    let ranks = DependencyRanks::from_foreign_keys(&catalog()).unwrap();
    assert_eq!(ranks.rank_of("departments"), 1);
    assert_eq!(ranks.rank_of("faqs"), 1);
    assert_eq!(ranks.rank_of("programs"), 2);
    assert_eq!(ranks.rank_of("courses"), 3);
}

#[test]
fn test_from_foreign_keys_ignores_self_and_external_references() {
    let schema = Schema::new(vec![SchemaTable::new("courses").with_foreign_keys(vec![
        fk("prerequisite_id", "courses"),
        fk("building_id", "buildings"),
    ])]);
    let ranks = DependencyRanks::from_foreign_keys(&schema).unwrap();
    assert_eq!(ranks.rank_of("courses"), 1);
}

#[test]
fn test_from_foreign_keys_detects_cycle() {
    let schema = Schema::new(vec![
        SchemaTable::new("a").with_foreign_keys(vec![fk("b_id", "b")]),
        SchemaTable::new("b").with_foreign_keys(vec![fk("a_id", "a")]),
    ]);
    let err = DependencyRanks::from_foreign_keys(&schema).unwrap_err();
    assert!(matches!(err, CoreError::CircularDependency { .. }));
    assert!(err.to_string().contains("[C004]"));
}

#[test]
fn test_university_ranks_consistent_with_catalog() {
    let violations = DependencyRanks::university().violations(&catalog());
    assert!(violations.is_empty(), "unexpected: {:?}", violations);
}

#[test]
fn test_violation_when_parent_ranks_after_child() {
    let ranks = DependencyRanks::new([("departments", 3), ("programs", 2), ("courses", 4)]);
    let violations = ranks.violations(&catalog());
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].child, "programs");
    assert_eq!(violations[0].parent, "departments");
    assert!(violations[0].to_string().contains("rank 3"));
}

#[test]
fn test_violation_when_parent_unranked() {
    let ranks = DependencyRanks::new([("programs", 2), ("courses", 3)]);
    let violations = ranks.violations(&catalog());
    assert!(violations
        .iter()
        .any(|v| v.parent == "departments" && v.parent_rank == UNRANKED));
}

#[test]
fn test_children_first_orders_for_clearing() {
    let ranks = DependencyRanks::university();
    let tables = vec![
        TableName::new("departments"),
        TableName::new("faqs"),
        TableName::new("programs"),
        TableName::new("zeta_unranked"),
    ];
    let ordered: Vec<String> = ranks
        .children_first(&tables)
        .into_iter()
        .map(|t| t.into_inner())
        .collect();
    assert_eq!(
        ordered,
        vec!["zeta_unranked", "faqs", "programs", "departments"]
    );
}
