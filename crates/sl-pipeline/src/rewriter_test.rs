use super::*;
use sl_core::{SchemaTable, TableName};
use sl_db::{EmbeddedDialect, ServerDialect};
use sl_sql::{ValidatedStatement, Verb};

fn ordered(table: &str, sql: &str) -> OrderedStatement {
    OrderedStatement {
        statement: ValidatedStatement {
            sql: sql.to_string(),
            verb: Verb::Insert,
            table: TableName::new(table),
            position: 0,
        },
        rank: 1,
    }
}

fn schema() -> Schema {
    Schema::new(vec![
        SchemaTable::new("departments").with_unique_key(true),
        SchemaTable::new("notes"),
    ])
}

#[test]
fn test_embedded_rewrite() {
    let rewriter = IdempotencyRewriter::from_schema(&EmbeddedDialect, &schema());
    let out = rewriter.rewrite(ordered(
        "departments",
        "INSERT INTO departments (name) VALUES ('CS');",
    ));
    assert_eq!(
        out.statement.sql,
        "INSERT OR IGNORE INTO departments (name) VALUES ('CS')"
    );
}

#[test]
fn test_server_rewrite() {
    let rewriter = IdempotencyRewriter::from_schema(&ServerDialect, &schema());
    let out = rewriter.rewrite(ordered("departments", "INSERT INTO departments (name) VALUES ('CS')"));
    assert_eq!(
        out.statement.sql,
        "INSERT INTO departments (name) VALUES ('CS') ON CONFLICT DO NOTHING"
    );
}

#[test]
fn test_existing_clause_untouched() {
    let rewriter = IdempotencyRewriter::from_schema(&ServerDialect, &schema());
    let sql = "INSERT INTO departments (name) VALUES ('CS') ON CONFLICT (name) DO NOTHING";
    let out = rewriter.rewrite(ordered("departments", sql));
    assert_eq!(out.statement.sql, sql);
}

#[test]
fn test_table_without_unique_key_untouched() {
    let rewriter = IdempotencyRewriter::from_schema(&EmbeddedDialect, &schema());
    let sql = "INSERT INTO notes (body) VALUES ('x')";
    let out = rewriter.rewrite(ordered("notes", sql));
    assert_eq!(out.statement.sql, sql);
}

#[test]
fn test_rewrite_all_keeps_order() {
    let rewriter = IdempotencyRewriter::new(&EmbeddedDialect, ["Departments"]);
    let out = rewriter.rewrite_all(vec![
        ordered("notes", "INSERT INTO notes VALUES ('a')"),
        ordered("departments", "INSERT INTO departments VALUES ('b')"),
    ]);
    assert_eq!(out[0].statement.table, "notes");
    assert!(out[1].statement.sql.starts_with("INSERT OR IGNORE INTO"));
}
