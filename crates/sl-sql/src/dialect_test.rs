use super::*;

#[test]
fn test_duckdb_parse() {
    let dialect = DuckDbDialect::new();
    let stmts = dialect.parse("SELECT * FROM departments").unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_postgres_parse_ilike() {
    let dialect = PostgresDialect::new();
    let stmts = dialect
        .parse("SELECT name FROM departments WHERE name ILIKE '%math%' LIMIT 5")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_empty() {
    let dialect = DuckDbDialect::new();
    assert!(matches!(dialect.parse("  "), Err(SqlError::EmptySql)));
}

#[test]
fn test_parse_error_location() {
    let dialect = DuckDbDialect::new();
    let result = dialect.parse("SELECT * FROM departments\nWHERE name = = 1");
    match result {
        Err(SqlError::ParseError { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_location_from_error_text() {
    assert_eq!(
        parse_location_from_error("Expected: an expression, found: FROM at Line: 2, Column: 1"),
        (2, 1)
    );
    assert_eq!(parse_location_from_error("no location"), (0, 0));
}

#[test]
fn test_tokenize_skips_whitespace() {
    let dialect = DuckDbDialect::new();
    let tokens = dialect.tokenize("SELECT  1").unwrap();
    assert_eq!(tokens.len(), 2);
}

#[test]
fn test_for_store() {
    assert_eq!(for_store("postgres").name(), "postgres");
    assert_eq!(for_store("duckdb").name(), "duckdb");
    assert_eq!(for_store("anything").name(), "duckdb");
}

#[test]
fn test_default_schema() {
    assert_eq!(DuckDbDialect::new().default_schema(), "main");
    assert_eq!(PostgresDialect::new().default_schema(), "public");
}

#[test]
fn test_duckdb_lexes_escape_string_as_one_literal() {
    let tokens = DuckDbDialect::new().tokenize("SELECT E'\\'';").unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[2], Token::SemiColon);
}
