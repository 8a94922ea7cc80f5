use sqlbench::sql::{validate_select_only, ValidationError};

fn rejected_operation(sql: &str) -> String {
    match validate_select_only(sql) {
        Err(ValidationError::Disallowed { operation }) => operation,
        other => panic!("expected {sql:?} to be rejected, got {other:?}"),
    }
}

#[test]
fn test_select_queries_accepted() {
    for sql in [
        "SELECT * FROM users",
        "SELECT id, name FROM users WHERE active = true AND created_at > '2024-01-01'",
        "SELECT u.name, p.title FROM users u JOIN projects p ON u.id = p.user_id LEFT JOIN teams t ON t.id = u.team_id",
        "SELECT * FROM users ORDER BY created_at DESC LIMIT 10",
        "WITH active AS (SELECT * FROM users WHERE active = true) SELECT * FROM active",
        "WITH a AS (SELECT 1 AS x), b AS (SELECT x FROM a) SELECT * FROM b",
        "SELECT 1 + 1 AS two",
    ] {
        assert_eq!(validate_select_only(sql), Ok(()), "{sql}");
    }
}

#[test]
fn test_metadata_queries_accepted() {
    assert_eq!(validate_select_only("SHOW TABLES"), Ok(()));
    assert_eq!(validate_select_only("DESCRIBE system.runtime.queries"), Ok(()));
    assert_eq!(validate_select_only("SHOW CATALOGS"), Ok(()));
}

#[test]
fn test_dml_and_ddl_rejected_by_name() {
    let cases = [
        ("INSERT INTO users (name, email) VALUES ('John', 'john@example.com')", "INSERT"),
        ("UPDATE users SET active = false WHERE id = 1", "UPDATE"),
        ("DELETE FROM users WHERE active = false", "DELETE"),
        ("CREATE TABLE new_table (id INT, name VARCHAR(50))", "CREATE"),
        ("DROP TABLE users", "DROP"),
        ("ALTER TABLE users ADD COLUMN phone VARCHAR(20)", "ALTER"),
        ("TRUNCATE TABLE users", "TRUNCATE"),
    ];

    for (sql, operation) in cases {
        assert_eq!(rejected_operation(sql), operation);
    }
}

#[test]
fn test_writes_wrapped_in_queries_rejected() {
    assert_eq!(
        rejected_operation("WITH a AS (SELECT 1) INSERT INTO t SELECT * FROM a"),
        "INSERT"
    );
    assert_eq!(
        rejected_operation("WITH a AS (SELECT 1) UPDATE t SET x = 1"),
        "UPDATE"
    );
    assert_eq!(
        rejected_operation(
            "WITH recent AS (SELECT id FROM orders) INSERT INTO archive SELECT id FROM recent"
        ),
        "INSERT"
    );
    assert!(validate_select_only("WITH a AS (SELECT 1) DELETE FROM t").is_err());
}

#[test]
fn test_set_operations_and_nested_queries_accepted() {
    for sql in [
        "SELECT id FROM a UNION ALL SELECT id FROM b",
        "(SELECT id FROM a) EXCEPT (SELECT id FROM b)",
        "WITH x AS (SELECT 1 AS n) SELECT n FROM x UNION SELECT 2",
    ] {
        assert_eq!(validate_select_only(sql), Ok(()), "{sql}");
    }
}

#[test]
fn test_rejection_message_names_operation() {
    let error = validate_select_only("DROP TABLE users").unwrap_err();
    assert_eq!(
        error.to_string(),
        "DROP operations are not allowed. Only SELECT queries are permitted."
    );
}

#[test]
fn test_multiple_select_statements_accepted() {
    assert_eq!(
        validate_select_only("SELECT * FROM users; SELECT * FROM projects;"),
        Ok(())
    );
}

#[test]
fn test_mixed_batches_report_first_violation() {
    assert_eq!(
        rejected_operation("SELECT * FROM users; INSERT INTO logs (message) VALUES ('test');"),
        "INSERT"
    );
    assert_eq!(
        rejected_operation("SELECT * FROM users; UPDATE users SET last_login = NOW();"),
        "UPDATE"
    );
    assert_eq!(
        rejected_operation("SELECT 1; DELETE FROM a; DROP TABLE b"),
        "DELETE"
    );
}

#[test]
fn test_metadata_bypass_does_not_hide_batches() {
    assert_eq!(rejected_operation("SHOW TABLES; DROP TABLE users"), "DROP");
}

#[test]
fn test_empty_queries() {
    assert_eq!(validate_select_only(""), Err(ValidationError::Empty));
    assert_eq!(validate_select_only("   \n\t   "), Err(ValidationError::Empty));
    assert!(validate_select_only("")
        .unwrap_err()
        .to_string()
        .contains("Empty query"));
}

#[test]
fn test_invalid_sql() {
    let error = validate_select_only("This is not SQL at all!").unwrap_err();
    assert!(matches!(error, ValidationError::Parse(_)));
    assert!(error.to_string().contains("SQL parsing failed"));
}
