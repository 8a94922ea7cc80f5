use insta::assert_snapshot;
use sqlbench::sql::{bound_query, is_metadata_command, rewrite_with_limit};

#[test]
fn test_simple_select_is_wrapped() {
    let sql = rewrite_with_limit("SELECT id FROM users", 100);
    assert_eq!(sql, "SELECT * FROM (\nSELECT id FROM users\n) LIMIT 100");
}

#[test]
fn test_trailing_semicolon_stays_outside_subselect() {
    assert_eq!(
        rewrite_with_limit("SELECT id FROM users;", 100),
        "SELECT * FROM (\nSELECT id FROM users\n) LIMIT 100"
    );
    assert_eq!(
        rewrite_with_limit("SELECT id FROM users ORDER BY id DESC;\n", 50),
        "SELECT * FROM (\nSELECT id FROM users ORDER BY id DESC\n) ORDER BY id DESC LIMIT 50"
    );
    assert_eq!(
        rewrite_with_limit("INVALID SQL SYNTAX ;", 10),
        "SELECT * FROM (\nINVALID SQL SYNTAX\n) LIMIT 10"
    );
    assert_eq!(
        rewrite_with_limit("SELECT id FROM users LIMIT 5;", 100),
        "SELECT id FROM users LIMIT 5"
    );
}

#[test]
fn test_order_by_lifted_to_outer_query() {
    let sql = rewrite_with_limit("SELECT id FROM users ORDER BY id DESC", 50);
    assert!(sql.contains(
        "SELECT * FROM (\nSELECT id FROM users ORDER BY id DESC\n) ORDER BY id DESC LIMIT 50"
    ));
}

#[test]
fn test_multi_column_order_by() {
    let sql = rewrite_with_limit(
        "SELECT id, name, email FROM users ORDER BY name ASC, created_at DESC",
        200,
    );
    assert_snapshot!(sql, @r"
SELECT * FROM (
SELECT id, name, email FROM users ORDER BY name ASC, created_at DESC
) ORDER BY name ASC, created_at DESC LIMIT 200
");
}

#[test]
fn test_order_by_formatting_is_normalized() {
    let sql = rewrite_with_limit("SELECT id FROM users order   by  lower(name)   desc", 10);
    assert!(sql.contains("SELECT id FROM users order   by  lower(name)   desc"));
    assert!(sql.ends_with(") ORDER BY lower(name) DESC LIMIT 10"));
}

#[test]
fn test_smaller_existing_limit_is_kept() {
    let query = "SELECT id FROM users LIMIT 25";
    assert_eq!(rewrite_with_limit(query, 100), query);
}

#[test]
fn test_equal_existing_limit_is_kept() {
    let query = "SELECT id FROM users LIMIT 50";
    assert_eq!(rewrite_with_limit(query, 50), query);
}

#[test]
fn test_smaller_fetch_first_is_kept() {
    let query = "SELECT id FROM users FETCH FIRST 5 ROWS ONLY";
    assert_eq!(rewrite_with_limit(query, 100), query);
}

#[test]
fn test_larger_existing_limit_is_overridden() {
    let sql = rewrite_with_limit("SELECT id FROM users LIMIT 200", 100);
    assert_snapshot!(sql, @r"
SELECT * FROM (
SELECT id FROM users LIMIT 200
) LIMIT 100
");
}

#[test]
fn test_larger_limit_with_order_by_is_overridden() {
    let sql = rewrite_with_limit("SELECT id, name FROM users ORDER BY name LIMIT 500", 100);
    assert_snapshot!(sql, @r"
SELECT * FROM (
SELECT id, name FROM users ORDER BY name LIMIT 500
) ORDER BY name LIMIT 100
");
}

#[test]
fn test_select_without_from() {
    let sql = rewrite_with_limit("SELECT 1 as test", 10);
    assert_eq!(sql, "SELECT * FROM (\nSELECT 1 as test\n) LIMIT 10");
}

#[test]
fn test_unparseable_sql_falls_back_to_wrapping() {
    assert_eq!(
        rewrite_with_limit("INVALID SQL SYNTAX", 100),
        "SELECT * FROM (\nINVALID SQL SYNTAX\n) LIMIT 100"
    );
}

#[test]
fn test_multi_statement_falls_back_to_wrapping() {
    assert_eq!(
        rewrite_with_limit("SELECT 1; SELECT 2 ORDER BY 1", 5),
        "SELECT * FROM (\nSELECT 1; SELECT 2 ORDER BY 1\n) LIMIT 5"
    );
}

#[test]
fn test_non_query_statement_is_wrapped() {
    assert_eq!(
        rewrite_with_limit("INSERT INTO t VALUES (1)", 5),
        "SELECT * FROM (\nINSERT INTO t VALUES (1)\n) LIMIT 5"
    );
}

#[test]
fn test_cte_with_order_by() {
    let sql = rewrite_with_limit(
        "WITH recent AS (SELECT * FROM orders) SELECT id FROM recent ORDER BY id",
        20,
    );
    assert!(sql.starts_with("SELECT * FROM (\nWITH recent AS"));
    assert!(sql.ends_with(") ORDER BY id LIMIT 20"));
}

#[test]
fn test_metadata_commands_bypass_rewriting() {
    for sql in [
        "SHOW TABLES",
        "show databases",
        "  SHOW SCHEMAS  ",
        "DESCRIBE users",
        "describe table_name",
        "EXPLAIN SELECT * FROM users",
        "explain plan for SELECT * FROM users",
    ] {
        assert!(is_metadata_command(sql), "{sql}");
        assert_eq!(bound_query(sql, 10), sql);
    }

    assert!(!is_metadata_command("SELECT * FROM users"));
    assert!(!is_metadata_command("INSERT INTO users VALUES (1, 'test')"));
}
