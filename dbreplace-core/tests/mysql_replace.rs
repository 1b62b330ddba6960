//! MySQL replace integration tests.
//!
//! This test suite covers:
//! - Table listing and column classification from INFORMATION_SCHEMA
//! - Streaming scan with concurrent per-row updates
//! - Full-row and primary-key identity against a real server
//! - NULLs, duplicate rows, binary and non-text columns
//!
//! The tests start a MySQL container and need a running Docker daemon.

#![cfg(feature = "mysql")]
#![allow(clippy::unwrap_used)]

use dbreplace_core::{
    ConnectionConfig, Credentials, DbReplaceError, IdentityStrategy, MySqlTarget, ReplaceConfig,
    ReplaceTarget, Result, run_replace,
};
use sqlx::{MySqlPool, Row};
use std::time::Duration;
use testcontainers_modules::{
    mysql::Mysql,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};

/// Helper function to wait for MySQL to be ready
async fn wait_for_mysql_ready(database_url: &str, max_attempts: u32) -> Result<()> {
    for attempt in 1..=max_attempts {
        if let Ok(pool) = MySqlPool::connect(database_url).await {
            if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                pool.close().await;
                return Ok(());
            }
            pool.close().await;
        }
        if attempt < max_attempts {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
    Err(DbReplaceError::connection_failed(
        "MySQL container",
        std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("MySQL failed to become ready after {max_attempts} attempts"),
        ),
    ))
}

struct TestDatabase {
    _container: ContainerAsync<Mysql>,
    port: u16,
    pool: MySqlPool,
}

impl TestDatabase {
    async fn start() -> Self {
        let container = Mysql::default().start().await.unwrap();
        let port = container.get_host_port_ipv4(3306).await.unwrap();
        let database_url = format!("mysql://root@127.0.0.1:{port}/test");

        wait_for_mysql_ready(&database_url, 30).await.unwrap();
        let pool = MySqlPool::connect(&database_url).await.unwrap();

        Self {
            _container: container,
            port,
            pool,
        }
    }

    async fn execute(&self, sql: &str) {
        sqlx::raw_sql(sql).execute(&self.pool).await.unwrap();
    }

    async fn target(&self) -> MySqlTarget {
        let config = ConnectionConfig::new("127.0.0.1", "test").with_port(self.port);
        let credentials = Credentials::new("root".to_string(), None);
        MySqlTarget::connect(config, &credentials).await.unwrap()
    }

    async fn texts(&self, sql: &str) -> Vec<Option<String>> {
        sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .unwrap()
            .iter()
            .map(|row| row.get::<Option<String>, _>(0))
            .collect()
    }
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_replace_end_to_end() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE users (
            id INT PRIMARY KEY,
            bio VARCHAR(255),
            note TEXT NULL,
            seen_at DATETIME NULL
        );
        INSERT INTO users VALUES
            (1, 'visit old.site.com now', NULL, NULL),
            (2, 'nothing to see', 'old.site.com/about', '2024-01-31 10:00:00'),
            (3, NULL, NULL, NULL);
        CREATE TABLE counters (id INT PRIMARY KEY, hits BIGINT);
        INSERT INTO counters VALUES (1, 10);",
    )
    .await;

    let target = db.target().await;
    let config = ReplaceConfig::new("old.site.com", "new.site.com")?;
    let report = run_replace(&target, "test", &config).await?;
    target.close().await;

    assert_eq!(report.total_replacements(), 2);
    assert!(report.failures.is_empty());

    let counters = report.tables.iter().find(|t| t.table == "counters").unwrap();
    assert!(counters.was_skipped());
    assert_eq!(counters.rows_scanned, 0);

    let users = report.tables.iter().find(|t| t.table == "users").unwrap();
    assert_eq!(users.text_columns, vec!["bio", "note"]);
    assert_eq!(users.rows_scanned, 3);
    assert_eq!(users.rows_updated, 2);
    assert_eq!(users.rows_unmatched, 0);

    assert_eq!(
        db.texts("SELECT bio FROM users ORDER BY id").await,
        vec![
            Some("visit new.site.com now".to_string()),
            Some("nothing to see".to_string()),
            None
        ]
    );
    assert_eq!(
        db.texts("SELECT note FROM users ORDER BY id").await,
        vec![None, Some("new.site.com/about".to_string()), None]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_second_run_is_fixed_point() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE posts (title VARCHAR(80), body MEDIUMTEXT);
        INSERT INTO posts VALUES ('foo', 'foo and foo'), ('bar', 'plain');",
    )
    .await;

    let target = db.target().await;
    let config = ReplaceConfig::new("foo", "bar")?;
    let first = run_replace(&target, "test", &config).await?;
    let second = run_replace(&target, "test", &config).await?;
    target.close().await;

    assert_eq!(first.total_replacements(), 2);
    assert_eq!(second.total_replacements(), 0);
    assert_eq!(
        db.texts("SELECT body FROM posts ORDER BY title").await,
        vec![Some("bar and bar".to_string()), Some("plain".to_string())]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_duplicate_rows_without_key() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE tags (label CHAR(10));
        INSERT INTO tags VALUES ('old'), ('old'), ('keep');",
    )
    .await;

    let target = db.target().await;
    let report = run_replace(&target, "test", &ReplaceConfig::new("old", "new")?).await?;
    target.close().await;

    let tags = &report.tables[0];
    assert_eq!(tags.rows_updated, 2);
    // The first UPDATE already rewrote both copies.
    assert_eq!(tags.rows_unmatched, 1);
    assert_eq!(
        db.texts("SELECT label FROM tags ORDER BY label").await,
        vec![
            Some("keep".to_string()),
            Some("new".to_string()),
            Some("new".to_string())
        ]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_primary_key_identity() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE pages (
            id INT PRIMARY KEY,
            body TEXT,
            score DOUBLE
        );
        INSERT INTO pages VALUES (1, 'old text', 0.1), (2, 'old again', 2.5);",
    )
    .await;

    let target = db.target().await;
    let config = ReplaceConfig::new("old", "new")?.with_identity(IdentityStrategy::PrimaryKey);
    let report = run_replace(&target, "test", &config).await?;
    target.close().await;

    assert_eq!(report.total_replacements(), 2);
    assert_eq!(report.tables[0].rows_unmatched, 0);
    assert_eq!(
        db.texts("SELECT body FROM pages ORDER BY id").await,
        vec![Some("new text".to_string()), Some("new again".to_string())]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_binary_and_quoted_identifiers() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE `odd``name` (
            `my col` VARCHAR(40),
            payload BLOB
        );
        INSERT INTO `odd``name` VALUES ('old value', X'00FF6F6C64');",
    )
    .await;

    let target = db.target().await;
    let report = run_replace(&target, "test", &ReplaceConfig::new("old", "new")?).await?;
    target.close().await;

    assert_eq!(report.tables[0].table, "odd`name");
    assert_eq!(report.tables[0].text_columns, vec!["my col"]);
    assert_eq!(report.total_replacements(), 1);

    let payload: Vec<u8> = sqlx::query_scalar("SELECT payload FROM `odd``name`")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(payload, vec![0x00, 0xFF, b'o', b'l', b'd']);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_views_are_not_listed() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE base (v VARCHAR(10));
        CREATE VIEW base_view AS SELECT v FROM base;",
    )
    .await;

    let target = db.target().await;
    let tables = target.list_tables().await?;
    let columns = target.describe_table("base").await?;
    target.close().await;

    assert_eq!(tables, vec!["base".to_string()]);
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].data_type, "varchar(10)");
    assert!(columns[0].is_nullable);
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_describe_missing_table_fails() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute("CREATE TABLE present (v VARCHAR(10));").await;

    let target = db.target().await;
    let missing = target.describe_table("gone").await;
    let present = target.describe_table("present").await?;
    target.close().await;

    assert!(matches!(
        missing,
        Err(DbReplaceError::Introspection { ref table, .. }) if table == "gone"
    ));
    assert!(!missing.unwrap_err().is_fatal());
    assert_eq!(present[0].key, "");
    assert_eq!(present[0].extra, "");
    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored flag"]
async fn test_mysql_describe_reads_key_and_extra() -> Result<()> {
    let db = TestDatabase::start().await;
    db.execute(
        "CREATE TABLE keyed (
            id INT AUTO_INCREMENT PRIMARY KEY,
            label VARCHAR(20) NOT NULL DEFAULT 'none'
        );",
    )
    .await;

    let target = db.target().await;
    let columns = target.describe_table("keyed").await?;
    target.close().await;

    assert!(columns[0].is_primary_key());
    assert_eq!(columns[0].extra, "auto_increment");
    assert!(!columns[1].is_nullable);
    assert_eq!(columns[1].default_value.as_deref(), Some("none"));
    Ok(())
}
