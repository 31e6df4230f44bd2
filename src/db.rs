use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, SqlxMySqlConnector, Statement};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::path::PathBuf;
use tokio::fs;

pub type DbPool = MySqlPool;
pub type OrmConn = DatabaseConnection;

/// Create the sqlx MySQL pool shared by the raw-query services.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap an existing pool in a SeaORM connection so both layers share connections.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxMySqlConnector::from_sqlx_mysql_pool(pool.clone())
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // MySQL prepared statements cannot contain multiple commands either,
        // so split the migration file and run each statement individually.
        for stmt in split_statements(&sql) {
            conn.execute(Statement::from_string(backend, stmt)).await?;
        }
    }

    Ok(())
}

/// Splits a migration script on `;`. Whole-line `--` comments are dropped
/// first, so they may contain any text.
pub fn split_statements(sql: &str) -> Vec<String> {
    let code: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .map(|line| format!("{line}\n"))
        .collect();
    code.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_lines_do_not_split_statements() {
        let sql = "-- first table; the second follows\n\
                   CREATE TABLE a (id INT);\n\
                   \n\
                   -- note; with a semicolon\n\
                   CREATE TABLE b (id INT);\n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]
        );
    }

    #[test]
    fn bundled_migrations_split_into_whole_statements() -> Result<()> {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");
        let mut tables = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "sql") {
                continue;
            }
            for stmt in split_statements(&std::fs::read_to_string(&path)?) {
                let head = stmt.to_uppercase();
                assert!(
                    ["CREATE ", "ALTER ", "INSERT ", "DROP "]
                        .iter()
                        .any(|kw| head.starts_with(kw)),
                    "{}: fragment is not a statement: {stmt}",
                    path.display()
                );
                if head.starts_with("CREATE TABLE") {
                    tables += 1;
                }
            }
        }
        assert_eq!(tables, 7);
        Ok(())
    }
}
