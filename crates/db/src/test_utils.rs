//! Throwaway `PostgreSQL` databases for integration tests.
//!
//! Connection settings come from `TEST_DB_*` environment variables.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Application tables, children first.
const TABLES: [&str; 3] = ["service_request", "challan", "user"];

/// Where the test server lives.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Database the shared tests run against.
    pub database: String,
}

impl TestDbConfig {
    /// Read `TEST_DB_HOST`, `TEST_DB_PORT`, `TEST_DB_USER`,
    /// `TEST_DB_PASSWORD` and `TEST_DB_NAME`, falling back to local defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |key: &str, fallback: &str| {
            std::env::var(key).unwrap_or_else(|_| fallback.to_string())
        };

        Self {
            host: var("TEST_DB_HOST", "localhost"),
            port: var("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: var("TEST_DB_USER", "challan_test"),
            password: var("TEST_DB_PASSWORD", "challan_test"),
            database: var("TEST_DB_NAME", "challan_test"),
        }
    }

    /// Connection URL for the named database on the test server.
    #[must_use]
    pub fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated database owned by one test.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    name: String,
    config: TestDbConfig,
}

impl TestDatabase {
    /// Migrate and connect to the shared database named in `config`.
    pub async fn connect(config: TestDbConfig) -> Result<Self, DbErr> {
        let name = config.database.clone();
        Self::open(config, name).await
    }

    /// Create a fresh, uniquely named database so tests can run in parallel.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let config = TestDbConfig::from_env();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("challan_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.url_for("postgres")).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{name}\""),
            ))
            .await?;
        admin.close().await?;

        Self::open(config, name).await
    }

    async fn open(config: TestDbConfig, name: String) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.url_for(&name)).await?;
        Migrator::up(&conn, None).await?;
        info!(database = %name, "Test database ready");

        Ok(Self {
            conn: Arc::new(conn),
            name,
            config,
        })
    }

    /// Shared handle for building repositories.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Empty every application table, keeping the schema.
    pub async fn truncate_all(&self) -> Result<(), DbErr> {
        let tables = TABLES.map(|t| format!("\"{t}\"")).join(", ");
        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("TRUNCATE TABLE {tables} CASCADE"),
            ))
            .await?;
        Ok(())
    }

    /// Close the pool and drop the database.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close_by_ref().await?;

        let admin = Database::connect(&self.config.url_for("postgres")).await?;
        // Stray sessions would block the drop
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
                    self.name
                ),
            ))
            .await
            .ok();
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\"", self.name),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.name, "Dropped test database");
        Ok(())
    }
}
