//! Metadata introspection facade.
//!
//! Translates a fixed menu of "describe the database" requests into dialect
//! queries and typed results. Structural operations propagate typed errors;
//! permission-sensitive lookups (grants, users, charset, collation) degrade
//! to an empty or absent result with a logged warning, since restricted
//! servers routinely deny them.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use common::config::IntrospectionConfig;
use common::errors::{AppError, AppResult};
use common::models::metadata::{ColumnInfo, GrantEntry, IndexInfo, TableSchemaSummary};
use common::utils::IdentifierValidator;

use crate::dialect::Dialect;
use crate::pool::DatasourcePool;

/// Database names never reported by `list_databases`, regardless of dialect.
const RESERVED_DATABASES: [&str; 3] = ["template0", "template1", "postgres"];

/// Introspection operations offered by a datasource connector.
#[async_trait]
pub trait MetadataIntrospectorTrait: Send + Sync {
    /// Union of base tables and views in the active schema.
    async fn list_tables(&self) -> AppResult<BTreeSet<String>>;

    /// All databases on the server minus the reserved names, in the
    /// server's result order.
    async fn list_databases(&self) -> AppResult<Vec<String>>;

    /// Name of the session's active database.
    async fn current_database(&self) -> AppResult<String>;

    /// Columns of a table in physical order.
    async fn get_columns(&self, table: &str) -> AppResult<Vec<ColumnInfo>>;

    /// Indexes of a table.
    async fn get_indexes(&self, table: &str) -> AppResult<Vec<IndexInfo>>;

    /// Best-effort `CREATE TABLE` text per table, reconstructed from column
    /// name/type pairs.
    async fn get_table_comments(&self) -> AppResult<Vec<(String, String)>>;

    /// Per-table column summaries for the active schema.
    async fn table_summaries(&self) -> AppResult<Vec<TableSchemaSummary>>;

    /// One `(table, "col, col, …")` row per table, system schemas excluded.
    async fn table_simple_info(&self) -> AppResult<Vec<(String, String)>>;

    /// Server version string.
    async fn server_version(&self) -> AppResult<String>;

    /// Round-trip liveness probe; returns observed latency.
    async fn ping(&self) -> AppResult<Duration>;

    /// Privileges of the authenticated user. Empty when the server denies
    /// the lookup.
    async fn get_grants(&self) -> Vec<GrantEntry>;

    /// Account names. Empty when the server denies the lookup.
    async fn get_users(&self) -> Vec<String>;

    /// Character set of the active database, when readable.
    async fn get_character_set(&self) -> Option<String>;

    /// Collation of the active database, when readable.
    async fn get_collation(&self) -> Option<String>;
}

/// Metadata introspector over a live datasource pool.
pub struct MetadataIntrospector {
    pool: DatasourcePool,
    dialect: Dialect,
    config: IntrospectionConfig,
}

impl MetadataIntrospector {
    /// Creates an introspector; the dialect is derived from the pool.
    pub fn new(pool: impl Into<DatasourcePool>) -> Self {
        let pool = pool.into();
        let dialect = pool.dialect();
        Self {
            pool,
            dialect,
            config: IntrospectionConfig::default(),
        }
    }

    /// Creates an introspector with explicit settings.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the config fails validation.
    pub fn with_config(
        pool: impl Into<DatasourcePool>,
        config: IntrospectionConfig,
    ) -> AppResult<Self> {
        config.check()?;
        let pool = pool.into();
        let dialect = pool.dialect();
        Ok(Self {
            pool,
            dialect,
            config,
        })
    }

    /// Creates an introspector with an explicitly chosen dialect.
    ///
    /// # Errors
    /// Returns `AppError::DialectMismatch` when the dialect does not match
    /// the pool's server family.
    pub fn with_dialect(pool: impl Into<DatasourcePool>, dialect: Dialect) -> AppResult<Self> {
        let pool = pool.into();
        if pool.dialect() != dialect {
            return Err(AppError::DialectMismatch(format!(
                "{} dialect paired with {} pool",
                dialect,
                pool.dialect()
            )));
        }
        Ok(Self {
            pool,
            dialect,
            config: IntrospectionConfig::default(),
        })
    }

    /// The dialect this introspector speaks.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Resolves the active schema: config override, then dialect default,
    /// then the server's current database.
    async fn active_schema(&self) -> AppResult<String> {
        if let Some(schema) = &self.config.schema {
            return Ok(schema.clone());
        }
        if let Some(schema) = self.dialect.default_schema() {
            return Ok(schema.to_string());
        }
        self.fetch_current_database().await
    }

    async fn fetch_current_database(&self) -> AppResult<String> {
        let sql = self.dialect.current_database_sql();
        let name: Option<String> = match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query_scalar(sql).fetch_one(pool).await,
            DatasourcePool::Postgres(pool) => sqlx::query_scalar(sql).fetch_one(pool).await,
        }
        .map_err(AppError::from_sqlx)?;
        name.ok_or_else(|| AppError::NotFound("current database".to_string()))
    }

    /// Fetches `(table, column, data_type)` rows for the whole active
    /// schema, in table/ordinal order.
    async fn schema_columns(&self) -> AppResult<Vec<(String, String, String)>> {
        let schema = self.active_schema().await?;
        if self.is_excluded(&schema) {
            tracing::debug!(schema = %schema, "schema excluded from listing");
            return Ok(Vec::new());
        }
        let sql = self.dialect.schema_columns_sql();
        match &self.pool {
            DatasourcePool::MySql(pool) => {
                sqlx::query_as(sql).bind(&schema).fetch_all(pool).await
            }
            DatasourcePool::Postgres(pool) => {
                sqlx::query_as(sql).bind(&schema).fetch_all(pool).await
            }
        }
        .map_err(AppError::from_sqlx)
    }

    fn is_excluded(&self, schema: &str) -> bool {
        self.dialect
            .system_schemas()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(schema))
            || self
                .config
                .excluded_schemas
                .iter()
                .any(|s| s.eq_ignore_ascii_case(schema))
    }

    async fn fetch_grants(&self) -> AppResult<Vec<GrantEntry>> {
        let sql = self.dialect.grants_sql();
        let rows: Vec<(String, String)> = match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query_as(sql).fetch_all(pool).await,
            DatasourcePool::Postgres(pool) => sqlx::query_as(sql).fetch_all(pool).await,
        }
        .map_err(AppError::from_sqlx)?;
        Ok(rows
            .into_iter()
            .map(|(grantee, privilege_type)| GrantEntry {
                grantee,
                privilege_type,
            })
            .collect())
    }

    async fn fetch_users(&self) -> AppResult<Vec<String>> {
        let sql = self.dialect.users_sql();
        let rows: Vec<(String,)> = match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query_as(sql).fetch_all(pool).await,
            DatasourcePool::Postgres(pool) => sqlx::query_as(sql).fetch_all(pool).await,
        }
        .map_err(AppError::from_sqlx)?;
        Ok(rows.into_iter().map(|(user,)| user).collect())
    }

    async fn fetch_scalar(&self, sql: &str) -> AppResult<String> {
        match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query_scalar(sql).fetch_one(pool).await,
            DatasourcePool::Postgres(pool) => sqlx::query_scalar(sql).fetch_one(pool).await,
        }
        .map_err(AppError::from_sqlx)
    }
}

#[async_trait]
impl MetadataIntrospectorTrait for MetadataIntrospector {
    async fn list_tables(&self) -> AppResult<BTreeSet<String>> {
        let schema = self.active_schema().await?;
        let sql = self.dialect.tables_sql();
        let rows: Vec<(String,)> = match &self.pool {
            DatasourcePool::MySql(pool) => {
                sqlx::query_as(sql).bind(&schema).fetch_all(pool).await
            }
            DatasourcePool::Postgres(pool) => {
                sqlx::query_as(sql).bind(&schema).fetch_all(pool).await
            }
        }
        .map_err(AppError::from_sqlx)?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn list_databases(&self) -> AppResult<Vec<String>> {
        let sql = self.dialect.databases_sql();
        let rows: Vec<(String,)> = match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query_as(sql).fetch_all(pool).await,
            DatasourcePool::Postgres(pool) => sqlx::query_as(sql).fetch_all(pool).await,
        }
        .map_err(AppError::from_sqlx)?;
        Ok(filter_reserved(
            rows.into_iter().map(|(name,)| name).collect(),
        ))
    }

    async fn current_database(&self) -> AppResult<String> {
        self.fetch_current_database().await
    }

    async fn get_columns(&self, table: &str) -> AppResult<Vec<ColumnInfo>> {
        IdentifierValidator::validate(table)?;
        let schema = self.active_schema().await?;
        let sql = self.dialect.columns_sql();
        let rows: Vec<(String, String, String, Option<String>, String)> = match &self.pool {
            DatasourcePool::MySql(pool) => {
                sqlx::query_as(sql)
                    .bind(&schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await
            }
            DatasourcePool::Postgres(pool) => {
                sqlx::query_as(sql)
                    .bind(&schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await
            }
        }
        .map_err(AppError::from_sqlx)?;
        Ok(rows.into_iter().map(map_column_row).collect())
    }

    async fn get_indexes(&self, table: &str) -> AppResult<Vec<IndexInfo>> {
        IdentifierValidator::validate(table)?;
        let schema = self.active_schema().await?;
        let sql = self.dialect.indexes_sql();
        match &self.pool {
            DatasourcePool::MySql(pool) => {
                let rows: Vec<(String, String, i64)> = sqlx::query_as(sql)
                    .bind(&schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await
                    .map_err(AppError::from_sqlx)?;
                Ok(group_index_rows(rows))
            }
            DatasourcePool::Postgres(pool) => {
                let rows: Vec<(String, String)> = sqlx::query_as(sql)
                    .bind(&schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await
                    .map_err(AppError::from_sqlx)?;
                Ok(rows
                    .into_iter()
                    .map(|(name, definition)| IndexInfo { name, definition })
                    .collect())
            }
        }
    }

    async fn get_table_comments(&self) -> AppResult<Vec<(String, String)>> {
        let rows = self.schema_columns().await?;
        Ok(group_table_columns(rows)
            .into_iter()
            .map(|(table, columns)| {
                let ddl = render_create_table(&table, &columns);
                (table, ddl)
            })
            .collect())
    }

    async fn table_summaries(&self) -> AppResult<Vec<TableSchemaSummary>> {
        let rows = self.schema_columns().await?;
        Ok(group_table_columns(rows)
            .into_iter()
            .map(|(table_name, columns)| TableSchemaSummary {
                table_name,
                column_list: columns.into_iter().map(|(name, _)| name).collect(),
            })
            .collect())
    }

    async fn table_simple_info(&self) -> AppResult<Vec<(String, String)>> {
        Ok(self
            .table_summaries()
            .await?
            .into_iter()
            .map(|summary| {
                let joined = summary.joined();
                (summary.table_name, joined)
            })
            .collect())
    }

    async fn server_version(&self) -> AppResult<String> {
        self.fetch_scalar(self.dialect.version_sql()).await
    }

    async fn ping(&self) -> AppResult<Duration> {
        let sql = self.dialect.ping_sql();
        let start = Instant::now();
        match &self.pool {
            DatasourcePool::MySql(pool) => sqlx::query(sql).execute(pool).await.map(|_| ()),
            DatasourcePool::Postgres(pool) => sqlx::query(sql).execute(pool).await.map(|_| ()),
        }
        .map_err(AppError::from_sqlx)?;
        Ok(start.elapsed())
    }

    async fn get_grants(&self) -> Vec<GrantEntry> {
        match self.fetch_grants().await {
            Ok(grants) => grants,
            Err(e) => {
                tracing::warn!(dialect = %self.dialect, error = %e, "grant listing unavailable");
                Vec::new()
            }
        }
    }

    async fn get_users(&self) -> Vec<String> {
        match self.fetch_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(dialect = %self.dialect, error = %e, "user listing unavailable");
                Vec::new()
            }
        }
    }

    async fn get_character_set(&self) -> Option<String> {
        match self.fetch_scalar(self.dialect.charset_sql()).await {
            Ok(charset) => Some(charset),
            Err(e) => {
                tracing::warn!(dialect = %self.dialect, error = %e, "charset lookup unavailable");
                None
            }
        }
    }

    async fn get_collation(&self) -> Option<String> {
        match self.fetch_scalar(self.dialect.collation_sql()).await {
            Ok(collation) => Some(collation),
            Err(e) => {
                tracing::warn!(dialect = %self.dialect, error = %e, "collation lookup unavailable");
                None
            }
        }
    }
}

/// Removes the reserved database names, preserving the server's order.
fn filter_reserved(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !RESERVED_DATABASES.contains(&name.as_str()))
        .collect()
}

/// Maps one catalog column row into a `ColumnInfo`.
fn map_column_row(
    (name, data_type, is_nullable, default, type_detail): (
        String,
        String,
        String,
        Option<String>,
        String,
    ),
) -> ColumnInfo {
    ColumnInfo {
        name,
        data_type,
        nullable: is_nullable.eq_ignore_ascii_case("YES"),
        default,
        type_detail,
    }
}

/// Groups MySQL statistics rows (one per indexed column, ordered by index
/// then sequence) into index definitions.
fn group_index_rows(rows: Vec<(String, String, i64)>) -> Vec<IndexInfo> {
    let mut grouped: Vec<(String, Vec<String>, bool)> = Vec::new();
    for (name, column, non_unique) in rows {
        match grouped.last_mut() {
            Some((last, columns, _)) if *last == name => columns.push(column),
            _ => grouped.push((name, vec![column], non_unique == 0)),
        }
    }
    grouped
        .into_iter()
        .map(|(name, columns, unique)| {
            let definition = if name == "PRIMARY" {
                format!("PRIMARY KEY ({})", columns.join(", "))
            } else if unique {
                format!("UNIQUE KEY {} ({})", name, columns.join(", "))
            } else {
                format!("KEY {} ({})", name, columns.join(", "))
            };
            IndexInfo { name, definition }
        })
        .collect()
}

/// Groups `(table, column, data_type)` rows into per-table column lists,
/// preserving the query's table/ordinal order.
fn group_table_columns(rows: Vec<(String, String, String)>) -> Vec<(String, Vec<(String, String)>)> {
    let mut grouped: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for (table, column, data_type) in rows {
        match grouped.last_mut() {
            Some((last, columns)) if *last == table => columns.push((column, data_type)),
            _ => grouped.push((table, vec![(column, data_type)])),
        }
    }
    grouped
}

/// Renders a best-effort `CREATE TABLE` text from column name/type pairs.
/// This is a textual approximation, not the server's authoritative DDL.
fn render_create_table(table: &str, columns: &[(String, String)]) -> String {
    let body = columns
        .iter()
        .map(|(name, data_type)| format!("  {} {}", name, data_type))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE {} (\n{}\n)", table, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::mysql::MySqlPoolOptions;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::{MySqlPool, PgPool};

    fn lazy_mysql_pool() -> MySqlPool {
        MySqlPoolOptions::new()
            .connect_lazy("mysql://app@localhost:3306/appdb")
            .unwrap()
    }

    fn lazy_postgres_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://app@localhost:5432/appdb")
            .unwrap()
    }

    #[tokio::test]
    async fn test_dialect_derived_from_pool() {
        let introspector = MetadataIntrospector::new(lazy_mysql_pool());
        assert_eq!(introspector.dialect(), Dialect::MySql);

        let introspector = MetadataIntrospector::new(lazy_postgres_pool());
        assert_eq!(introspector.dialect(), Dialect::Postgres);
    }

    #[tokio::test]
    async fn test_mismatched_dialect_is_rejected() {
        let result = MetadataIntrospector::with_dialect(lazy_mysql_pool(), Dialect::Postgres);
        assert!(matches!(result, Err(AppError::DialectMismatch(_))));

        let result = MetadataIntrospector::with_dialect(lazy_postgres_pool(), Dialect::Postgres);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = common::config::IntrospectionConfig::with_schema("");
        let result = MetadataIntrospector::with_config(lazy_mysql_pool(), config);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_active_schema_prefers_config_override() {
        let config = common::config::IntrospectionConfig::with_schema("reporting");
        let introspector =
            MetadataIntrospector::with_config(lazy_mysql_pool(), config).unwrap();
        assert_eq!(introspector.active_schema().await.unwrap(), "reporting");
    }

    #[tokio::test]
    async fn test_active_schema_falls_back_to_dialect_default() {
        let introspector = MetadataIntrospector::new(lazy_postgres_pool());
        assert_eq!(introspector.active_schema().await.unwrap(), "public");
    }

    #[tokio::test]
    async fn test_excluded_schema_check_covers_config_and_dialect() {
        let config = common::config::IntrospectionConfig {
            schema: None,
            excluded_schemas: vec!["staging".to_string()],
        };
        let introspector =
            MetadataIntrospector::with_config(lazy_mysql_pool(), config).unwrap();
        assert!(introspector.is_excluded("staging"));
        assert!(introspector.is_excluded("information_schema"));
        assert!(introspector.is_excluded("SYS"));
        assert!(!introspector.is_excluded("appdb"));
    }

    #[test]
    fn test_filter_reserved_removes_reserved_names() {
        let names = vec![
            "appdb".to_string(),
            "template0".to_string(),
            "template1".to_string(),
            "postgres".to_string(),
            "analytics".to_string(),
        ];
        assert_eq!(filter_reserved(names), vec!["appdb", "analytics"]);
    }

    #[test]
    fn test_filter_reserved_preserves_order() {
        let names = vec!["b".to_string(), "postgres".to_string(), "a".to_string()];
        assert_eq!(filter_reserved(names), vec!["b", "a"]);
    }

    #[test]
    fn test_map_column_row_nullable_flag() {
        let column = map_column_row((
            "name".to_string(),
            "varchar".to_string(),
            "YES".to_string(),
            None,
            "varchar(255)".to_string(),
        ));
        assert!(column.nullable);
        assert_eq!(column.type_detail, "varchar(255)");

        let column = map_column_row((
            "id".to_string(),
            "int".to_string(),
            "NO".to_string(),
            Some("0".to_string()),
            "int(11)".to_string(),
        ));
        assert!(!column.nullable);
        assert_eq!(column.default.as_deref(), Some("0"));
    }

    #[test]
    fn test_group_index_rows_merges_composite_indexes() {
        let rows = vec![
            ("PRIMARY".to_string(), "id".to_string(), 0),
            ("idx_name_age".to_string(), "name".to_string(), 1),
            ("idx_name_age".to_string(), "age".to_string(), 1),
            ("uniq_email".to_string(), "email".to_string(), 0),
        ];
        let indexes = group_index_rows(rows);
        assert_eq!(indexes.len(), 3);
        assert_eq!(indexes[0].definition, "PRIMARY KEY (id)");
        assert_eq!(indexes[1].definition, "KEY idx_name_age (name, age)");
        assert_eq!(indexes[2].definition, "UNIQUE KEY uniq_email (email)");
    }

    #[test]
    fn test_group_index_rows_empty() {
        assert!(group_index_rows(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_table_columns_preserves_order() {
        let rows = vec![
            ("a".to_string(), "id".to_string(), "int".to_string()),
            ("a".to_string(), "name".to_string(), "varchar".to_string()),
            ("b".to_string(), "id".to_string(), "int".to_string()),
        ];
        let grouped = group_table_columns(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "a");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "b");
    }

    #[test]
    fn test_render_create_table_shape() {
        let columns = vec![
            ("id".to_string(), "int".to_string()),
            ("name".to_string(), "varchar".to_string()),
        ];
        let ddl = render_create_table("mytable", &columns);
        assert!(ddl.starts_with("CREATE TABLE mytable (\n"));
        assert!(ddl.contains("  id int,\n"));
        assert!(ddl.contains("  name varchar\n"));
        assert!(ddl.ends_with(")"));
        assert!(!ddl.contains(",\n)"));
    }

    #[test]
    fn test_simple_info_join_shape() {
        let summary = TableSchemaSummary {
            table_name: "mytable".to_string(),
            column_list: vec!["id".to_string(), "name".to_string(), "age".to_string()],
        };
        assert_eq!(
            (summary.table_name.clone(), summary.joined()),
            ("mytable".to_string(), "id, name, age".to_string())
        );
    }
}
