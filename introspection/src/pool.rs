//! Datasource pool handle.
//!
//! Wraps the sqlx pool owned by the embedding application. This crate never
//! opens or closes connections; it only issues read-only queries.

use sqlx::{MySqlPool, PgPool};

use crate::dialect::Dialect;

/// Connection pool wrapper for the supported database families.
#[derive(Clone)]
pub enum DatasourcePool {
    /// MySQL-wire pool (MySQL, MariaDB, TiDB).
    MySql(MySqlPool),
    /// PostgreSQL pool.
    Postgres(PgPool),
}

impl DatasourcePool {
    /// Returns the dialect spoken by this pool's server family.
    pub fn dialect(&self) -> Dialect {
        match self {
            DatasourcePool::MySql(_) => Dialect::MySql,
            DatasourcePool::Postgres(_) => Dialect::Postgres,
        }
    }
}

impl From<MySqlPool> for DatasourcePool {
    fn from(pool: MySqlPool) -> Self {
        DatasourcePool::MySql(pool)
    }
}

impl From<PgPool> for DatasourcePool {
    fn from(pool: PgPool) -> Self {
        DatasourcePool::Postgres(pool)
    }
}
