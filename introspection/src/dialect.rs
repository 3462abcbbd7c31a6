//! SQL dialect strategy.
//!
//! Every catalog query lives here, selected per target dialect. Operation
//! bodies never carry free-form SQL literals, so a Postgres catalog query
//! cannot leak into a MySQL-wire session. MySQL templates bind with `?`,
//! Postgres templates with `$n`.

use serde::{Deserialize, Serialize};

/// System schemas never reported by schema-wide listings on MySQL-wire
/// servers (MySQL, MariaDB, TiDB).
const MYSQL_SYSTEM_SCHEMAS: [&str; 6] = [
    "information_schema",
    "performance_schema",
    "sys",
    "mysql",
    "tidb",
    "metrics_schema",
];

/// System schemas never reported by schema-wide listings on Postgres.
const POSTGRES_SYSTEM_SCHEMAS: [&str; 2] = ["pg_catalog", "information_schema"];

/// SQL/catalog vocabulary of a database server family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL information_schema vocabulary (MySQL, MariaDB, TiDB).
    MySql,
    /// PostgreSQL information_schema + pg_catalog vocabulary.
    Postgres,
}

impl Dialect {
    /// Base tables and views of one schema. Binds: schema.
    pub fn tables_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(TABLE_NAME AS CHAR) AS table_name \
                 FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = ? AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')"
            }
            Dialect::Postgres => {
                "SELECT table_name \
                 FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type IN ('BASE TABLE', 'VIEW')"
            }
        }
    }

    /// All databases on the server. No binds; reserved names are filtered
    /// by the caller.
    pub fn databases_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SHOW DATABASES",
            Dialect::Postgres => "SELECT datname FROM pg_database WHERE datistemplate = false",
        }
    }

    /// Name of the session's active database; NULL when none is selected.
    pub fn current_database_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT DATABASE()",
            Dialect::Postgres => "SELECT current_database()",
        }
    }

    /// Columns of one table in physical order. Binds: schema, table.
    pub fn columns_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name, \
                        CAST(DATA_TYPE AS CHAR) AS data_type, \
                        CAST(IS_NULLABLE AS CHAR) AS is_nullable, \
                        CAST(COLUMN_DEFAULT AS CHAR) AS column_default, \
                        CAST(COLUMN_TYPE AS CHAR) AS column_type \
                 FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
                 ORDER BY ORDINAL_POSITION"
            }
            Dialect::Postgres => {
                "SELECT column_name, data_type, is_nullable, column_default, udt_name \
                 FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 \
                 ORDER BY ordinal_position"
            }
        }
    }

    /// Index rows of one table. Binds: schema, table.
    ///
    /// MySQL returns one row per indexed column (grouped by the caller);
    /// Postgres returns the server's full index definition.
    pub fn indexes_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(INDEX_NAME AS CHAR) AS index_name, \
                        CAST(COLUMN_NAME AS CHAR) AS column_name, \
                        CAST(NON_UNIQUE AS SIGNED) AS non_unique \
                 FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
                 ORDER BY INDEX_NAME, SEQ_IN_INDEX"
            }
            Dialect::Postgres => {
                "SELECT indexname, indexdef \
                 FROM pg_indexes \
                 WHERE schemaname = $1 AND tablename = $2 \
                 ORDER BY indexname"
            }
        }
    }

    /// Table privileges visible to the authenticated user. No binds.
    pub fn grants_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(GRANTEE AS CHAR) AS grantee, \
                        CAST(PRIVILEGE_TYPE AS CHAR) AS privilege_type \
                 FROM information_schema.TABLE_PRIVILEGES"
            }
            Dialect::Postgres => {
                "SELECT grantee, privilege_type \
                 FROM information_schema.table_privileges \
                 WHERE grantee = current_user"
            }
        }
    }

    /// Account names, from catalogs that commonly require elevated
    /// privileges. No binds.
    pub fn users_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT CAST(user AS CHAR) AS user FROM mysql.user",
            Dialect::Postgres => "SELECT usename FROM pg_catalog.pg_user",
        }
    }

    /// Character set of the active database. No binds.
    pub fn charset_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT @@character_set_database",
            Dialect::Postgres => {
                "SELECT pg_encoding_to_char(encoding) \
                 FROM pg_database WHERE datname = current_database()"
            }
        }
    }

    /// Collation of the active database. No binds.
    pub fn collation_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT @@collation_database",
            Dialect::Postgres => {
                "SELECT datcollate FROM pg_database WHERE datname = current_database()"
            }
        }
    }

    /// Every column of every table in one schema, ordered by table then
    /// physical position, with system schemas excluded. Binds: schema.
    pub fn schema_columns_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(TABLE_NAME AS CHAR) AS table_name, \
                        CAST(COLUMN_NAME AS CHAR) AS column_name, \
                        CAST(DATA_TYPE AS CHAR) AS data_type \
                 FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = ? \
                   AND TABLE_SCHEMA NOT IN ('information_schema', 'performance_schema', \
                                            'sys', 'mysql', 'tidb', 'metrics_schema') \
                 ORDER BY TABLE_NAME, ORDINAL_POSITION"
            }
            Dialect::Postgres => {
                "SELECT table_name, column_name, data_type \
                 FROM information_schema.columns \
                 WHERE table_schema = $1 \
                   AND table_schema NOT IN ('pg_catalog', 'information_schema') \
                 ORDER BY table_name, ordinal_position"
            }
        }
    }

    /// Server version string. No binds.
    pub fn version_sql(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT VERSION()",
            Dialect::Postgres => "SHOW server_version",
        }
    }

    /// Liveness probe. No binds.
    pub fn ping_sql(&self) -> &'static str {
        "SELECT 1"
    }

    /// Schemas this dialect treats as server-internal.
    pub fn system_schemas(&self) -> &'static [&'static str] {
        match self {
            Dialect::MySql => &MYSQL_SYSTEM_SCHEMAS,
            Dialect::Postgres => &POSTGRES_SYSTEM_SCHEMAS,
        }
    }

    /// Default active schema when the caller does not pin one. MySQL-wire
    /// servers are asked for their current database instead.
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::MySql => None,
            Dialect::Postgres => Some("public"),
        }
    }

    /// Dialect tag used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
