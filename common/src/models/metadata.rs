//! Metadata record types.
//!
//! Plain structured values returned by introspection operations. All of
//! these are transient query results with a lifetime of one call; nothing
//! here is persisted.

use serde::{Deserialize, Serialize};

/// A single column of a table, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Base data type (e.g. `int`, `varchar`).
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Column default expression, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Full type text including length/precision (e.g. `varchar(255)`).
    pub type_detail: String,
}

/// A single index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Index definition text. Postgres reports the server's `indexdef`;
    /// MySQL-family servers get a `KEY name (a, b)` rendering built from
    /// the statistics catalog.
    pub definition: String,
}

/// Per-table column summary, columns in physical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchemaSummary {
    /// Table name.
    pub table_name: String,
    /// Column names ordered by ordinal position.
    pub column_list: Vec<String>,
}

impl TableSchemaSummary {
    /// Renders the column list as `"name, name, …"`.
    pub fn joined(&self) -> String {
        self.column_list.join(", ")
    }
}

/// A recorded privilege assignment visible to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    /// Grantee account (e.g. `'app'@'%'` or a role name).
    pub grantee: String,
    /// Privilege keyword (e.g. `SELECT`, `INSERT`).
    pub privilege_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_joined_uses_comma_space() {
        let summary = TableSchemaSummary {
            table_name: "mytable".to_string(),
            column_list: vec!["id".to_string(), "name".to_string(), "age".to_string()],
        };
        assert_eq!(summary.joined(), "id, name, age");
    }

    #[test]
    fn test_summary_joined_single_column() {
        let summary = TableSchemaSummary {
            table_name: "t".to_string(),
            column_list: vec!["id".to_string()],
        };
        assert_eq!(summary.joined(), "id");
    }

    #[test]
    fn test_column_info_serializes_without_absent_default() {
        let column = ColumnInfo {
            name: "id".to_string(),
            data_type: "int".to_string(),
            nullable: false,
            default: None,
            type_detail: "int(11)".to_string(),
        };
        let json = serde_json::to_string(&column).unwrap();
        assert!(!json.contains("default"));
        assert!(json.contains("\"type_detail\":\"int(11)\""));
    }
}
