//! Records exchanged with a [`crate::CatalogProvider`].

use super::ObjectName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a catalog relation is a base table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

/// A table or view as reported by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
}

impl TableRecord {
    pub fn table(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
            kind: TableKind::Table,
        }
    }

    pub fn view(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            kind: TableKind::View,
            ..Self::table(schema, name)
        }
    }
}

/// A stored procedure as reported by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    /// Database-specific unique name (e.g. for overloads). Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_name: Option<String>,
}

impl ProcedureRecord {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
            specific_name: None,
        }
    }
}

/// A column of a catalog table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_identity: bool,
}

/// A foreign key from a detail table's columns to a master table's columns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The referencing table.
    pub detail: ObjectName,
    #[serde(default)]
    pub columns: Vec<String>,
    /// The referenced table.
    pub master: ObjectName,
    #[serde(default)]
    pub master_columns: Vec<String>,
}

impl ForeignKeyRecord {
    pub fn new(
        detail: ObjectName,
        columns: &[&str],
        master: ObjectName,
        master_columns: &[&str],
    ) -> Self {
        Self {
            name: None,
            detail,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            master,
            master_columns: master_columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Relationship between two tables, seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    None,
    /// The other table references this one.
    OneToMany,
    /// This table references the other one.
    ManyToOne,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
        };
        f.write_str(label)
    }
}

/// The kind of catalog object a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    Procedure,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("Table"),
            Self::Procedure => f.write_str("Procedure"),
        }
    }
}
