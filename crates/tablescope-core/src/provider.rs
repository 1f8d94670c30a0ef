//! Catalog provider trait and an in-memory implementation.
//!
//! A [`CatalogProvider`] is the boundary to the database: it enumerates
//! tables, procedures, columns and foreign keys from a live connection (or any
//! other source). Each enumeration is called at most once per snapshot, so
//! implementations do not need to cache.

use crate::error::CatalogError;
use crate::types::{
    ColumnRecord, ForeignKeyRecord, ProcedureRecord, TableKind, TableRecord,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Ident;
use std::path::Path;

/// A source of catalog metadata for one database.
pub trait CatalogProvider: Send + Sync {
    /// Enumerates all tables and views visible to the connection.
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError>;

    /// Enumerates all stored procedures visible to the connection.
    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError>;

    /// Enumerates the columns of every table.
    fn columns(&self) -> Result<Vec<ColumnRecord>, CatalogError> {
        Ok(Vec::new())
    }

    /// Enumerates every foreign key.
    fn foreign_keys(&self) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
        Ok(Vec::new())
    }

    /// The schema unqualified names live in, if the database reports one.
    fn default_schema(&self) -> Result<Option<String>, CatalogError>;

    /// Quotes a single identifier for use in SQL text.
    fn quote_object_name(&self, name: &str) -> String {
        Ident::with_quote('"', name).to_string()
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// A catalog held in memory, typically loaded from a JSON document.
///
/// ```json
/// {
///   "defaultSchema": "dbo",
///   "tables": [{ "schema": "dbo", "name": "Customers", "columns": [{ "name": "Id", "isPrimaryKey": true }] }],
///   "procedures": [{ "schema": "dbo", "name": "GetCustomers" }],
///   "foreignKeys": []
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,

    /// Identifier quote character (default `"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<char>,

    #[serde(default)]
    pub tables: Vec<CatalogTable>,

    #[serde(default)]
    pub procedures: Vec<ProcedureRecord>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyRecord>,
}

/// A table entry of a [`StaticCatalog`] with its columns inline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_identity: bool,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            is_primary_key: false,
            is_identity: false,
        }
    }

    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            is_primary_key: true,
            ..Self::new(name)
        }
    }
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a catalog document from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn with_table(self, schema: Option<&str>, name: &str) -> Self {
        self.with_table_columns(schema, name, Vec::new())
    }

    pub fn with_view(mut self, schema: Option<&str>, name: &str) -> Self {
        self.tables.push(CatalogTable {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            kind: TableKind::View,
            columns: Vec::new(),
        });
        self
    }

    pub fn with_table_columns(
        mut self,
        schema: Option<&str>,
        name: &str,
        columns: Vec<CatalogColumn>,
    ) -> Self {
        self.tables.push(CatalogTable {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            kind: TableKind::Table,
            columns,
        });
        self
    }

    pub fn with_procedure(mut self, schema: Option<&str>, name: &str) -> Self {
        self.procedures.push(ProcedureRecord::new(schema, name));
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyRecord) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }
}

impl CatalogProvider for StaticCatalog {
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError> {
        Ok(self
            .tables
            .iter()
            .map(|t| TableRecord {
                schema: t.schema.clone(),
                name: t.name.clone(),
                kind: t.kind,
            })
            .collect())
    }

    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError> {
        Ok(self.procedures.clone())
    }

    fn columns(&self) -> Result<Vec<ColumnRecord>, CatalogError> {
        Ok(self
            .tables
            .iter()
            .flat_map(|t| {
                t.columns.iter().map(move |c| ColumnRecord {
                    schema: t.schema.clone(),
                    table: t.name.clone(),
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    is_primary_key: c.is_primary_key,
                    is_identity: c.is_identity,
                })
            })
            .collect())
    }

    fn foreign_keys(&self) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
        Ok(self.foreign_keys.clone())
    }

    fn default_schema(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.default_schema.clone())
    }

    fn quote_object_name(&self, name: &str) -> String {
        let quote = match self.quote {
            Some(q @ ('"' | '`' | '[')) => q,
            _ => '"',
        };
        Ident::with_quote(quote, name).to_string()
    }
}
