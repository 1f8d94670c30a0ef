//! Immutable, once-loaded catalog metadata for one connection identity.
//!
//! A [`CatalogSnapshot`] asks its [`CatalogProvider`] for tables, procedures,
//! columns and foreign keys exactly once each while loading, and never again.
//! After loading nothing is mutated, so a snapshot can be shared between
//! threads behind an [`Arc`] and read without locking.

use crate::error::{CatalogError, ResolveError};
use crate::naming::unquoted_parts;
use crate::normalize::{homogenize, pluralize};
use crate::provider::CatalogProvider;
use crate::relations::{self, RelationIndex, TableJoin};
use crate::resolver::{self, TableMatcher};
use crate::types::{
    ColumnRecord, ObjectName, ProcedureRecord, RelationType, TableKind, TableRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Shared handle to a loaded snapshot, as handed out by the registry.
pub type SchemaHandle = Arc<CatalogSnapshot>;

/// Position of a table within its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId(usize);

impl TableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A table or view of the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(skip)]
    id: TableId,
    actual_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    kind: TableKind,
    #[serde(skip)]
    homogenized_name: String,
    /// Homogenized plural of the name, for plural requests the inflector
    /// cannot singularize back (`cookies` -> `cooky`).
    #[serde(skip)]
    homogenized_plural: String,
    #[serde(skip)]
    homogenized_schema: Option<String>,
    columns: Vec<Column>,
}

impl Table {
    fn new(id: TableId, record: TableRecord) -> Self {
        let schema = record.schema.filter(|s| !s.is_empty());
        Self {
            id,
            homogenized_name: homogenize(&record.name),
            homogenized_plural: homogenize(&pluralize(&record.name)),
            homogenized_schema: schema.as_deref().map(homogenize),
            actual_name: record.name,
            schema,
            kind: record.kind,
            columns: Vec::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    /// The name exactly as the catalog reports it.
    pub fn actual_name(&self) -> &str {
        &self.actual_name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    pub fn homogenized_name(&self) -> &str {
        &self.homogenized_name
    }

    pub(crate) fn homogenized_plural(&self) -> &str {
        &self.homogenized_plural
    }

    pub fn qualified_name(&self) -> ObjectName {
        ObjectName {
            schema: self.schema.clone(),
            name: self.actual_name.clone(),
        }
    }

    /// True when the table lives in `schema` (already homogenized), or
    /// reports no schema at all.
    pub(crate) fn in_schema(&self, schema: &str) -> bool {
        self.homogenized_schema
            .as_deref()
            .map_or(true, |own| own == schema)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Finds a column by exact name, then by unique case-insensitive name.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        if let Some(column) = self.columns.iter().find(|c| c.name == name) {
            return Some(column);
        }

        let key = homogenize(name);
        let mut matches = self.columns.iter().filter(|c| c.homogenized_name == key);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Primary key columns in catalog order.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }
}

/// A column of a [`Table`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    name: String,
    #[serde(skip)]
    homogenized_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_type: Option<String>,
    is_primary_key: bool,
    is_identity: bool,
}

impl Column {
    fn new(record: ColumnRecord) -> Self {
        Self {
            homogenized_name: homogenize(&record.name),
            name: record.name,
            data_type: record.data_type,
            is_primary_key: record.is_primary_key,
            is_identity: record.is_identity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn is_identity(&self) -> bool {
        self.is_identity
    }
}

/// A stored procedure of the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    name: String,
    specific_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(skip)]
    homogenized_name: String,
    #[serde(skip)]
    homogenized_schema: Option<String>,
}

impl Procedure {
    fn new(record: ProcedureRecord) -> Self {
        let schema = record.schema.filter(|s| !s.is_empty());
        Self {
            specific_name: record.specific_name.unwrap_or_else(|| record.name.clone()),
            homogenized_name: homogenize(&record.name),
            homogenized_schema: schema.as_deref().map(homogenize),
            name: record.name,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specific_name(&self) -> &str {
        &self.specific_name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn qualified_name(&self) -> ObjectName {
        ObjectName {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub(crate) fn homogenized_name(&self) -> &str {
        &self.homogenized_name
    }

    pub(crate) fn in_schema(&self, schema: &str) -> bool {
        self.homogenized_schema
            .as_deref()
            .map_or(true, |own| own == schema)
    }
}

/// A requested name split into its bare name and the schemas to try.
pub(crate) struct NameRequest {
    pub(crate) name: String,
    pub(crate) schemas: Vec<String>,
}

impl NameRequest {
    pub(crate) fn schema_refs(&self) -> Vec<&str> {
        self.schemas.iter().map(String::as_str).collect()
    }
}

/// Catalog metadata for one database, loaded once.
pub struct CatalogSnapshot {
    provider: Arc<dyn CatalogProvider>,
    tables: Vec<Table>,
    procedures: Vec<Procedure>,
    default_schema: String,
    relations: RelationIndex,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Loads a snapshot from `provider`.
    ///
    /// `explicit_schema` pins the default schema; when absent (or empty) the
    /// provider is asked once for its default schema. Any provider failure
    /// aborts the load.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(provider)))]
    pub fn load(
        provider: Arc<dyn CatalogProvider>,
        explicit_schema: Option<&str>,
    ) -> Result<Self, CatalogError> {
        if !provider.is_available() {
            return Err(CatalogError::Unavailable);
        }

        let default_schema = match explicit_schema.filter(|s| !s.is_empty()) {
            Some(schema) => schema.to_string(),
            None => provider.default_schema()?.unwrap_or_default(),
        };

        let mut tables: Vec<Table> = provider
            .tables()?
            .into_iter()
            .enumerate()
            .map(|(idx, record)| Table::new(TableId(idx), record))
            .collect();

        let procedures: Vec<Procedure> = provider
            .procedures()?
            .into_iter()
            .map(Procedure::new)
            .collect();

        let locator = TableLocator::new(&tables);

        let mut placements = Vec::new();
        for record in provider.columns()? {
            let owner = ObjectName {
                schema: record.schema.clone(),
                name: record.table.clone(),
            };
            match locator.locate(&tables, &owner) {
                Some(id) => placements.push((id, Column::new(record))),
                None => {
                    #[cfg(feature = "tracing")]
                    debug!(table = %owner, column = %record.name, "column of unknown table skipped");
                }
            }
        }

        let mut relations = RelationIndex::default();
        for record in provider.foreign_keys()? {
            let detail = locator.locate(&tables, &record.detail);
            let master = locator.locate(&tables, &record.master);
            match (detail, master) {
                (Some(detail), Some(master)) => {
                    relations.add(TableJoin::from_record(&record, detail, master));
                }
                _ => {
                    #[cfg(feature = "tracing")]
                    debug!(
                        detail = %record.detail,
                        master = %record.master,
                        "foreign key between unknown tables skipped"
                    );
                }
            }
        }

        for (id, column) in placements {
            tables[id.0].columns.push(column);
        }

        #[cfg(feature = "tracing")]
        debug!(
            tables = tables.len(),
            procedures = procedures.len(),
            foreign_keys = relations.len(),
            default_schema = %default_schema,
            "catalog snapshot loaded"
        );

        Ok(Self {
            provider,
            tables,
            procedures,
            default_schema,
            relations,
            loaded_at: Utc::now(),
        })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    /// The schema unqualified names resolve against; empty when unknown.
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    pub(crate) fn relations(&self) -> &RelationIndex {
        &self.relations
    }

    /// Resolves a possibly qualified, possibly mis-cased or mis-inflected
    /// table name to exactly one table.
    ///
    /// For names with more than two parts the last part is the table and the
    /// one before it the schema, so `shop.dbo.Customers` looks in `dbo`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(input = raw_name)))]
    pub fn find_table(&self, raw_name: &str) -> Result<&Table, ResolveError> {
        let request = self.table_request(raw_name);
        TableMatcher::new(&self.tables).resolve(&request.name, &request.schema_refs(), raw_name)
    }

    /// Resolves a structured name. Only its own schema is tried before the
    /// schema-less stages; the default schema is not applied.
    pub fn find_table_by_name(&self, name: &ObjectName) -> Result<&Table, ResolveError> {
        let schemas: Vec<&str> = name.schema().into_iter().collect();
        TableMatcher::new(&self.tables).resolve(name.name(), &schemas, &name.to_string())
    }

    pub fn is_table(&self, name: &str) -> bool {
        self.find_table(name).is_ok()
    }

    /// Resolves a procedure by exact `(schema, name)`; unqualified names use
    /// the default schema.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(input = raw_name)))]
    pub fn find_procedure(&self, raw_name: &str) -> Result<&Procedure, ResolveError> {
        let (schema, name) = split_request(raw_name);
        let schema = schema.unwrap_or_else(|| self.default_schema.clone());
        resolver::resolve_procedure(&self.procedures, &name, &schema, raw_name)
    }

    pub fn find_procedure_by_name(&self, name: &ObjectName) -> Result<&Procedure, ResolveError> {
        let schema = name.schema().unwrap_or(&self.default_schema);
        resolver::resolve_procedure(&self.procedures, name.name(), schema, &name.to_string())
    }

    pub fn is_procedure(&self, name: &str) -> bool {
        self.find_procedure(name).is_ok()
    }

    /// Parses `text` into an [`ObjectName`], applying the default schema to
    /// unqualified names.
    pub fn build_object_name(&self, text: &str) -> Result<ObjectName, ResolveError> {
        Ok(ObjectName::parse(text)?.or_schema(&self.default_schema))
    }

    /// How `from_table` relates to `to_table`: [`RelationType::ManyToOne`]
    /// when `from_table` references it, [`RelationType::OneToMany`] when it is
    /// referenced by it, otherwise [`RelationType::None`].
    pub fn relation_type(
        &self,
        from_table: &str,
        to_table: &str,
    ) -> Result<RelationType, ResolveError> {
        let from = self.find_table(from_table)?;
        Ok(relations::classify(self, from, to_table))
    }

    /// Links from `table` to the tables it references.
    pub fn masters(&self, table: &Table) -> &[TableJoin] {
        self.relations.masters_of(table.id())
    }

    /// Links to `table` from the tables referencing it.
    pub fn details(&self, table: &Table) -> &[TableJoin] {
        self.relations.details_of(table.id())
    }

    pub fn quote_object_name(&self, name: &str) -> String {
        self.provider.quote_object_name(name)
    }

    /// Quotes each part of `name` and joins them with `.`.
    pub fn quote_qualified(&self, name: &ObjectName) -> String {
        match name.schema().filter(|s| !s.is_empty()) {
            Some(schema) => format!(
                "{}.{}",
                self.provider.quote_object_name(schema),
                self.provider.quote_object_name(name.name())
            ),
            None => self.provider.quote_object_name(name.name()),
        }
    }

    /// Splits a raw table request into its bare name and the schemas to try:
    /// the embedded qualifier first, then the default schema.
    pub(crate) fn table_request(&self, raw_name: &str) -> NameRequest {
        let (embedded, name) = split_request(raw_name);
        let mut schemas: Vec<String> = embedded.into_iter().collect();
        schemas.push(self.default_schema.clone());
        NameRequest { name, schemas }
    }
}

impl fmt::Debug for CatalogSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogSnapshot")
            .field("tables", &self.tables.len())
            .field("procedures", &self.procedures.len())
            .field("default_schema", &self.default_schema)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

/// Splits `schema.name` leniently: the last part is the name and the part
/// before it, if any, the schema. Leading qualifiers (e.g. a database name)
/// are ignored.
fn split_request(raw_name: &str) -> (Option<String>, String) {
    let mut parts = unquoted_parts(raw_name);
    let name = parts.pop().unwrap_or_default();
    let schema = parts.pop().filter(|s| !s.is_empty());
    (schema, name)
}

/// Finds the table a column or foreign key record belongs to.
///
/// Records name their table exactly as the catalog does, so an exact match
/// wins; otherwise a unique case-insensitive match is accepted.
struct TableLocator {
    by_name: HashMap<String, Vec<TableId>>,
}

impl TableLocator {
    fn new(tables: &[Table]) -> Self {
        let mut by_name: HashMap<String, Vec<TableId>> = HashMap::new();
        for table in tables {
            by_name
                .entry(table.homogenized_name.clone())
                .or_default()
                .push(table.id);
        }
        Self { by_name }
    }

    fn locate(&self, tables: &[Table], name: &ObjectName) -> Option<TableId> {
        let candidates = self.by_name.get(&homogenize(name.name()))?;
        let schema = name.schema().filter(|s| !s.is_empty());

        let exact = candidates.iter().copied().find(|id| {
            let table = &tables[id.0];
            table.actual_name == name.name() && table.schema.as_deref() == schema
        });
        if exact.is_some() {
            return exact;
        }

        let schema_key = schema.map(homogenize);
        let mut matches = candidates.iter().copied().filter(|id| {
            let table = &tables[id.0];
            match (&schema_key, &table.homogenized_schema) {
                (Some(wanted), Some(own)) => wanted == own,
                _ => true,
            }
        });
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }
}
