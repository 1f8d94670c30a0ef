//! Master/detail relationships between tables of one snapshot.
//!
//! Foreign keys can form cycles (self references, mutually referencing
//! tables), so links are stored as an adjacency index by [`TableId`] rather
//! than as references between [`Table`] values.

use crate::resolver::TableMatcher;
use crate::snapshot::{CatalogSnapshot, Table, TableId};
use crate::types::{ForeignKeyRecord, RelationType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One foreign key link between a detail table and its master table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableJoin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub master: TableId,
    pub master_columns: Vec<String>,
    pub detail: TableId,
    pub detail_columns: Vec<String>,
}

impl TableJoin {
    pub(crate) fn from_record(record: &ForeignKeyRecord, detail: TableId, master: TableId) -> Self {
        Self {
            name: record.name.clone(),
            master,
            master_columns: record.master_columns.clone(),
            detail,
            detail_columns: record.columns.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RelationIndex {
    /// detail table -> links to the tables it references
    masters: HashMap<TableId, Vec<TableJoin>>,
    /// master table -> links from the tables referencing it
    details: HashMap<TableId, Vec<TableJoin>>,
}

impl RelationIndex {
    pub(crate) fn add(&mut self, join: TableJoin) {
        self.details
            .entry(join.master)
            .or_default()
            .push(join.clone());
        self.masters.entry(join.detail).or_default().push(join);
    }

    pub(crate) fn masters_of(&self, table: TableId) -> &[TableJoin] {
        self.masters.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn details_of(&self, table: TableId) -> &[TableJoin] {
        self.details.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.masters.values().map(Vec::len).sum()
    }
}

/// Classifies how `from` relates to the table named `to_name`.
///
/// `to_name` is resolved among the tables `from` references first, then among
/// the tables referencing `from`, so a master link always takes precedence.
pub(crate) fn classify(snapshot: &CatalogSnapshot, from: &Table, to_name: &str) -> RelationType {
    let request = snapshot.table_request(to_name);
    let schemas = request.schema_refs();

    let masters = linked_tables(snapshot, snapshot.relations().masters_of(from.id()), |j| {
        j.master
    });
    if TableMatcher::new(masters)
        .resolve(&request.name, &schemas, to_name)
        .is_ok()
    {
        return RelationType::ManyToOne;
    }

    let details = linked_tables(snapshot, snapshot.relations().details_of(from.id()), |j| {
        j.detail
    });
    if TableMatcher::new(details)
        .resolve(&request.name, &schemas, to_name)
        .is_ok()
    {
        return RelationType::OneToMany;
    }

    RelationType::None
}

/// The distinct tables on one side of `joins`, in catalog order.
fn linked_tables<'a>(
    snapshot: &'a CatalogSnapshot,
    joins: &[TableJoin],
    side: impl Fn(&TableJoin) -> TableId,
) -> Vec<&'a Table> {
    let ids: BTreeSet<TableId> = joins.iter().map(side).collect();
    ids.into_iter().filter_map(|id| snapshot.table(id)).collect()
}
