//! Resolution results for the names given on the command line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tablescope_core::{
    CatalogSnapshot, ObjectKind, Procedure, RelationType, ResolveError, Table,
};

/// Everything the CLI prints for one run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Empty when the database reports no default schema.
    pub default_schema: String,
    pub loaded_at: DateTime<Utc>,
    pub resolutions: Vec<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationReport>,
}

impl Report {
    /// True when any name (or either side of `--relation`) failed to resolve.
    pub fn has_unresolved(&self) -> bool {
        self.resolutions.iter().any(|r| r.resolved.is_none())
            || self.relation.as_ref().is_some_and(|r| r.relation.is_none())
    }
}

/// Outcome for one requested name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub requested: String,
    pub kind: ObjectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub kind: ResolvedKind,
    /// Identifier quoted the way the database expects it.
    pub quoted: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedKind {
    Table,
    View,
    Procedure,
}

impl fmt::Display for ResolvedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Procedure => "procedure",
        };
        f.write_str(label)
    }
}

/// Outcome of `--relation FROM TO`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationReport {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolves `names` (as tables, or as procedures) and the optional relation
/// pair against `snapshot`.
pub fn build_report(
    snapshot: &CatalogSnapshot,
    names: &[String],
    procedures: bool,
    relation: Option<(&str, &str)>,
) -> Report {
    let resolutions = names
        .iter()
        .map(|name| {
            if procedures {
                let outcome = snapshot
                    .find_procedure(name)
                    .map(|p| describe_procedure(snapshot, p));
                resolution(name, ObjectKind::Procedure, outcome)
            } else {
                let outcome = snapshot
                    .find_table(name)
                    .map(|t| describe_table(snapshot, t));
                resolution(name, ObjectKind::Table, outcome)
            }
        })
        .collect();

    let relation = relation.map(|(from, to)| {
        let outcome = snapshot.relation_type(from, to);
        RelationReport {
            from: from.to_string(),
            to: to.to_string(),
            error: outcome.as_ref().err().map(ToString::to_string),
            relation: outcome.ok(),
        }
    });

    Report {
        default_schema: snapshot.default_schema().to_string(),
        loaded_at: snapshot.loaded_at(),
        resolutions,
        relation,
    }
}

fn resolution(
    requested: &str,
    kind: ObjectKind,
    outcome: Result<ResolvedObject, ResolveError>,
) -> Resolution {
    let (resolved, error) = match outcome {
        Ok(object) => (Some(object), None),
        Err(err) => (None, Some(err.to_string())),
    };
    Resolution {
        requested: requested.to_string(),
        kind,
        resolved,
        error,
    }
}

fn describe_table(snapshot: &CatalogSnapshot, table: &Table) -> ResolvedObject {
    ResolvedObject {
        schema: table.schema().map(str::to_string),
        name: table.actual_name().to_string(),
        kind: if table.is_view() {
            ResolvedKind::View
        } else {
            ResolvedKind::Table
        },
        quoted: snapshot.quote_qualified(&table.qualified_name()),
        columns: table.columns().iter().map(|c| c.name().to_string()).collect(),
        primary_key: table
            .primary_key()
            .into_iter()
            .map(|c| c.name().to_string())
            .collect(),
    }
}

fn describe_procedure(snapshot: &CatalogSnapshot, procedure: &Procedure) -> ResolvedObject {
    ResolvedObject {
        schema: procedure.schema().map(str::to_string),
        name: procedure.name().to_string(),
        kind: ResolvedKind::Procedure,
        quoted: snapshot.quote_qualified(&procedure.qualified_name()),
        columns: Vec::new(),
        primary_key: Vec::new(),
    }
}
