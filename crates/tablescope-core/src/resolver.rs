//! Fuzzy table and procedure lookup.
//!
//! # Table resolution
//!
//! A requested table name is matched in stages; the first stage with a
//! *unique* match wins:
//!
//! 1. For each candidate schema, in order (an embedded `schema.` qualifier
//!    first, then the snapshot default schema):
//!    a. the homogenized name,
//!    b. its plural form,
//!    c. its singular form, only when the name looks plural,
//!    d. then, for a plural-looking name, a table whose own plural form it
//!       is (`cookies` finds `Cookie` even though it singularizes to `cooky`).
//! 2. The same steps ignoring schemas altogether.
//!
//! A stage that matches more than one table counts as no match and the next
//! stage is tried. If every stage fails the lookup reports
//! [`ResolveError::UnresolvableObject`], whether nothing matched or several
//! tables matched equally well.
//!
//! A table the catalog reports without a schema matches any schema.
//!
//! # Procedure resolution
//!
//! Procedures are matched on their homogenized `(schema, name)` only, without
//! inflection, and must also be unique.

use crate::error::ResolveError;
use crate::normalize::{homogenize, is_plural, pluralize, singularize};
use crate::snapshot::{Procedure, Table};
use crate::types::ObjectKind;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Matches requested names against a set of tables.
///
/// The set is usually the whole snapshot, but the relationship classifier
/// also runs it over a table's master or detail tables only.
pub(crate) struct TableMatcher<'a> {
    tables: Vec<&'a Table>,
}

impl<'a> TableMatcher<'a> {
    pub(crate) fn new(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    /// Resolves `name` by trying each of `schemas` in order, then no schema.
    ///
    /// Empty schema strings are skipped. `requested` is the caller's original
    /// text, used in the error.
    pub(crate) fn resolve(
        &self,
        name: &str,
        schemas: &[&str],
        requested: &str,
    ) -> Result<&'a Table, ResolveError> {
        let name = homogenize(name);
        let mut tried: Vec<String> = Vec::new();

        for schema in schemas.iter().filter(|s| !s.is_empty()) {
            let schema_key = homogenize(schema);
            if tried.iter().any(|t| homogenize(t) == schema_key) {
                continue;
            }
            tried.push(schema.to_string());

            if let Some(table) = self.find(&name, Some(&schema_key)) {
                return Ok(table);
            }
        }

        self.find(&name, None)
            .ok_or_else(|| ResolveError::unresolvable(ObjectKind::Table, requested, tried))
    }

    /// Exact, plural, then singular match within `schema` (or anywhere).
    fn find(&self, name: &str, schema: Option<&str>) -> Option<&'a Table> {
        self.unique(name, schema, Table::homogenized_name)
            .or_else(|| self.unique(&pluralize(name), schema, Table::homogenized_name))
            .or_else(|| {
                if !is_plural(name) {
                    return None;
                }
                self.unique(&singularize(name), schema, Table::homogenized_name)
                    .or_else(|| self.unique(name, schema, Table::homogenized_plural))
            })
    }

    fn unique(
        &self,
        name: &str,
        schema: Option<&str>,
        key: fn(&Table) -> &str,
    ) -> Option<&'a Table> {
        let mut matches = self.tables.iter().copied().filter(|table| {
            key(table) == name && schema.map_or(true, |s| table.in_schema(s))
        });

        let first = matches.next()?;
        if matches.next().is_some() {
            #[cfg(feature = "tracing")]
            debug!(name, schema, "ambiguous table match, trying next stage");
            return None;
        }
        Some(first)
    }
}

/// Resolves a procedure by exact homogenized `(schema, name)`.
///
/// An empty `schema` matches procedures in any schema.
pub(crate) fn resolve_procedure<'a>(
    procedures: &'a [Procedure],
    name: &str,
    schema: &str,
    requested: &str,
) -> Result<&'a Procedure, ResolveError> {
    let name = homogenize(name);
    let schema_key = homogenize(schema);

    let mut matches = procedures.iter().filter(|procedure| {
        procedure.homogenized_name() == name
            && (schema_key.is_empty() || procedure.in_schema(&schema_key))
    });

    let tried = if schema.is_empty() {
        Vec::new()
    } else {
        vec![schema.to_string()]
    };
    let unresolvable = || ResolveError::unresolvable(ObjectKind::Procedure, requested, tried.clone());

    let first = matches.next().ok_or_else(unresolvable)?;
    if matches.next().is_some() {
        return Err(unresolvable());
    }
    Ok(first)
}
