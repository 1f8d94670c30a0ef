//! Error types for catalog loading and name resolution.
//!
//! # Error Handling Strategy
//!
//! - [`CatalogError`]: failures reported by a [`crate::CatalogProvider`]
//!   (connectivity, permissions, malformed catalog documents). These are
//!   passed through unchanged and never turned into an empty catalog.
//!
//! - [`ResolveError`]: failures of a lookup against a loaded snapshot. A name
//!   that matches nothing and a name that matches several objects equally well
//!   are both reported as [`ResolveError::UnresolvableObject`], since neither
//!   can be acted on safely. Neither kind affects cached state.

use crate::types::ObjectKind;
use std::error::Error as StdError;
use thiserror::Error;

/// Errors raised by a catalog provider.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog provider is not available")]
    Unavailable,

    #[error("Failed to read {what} from catalog: {source}")]
    Query {
        what: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid catalog document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Wraps a provider-specific error raised while reading `what`.
    pub fn query(what: &'static str, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Query {
            what,
            source: source.into(),
        }
    }
}

/// Errors raised while resolving names against a catalog snapshot.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "{kind} '{requested_name}' not found{}, or insufficient permissions.",
        schemas_suffix(.schemas_tried)
    )]
    UnresolvableObject {
        kind: ObjectKind,
        requested_name: String,
        schemas_tried: Vec<String>,
    },

    #[error("Could not parse object name '{text}'.")]
    InvalidFormat { text: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ResolveError {
    pub(crate) fn unresolvable(
        kind: ObjectKind,
        requested_name: &str,
        schemas_tried: Vec<String>,
    ) -> Self {
        Self::UnresolvableObject {
            kind,
            requested_name: requested_name.to_string(),
            schemas_tried,
        }
    }

    /// Returns true for "no such object" failures (including ambiguous names).
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::UnresolvableObject { .. })
    }
}

fn schemas_suffix(schemas: &[String]) -> String {
    if schemas.is_empty() {
        String::new()
    } else {
        format!(" in schemas {}", schemas.join(", "))
    }
}
