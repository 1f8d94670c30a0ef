//! Catalog source selection and snapshot loading.
//!
//! A catalog comes either from a JSON catalog document (`--catalog`) or from
//! a live database (`--metadata-url`). Either way the snapshot is obtained
//! through the process-wide [`SchemaRegistry`], keyed by the source and the
//! pinned schema.

use crate::cli::Args;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tablescope_core::{
    CatalogError, CatalogProvider, ConnectionIdentity, SchemaHandle, SchemaRegistry,
    StaticCatalog,
};
use thiserror::Error;

/// Errors in choosing where the catalog comes from.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no catalog given (use --catalog FILE{})", url_hint())]
    Missing,

    #[error("--catalog and --metadata-url cannot be used together")]
    Conflicting,
}

fn url_hint() -> &'static str {
    if cfg!(feature = "metadata-provider") {
        " or --metadata-url URL"
    } else {
        ""
    }
}

/// Where catalog metadata is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Document(PathBuf),
    #[cfg(feature = "metadata-provider")]
    Database(String),
}

impl CatalogSource {
    pub fn from_args(args: &Args) -> Result<Self, SourceError> {
        #[cfg(feature = "metadata-provider")]
        if let Some(url) = &args.metadata_url {
            if args.catalog.is_some() {
                return Err(SourceError::Conflicting);
            }
            return Ok(Self::Database(url.clone()));
        }

        match &args.catalog {
            Some(path) => Ok(Self::Document(path.clone())),
            None => Err(SourceError::Missing),
        }
    }

    /// Registry identity for this source, with `schema` pinned if given.
    pub fn identity(&self, schema: Option<&str>) -> ConnectionIdentity {
        let connection = match self {
            Self::Document(path) => {
                let path = path.canonicalize().unwrap_or_else(|_| path.clone());
                format!("file://{}", path.display())
            }
            #[cfg(feature = "metadata-provider")]
            Self::Database(url) => url.clone(),
        };

        match schema {
            Some(schema) => ConnectionIdentity::new(connection).with_schema(schema),
            None => ConnectionIdentity::new(connection),
        }
    }

    /// Opens the provider for this source.
    pub fn provider(&self) -> Result<Arc<dyn CatalogProvider>, CatalogError> {
        match self {
            Self::Document(path) => Ok(Arc::new(StaticCatalog::from_path(path)?)),
            #[cfg(feature = "metadata-provider")]
            Self::Database(url) => Ok(Arc::new(
                crate::metadata::SqlxCatalogProvider::connect(url)?,
            )),
        }
    }
}

/// Loads (or reuses) the snapshot for the catalog selected by `args`.
pub fn load_snapshot(args: &Args) -> Result<SchemaHandle> {
    let source = CatalogSource::from_args(args)?;

    #[cfg(feature = "metadata-provider")]
    if let CatalogSource::Database(url) = &source {
        // Warn if credentials appear to be embedded in the URL
        if !args.quiet && url.contains('@') && !url.starts_with("sqlite") {
            eprintln!(
                "tablescope: warning: Database credentials in --metadata-url may be logged in shell history. \
                 Consider using environment variables or a .pgpass file instead."
            );
        }
    }

    let identity = source.identity(args.schema.as_deref());
    SchemaRegistry::global()
        .get_or_create(&identity, || source.provider())
        .with_context(|| format!("Failed to load catalog from {}", describe(&source)))
}

fn describe(source: &CatalogSource) -> String {
    match source {
        CatalogSource::Document(path) => path.display().to_string(),
        #[cfg(feature = "metadata-provider")]
        CatalogSource::Database(_) => "database".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_document_source() {
        let args = Args::parse_from(["tablescope", "-C", "catalog.json", "users"]);
        let source = CatalogSource::from_args(&args).unwrap();
        assert_eq!(source, CatalogSource::Document(PathBuf::from("catalog.json")));
    }

    #[test]
    fn test_missing_source() {
        let args = Args::parse_from(["tablescope", "users"]);
        assert!(matches!(
            CatalogSource::from_args(&args),
            Err(SourceError::Missing)
        ));
    }

    #[cfg(feature = "metadata-provider")]
    #[test]
    fn test_conflicting_sources() {
        let args = Args::parse_from([
            "tablescope",
            "-C",
            "catalog.json",
            "--metadata-url",
            "sqlite::memory:",
            "users",
        ]);
        assert!(matches!(
            CatalogSource::from_args(&args),
            Err(SourceError::Conflicting)
        ));
    }

    #[cfg(feature = "metadata-provider")]
    #[test]
    fn test_identity_includes_schema() {
        let source = CatalogSource::Database("postgres://localhost/shop".to_string());
        assert_eq!(
            source.identity(Some("sales")).cache_key(),
            "postgres://localhost/shop#sales"
        );
        assert_eq!(source.identity(None).cache_key(), "postgres://localhost/shop");
    }

    #[test]
    fn test_missing_document_is_an_io_error() {
        let source = CatalogSource::Document(PathBuf::from("/nonexistent/catalog.json"));
        assert!(matches!(source.provider(), Err(CatalogError::Io(_))));
    }
}
