//! Live database catalog providers.
//!
//! This module reads a database's tables, views, procedures, columns and
//! foreign keys directly from its system catalog, so names can be resolved
//! without writing a catalog document by hand.

#[cfg(feature = "metadata-provider")]
mod sqlx_provider;

#[cfg(feature = "metadata-provider")]
pub use sqlx_provider::{DatabaseType, SqlxCatalogProvider};
