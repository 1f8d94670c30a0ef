pub mod error;
pub mod naming;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod relations;
mod resolver;
pub mod snapshot;
pub mod types;

// Re-export main types and functions
pub use error::{CatalogError, ResolveError};
pub use normalize::{homogenize, is_plural, pluralize, singularize};
pub use provider::{CatalogColumn, CatalogProvider, CatalogTable, StaticCatalog};
pub use registry::{clear_schema_cache, ConnectionIdentity, SchemaRegistry};
pub use relations::TableJoin;
pub use snapshot::{CatalogSnapshot, Column, Procedure, SchemaHandle, Table, TableId};

// Re-export types explicitly
pub use types::{
    ColumnRecord, ForeignKeyRecord, ObjectKind, ObjectName, ProcedureRecord, RelationType,
    TableKind, TableRecord,
};
