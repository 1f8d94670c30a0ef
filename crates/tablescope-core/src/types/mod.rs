//! Value types shared by the provider, snapshot and resolver layers.

mod catalog;
mod object_name;

pub use catalog::{
    ColumnRecord, ForeignKeyRecord, ObjectKind, ProcedureRecord, RelationType, TableKind,
    TableRecord,
};
pub use object_name::ObjectName;
