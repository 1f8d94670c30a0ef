#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tablescope_core::{
    CatalogError, CatalogProvider, ColumnRecord, ForeignKeyRecord, ObjectName, ProcedureRecord,
    StaticCatalog, TableRecord,
};

/// Provider that counts how often each enumeration is called.
pub struct CountingProvider {
    inner: StaticCatalog,
    delay: Option<Duration>,
    pub tables_calls: AtomicUsize,
    pub procedures_calls: AtomicUsize,
    pub default_schema_calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new(inner: StaticCatalog) -> Arc<Self> {
        Arc::new(Self {
            inner,
            delay: None,
            tables_calls: AtomicUsize::new(0),
            procedures_calls: AtomicUsize::new(0),
            default_schema_calls: AtomicUsize::new(0),
        })
    }

    /// Slows down `tables()` so concurrent callers overlap.
    pub fn slow(inner: StaticCatalog, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            delay: Some(delay),
            tables_calls: AtomicUsize::new(0),
            procedures_calls: AtomicUsize::new(0),
            default_schema_calls: AtomicUsize::new(0),
        })
    }

    pub fn tables_calls(&self) -> usize {
        self.tables_calls.load(Ordering::SeqCst)
    }

    pub fn procedures_calls(&self) -> usize {
        self.procedures_calls.load(Ordering::SeqCst)
    }

    pub fn default_schema_calls(&self) -> usize {
        self.default_schema_calls.load(Ordering::SeqCst)
    }
}

impl CatalogProvider for CountingProvider {
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError> {
        self.tables_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.inner.tables()
    }

    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError> {
        self.procedures_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.procedures()
    }

    fn columns(&self) -> Result<Vec<ColumnRecord>, CatalogError> {
        self.inner.columns()
    }

    fn foreign_keys(&self) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
        self.inner.foreign_keys()
    }

    fn default_schema(&self) -> Result<Option<String>, CatalogError> {
        self.default_schema_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.default_schema()
    }
}

/// Provider whose `tables()` announces it has started, then waits to be
/// released, so a test can act while a load is in progress.
pub struct GatedProvider {
    inner: StaticCatalog,
    pub started: Barrier,
    pub release: Barrier,
}

impl GatedProvider {
    pub fn new(inner: StaticCatalog) -> Arc<Self> {
        Arc::new(Self {
            inner,
            started: Barrier::new(2),
            release: Barrier::new(2),
        })
    }
}

impl CatalogProvider for GatedProvider {
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError> {
        self.started.wait();
        self.release.wait();
        self.inner.tables()
    }

    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError> {
        self.inner.procedures()
    }

    fn default_schema(&self) -> Result<Option<String>, CatalogError> {
        self.inner.default_schema()
    }
}

/// Provider whose table enumeration always fails.
pub struct FailingProvider;

impl CatalogProvider for FailingProvider {
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError> {
        Err(CatalogError::query("tables", "permission denied"))
    }

    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError> {
        Ok(Vec::new())
    }

    fn default_schema(&self) -> Result<Option<String>, CatalogError> {
        Ok(None)
    }
}

/// `dbo.Customers` and `dbo.Order`, default schema `dbo`.
pub fn shop_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_default_schema("dbo")
        .with_table(Some("dbo"), "Customers")
        .with_table(Some("dbo"), "Order")
        .with_procedure(Some("dbo"), "GetCustomers")
}

/// Customers <- Order <- OrderLines, plus an unrelated Audit table and a
/// self-referencing Employees table.
pub fn related_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_default_schema("dbo")
        .with_table(Some("dbo"), "Customer")
        .with_table(Some("dbo"), "Order")
        .with_table(Some("dbo"), "OrderLines")
        .with_table(Some("dbo"), "Audit")
        .with_table(Some("dbo"), "Employees")
        .with_foreign_key(ForeignKeyRecord::new(
            ObjectName::new(Some("dbo"), "Order"),
            &["CustomerId"],
            ObjectName::new(Some("dbo"), "Customer"),
            &["Id"],
        ))
        .with_foreign_key(ForeignKeyRecord::new(
            ObjectName::new(Some("dbo"), "OrderLines"),
            &["OrderId"],
            ObjectName::new(Some("dbo"), "Order"),
            &["Id"],
        ))
        .with_foreign_key(ForeignKeyRecord::new(
            ObjectName::new(Some("dbo"), "Employees"),
            &["ManagerId"],
            ObjectName::new(Some("dbo"), "Employees"),
            &["Id"],
        ))
}
