//! SQLx-based catalog provider for live database introspection.
//!
//! Supports PostgreSQL, MySQL, and SQLite databases.

use sqlparser::ast::Ident;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use std::collections::BTreeMap;
use tablescope_core::{
    CatalogError, CatalogProvider, ColumnRecord, ForeignKeyRecord, ObjectName, ProcedureRecord,
    TableKind, TableRecord,
};
use tokio::runtime::Runtime;

/// Database type inferred from connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Postgres,
    Mysql,
    Sqlite,
}

impl DatabaseType {
    /// Infer database type from a connection URL.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(Self::Mysql)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    fn quote_char(self) -> char {
        match self {
            Self::Mysql => '`',
            Self::Postgres | Self::Sqlite => '"',
        }
    }
}

/// A catalog provider that uses SQLx to query a database's system catalogs.
///
/// The provider owns its own tokio runtime and blocks on each query, so it
/// can be used from the synchronous [`CatalogProvider`] interface.
pub struct SqlxCatalogProvider {
    runtime: Runtime,
    pool: AnyPool,
    db_type: DatabaseType,
}

impl SqlxCatalogProvider {
    /// Connect to the database at the given URL.
    ///
    /// # Errors
    /// Returns an error if the connection fails or the URL scheme is not supported.
    pub fn connect(url: &str) -> Result<Self, CatalogError> {
        let db_type = DatabaseType::from_url(url).ok_or_else(|| {
            CatalogError::query(
                "connection",
                format!("Unsupported database URL scheme: {url}"),
            )
        })?;

        sqlx::any::install_default_drivers();

        let runtime = Runtime::new()?;
        let pool = runtime
            .block_on(AnyPool::connect(url))
            .map_err(|e| CatalogError::query("connection", e))?;

        Ok(Self {
            runtime,
            pool,
            db_type,
        })
    }

    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    fn fetch(&self, what: &'static str, query: &str) -> Result<Vec<AnyRow>, CatalogError> {
        self.runtime
            .block_on(sqlx::query(query).fetch_all(&self.pool))
            .map_err(|e| CatalogError::query(what, e))
    }

    /// Names of all SQLite tables and views, in catalog order.
    fn sqlite_tables(&self) -> Result<Vec<(String, TableKind)>, CatalogError> {
        let rows = self.fetch(
            "tables",
            r#"
                SELECT name, type FROM sqlite_master
                WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
                ORDER BY name
            "#,
        )?;

        rows.iter()
            .map(|row| {
                let name: String = get(row, "tables", "name")?;
                let kind: String = get(row, "tables", "type")?;
                Ok((name, table_kind(&kind)))
            })
            .collect()
    }

    fn sqlite_columns(&self) -> Result<Vec<ColumnRecord>, CatalogError> {
        let mut columns = Vec::new();

        for (table, _) in self.sqlite_tables()? {
            // pragma_table_info is a table-valued function, so the name is inlined.
            let query = format!("PRAGMA table_info('{}')", table.replace('\'', "''"));
            let rows = self.fetch("columns", &query)?;
            let pk_count = rows.iter().filter(|row| get_int(row, "pk") > 0).count();

            for row in &rows {
                let data_type: String = get(row, "columns", "type")?;
                let is_primary_key = get_int(row, "pk") > 0;
                // A single INTEGER PRIMARY KEY column aliases the rowid.
                let is_identity =
                    is_primary_key && pk_count == 1 && data_type.eq_ignore_ascii_case("INTEGER");

                columns.push(ColumnRecord {
                    schema: None,
                    table: table.clone(),
                    name: get(row, "columns", "name")?,
                    data_type: (!data_type.is_empty()).then_some(data_type),
                    is_primary_key,
                    is_identity,
                });
            }
        }

        Ok(columns)
    }

    fn sqlite_foreign_keys(&self) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
        let mut foreign_keys = Vec::new();

        for (table, kind) in self.sqlite_tables()? {
            if kind == TableKind::View {
                continue;
            }

            let query = format!("PRAGMA foreign_key_list('{}')", table.replace('\'', "''"));
            let rows = self.fetch("foreign keys", &query)?;

            let mut by_id: BTreeMap<i64, ForeignKeyRecord> = BTreeMap::new();
            for row in &rows {
                let master: String = get(row, "foreign keys", "table")?;
                let from: String = get(row, "foreign keys", "from")?;
                let to: Option<String> = row.try_get("to").ok().flatten();

                let record = by_id.entry(get_int(row, "id")).or_insert_with(|| ForeignKeyRecord {
                    name: None,
                    detail: ObjectName::unqualified(table.clone()),
                    columns: Vec::new(),
                    master: ObjectName::unqualified(master),
                    master_columns: Vec::new(),
                });
                record.columns.push(from);
                if let Some(to) = to {
                    record.master_columns.push(to);
                }
            }

            foreign_keys.extend(by_id.into_values());
        }

        Ok(foreign_keys)
    }
}

impl CatalogProvider for SqlxCatalogProvider {
    fn tables(&self) -> Result<Vec<TableRecord>, CatalogError> {
        let query = match self.db_type {
            DatabaseType::Postgres => {
                r#"
                    SELECT table_schema::text AS table_schema,
                           table_name::text AS table_name,
                           table_type::text AS table_type
                    FROM information_schema.tables
                    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
                    ORDER BY table_schema, table_name
                "#
            }
            DatabaseType::Mysql => {
                r#"
                    SELECT TABLE_SCHEMA AS table_schema,
                           TABLE_NAME AS table_name,
                           TABLE_TYPE AS table_type
                    FROM information_schema.TABLES
                    WHERE TABLE_SCHEMA = DATABASE()
                    ORDER BY TABLE_SCHEMA, TABLE_NAME
                "#
            }
            DatabaseType::Sqlite => {
                return Ok(self
                    .sqlite_tables()?
                    .into_iter()
                    .map(|(name, kind)| TableRecord {
                        schema: None,
                        name,
                        kind,
                    })
                    .collect());
            }
        };

        self.fetch("tables", query)?
            .iter()
            .map(|row| {
                let kind: String = get(row, "tables", "table_type")?;
                Ok(TableRecord {
                    schema: Some(get(row, "tables", "table_schema")?),
                    name: get(row, "tables", "table_name")?,
                    kind: table_kind(&kind),
                })
            })
            .collect()
    }

    fn procedures(&self) -> Result<Vec<ProcedureRecord>, CatalogError> {
        let query = match self.db_type {
            DatabaseType::Postgres => {
                r#"
                    SELECT routine_schema::text AS routine_schema,
                           routine_name::text AS routine_name,
                           specific_name::text AS specific_name
                    FROM information_schema.routines
                    WHERE routine_schema NOT IN ('pg_catalog', 'information_schema')
                    ORDER BY routine_schema, routine_name
                "#
            }
            DatabaseType::Mysql => {
                r#"
                    SELECT ROUTINE_SCHEMA AS routine_schema,
                           ROUTINE_NAME AS routine_name,
                           SPECIFIC_NAME AS specific_name
                    FROM information_schema.ROUTINES
                    WHERE ROUTINE_SCHEMA = DATABASE()
                    ORDER BY ROUTINE_SCHEMA, ROUTINE_NAME
                "#
            }
            // SQLite has no stored procedures.
            DatabaseType::Sqlite => return Ok(Vec::new()),
        };

        self.fetch("procedures", query)?
            .iter()
            .map(|row| {
                Ok(ProcedureRecord {
                    schema: Some(get(row, "procedures", "routine_schema")?),
                    name: get(row, "procedures", "routine_name")?,
                    specific_name: row.try_get("specific_name").ok().flatten(),
                })
            })
            .collect()
    }

    fn columns(&self) -> Result<Vec<ColumnRecord>, CatalogError> {
        let query = match self.db_type {
            DatabaseType::Postgres => {
                r#"
                    SELECT
                        c.table_schema::text AS table_schema,
                        c.table_name::text AS table_name,
                        c.column_name::text AS column_name,
                        c.data_type::text AS data_type,
                        CASE WHEN pk.column_name IS NOT NULL THEN true ELSE false END AS is_primary_key,
                        CASE WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%'
                            THEN true ELSE false END AS is_identity
                    FROM information_schema.columns c
                    LEFT JOIN (
                        SELECT kcu.table_schema, kcu.table_name, kcu.column_name
                        FROM information_schema.table_constraints tc
                        JOIN information_schema.key_column_usage kcu
                            ON tc.constraint_name = kcu.constraint_name
                            AND tc.table_schema = kcu.table_schema
                        WHERE tc.constraint_type = 'PRIMARY KEY'
                    ) pk ON c.table_schema = pk.table_schema
                        AND c.table_name = pk.table_name
                        AND c.column_name = pk.column_name
                    WHERE c.table_schema NOT IN ('pg_catalog', 'information_schema')
                    ORDER BY c.table_schema, c.table_name, c.ordinal_position
                "#
            }
            DatabaseType::Mysql => {
                r#"
                    SELECT
                        TABLE_SCHEMA AS table_schema,
                        TABLE_NAME AS table_name,
                        COLUMN_NAME AS column_name,
                        DATA_TYPE AS data_type,
                        CASE WHEN COLUMN_KEY = 'PRI' THEN 1 ELSE 0 END AS is_primary_key,
                        CASE WHEN EXTRA LIKE '%auto_increment%' THEN 1 ELSE 0 END AS is_identity
                    FROM information_schema.COLUMNS
                    WHERE TABLE_SCHEMA = DATABASE()
                    ORDER BY TABLE_SCHEMA, TABLE_NAME, ORDINAL_POSITION
                "#
            }
            DatabaseType::Sqlite => return self.sqlite_columns(),
        };

        self.fetch("columns", query)?
            .iter()
            .map(|row| {
                Ok(ColumnRecord {
                    schema: Some(get(row, "columns", "table_schema")?),
                    table: get(row, "columns", "table_name")?,
                    name: get(row, "columns", "column_name")?,
                    data_type: row.try_get("data_type").ok().flatten(),
                    is_primary_key: get_flag(row, "is_primary_key"),
                    is_identity: get_flag(row, "is_identity"),
                })
            })
            .collect()
    }

    fn foreign_keys(&self) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
        let query = match self.db_type {
            DatabaseType::Postgres => {
                r#"
                    SELECT
                        rc.constraint_name::text AS constraint_name,
                        kcu.table_schema::text AS table_schema,
                        kcu.table_name::text AS table_name,
                        kcu.column_name::text AS column_name,
                        ref.table_schema::text AS ref_schema,
                        ref.table_name::text AS ref_table,
                        ref.column_name::text AS ref_column
                    FROM information_schema.referential_constraints rc
                    JOIN information_schema.key_column_usage kcu
                        ON kcu.constraint_schema = rc.constraint_schema
                        AND kcu.constraint_name = rc.constraint_name
                    JOIN information_schema.key_column_usage ref
                        ON ref.constraint_schema = rc.unique_constraint_schema
                        AND ref.constraint_name = rc.unique_constraint_name
                        AND ref.ordinal_position = kcu.position_in_unique_constraint
                    ORDER BY kcu.table_schema, kcu.table_name, rc.constraint_name, kcu.ordinal_position
                "#
            }
            DatabaseType::Mysql => {
                r#"
                    SELECT
                        CONSTRAINT_NAME AS constraint_name,
                        TABLE_SCHEMA AS table_schema,
                        TABLE_NAME AS table_name,
                        COLUMN_NAME AS column_name,
                        REFERENCED_TABLE_SCHEMA AS ref_schema,
                        REFERENCED_TABLE_NAME AS ref_table,
                        REFERENCED_COLUMN_NAME AS ref_column
                    FROM information_schema.KEY_COLUMN_USAGE
                    WHERE REFERENCED_TABLE_NAME IS NOT NULL
                        AND TABLE_SCHEMA = DATABASE()
                    ORDER BY TABLE_SCHEMA, TABLE_NAME, CONSTRAINT_NAME, ORDINAL_POSITION
                "#
            }
            DatabaseType::Sqlite => return self.sqlite_foreign_keys(),
        };

        let rows = self.fetch("foreign keys", query)?;
        rows_to_foreign_keys(&rows)
    }

    fn default_schema(&self) -> Result<Option<String>, CatalogError> {
        let query = match self.db_type {
            DatabaseType::Postgres => "SELECT current_schema()::text AS default_schema",
            DatabaseType::Mysql => "SELECT DATABASE() AS default_schema",
            DatabaseType::Sqlite => return Ok(None),
        };

        let rows = self.fetch("default schema", query)?;
        Ok(rows
            .first()
            .and_then(|row| row.try_get::<Option<String>, _>("default_schema").ok())
            .flatten()
            .filter(|schema| !schema.is_empty()))
    }

    fn quote_object_name(&self, name: &str) -> String {
        Ident::with_quote(self.db_type.quote_char(), name).to_string()
    }

    fn is_available(&self) -> bool {
        !self.pool.is_closed()
    }
}

/// Groups `information_schema` key-column rows into one record per constraint.
fn rows_to_foreign_keys(rows: &[AnyRow]) -> Result<Vec<ForeignKeyRecord>, CatalogError> {
    let mut records: Vec<ForeignKeyRecord> = Vec::new();
    let mut index: BTreeMap<(String, String, String), usize> = BTreeMap::new();

    for row in rows {
        let name: String = get(row, "foreign keys", "constraint_name")?;
        let schema: String = get(row, "foreign keys", "table_schema")?;
        let table: String = get(row, "foreign keys", "table_name")?;
        let column: String = get(row, "foreign keys", "column_name")?;
        let ref_column: String = get(row, "foreign keys", "ref_column")?;

        let key = (schema.clone(), table.clone(), name.clone());
        let idx = match index.get(&key) {
            Some(idx) => *idx,
            None => {
                let ref_schema: Option<String> = row.try_get("ref_schema").ok().flatten();
                let ref_table: String = get(row, "foreign keys", "ref_table")?;
                records.push(ForeignKeyRecord {
                    name: Some(name),
                    detail: ObjectName::new(Some(schema), table),
                    columns: Vec::new(),
                    master: ObjectName {
                        schema: ref_schema,
                        name: ref_table,
                    },
                    master_columns: Vec::new(),
                });
                index.insert(key, records.len() - 1);
                records.len() - 1
            }
        };

        records[idx].columns.push(column);
        records[idx].master_columns.push(ref_column);
    }

    Ok(records)
}

fn table_kind(table_type: &str) -> TableKind {
    if table_type.eq_ignore_ascii_case("view") {
        TableKind::View
    } else {
        TableKind::Table
    }
}

fn get(row: &AnyRow, what: &'static str, column: &str) -> Result<String, CatalogError> {
    row.try_get::<String, _>(column)
        .map_err(|e| CatalogError::query(what, e))
}

/// Reads an integer column, whatever width the driver reports it with.
fn get_int(row: &AnyRow, column: &str) -> i64 {
    if let Ok(val) = row.try_get::<i64, _>(column) {
        return val;
    }
    if let Ok(val) = row.try_get::<i32, _>(column) {
        return i64::from(val);
    }
    0
}

/// Reads a flag that is a boolean (PostgreSQL) or an integer (MySQL).
fn get_flag(row: &AnyRow, column: &str) -> bool {
    if let Ok(val) = row.try_get::<bool, _>(column) {
        return val;
    }
    get_int(row, column) != 0
}
