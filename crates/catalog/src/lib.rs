//! Schema and statistics catalog.
//!
//! Stores table schemas and index metadata, persists them as JSON, and
//! tracks the open heap-file headers the planner reads for cardinality
//! estimation. The planner only consumes the read surface (`table`,
//! `file_handle`); the DDL mutators exist for the executor and for tests.

use std::{fs, path::Path};

use ahash::RandomState;
use common::{ColumnId, DbError, DbResult};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use types::ColType;
use uuid::Uuid;

type Map<K, V> = HashMap<K, V, RandomState>;

/// Unique identifier for an index definition stored in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexId(pub u64);

/// Page-count statistics exposed by an open heap file. The planner derives
/// table cardinality from these two numbers alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub num_pages: u32,
    pub num_records_per_page: u32,
}

/// Handle to an open heap file. Runtime state only, never persisted.
#[derive(Clone, Debug)]
pub struct FileHandle {
    header: FileHeader,
}

impl FileHandle {
    pub fn new(header: FileHeader) -> Self {
        Self { header }
    }

    pub fn header(&self) -> FileHeader {
        self.header
    }
}

/// Persistent catalog that stores table schemas and index metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    tables: Vec<TableMeta>,
    next_index_id: u64,
    #[serde(skip)]
    #[serde(default)]
    table_name_index: Map<String, usize>,
    #[serde(skip)]
    #[serde(default)]
    files: Map<String, FileHandle>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            next_index_id: 1,
            table_name_index: Map::default(),
            files: Map::default(),
        }
    }

    /// Load a catalog from disk, returning an empty catalog if the file
    /// does not exist. Heap files must be re-opened by the caller.
    pub fn load(path: &Path) -> DbResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = fs::read_to_string(path)?;
        let mut catalog: Catalog = serde_json::from_str(&data)
            .map_err(|err| DbError::Catalog(format!("invalid catalog file: {err}")))?;
        catalog.rebuild_indexes();
        Ok(catalog)
    }

    /// Persist the catalog contents as pretty JSON.
    pub fn save(&self, path: &Path) -> DbResult<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| DbError::Catalog(format!("serialize failed: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Returns an immutable reference to a table by name.
    pub fn table(&self, name: &str) -> DbResult<&TableMeta> {
        let idx = self
            .table_name_index
            .get(name)
            .copied()
            .ok_or_else(|| DbError::Catalog(format!("unknown table '{name}'")))?;
        self.tables
            .get(idx)
            .ok_or_else(|| DbError::Catalog(format!("unknown table '{name}'")))
    }

    /// Create a new table with the provided columns.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> DbResult<()> {
        if self.table_name_index.contains_key(name) {
            return Err(DbError::Catalog(format!("table '{name}' already exists")));
        }
        let schema = TableSchema::try_new(columns)?;
        self.tables.push(TableMeta::new(name.to_string(), schema));
        self.rebuild_indexes();
        Ok(())
    }

    /// Remove a table, its indexes, and its open file handle.
    pub fn drop_table(&mut self, name: &str) -> DbResult<()> {
        let idx = self
            .table_name_index
            .get(name)
            .copied()
            .ok_or_else(|| DbError::Catalog(format!("unknown table '{name}'")))?;
        self.tables.remove(idx);
        self.files.remove(name);
        self.rebuild_indexes();
        Ok(())
    }

    /// Create an index over the given table columns. The index name is
    /// derived from the table and column list.
    pub fn create_index(&mut self, table_name: &str, columns: &[&str]) -> DbResult<IndexId> {
        if columns.is_empty() {
            return Err(DbError::Catalog(
                "index must reference at least one column".into(),
            ));
        }
        {
            let table = self.table(table_name)?;
            for name in columns {
                if table.schema.column_index(name).is_none() {
                    return Err(DbError::Catalog(format!(
                        "unknown column '{name}' on table '{table_name}'"
                    )));
                }
            }
            let requested: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
            if table.is_indexed(&requested) {
                return Err(DbError::Catalog(format!(
                    "index on '{table_name}({})' already exists",
                    columns.join(", ")
                )));
            }
        }
        let index_id = IndexId(self.next_index_id);
        self.next_index_id += 1;
        let name = format!("idx_{table_name}_{}", columns.join("_"));
        let table = self.table_mut(table_name)?;
        table.indexes.push(IndexMeta {
            id: index_id,
            name,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            kind: IndexKind::BTree,
        });
        Ok(index_id)
    }

    /// Drop the index covering exactly the given column set.
    pub fn drop_index(&mut self, table_name: &str, columns: &[&str]) -> DbResult<()> {
        let requested: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let table = self.table_mut(table_name)?;
        let pos = table
            .indexes
            .iter()
            .position(|ix| same_column_set(&ix.columns, &requested))
            .ok_or_else(|| {
                DbError::Catalog(format!(
                    "no index on '{table_name}({})'",
                    columns.join(", ")
                ))
            })?;
        table.indexes.remove(pos);
        Ok(())
    }

    /// Register the open heap file backing a table.
    pub fn open_table_file(&mut self, name: &str, header: FileHeader) -> DbResult<()> {
        self.table(name)?;
        self.files.insert(name.to_string(), FileHandle::new(header));
        Ok(())
    }

    /// Returns the open heap-file handle for a table, if any.
    pub fn file_handle(&self, name: &str) -> DbResult<&FileHandle> {
        self.files
            .get(name)
            .ok_or_else(|| DbError::Catalog(format!("no open file for table '{name}'")))
    }

    /// Immutable iterator over all tables.
    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.tables.iter()
    }

    fn table_mut(&mut self, name: &str) -> DbResult<&mut TableMeta> {
        let idx = self
            .table_name_index
            .get(name)
            .copied()
            .ok_or_else(|| DbError::Catalog(format!("unknown table '{name}'")))?;
        self.tables
            .get_mut(idx)
            .ok_or_else(|| DbError::Catalog(format!("unknown table '{name}'")))
    }

    fn rebuild_indexes(&mut self) {
        self.table_name_index.clear();
        for (idx, table) in self.tables.iter().enumerate() {
            self.table_name_index.insert(table.name.clone(), idx);
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata describing a registered table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableMeta {
    pub name: String,
    pub schema: TableSchema,
    pub storage: StorageDescriptor,
    indexes: Vec<IndexMeta>,
}

impl TableMeta {
    fn new(name: String, schema: TableSchema) -> Self {
        Self {
            name,
            schema,
            storage: StorageDescriptor::new(),
            indexes: Vec::new(),
        }
    }

    /// True if an index exists covering exactly the given columns,
    /// compared as a set.
    pub fn is_indexed(&self, columns: &[String]) -> bool {
        self.indexes
            .iter()
            .any(|ix| same_column_set(&ix.columns, columns))
    }

    /// Returns all indexes defined on this table.
    pub fn indexes(&self) -> &[IndexMeta] {
        &self.indexes
    }
}

fn same_column_set(a: &[String], b: &[String]) -> bool {
    use std::collections::BTreeSet;
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Column layout for a table, along with helpful lookup structures.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub name_to_ordinal: Map<String, ColumnId>,
}

impl TableSchema {
    pub fn try_new(columns: Vec<Column>) -> DbResult<Self> {
        if columns.is_empty() {
            return Err(DbError::Catalog(
                "table must contain at least one column".into(),
            ));
        }
        if columns.len() > ColumnId::MAX as usize {
            return Err(DbError::Catalog(
                "too many columns for a single table".into(),
            ));
        }
        let mut name_to_ordinal = Map::default();
        for (idx, column) in columns.iter().enumerate() {
            let ordinal = idx as ColumnId;
            if name_to_ordinal
                .insert(column.name.clone(), ordinal)
                .is_some()
            {
                return Err(DbError::Catalog(format!(
                    "duplicate column '{}' found while building schema",
                    column.name
                )));
            }
        }
        Ok(Self {
            columns,
            name_to_ordinal,
        })
    }

    /// Returns the ordinal for a column name.
    pub fn column_index(&self, name: &str) -> Option<ColumnId> {
        self.name_to_ordinal.get(name).copied()
    }

    /// Returns the declared type for the provided ordinal.
    pub fn column_type(&self, ordinal: ColumnId) -> Option<ColType> {
        self.columns.get(ordinal as usize).map(|c| c.ty)
    }
}

/// Describes a logical column within a table schema.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Metadata describing a table index. Columns are stored by name; the
/// planner matches candidate predicate columns against them as a set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexMeta {
    pub id: IndexId,
    pub name: String,
    pub columns: Vec<String>,
    pub kind: IndexKind,
}

/// Supported index implementations.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IndexKind {
    BTree,
    Hash,
}

/// Links catalog entries to physical storage artifacts, such as heap files.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub file_id: Uuid,
}

impl StorageDescriptor {
    pub fn new() -> Self {
        Self {
            file_id: Uuid::new_v4(),
        }
    }
}

impl Default for StorageDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_columns() -> Vec<Column> {
        vec![
            Column::new("id", ColType::Int),
            Column::new("name", ColType::Str),
            Column::new("age", ColType::Int),
        ]
    }

    #[test]
    fn create_and_lookup_table() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();

        let table = catalog.table("users").unwrap();
        assert_eq!(table.schema.column_index("name"), Some(1));
        assert_eq!(table.schema.column_type(0), Some(ColType::Int));
    }

    #[test]
    fn rejects_duplicate_tables() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();
        let err = catalog.create_table("users", sample_columns()).unwrap_err();

        assert!(matches!(err, DbError::Catalog(_)));
        assert!(format!("{err}").contains("already exists"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let mut catalog = Catalog::new();
        let err = catalog
            .create_table(
                "bad",
                vec![
                    Column::new("id", ColType::Int),
                    Column::new("id", ColType::Int),
                ],
            )
            .unwrap_err();
        assert!(format!("{err}").contains("duplicate column"));
    }

    #[test]
    fn create_and_drop_index() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();

        let index_id = catalog.create_index("users", &["name"]).unwrap();
        assert_eq!(index_id, IndexId(1));

        let table = catalog.table("users").unwrap();
        assert!(table.is_indexed(&["name".to_string()]));
        assert_eq!(table.indexes()[0].name, "idx_users_name");

        catalog
            .drop_index("users", &["name"])
            .expect("index drop succeeds");
        assert!(!catalog.table("users").unwrap().is_indexed(&["name".to_string()]));
    }

    #[test]
    fn composite_index_matches_as_a_set() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();
        catalog.create_index("users", &["name", "age"]).unwrap();

        let table = catalog.table("users").unwrap();
        // Order does not matter, membership does.
        assert!(table.is_indexed(&["age".to_string(), "name".to_string()]));
        assert!(!table.is_indexed(&["name".to_string()]));
        assert!(!table.is_indexed(&["name".to_string(), "id".to_string()]));
    }

    #[test]
    fn index_creation_validates_columns() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();

        let err = catalog.create_index("users", &["missing"]).unwrap_err();
        assert!(format!("{err}").contains("unknown column"));
    }

    #[test]
    fn file_handles_are_runtime_state() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();
        assert!(catalog.file_handle("users").is_err());

        catalog
            .open_table_file(
                "users",
                FileHeader {
                    num_pages: 11,
                    num_records_per_page: 50,
                },
            )
            .unwrap();
        assert_eq!(catalog.file_handle("users").unwrap().header().num_pages, 11);

        catalog.drop_table("users").unwrap();
        assert!(catalog.file_handle("users").is_err());
    }

    #[test]
    fn persistence_round_trip() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();
        catalog.create_index("users", &["name"]).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        let table = loaded.table("users").unwrap();
        assert!(table.is_indexed(&["name".to_string()]));
        assert_eq!(table.schema.column_index("age"), Some(2));
    }

    #[test]
    fn drop_table_removes_metadata() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", sample_columns()).unwrap();
        catalog.create_index("users", &["name"]).unwrap();

        catalog.drop_table("users").unwrap();
        assert!(catalog.table("users").is_err());

        catalog.create_table("orders", sample_columns()).unwrap();
        assert!(catalog.table("orders").is_ok());
    }
}
