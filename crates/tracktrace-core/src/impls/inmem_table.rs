//! InMemoryTableStore - 開発・テスト用のテーブルストア
//!
//! # 実装詳細
//! - `BTreeMap<String, TableData>` でテーブルを管理
//! - 各テーブルの行は key 順の `BTreeMap<String, Row>`（scan の順序は key 順で安定）
//! - tokio の Mutex で排他制御（1 回の呼び出し単位で分離される）
//! - `StoreSnapshot` として丸ごと serde で書き出し・復元できる（CLI が使う）

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::schema::{Row, TableSchema};
use crate::ports::{StorageError, TableStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TableData {
    columns: Vec<String>,
    key_index: usize,
    rows: BTreeMap<String, Row>,
}

impl TableData {
    fn from_schema(schema: &TableSchema) -> Self {
        Self {
            columns: schema.columns.iter().map(|c| c.name.to_string()).collect(),
            key_index: schema.key_index(),
            rows: BTreeMap::new(),
        }
    }

    fn key_of(&self, table: &str, row: &Row) -> Result<String, StorageError> {
        if row.len() != self.columns.len() {
            return Err(StorageError::RowShape {
                table: table.to_string(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        Ok(row.get(self.key_index).unwrap_or_default().to_string())
    }
}

/// [`InMemoryTableStore`] の全テーブルを serde で書き出せる形にしたもの
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot {
    tables: BTreeMap<String, TableData>,
}

impl StoreSnapshot {
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

/// InMemoryTableStore は開発・テスト用のテーブルストア
///
/// # 使用例
/// ```ignore
/// let store = InMemoryTableStore::new();
/// initialize(&store).await?;
/// let dispatcher = Dispatcher::new(store, UlidGenerator::new(SystemClock), SystemClock);
/// ```
#[derive(Clone)]
pub struct InMemoryTableStore {
    tables: Arc<Mutex<BTreeMap<String, TableData>>>,
    atomic_replace: bool,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    /// ホスト ledger と同じく replace を持たないストア（update は delete + insert になる）
    pub fn without_atomic_replace() -> Self {
        Self {
            atomic_replace: false,
            ..Self::new()
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: Arc::new(Mutex::new(snapshot.tables)),
            atomic_replace: true,
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.lock().await;
        StoreSnapshot {
            tables: tables.clone(),
        }
    }

    /// テーブルの行数（存在しないテーブルは 0）
    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.lock().await;
        tables.get(table).map_or(0, |t| t.rows.len())
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        Ok(self.tables.lock().await.contains_key(table))
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        if tables.contains_key(schema.name) {
            return Err(StorageError::TableExists(schema.name.to_string()));
        }
        tables.insert(schema.name.to_string(), TableData::from_schema(schema));
        Ok(())
    }

    async fn insert_row(&self, table: &str, row: Row) -> Result<bool, StorageError> {
        let mut tables = self.tables.lock().await;
        let data = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        let key = data.key_of(table, &row)?;
        if data.rows.contains_key(&key) {
            return Ok(false);
        }
        data.rows.insert(key, row);
        Ok(true)
    }

    async fn delete_row(&self, table: &str, key: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        let data = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        data.rows.remove(key);
        Ok(())
    }

    async fn get_row(&self, table: &str, key: &str) -> Result<Row, StorageError> {
        let tables = self.tables.lock().await;
        let data = tables
            .get(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        Ok(data.rows.get(key).cloned().unwrap_or_default())
    }

    async fn scan_rows(&self, table: &str) -> Result<Vec<Row>, StorageError> {
        let tables = self.tables.lock().await;
        let data = tables
            .get(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        Ok(data.rows.values().cloned().collect())
    }

    fn supports_atomic_replace(&self) -> bool {
        self.atomic_replace
    }

    async fn replace_row(&self, table: &str, row: Row) -> Result<bool, StorageError> {
        if !self.atomic_replace {
            return Err(StorageError::Unsupported("atomic replace"));
        }
        let mut tables = self.tables.lock().await;
        let data = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        let key = data.key_of(table, &row)?;
        match data.rows.get_mut(&key) {
            Some(existing) => {
                *existing = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
