//! RecordingTableStore - 呼び出し順序を記録するラッパー
//!
//! update が delete → insert の 2 段階で行われる場合、その間は行が見えなくなります。
//! このラッパーは呼び出し列を記録し、その窓をテストから観測できるようにします。
//! 任意の操作を失敗させることもできます（障害注入）。

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::schema::{Row, TableSchema};
use crate::ports::{StorageError, TableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    TableExists,
    CreateTable,
    Insert,
    Delete,
    Get,
    Scan,
    Replace,
}

/// 記録された 1 回の呼び出し（操作, テーブル, key があれば key）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub table: String,
    pub key: Option<String>,
}

#[derive(Default)]
struct Journal {
    calls: Vec<StoreCall>,
    failing: Vec<StoreOp>,
}

pub struct RecordingTableStore<S> {
    inner: S,
    journal: Arc<Mutex<Journal>>,
}

impl<S: TableStore> RecordingTableStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal().calls.clone()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.journal().calls.iter().map(|c| c.op).collect()
    }

    pub fn clear(&self) {
        self.journal().calls.clear();
    }

    /// 以降の `op` の呼び出しはすべて `StorageError::Unavailable` で失敗する
    pub fn fail_on(&self, op: StoreOp) {
        self.journal().failing.push(op);
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: StoreOp, table: &str, key: Option<&str>) -> Result<(), StorageError> {
        let mut journal = self.journal();
        journal.calls.push(StoreCall {
            op,
            table: table.to_string(),
            key: key.map(str::to_string),
        });
        if journal.failing.contains(&op) {
            return Err(StorageError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

// どちらの entity も key は先頭列
fn row_key<'a>(row: &'a Row) -> Option<&'a str> {
    row.get(0)
}

#[async_trait]
impl<S: TableStore> TableStore for RecordingTableStore<S> {
    async fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        self.record(StoreOp::TableExists, table, None)?;
        self.inner.table_exists(table).await
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<(), StorageError> {
        self.record(StoreOp::CreateTable, schema.name, None)?;
        self.inner.create_table(schema).await
    }

    async fn insert_row(&self, table: &str, row: Row) -> Result<bool, StorageError> {
        self.record(StoreOp::Insert, table, row_key(&row))?;
        self.inner.insert_row(table, row).await
    }

    async fn delete_row(&self, table: &str, key: &str) -> Result<(), StorageError> {
        self.record(StoreOp::Delete, table, Some(key))?;
        self.inner.delete_row(table, key).await
    }

    async fn get_row(&self, table: &str, key: &str) -> Result<Row, StorageError> {
        self.record(StoreOp::Get, table, Some(key))?;
        self.inner.get_row(table, key).await
    }

    async fn scan_rows(&self, table: &str) -> Result<Vec<Row>, StorageError> {
        self.record(StoreOp::Scan, table, None)?;
        self.inner.scan_rows(table).await
    }

    fn supports_atomic_replace(&self) -> bool {
        self.inner.supports_atomic_replace()
    }

    async fn replace_row(&self, table: &str, row: Row) -> Result<bool, StorageError> {
        self.record(StoreOp::Replace, table, row_key(&row))?;
        self.inner.replace_row(table, row).await
    }
}
