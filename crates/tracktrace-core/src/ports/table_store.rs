//! TableStore port - ホスト ledger が提供するテーブル API
//!
//! コアはこの trait 越しにしかテーブルへ触れません。
//! 永続化・トランザクション順序・合意はすべてホスト側の責務です。
//!
//! # 実装
//! - **InMemoryTableStore**: 開発・テスト用（`impls::inmem_table`）
//! - **RecordingTableStore**: 呼び出し順序を記録するラッパー（`impls::recording`）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::schema::{Row, TableSchema};

/// StorageError はホスト側テーブル操作の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("table '{0}' does not exist")]
    NoSuchTable(String),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("row has {actual} columns but table '{table}' declares {expected}")]
    RowShape {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("storage does not support {0}")]
    Unsupported(&'static str),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// TableStore はキー付きテーブルの最小 API
///
/// # 契約
/// - `insert_row` が `Ok(false)` を返したら、同じ key の行が既に存在する
/// - `get_row` は key が無ければ空の Row を返す（エラーではない）
/// - `scan_rows` の順序は実装依存。同じ状態に対しては安定していること
/// - 1 回の呼び出しの分離性・永続性はホストが保証する。呼び出しをまたぐ
///   原子性は保証しない
///
/// # Thread Safety
/// - `Send + Sync` を要求（Dispatcher を複数タスクから共有できる）
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn table_exists(&self, table: &str) -> Result<bool, StorageError>;

    async fn create_table(&self, schema: &TableSchema) -> Result<(), StorageError>;

    async fn insert_row(&self, table: &str, row: Row) -> Result<bool, StorageError>;

    async fn delete_row(&self, table: &str, key: &str) -> Result<(), StorageError>;

    async fn get_row(&self, table: &str, key: &str) -> Result<Row, StorageError>;

    async fn scan_rows(&self, table: &str) -> Result<Vec<Row>, StorageError>;

    /// 単一操作で行を置き換えられるか
    fn supports_atomic_replace(&self) -> bool {
        false
    }

    /// 既存行を原子的に置き換える。`Ok(false)` は key が存在しなかったことを示す
    async fn replace_row(&self, _table: &str, _row: Row) -> Result<bool, StorageError> {
        Err(StorageError::Unsupported("atomic replace"))
    }
}
