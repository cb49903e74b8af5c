//! Errors - エラー型と分類
//!
//! すべてのエラーは直近の呼び出し元へ返します（ローカルでの回復・リトライはしない）。
//! 例外は update の key 不在で、これはエラーではなく no-op として扱います。

use std::fmt;

use thiserror::Error;

use crate::ports::StorageError;

/// 受け付ける引数の個数
///
/// update は短い形と旧来の長い形の 2 通りを受け付けるため、複数値を持ちます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgCount(pub &'static [usize]);

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" or ")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// Row と entity / JSON の変換エラー
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("row for table '{table}' has {actual} columns, expected at least {expected}")]
    MissingColumns {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("row for table '{table}' has {actual} columns, expected at most {expected}")]
    TooManyColumns {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("json encode: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("incorrect number of arguments for {operation}: expecting {expected}, got {actual}")]
    ArgumentCount {
        operation: &'static str,
        expected: ArgCount,
        actual: usize,
    },

    #[error("no {table} record with key '{key}'")]
    NotFound { table: &'static str, key: String },

    #[error("{table} row with key '{key}' already exists")]
    DuplicateKey { table: &'static str, key: String },

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("received unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("failed creating table {table}: {source}")]
    Initialization {
        table: &'static str,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl TrackError {
    /// エラーに紐づく key（あれば）
    pub fn key(&self) -> Option<&str> {
        match self {
            TrackError::NotFound { key, .. } | TrackError::DuplicateKey { key, .. } => Some(key),
            _ => None,
        }
    }
}

pub type TrackResult<T> = Result<T, TrackError>;
