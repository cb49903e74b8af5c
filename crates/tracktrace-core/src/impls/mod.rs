//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTableStore**: 開発用のテーブルストア（snapshot で永続化可能）
//! - **RecordingTableStore**: 呼び出し記録・障害注入用のラッパー
//!
//! 本番ではホスト ledger が `TableStore` を実装します。

pub mod inmem_table;
pub mod recording;

pub use self::inmem_table::{InMemoryTableStore, StoreSnapshot};
pub use self::recording::{RecordingTableStore, StoreCall, StoreOp};
