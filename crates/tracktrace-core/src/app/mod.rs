//! App - アプリケーション層
//!
//! ports を組み合わせてレコードのライフサイクルを実装します。
//!
//! # 主要コンポーネント
//! - **schema**: テーブルの冪等な初期化
//! - **RecordStore**: ID 採番・create / update・キー検索・全件走査
//! - **filter**: 等値条件による絞り込み
//! - **Dispatcher**: 操作名 → RecordStore 操作の対応付け
//! - **StatusCounts**: ステータス別の件数

pub mod config;
pub mod schema;
pub mod filter;
pub mod store;
pub mod dispatch;
pub mod status;

pub use self::config::{StoreConfig, TimestampFormat};
pub use self::schema::{ensure_table, initialize};
pub use self::filter::{Predicate, filter_rows};
pub use self::store::RecordStore;
pub use self::dispatch::{Dispatcher, ErrorPayload, Operation};
pub use self::status::StatusCounts;
