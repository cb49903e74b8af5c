//! tracktrace-core
//!
//! 製造トレーサビリティのレコードストア。
//! `AssemblyLine` は部品バッチを組み込んだ 1 台の機器を、
//! `PackageLine` は holder と charger の 2 台をまとめた出荷単位を記録します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, schema, AssemblyLine, PackageLine, errors）
//! - **ports**: ホストとの境界（TableStore, Clock, IdGenerator）
//! - **typed**: Row と entity の対応付け（Record trait, codec）
//! - **app**: schema 初期化, RecordStore, filter, Dispatcher
//! - **impls**: 実装（InMemoryTableStore, RecordingTableStore）

pub mod domain;
pub mod ports;
pub mod typed;
pub mod app;
pub mod impls;

pub use app::{Dispatcher, Operation, RecordStore, StoreConfig};
pub use domain::{AssemblyLine, PackageLine, TrackError, TrackResult};
