//! Typed - テーブル行と型付き entity の対応付け
//!
//! # 二層構造
//! - **表層（Typed）**: `Record` trait を実装した entity（AssemblyLine, PackageLine）
//! - **内部（Row）**: ホストのテーブルに保存される位置ベースの文字列列
//!
//! `Record::SCHEMA` がテーブル名・列順・key 列を静的に決めるので、
//! テーブル名の typo や列のずれは型の側で防げます。

pub mod record;
pub mod codec;

pub use self::record::Record;
pub use self::codec::{decode_row, encode_json, encode_row};
