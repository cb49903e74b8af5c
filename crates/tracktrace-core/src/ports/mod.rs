//! Ports - 抽象化レイヤー
//!
//! ホスト ledger とのインターフェースを定義します。
//! コアは状態を持たず、すべての状態はホストのテーブルにあります。

pub mod table_store;
pub mod clock;
pub mod id_generator;

pub use self::table_store::{StorageError, TableStore};
pub use self::clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
