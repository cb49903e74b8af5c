//! Record trait - entity とテーブルの対応付け

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::schema::{Row, TableSchema};

/// Record は 1 つのテーブルに保存される entity
///
/// # 列の扱い
/// - `to_row` / `from_columns` は `SCHEMA.columns` と同じ順序で値を並べる
/// - `from_columns` には常に `SCHEMA.width()` 個の値が渡される（欠けた末尾は codec が空文字で埋める）
///
/// # ライフサイクル
/// - `create`: 生成済みの key と呼び出し引数から新しいレコードを作る
/// - `replace`: 既存レコードの可変フィールドをすべて置き換える（作成日・作成者は保持）
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const SCHEMA: TableSchema;

    /// ステータス列の名前
    const STATUS_COLUMN: &'static str;

    /// create が受け付ける引数の個数
    const CREATE_ARITY: &'static [usize];

    /// update が受け付ける引数の個数（短い形, 旧来の長い形）
    const UPDATE_ARITIES: &'static [usize];

    /// update の引数のうち key と可変フィールドが占める個数
    const UPDATE_FIELDS: usize;

    fn key(&self) -> &str;

    fn status(&self) -> &str;

    fn to_row(&self) -> Row;

    fn from_columns(columns: Vec<String>) -> Self;

    /// `args` の個数は `CREATE_ARITY` で検証済み
    fn create(key: String, args: &[String], stamp: &str) -> Self;

    /// `fields` は可変フィールドのみ（key を除く）
    fn replace(&self, fields: &[String], stamp: &str) -> Self;

    /// 他テーブルへの論理参照（テーブル名, key）
    fn references(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }
}
