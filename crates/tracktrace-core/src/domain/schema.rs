//! Table schema - 列定義と Row 表現
//!
//! Row は位置ベースです。Row の `i` 列目は schema の `i` 番目の列の値を持ちます。
//! 現状すべての列は文字列型です。

use serde::{Deserialize, Serialize};

/// ホストのテーブル API が扱う列の型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub key: bool,
    /// optional 列は保存済み Row の末尾で欠けていてもよい
    pub optional: bool,
}

impl ColumnDefinition {
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::String,
            key: true,
            optional: false,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::String,
            key: false,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::String,
            key: false,
            optional: true,
        }
    }
}

/// 1 テーブルの列構成。key 列はちょうど 1 つ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDefinition],
}

impl TableSchema {
    pub fn key_index(&self) -> usize {
        self.columns.iter().position(|c| c.key).unwrap_or(0)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// 保存済み Row が最低限持つべき先頭列の数
    pub fn required_width(&self) -> usize {
        let trailing_optional = self
            .columns
            .iter()
            .rev()
            .take_while(|c| c.optional)
            .count();
        self.columns.len() - trailing_optional
    }
}

/// 1 レコードの保存形式（位置ベースの文字列列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: Vec<String>,
}

impl Row {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// ホストは値の入った列が 1 つもない Row で「見つからない」を表す
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.is_empty())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }
}
