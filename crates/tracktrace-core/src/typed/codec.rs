//! Row codec - Row と Record / JSON の相互変換

use serde::Serialize;

use super::record::Record;
use crate::domain::errors::CodecError;
use crate::domain::schema::Row;

pub fn encode_row<R: Record>(record: &R) -> Row {
    record.to_row()
}

/// Row を Record にデコードする
///
/// - 空の Row（列が 0 個、またはすべて空文字）は `Ok(None)`（レコードなし）
/// - 末尾の optional 列（createdBy / lastUpdatedBy）だけは欠けていてもよい
/// - それ以外の欠損、または schema より多い列はエラー
pub fn decode_row<R: Record>(row: Row) -> Result<Option<R>, CodecError> {
    if row.is_empty() {
        return Ok(None);
    }

    let schema = &R::SCHEMA;
    let actual = row.len();
    if actual > schema.width() {
        return Err(CodecError::TooManyColumns {
            table: schema.name,
            expected: schema.width(),
            actual,
        });
    }
    if actual < schema.required_width() {
        return Err(CodecError::MissingColumns {
            table: schema.name,
            expected: schema.required_width(),
            actual,
        });
    }

    let mut columns = row.into_columns();
    columns.resize(schema.width(), String::new());
    Ok(Some(R::from_columns(columns)))
}

/// 呼び出し元へ返す JSON payload
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(value)?)
}
