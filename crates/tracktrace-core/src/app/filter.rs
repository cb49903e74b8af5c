//! Query filter - 列挙された行に等値条件をかけて entity にデコードする
//!
//! 順序はストアの列挙順のまま（ソートはしない）。
//! key 列が空の行（tombstone や書きかけの行）は常に除外します。

use crate::domain::errors::{CodecError, TrackResult};
use crate::domain::schema::Row;
use crate::typed::{Record, decode_row};

/// 1 列に対する等値条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate<'a> {
    pub column: &'a str,
    pub value: &'a str,
}

impl<'a> Predicate<'a> {
    pub fn new(column: &'a str, value: &'a str) -> Self {
        Self { column, value }
    }

    pub fn status<R: Record>(value: &'a str) -> Self {
        Self::new(R::STATUS_COLUMN, value)
    }
}

pub fn filter_rows<R: Record>(
    rows: impl IntoIterator<Item = Row>,
    predicate: Option<Predicate<'_>>,
) -> TrackResult<Vec<R>> {
    let schema = &R::SCHEMA;
    let key_index = schema.key_index();
    let condition = match predicate {
        Some(p) => {
            let index = schema
                .column_index(p.column)
                .ok_or_else(|| CodecError::UnknownColumn {
                    table: schema.name,
                    column: p.column.to_string(),
                })?;
            Some((index, p.value))
        }
        None => None,
    };

    let mut records = Vec::new();
    for row in rows {
        if row.get(key_index).unwrap_or_default().is_empty() {
            continue;
        }
        if let Some((index, value)) = condition
            && row.get(index).unwrap_or_default() != value
        {
            continue;
        }
        if let Some(record) = decode_row::<R>(row)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TrackError;
    use crate::domain::{AssemblyLine, PackageLine};

    fn assembly_row(id: &str, status: &str) -> Row {
        let mut line = AssemblyLine::create(
            id.to_string(),
            &vec![String::new(); 11],
            "2024-01-01",
        );
        line.assembly_status = status.to_string();
        line.to_row()
    }

    #[test]
    fn no_predicate_keeps_every_keyed_row() {
        let rows = vec![
            assembly_row("a1", "Completed"),
            assembly_row("", "Completed"),
            assembly_row("a2", "InProgress"),
        ];
        let found: Vec<AssemblyLine> = filter_rows(rows, None).unwrap();
        let ids: Vec<_> = found.iter().map(|a| a.assembly_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn status_predicate_keeps_enumeration_order() {
        let rows = vec![
            assembly_row("a3", "Completed"),
            assembly_row("a1", "InProgress"),
            assembly_row("a2", "Completed"),
        ];
        let found: Vec<AssemblyLine> =
            filter_rows(rows, Some(Predicate::status::<AssemblyLine>("Completed"))).unwrap();
        let ids: Vec<_> = found.iter().map(|a| a.assembly_id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a2"]);
    }

    #[test]
    fn status_match_is_exact() {
        let rows = vec![assembly_row("a1", "completed"), assembly_row("a2", "Completed ")];
        let found: Vec<AssemblyLine> =
            filter_rows(rows, Some(Predicate::status::<AssemblyLine>("Completed"))).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = filter_rows::<PackageLine>(Vec::new(), Some(Predicate::new("colour", "red")))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackError::Codec(CodecError::UnknownColumn { .. })
        ));
    }
}
