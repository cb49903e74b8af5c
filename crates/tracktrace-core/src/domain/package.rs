//! PackageLine - holder と charger の 2 台をまとめた出荷単位

use serde::{Deserialize, Serialize};

use super::assembly::ASSEMBLY_TABLE;
use super::schema::{ColumnDefinition, Row, TableSchema};
use crate::typed::Record;

pub const PACKAGE_TABLE: &str = "PackageLine";

const COLUMNS: &[ColumnDefinition] = &[
    ColumnDefinition::key("caseId"),
    ColumnDefinition::string("holderAssemblyId"),
    ColumnDefinition::string("chargerAssemblyId"),
    ColumnDefinition::string("packageStatus"),
    ColumnDefinition::string("packagingDate"),
    ColumnDefinition::string("shippingToAddress"),
    ColumnDefinition::string("packageCreationDate"),
    ColumnDefinition::string("packageLastUpdatedOn"),
    ColumnDefinition::optional("packageCreatedBy"),
    ColumnDefinition::optional("packageLastUpdatedBy"),
];

/// holder と charger の 2 台をまとめた出荷パッケージ
///
/// 2 つの assembly id は論理参照です。`StoreConfig::check_references` が有効なときだけ
/// assembly テーブルに存在するか確認します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLine {
    pub case_id: String,
    pub holder_assembly_id: String,
    pub charger_assembly_id: String,
    pub package_status: String,
    pub packaging_date: String,
    pub shipping_to_address: String,
    pub package_creation_date: String,
    pub package_last_updated_on: String,
    pub package_created_by: String,
    pub package_last_updated_by: String,
}

impl PackageLine {
    fn with_fields(mut self, fields: &[String]) -> Self {
        let mut it = fields.iter().cloned();
        let mut next = || it.next().unwrap_or_default();
        self.holder_assembly_id = next();
        self.charger_assembly_id = next();
        self.package_status = next();
        self.packaging_date = next();
        self.shipping_to_address = next();
        self
    }
}

impl Record for PackageLine {
    const SCHEMA: TableSchema = TableSchema {
        name: PACKAGE_TABLE,
        columns: COLUMNS,
    };
    const STATUS_COLUMN: &'static str = "packageStatus";
    const CREATE_ARITY: &'static [usize] = &[5];
    const UPDATE_ARITIES: &'static [usize] = &[6, 8];
    const UPDATE_FIELDS: usize = 6;

    fn key(&self) -> &str {
        &self.case_id
    }

    fn status(&self) -> &str {
        &self.package_status
    }

    fn to_row(&self) -> Row {
        Row::new(vec![
            self.case_id.clone(),
            self.holder_assembly_id.clone(),
            self.charger_assembly_id.clone(),
            self.package_status.clone(),
            self.packaging_date.clone(),
            self.shipping_to_address.clone(),
            self.package_creation_date.clone(),
            self.package_last_updated_on.clone(),
            self.package_created_by.clone(),
            self.package_last_updated_by.clone(),
        ])
    }

    fn from_columns(columns: Vec<String>) -> Self {
        let mut it = columns.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            case_id: next(),
            holder_assembly_id: next(),
            charger_assembly_id: next(),
            package_status: next(),
            packaging_date: next(),
            shipping_to_address: next(),
            package_creation_date: next(),
            package_last_updated_on: next(),
            package_created_by: next(),
            package_last_updated_by: next(),
        }
    }

    fn create(key: String, args: &[String], stamp: &str) -> Self {
        Self {
            case_id: key,
            package_creation_date: stamp.to_string(),
            package_last_updated_on: stamp.to_string(),
            ..Self::default()
        }
        .with_fields(args)
    }

    fn replace(&self, fields: &[String], stamp: &str) -> Self {
        Self {
            case_id: self.case_id.clone(),
            package_creation_date: self.package_creation_date.clone(),
            package_created_by: self.package_created_by.clone(),
            package_last_updated_on: stamp.to_string(),
            package_last_updated_by: String::new(),
            ..Self::default()
        }
        .with_fields(fields)
    }

    fn references(&self) -> Vec<(&'static str, &str)> {
        vec![
            (ASSEMBLY_TABLE, self.holder_assembly_id.as_str()),
            (ASSEMBLY_TABLE, self.charger_assembly_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CodecError;
    use crate::typed::{decode_row, encode_row};
    use rstest::rstest;

    fn row(values: &[&str]) -> Row {
        Row::new(values.iter().map(|s| s.to_string()).collect())
    }

    const FULL: &[&str] = &[
        "case-1",
        "asm-h",
        "asm-c",
        "Shipped",
        "2024-03-01",
        "1 Harbour Rd",
        "2024-02-28",
        "2024-03-01",
        "packer",
        "",
    ];

    #[test]
    fn schema_declares_every_persisted_column() {
        assert_eq!(PackageLine::SCHEMA.width(), 10);
        assert_eq!(PackageLine::SCHEMA.column_index("packageCreationDate"), Some(6));
        assert_eq!(PackageLine::SCHEMA.required_width(), 8);
    }

    #[test]
    fn decode_full_row() {
        let line: PackageLine = decode_row(row(FULL)).unwrap().unwrap();
        assert_eq!(line.case_id, "case-1");
        assert_eq!(line.shipping_to_address, "1 Harbour Rd");
        assert_eq!(line.package_creation_date, "2024-02-28");
        assert_eq!(line.package_created_by, "packer");
        assert_eq!(
            line.references(),
            vec![(ASSEMBLY_TABLE, "asm-h"), (ASSEMBLY_TABLE, "asm-c")]
        );
    }

    #[rstest]
    #[case::without_updated_by(9)]
    #[case::without_either_identity(8)]
    fn decode_tolerates_missing_trailing_identity_columns(#[case] width: usize) {
        let line: PackageLine = decode_row(row(&FULL[..width])).unwrap().unwrap();
        assert_eq!(line.package_last_updated_on, "2024-03-01");
        assert!(line.package_last_updated_by.is_empty());
    }

    #[test]
    fn decode_rejects_missing_required_columns() {
        let err = decode_row::<PackageLine>(row(&FULL[..7])).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingColumns {
                expected: 8,
                actual: 7,
                ..
            }
        ));
    }

    #[test]
    fn decode_rejects_extra_columns() {
        let mut values = FULL.to_vec();
        values.push("extra");
        let err = decode_row::<PackageLine>(row(&values)).unwrap_err();
        assert!(matches!(err, CodecError::TooManyColumns { actual: 11, .. }));
    }

    #[test]
    fn empty_row_means_no_record() {
        assert!(decode_row::<PackageLine>(Row::empty()).unwrap().is_none());
    }

    #[test]
    fn encode_after_decode_reproduces_the_row() {
        let stored = row(FULL);
        let line: PackageLine = decode_row(stored.clone()).unwrap().unwrap();
        assert_eq!(encode_row(&line), stored);
    }

    #[test]
    fn json_field_names() {
        let line: PackageLine = decode_row(row(FULL)).unwrap().unwrap();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["caseId"], "case-1");
        assert_eq!(json["packageCreationDate"], "2024-02-28");
        assert_eq!(json["packageLastUpdatedOn"], "2024-03-01");
    }
}
