//! AssemblyLine - 組立ライン上の 1 台の機器

use serde::{Deserialize, Serialize};

use super::schema::{ColumnDefinition, Row, TableSchema};
use crate::typed::Record;

pub const ASSEMBLY_TABLE: &str = "AssemblyLine";

const COLUMNS: &[ColumnDefinition] = &[
    ColumnDefinition::key("assemblyId"),
    ColumnDefinition::string("deviceSerialNo"),
    ColumnDefinition::string("deviceType"),
    ColumnDefinition::string("filamentBatchId"),
    ColumnDefinition::string("ledBatchId"),
    ColumnDefinition::string("circuitBoardBatchId"),
    ColumnDefinition::string("wireBatchId"),
    ColumnDefinition::string("casingBatchId"),
    ColumnDefinition::string("adaptorBatchId"),
    ColumnDefinition::string("stickPodBatchId"),
    ColumnDefinition::string("manufacturingPlant"),
    ColumnDefinition::string("assemblyStatus"),
    ColumnDefinition::string("assemblyCreationDate"),
    ColumnDefinition::string("assemblyLastUpdatedOn"),
    ColumnDefinition::optional("assemblyCreatedBy"),
    ColumnDefinition::optional("assemblyLastUpdatedBy"),
];

/// 組立ラインを流れる 1 台の機器
///
/// `assembly_creation_date` と `assembly_created_by` は作成時に確定し、
/// update では保存済みの行から引き継ぐだけです。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyLine {
    pub assembly_id: String,
    pub device_serial_no: String,
    pub device_type: String,
    pub filament_batch_id: String,
    pub led_batch_id: String,
    pub circuit_board_batch_id: String,
    pub wire_batch_id: String,
    pub casing_batch_id: String,
    pub adaptor_batch_id: String,
    pub stick_pod_batch_id: String,
    pub manufacturing_plant: String,
    pub assembly_status: String,
    pub assembly_creation_date: String,
    pub assembly_last_updated_on: String,
    pub assembly_created_by: String,
    pub assembly_last_updated_by: String,
}

impl AssemblyLine {
    /// `fields` の 0..11 は列順に並んだ可変フィールド
    fn with_fields(mut self, fields: &[String]) -> Self {
        let mut it = fields.iter().cloned();
        let mut next = || it.next().unwrap_or_default();
        self.device_serial_no = next();
        self.device_type = next();
        self.filament_batch_id = next();
        self.led_batch_id = next();
        self.circuit_board_batch_id = next();
        self.wire_batch_id = next();
        self.casing_batch_id = next();
        self.adaptor_batch_id = next();
        self.stick_pod_batch_id = next();
        self.manufacturing_plant = next();
        self.assembly_status = next();
        self
    }
}

impl Record for AssemblyLine {
    const SCHEMA: TableSchema = TableSchema {
        name: ASSEMBLY_TABLE,
        columns: COLUMNS,
    };
    const STATUS_COLUMN: &'static str = "assemblyStatus";
    const CREATE_ARITY: &'static [usize] = &[11];
    const UPDATE_ARITIES: &'static [usize] = &[12, 14];
    const UPDATE_FIELDS: usize = 12;

    fn key(&self) -> &str {
        &self.assembly_id
    }

    fn status(&self) -> &str {
        &self.assembly_status
    }

    fn to_row(&self) -> Row {
        Row::new(vec![
            self.assembly_id.clone(),
            self.device_serial_no.clone(),
            self.device_type.clone(),
            self.filament_batch_id.clone(),
            self.led_batch_id.clone(),
            self.circuit_board_batch_id.clone(),
            self.wire_batch_id.clone(),
            self.casing_batch_id.clone(),
            self.adaptor_batch_id.clone(),
            self.stick_pod_batch_id.clone(),
            self.manufacturing_plant.clone(),
            self.assembly_status.clone(),
            self.assembly_creation_date.clone(),
            self.assembly_last_updated_on.clone(),
            self.assembly_created_by.clone(),
            self.assembly_last_updated_by.clone(),
        ])
    }

    fn from_columns(columns: Vec<String>) -> Self {
        let mut it = columns.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            assembly_id: next(),
            device_serial_no: next(),
            device_type: next(),
            filament_batch_id: next(),
            led_batch_id: next(),
            circuit_board_batch_id: next(),
            wire_batch_id: next(),
            casing_batch_id: next(),
            adaptor_batch_id: next(),
            stick_pod_batch_id: next(),
            manufacturing_plant: next(),
            assembly_status: next(),
            assembly_creation_date: next(),
            assembly_last_updated_on: next(),
            assembly_created_by: next(),
            assembly_last_updated_by: next(),
        }
    }

    fn create(key: String, args: &[String], stamp: &str) -> Self {
        Self {
            assembly_id: key,
            assembly_creation_date: stamp.to_string(),
            assembly_last_updated_on: stamp.to_string(),
            ..Self::default()
        }
        .with_fields(args)
    }

    fn replace(&self, fields: &[String], stamp: &str) -> Self {
        Self {
            assembly_id: self.assembly_id.clone(),
            assembly_creation_date: self.assembly_creation_date.clone(),
            assembly_created_by: self.assembly_created_by.clone(),
            assembly_last_updated_on: stamp.to_string(),
            assembly_last_updated_by: String::new(),
            ..Self::default()
        }
        .with_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::{decode_row, encode_row};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> AssemblyLine {
        AssemblyLine::create(
            "asm-1".to_string(),
            &args(&[
                "SN-1", "Holder", "F1", "L1", "C1", "W1", "CA1", "AD1", "SP1", "Plant-7",
                "InProgress",
            ]),
            "2024-01-01",
        )
    }

    #[test]
    fn create_maps_arguments_in_column_order() {
        let line = sample();
        assert_eq!(line.assembly_id, "asm-1");
        assert_eq!(line.device_serial_no, "SN-1");
        assert_eq!(line.device_type, "Holder");
        assert_eq!(line.stick_pod_batch_id, "SP1");
        assert_eq!(line.manufacturing_plant, "Plant-7");
        assert_eq!(line.assembly_status, "InProgress");
        assert_eq!(line.assembly_creation_date, "2024-01-01");
        assert_eq!(line.assembly_last_updated_on, "2024-01-01");
        assert!(line.assembly_created_by.is_empty());
        assert!(line.assembly_last_updated_by.is_empty());
    }

    #[test]
    fn replace_keeps_creation_metadata() {
        let mut stored = sample();
        stored.assembly_created_by = "plant-operator".to_string();

        let fields = args(&[
            "SN-2", "Charger", "F2", "L2", "C2", "W2", "CA2", "AD2", "SP2", "Plant-8", "Packaged",
        ]);
        let replaced = stored.replace(&fields, "2024-02-01");

        assert_eq!(replaced.assembly_id, "asm-1");
        assert_eq!(replaced.device_serial_no, "SN-2");
        assert_eq!(replaced.assembly_status, "Packaged");
        assert_eq!(replaced.assembly_creation_date, "2024-01-01");
        assert_eq!(replaced.assembly_created_by, "plant-operator");
        assert_eq!(replaced.assembly_last_updated_on, "2024-02-01");
    }

    #[test]
    fn row_round_trip_is_lossless() {
        let row = encode_row(&sample());
        assert_eq!(row.len(), AssemblyLine::SCHEMA.width());

        let decoded: AssemblyLine = decode_row(row.clone()).unwrap().unwrap();
        assert_eq!(encode_row(&decoded), row);
    }

    #[test]
    fn json_uses_camel_case_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["assemblyId"], "asm-1");
        assert_eq!(json["deviceSerialNo"], "SN-1");
        assert_eq!(json["circuitBoardBatchId"], "C1");
        assert_eq!(json["assemblyLastUpdatedOn"], "2024-01-01");
    }
}
