//! Record store - create / update / query の本体
//!
//! `RecordStore` は状態を持ちません。保持するのは協調者（TableStore, IdGenerator,
//! Clock）と不変の設定だけで、すべての操作は毎回テーブルを読み直します。
//!
//! # update の整合性
//! ストアが `replace_row` を提供し、設定で許可されていれば 1 回の呼び出しで置き換えます。
//! そうでなければ delete → insert の 2 段階で、その間に読み取ったクライアントには
//! 行が存在しないように見えます。読み取りと更新の整合が必要な呼び出し元は、
//! ホスト側の直列化（トランザクション順序）に頼る必要があります。

use tracing::{debug, info, warn};

use crate::app::config::StoreConfig;
use crate::app::filter::{Predicate, filter_rows};
use crate::app::status::StatusCounts;
use crate::domain::errors::{ArgCount, TrackError, TrackResult};
use crate::domain::{AssemblyLine, PackageLine};
use crate::ports::{Clock, IdGenerator, TableStore};
use crate::typed::{Record, decode_row, encode_row};

/// 引数の個数を検証する
pub fn expect_args(
    operation: &'static str,
    args: &[String],
    accepted: &'static [usize],
) -> TrackResult<()> {
    if accepted.contains(&args.len()) {
        Ok(())
    } else {
        Err(TrackError::ArgumentCount {
            operation,
            expected: ArgCount(accepted),
            actual: args.len(),
        })
    }
}

pub struct RecordStore<S, I, C> {
    store: S,
    ids: I,
    clock: C,
    config: StoreConfig,
}

impl<S, I, C> RecordStore<S, I, C>
where
    S: TableStore,
    I: IdGenerator,
    C: Clock,
{
    pub fn new(store: S, ids: I, clock: C) -> Self {
        Self::with_config(store, ids, clock, StoreConfig::default())
    }

    pub fn with_config(store: S, ids: I, clock: C, config: StoreConfig) -> Self {
        Self {
            store,
            ids,
            clock,
            config,
        }
    }

    pub fn table_store(&self) -> &S {
        &self.store
    }

    /// `args`: deviceSerialNo, deviceType, 部品バッチ id 7 個, manufacturingPlant, assemblyStatus
    pub async fn create_assembly(&self, args: &[String]) -> TrackResult<AssemblyLine> {
        expect_args("createAssembly", args, AssemblyLine::CREATE_ARITY)?;
        let key = self.ids.generate_assembly_id().to_string();
        self.create(key, args).await
    }

    /// `args`: assemblyId と、それに続く `createAssembly` の可変フィールド 11 個。
    /// 旧来の 14 引数の形も受け付けるが、末尾の作成日・作成者は無視して保存済みの値を使う。
    ///
    /// id が存在しなければテーブルに触れずに `Ok(None)` を返す。
    pub async fn update_assembly_by_id(
        &self,
        args: &[String],
    ) -> TrackResult<Option<AssemblyLine>> {
        self.update("updateAssemblyByID", args).await
    }

    /// `args`: holderAssemblyId, chargerAssemblyId, packageStatus, packagingDate, shippingToAddress
    pub async fn create_package(&self, args: &[String]) -> TrackResult<PackageLine> {
        expect_args("createPackage", args, PackageLine::CREATE_ARITY)?;
        let key = self.ids.generate_case_id().to_string();
        self.create(key, args).await
    }

    /// `args`: caseId と可変フィールド 5 個（旧来の 8 引数の形も可）
    pub async fn update_package_by_case_id(
        &self,
        args: &[String],
    ) -> TrackResult<Option<PackageLine>> {
        self.update("updatePackageByCaseID", args).await
    }

    pub async fn get_by_id<R: Record>(&self, key: &str) -> TrackResult<R> {
        let table = R::SCHEMA.name;
        let row = self.store.get_row(table, key).await?;
        debug!(table, key, columns = row.len(), "row fetched");
        decode_row::<R>(row)?
            .filter(|record| !record.key().is_empty())
            .ok_or_else(|| TrackError::NotFound {
                table,
                key: key.to_string(),
            })
    }

    pub async fn get_all<R: Record>(&self) -> TrackResult<Vec<R>> {
        let rows = self.store.scan_rows(R::SCHEMA.name).await?;
        debug!(table = R::SCHEMA.name, rows = rows.len(), "table scanned");
        filter_rows(rows, None)
    }

    pub async fn get_all_by_status<R: Record>(&self, status: &str) -> TrackResult<Vec<R>> {
        let rows = self.store.scan_rows(R::SCHEMA.name).await?;
        debug!(table = R::SCHEMA.name, rows = rows.len(), status, "table scanned");
        filter_rows(rows, Some(Predicate::status::<R>(status)))
    }

    pub async fn status_counts<R: Record>(&self) -> TrackResult<StatusCounts> {
        let records = self.get_all::<R>().await?;
        Ok(StatusCounts::from_records(&records))
    }

    fn stamp(&self) -> String {
        self.config.timestamp_format.render(self.clock.now())
    }

    async fn create<R: Record>(&self, key: String, args: &[String]) -> TrackResult<R> {
        let table = R::SCHEMA.name;
        let record = R::create(key, args, &self.stamp());
        self.check_references(&record).await?;

        if !self.store.insert_row(table, encode_row(&record)).await? {
            // ID の衝突は別の ID で再試行しない
            return Err(TrackError::DuplicateKey {
                table,
                key: record.key().to_string(),
            });
        }

        info!(table, key = record.key(), status = record.status(), "record created");
        Ok(record)
    }

    async fn update<R: Record>(
        &self,
        operation: &'static str,
        args: &[String],
    ) -> TrackResult<Option<R>> {
        expect_args(operation, args, R::UPDATE_ARITIES)?;
        let table = R::SCHEMA.name;
        let key = args[0].as_str();
        if args.len() > R::UPDATE_FIELDS {
            warn!(
                operation,
                key,
                ignored = args.len() - R::UPDATE_FIELDS,
                "caller-supplied creation metadata ignored"
            );
        }

        let row = self.store.get_row(table, key).await?;
        let Some(existing) = decode_row::<R>(row)?.filter(|r| !r.key().is_empty()) else {
            warn!(operation, key, "update of unknown key is a no-op");
            return Ok(None);
        };

        let replacement = existing.replace(&args[1..R::UPDATE_FIELDS], &self.stamp());
        self.check_references(&replacement).await?;
        let row = encode_row(&replacement);

        if self.config.prefer_atomic_replace && self.store.supports_atomic_replace() {
            if !self.store.replace_row(table, row).await? {
                warn!(operation, key, "row vanished before replace; no-op");
                return Ok(None);
            }
        } else {
            // この 2 回の呼び出しの間、読み取り側からは行が存在しないように見える
            self.store.delete_row(table, key).await?;
            if !self.store.insert_row(table, row).await? {
                return Err(TrackError::DuplicateKey {
                    table,
                    key: key.to_string(),
                });
            }
        }

        info!(table, key, status = replacement.status(), "record replaced");
        Ok(Some(replacement))
    }

    async fn check_references<R: Record>(&self, record: &R) -> TrackResult<()> {
        if !self.config.check_references {
            return Ok(());
        }
        for (table, key) in record.references() {
            if key.is_empty() || self.store.get_row(table, key).await?.is_empty() {
                return Err(TrackError::NotFound {
                    table,
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::schema::initialize;
    use crate::domain::errors::TrackError;
    use crate::domain::schema::Row;
    use crate::domain::{ASSEMBLY_TABLE, AssemblyId, CaseId, PACKAGE_TABLE};
    use crate::impls::{InMemoryTableStore, RecordingTableStore, StoreOp};
    use crate::ports::{SteppingClock, SystemClock, UlidGenerator};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;
    use ulid::Ulid;

    type Store = RecordStore<
        RecordingTableStore<InMemoryTableStore>,
        UlidGenerator<SystemClock>,
        SteppingClock,
    >;

    /// 常に同じ ID を返す
    struct RepeatingIds(Ulid);

    impl IdGenerator for RepeatingIds {
        fn generate_assembly_id(&self) -> AssemblyId {
            AssemblyId::from(self.0)
        }

        fn generate_case_id(&self) -> CaseId {
            CaseId::from(self.0)
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn assembly_args(serial: &str, status: &str) -> Vec<String> {
        args(&[
            serial, "Holder", "F1", "L1", "C1", "W1", "CA1", "AD1", "SP1", "Plant-7", status,
        ])
    }

    fn update_args(id: &str, serial: &str, status: &str) -> Vec<String> {
        let mut v = vec![id.to_string()];
        v.extend(assembly_args(serial, status));
        v
    }

    fn clock() -> SteppingClock {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        SteppingClock::new(start, Duration::days(1))
    }

    async fn store_with(inner: InMemoryTableStore, config: StoreConfig) -> Store {
        let recording = RecordingTableStore::new(inner);
        initialize(&recording).await.unwrap();
        recording.clear();
        RecordStore::with_config(recording, UlidGenerator::new(SystemClock), clock(), config)
    }

    async fn store() -> Store {
        store_with(InMemoryTableStore::new(), StoreConfig::default()).await
    }

    #[tokio::test]
    async fn created_ids_are_unique_and_non_empty() {
        let store = store().await;
        let mut ids = Vec::new();
        for n in 0..5 {
            let line = store
                .create_assembly(&assembly_args(&format!("SN-{n}"), "InProgress"))
                .await
                .unwrap();
            assert!(!line.assembly_id.is_empty());
            ids.push(line.assembly_id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(store.table_store().inner().row_count(ASSEMBLY_TABLE).await, 5);
    }

    #[tokio::test]
    async fn create_then_get_returns_supplied_fields() {
        let store = store().await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();

        let fetched: AssemblyLine = store.get_by_id(&created.assembly_id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.device_serial_no, "SN-1");
        assert_eq!(fetched.adaptor_batch_id, "AD1");
        assert_eq!(fetched.assembly_status, "InProgress");
        assert_eq!(fetched.assembly_creation_date, "2024-01-01");
        assert!(fetched.assembly_created_by.is_empty());
    }

    #[tokio::test]
    async fn create_with_wrong_argument_count_fails() {
        let store = store().await;
        let err = store.create_assembly(&args(&["SN-1"])).await.unwrap_err();
        assert!(matches!(
            err,
            TrackError::ArgumentCount {
                operation: "createAssembly",
                actual: 1,
                ..
            }
        ));
        assert!(store.table_store().ops().is_empty());
    }

    #[tokio::test]
    async fn duplicate_generated_id_is_fatal() {
        let recording = RecordingTableStore::new(InMemoryTableStore::new());
        initialize(&recording).await.unwrap();
        let store = RecordStore::new(recording, RepeatingIds(Ulid::new()), clock());

        let first = store
            .create_package(&args(&["asm-h", "asm-c", "Packed", "2024-01-02", "Dock 4"]))
            .await
            .unwrap();
        let err = store
            .create_package(&args(&["asm-h2", "asm-c2", "Packed", "2024-01-02", "Dock 5"]))
            .await
            .unwrap_err();

        assert!(matches!(err, TrackError::DuplicateKey { table: PACKAGE_TABLE, .. }));
        assert_eq!(err.key(), Some(first.case_id.as_str()));
        assert_eq!(store.table_store().inner().row_count(PACKAGE_TABLE).await, 1);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_a_silent_no_op() {
        let store = store().await;
        store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();
        let before = store.table_store().inner().snapshot().await;
        store.table_store().clear();

        let result = store
            .update_assembly_by_id(&update_args("asm-missing", "SN-9", "Packaged"))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.table_store().ops(), vec![StoreOp::Get]);
        let after = store.table_store().inner().snapshot().await;
        assert_eq!(
            serde_json::to_value(&before).unwrap(),
            serde_json::to_value(&after).unwrap()
        );
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_creation_date() {
        let store = store().await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();

        let updated = store
            .update_assembly_by_id(&update_args(&created.assembly_id, "SN-1b", "Packaged"))
            .await
            .unwrap()
            .unwrap();

        let fetched: AssemblyLine = store.get_by_id(&created.assembly_id).await.unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(fetched.device_serial_no, "SN-1b");
        assert_eq!(fetched.assembly_status, "Packaged");
        assert_eq!(fetched.assembly_creation_date, created.assembly_creation_date);
        assert!(fetched.assembly_last_updated_on > created.assembly_last_updated_on);
    }

    #[tokio::test]
    async fn legacy_update_shape_cannot_overwrite_creation_metadata() {
        let store = store().await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();

        let mut legacy = update_args(&created.assembly_id, "SN-1", "Completed");
        legacy.push("1999-12-31".to_string());
        legacy.push("mallory".to_string());
        let updated = store.update_assembly_by_id(&legacy).await.unwrap().unwrap();

        assert_eq!(updated.assembly_status, "Completed");
        assert_eq!(updated.assembly_creation_date, "2024-01-01");
        assert!(updated.assembly_created_by.is_empty());
    }

    #[rstest]
    #[case::too_few(11)]
    #[case::between_shapes(13)]
    #[case::too_many(15)]
    #[tokio::test]
    async fn update_rejects_unknown_shapes(#[case] count: usize) {
        let store = store().await;
        let err = store
            .update_assembly_by_id(&vec!["x".to_string(); count])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "incorrect number of arguments for updateAssemblyByID: expecting 12 or 14, got {count}"
            )
        );
    }

    #[tokio::test]
    async fn update_uses_atomic_replace_when_available() {
        let store = store().await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();
        store.table_store().clear();

        store
            .update_assembly_by_id(&update_args(&created.assembly_id, "SN-1", "Completed"))
            .await
            .unwrap();
        assert_eq!(store.table_store().ops(), vec![StoreOp::Get, StoreOp::Replace]);
    }

    #[tokio::test]
    async fn update_without_replace_deletes_then_inserts() {
        let store = store_with(
            InMemoryTableStore::without_atomic_replace(),
            StoreConfig::default(),
        )
        .await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();
        store.table_store().clear();

        store
            .update_assembly_by_id(&update_args(&created.assembly_id, "SN-1", "Completed"))
            .await
            .unwrap();
        assert_eq!(
            store.table_store().ops(),
            vec![StoreOp::Get, StoreOp::Delete, StoreOp::Insert]
        );
    }

    #[tokio::test]
    async fn failed_reinsert_leaves_the_record_absent() {
        let config = StoreConfig {
            prefer_atomic_replace: false,
            ..StoreConfig::default()
        };
        let store = store_with(InMemoryTableStore::new(), config).await;
        let created = store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();

        store.table_store().fail_on(StoreOp::Insert);
        let err = store
            .update_assembly_by_id(&update_args(&created.assembly_id, "SN-1", "Completed"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::Storage(_)));

        let lookup = store.get_by_id::<AssemblyLine>(&created.assembly_id).await;
        assert!(matches!(lookup, Err(TrackError::NotFound { .. })));
    }

    #[tokio::test]
    async fn get_by_unknown_id_is_not_found() {
        let store = store().await;
        let err = store.get_by_id::<PackageLine>("case-nope").await.unwrap_err();
        assert!(matches!(err, TrackError::NotFound { table: PACKAGE_TABLE, .. }));
        assert_eq!(err.key(), Some("case-nope"));
    }

    #[tokio::test]
    async fn get_all_skips_rows_without_a_key() {
        let store = store().await;
        store
            .create_assembly(&assembly_args("SN-1", "InProgress"))
            .await
            .unwrap();
        let mut tombstone = vec![String::new(); 16];
        tombstone[1] = "SN-ghost".to_string();
        store
            .table_store()
            .inner()
            .insert_row(ASSEMBLY_TABLE, Row::new(tombstone))
            .await
            .unwrap();

        let all: Vec<AssemblyLine> = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].device_serial_no, "SN-1");
    }

    #[tokio::test]
    async fn get_all_by_status_returns_the_matching_subset() {
        let store = store().await;
        for (serial, status) in [
            ("SN-1", "Completed"),
            ("SN-2", "InProgress"),
            ("SN-3", "Completed"),
        ] {
            store
                .create_assembly(&assembly_args(serial, status))
                .await
                .unwrap();
        }

        let completed: Vec<AssemblyLine> = store.get_all_by_status("Completed").await.unwrap();
        let mut serials: Vec<_> = completed.iter().map(|a| a.device_serial_no.as_str()).collect();
        serials.sort();
        assert_eq!(serials, vec!["SN-1", "SN-3"]);
        assert!(completed.iter().all(|a| a.assembly_status == "Completed"));

        let again: Vec<AssemblyLine> = store.get_all_by_status("Completed").await.unwrap();
        assert_eq!(again, completed);

        let counts = store.status_counts::<AssemblyLine>().await.unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.count("Completed"), 2);
    }

    #[tokio::test]
    async fn reference_check_rejects_unknown_assemblies() {
        let config = StoreConfig {
            check_references: true,
            ..StoreConfig::default()
        };
        let store = store_with(InMemoryTableStore::new(), config).await;
        let holder = store
            .create_assembly(&assembly_args("SN-H", "Completed"))
            .await
            .unwrap();
        let charger = store
            .create_assembly(&assembly_args("SN-C", "Completed"))
            .await
            .unwrap();

        let err = store
            .create_package(&args(&[holder.assembly_id.as_str(), "asm-ghost", "Packed", "", ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::NotFound { table: ASSEMBLY_TABLE, .. }));
        assert_eq!(err.key(), Some("asm-ghost"));

        let package = store
            .create_package(&args(&[
                holder.assembly_id.as_str(),
                charger.assembly_id.as_str(),
                "Packed",
                "2024-01-05",
                "Dock 4",
            ]))
            .await
            .unwrap();
        assert_eq!(package.charger_assembly_id, charger.assembly_id);
    }

    #[tokio::test]
    async fn references_are_not_checked_by_default() {
        let store = store().await;
        let package = store
            .create_package(&args(&["asm-x", "asm-y", "Packed", "2024-01-05", "Dock 4"]))
            .await
            .unwrap();

        let updated = store
            .update_package_by_case_id(&args(&[
                package.case_id.as_str(),
                "asm-x",
                "asm-y",
                "Shipped",
                "2024-01-05",
                "Dock 9",
            ]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.package_status, "Shipped");
        assert_eq!(updated.shipping_to_address, "Dock 9");
        assert_eq!(updated.package_creation_date, package.package_creation_date);
    }
}
