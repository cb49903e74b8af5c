//! Operation dispatcher - 操作名と引数ベクタを RecordStore の操作に 1:1 で対応付ける
//!
//! 操作名は大文字小文字を区別した完全一致です。
//! 成功時は JSON の payload（entity または entity の配列）を返し、
//! 失敗時は `ErrorPayload` に描画できる `TrackError` を返します。

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::app::config::StoreConfig;
use crate::app::schema::initialize;
use crate::app::store::{RecordStore, expect_args};
use crate::domain::errors::{TrackError, TrackResult};
use crate::domain::{AssemblyLine, PackageLine};
use crate::ports::{Clock, IdGenerator, TableStore};
use crate::typed::encode_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    CreateAssembly,
    UpdateAssemblyById,
    CreatePackage,
    UpdatePackageByCaseId,
    GetAllAssembly,
    GetAssemblyById,
    GetAllAssemblyByStatus,
    GetAllPackage,
    GetPackageById,
    GetAllPackageByStatus,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Init,
        Operation::CreateAssembly,
        Operation::UpdateAssemblyById,
        Operation::CreatePackage,
        Operation::UpdatePackageByCaseId,
        Operation::GetAllAssembly,
        Operation::GetAssemblyById,
        Operation::GetAllAssemblyByStatus,
        Operation::GetAllPackage,
        Operation::GetPackageById,
        Operation::GetAllPackageByStatus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::CreateAssembly => "createAssembly",
            Operation::UpdateAssemblyById => "updateAssemblyByID",
            Operation::CreatePackage => "createPackage",
            Operation::UpdatePackageByCaseId => "updatePackageByCaseID",
            Operation::GetAllAssembly => "getAllAssembly",
            Operation::GetAssemblyById => "getAssemblyByID",
            Operation::GetAllAssemblyByStatus => "getAllAssemblyByStatus",
            Operation::GetAllPackage => "getAllPackage",
            Operation::GetPackageById => "getPackageByID",
            Operation::GetAllPackageByStatus => "getAllPackageByStatus",
        }
    }

    /// 読み取り専用の操作（ホストはトランザクション外で実行してよい）
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Operation::GetAllAssembly
                | Operation::GetAssemblyById
                | Operation::GetAllAssemblyByStatus
                | Operation::GetAllPackage
                | Operation::GetPackageById
                | Operation::GetAllPackageByStatus
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| TrackError::UnknownOperation(s.to_string()))
    }
}

/// 呼び出し元に返す失敗: `{"Error": "...", "key": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "Error")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ErrorPayload {
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| self.error.clone().into_bytes())
    }
}

impl From<&TrackError> for ErrorPayload {
    fn from(err: &TrackError) -> Self {
        Self {
            error: err.to_string(),
            key: err.key().map(str::to_string),
        }
    }
}

pub struct Dispatcher<S, I, C> {
    store: RecordStore<S, I, C>,
}

impl<S, I, C> Dispatcher<S, I, C>
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
            store: RecordStore::with_config(store, ids, clock, config),
        }
    }

    pub fn record_store(&self) -> &RecordStore<S, I, C> {
        &self.store
    }

    /// 操作名を完全一致で解決して実行する
    pub async fn invoke(&self, operation: &str, args: &[String]) -> TrackResult<Vec<u8>> {
        let op = operation.parse::<Operation>()?;
        self.execute(op, args).await
    }

    /// [`Dispatcher::invoke`] と同じだが、失敗を [`ErrorPayload`] に描画する
    pub async fn respond(&self, operation: &str, args: &[String]) -> Result<Vec<u8>, Vec<u8>> {
        self.invoke(operation, args)
            .await
            .map_err(|err| ErrorPayload::from(&err).to_bytes())
    }

    #[instrument(skip_all, fields(op = %op, argc = args.len()))]
    pub async fn execute(&self, op: Operation, args: &[String]) -> TrackResult<Vec<u8>> {
        let store = &self.store;
        let payload = match op {
            Operation::Init => {
                // ホストが渡すコンストラクタ引数は使わない
                if !args.is_empty() {
                    debug!(argc = args.len(), "init ignores its arguments");
                }
                initialize(store.table_store()).await?;
                Vec::new()
            }
            Operation::CreateAssembly => encode_json(&store.create_assembly(args).await?)?,
            Operation::UpdateAssemblyById => match store.update_assembly_by_id(args).await? {
                Some(line) => encode_json(&line)?,
                None => Vec::new(),
            },
            Operation::CreatePackage => encode_json(&store.create_package(args).await?)?,
            Operation::UpdatePackageByCaseId => {
                match store.update_package_by_case_id(args).await? {
                    Some(line) => encode_json(&line)?,
                    None => Vec::new(),
                }
            }
            Operation::GetAllAssembly => {
                expect_args(op.as_str(), args, &[0])?;
                encode_json(&store.get_all::<AssemblyLine>().await?)?
            }
            Operation::GetAssemblyById => {
                expect_args(op.as_str(), args, &[1])?;
                encode_json(&store.get_by_id::<AssemblyLine>(&args[0]).await?)?
            }
            Operation::GetAllAssemblyByStatus => {
                expect_args(op.as_str(), args, &[1])?;
                encode_json(&store.get_all_by_status::<AssemblyLine>(&args[0]).await?)?
            }
            Operation::GetAllPackage => {
                expect_args(op.as_str(), args, &[0])?;
                encode_json(&store.get_all::<PackageLine>().await?)?
            }
            Operation::GetPackageById => {
                expect_args(op.as_str(), args, &[1])?;
                encode_json(&store.get_by_id::<PackageLine>(&args[0]).await?)?
            }
            Operation::GetAllPackageByStatus => {
                expect_args(op.as_str(), args, &[1])?;
                encode_json(&store.get_all_by_status::<PackageLine>(&args[0]).await?)?
            }
        };
        debug!(bytes = payload.len(), "operation completed");
        Ok(payload)
    }
}
