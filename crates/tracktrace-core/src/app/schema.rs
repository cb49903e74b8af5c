//! Schema registry - テーブルの冪等な初期化
//!
//! ストア操作の前に一度だけ `initialize` を呼びます。
//! テーブルごとに存在確認するので、片方だけ作成済みの状態からでも回復します。

use tracing::{debug, info};

use crate::domain::errors::{TrackError, TrackResult};
use crate::domain::schema::TableSchema;
use crate::domain::{AssemblyLine, PackageLine};
use crate::ports::{StorageError, TableStore};
use crate::typed::Record;

/// テーブルが無ければ作成する。作成した場合は `true`
pub async fn ensure_table<S>(store: &S, schema: &TableSchema) -> TrackResult<bool>
where
    S: TableStore + ?Sized,
{
    let init_error = |source| TrackError::Initialization {
        table: schema.name,
        source,
    };

    if store.table_exists(schema.name).await.map_err(init_error)? {
        debug!(table = schema.name, "table already exists");
        return Ok(false);
    }

    match store.create_table(schema).await {
        Ok(()) => {
            info!(table = schema.name, columns = schema.width(), "table created");
            Ok(true)
        }
        // 存在確認と作成の間に別の呼び出しが作成した
        Err(StorageError::TableExists(_)) => {
            debug!(table = schema.name, "table created concurrently");
            Ok(false)
        }
        Err(source) => Err(init_error(source)),
    }
}

/// すべての entity テーブルを用意する
pub async fn initialize<S>(store: &S) -> TrackResult<()>
where
    S: TableStore + ?Sized,
{
    ensure_table(store, &AssemblyLine::SCHEMA).await?;
    ensure_table(store, &PackageLine::SCHEMA).await?;
    Ok(())
}
