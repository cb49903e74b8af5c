//! Domain - ドメインモデル（ids, schema, entity, errors）

pub mod ids;
pub mod schema;
pub mod assembly;
pub mod package;
pub mod errors;

pub use self::ids::{AssemblyId, CaseId, Id};
pub use self::schema::{ColumnDefinition, ColumnType, Row, TableSchema};
pub use self::assembly::{ASSEMBLY_TABLE, AssemblyLine};
pub use self::package::{PACKAGE_TABLE, PackageLine};
pub use self::errors::{ArgCount, CodecError, TrackError, TrackResult};
