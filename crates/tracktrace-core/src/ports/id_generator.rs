//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）
//!
//! 一意性はここで担保します。insert 時の DuplicateKey は最後の砦であり、
//! 衝突した場合も別の ID で再試行はしません。

use crate::domain::ids::{AssemblyId, CaseId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は衝突しにくい ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_assembly_id(&self) -> AssemblyId;

    fn generate_case_id(&self) -> CaseId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock から timestamp 部分を取り、80-bit のランダム部分は `rand` で埋めます。
/// FixedClock を使っても ID はランダム部分で区別されます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_assembly_id(&self) -> AssemblyId {
        AssemblyId::from(self.next_ulid())
    }

    fn generate_case_id(&self) -> CaseId {
        CaseId::from(self.next_ulid())
    }
}
