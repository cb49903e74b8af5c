//! Domain identifiers - 型付き ID
//!
//! # ULID ベースの ID
//! assemblyId / caseId は ULID (128-bit) から生成します。
//! 時刻だけを seed にした乱数とは異なり、同じミリ秒内の連続生成でも衝突しません
//! （80-bit のランダム部分を持つため）。
//!
//! ## 外部契約
//! テーブル上の key は不透明な文字列です。`Id<T>` は生成時の型安全性のためだけに使い、
//! 保存・検索は `Display` で描画した文字列（例: `asm-01HV...`）で行います。
//! ホストが別の方式で採番した key（数値文字列など）もそのまま扱えます。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"asm-", "case-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData なので実行時のサイズは Ulid と同じです。
/// AssemblyId と CaseId は異なる型なので混同できません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// AssemblyLine のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Assembly {}

impl IdMarker for Assembly {
    fn prefix() -> &'static str {
        "asm-"
    }
}

/// PackageLine のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Package {}

impl IdMarker for Package {
    fn prefix() -> &'static str {
        "case-"
    }
}

/// 組み立て単位の ID（`assemblyId`）
pub type AssemblyId = Id<Assembly>;

/// 出荷パッケージの ID（`caseId`）
pub type CaseId = Id<Package>;
