//! Domain identifiers (strongly-typed IDs).
//!
//! ID は Remote Store（バックエンド）が採番する整数です。
//! `Id<T>` に Phantom type のマーカーを付けて、StaffId と TaskId を
//! コンパイル時に区別します。
//!
//! ## ワイヤ形式
//! - 出力: JSON number
//! - 入力: JSON number または数値文字列（select 要素は文字列を返すため）
//! - 空文字列 `""` は「未選択」を意味し、`Option<Id<T>>` の `None` になる

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// エラーメッセージで使う名前（例: "staff"）
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let staff_id = StaffId::new(3);
/// let task_id = TaskId::new(3);
/// // staff_id と task_id は異なる型なので、混同できない
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: i64,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> i64 {
        self.value
    }
}

impl<T: IdMarker> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// ParseIdError は数値でない ID 文字列
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {raw:?}")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub raw: String,
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self::new)
            .map_err(|_| ParseIdError {
                kind: T::kind(),
                raw: s.to_string(),
            })
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

/// 入力側で受け付ける生の ID 表現
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(Self::new(value)),
            RawId::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// `Option<Id<T>>` 用の deserializer（`null` と `""` を `None` として扱う）
///
/// `#[serde(default, deserialize_with = "optional_id")]` と組み合わせて使う。
pub fn optional_id<'de, D, T>(deserializer: D) -> Result<Option<Id<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: IdMarker,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(value)) => Ok(Some(Id::new(value))),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text.parse().map(Some).map_err(de::Error::custom),
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Staff {}

impl IdMarker for Staff {
    fn kind() -> &'static str {
        "staff"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn kind() -> &'static str {
        "task"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Assignment {}

impl IdMarker for Assignment {
    fn kind() -> &'static str {
        "assignment"
    }
}

pub type StaffId = Id<Staff>;
pub type TaskId = Id<Task>;
pub type AssignmentId = Id<Assignment>;
