//! Assignment - staff × task の関係レコード
//!
//! `staff_name` / `task_title` はバックエンドが付与する非正規化フィールドで、
//! クライアント側では再計算しない。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{AssignmentId, ParseIdError, StaffId, TaskId, optional_id};
use super::resource::Draft;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_COMPLETED: &str = "Completed";

/// Assignment as listed by `GET /api/assignment/`.
///
/// 外部キーと表示用フィールドは欠けていることがあるので `Option` で持つ。
/// 欠けているフィールドは PUT のボディにも載せない（バックエンドは
/// ボディに無いフィールドを現状維持する）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub staff_id: Option<StaffId>,
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_assigned: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
}

impl Assignment {
    /// 編集フォームからのフィールド変更を適用（read-modify-write）
    pub fn apply(&mut self, change: AssignmentField) {
        match change {
            AssignmentField::Staff(staff_id) => self.staff_id = staff_id,
            AssignmentField::Task(task_id) => self.task_id = task_id,
            AssignmentField::Status(status) => self.status = status,
        }
    }
}

/// Add-form buffer: Assignment minus `id` and server-filled fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub staff_id: Option<StaffId>,
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_id: Option<TaskId>,
    pub status: String,
}

impl Default for AssignmentDraft {
    fn default() -> Self {
        Self {
            staff_id: None,
            task_id: None,
            status: STATUS_PENDING.to_string(),
        }
    }
}

impl AssignmentDraft {
    pub fn apply(&mut self, change: AssignmentField) {
        match change {
            AssignmentField::Staff(staff_id) => self.staff_id = staff_id,
            AssignmentField::Task(task_id) => self.task_id = task_id,
            AssignmentField::Status(status) => self.status = status,
        }
    }
}

impl Draft for AssignmentDraft {
    fn missing_field(&self) -> Option<&'static str> {
        if self.staff_id.is_none() {
            Some("staff_id")
        } else if self.task_id.is_none() {
            Some("task_id")
        } else {
            None
        }
    }
}

/// AssignmentField はフォームの「フィールドが変わった」イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentField {
    Staff(Option<StaffId>),
    Task(Option<TaskId>),
    Status(String),
}

/// FieldInputError は from_input の失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldInputError {
    #[error("unknown assignment field: {0}")]
    UnknownField(String),
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}

impl AssignmentField {
    /// フォーム要素の name と生の値からイベントを作る
    ///
    /// select の未選択は `""` で届くので `None` になる。
    pub fn from_input(field: &str, value: &str) -> Result<Self, FieldInputError> {
        match field {
            "staff_id" => Ok(Self::Staff(parse_selection(value)?)),
            "task_id" => Ok(Self::Task(parse_selection(value)?)),
            "status" => Ok(Self::Status(value.to_string())),
            other => Err(FieldInputError::UnknownField(other.to_string())),
        }
    }
}

fn parse_selection<T: super::ids::IdMarker>(
    value: &str,
) -> Result<Option<super::ids::Id<T>>, ParseIdError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}
