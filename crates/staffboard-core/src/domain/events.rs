//! Events - コレクション更新の通知
//!
//! 変更が完了したパネルは Signal を発行し、シェルがそれを受けて
//! 該当コレクションを取り直す。Signal 自体はデータを運ばない。

use std::fmt;

use super::collection::CollectionKind;

/// Signal は「変更が終わったので一覧を取り直してほしい」という要求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `update-assignments`
    UpdateAssignments,
    /// `update-staff-list`
    UpdateStaffList,
    /// `update-task-list`
    UpdateTaskList,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::UpdateAssignments => "update-assignments",
            Signal::UpdateStaffList => "update-staff-list",
            Signal::UpdateTaskList => "update-task-list",
        }
    }

    /// 取り直す対象のコレクション
    pub fn collection(self) -> CollectionKind {
        match self {
            Signal::UpdateAssignments => CollectionKind::Assignment,
            Signal::UpdateStaffList => CollectionKind::Staff,
            Signal::UpdateTaskList => CollectionKind::Task,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
