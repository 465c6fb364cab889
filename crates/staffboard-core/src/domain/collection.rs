//! CollectionKind - キャッシュされる 3 つのコレクション

use std::fmt;

use super::events::Signal;

/// CollectionKind はサーバ側コレクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Staff,
    Task,
    Assignment,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Staff,
        CollectionKind::Task,
        CollectionKind::Assignment,
    ];

    /// コレクションのルートパス（末尾スラッシュ付き）
    pub fn root_path(self) -> &'static str {
        match self {
            CollectionKind::Staff => "/api/staff/",
            CollectionKind::Task => "/api/task/",
            CollectionKind::Assignment => "/api/assignment/",
        }
    }

    /// 変更後に発行するリフレッシュ要求
    pub fn refresh_signal(self) -> Signal {
        match self {
            CollectionKind::Staff => Signal::UpdateStaffList,
            CollectionKind::Task => Signal::UpdateTaskList,
            CollectionKind::Assignment => Signal::UpdateAssignments,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Staff => "staff",
            CollectionKind::Task => "task",
            CollectionKind::Assignment => "assignment",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
