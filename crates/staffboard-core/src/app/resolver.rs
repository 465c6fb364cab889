//! RelationResolver - assignment の外部キーを表示用ラベルにする
//!
//! 一覧の表示はバックエンドが付けた `staff_name` / `task_title` だけを使い、
//! 欠けていれば空欄にする（キャッシュからの補完はしない）。
//! キャッシュ上の staff / task は add / edit フォームの選択肢にだけ使う。

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{Assignment, AssignmentId, Resource, Staff, StaffId, Task, TaskId};

/// 一覧の 1 行分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRow {
    pub id: AssignmentId,
    pub staff: String,
    pub task: String,
    pub status: String,
    pub assigned_on: Option<NaiveDate>,
}

impl AssignmentRow {
    pub fn assigned_line(&self) -> String {
        match self.assigned_on {
            Some(date) => format!("Assigned on: {date}"),
            None => "Assigned on: ".to_string(),
        }
    }
}

impl fmt::Display for AssignmentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Staff: {} | Task: {} | Status: {}",
            self.staff, self.task, self.status
        )
    }
}

/// select 要素の 1 option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<I> {
    pub id: I,
    pub label: String,
    pub selected: bool,
}

/// RelationResolver は現在のキャッシュ内容を借用して使う（描画ごとに作る）
pub struct RelationResolver<'a> {
    staff: &'a [Staff],
    tasks: &'a [Task],
}

impl<'a> RelationResolver<'a> {
    pub fn new(staff: &'a [Staff], tasks: &'a [Task]) -> Self {
        Self { staff, tasks }
    }

    pub fn row(&self, assignment: &Assignment) -> AssignmentRow {
        AssignmentRow {
            id: assignment.id,
            staff: assignment.staff_name.clone().unwrap_or_default(),
            task: assignment.task_title.clone().unwrap_or_default(),
            status: assignment.status.clone(),
            assigned_on: assignment.date_assigned,
        }
    }

    pub fn rows(&self, assignments: &[Assignment]) -> Vec<AssignmentRow> {
        assignments.iter().map(|a| self.row(a)).collect()
    }

    /// staff の選択肢（キャッシュの順序のまま）
    pub fn staff_choices(&self, selected: Option<StaffId>) -> Vec<Choice<StaffId>> {
        choices(self.staff, selected)
    }

    pub fn task_choices(&self, selected: Option<TaskId>) -> Vec<Choice<TaskId>> {
        choices(self.tasks, selected)
    }

    /// 選択中の staff（キャッシュから消えていれば `None`）
    pub fn selected_staff(&self, selected: Option<StaffId>) -> Option<&'a Staff> {
        let selected = selected?;
        self.staff.iter().find(|s| s.id == selected)
    }

    pub fn selected_task(&self, selected: Option<TaskId>) -> Option<&'a Task> {
        let selected = selected?;
        self.tasks.iter().find(|t| t.id == selected)
    }
}

fn choices<R: Resource>(records: &[R], selected: Option<R::Id>) -> Vec<Choice<R::Id>> {
    records
        .iter()
        .map(|record| Choice {
            id: record.id(),
            label: record.label().to_string(),
            selected: selected == Some(record.id()),
        })
        .collect()
}
