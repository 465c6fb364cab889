//! Task record and its staged draft.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::ids::TaskId;
use super::resource::{Draft, Resource};
use super::wire::{optional_date, optional_number};

/// Task as listed by `GET /api/task/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: i32,
    pub due_date: NaiveDate,
}

/// Add-form buffer for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "optional_date")]
    pub due_date: Option<NaiveDate>,
}

impl Draft for TaskDraft {
    fn missing_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title")
        } else if self.priority.is_none() {
            Some("priority")
        } else if self.due_date.is_none() {
            Some("due_date")
        } else {
            None
        }
    }
}

impl Resource for Task {
    type Id = TaskId;
    type Draft = TaskDraft;

    const COLLECTION: CollectionKind = CollectionKind::Task;

    fn id(&self) -> TaskId {
        self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}
