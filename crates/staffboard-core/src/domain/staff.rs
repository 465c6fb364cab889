//! Staff record and its staged draft.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::ids::StaffId;
use super::resource::{Draft, Resource};
use super::wire::optional_date;

/// Staff member as listed by `GET /api/staff/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub date_joined: NaiveDate,
}

fn default_active() -> bool {
    true
}

/// Add-form buffer for a new staff member.
///
/// `date_joined` stays `None` until the form is filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffDraft {
    pub name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default, deserialize_with = "optional_date")]
    pub date_joined: Option<NaiveDate>,
}

impl Default for StaffDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: String::new(),
            is_active: true,
            date_joined: None,
        }
    }
}

impl Draft for StaffDraft {
    fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.role.trim().is_empty() {
            Some("role")
        } else if self.date_joined.is_none() {
            Some("date_joined")
        } else {
            None
        }
    }
}

impl Resource for Staff {
    type Id = StaffId;
    type Draft = StaffDraft;

    const COLLECTION: CollectionKind = CollectionKind::Staff;

    fn id(&self) -> StaffId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
