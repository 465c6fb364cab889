//! Domain model (ids, records, modal state, signals, errors).

pub mod assignment;
pub mod collection;
pub mod errors;
pub mod events;
pub mod ids;
pub mod resource;
pub mod staff;
pub mod state;
pub mod task;
pub mod wire;

pub use self::assignment::{
    Assignment, AssignmentDraft, AssignmentField, FieldInputError, STATUS_COMPLETED,
    STATUS_PENDING,
};
pub use self::collection::CollectionKind;
pub use self::errors::{ConfigError, StoreError, WorkflowError};
pub use self::events::Signal;
pub use self::ids::{AssignmentId, Id, IdMarker, ParseIdError, StaffId, TaskId};
pub use self::resource::{Draft, Resource};
pub use self::staff::{Staff, StaffDraft};
pub use self::state::{ModalPhase, ModalState};
pub use self::task::{Task, TaskDraft};
