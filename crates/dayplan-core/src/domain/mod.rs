//! Domain model (IDs, the Task entity, error taxonomy).

pub mod errors;
pub mod ids;
pub mod task;

pub use self::errors::TaskError;
pub use self::ids::{Id, IdMarker, TaskId, UserId};
pub use self::task::Task;
