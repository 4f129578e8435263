//! Task - the single domain entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{TaskId, UserId};

/// One user-owned to-do item, as decoded from a store document.
///
/// `due_date` is nullable: the store may hold documents without one (or with a
/// wrong-typed value, which decodes to `None`). Everywhere a due date is
/// *compared*, day granularity applies: the time-of-day is dropped first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Document id, assigned by the store on creation. Immutable.
    pub id: TaskId,

    /// User-supplied label. Non-empty at creation (trimmed before submission).
    pub text: String,

    /// Defaults to false at creation, flipped by toggle.
    pub completed: bool,

    /// Nullable point-in-time; day granularity is the effective precision.
    pub due_date: Option<DateTime<Utc>>,

    /// Owning user. Never changes after creation.
    pub user_id: UserId,
}

impl Task {
    /// The due date at day granularity (time-of-day dropped).
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.map(|d| d.date_naive())
    }

    /// Day-granularity equality against `day`. Tasks without a due date never match.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_day() == Some(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn task_due(due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: TaskId::from_ulid(Ulid::new()),
            text: "buy milk".to_string(),
            completed: false,
            due_date: due,
            user_id: UserId::from_ulid(Ulid::new()),
        }
    }

    #[test]
    fn due_day_drops_time_of_day() {
        let late = Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap();
        let task = task_due(Some(late));

        assert_eq!(task.due_day(), Some(late.date_naive()));
        assert!(task.is_due_on(late.date_naive()));
        // 翌日 00:01 は別の日
        assert!(!task.is_due_on(late.date_naive().succ_opt().unwrap()));
    }

    #[test]
    fn undated_task_is_never_due() {
        let task = task_due(None);
        assert_eq!(task.due_day(), None);
        assert!(!task.is_due_on(Utc::now().date_naive()));
    }
}
