//! Views - タスクリストから導出する view model
//!
//! すべて純粋な単一パスのリスト変換です。永続状態は持たず、
//! 最新スナップショットが来るたびに計算し直します。
//! - 期日昇順ソート（期日なしは末尾、安定ソート）
//! - today フィルタ（日単位で比較）
//! - カレンダーイベントへの射影（期日なしは除外）

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Task, TaskId};

/// 期日昇順の安定ソート
///
/// 期日なしの task は、期日付きの task すべての後ろに並びます。
/// 期日が等しい task 同士・期日なし同士は入力順を保ちます（`sort_by_key` は安定）。
pub fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
}

/// `today` に期日がある task だけを残す
///
/// 比較は日単位（time-of-day を落とす）。期日なしの task は含めません。
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_due_on(today)).cloned().collect()
}

/// カレンダー表示用のイベントレコード
///
/// task の期日を単日の all-day イベントとして表現します。
/// `completed` は表示側で打ち消し線などに使うため持ち回ります。
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: TaskId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub completed: bool,
}

/// task リストをカレンダーイベントに射影する
///
/// 期日なしの task はカレンダーに置き場がないため除外します
/// （unwrap で落とすのではなく、フィルタで統一的に扱う）。
pub fn calendar_events(tasks: &[Task]) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .filter_map(|t| {
            let due = t.due_date?;
            Some(CalendarEvent {
                id: t.id,
                title: t.text.clone(),
                start: due,
                end: due,
                all_day: true,
                completed: t.completed,
            })
        })
        .collect()
}
