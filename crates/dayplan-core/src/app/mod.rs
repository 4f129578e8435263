//! App - アプリケーションロジック
//!
//! - **client**: TaskClient（購読ライフサイクル + CRUD）
//! - **views**: 導出 view model（ソート / today フィルタ / カレンダー射影）

pub mod client;
pub mod views;

pub use self::client::TaskClient;
pub use self::views::{CalendarEvent, calendar_events, due_today, sort_by_due_date};
