//! Clock port - 時刻の抽象化
//!
//! 「今日」の判定（today フィルタ、過去期日の拒否）はすべてこの trait を
//! 経由します。テストでは `FixedClock` で時刻を固定できます。

use chrono::{DateTime, NaiveDate, Utc};

/// Clock は現在時刻を提供
///
/// # テスト容易性
/// - trait により時刻を差し替え可能
/// - テストでは FixedClock を使用
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 今日の日付（日単位、time-of-day を落とした値）
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// SystemClock は実時刻を返す（本番用）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// FixedClock は常に同じ時刻を返す（テスト用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_is_deterministic() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 12, 34, 56).unwrap();
        let clock = FixedClock::new(t);

        assert_eq!(clock.now(), t);
        assert_eq!(clock.today(), t.date_naive());
    }

    #[test]
    fn today_drops_time_of_day() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 0).unwrap();
        let clock = FixedClock::new(t);

        assert_eq!(
            clock.today(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().date_naive()
        );
    }
}
