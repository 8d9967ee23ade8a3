//! Sliding-window order quota.
//!
//! A user may place at most [`ORDER_QUOTA`] orders per rolling [`ORDER_WINDOW`]. The window slides: it is recomputed
//! from actual order timestamps at query time, never from a reset counter. Both the admission check and the
//! standalone cooldown endpoint go through this one component.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of orders permitted inside one window.
pub const ORDER_QUOTA: usize = 3;
/// Length of the rolling window.
pub const ORDER_WINDOW: Duration = Duration::days(3);

#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    quota: usize,
    window: Duration,
}

impl Default for RateWindow {
    fn default() -> Self {
        Self { quota: ORDER_QUOTA, window: ORDER_WINDOW }
    }
}

/// The outcome of a window assessment. `next_available_at` is present only when the quota is exhausted, and names
/// the instant the oldest in-window order ages out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStatus {
    pub remaining: usize,
    pub next_available_at: Option<DateTime<Utc>>,
}

impl WindowStatus {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl RateWindow {
    pub fn new(quota: usize, window: Duration) -> Self {
        Self { quota, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// The earliest creation timestamp that still counts against the quota at time `now`.
    ///
    /// The window is the half-open interval `(now - W, now]`: an order exactly `W` old has aged out, so
    /// `next_available_at` is the exact instant a blocked user becomes eligible again.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Assess the quota at `now`, given the creation timestamps of the user's orders. Timestamps outside the window
    /// (including any in the future) are ignored.
    pub fn assess(&self, now: DateTime<Utc>, created_at: &[DateTime<Utc>]) -> WindowStatus {
        let cutoff = self.cutoff(now);
        let in_window = created_at.iter().copied().filter(|t| *t > cutoff && *t <= now).collect::<Vec<_>>();
        let remaining = self.quota.saturating_sub(in_window.len());
        let next_available_at =
            if remaining == 0 { in_window.iter().min().map(|oldest| *oldest + self.window) } else { None };
        WindowStatus { remaining, next_available_at }
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn empty_history_has_full_quota() {
        let window = RateWindow::default();
        let status = window.assess(ts(10, 12), &[]);
        assert_eq!(status.remaining, 3);
        assert!(status.next_available_at.is_none());
    }

    #[test]
    fn remaining_decreases_as_orders_land() {
        let window = RateWindow::default();
        let now = ts(10, 12);
        let mut history = vec![];
        for expected in [2usize, 1, 0] {
            history.push(now - Duration::hours(history.len() as i64 + 1));
            let status = window.assess(now, &history);
            assert_eq!(status.remaining, expected);
        }
    }

    #[test]
    fn exhausted_quota_reports_oldest_exit() {
        let window = RateWindow::default();
        let now = ts(10, 12);
        let oldest = ts(8, 6);
        let history = [ts(9, 0), oldest, ts(10, 0)];
        let status = window.assess(now, &history);
        assert!(status.is_exhausted());
        assert_eq!(status.next_available_at, Some(oldest + Duration::days(3)));
    }

    #[test]
    fn order_exactly_window_old_has_aged_out() {
        let window = RateWindow::default();
        let now = ts(10, 12);
        let boundary = now - Duration::days(3);
        let history = [boundary, ts(9, 0), ts(10, 0)];
        let status = window.assess(now, &history);
        assert_eq!(status.remaining, 1);
        assert!(status.next_available_at.is_none());
    }

    #[test]
    fn becomes_available_at_reported_instant() {
        let window = RateWindow::default();
        let now = ts(10, 12);
        let history = [ts(8, 6), ts(9, 0), ts(10, 0)];
        let blocked = window.assess(now, &history);
        let retry_at = blocked.next_available_at.expect("quota should be exhausted");
        let status = window.assess(retry_at, &history);
        assert_eq!(status.remaining, 1);
    }

    #[test]
    fn custom_quota() {
        let window = RateWindow::new(1, Duration::hours(1));
        let now = ts(10, 12);
        let status = window.assess(now, &[now - Duration::minutes(30)]);
        assert!(status.is_exhausted());
        assert_eq!(status.next_available_at, Some(now + Duration::minutes(30)));
    }
}
