//! Usage Tracker: rolling request and token rates for the log.
//!
//! Purely observational. Nothing here delays or refuses a request.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// One issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageSample {
    pub at: DateTime<Utc>,
    pub tokens: u64,
}

/// Rates derived at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageSummary {
    /// Samples younger than one minute.
    pub requests_last_minute: usize,
    /// Samples no older than one day.
    pub requests_last_day: usize,
    /// Cumulative tokens over minutes since the oldest retained sample,
    /// floored at one minute.
    pub tokens_per_minute: u64,
}

#[derive(Clone, Debug, Default)]
pub struct UsageTracker {
    samples: VecDeque<UsageSample>,
    total_tokens: u64,
}

fn minute() -> Duration {
    Duration::seconds(60)
}

fn day() -> Duration {
    Duration::seconds(86_400)
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request and evict samples more than a day older than `at`.
    pub fn record(&mut self, at: DateTime<Utc>, tokens: u64) {
        self.samples.push_back(UsageSample { at, tokens });
        self.total_tokens = self.total_tokens.saturating_add(tokens);
        while let Some(front) = self.samples.front() {
            if at - front.at > day() {
                let _ = self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn summarize(&self, now: DateTime<Utc>) -> UsageSummary {
        let retained: Vec<&UsageSample> = self
            .samples
            .iter()
            .filter(|s| now - s.at <= day())
            .collect();

        let requests_last_minute = retained.iter().filter(|s| now - s.at < minute()).count();

        let elapsed_minutes = retained
            .iter()
            .map(|s| s.at)
            .min()
            .map(|oldest| (now - oldest).num_milliseconds() as f64 / 60_000.0)
            .unwrap_or(0.0)
            .max(1.0);

        UsageSummary {
            requests_last_minute,
            requests_last_day: retained.len(),
            tokens_per_minute: (self.total_tokens as f64 / elapsed_minutes) as u64,
        }
    }

    /// Tokens attributed to every request this session, evicted or not.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn samples(&self) -> impl Iterator<Item = &UsageSample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn empty_tracker_summary() {
        let tracker = UsageTracker::new();
        let summary = tracker.summarize(at(0));
        assert_eq!(summary.requests_last_minute, 0);
        assert_eq!(summary.requests_last_day, 0);
        assert_eq!(summary.tokens_per_minute, 0);
    }

    #[test]
    fn minute_window_is_strict() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 10);
        tracker.record(at(30), 10);
        tracker.record(at(90), 10);

        let summary = tracker.summarize(at(90));
        assert_eq!(summary.requests_last_minute, 1);
        assert_eq!(summary.requests_last_day, 3);
    }

    #[test]
    fn old_samples_evicted_on_record() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 5);
        tracker.record(at(86_401), 5);
        assert_eq!(tracker.samples().count(), 1);
        assert_eq!(tracker.total_tokens(), 10);
    }

    #[test]
    fn day_old_sample_excluded_from_summary() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 5);
        tracker.record(at(100), 5);
        let summary = tracker.summarize(at(86_450));
        assert_eq!(summary.requests_last_day, 1);
    }

    #[test]
    fn exactly_one_day_is_retained() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 5);
        tracker.record(at(86_400), 5);
        assert_eq!(tracker.samples().count(), 2);
    }

    #[test]
    fn tokens_per_minute_floors_elapsed_at_one_minute() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 40);
        tracker.record(at(10), 20);
        assert_eq!(tracker.summarize(at(10)).tokens_per_minute, 60);
    }

    #[test]
    fn tokens_per_minute_over_elapsed_minutes() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 100);
        tracker.record(at(240), 100);
        // 200 tokens over 4 minutes
        assert_eq!(tracker.summarize(at(240)).tokens_per_minute, 50);
    }

    #[test]
    fn tokens_per_minute_uses_lifetime_total() {
        let mut tracker = UsageTracker::new();
        tracker.record(at(0), 1_000);
        tracker.record(at(90_000), 100);
        // The evicted sample's tokens still count; the oldest retained sample
        // is the one just recorded.
        assert_eq!(tracker.summarize(at(90_000)).tokens_per_minute, 1_100);
    }
}
