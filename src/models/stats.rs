use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Round `part / whole` to the nearest integer percent (halves round up).
///
/// Returns 0 when `whole` is 0.
pub fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Per-kana answer history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanaRecord {
    pub attempts: u32,
    pub correct: u32,
    pub last_answered: Option<DateTime<Utc>>,
}

impl KanaRecord {
    pub fn accuracy_percent(&self) -> u32 {
        rounded_percent(self.correct as usize, self.attempts as usize)
    }
}

/// Learning statistics persisted under the `stats` key.
///
/// Invariant: `total_correct <= total_attempts`, and the same per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub kana_records: IndexMap<String, KanaRecord>,
    #[serde(default)]
    pub last_reset_time: Option<DateTime<Utc>>,
}

/// How long ago the statistics were last reset, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAge {
    Never,
    Today,
    Yesterday,
    DaysAgo(i64),
}

impl std::fmt::Display for ResetAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetAge::Never => write!(f, "never"),
            ResetAge::Today => write!(f, "today"),
            ResetAge::Yesterday => write!(f, "yesterday"),
            ResetAge::DaysAgo(days) => write!(f, "{days} days ago"),
        }
    }
}

impl LearningStats {
    /// Upsert the record for `kana_id` and bump the global totals
    pub fn record_attempt(&mut self, kana_id: &str, correct: bool, now: DateTime<Utc>) {
        let record = self.kana_records.entry(kana_id.to_string()).or_default();
        record.attempts = record.attempts.saturating_add(1);
        if correct {
            record.correct = record.correct.saturating_add(1);
        }
        record.last_answered = Some(now);

        // Counters come from a stored blob and may already sit at the limit
        self.total_attempts = self.total_attempts.saturating_add(1);
        if correct {
            self.total_correct = self.total_correct.saturating_add(1);
        }
    }

    /// Zeroed statistics stamped with the reset time
    pub fn reset_at(now: DateTime<Utc>) -> Self {
        Self {
            last_reset_time: Some(now),
            ..Default::default()
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        rounded_percent(self.total_correct as usize, self.total_attempts as usize)
    }

    pub fn record(&self, kana_id: &str) -> Option<&KanaRecord> {
        self.kana_records.get(kana_id)
    }

    pub fn reset_age(&self, now: DateTime<Utc>) -> ResetAge {
        match self.last_reset_time {
            None => ResetAge::Never,
            Some(reset) => match (now - reset).num_days() {
                d if d <= 0 => ResetAge::Today,
                1 => ResetAge::Yesterday,
                d => ResetAge::DaysAgo(d),
            },
        }
    }

    /// Check the counter invariants; a blob loaded from storage may violate them
    pub fn is_consistent(&self) -> bool {
        self.total_correct <= self.total_attempts
            && self.kana_records.values().all(|r| r.correct <= r.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_rounded_percent() {
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(rounded_percent(46, 46), 100);
    }

    #[test]
    fn test_record_attempt_totals() {
        let mut stats = LearningStats::default();
        let now = Utc::now();

        stats.record_attempt("a", true, now);
        stats.record_attempt("a", false, now);
        stats.record_attempt("ka", true, now);

        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.accuracy_percent(), 67);

        let a = stats.record("a").unwrap();
        assert_eq!(a.attempts, 2);
        assert_eq!(a.correct, 1);
        assert_eq!(a.last_answered, Some(now));
        assert_eq!(a.accuracy_percent(), 50);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_record_attempt_saturates_stored_counters() {
        let blob = r#"{"totalAttempts": 4294967295, "totalCorrect": 4294967295}"#;
        let mut stats: LearningStats = serde_json::from_str(blob).unwrap();
        assert!(stats.is_consistent());

        stats.record_attempt("a", true, Utc::now());
        stats.record_attempt("a", false, Utc::now());

        assert_eq!(stats.total_attempts, u32::MAX);
        assert_eq!(stats.total_correct, u32::MAX);
        assert_eq!(stats.accuracy_percent(), 100);
        assert_eq!(stats.record("a").unwrap().attempts, 2);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_reset_clears_and_stamps() {
        let mut stats = LearningStats::default();
        let now = Utc::now();
        stats.record_attempt("a", true, now);
        stats.total_sessions = 4;

        let reset = LearningStats::reset_at(now);
        assert_eq!(reset.total_attempts, 0);
        assert_eq!(reset.total_sessions, 0);
        assert!(reset.kana_records.is_empty());
        assert_eq!(reset.last_reset_time, Some(now));
    }

    #[test]
    fn test_reset_age() {
        let now = Utc::now();
        let mut stats = LearningStats::default();
        assert_eq!(stats.reset_age(now), ResetAge::Never);

        stats.last_reset_time = Some(now - Duration::hours(3));
        assert_eq!(stats.reset_age(now), ResetAge::Today);

        stats.last_reset_time = Some(now - Duration::hours(30));
        assert_eq!(stats.reset_age(now), ResetAge::Yesterday);

        stats.last_reset_time = Some(now - Duration::days(5));
        assert_eq!(stats.reset_age(now), ResetAge::DaysAgo(5));
        assert_eq!(ResetAge::DaysAgo(5).to_string(), "5 days ago");
    }

    #[test]
    fn test_deserialize_camel_case_blob() {
        let blob = r#"{
            "totalSessions": 3,
            "totalCorrect": 2,
            "totalAttempts": 3,
            "kanaRecords": {"a": {"attempts": 3, "correct": 2, "lastAnswered": null}},
            "lastResetTime": null
        }"#;
        let stats: LearningStats = serde_json::from_str(blob).unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.record("a").unwrap().correct, 2);
        assert!(stats.is_consistent());
    }
}
