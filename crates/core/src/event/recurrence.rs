//! Recurrence rules and their expansion into concrete occurrences.
//!
//! Expansion is a pure function of its arguments: calling it twice with the
//! same inputs yields the same sequence, so callers can re-project a
//! calendar at any time without hidden state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    /// The stride between consecutive occurrences.
    pub fn stride(self) -> Duration {
        match self {
            Frequency::Daily => Duration::days(1),
            Frequency::Weekly => Duration::days(7),
        }
    }
}

/// A fixed-stride recurrence rule.
///
/// `until`, when present, bounds the last occurrence (inclusive). A rule
/// whose `until` lies before the event start is a configuration error and
/// is rejected by [`super::validate_event`] at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub until: Option<DateTime<Utc>>,
}

impl RecurrenceRule {
    /// Creates an open-ended rule (bounded only by the caller's horizon).
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            until: None,
        }
    }

    /// Bounds the rule at an inclusive end instant.
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }
}

/// Expands an event start into its occurrences up to `horizon` (inclusive).
///
/// Without a rule the event has exactly one occurrence, its own start,
/// returned only when it does not lie beyond the horizon. With a rule the
/// occurrences run from `start` in constant strides while they stay within
/// both the horizon and the rule's own `until` bound.
///
/// The result is non-decreasing and finite for any finite horizon.
pub fn expand(
    start: DateTime<Utc>,
    rule: Option<&RecurrenceRule>,
    horizon: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let Some(rule) = rule else {
        return if start <= horizon { vec![start] } else { vec![] };
    };

    let bound = match rule.until {
        Some(until) => horizon.min(until),
        None => horizon,
    };

    let stride = rule.frequency.stride();
    let mut occurrences = Vec::new();
    let mut at = start;
    while at <= bound {
        occurrences.push(at);
        at += stride;
    }
    occurrences
}

/// Deterministic identity for one occurrence of a recurring event.
///
/// UUIDv5 in the namespace of the base event id, named by the occurrence
/// instant. Re-expanding the same event therefore regenerates the same
/// occurrence ids, which is what keeps repeated expanded calendar adds
/// idempotent.
pub fn occurrence_id(event_id: Uuid, at: DateTime<Utc>) -> Uuid {
    Uuid::new_v5(&event_id, at.to_rfc3339().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_no_rule_single_occurrence() {
        let start = at(2024, 1, 1, 10);
        let horizon = at(2024, 2, 1, 0);

        assert_eq!(expand(start, None, horizon), vec![start]);
    }

    #[test]
    fn test_no_rule_start_beyond_horizon() {
        let start = at(2024, 3, 1, 10);
        let horizon = at(2024, 2, 1, 0);

        assert!(expand(start, None, horizon).is_empty());
    }

    #[test]
    fn test_start_equal_to_horizon_is_included() {
        let start = at(2024, 2, 1, 0);

        assert_eq!(expand(start, None, start), vec![start]);
    }

    #[test]
    fn test_daily_stride_and_bounds() {
        let start = at(2024, 1, 1, 10);
        let horizon = at(2024, 1, 5, 10);
        let rule = RecurrenceRule::new(Frequency::Daily);

        let occurrences = expand(start, Some(&rule), horizon);

        assert_eq!(occurrences.len(), 5);
        for (i, pair) in occurrences.windows(2).enumerate() {
            assert_eq!(pair[1] - pair[0], Duration::days(1), "stride at {}", i);
        }
        assert!(occurrences.iter().all(|&d| d >= start && d <= horizon));
    }

    #[test]
    fn test_weekly_bounded_by_until() {
        // start=2024-01-01T10:00, weekly, until=2024-01-22, horizon=2024-02-01
        let start = at(2024, 1, 1, 10);
        let rule = RecurrenceRule::new(Frequency::Weekly).until(at(2024, 1, 22, 10));
        let horizon = at(2024, 2, 1, 0);

        let occurrences = expand(start, Some(&rule), horizon);

        assert_eq!(
            occurrences,
            vec![
                at(2024, 1, 1, 10),
                at(2024, 1, 8, 10),
                at(2024, 1, 15, 10),
                at(2024, 1, 22, 10),
            ]
        );
    }

    #[test]
    fn test_horizon_tighter_than_until() {
        let start = at(2024, 1, 1, 10);
        let rule = RecurrenceRule::new(Frequency::Daily).until(at(2024, 12, 31, 0));
        let horizon = at(2024, 1, 3, 10);

        let occurrences = expand(start, Some(&rule), horizon);

        assert_eq!(occurrences.len(), 3);
        assert_eq!(*occurrences.last().unwrap(), at(2024, 1, 3, 10));
    }

    #[test]
    fn test_expansion_is_restartable() {
        let start = at(2024, 1, 1, 10);
        let rule = RecurrenceRule::new(Frequency::Weekly).until(at(2024, 3, 1, 0));
        let horizon = at(2024, 6, 1, 0);

        let first = expand(start, Some(&rule), horizon);
        let second = expand(start, Some(&rule), horizon);

        assert_eq!(first, second);
    }

    #[test]
    fn test_occurrence_id_is_deterministic() {
        let event_id = Uuid::new_v4();
        let when = at(2024, 1, 8, 10);

        assert_eq!(occurrence_id(event_id, when), occurrence_id(event_id, when));
        assert_ne!(
            occurrence_id(event_id, when),
            occurrence_id(event_id, at(2024, 1, 15, 10))
        );
        assert_ne!(
            occurrence_id(event_id, when),
            occurrence_id(Uuid::new_v4(), when)
        );
    }
}
