//! Recovery engine - per-muscle recovery estimate from stimulation history
//!
//! Features:
//! - Volume-scaled recovery duration
//! - Continuous recovery progress (0.0-1.0)
//! - Discrete status with neglect detection
//! - Menu suggestions (see `menu`)

pub mod menu;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::StimulationRecord;
use crate::exercises::Muscle;

pub use menu::{MenuPlanner, MenuSuggestion};

/// Days without stimulation before a muscle counts as neglected
pub const NEGLECTED_DAYS: i64 = 7;
pub const NEGLECTED_SEVERE_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "progress", rename_all = "snake_case")]
pub enum RecoveryStatus {
    Recovering(f64),
    FullyRecovered,
    Neglected,
    NeglectedSevere,
}

impl RecoveryStatus {
    pub fn label(&self) -> String {
        match self {
            RecoveryStatus::Recovering(p) => format!("回復中 {:.0}%", p * 100.0),
            RecoveryStatus::FullyRecovered => "回復済み".to_string(),
            RecoveryStatus::Neglected => "放置気味".to_string(),
            RecoveryStatus::NeglectedSevere => "長期放置".to_string(),
        }
    }
}

/// Recovery multiplier for the number of sets done: 3 sets is the baseline
pub fn volume_coefficient(total_sets: i32) -> f64 {
    match total_sets {
        i32::MIN..=1 => 0.7,
        2 => 0.85,
        3 => 1.0,
        4 => 1.1,
        _ => 1.15,
    }
}

pub fn adjusted_recovery_hours(base_hours: f64, total_sets: i32) -> f64 {
    base_hours * volume_coefficient(total_sets)
}

fn hours_elapsed(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// Fraction of the needed recovery time that has passed, clamped to 0.0-1.0
pub fn recovery_progress(
    stimulated_at: NaiveDateTime,
    total_sets: i32,
    base_hours: f64,
    now: NaiveDateTime,
) -> f64 {
    let needed = adjusted_recovery_hours(base_hours, total_sets);
    if needed <= 0.0 {
        return 1.0;
    }
    (hours_elapsed(stimulated_at, now) / needed).clamp(0.0, 1.0)
}

/// Whole calendar days between the two dates
pub fn days_since(stimulated_at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now.date() - stimulated_at.date()).num_days()
}

/// Status from progress and day count.
///
/// The day count and the hour-based progress are separate clocks and are
/// not reconciled: 8 days after a session a muscle reads 100% progress yet
/// is `Neglected`. Neglect thresholds are checked first.
pub fn derive_status(progress: f64, days_since: i64) -> RecoveryStatus {
    if days_since >= NEGLECTED_SEVERE_DAYS {
        RecoveryStatus::NeglectedSevere
    } else if days_since >= NEGLECTED_DAYS {
        RecoveryStatus::Neglected
    } else if progress >= 1.0 {
        RecoveryStatus::FullyRecovered
    } else {
        RecoveryStatus::Recovering(progress)
    }
}

/// Recovery state of one muscle at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleRecovery {
    pub muscle: Muscle,
    pub last_stimulated: NaiveDateTime,
    pub total_sets: u32,
    pub max_intensity: f64,
    pub progress: f64,
    pub days_since: i64,
    pub status: RecoveryStatus,
}

impl MuscleRecovery {
    pub fn from_record(record: &StimulationRecord, now: NaiveDateTime) -> Self {
        let sets = i32::try_from(record.total_sets).unwrap_or(i32::MAX);
        let progress = recovery_progress(
            record.stimulated_at,
            sets,
            record.muscle.base_recovery_hours(),
            now,
        );
        let days = days_since(record.stimulated_at, now);

        Self {
            muscle: record.muscle,
            last_stimulated: record.stimulated_at,
            total_sets: record.total_sets,
            max_intensity: record.max_intensity,
            progress,
            days_since: days,
            status: derive_status(progress, days),
        }
    }
}

/// Latest recovery state per muscle
pub struct RecoveryTracker {
    muscles: HashMap<Muscle, MuscleRecovery>,
    now: NaiveDateTime,
}

impl RecoveryTracker {
    /// Build tracker from stimulation history; only the latest record per
    /// muscle matters
    pub fn from_records(records: &[StimulationRecord], now: NaiveDateTime) -> Self {
        let mut latest: HashMap<Muscle, &StimulationRecord> = HashMap::new();

        for record in records {
            match latest.get(&record.muscle) {
                Some(current) if current.stimulated_at >= record.stimulated_at => {}
                _ => {
                    latest.insert(record.muscle, record);
                }
            }
        }

        let muscles = latest
            .into_iter()
            .map(|(muscle, record)| (muscle, MuscleRecovery::from_record(record, now)))
            .collect();

        Self { muscles, now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// `None` for muscles that were never trained
    pub fn get(&self, muscle: Muscle) -> Option<&MuscleRecovery> {
        self.muscles.get(&muscle)
    }

    /// Trained muscles in catalog order
    pub fn trained(&self) -> Vec<&MuscleRecovery> {
        Muscle::all()
            .iter()
            .filter_map(|m| self.muscles.get(m))
            .collect()
    }

    pub fn untrained(&self) -> Vec<Muscle> {
        Muscle::all()
            .iter()
            .copied()
            .filter(|m| !self.muscles.contains_key(m))
            .collect()
    }

    /// Most neglected muscle (largest day count, at least `NEGLECTED_DAYS`)
    pub fn most_neglected(&self) -> Option<&MuscleRecovery> {
        self.trained()
            .into_iter()
            .filter(|r| r.days_since >= NEGLECTED_DAYS)
            .fold(None::<&MuscleRecovery>, |best, r| match best {
                Some(b) if b.days_since >= r.days_since => Some(b),
                _ => Some(r),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(muscle: Muscle, hours_ago: i64, total_sets: u32) -> StimulationRecord {
        StimulationRecord {
            muscle,
            stimulated_at: now() - Duration::hours(hours_ago),
            max_intensity: 1.0,
            total_sets,
            session_id: 1,
        }
    }

    #[test]
    fn test_volume_coefficient_steps() {
        assert_eq!(volume_coefficient(-3), 0.7);
        assert_eq!(volume_coefficient(0), 0.7);
        assert_eq!(volume_coefficient(1), 0.7);
        assert_eq!(volume_coefficient(2), 0.85);
        assert_eq!(volume_coefficient(3), 1.0);
        assert_eq!(volume_coefficient(4), 1.1);
        assert_eq!(volume_coefficient(5), 1.15);
        assert_eq!(volume_coefficient(40), 1.15);
    }

    #[test]
    fn test_volume_coefficient_monotonic() {
        for sets in 1..5 {
            assert!(volume_coefficient(sets) <= volume_coefficient(sets + 1));
        }
        for sets in 5..20 {
            assert_eq!(volume_coefficient(sets), volume_coefficient(5));
        }
    }

    #[test]
    fn test_medium_muscle_half_recovered_after_a_day() {
        let stimulated = now() - Duration::hours(24);
        let progress = recovery_progress(stimulated, 3, 48.0, now());

        assert!((progress - 0.5).abs() < 1e-9);
        assert_eq!(
            derive_status(progress, days_since(stimulated, now())),
            RecoveryStatus::Recovering(0.5)
        );
    }

    #[test]
    fn test_neglect_overrides_full_progress() {
        let stimulated = now() - Duration::hours(192);
        let progress = recovery_progress(stimulated, 3, 48.0, now());

        assert_eq!(progress, 1.0);
        assert_eq!(days_since(stimulated, now()), 8);
        assert_eq!(derive_status(progress, 8), RecoveryStatus::Neglected);
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(derive_status(1.0, 14), RecoveryStatus::NeglectedSevere);
        assert_eq!(derive_status(0.2, 30), RecoveryStatus::NeglectedSevere);
        assert_eq!(derive_status(1.0, 13), RecoveryStatus::Neglected);
        assert_eq!(derive_status(1.0, 6), RecoveryStatus::FullyRecovered);
        assert_eq!(derive_status(0.99, 0), RecoveryStatus::Recovering(0.99));
    }

    #[test]
    fn test_progress_bounds() {
        for hours in [0, 1, 10, 47, 48, 100, 1000] {
            for sets in 0..8 {
                let stimulated = now() - Duration::hours(hours);
                let p = recovery_progress(stimulated, sets, 72.0, now());
                assert!((0.0..=1.0).contains(&p), "progress {p} out of range");
            }
        }
        // Stimulation in the future reads as not recovered at all
        let future = now() + Duration::hours(5);
        assert_eq!(recovery_progress(future, 3, 48.0, now()), 0.0);
    }

    #[test]
    fn test_zero_duration_is_recovered() {
        assert_eq!(recovery_progress(now(), 3, 0.0, now()), 1.0);
        assert_eq!(recovery_progress(now(), 3, -5.0, now()), 1.0);
    }

    #[test]
    fn test_days_since_uses_calendar_days() {
        let late_evening = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let early_morning = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert_eq!(days_since(late_evening, early_morning), 1);
        assert_eq!(days_since(early_morning, now()), 0);
    }

    #[test]
    fn test_tracker_uses_latest_record() {
        let records = vec![
            record(Muscle::Chest, 300, 3),
            record(Muscle::Chest, 24, 5),
            record(Muscle::Chest, 200, 2),
        ];
        let tracker = RecoveryTracker::from_records(&records, now());

        let chest = tracker.get(Muscle::Chest).unwrap();
        assert_eq!(chest.total_sets, 5);
        assert_eq!(chest.days_since, 1);
        // 72h * 1.15 needed, 24h elapsed
        assert!((chest.progress - 24.0 / (72.0 * 1.15)).abs() < 1e-9);
        assert!(tracker.get(Muscle::Calves).is_none());
        assert_eq!(tracker.untrained().len(), Muscle::all().len() - 1);
    }

    #[test]
    fn test_most_neglected() {
        let records = vec![
            record(Muscle::Chest, 24 * 9, 3),
            record(Muscle::Quads, 24 * 20, 3),
            record(Muscle::Biceps, 24 * 20, 3),
            record(Muscle::Lats, 24, 3),
        ];
        let tracker = RecoveryTracker::from_records(&records, now());

        let worst = tracker.most_neglected().unwrap();
        // Ties resolve to the earlier muscle in catalog order
        assert_eq!(worst.muscle, Muscle::Biceps);
        assert_eq!(worst.status, RecoveryStatus::NeglectedSevere);
        assert_eq!(tracker.get(Muscle::Chest).unwrap().status, RecoveryStatus::Neglected);

        let fresh = RecoveryTracker::from_records(&[record(Muscle::Lats, 24, 3)], now());
        assert!(fresh.most_neglected().is_none());
    }

    #[test]
    fn test_status_serializes_with_progress() {
        let json = serde_json::to_string(&RecoveryStatus::Recovering(0.5)).unwrap();
        assert_eq!(json, r#"{"status":"recovering","progress":0.5}"#);
        let json = serde_json::to_string(&RecoveryStatus::Neglected).unwrap();
        assert_eq!(json, r#"{"status":"neglected"}"#);
    }
}
