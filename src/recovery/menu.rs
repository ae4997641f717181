//! Today's menu - which body parts to train next

use serde::Serialize;

use super::{MuscleRecovery, RecoveryTracker};
use crate::exercises::{CanonicalExercise, ExerciseCatalog, Muscle, MuscleGroup};

/// Score of a muscle with no stimulation on record. Above any progress
/// value, so untouched groups always come first.
pub const NEVER_TRAINED_SCORE: f64 = 2.0;

/// Exercises suggested per group
pub const EXERCISES_PER_GROUP: usize = 3;

/// Group trained together with the primary suggestion
pub fn paired_group(primary: MuscleGroup) -> MuscleGroup {
    match primary {
        MuscleGroup::Chest => MuscleGroup::Arms,
        MuscleGroup::Back => MuscleGroup::Shoulders,
        MuscleGroup::Shoulders => MuscleGroup::Core,
        MuscleGroup::Arms => MuscleGroup::Chest,
        MuscleGroup::Legs => MuscleGroup::Core,
        MuscleGroup::Core => MuscleGroup::Legs,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScore {
    pub group: MuscleGroup,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedExercise {
    pub exercise_id: String,
    pub name: String,
    pub group: MuscleGroup,
    pub score: f64,
    /// Added to bring back a neglected muscle
    pub neglected_fix: bool,
}

/// Longest-untrained muscle, flagged independently of the group ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeglectedFix {
    pub muscle: Muscle,
    pub days_since: i64,
    pub exercise_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSuggestion {
    pub primary: MuscleGroup,
    pub secondary: MuscleGroup,
    /// Every group, highest score first
    pub group_scores: Vec<GroupScore>,
    pub exercises: Vec<SuggestedExercise>,
    pub neglected_fix: Option<NeglectedFix>,
}

/// Menu suggestion engine
pub struct MenuPlanner<'a, C: ExerciseCatalog + ?Sized> {
    tracker: &'a RecoveryTracker,
    catalog: &'a C,
}

impl<'a, C: ExerciseCatalog + ?Sized> MenuPlanner<'a, C> {
    pub fn new(tracker: &'a RecoveryTracker, catalog: &'a C) -> Self {
        Self { tracker, catalog }
    }

    /// Recovery progress, or `NEVER_TRAINED_SCORE` without a record
    pub fn muscle_score(&self, muscle: Muscle) -> f64 {
        self.tracker
            .get(muscle)
            .map_or(NEVER_TRAINED_SCORE, |r| r.progress)
    }

    /// Average muscle score across the group
    pub fn group_score(&self, group: MuscleGroup) -> f64 {
        let muscles = group.muscles();
        if muscles.is_empty() {
            return 0.0;
        }
        muscles.iter().map(|m| self.muscle_score(*m)).sum::<f64>() / muscles.len() as f64
    }

    /// How much the exercise hits muscles that are ready for work
    fn exercise_score(&self, exercise: &CanonicalExercise) -> f64 {
        exercise
            .muscles
            .iter()
            .filter_map(|&(m, _)| exercise.intensity_for(m).map(|i| i * self.muscle_score(m)))
            .sum()
    }

    fn exercises_for(&self, group: MuscleGroup) -> Vec<SuggestedExercise> {
        let mut candidates: Vec<SuggestedExercise> = self
            .catalog
            .exercises()
            .iter()
            .filter(|e| e.dominant_muscle().map(|m| m.group()) == Some(group))
            .map(|e| SuggestedExercise {
                exercise_id: e.id.clone(),
                name: e.name_ja.clone(),
                group,
                score: self.exercise_score(e),
                neglected_fix: false,
            })
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(EXERCISES_PER_GROUP);
        candidates
    }

    /// Catalog exercise loading the muscle hardest; first listed wins ties
    fn best_exercise_for(&self, muscle: Muscle) -> Option<&'a CanonicalExercise> {
        self.catalog
            .exercises()
            .iter()
            .filter_map(|e| e.intensity_for(muscle).map(|i| (e, i)))
            .fold(None::<(&'a CanonicalExercise, f64)>, |best, (e, i)| match best {
                Some((_, best_i)) if best_i >= i => best,
                _ => Some((e, i)),
            })
            .map(|(e, _)| e)
    }

    fn neglected_fix(&self, neglected: &MuscleRecovery) -> NeglectedFix {
        NeglectedFix {
            muscle: neglected.muscle,
            days_since: neglected.days_since,
            exercise_id: self.best_exercise_for(neglected.muscle).map(|e| e.id.clone()),
        }
    }

    pub fn suggest(&self) -> MenuSuggestion {
        let mut group_scores: Vec<GroupScore> = MuscleGroup::all()
            .iter()
            .map(|g| GroupScore {
                group: *g,
                score: self.group_score(*g),
            })
            .collect();

        // Stable sort keeps declaration order among equal scores
        group_scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        let primary = group_scores
            .first()
            .map_or(MuscleGroup::Chest, |g| g.group);
        let secondary = paired_group(primary);

        let mut exercises = self.exercises_for(primary);
        exercises.extend(self.exercises_for(secondary));

        let neglected_fix = self.tracker.most_neglected().map(|n| self.neglected_fix(n));

        if let Some(fix) = &neglected_fix {
            if let Some(exercise) = fix
                .exercise_id
                .as_deref()
                .and_then(|id| self.catalog.lookup_by_id(id))
            {
                if !exercises.iter().any(|e| e.exercise_id == exercise.id) {
                    exercises.push(SuggestedExercise {
                        exercise_id: exercise.id.clone(),
                        name: exercise.name_ja.clone(),
                        group: fix.muscle.group(),
                        score: self.exercise_score(exercise),
                        neglected_fix: true,
                    });
                }
            }
        }

        MenuSuggestion {
            primary,
            secondary,
            group_scores,
            exercises,
            neglected_fix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StimulationRecord;
    use crate::exercises::Catalog;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(muscle: Muscle, hours_ago: i64) -> StimulationRecord {
        StimulationRecord {
            muscle,
            stimulated_at: now() - Duration::hours(hours_ago),
            max_intensity: 1.0,
            total_sets: 3,
            session_id: 1,
        }
    }

    /// Every muscle outside `skip` trained `hours_ago`
    fn trained_except(skip: &[MuscleGroup], hours_ago: i64) -> Vec<StimulationRecord> {
        Muscle::all()
            .iter()
            .filter(|m| !skip.contains(&m.group()))
            .map(|m| record(*m, hours_ago))
            .collect()
    }

    #[test]
    fn test_pairing_table_never_pairs_with_self() {
        for group in MuscleGroup::all() {
            assert_ne!(paired_group(*group), *group);
        }
        assert_eq!(paired_group(MuscleGroup::Chest), MuscleGroup::Arms);
    }

    #[test]
    fn test_untrained_group_wins() {
        let records = trained_except(&[MuscleGroup::Legs], 1);
        let tracker = RecoveryTracker::from_records(&records, now());
        let catalog = Catalog::builtin();
        let menu = MenuPlanner::new(&tracker, &catalog).suggest();

        assert_eq!(menu.primary, MuscleGroup::Legs);
        assert_eq!(menu.secondary, MuscleGroup::Core);
        assert_eq!(menu.group_scores[0].score, NEVER_TRAINED_SCORE);

        let ids: Vec<_> = menu.exercises.iter().map(|e| e.exercise_id.as_str()).collect();
        assert_eq!(ids[0], "squat");
        assert!(ids.contains(&"leg_press"));
        assert!(ids.contains(&"crunch"));
        assert!(menu.neglected_fix.is_none());
    }

    #[test]
    fn test_empty_history_prefers_first_group() {
        let tracker = RecoveryTracker::from_records(&[], now());
        let catalog = Catalog::builtin();
        let planner = MenuPlanner::new(&tracker, &catalog);

        for group in MuscleGroup::all() {
            assert_eq!(planner.group_score(*group), NEVER_TRAINED_SCORE);
        }
        let menu = planner.suggest();
        assert_eq!(menu.primary, MuscleGroup::Chest);
        assert_eq!(menu.secondary, MuscleGroup::Arms);
        assert!(menu.exercises.iter().all(|e| !e.neglected_fix));
        assert!(menu.exercises.len() <= EXERCISES_PER_GROUP * 2);
    }

    #[test]
    fn test_most_recovered_group_ranks_first() {
        let mut records = trained_except(&[MuscleGroup::Back], 1);
        // Back muscles fully recovered
        for m in MuscleGroup::Back.muscles() {
            records.push(record(m, 100));
        }
        let tracker = RecoveryTracker::from_records(&records, now());
        let catalog = Catalog::builtin();
        let menu = MenuPlanner::new(&tracker, &catalog).suggest();

        assert_eq!(menu.primary, MuscleGroup::Back);
        assert_eq!(menu.secondary, MuscleGroup::Shoulders);
        assert!((menu.group_scores[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_neglected_muscle_adds_exercise() {
        let mut records = trained_except(&[MuscleGroup::Legs, MuscleGroup::Chest], 1);
        records.push(record(Muscle::Chest, 24 * 10));
        let tracker = RecoveryTracker::from_records(&records, now());
        let catalog = Catalog::builtin();
        let menu = MenuPlanner::new(&tracker, &catalog).suggest();

        assert_eq!(menu.primary, MuscleGroup::Legs);
        let fix = menu.neglected_fix.unwrap();
        assert_eq!(fix.muscle, Muscle::Chest);
        assert_eq!(fix.days_since, 10);
        assert_eq!(fix.exercise_id.as_deref(), Some("bench_press"));

        let last = menu.exercises.last().unwrap();
        assert_eq!(last.exercise_id, "bench_press");
        assert!(last.neglected_fix);
    }

    #[test]
    fn test_neglected_exercise_not_repeated() {
        // Chest neglected and also the primary group
        let mut records = trained_except(&[MuscleGroup::Chest], 1);
        records.push(record(Muscle::Chest, 24 * 8));
        let tracker = RecoveryTracker::from_records(&records, now());
        let catalog = Catalog::builtin();
        let menu = MenuPlanner::new(&tracker, &catalog).suggest();

        assert_eq!(menu.primary, MuscleGroup::Chest);
        assert!(menu.neglected_fix.is_some());
        let bench_count = menu
            .exercises
            .iter()
            .filter(|e| e.exercise_id == "bench_press")
            .count();
        assert_eq!(bench_count, 1);
        assert!(menu.exercises.iter().all(|e| !e.neglected_fix));
    }
}
