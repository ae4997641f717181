//! Import merger - parsed workouts into stored sessions
//!
//! Workouts are processed one at a time in input order, and each is
//! committed before the next one is looked at, so duplicate detection
//! sees sessions created earlier in the same batch.

pub mod resolver;

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::db::{SessionDraft, SetDraft, StimulationDraft, WorkoutStore};
use crate::exercises::{ExerciseCatalog, Muscle};
use crate::parser::ParsedWorkout;

pub use resolver::{ExerciseResolver, MatchKind};

/// Imported sources carry no end time; sessions get this fixed length
pub const IMPORTED_SESSION_HOURS: i64 = 1;

/// Outcome of an import batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub sessions_created: usize,
    pub sets_created: usize,
    /// Distinct names, in the order first seen
    pub unmatched_exercise_names: Vec<String>,
    pub duplicates_skipped: usize,
    pub errors: Vec<String>,
}

/// Input name and the catalog exercise it resolved to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedName {
    pub input: String,
    pub exercise_id: String,
    pub kind: MatchKind,
}

/// What an import would do, computed without writing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportPreview {
    pub workout_count: usize,
    pub exercise_count: usize,
    pub set_count: usize,
    /// Sets belonging to exercises that resolve to the catalog
    pub matched_set_count: usize,
    pub matched_exercises: Vec<ResolvedName>,
    pub unmatched_exercise_names: Vec<String>,
    /// Workouts on a day that already has a session
    pub duplicate_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// Resolves exercise names and merges workouts into a store
pub struct WorkoutImporter<'a, C: ExerciseCatalog + ?Sized> {
    resolver: ExerciseResolver<'a, C>,
}

impl<'a, C: ExerciseCatalog + ?Sized> WorkoutImporter<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            resolver: ExerciseResolver::new(catalog),
        }
    }

    /// Build the session for one workout. Names that do not resolve are
    /// appended to `unmatched` and their sets dropped. `None` when
    /// nothing in the workout resolved.
    pub fn build_session(
        &self,
        workout: &ParsedWorkout,
        unmatched: &mut Vec<String>,
    ) -> Option<SessionDraft> {
        let mut sets = Vec::new();
        // muscle -> (sets touching it, max intensity)
        let mut muscles: BTreeMap<Muscle, (u32, f64)> = BTreeMap::new();

        for exercise in &workout.exercises {
            let Some(canonical) = self.resolver.resolve(&exercise.name) else {
                warn!(name = %exercise.name, "no catalog match for exercise");
                push_unique(unmatched, &exercise.name);
                continue;
            };

            for set in &exercise.sets {
                sets.push(SetDraft {
                    exercise_id: canonical.id.clone(),
                    set_number: sets.len() as u32 + 1,
                    weight: set.weight,
                    reps: set.repetitions,
                });

                for &(muscle, _) in &canonical.muscles {
                    let Some(intensity) = canonical.intensity_for(muscle) else {
                        continue;
                    };
                    let entry = muscles.entry(muscle).or_insert((0, 0.0));
                    entry.0 += 1;
                    entry.1 = entry.1.max(intensity);
                }
            }
        }

        if sets.is_empty() {
            return None;
        }

        let Some(ended_at) = workout
            .date
            .checked_add_signed(Duration::hours(IMPORTED_SESSION_HOURS))
        else {
            warn!(date = %workout.date, "session end out of range");
            return None;
        };

        let stimulations = muscles
            .into_iter()
            .map(|(muscle, (total_sets, max_intensity))| StimulationDraft {
                muscle,
                max_intensity,
                total_sets,
            })
            .collect();

        Some(SessionDraft {
            started_at: workout.date,
            ended_at,
            sets,
            stimulations,
        })
    }

    /// Import workouts in order. A store failure on one workout does not
    /// undo earlier ones or stop later ones; all failures are reported in
    /// a single error string.
    pub fn import<S: WorkoutStore + ?Sized>(
        &self,
        store: &mut S,
        workouts: &[ParsedWorkout],
        skip_duplicates: bool,
    ) -> ImportResult {
        let mut result = ImportResult::default();
        let mut failures: Vec<String> = Vec::new();

        for workout in workouts {
            let day = workout.date.date();

            if skip_duplicates {
                match store.exists_session_on(day) {
                    Ok(true) => {
                        warn!(%day, "session already exists, skipping workout");
                        result.duplicates_skipped += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        error!(%day, error = %err, "duplicate check failed");
                        failures.push(format!("{day}: {err:#}"));
                        continue;
                    }
                }
            }

            let Some(session) = self.build_session(workout, &mut result.unmatched_exercise_names)
            else {
                debug!(%day, "nothing to save for workout");
                continue;
            };

            match store.save_session(&session) {
                Ok(session_id) => {
                    info!(
                        session_id,
                        %day,
                        sets = session.sets.len(),
                        muscles = session.stimulations.len(),
                        "session imported"
                    );
                    result.sessions_created += 1;
                    result.sets_created += session.sets.len();
                }
                Err(err) => {
                    error!(%day, error = %err, "failed to save session");
                    failures.push(format!("{day}: {err:#}"));
                }
            }
        }

        if !failures.is_empty() {
            result.errors.push(format!(
                "failed to import {} workout(s): {}",
                failures.len(),
                failures.join("; ")
            ));
        }

        info!(
            sessions = result.sessions_created,
            sets = result.sets_created,
            duplicates = result.duplicates_skipped,
            unmatched = result.unmatched_exercise_names.len(),
            "import finished"
        );
        result
    }

    /// Same matching and duplicate analysis as `import`, without writing
    pub fn preview<S: WorkoutStore + ?Sized>(
        &self,
        store: &S,
        workouts: &[ParsedWorkout],
    ) -> ImportPreview {
        let mut preview = ImportPreview {
            workout_count: workouts.len(),
            first_date: workouts.iter().map(|w| w.date.date()).min(),
            last_date: workouts.iter().map(|w| w.date.date()).max(),
            ..ImportPreview::default()
        };
        // Days an earlier workout in this batch would occupy
        let mut batch_days: HashSet<NaiveDate> = HashSet::new();

        for workout in workouts {
            let day = workout.date.date();
            let stored = store.exists_session_on(day).unwrap_or_else(|err| {
                warn!(%day, error = %err, "duplicate check failed during preview");
                false
            });
            if stored || batch_days.contains(&day) {
                preview.duplicate_count += 1;
            }

            let mut any_matched = false;
            for exercise in &workout.exercises {
                preview.exercise_count += 1;
                preview.set_count += exercise.sets.len();

                match self.resolver.resolve_with_kind(&exercise.name) {
                    Some((canonical, kind)) => {
                        any_matched = true;
                        preview.matched_set_count += exercise.sets.len();
                        if !preview.matched_exercises.iter().any(|m| m.input == exercise.name) {
                            preview.matched_exercises.push(ResolvedName {
                                input: exercise.name.clone(),
                                exercise_id: canonical.id.clone(),
                                kind,
                            });
                        }
                    }
                    None => push_unique(&mut preview.unmatched_exercise_names, &exercise.name),
                }
            }

            if any_matched {
                batch_days.insert(day);
            }
        }

        preview
    }
}
