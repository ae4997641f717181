//! Free-text exercise name → canonical catalog exercise

use serde::Serialize;

use crate::exercises::{CanonicalExercise, ExerciseCatalog};

/// Alternate spellings that neither name nor substring matching catch.
/// Keywords are compared against the lower-cased input.
pub const KEYWORD_ALIASES: &[(&str, &str)] = &[
    ("lat pull", "lat_pulldown"),
    ("pulldown", "lat_pulldown"),
    ("ラットプル", "lat_pulldown"),
    ("懸垂", "pull_up"),
    ("chin up", "pull_up"),
    ("chin-up", "pull_up"),
    ("pullup", "pull_up"),
    ("プルアップ", "pull_up"),
    ("腕立て", "push_up"),
    ("pushup", "push_up"),
    ("プッシュアップ", "push_up"),
    ("ベンチ", "bench_press"),
    ("bench", "bench_press"),
    ("ohp", "shoulder_press"),
    ("military", "shoulder_press"),
    ("overhead press", "shoulder_press"),
    ("肩プレス", "shoulder_press"),
    ("side raise", "lateral_raise"),
    ("サイドレイズ", "lateral_raise"),
    ("ロウ", "barbell_row"),
    ("row", "barbell_row"),
    ("デッド", "deadlift"),
    ("pushdown", "triceps_pushdown"),
    ("プレスダウン", "triceps_pushdown"),
    ("アームカール", "barbell_curl"),
    ("curl", "barbell_curl"),
    ("スクワット", "squat"),
    ("腹筋", "crunch"),
    ("sit up", "crunch"),
    ("abs", "crunch"),
];

/// Which rule produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExactJa,
    ExactEn,
    PartialJa,
    PartialEn,
    Keyword,
}

/// Resolves names against an injected catalog
pub struct ExerciseResolver<'a, C: ExerciseCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: ExerciseCatalog + ?Sized> ExerciseResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, name: &str) -> Option<&'a CanonicalExercise> {
        self.resolve_with_kind(name).map(|(exercise, _)| exercise)
    }

    /// Rules in priority order, first hit wins:
    /// exact JA (case-insensitive), exact EN, partial JA, partial EN, keyword alias.
    pub fn resolve_with_kind(&self, name: &str) -> Option<(&'a CanonicalExercise, MatchKind)> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let lower = name.to_lowercase();
        let exercises = self.catalog.exercises();

        if let Some(e) = exercises.iter().find(|e| e.name_ja.to_lowercase() == lower) {
            return Some((e, MatchKind::ExactJa));
        }
        if let Some(e) = exercises.iter().find(|e| e.name_en == name) {
            return Some((e, MatchKind::ExactEn));
        }
        if let Some(e) = exercises.iter().find(|e| overlaps(&e.name_ja, &lower)) {
            return Some((e, MatchKind::PartialJa));
        }
        if let Some(e) = exercises.iter().find(|e| overlaps(&e.name_en, &lower)) {
            return Some((e, MatchKind::PartialEn));
        }

        KEYWORD_ALIASES
            .iter()
            .filter(|(keyword, _)| lower.contains(&keyword.to_lowercase()))
            .find_map(|(_, id)| self.catalog.lookup_by_id(id))
            .map(|e| (e, MatchKind::Keyword))
    }
}

/// Case-insensitive containment in either direction
fn overlaps(candidate: &str, lower_input: &str) -> bool {
    let candidate = candidate.to_lowercase();
    !candidate.is_empty() && (candidate.contains(lower_input) || lower_input.contains(&candidate))
}
