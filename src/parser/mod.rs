//! Workout text parsers
//!
//! Three independent front-ends share one intermediate model:
//! - `tabular` - exported spreadsheets (CSV)
//! - `journal` - Markdown training journals
//! - `loose` - OCR output from screenshots
//!
//! None of them fail: malformed rows and lines are dropped and an
//! unrecognized input yields an empty list.

pub mod journal;
pub mod loose;
pub mod tabular;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Largest set count one row or line may expand into. Anything above is
/// treated as a misread and dropped.
pub const MAX_SETS_PER_LINE: usize = 100;

/// One performed set. Negative weight means assisted (load subtracted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedSet {
    pub weight: f64,
    pub repetitions: u32,
}

impl ParsedSet {
    pub fn new(weight: f64, repetitions: u32) -> Self {
        Self { weight, repetitions }
    }
}

/// Exercise with its raw (unresolved) name and non-empty set list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExercise {
    pub name: String,
    pub sets: Vec<ParsedSet>,
}

/// A day of training as read from an external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkout {
    /// Day granularity; time of day carries no meaning
    pub date: NaiveDateTime,
    pub muscle_group_hint: Option<String>,
    pub exercises: Vec<ParsedExercise>,
}

impl ParsedWorkout {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Supported input shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Tabular,
    Journal,
    LooseText,
}

impl SourceFormat {
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Tabular => "spreadsheet",
            SourceFormat::Journal => "journal",
            SourceFormat::LooseText => "text",
        }
    }
}

/// Parse with an explicitly chosen format
pub fn parse_as(format: SourceFormat, text: &str) -> Vec<ParsedWorkout> {
    match format {
        SourceFormat::Tabular => tabular::parse(text),
        SourceFormat::Journal => journal::parse(text),
        SourceFormat::LooseText => loose::parse(text),
    }
}

/// Pick the first format that understands the input.
///
/// Spreadsheet header first, then journal date headers, and finally the
/// loose text parser which accepts anything.
pub fn parse_auto(text: &str) -> (SourceFormat, Vec<ParsedWorkout>) {
    if tabular::is_recognized(text) {
        return (SourceFormat::Tabular, tabular::parse(text));
    }

    let workouts = journal::parse(text);
    if !workouts.is_empty() {
        return (SourceFormat::Journal, workouts);
    }

    (SourceFormat::LooseText, loose::parse(text))
}
