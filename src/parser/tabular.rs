//! Spreadsheet (CSV) export parser
//!
//! Expected shape: `Date,Exercise,Weight (kg),Reps[,Sets]`.
//! Rows are grouped per calendar day and per exercise name.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::{MAX_SETS_PER_LINE, ParsedExercise, ParsedSet, ParsedWorkout};

/// Date formats tried in order, first match wins
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S"];

/// Minimum columns: date, exercise, weight, reps
const MIN_FIELDS: usize = 4;

/// Whether the first non-blank line looks like a known export header
pub fn is_recognized(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(header_matches)
}

fn header_matches(header: &str) -> bool {
    let header = header.to_lowercase();
    header.contains("date")
        && header.contains("exercise")
        && (header.contains("weight") || header.contains("kg"))
        && header.contains("reps")
}

/// Parse a spreadsheet export. Unknown header yields no workouts.
pub fn parse(text: &str) -> Vec<ParsedWorkout> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(header) = lines.next() else {
        return Vec::new();
    };
    if !header_matches(header) {
        debug!(header, "unrecognized spreadsheet header");
        return Vec::new();
    }

    // Exercise order within a day follows first appearance
    let mut days: BTreeMap<NaiveDate, Vec<ParsedExercise>> = BTreeMap::new();

    for line in lines {
        let Some(row) = parse_row(line) else {
            debug!(line, "skipping malformed row");
            continue;
        };

        let exercises = days.entry(row.date).or_default();
        let sets = std::iter::repeat_n(ParsedSet::new(row.weight, row.reps), row.set_count);

        match exercises.iter_mut().find(|e| e.name == row.exercise) {
            Some(existing) => existing.sets.extend(sets),
            None => exercises.push(ParsedExercise {
                name: row.exercise,
                sets: sets.collect(),
            }),
        }
    }

    days.into_iter()
        .filter_map(|(date, exercises)| {
            let exercises: Vec<_> = exercises.into_iter().filter(|e| !e.sets.is_empty()).collect();
            if exercises.is_empty() {
                return None;
            }
            Some(ParsedWorkout {
                date: date.and_time(NaiveTime::MIN),
                muscle_group_hint: None,
                exercises,
            })
        })
        .collect()
}

struct Row {
    date: NaiveDate,
    exercise: String,
    weight: f64,
    reps: u32,
    set_count: usize,
}

fn parse_row(line: &str) -> Option<Row> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let date = parse_date(&fields[0])?;
    let weight = parse_weight(&fields[2])?;
    let reps = fields[3].parse::<u32>().ok()?;
    let set_count = fields
        .get(4)
        .and_then(|f| f.parse::<usize>().ok())
        .unwrap_or(1);
    if set_count > MAX_SETS_PER_LINE {
        debug!(line, set_count, "set count out of range");
        return None;
    }

    Some(Row {
        date,
        exercise: fields[1].clone(),
        weight,
        reps,
        set_count,
    })
}

/// Split on commas, honouring double-quoted fields
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Calendar day of a date cell; time of day is dropped
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Weight with either `.` or `,` as decimal separator
fn parse_weight(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
}
