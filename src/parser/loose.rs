//! Loose text parser for OCR output
//!
//! Screenshots of training apps come back as unstructured lines such as
//! `ベンチプレス 60kg×10回 3セット` or `Squat 225lbs x 5`. Each line is
//! scanned for weight, reps, set count and date with independent
//! extractors; whatever is left after stripping those is the exercise name.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::{MAX_SETS_PER_LINE, ParsedExercise, ParsedSet, ParsedWorkout};

pub const KG_PER_LB: f64 = 0.453592;

/// Name used when a line carries sets but no readable exercise name
pub const UNKNOWN_EXERCISE: &str = "unknown exercise";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(\d{4})[/\-年])?(\d{1,2})[/\-月](\d{1,2})日?").expect("valid date regex")
});
static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(kg|KG|キロ|lbs|LBS|lb|LB|ポンド)").expect("valid weight regex")
});
static REPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:reps|REPS|rep|REP|回)").expect("valid reps regex")
});
static REPS_ALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[×xX]\s*(\d+)").expect("valid reps alt regex"));
static SET_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:sets|SETS|set|SET|セット)").expect("valid set count regex")
});
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));
/// Set word whose count was already consumed by `×N`, as in `×10回 3セット`
static SET_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:sets|SETS|set|SET)\b|セット").expect("valid set word regex")
});

/// Sets recovered from one line plus how much of it was understood
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetInfo {
    pub sets: Vec<ParsedSet>,
    /// 0.4 weight + 0.4 reps + 0.2 explicit multi-set; informational only
    pub confidence: f64,
}

/// Date with an optional year; missing year falls back to the current one
pub fn extract_date(line: &str) -> Option<NaiveDate> {
    extract_date_in_year(line, Local::now().year())
}

pub fn extract_date_in_year(line: &str, default_year: i32) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(line)?;
    let year = match caps.get(1) {
        Some(y) => y.as_str().parse::<i32>().ok()?,
        None => default_year,
    };
    let month = caps[2].parse::<u32>().ok()?;
    let day = caps[3].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Weight in kg; pound values are converted
pub fn extract_weight(line: &str) -> Option<f64> {
    let caps = WEIGHT_RE.captures(line)?;
    let value = caps[1].parse::<f64>().ok()?;
    match &caps[2] {
        "lb" | "LB" | "lbs" | "LBS" | "ポンド" => Some(value * KG_PER_LB),
        _ => Some(value),
    }
}

/// `10回` / `10 reps`, falling back to `×10` notation
pub fn extract_reps(line: &str) -> Option<u32> {
    REPS_RE
        .captures(line)
        .or_else(|| REPS_ALT_RE.captures(line))
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

pub fn extract_set_count(line: &str) -> Option<u32> {
    SET_COUNT_RE
        .captures(line)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// Whatever remains after removing numbers, units and separators
pub fn extract_exercise_name(line: &str) -> Option<String> {
    let mut name = WEIGHT_RE.replace_all(line, " ").into_owned();
    for re in [&*REPS_RE, &*REPS_ALT_RE, &*SET_COUNT_RE, &*DIGITS_RE, &*SET_WORD_RE] {
        name = re.replace_all(&name, " ").into_owned();
    }

    let name: String = name
        .chars()
        .filter_map(|c| match c {
            '-' => Some(' '),
            ':' | '：' | '・' | '×' | '✕' | ',' | '、' | '.' | '。' => None,
            other => Some(other),
        })
        .collect();

    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() { None } else { Some(name) }
}

/// Sets described by a line, if it has a weight or a rep count
pub fn extract_set_info(line: &str) -> Option<SetInfo> {
    let weight = extract_weight(line);
    let reps = extract_reps(line);
    if weight.is_none() && reps.is_none() {
        return None;
    }

    let set_count = extract_set_count(line).unwrap_or(1);
    if set_count == 0 {
        return None;
    }
    if set_count as usize > MAX_SETS_PER_LINE {
        debug!(line, set_count, "set count out of range");
        return None;
    }

    let mut confidence = 0.0;
    if weight.is_some() {
        confidence += 0.4;
    }
    if reps.is_some() {
        confidence += 0.4;
    }
    if set_count > 1 {
        confidence += 0.2;
    }

    let set = ParsedSet::new(weight.unwrap_or(0.0), reps.unwrap_or(0));
    Some(SetInfo {
        sets: vec![set; set_count as usize],
        confidence: f64::min(confidence, 1.0),
    })
}

/// Line-by-line accumulator
struct LooseState {
    current_date: NaiveDateTime,
    seen_date: bool,
    default_year: i32,
    exercises: Vec<ParsedExercise>,
    finished: Vec<ParsedWorkout>,
}

impl LooseState {
    fn new(now: NaiveDateTime) -> Self {
        Self {
            current_date: now,
            seen_date: false,
            default_year: now.year(),
            exercises: Vec::new(),
            finished: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if self.exercises.is_empty() {
            return;
        }
        self.finished.push(ParsedWorkout {
            date: self.current_date,
            muscle_group_hint: None,
            exercises: std::mem::take(&mut self.exercises),
        });
    }

    fn feed(mut self, line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return self;
        }

        if let Some(date) = extract_date_in_year(line, self.default_year) {
            // Lines read before the first date ride along into that date
            if self.seen_date {
                self.flush();
            }
            self.current_date = date.and_time(NaiveTime::MIN);
            self.seen_date = true;
            return self;
        }

        let Some(info) = extract_set_info(line) else {
            return self;
        };
        let name = extract_exercise_name(line).unwrap_or_else(|| UNKNOWN_EXERCISE.to_string());
        debug!(
            name = %name,
            sets = info.sets.len(),
            confidence = info.confidence,
            "recognized line"
        );

        match self.exercises.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.sets.extend(info.sets),
            None => self.exercises.push(ParsedExercise {
                name,
                sets: info.sets,
            }),
        }

        self
    }

    fn finish(mut self) -> Vec<ParsedWorkout> {
        self.flush();
        let mut workouts = self.finished;
        workouts.sort_by_key(|w| w.date);
        workouts
    }
}

/// Parser bound to a reference time, used for undated text and missing years
#[derive(Debug, Clone, Copy)]
pub struct LooseTextParser {
    now: NaiveDateTime,
}

impl LooseTextParser {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn parse(&self, text: &str) -> Vec<ParsedWorkout> {
        text.lines()
            .fold(LooseState::new(self.now), LooseState::feed)
            .finish()
    }
}

impl Default for LooseTextParser {
    fn default() -> Self {
        Self::new(Local::now().naive_local())
    }
}

/// Parse OCR text against the local clock. Output is sorted by date.
pub fn parse(text: &str) -> Vec<ParsedWorkout> {
    LooseTextParser::default().parse(text)
}
