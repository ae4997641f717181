//! Markdown training journal parser
//!
//! ```text
//! ### 2026/1/18（背中）
//! - ラットプルダウン: 68kg×21回, 75kg×8回
//! - 懸垂: -20kg×10回
//! ```

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

use super::{ParsedExercise, ParsedSet, ParsedWorkout};

static DATE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#+\s*(\d{4})/(\d{1,2})/(\d{1,2})\s*(?:[（(]([^）)]*)[）)])?")
        .expect("valid journal date header regex")
});
static EXERCISE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*・]\s*(.+?)\s*[:：]\s*(.*)$").expect("valid journal exercise regex")
});
static SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*(?i:kg)\s*[×xX]\s*(\d+)\s*(?:回)?")
        .expect("valid journal set regex")
});

/// Workout being accumulated between date headers
#[derive(Default)]
struct JournalState {
    current: Option<ParsedWorkout>,
    finished: Vec<ParsedWorkout>,
}

impl JournalState {
    fn flush(&mut self) {
        if let Some(workout) = self.current.take() {
            if !workout.exercises.is_empty() {
                self.finished.push(workout);
            }
        }
    }

    fn feed(mut self, line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return self;
        }

        if let Some(caps) = DATE_HEADER_RE.captures(line) {
            self.flush();
            let date = caps[1]
                .parse::<i32>()
                .ok()
                .zip(caps[2].parse::<u32>().ok())
                .zip(caps[3].parse::<u32>().ok())
                .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d));

            // An impossible date closes the previous day without opening a new one
            match date {
                Some(date) => {
                    let hint = caps
                        .get(4)
                        .map(|g| g.as_str().trim().to_string())
                        .filter(|s| !s.is_empty());
                    self.current = Some(ParsedWorkout {
                        date: journal_datetime(date),
                        muscle_group_hint: hint,
                        exercises: Vec::new(),
                    });
                }
                None => debug!(line, "invalid date in journal header"),
            }
            return self;
        }

        if let Some(caps) = EXERCISE_LINE_RE.captures(line) {
            let Some(workout) = self.current.as_mut() else {
                debug!(line, "exercise line outside of a dated section");
                return self;
            };
            let sets = extract_sets(&caps[2]);
            if sets.is_empty() {
                debug!(line, "exercise line without sets");
                return self;
            }
            workout.exercises.push(ParsedExercise {
                name: caps[1].to_string(),
                sets,
            });
        }

        self
    }

    fn finish(mut self) -> Vec<ParsedWorkout> {
        self.flush();
        self.finished
    }
}

/// All `<weight>kg×<reps>回` expressions, in order
fn extract_sets(rest: &str) -> Vec<ParsedSet> {
    SET_RE
        .captures_iter(rest)
        .filter_map(|caps| {
            let weight = caps[1].parse::<f64>().ok()?;
            let reps = caps[2].parse::<u32>().ok()?;
            Some(ParsedSet::new(weight, reps))
        })
        .collect()
}

/// Parse a journal. Workouts are returned in the order they appear.
pub fn parse(text: &str) -> Vec<ParsedWorkout> {
    text.lines()
        .fold(JournalState::default(), JournalState::feed)
        .finish()
}

/// Write workouts back in journal form
pub fn to_journal(workouts: &[ParsedWorkout]) -> String {
    let mut out = String::new();

    for (i, workout) in workouts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let date = workout.date.date();
        let _ = write!(out, "### {}", date.format("%Y/%-m/%-d"));
        if let Some(hint) = &workout.muscle_group_hint {
            let _ = write!(out, "（{}）", hint);
        }
        out.push('\n');

        for exercise in &workout.exercises {
            let sets: Vec<String> = exercise
                .sets
                .iter()
                .map(|s| format!("{}kg×{}回", s.weight, s.repetitions))
                .collect();
            let _ = writeln!(out, "- {}: {}", exercise.name, sets.join(", "));
        }
    }

    out
}

/// Journal days are anchored at noon so no timezone shift changes the day
pub fn journal_datetime(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        journal_datetime(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_header_with_group_label() {
        let workouts = parse("### 2026/1/18（背中）\n- ラットプルダウン: 68kg×21回, 75kg×8回");

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].date, noon(2026, 1, 18));
        assert_eq!(workouts[0].muscle_group_hint.as_deref(), Some("背中"));
        assert_eq!(
            workouts[0].exercises,
            vec![ParsedExercise {
                name: "ラットプルダウン".to_string(),
                sets: vec![ParsedSet::new(68.0, 21), ParsedSet::new(75.0, 8)],
            }]
        );
    }

    #[test]
    fn test_multiple_days_keep_insertion_order() {
        let text = "### 2026/2/3 (legs)\n\
                    - Squat: 100kg x 5, 110kg X 3\n\
                    \n\
                    ### 2026/1/30\n\
                    * Bench: 60.5kg×10";
        let workouts = parse(text);

        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].date, noon(2026, 2, 3));
        assert_eq!(workouts[0].muscle_group_hint.as_deref(), Some("legs"));
        assert_eq!(workouts[0].exercises[0].sets[1], ParsedSet::new(110.0, 3));
        assert_eq!(workouts[1].date, noon(2026, 1, 30));
        assert_eq!(workouts[1].muscle_group_hint, None);
        assert_eq!(workouts[1].exercises[0].sets, vec![ParsedSet::new(60.5, 10)]);
    }

    #[test]
    fn test_negative_weight_preserved() {
        let workouts = parse("## 2026/1/18\n- 懸垂: -20kg×10回, -15kg×8回");
        let sets = &workouts[0].exercises[0].sets;
        assert_eq!(sets[0].weight, -20.0);
        assert_eq!(sets[1].weight, -15.0);
    }

    #[test]
    fn test_lines_without_sets_are_ignored() {
        let text = "### 2026/1/18\n\
                    - メモ: 調子良かった\n\
                    - ベンチプレス: 60kg×10回\n\
                    random prose line";
        let workouts = parse(text);
        assert_eq!(workouts[0].exercises.len(), 1);
        assert_eq!(workouts[0].exercises[0].name, "ベンチプレス");
    }

    #[test]
    fn test_empty_day_is_dropped() {
        let text = "### 2026/1/17\n\
                    rest day\n\
                    ### 2026/1/18\n\
                    - Squat: 100kg×5回";
        let workouts = parse(text);
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].date, noon(2026, 1, 18));
    }

    #[test]
    fn test_exercise_before_first_header_is_dropped() {
        let workouts = parse("- Squat: 100kg×5回\n### 2026/1/18\n- Bench: 60kg×5回");
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].exercises[0].name, "Bench");
    }

    #[test]
    fn test_invalid_date_closes_section() {
        let text = "### 2026/1/18\n\
                    - Squat: 100kg×5回\n\
                    ### 2026/13/40\n\
                    - Bench: 60kg×5回";
        let workouts = parse(text);
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].exercises.len(), 1);
    }

    #[test]
    fn test_no_headers_yields_nothing() {
        assert!(parse("just some notes\nnothing here").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_roundtrip_through_journal_text() {
        let workouts = vec![
            ParsedWorkout {
                date: noon(2026, 1, 18),
                muscle_group_hint: Some("背中".to_string()),
                exercises: vec![
                    ParsedExercise {
                        name: "ラットプルダウン".to_string(),
                        sets: vec![ParsedSet::new(68.0, 21), ParsedSet::new(75.0, 8)],
                    },
                    ParsedExercise {
                        name: "懸垂".to_string(),
                        sets: vec![ParsedSet::new(-17.5, 6)],
                    },
                ],
            },
            ParsedWorkout {
                date: noon(2026, 11, 2),
                muscle_group_hint: None,
                exercises: vec![ParsedExercise {
                    name: "Bench Press".to_string(),
                    sets: vec![ParsedSet::new(62.25, 5)],
                }],
            },
        ];

        let text = to_journal(&workouts);
        assert!(text.starts_with("### 2026/1/18（背中）\n"));
        assert_eq!(parse(&text), workouts);
    }
}
