//! Exercise catalog and muscle reference data

use serde::{Deserialize, Serialize};

/// Individual muscles tracked by the recovery engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Muscle {
    Chest,      // 大胸筋
    FrontDelts, // 三角筋前部
    SideDelts,  // 三角筋中部
    RearDelts,  // 三角筋後部
    Biceps,     // 上腕二頭筋
    Triceps,    // 上腕三頭筋
    Forearms,   // 前腕
    Lats,       // 広背筋
    Traps,      // 僧帽筋
    Erectors,   // 脊柱起立筋
    Abs,        // 腹直筋
    Obliques,   // 腹斜筋
    Glutes,     // 大臀筋
    Quads,      // 大腿四頭筋
    Hamstrings, // ハムストリングス
    Adductors,  // 内転筋
    Calves,     // 下腿三頭筋
}

impl Muscle {
    /// Stable identifier used in storage
    pub fn id(&self) -> &'static str {
        match self {
            Muscle::Chest => "chest",
            Muscle::FrontDelts => "front_delts",
            Muscle::SideDelts => "side_delts",
            Muscle::RearDelts => "rear_delts",
            Muscle::Biceps => "biceps",
            Muscle::Triceps => "triceps",
            Muscle::Forearms => "forearms",
            Muscle::Lats => "lats",
            Muscle::Traps => "traps",
            Muscle::Erectors => "erectors",
            Muscle::Abs => "abs",
            Muscle::Obliques => "obliques",
            Muscle::Glutes => "glutes",
            Muscle::Quads => "quads",
            Muscle::Hamstrings => "hamstrings",
            Muscle::Adductors => "adductors",
            Muscle::Calves => "calves",
        }
    }

    pub fn from_id(id: &str) -> Option<Muscle> {
        Muscle::all().iter().copied().find(|m| m.id() == id)
    }

    pub fn name_ja(&self) -> &'static str {
        match self {
            Muscle::Chest => "大胸筋",
            Muscle::FrontDelts => "三角筋前部",
            Muscle::SideDelts => "三角筋中部",
            Muscle::RearDelts => "三角筋後部",
            Muscle::Biceps => "上腕二頭筋",
            Muscle::Triceps => "上腕三頭筋",
            Muscle::Forearms => "前腕",
            Muscle::Lats => "広背筋",
            Muscle::Traps => "僧帽筋",
            Muscle::Erectors => "脊柱起立筋",
            Muscle::Abs => "腹直筋",
            Muscle::Obliques => "腹斜筋",
            Muscle::Glutes => "大臀筋",
            Muscle::Quads => "大腿四頭筋",
            Muscle::Hamstrings => "ハムストリングス",
            Muscle::Adductors => "内転筋",
            Muscle::Calves => "下腿三頭筋",
        }
    }

    /// Hours a muscle needs to recover from a baseline (3 set) session.
    /// Large muscles 72h, medium 48h, small 24h.
    pub fn base_recovery_hours(&self) -> f64 {
        match self {
            Muscle::Chest
            | Muscle::Lats
            | Muscle::Erectors
            | Muscle::Glutes
            | Muscle::Quads
            | Muscle::Hamstrings => 72.0,
            Muscle::FrontDelts
            | Muscle::SideDelts
            | Muscle::RearDelts
            | Muscle::Biceps
            | Muscle::Triceps
            | Muscle::Traps
            | Muscle::Adductors => 48.0,
            Muscle::Forearms | Muscle::Abs | Muscle::Obliques | Muscle::Calves => 24.0,
        }
    }

    pub fn group(&self) -> MuscleGroup {
        match self {
            Muscle::Chest => MuscleGroup::Chest,
            Muscle::Lats | Muscle::Traps | Muscle::Erectors => MuscleGroup::Back,
            Muscle::FrontDelts | Muscle::SideDelts | Muscle::RearDelts => MuscleGroup::Shoulders,
            Muscle::Biceps | Muscle::Triceps | Muscle::Forearms => MuscleGroup::Arms,
            Muscle::Glutes
            | Muscle::Quads
            | Muscle::Hamstrings
            | Muscle::Adductors
            | Muscle::Calves => MuscleGroup::Legs,
            Muscle::Abs | Muscle::Obliques => MuscleGroup::Core,
        }
    }

    /// All muscles for iteration
    pub fn all() -> &'static [Muscle] {
        &[
            Muscle::Chest,
            Muscle::FrontDelts,
            Muscle::SideDelts,
            Muscle::RearDelts,
            Muscle::Biceps,
            Muscle::Triceps,
            Muscle::Forearms,
            Muscle::Lats,
            Muscle::Traps,
            Muscle::Erectors,
            Muscle::Abs,
            Muscle::Obliques,
            Muscle::Glutes,
            Muscle::Quads,
            Muscle::Hamstrings,
            Muscle::Adductors,
            Muscle::Calves,
        ]
    }
}

/// Body-part groups used for menu suggestions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
}

impl MuscleGroup {
    pub fn name_ja(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "胸",
            MuscleGroup::Back => "背中",
            MuscleGroup::Shoulders => "肩",
            MuscleGroup::Arms => "腕",
            MuscleGroup::Legs => "脚",
            MuscleGroup::Core => "体幹",
        }
    }

    pub fn muscles(&self) -> Vec<Muscle> {
        Muscle::all()
            .iter()
            .copied()
            .filter(|m| m.group() == *self)
            .collect()
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
            MuscleGroup::Legs,
            MuscleGroup::Core,
        ]
    }
}

/// Catalog-defined exercise with its muscle intensity mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalExercise {
    pub id: String,
    pub name_ja: String,
    pub name_en: String,
    /// Stimulation intensity per muscle, percent (0-100)
    pub muscles: Vec<(Muscle, u8)>,
}

impl CanonicalExercise {
    pub fn new(id: &str, name_ja: &str, name_en: &str, muscles: &[(Muscle, u8)]) -> Self {
        Self {
            id: id.to_string(),
            name_ja: name_ja.to_string(),
            name_en: name_en.to_string(),
            muscles: muscles.to_vec(),
        }
    }

    /// Normalized intensity (0.0-1.0) for a muscle, if the exercise touches it
    pub fn intensity_for(&self, muscle: Muscle) -> Option<f64> {
        self.muscles
            .iter()
            .find(|(m, pct)| *m == muscle && *pct > 0)
            .map(|(_, pct)| f64::from((*pct).min(100)) / 100.0)
    }

    /// Muscle with the highest intensity; first listed wins ties
    pub fn dominant_muscle(&self) -> Option<Muscle> {
        self.muscles
            .iter()
            .fold(None, |best: Option<(Muscle, u8)>, &(m, pct)| match best {
                Some((_, best_pct)) if best_pct >= pct => best,
                _ => Some((m, pct)),
            })
            .map(|(m, _)| m)
    }
}

/// Read-only source of canonical exercises
pub trait ExerciseCatalog {
    fn exercises(&self) -> &[CanonicalExercise];

    fn lookup_by_id(&self, id: &str) -> Option<&CanonicalExercise> {
        self.exercises().iter().find(|e| e.id == id)
    }

    /// Exact match on either display name
    fn lookup_by_name(&self, name: &str) -> Option<&CanonicalExercise> {
        self.exercises()
            .iter()
            .find(|e| e.name_ja == name || e.name_en == name)
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exercises: Vec<CanonicalExercise>,
}

impl Catalog {
    pub fn new(exercises: Vec<CanonicalExercise>) -> Self {
        Self { exercises }
    }

    /// Built-in gym exercise set
    pub fn builtin() -> Self {
        use Muscle::*;

        Self::new(vec![
            // Chest
            CanonicalExercise::new(
                "bench_press",
                "ベンチプレス",
                "Bench Press",
                &[(Chest, 100), (Triceps, 50), (FrontDelts, 40)],
            ),
            CanonicalExercise::new(
                "incline_bench_press",
                "インクラインベンチプレス",
                "Incline Bench Press",
                &[(Chest, 90), (FrontDelts, 60), (Triceps, 40)],
            ),
            CanonicalExercise::new(
                "dumbbell_fly",
                "ダンベルフライ",
                "Dumbbell Fly",
                &[(Chest, 100), (FrontDelts, 30)],
            ),
            CanonicalExercise::new(
                "push_up",
                "腕立て伏せ",
                "Push-up",
                &[(Chest, 80), (Triceps, 50), (FrontDelts, 40), (Abs, 20)],
            ),
            // Back
            CanonicalExercise::new(
                "lat_pulldown",
                "ラットプルダウン",
                "Lat Pulldown",
                &[(Lats, 100), (Biceps, 50), (RearDelts, 30)],
            ),
            CanonicalExercise::new(
                "pull_up",
                "チンニング",
                "Pull-up",
                &[(Lats, 100), (Biceps, 60), (RearDelts, 30), (Forearms, 30)],
            ),
            CanonicalExercise::new(
                "barbell_row",
                "ベントオーバーロウ",
                "Barbell Row",
                &[(Lats, 80), (Traps, 60), (RearDelts, 50), (Biceps, 40), (Erectors, 40)],
            ),
            CanonicalExercise::new(
                "deadlift",
                "デッドリフト",
                "Deadlift",
                &[
                    (Erectors, 100),
                    (Glutes, 80),
                    (Hamstrings, 80),
                    (Traps, 50),
                    (Forearms, 40),
                    (Quads, 40),
                ],
            ),
            // Shoulders
            CanonicalExercise::new(
                "shoulder_press",
                "ショルダープレス",
                "Shoulder Press",
                &[(FrontDelts, 100), (SideDelts, 60), (Triceps, 50)],
            ),
            CanonicalExercise::new(
                "lateral_raise",
                "サイドレイズ",
                "Lateral Raise",
                &[(SideDelts, 100), (Traps, 30)],
            ),
            CanonicalExercise::new(
                "face_pull",
                "フェイスプル",
                "Face Pull",
                &[(RearDelts, 100), (Traps, 50)],
            ),
            // Arms
            CanonicalExercise::new(
                "barbell_curl",
                "バーベルカール",
                "Barbell Curl",
                &[(Biceps, 100), (Forearms, 40)],
            ),
            CanonicalExercise::new(
                "triceps_pushdown",
                "トライセプスプッシュダウン",
                "Triceps Pushdown",
                &[(Triceps, 100)],
            ),
            // Legs
            CanonicalExercise::new(
                "squat",
                "スクワット",
                "Squat",
                &[(Quads, 100), (Glutes, 80), (Adductors, 50), (Hamstrings, 40), (Erectors, 40)],
            ),
            CanonicalExercise::new(
                "leg_press",
                "レッグプレス",
                "Leg Press",
                &[(Quads, 100), (Glutes, 60), (Adductors, 40)],
            ),
            CanonicalExercise::new(
                "leg_curl",
                "レッグカール",
                "Leg Curl",
                &[(Hamstrings, 100), (Calves, 20)],
            ),
            CanonicalExercise::new("calf_raise", "カーフレイズ", "Calf Raise", &[(Calves, 100)]),
            // Core
            CanonicalExercise::new("crunch", "クランチ", "Crunch", &[(Abs, 100), (Obliques, 30)]),
            CanonicalExercise::new(
                "plank",
                "プランク",
                "Plank",
                &[(Abs, 80), (Obliques, 50), (Erectors, 30)],
            ),
        ])
    }
}

impl ExerciseCatalog for Catalog {
    fn exercises(&self) -> &[CanonicalExercise] {
        &self.exercises
    }
}
