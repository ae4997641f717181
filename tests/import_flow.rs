use chrono::NaiveDate;
use liftlog::db::{Database, WorkoutStore};
use liftlog::exercises::{Catalog, Muscle, MuscleGroup};
use liftlog::import::WorkoutImporter;
use liftlog::parser::{self, SourceFormat};
use liftlog::recovery::{MenuPlanner, RecoveryTracker};

const JOURNAL: &str = "\
### 2024/3/1（胸）
- ベンチプレス: 60kg×10回, 60kg×8回
- Mystery Move: 10kg×10回

### 2024/3/3（脚）
- スクワット: 80kg×5回, 80kg×5回, 80kg×5回
";

#[test]
fn test_journal_import_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftlog.db");
    let path = path.to_str().unwrap();
    let catalog = Catalog::builtin();

    let (format, workouts) = parser::parse_auto(JOURNAL);
    assert_eq!(format, SourceFormat::Journal);
    assert_eq!(workouts.len(), 2);

    {
        let mut db = Database::open(path).unwrap();
        let result = WorkoutImporter::new(&catalog).import(&mut db, &workouts, true);
        assert_eq!(result.sessions_created, 2);
        assert_eq!(result.sets_created, 5);
        assert_eq!(result.unmatched_exercise_names, vec!["Mystery Move".to_string()]);
        assert!(result.errors.is_empty());
    }

    let mut db = Database::open(path).unwrap();
    assert!(db.exists_session_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap());
    assert!(!db.exists_session_on(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()).unwrap());
    assert_eq!(db.get_sessions(10).unwrap().len(), 2);

    // Same file again: every day is taken
    let again = WorkoutImporter::new(&catalog).import(&mut db, &workouts, true);
    assert_eq!(again.sessions_created, 0);
    assert_eq!(again.duplicates_skipped, 2);
    assert_eq!(db.get_sessions(10).unwrap().len(), 2);
}

#[test]
fn test_imported_history_drives_menu() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftlog.db");
    let mut db = Database::open(path.to_str().unwrap()).unwrap();
    let catalog = Catalog::builtin();

    let workouts = parser::parse_as(SourceFormat::Journal, JOURNAL);
    WorkoutImporter::new(&catalog).import(&mut db, &workouts, true);

    let now = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let tracker = RecoveryTracker::from_records(&db.get_stimulations().unwrap(), now);

    let quads = tracker.get(Muscle::Quads).unwrap();
    assert_eq!(quads.days_since, 1);
    assert_eq!(quads.total_sets, 3);
    assert!(quads.progress < 1.0);

    let chest = tracker.get(Muscle::Chest).unwrap();
    assert_eq!(chest.days_since, 3);
    assert!((chest.progress - 1.0).abs() < 1e-9);

    // Core was never touched, so it outranks everything
    let menu = MenuPlanner::new(&tracker, &catalog).suggest();
    assert_eq!(menu.primary, MuscleGroup::Core);
    assert_eq!(menu.secondary, MuscleGroup::Legs);
}

#[test]
fn test_far_future_spreadsheet_row_is_reported() {
    let mut db = Database::open_in_memory().unwrap();
    let catalog = Catalog::builtin();

    let workouts = parser::parse_as(
        SourceFormat::Tabular,
        "Date,Exercise,Weight,Reps,Sets\n+262142-12-31,Squat,100,5,3",
    );
    assert_eq!(workouts.len(), 1);

    let result = WorkoutImporter::new(&catalog).import(&mut db, &workouts, true);
    assert_eq!(result.sessions_created, 0);
    assert_eq!(result.errors.len(), 1);
}
