//! liftlog - Strength training log with recovery tracking

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use liftlog::db::Database;
use liftlog::exercises::Catalog;
use liftlog::import::WorkoutImporter;
use liftlog::parser::{self, SourceFormat};
use liftlog::recovery::{MenuPlanner, RecoveryTracker};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author, version, about = "Strength training log with recovery tracking")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "LIFTLOG_DB", default_value = "liftlog.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Tabular,
    Journal,
    Text,
}

impl FormatArg {
    fn source_format(self) -> Option<SourceFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Tabular => Some(SourceFormat::Tabular),
            FormatArg::Journal => Some(SourceFormat::Journal),
            FormatArg::Text => Some(SourceFormat::LooseText),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import workouts from a file
    Import {
        file: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: FormatArg,

        /// Show what would be imported without writing
        #[arg(long)]
        preview: bool,

        /// Import workouts even when a session exists on that day
        #[arg(long)]
        keep_duplicates: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show recovery status per muscle
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Suggest today's training menu
    Menu {
        #[arg(long)]
        json: bool,
    },

    /// List stored sessions
    Sessions {
        /// Number of sessions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;
    let catalog = Catalog::builtin();
    debug!(db = %cli.db, "database opened");

    match cli.command {
        Commands::Import { file, format, preview, keep_duplicates, json } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            let (format, workouts) = match format.source_format() {
                Some(f) => (f, parser::parse_as(f, &text)),
                None => parser::parse_auto(&text),
            };
            info!(format = format.label(), workouts = workouts.len(), "parsed input");

            let importer = WorkoutImporter::new(&catalog);

            if preview {
                let preview = importer.preview(&db, &workouts);
                if json {
                    return print_json(&preview);
                }
                println!("Import preview ({})", format.label());
                println!("{:-<50}", "");
                match (preview.first_date, preview.last_date) {
                    (Some(first), Some(last)) => println!("Period:     {first} .. {last}"),
                    _ => println!("Period:     -"),
                }
                println!("Workouts:   {}", preview.workout_count);
                println!("Exercises:  {}", preview.exercise_count);
                println!(
                    "Sets:       {} ({} matched)",
                    preview.set_count, preview.matched_set_count
                );
                println!("Duplicates: {}", preview.duplicate_count);
                for m in &preview.matched_exercises {
                    println!("  {} -> {}", m.input, m.exercise_id);
                }
                for name in &preview.unmatched_exercise_names {
                    println!("  {name} -> ?");
                }
                return Ok(());
            }

            let result = importer.import(&mut db, &workouts, !keep_duplicates);
            if json {
                return print_json(&result);
            }
            println!(
                "Imported {} session(s), {} set(s) ({})",
                result.sessions_created,
                result.sets_created,
                format.label()
            );
            if result.duplicates_skipped > 0 {
                println!("Skipped {} duplicate day(s)", result.duplicates_skipped);
            }
            if !result.unmatched_exercise_names.is_empty() {
                println!("Unmatched: {}", result.unmatched_exercise_names.join(", "));
            }
            for err in &result.errors {
                eprintln!("{err}");
            }
        }

        Commands::Status { json } => {
            let records = db.get_stimulations()?;
            let tracker = RecoveryTracker::from_records(&records, Local::now().naive_local());
            if json {
                return print_json(&tracker.trained());
            }

            println!("Recovery status");
            println!("{:-<50}", "");
            for r in tracker.trained() {
                println!(
                    "{:16} | {:>3} days | {}",
                    r.muscle.name_ja(),
                    r.days_since,
                    r.status.label()
                );
            }
            for m in tracker.untrained() {
                println!("{:16} | {:>8} | 記録なし", m.name_ja(), "-");
            }
        }

        Commands::Menu { json } => {
            let records = db.get_stimulations()?;
            let tracker = RecoveryTracker::from_records(&records, Local::now().naive_local());
            let menu = MenuPlanner::new(&tracker, &catalog).suggest();
            if json {
                return print_json(&menu);
            }

            println!("Today: {} + {}", menu.primary.name_ja(), menu.secondary.name_ja());
            println!("{:-<40}", "");
            for e in &menu.exercises {
                let mark = if e.neglected_fix { " (放置対策)" } else { "" };
                println!("{:20} {:.2}{}", e.name, e.score, mark);
            }
            if let Some(fix) = &menu.neglected_fix {
                println!();
                println!("{} は {} 日トレーニングしていません", fix.muscle.name_ja(), fix.days_since);
            }
        }

        Commands::Sessions { limit } => {
            let sessions = db.get_sessions(limit)?;
            println!("Recent sessions:");
            println!("{:-<50}", "");
            for s in &sessions {
                println!(
                    "#{:<5} | {} - {} | {} sets",
                    s.id,
                    s.started_at.format("%Y-%m-%d %H:%M"),
                    s.ended_at.format("%H:%M"),
                    s.set_count
                );
            }
        }
    }

    Ok(())
}
