//! liftlog - Strength training log with recovery tracking
//!
//! Imports workouts from spreadsheets, journals and loose notes, then
//! estimates per-muscle recovery and suggests what to train next.

pub mod db;
pub mod exercises;
pub mod import;
pub mod parser;
pub mod recovery;

pub use db::Database;
