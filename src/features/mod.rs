//! Feature extraction
//!
//! Converts match results into league tables, team histories and
//! network-ready vectors.

pub mod history;
pub mod table;
pub mod vector;

pub use history::{HistoryEntry, TeamHistory};
pub use table::{calculate_tables, standings, LeagueTable, StatLine, TableEntry};
pub use vector::{generate_training_data, InputVector, OutputVector, DEFAULT_WINDOW};
