//! Data ingestion and storage
//!
//! Match history in JSON and labelled training examples in CSV.

pub mod csv;
pub mod matches;

pub use self::csv::{load_training_csv, write_training_csv};
pub use matches::{load_matches, season_matches, seasons};
