//! Match history files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{BetbotError, MatchRecord, Result};

/// Load matches from a JSON array of match records
pub fn load_matches<P: AsRef<Path>>(path: P) -> Result<Vec<MatchRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        BetbotError::Parse(format!("Failed to open match file {}: {}", path.display(), e))
    })?;
    let matches: Vec<MatchRecord> = serde_json::from_reader(BufReader::new(file))?;

    for record in &matches {
        if record.home_team == record.away_team {
            return Err(BetbotError::Parse(format!(
                "Season {} matchday {}: {} cannot play itself",
                record.season, record.matchday, record.home_team
            )));
        }
    }

    log::info!("Loaded {} matches from {}", matches.len(), path.display());
    Ok(matches)
}

/// Seasons present in `matches`, ascending
pub fn seasons(matches: &[MatchRecord]) -> Vec<u32> {
    let mut seasons: Vec<u32> = matches.iter().map(|m| m.season).collect();
    seasons.sort_unstable();
    seasons.dedup();
    seasons
}

/// Matches of a single season
pub fn season_matches(matches: &[MatchRecord], season: u32) -> Vec<MatchRecord> {
    matches.iter().filter(|m| m.season == season).cloned().collect()
}
