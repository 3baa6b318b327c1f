//! Per-team match history
//!
//! Season totals and recent form for a team as of a given point in time.

use std::collections::HashMap;

use crate::features::table::StatLine;
use crate::{MatchRecord, TeamId};

/// One match from a team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub season: u32,
    pub matchday: u32,
    pub stats: StatLine,
}

impl HistoryEntry {
    fn is_before(&self, season: u32, matchday: u32) -> bool {
        (self.season, self.matchday) < (season, matchday)
    }
}

/// Chronological results for every team
#[derive(Debug, Clone, Default)]
pub struct TeamHistory {
    entries: HashMap<TeamId, Vec<HistoryEntry>>,
}

impl TeamHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build history from matches in any order
    pub fn from_matches(matches: &[MatchRecord]) -> Self {
        let mut history = Self::new();
        for record in matches {
            history.add_match(record);
        }
        history
    }

    /// Add a match, keeping each team's entries sorted by (season, matchday)
    pub fn add_match(&mut self, record: &MatchRecord) {
        for team in [record.home_team, record.away_team] {
            if let Some(stats) = StatLine::from_match(record, team) {
                let entry = HistoryEntry {
                    season: record.season,
                    matchday: record.matchday,
                    stats,
                };
                let entries = self.entries.entry(team).or_default();
                let position = entries.partition_point(|e| {
                    (e.season, e.matchday) <= (entry.season, entry.matchday)
                });
                entries.insert(position, entry);
            }
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamId> {
        self.entries.keys()
    }

    /// Matches played strictly before (season, matchday), oldest first
    fn before(&self, team: TeamId, season: u32, matchday: u32) -> &[HistoryEntry] {
        match self.entries.get(&team) {
            Some(entries) => {
                let end = entries.partition_point(|e| e.is_before(season, matchday));
                &entries[..end]
            }
            None => &[],
        }
    }

    /// Number of matches a team played before (season, matchday)
    pub fn match_count(&self, team: TeamId, season: u32, matchday: u32) -> usize {
        self.before(team, season, matchday).len()
    }

    /// Totals for `season` before `matchday`
    ///
    /// Before a team's first match of the season this is the previous
    /// season's final total. `None` if the team has no record in either.
    pub fn season_stats(&self, team: TeamId, season: u32, matchday: u32) -> Option<StatLine> {
        let played = self.before(team, season, matchday);

        let current: Vec<&HistoryEntry> = played.iter().filter(|e| e.season == season).collect();
        let source: Vec<&HistoryEntry> = if !current.is_empty() {
            current
        } else {
            let previous_season = season.checked_sub(1)?;
            played
                .iter()
                .filter(|e| e.season == previous_season)
                .collect()
        };

        if source.is_empty() {
            return None;
        }

        let mut total = StatLine::default();
        for entry in source {
            total.merge(&entry.stats);
        }
        Some(total)
    }

    /// Totals over the last `window` matches before (season, matchday),
    /// crossing season boundaries. `None` with fewer than `window` matches.
    pub fn recent_stats(&self, team: TeamId, season: u32, matchday: u32, window: usize) -> Option<StatLine> {
        let played = self.before(team, season, matchday);
        if window == 0 || played.len() < window {
            return None;
        }

        let mut total = StatLine::default();
        for entry in &played[played.len() - window..] {
            total.merge(&entry.stats);
        }
        Some(total)
    }
}
