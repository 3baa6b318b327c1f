//! League tables
//!
//! Cumulative standings after every matchday of a season.

use std::collections::{BTreeMap, HashMap};

use crate::{MatchRecord, TeamId};

/// Points and goals accumulated by one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatLine {
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl StatLine {
    pub fn new(points: u32, goals_for: u32, goals_against: u32) -> Self {
        StatLine {
            points,
            goals_for,
            goals_against,
        }
    }

    /// Stat line of one side of a match, if the team played in it
    pub fn from_match(record: &MatchRecord, team: TeamId) -> Option<Self> {
        record
            .result_for(team)
            .map(|(points, goals_for, goals_against)| StatLine::new(points, goals_for, goals_against))
    }

    pub fn merge(&mut self, other: &StatLine) {
        self.points += other.points;
        self.goals_for += other.goals_for;
        self.goals_against += other.goals_against;
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    pub fn to_features(&self) -> [f64; 3] {
        [
            self.points as f64,
            self.goals_for as f64,
            self.goals_against as f64,
        ]
    }
}

/// A team's standing after a given matchday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub team: TeamId,
    pub matchday: u32,
    pub played: u32,
    pub stats: StatLine,
}

impl TableEntry {
    /// Merge another entry's points and goals into this one
    pub fn merge(&mut self, other: &TableEntry) {
        self.played += other.played;
        self.stats.merge(&other.stats);
    }
}

/// Standings of every team after one matchday
pub type LeagueTable = HashMap<TeamId, TableEntry>;

/// Compute the table after every matchday of one season's matches
///
/// Teams without a match on a matchday keep their previous entry.
pub fn calculate_tables(matches: &[MatchRecord]) -> BTreeMap<u32, LeagueTable> {
    let mut by_matchday: BTreeMap<u32, Vec<&MatchRecord>> = BTreeMap::new();
    for record in matches {
        by_matchday.entry(record.matchday).or_default().push(record);
    }

    let mut tables: BTreeMap<u32, LeagueTable> = BTreeMap::new();
    let mut current = LeagueTable::new();

    for (matchday, day_matches) in by_matchday {
        for entry in current.values_mut() {
            entry.matchday = matchday;
        }

        for record in day_matches {
            for team in [record.home_team, record.away_team] {
                let stats = match StatLine::from_match(record, team) {
                    Some(stats) => stats,
                    None => continue,
                };
                let day_entry = TableEntry {
                    team,
                    matchday,
                    played: 1,
                    stats,
                };
                current
                    .entry(team)
                    .and_modify(|entry| entry.merge(&day_entry))
                    .or_insert(day_entry);
            }
        }

        tables.insert(matchday, current.clone());
    }

    tables
}

/// Table entries ordered by points, then goal difference, then goals scored
pub fn standings(table: &LeagueTable) -> Vec<&TableEntry> {
    let mut entries: Vec<&TableEntry> = table.values().collect();
    entries.sort_by(|a, b| {
        b.stats
            .points
            .cmp(&a.stats.points)
            .then(b.stats.goal_difference().cmp(&a.stats.goal_difference()))
            .then(b.stats.goals_for.cmp(&a.stats.goals_for))
            .then(a.team.cmp(&b.team))
    });
    entries
}
