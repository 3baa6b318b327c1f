//! Network input and output vectors for a match

use crate::features::history::TeamHistory;
use crate::features::table::StatLine;
use crate::training::LabelledData;
use crate::{BetbotError, MatchRecord, Result, TeamId};

/// Default number of recent matches in the form features
pub const DEFAULT_WINDOW: usize = 5;

/// Table-history features of both teams before a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputVector {
    pub home_total: StatLine,
    pub home_recent: StatLine,
    pub away_total: StatLine,
    pub away_recent: StatLine,
}

impl InputVector {
    /// Dimension of the feature vector
    pub const DIM: usize = 12;

    /// Features for `home` vs `away` as of (season, matchday)
    pub fn build(
        history: &TeamHistory,
        home: TeamId,
        away: TeamId,
        season: u32,
        matchday: u32,
        window: usize,
    ) -> Result<Self> {
        let side = |team: TeamId| -> Result<(StatLine, StatLine)> {
            let total = history.season_stats(team, season, matchday);
            let recent = history.recent_stats(team, season, matchday, window);
            match (total, recent) {
                (Some(total), Some(recent)) => Ok((total, recent)),
                _ => Err(BetbotError::InsufficientHistory {
                    team,
                    matches: history.match_count(team, season, matchday),
                    required: window,
                }),
            }
        };

        let (home_total, home_recent) = side(home)?;
        let (away_total, away_recent) = side(away)?;

        Ok(InputVector {
            home_total,
            home_recent,
            away_total,
            away_recent,
        })
    }

    pub fn to_vec(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(Self::DIM);
        for stats in [
            &self.home_total,
            &self.home_recent,
            &self.away_total,
            &self.away_recent,
        ] {
            values.extend_from_slice(&stats.to_features());
        }
        values
    }
}

/// Expected network output: the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputVector {
    pub home_score: u32,
    pub away_score: u32,
}

impl OutputVector {
    pub const DIM: usize = 2;

    pub fn from_match(record: &MatchRecord) -> Self {
        OutputVector {
            home_score: record.home_score,
            away_score: record.away_score,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.home_score as f64, self.away_score as f64]
    }
}

/// Labelled examples for every match whose teams both have enough history
///
/// Only matches before each example feed its features, so the full match
/// list can be passed in any order.
pub fn generate_training_data(matches: &[MatchRecord], window: usize) -> Vec<LabelledData> {
    let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
    ordered.sort_by_key(|m| (m.season, m.matchday));

    let history = TeamHistory::from_matches(matches);
    let mut examples = Vec::new();
    let mut skipped = 0usize;

    for record in ordered {
        match InputVector::build(
            &history,
            record.home_team,
            record.away_team,
            record.season,
            record.matchday,
            window,
        ) {
            Ok(input) => examples.push(LabelledData::new(
                input.to_vec(),
                OutputVector::from_match(record).to_vec(),
            )),
            Err(_) => skipped += 1,
        }
    }

    log::debug!(
        "Generated {} training examples, skipped {} matches with insufficient history",
        examples.len(),
        skipped
    );
    examples
}
