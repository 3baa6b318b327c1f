//! Model inference for predictions

use serde::Serialize;

use crate::features::{InputVector, OutputVector, TeamHistory};
use crate::model::Network;
use crate::predict::ScorePrediction;
use crate::{BetbotError, MatchRecord, Result, TeamId};

/// Prediction for one fixture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub season: u32,
    pub matchday: u32,
    /// Raw network output for the home side
    pub home_expected: f64,
    /// Raw network output for the away side
    pub away_expected: f64,
    pub score: ScorePrediction,
}

/// Predictor for making match predictions
pub struct Predictor {
    network: Network,
    history: TeamHistory,
    window: usize,
}

impl Predictor {
    /// Create a new predictor
    ///
    /// The network must read an [`InputVector`] and produce an
    /// [`OutputVector`].
    pub fn new(network: Network, history: TeamHistory, window: usize) -> Result<Self> {
        if network.input_width() != InputVector::DIM {
            return Err(BetbotError::Topology(format!(
                "Predictor needs {} inputs, network takes {}",
                InputVector::DIM,
                network.input_width()
            )));
        }
        if network.output_width() != OutputVector::DIM {
            return Err(BetbotError::Topology(format!(
                "Predictor needs {} outputs, network produces {}",
                OutputVector::DIM,
                network.output_width()
            )));
        }
        Ok(Predictor {
            network,
            history,
            window,
        })
    }

    pub fn from_matches(network: Network, matches: &[MatchRecord], window: usize) -> Result<Self> {
        Self::new(network, TeamHistory::from_matches(matches), window)
    }

    /// Predict `home` vs `away` on the given matchday
    pub fn predict(&self, home: TeamId, away: TeamId, season: u32, matchday: u32) -> Result<Prediction> {
        if home == away {
            return Err(BetbotError::Parse(format!("{} cannot play itself", home)));
        }
        for team in [home, away] {
            if !self.history.teams().any(|t| *t == team) {
                return Err(BetbotError::UnknownTeam(team.to_string()));
            }
        }

        let input = InputVector::build(&self.history, home, away, season, matchday, self.window)?;
        let outputs = self.network.classify(&input.to_vec())?;
        log::debug!("{} vs {}: raw outputs {:?}", home, away, outputs);

        Ok(Prediction {
            home_team: home,
            away_team: away,
            season,
            matchday,
            home_expected: outputs[0],
            away_expected: outputs[1],
            score: ScorePrediction::from_outputs(&outputs),
        })
    }
}
