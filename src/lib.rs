//! Football score prediction using a hand-rolled neural network
//!
//! A multi-layer perceptron with manual backpropagation, trained on features
//! derived from league-table history.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{Activation, LayerConfig, WeightInit};

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Result of a match from the home team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn from_scores(home: u32, away: u32) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::HomeWin => write!(f, "Home win"),
            Outcome::Draw => write!(f, "Draw"),
            Outcome::AwayWin => write!(f, "Away win"),
        }
    }
}

/// A single finished league match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub season: u32,
    pub matchday: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: u32,
    pub away_score: u32,
}

impl MatchRecord {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_scores(self.home_score, self.away_score)
    }

    /// League points awarded to (home, away)
    pub fn points(&self) -> (u32, u32) {
        match self.outcome() {
            Outcome::HomeWin => (3, 0),
            Outcome::Draw => (1, 1),
            Outcome::AwayWin => (0, 3),
        }
    }

    /// Check if a team played in this match
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Points, goals scored and goals conceded for one side
    pub fn result_for(&self, team: TeamId) -> Option<(u32, u32, u32)> {
        let (home_points, away_points) = self.points();
        if team == self.home_team {
            Some((home_points, self.home_score, self.away_score))
        } else if team == self.away_team {
            Some((away_points, self.away_score, self.home_score))
        } else {
            None
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum BetbotError {
    #[error("Shape mismatch in {context}: expected {expected} values, got {actual}")]
    Shape {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Weight index out of range: layer {layer}, neuron {neuron}, input {input}")]
    WeightIndex {
        layer: usize,
        neuron: usize,
        input: usize,
    },

    #[error("Invalid topology: {0}")]
    Topology(String),

    #[error("Weight dump does not fit the network: {0}")]
    WeightDump(String),

    #[error("Training diverged: non-finite weight at layer {layer}, neuron {neuron}")]
    Divergence { layer: usize, neuron: usize },

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Insufficient history for {team}: has {matches} matches, need {required}")]
    InsufficientHistory {
        team: TeamId,
        matches: usize,
        required: usize,
    },

    #[error("No trained model at {0}")]
    NoModel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, BetbotError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Fixed seed for weight init and splitting; random when absent
    pub seed: Option<u64>,
    /// Number of recent matches summarised in the form features
    pub history_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Lower bound of the uniform weight initialisation
    pub init_low: f64,
    /// Upper bound (exclusive) of the uniform weight initialisation
    pub init_high: f64,
    pub layers: Vec<LayerConfig>,
}

impl ModelConfig {
    pub fn weight_init(&self) -> WeightInit {
        WeightInit {
            low: self.init_low,
            high: self.init_high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub matches_path: String,
    pub training_csv: String,
    pub weights_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            training: TrainingConfig {
                epochs: 200,
                learning_rate: 1e-4,
                seed: None,
                history_window: 5,
            },
            model: ModelConfig {
                init_low: 0.0,
                init_high: 1.0,
                layers: vec![
                    LayerConfig::new(features::InputVector::DIM, 16, Activation::Sigmoid, true),
                    LayerConfig::new(16, features::OutputVector::DIM, Activation::Identity, true),
                ],
            },
            data: DataConfig {
                matches_path: "data/matches.json".to_string(),
                training_csv: "data/training.csv".to_string(),
                weights_path: "model/weights.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BetbotError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| BetbotError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BetbotError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the config, or fall back to defaults when the file does not exist
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path);
            Ok(Self::default())
        }
    }
}
