//! Integer score predictions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Outcome;

/// A final score in whole goals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScorePrediction {
    pub home_goals: u32,
    pub away_goals: u32,
}

impl ScorePrediction {
    pub fn new(home_goals: u32, away_goals: u32) -> Self {
        ScorePrediction {
            home_goals,
            away_goals,
        }
    }

    /// Round raw (home, away) outputs to whole goals, clamping at zero
    ///
    /// Missing or non-finite values count as zero goals.
    pub fn from_outputs(outputs: &[f64]) -> Self {
        let goals = |index: usize| -> u32 {
            match outputs.get(index) {
                Some(v) if v.is_finite() => v.round().max(0.0) as u32,
                _ => 0,
            }
        };
        ScorePrediction::new(goals(0), goals(1))
    }

    pub fn goal_difference(&self) -> i64 {
        self.home_goals as i64 - self.away_goals as i64
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_scores(self.home_goals, self.away_goals)
    }
}

impl fmt::Display for ScorePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home_goals, self.away_goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outputs_rounds() {
        assert_eq!(ScorePrediction::from_outputs(&[2.2, 0.9]), ScorePrediction::new(2, 1));
        assert_eq!(ScorePrediction::from_outputs(&[1.5, 2.49]), ScorePrediction::new(2, 2));
    }

    #[test]
    fn test_from_outputs_clamps() {
        assert_eq!(ScorePrediction::from_outputs(&[-1.7, 0.4]), ScorePrediction::new(0, 0));
        assert_eq!(ScorePrediction::from_outputs(&[f64::NAN]), ScorePrediction::new(0, 0));
    }

    #[test]
    fn test_outcome_and_difference() {
        let score = ScorePrediction::new(1, 3);
        assert_eq!(score.goal_difference(), -2);
        assert_eq!(score.outcome(), Outcome::AwayWin);
        assert_eq!(score.to_string(), "1:3");
    }
}
