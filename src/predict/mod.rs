//! Prediction and inference
//!
//! Turn a trained network and match history into score predictions.

pub mod inference;
pub mod score;

pub use inference::{Prediction, Predictor};
pub use score::ScorePrediction;
