//! Model training
//!
//! Backpropagation, the epoch loop, dataset splitting and metrics.

pub mod backprop;
pub mod labelled;
pub mod metrics;
pub mod trainer;

pub use backprop::Backprop;
pub use labelled::{split_labelled_data, DataSplit, LabelledData};
pub use metrics::{total_error, ErrorAccumulator, ScoreMetrics, TrainingHistory};
pub use trainer::{format_error, TrainingRun};
