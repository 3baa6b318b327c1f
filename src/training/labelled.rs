//! Labelled examples and train/validation/test splitting

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One supervised example: input vector and the expected output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledData {
    pub inputs: Vec<f64>,
    pub outputs: Vec<f64>,
}

impl LabelledData {
    pub fn new(inputs: Vec<f64>, outputs: Vec<f64>) -> Self {
        LabelledData { inputs, outputs }
    }
}

/// Disjoint partitions of a labelled dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSplit {
    pub train: Vec<LabelledData>,
    pub validation: Vec<LabelledData>,
    pub test: Vec<LabelledData>,
}

impl DataSplit {
    /// Below this size nothing is held out
    pub const MIN_HOLDOUT_SIZE: usize = 3;

    /// Shuffle a copy of `data` and cut it 50% / 25% / 25%
    pub fn new<R: Rng + ?Sized>(data: &[LabelledData], rng: &mut R) -> Self {
        let mut samples = data.to_vec();
        samples.shuffle(rng);

        let n = samples.len();
        if n < Self::MIN_HOLDOUT_SIZE {
            return DataSplit {
                train: samples,
                ..Default::default()
            };
        }

        let train_end = n / 2;
        let validation_end = n * 3 / 4;

        let test = samples.split_off(validation_end);
        let validation = samples.split_off(train_end);

        DataSplit {
            train: samples,
            validation,
            test,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Randomly partition labelled data into train, validation and test sets
pub fn split_labelled_data<R: Rng + ?Sized>(data: &[LabelledData], rng: &mut R) -> DataSplit {
    let split = DataSplit::new(data, rng);
    log::info!(
        "Split {} samples: train={}, val={}, test={}",
        data.len(),
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );
    split
}
