//! A single neuron: weighted sum followed by an activation function

use crate::model::activation::Activation;
use crate::model::weights::WeightStore;
use crate::{BetbotError, Result};

/// Output of one neuron for one input vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronOutput {
    /// Weighted input sum before activation
    pub sum: f64,
    /// Activated value passed on to the next layer
    pub value: f64,
}

/// A neuron identified by (layer index, index within layer)
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    pub index: usize,
    pub layer_index: usize,
    pub activation: Activation,
    /// Number of inputs including the bias slot, if any
    pub input_count: usize,
}

impl Neuron {
    pub fn new(index: usize, layer_index: usize, activation: Activation, input_count: usize) -> Self {
        Neuron {
            index,
            layer_index,
            activation,
            input_count,
        }
    }

    /// Weighted sum of the inputs using this neuron's weights
    pub fn weighted_sum(&self, inputs: &[f64], weights: &WeightStore) -> Result<f64> {
        if inputs.len() != self.input_count {
            return Err(BetbotError::Shape {
                context: format!("neuron {} of layer {}", self.index, self.layer_index),
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        let neuron_weights = weights.neuron_weights(self.layer_index, self.index)?;
        if neuron_weights.len() != self.input_count {
            return Err(BetbotError::WeightIndex {
                layer: self.layer_index,
                neuron: self.index,
                input: self.input_count - 1,
            });
        }

        Ok(inputs
            .iter()
            .zip(neuron_weights.iter())
            .map(|(x, w)| x * w)
            .sum())
    }

    /// Compute the activated output together with its pre-activation sum
    pub fn execute(&self, inputs: &[f64], weights: &WeightStore) -> Result<NeuronOutput> {
        let sum = self.weighted_sum(inputs, weights)?;
        Ok(NeuronOutput {
            sum,
            value: self.activation.apply(sum),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute() {
        let weights = WeightStore::from_matrix(vec![vec![vec![0.5, -1.0, 2.0]]]);
        let neuron = Neuron::new(0, 0, Activation::Identity, 3);

        let output = neuron.execute(&[1.0, 2.0, 3.0], &weights).unwrap();
        assert!((output.sum - 4.5).abs() < 1e-12);
        assert!((output.value - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_execute_applies_activation() {
        let weights = WeightStore::from_matrix(vec![vec![vec![1.0, -3.0]]]);
        let neuron = Neuron::new(0, 0, Activation::Relu, 2);

        let output = neuron.execute(&[1.0, 1.0], &weights).unwrap();
        assert!((output.sum + 2.0).abs() < 1e-12);
        assert_eq!(output.value, 0.0);
    }

    #[test]
    fn test_input_length_mismatch() {
        let weights = WeightStore::from_matrix(vec![vec![vec![1.0, 1.0]]]);
        let neuron = Neuron::new(0, 0, Activation::Identity, 2);

        let err = neuron.execute(&[1.0, 2.0, 3.0], &weights).unwrap_err();
        assert!(matches!(
            err,
            BetbotError::Shape {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }
}
