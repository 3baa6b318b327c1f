//! Network layers
//!
//! A layer owns its neurons and the bias policy. The connectivity pattern is
//! selected by [`LayerKind`]; fully connected is the only pattern so far.

use serde::{Deserialize, Serialize};

use crate::model::activation::Activation;
use crate::model::neuron::Neuron;
use crate::model::weights::WeightStore;
use crate::{BetbotError, Result};

/// Value fed into the bias slot
pub const BIAS_INPUT: f64 = 1.0;

/// Declarative description of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Inputs excluding the bias slot
    pub inputs: usize,
    /// Number of neurons
    pub outputs: usize,
    pub activation: Activation,
    #[serde(default)]
    pub bias: bool,
    #[serde(default)]
    pub kind: LayerKind,
}

impl LayerConfig {
    pub fn new(inputs: usize, outputs: usize, activation: Activation, bias: bool) -> Self {
        LayerConfig {
            inputs,
            outputs,
            activation,
            bias,
            kind: LayerKind::FullyConnected,
        }
    }
}

/// Connectivity pattern of a layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Every neuron sees the full (bias-augmented) input vector
    #[default]
    FullyConnected,
}

/// Intermediate values of one layer's forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTrace {
    /// Input vector as seen by the neurons, bias slot included
    pub inputs: Vec<f64>,
    /// Pre-activation sums per neuron
    pub sums: Vec<f64>,
    /// Activated outputs per neuron
    pub outputs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub kind: LayerKind,
    /// Inputs per neuron, bias slot included
    pub input_width: usize,
    pub output_width: usize,
    pub activation: Activation,
    pub has_bias: bool,
    pub neurons: Vec<Neuron>,
}

impl Layer {
    /// Build a layer at position `index` in its network
    pub fn new(config: &LayerConfig, index: usize) -> Result<Self> {
        if config.inputs == 0 || config.outputs == 0 {
            return Err(BetbotError::Topology(format!(
                "layer {} must have at least one input and one output (got {} -> {})",
                index, config.inputs, config.outputs
            )));
        }

        let input_width = config.inputs + usize::from(config.bias);
        let neurons = (0..config.outputs)
            .map(|i| Neuron::new(i, index, config.activation, input_width))
            .collect();

        Ok(Layer {
            index,
            kind: config.kind,
            input_width,
            output_width: config.outputs,
            activation: config.activation,
            has_bias: config.bias,
            neurons,
        })
    }

    /// Number of inputs the caller must supply (bias slot excluded)
    pub fn declared_inputs(&self) -> usize {
        self.input_width - self.bias_offset()
    }

    /// Position of the first non-bias input in a neuron's weight vector
    pub fn bias_offset(&self) -> usize {
        usize::from(self.has_bias)
    }

    /// Prepend the bias input when the layer has one
    pub fn augment(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.declared_inputs() {
            return Err(BetbotError::Shape {
                context: format!("layer {}", self.index),
                expected: self.declared_inputs(),
                actual: inputs.len(),
            });
        }

        let mut augmented = Vec::with_capacity(self.input_width);
        if self.has_bias {
            augmented.push(BIAS_INPUT);
        }
        augmented.extend_from_slice(inputs);
        Ok(augmented)
    }

    /// Run the layer and keep the intermediate values needed for training
    pub fn trace(&self, inputs: &[f64], weights: &WeightStore) -> Result<LayerTrace> {
        match self.kind {
            LayerKind::FullyConnected => {
                let inputs = self.augment(inputs)?;
                let mut sums = Vec::with_capacity(self.output_width);
                let mut outputs = Vec::with_capacity(self.output_width);

                for neuron in &self.neurons {
                    let output = neuron.execute(&inputs, weights)?;
                    sums.push(output.sum);
                    outputs.push(output.value);
                }

                Ok(LayerTrace {
                    inputs,
                    sums,
                    outputs,
                })
            }
        }
    }

    /// Compute the layer's outputs in neuron order
    pub fn feed_forward(&self, inputs: &[f64], weights: &WeightStore) -> Result<Vec<f64>> {
        Ok(self.trace(inputs, weights)?.outputs)
    }
}
