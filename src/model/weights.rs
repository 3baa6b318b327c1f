//! Trainable weights of a network
//!
//! Stored as a dense `[layer][neuron][input]` table. The bias weight, when a
//! layer has one, sits at input index 0.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::model::layer::Layer;
use crate::{BetbotError, Result};

/// On-disk representation of a weight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDump {
    pub weights: Vec<Vec<Vec<f64>>>,
}

impl WeightDump {
    /// Write the dump as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a dump previously written by [`WeightDump::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightStore {
    weights: Vec<Vec<Vec<f64>>>,
}

impl WeightStore {
    /// Random weights drawn uniformly from `[low, high)` for every layer
    pub fn random<R: Rng + ?Sized>(layers: &[Layer], low: f64, high: f64, rng: &mut R) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(BetbotError::Config(format!(
                "invalid weight init range [{}, {})",
                low, high
            )));
        }

        let weights = layers
            .iter()
            .map(|layer| {
                (0..layer.output_width)
                    .map(|_| (0..layer.input_width).map(|_| rng.gen_range(low..high)).collect())
                    .collect()
            })
            .collect();

        Ok(WeightStore { weights })
    }

    /// Restore weights from a dump, checking it matches the topology exactly
    pub fn from_dump(dump: WeightDump, layers: &[Layer]) -> Result<Self> {
        if dump.weights.len() != layers.len() {
            return Err(BetbotError::WeightDump(format!(
                "dump has {} layers, network has {}",
                dump.weights.len(),
                layers.len()
            )));
        }

        for (layer, layer_weights) in layers.iter().zip(dump.weights.iter()) {
            if layer_weights.len() != layer.output_width {
                return Err(BetbotError::WeightDump(format!(
                    "layer {} has {} neurons in dump, expected {}",
                    layer.index,
                    layer_weights.len(),
                    layer.output_width
                )));
            }
            for (neuron, neuron_weights) in layer_weights.iter().enumerate() {
                if neuron_weights.len() != layer.input_width {
                    return Err(BetbotError::WeightDump(format!(
                        "layer {} neuron {} has {} weights in dump, expected {}",
                        layer.index,
                        neuron,
                        neuron_weights.len(),
                        layer.input_width
                    )));
                }
                if neuron_weights.iter().any(|w| !w.is_finite()) {
                    return Err(BetbotError::WeightDump(format!(
                        "layer {} neuron {} contains non-finite weights",
                        layer.index, neuron
                    )));
                }
            }
        }

        Ok(WeightStore {
            weights: dump.weights,
        })
    }

    /// Wrap a raw table without checking it against any topology
    pub(crate) fn from_matrix(weights: Vec<Vec<Vec<f64>>>) -> Self {
        WeightStore { weights }
    }

    pub fn to_dump(&self) -> WeightDump {
        WeightDump {
            weights: self.weights.clone(),
        }
    }

    pub fn get(&self, layer: usize, neuron: usize, input: usize) -> Result<f64> {
        self.weights
            .get(layer)
            .and_then(|l| l.get(neuron))
            .and_then(|n| n.get(input))
            .copied()
            .ok_or(BetbotError::WeightIndex {
                layer,
                neuron,
                input,
            })
    }

    pub fn set(&mut self, layer: usize, neuron: usize, input: usize, value: f64) -> Result<()> {
        let slot = self
            .weights
            .get_mut(layer)
            .and_then(|l| l.get_mut(neuron))
            .and_then(|n| n.get_mut(input))
            .ok_or(BetbotError::WeightIndex {
                layer,
                neuron,
                input,
            })?;
        *slot = value;
        Ok(())
    }

    /// All input weights of one neuron, in input order
    pub fn neuron_weights(&self, layer: usize, neuron: usize) -> Result<&[f64]> {
        self.weights
            .get(layer)
            .and_then(|l| l.get(neuron))
            .map(|n| n.as_slice())
            .ok_or(BetbotError::WeightIndex {
                layer,
                neuron,
                input: 0,
            })
    }

    /// Replace one neuron's weight vector; the length must not change
    pub fn set_neuron_weights(&mut self, layer: usize, neuron: usize, values: Vec<f64>) -> Result<()> {
        let slot = self
            .weights
            .get_mut(layer)
            .and_then(|l| l.get_mut(neuron))
            .ok_or(BetbotError::WeightIndex {
                layer,
                neuron,
                input: 0,
            })?;
        if slot.len() != values.len() {
            return Err(BetbotError::Shape {
                context: format!("weights of layer {} neuron {}", layer, neuron),
                expected: slot.len(),
                actual: values.len(),
            });
        }
        *slot = values;
        Ok(())
    }

    /// Total number of trainable parameters
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().flatten().map(|n| n.len()).sum()
    }
}
