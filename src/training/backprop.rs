//! Manual backpropagation and delta-rule weight updates

use crate::model::{ForwardPass, Network};
use crate::{BetbotError, Result};

/// Per-neuron error terms for one example, with the forward pass they came from
#[derive(Debug, Clone, PartialEq)]
pub struct Backprop {
    /// `deltas[layer][neuron]`, in forward layer order
    pub deltas: Vec<Vec<f64>>,
    pub pass: ForwardPass,
}

impl Backprop {
    /// Network output observed before the update
    pub fn output(&self) -> &[f64] {
        self.pass.output()
    }
}

impl Network {
    /// Run a forward pass on `inputs` and propagate the output error back
    /// through the network
    pub fn back_propagate(&self, inputs: &[f64], expected_outputs: &[f64]) -> Result<Backprop> {
        let pass = self.forward(inputs)?;
        let deltas = self.deltas(&pass, expected_outputs)?;
        Ok(Backprop { deltas, pass })
    }

    /// Error terms for an existing forward pass
    ///
    /// The output layer's error is `expected - actual`. A hidden neuron's
    /// error is the sum of the downstream deltas weighted by the downstream
    /// weights that read this neuron's output.
    pub fn deltas(&self, pass: &ForwardPass, expected_outputs: &[f64]) -> Result<Vec<Vec<f64>>> {
        let layers = self.layers();
        if pass.layers.len() != layers.len() {
            return Err(BetbotError::Shape {
                context: "forward pass layers".into(),
                expected: layers.len(),
                actual: pass.layers.len(),
            });
        }
        if expected_outputs.len() != self.output_width() {
            return Err(BetbotError::Shape {
                context: "expected outputs".into(),
                expected: self.output_width(),
                actual: expected_outputs.len(),
            });
        }

        let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); layers.len()];

        for (index, layer) in layers.iter().enumerate().rev() {
            let trace = &pass.layers[index];

            let errors: Vec<f64> = match layers.get(index + 1) {
                None => expected_outputs
                    .iter()
                    .zip(trace.outputs.iter())
                    .map(|(expected, actual)| expected - actual)
                    .collect(),
                Some(next) => {
                    // Skip the downstream bias slot
                    let offset = next.bias_offset();
                    let next_deltas = &deltas[index + 1];
                    (0..layer.output_width)
                        .map(|i| {
                            let mut error = 0.0;
                            for (j, delta) in next_deltas.iter().enumerate() {
                                error += self.weights().get(next.index, j, i + offset)? * delta;
                            }
                            Ok(error)
                        })
                        .collect::<Result<_>>()?
                }
            };

            deltas[index] = errors
                .iter()
                .zip(trace.sums.iter())
                .map(|(error, sum)| error * layer.activation.derivative(*sum))
                .collect();
        }

        Ok(deltas)
    }

    /// Apply `w += learning_rate * delta * input` to every weight
    ///
    /// The inputs of each layer are taken from the forward pass, bias slot
    /// included. All updates are computed first and committed only if every
    /// new weight is finite.
    pub fn adjust_weights(&mut self, backprop: &Backprop, learning_rate: f64) -> Result<()> {
        let mut updates: Vec<(usize, usize, Vec<f64>)> = Vec::new();

        for (layer, trace) in self.layers().iter().zip(backprop.pass.layers.iter()) {
            let layer_deltas = backprop.deltas.get(layer.index).ok_or(BetbotError::Shape {
                context: "deltas".into(),
                expected: self.layers().len(),
                actual: backprop.deltas.len(),
            })?;
            if layer_deltas.len() != layer.output_width {
                return Err(BetbotError::Shape {
                    context: format!("deltas of layer {}", layer.index),
                    expected: layer.output_width,
                    actual: layer_deltas.len(),
                });
            }

            for (neuron, delta) in layer.neurons.iter().zip(layer_deltas.iter()) {
                let current = self.weights().neuron_weights(layer.index, neuron.index)?;
                if current.len() != trace.inputs.len() {
                    return Err(BetbotError::Shape {
                        context: format!("inputs of layer {}", layer.index),
                        expected: current.len(),
                        actual: trace.inputs.len(),
                    });
                }

                let updated: Vec<f64> = current
                    .iter()
                    .zip(trace.inputs.iter())
                    .map(|(weight, input)| weight + learning_rate * delta * input)
                    .collect();

                if updated.iter().any(|w| !w.is_finite()) {
                    return Err(BetbotError::Divergence {
                        layer: layer.index,
                        neuron: neuron.index,
                    });
                }
                updates.push((layer.index, neuron.index, updated));
            }
        }

        let weights = self.weights_mut();
        for (layer, neuron, values) in updates {
            weights.set_neuron_weights(layer, neuron, values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activation, LayerConfig, WeightDump};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 1 input -> 1 hidden (identity, bias) -> 1 output (identity, bias)
    fn chain() -> Network {
        let configs = vec![
            LayerConfig::new(1, 1, Activation::Identity, true),
            LayerConfig::new(1, 1, Activation::Identity, true),
        ];
        let dump = WeightDump {
            weights: vec![vec![vec![0.5, 2.0]], vec![vec![0.1, 3.0]]],
        };
        Network::new(&configs, Some(dump)).unwrap()
    }

    #[test]
    fn test_hand_computed_deltas_with_bias() {
        let network = chain();

        // hidden = 0.5 + 2.0 = 2.5, output = 0.1 + 3.0 * 2.5 = 7.6
        let backprop = network.back_propagate(&[1.0], &[8.0]).unwrap();
        assert!(close(backprop.output()[0], 7.6));

        // Output delta = 8.0 - 7.6
        assert!(close(backprop.deltas[1][0], 0.4));
        // Hidden delta reads the downstream input weight (3.0), not its bias weight (0.1)
        assert!(close(backprop.deltas[0][0], 3.0 * 0.4));
    }

    #[test]
    fn test_hand_computed_update_with_bias() {
        let mut network = chain();
        let backprop = network.back_propagate(&[1.0], &[8.0]).unwrap();
        network.adjust_weights(&backprop, 0.1).unwrap();

        let w = network.weights();
        assert!(close(w.get(0, 0, 0).unwrap(), 0.5 + 0.1 * 1.2 * 1.0));
        assert!(close(w.get(0, 0, 1).unwrap(), 2.0 + 0.1 * 1.2 * 1.0));
        assert!(close(w.get(1, 0, 0).unwrap(), 0.1 + 0.1 * 0.4 * 1.0));
        assert!(close(w.get(1, 0, 1).unwrap(), 3.0 + 0.1 * 0.4 * 2.5));
    }

    #[test]
    fn test_hand_computed_deltas_without_bias() {
        // 2 inputs -> 2 hidden (identity) -> 1 output (sigmoid)
        let configs = vec![
            LayerConfig::new(2, 2, Activation::Identity, false),
            LayerConfig::new(2, 1, Activation::Sigmoid, false),
        ];
        let dump = WeightDump {
            weights: vec![
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![vec![0.5, -0.5]],
            ],
        };
        let network = Network::new(&configs, Some(dump)).unwrap();

        // hidden = [1, 3], sum = 0.5 - 1.5 = -1
        let backprop = network.back_propagate(&[1.0, 3.0], &[1.0]).unwrap();
        let out = 1.0 / (1.0 + 1.0f64.exp());
        let out_delta = (1.0 - out) * out * (1.0 - out);

        assert!(close(backprop.output()[0], out));
        assert!(close(backprop.deltas[1][0], out_delta));
        assert!(close(backprop.deltas[0][0], 0.5 * out_delta));
        assert!(close(backprop.deltas[0][1], -0.5 * out_delta));
    }

    #[test]
    fn test_deltas_follow_layer_order() {
        let configs = vec![
            LayerConfig::new(3, 4, Activation::Sigmoid, true),
            LayerConfig::new(4, 2, Activation::Relu, false),
            LayerConfig::new(2, 1, Activation::Identity, true),
        ];
        let network = Network::new(&configs, None).unwrap();
        let backprop = network.back_propagate(&[0.1, 0.2, 0.3], &[1.0]).unwrap();

        let shape: Vec<usize> = backprop.deltas.iter().map(|d| d.len()).collect();
        assert_eq!(shape, vec![4, 2, 1]);
    }

    #[test]
    fn test_single_step_moves_output_towards_target() {
        let configs = vec![LayerConfig::new(3, 1, Activation::Identity, false)];
        let dump = WeightDump {
            weights: vec![vec![vec![0.2, -0.4, 0.7]]],
        };
        let mut network = Network::new(&configs, Some(dump)).unwrap();
        let inputs = [1.0, 0.5, -2.0];
        let target = 3.0;

        let before = network.classify(&inputs).unwrap()[0];
        let backprop = network.back_propagate(&inputs, &[target]).unwrap();
        network.adjust_weights(&backprop, 0.01).unwrap();
        let after = network.classify(&inputs).unwrap()[0];

        assert!((target - after).abs() < (target - before).abs());
    }

    #[test]
    fn test_expected_output_length_checked() {
        let network = chain();
        assert!(matches!(
            network.back_propagate(&[1.0], &[1.0, 2.0]),
            Err(BetbotError::Shape { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_divergence_leaves_weights_untouched() {
        let mut network = chain();
        let before = network.weights().clone();
        let backprop = network.back_propagate(&[1.0], &[8.0]).unwrap();

        let err = network.adjust_weights(&backprop, f64::MAX).unwrap_err();
        assert!(matches!(err, BetbotError::Divergence { .. }));
        assert_eq!(network.weights(), &before);
    }
}
