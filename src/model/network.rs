//! Feed-forward network: ordered layers plus the weight table they read from
//!
//! Training lives in [`crate::training`]; this module covers construction,
//! the forward pass and weight persistence.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::layer::{Layer, LayerConfig, LayerTrace};
use crate::model::weights::{WeightDump, WeightStore};
use crate::{BetbotError, Result};

/// Range for uniform random weight initialisation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightInit {
    pub low: f64,
    pub high: f64,
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit {
            low: 0.0,
            high: 1.0,
        }
    }
}

/// Every layer's intermediate values for one input vector
///
/// Produced by [`Network::forward`] and consumed by backpropagation, so the
/// outputs used for the gradient always belong to the same input.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub layers: Vec<LayerTrace>,
}

impl ForwardPass {
    /// Output of the final layer
    pub fn output(&self) -> &[f64] {
        self.layers
            .last()
            .map(|trace| trace.outputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn into_output(mut self) -> Vec<f64> {
        self.layers
            .pop()
            .map(|trace| trace.outputs)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    weights: WeightStore,
    init: WeightInit,
}

impl Network {
    /// Build a network from layer configs, restoring `initial` weights when given
    /// and drawing random ones otherwise
    pub fn new(configs: &[LayerConfig], initial: Option<WeightDump>) -> Result<Self> {
        match initial {
            Some(dump) => {
                let layers = build_layers(configs)?;
                let weights = WeightStore::from_dump(dump, &layers)?;
                Ok(Network {
                    layers,
                    weights,
                    init: WeightInit::default(),
                })
            }
            None => Self::random(configs, WeightInit::default(), &mut rand::thread_rng()),
        }
    }

    /// Build a network with random weights from the given generator
    pub fn random<R: Rng + ?Sized>(configs: &[LayerConfig], init: WeightInit, rng: &mut R) -> Result<Self> {
        let layers = build_layers(configs)?;
        let weights = WeightStore::random(&layers, init.low, init.high, rng)?;
        Ok(Network {
            layers,
            weights,
            init,
        })
    }

    /// Resume from a weights file, or start from random weights if it does not exist
    pub fn load_or_random<R: Rng + ?Sized, P: AsRef<Path>>(
        configs: &[LayerConfig],
        init: WeightInit,
        path: P,
        rng: &mut R,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "No weights at {}, initialising randomly in [{}, {})",
                path.display(),
                init.low,
                init.high
            );
            return Self::random(configs, init, rng);
        }

        let layers = build_layers(configs)?;
        let weights = WeightStore::from_dump(WeightDump::load(path)?, &layers)?;
        log::info!("Loaded weights from {}", path.display());
        Ok(Network {
            layers,
            weights,
            init,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut WeightStore {
        &mut self.weights
    }

    /// Number of values `classify` expects
    pub fn input_width(&self) -> usize {
        self.layers.first().map(|l| l.declared_inputs()).unwrap_or(0)
    }

    /// Number of values `classify` returns
    pub fn output_width(&self) -> usize {
        self.layers.last().map(|l| l.output_width).unwrap_or(0)
    }

    /// Feed the input through every layer, keeping each layer's trace
    pub fn forward(&self, inputs: &[f64]) -> Result<ForwardPass> {
        let mut traces: Vec<LayerTrace> = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let layer_inputs = match traces.last() {
                Some(previous) => previous.outputs.as_slice(),
                None => inputs,
            };
            let trace = layer.trace(layer_inputs, &self.weights)?;
            traces.push(trace);
        }

        Ok(ForwardPass { layers: traces })
    }

    /// Network output for one input vector
    pub fn classify(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward(inputs)?.into_output())
    }

    /// Write the current weights to `path`
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.weights.to_dump().save(path)?;
        log::info!("Saved {} weights to {}", self.weights.parameter_count(), path.display());
        Ok(())
    }

    /// Replace the weights with the contents of `path`
    ///
    /// A missing file re-initialises the weights randomly. A file that exists
    /// but does not fit this topology is an error and leaves the weights as
    /// they were.
    pub fn load_weights<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.load_weights_with_rng(path, &mut rand::thread_rng())
    }

    /// [`Network::load_weights`] drawing any fallback weights from `rng`
    pub fn load_weights_with_rng<R: Rng + ?Sized, P: AsRef<Path>>(&mut self, path: P, rng: &mut R) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "No weights at {}, initialising randomly in [{}, {})",
                path.display(),
                self.init.low,
                self.init.high
            );
            self.weights = WeightStore::random(&self.layers, self.init.low, self.init.high, rng)?;
            return Ok(());
        }

        let dump = WeightDump::load(path)?;
        self.weights = WeightStore::from_dump(dump, &self.layers)?;
        log::info!("Loaded weights from {}", path.display());
        Ok(())
    }
}

/// Instantiate layers, checking each one consumes what the previous produces
fn build_layers(configs: &[LayerConfig]) -> Result<Vec<Layer>> {
    if configs.is_empty() {
        return Err(BetbotError::Topology("network needs at least one layer".into()));
    }

    let layers = configs
        .iter()
        .enumerate()
        .map(|(i, config)| Layer::new(config, i))
        .collect::<Result<Vec<_>>>()?;

    for pair in layers.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.declared_inputs() != previous.output_width {
            return Err(BetbotError::Topology(format!(
                "layer {} expects {} inputs but layer {} produces {}",
                next.index,
                next.declared_inputs(),
                previous.index,
                previous.output_width
            )));
        }
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Activation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn topology() -> Vec<LayerConfig> {
        vec![
            LayerConfig::new(3, 4, Activation::Sigmoid, true),
            LayerConfig::new(4, 2, Activation::Identity, true),
        ]
    }

    #[test]
    fn test_classify_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let network = Network::random(&topology(), WeightInit::default(), &mut rng).unwrap();

        assert_eq!(network.input_width(), 3);
        assert_eq!(network.output_width(), 2);
        assert_eq!(network.classify(&[0.1, 0.2, 0.3]).unwrap().len(), 2);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(5);
        let network = Network::random(&topology(), WeightInit::default(), &mut rng).unwrap();

        let first = network.classify(&[1.0, -2.0, 0.5]).unwrap();
        for _ in 0..5 {
            assert_eq!(network.classify(&[1.0, -2.0, 0.5]).unwrap(), first);
        }
    }

    #[test]
    fn test_forward_by_hand() {
        // 1 input -> 1 identity neuron (bias) -> 1 identity neuron (bias)
        let configs = vec![
            LayerConfig::new(1, 1, Activation::Identity, true),
            LayerConfig::new(1, 1, Activation::Identity, true),
        ];
        let dump = WeightDump {
            weights: vec![vec![vec![0.5, 2.0]], vec![vec![0.1, 3.0]]],
        };
        let network = Network::new(&configs, Some(dump)).unwrap();

        let pass = network.forward(&[1.0]).unwrap();
        assert!((pass.layers[0].outputs[0] - 2.5).abs() < 1e-12);
        assert!((pass.output()[0] - 7.6).abs() < 1e-12);
        assert_eq!(pass.layers[1].inputs, vec![1.0, 2.5]);
    }

    #[test]
    fn test_input_width_mismatch() {
        let network = Network::new(&topology(), None).unwrap();
        let err = network.classify(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, BetbotError::Shape { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_layers_must_chain() {
        let configs = vec![
            LayerConfig::new(3, 4, Activation::Sigmoid, true),
            LayerConfig::new(5, 2, Activation::Identity, false),
        ];
        assert!(matches!(
            Network::new(&configs, None),
            Err(BetbotError::Topology(_))
        ));
        assert!(Network::new(&[], None).is_err());
    }

    #[test]
    fn test_layer_indices_assigned() {
        let network = Network::new(&topology(), None).unwrap();
        for (i, layer) in network.layers().iter().enumerate() {
            assert_eq!(layer.index, i);
            assert!(layer.neurons.iter().all(|n| n.layer_index == i));
        }
    }

    #[test]
    fn test_save_and_load_reproduces_outputs() {
        let dir = std::env::temp_dir().join(format!("betbot-network-{}", std::process::id()));
        let path = dir.join("model.json");

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let network = Network::random(&topology(), WeightInit { low: -1.0, high: 1.0 }, &mut rng).unwrap();
            network.save_model(&path).unwrap();

            let mut restored = Network::random(&topology(), WeightInit::default(), &mut rng).unwrap();
            restored.load_weights(&path).unwrap();

            assert_eq!(restored.weights(), network.weights(), "seed {}", seed);
            let input = [0.3, -0.7, 2.0];
            assert_eq!(restored.classify(&input).unwrap(), network.classify(&input).unwrap());
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_weights_fall_back_to_random() {
        let mut rng = StdRng::seed_from_u64(2);
        let network = Network::load_or_random(
            &topology(),
            WeightInit::default(),
            "/nonexistent/betbot/weights.json",
            &mut rng,
        )
        .unwrap();
        assert_eq!(network.weights().parameter_count(), 4 * 4 + 2 * 5);
    }

    #[test]
    fn test_seeded_fallback_is_reproducible() {
        let path = "/nonexistent/betbot/weights.json";
        let load = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            Network::load_or_random(&topology(), WeightInit::default(), path, &mut rng).unwrap()
        };
        let expected = Network::random(&topology(), WeightInit::default(), &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(load(1).weights(), load(1).weights());
        assert_eq!(load(1).weights(), expected.weights());

        let mut network = Network::new(&topology(), None).unwrap();
        network
            .load_weights_with_rng(path, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(network.weights(), expected.weights());
    }

    #[test]
    fn test_load_or_random_reads_existing_file() {
        let dir = std::env::temp_dir().join(format!("betbot-resume-{}", std::process::id()));
        let path = dir.join("model.json");

        let mut rng = StdRng::seed_from_u64(5);
        let network = Network::random(&topology(), WeightInit { low: -1.0, high: 1.0 }, &mut rng).unwrap();
        network.save_model(&path).unwrap();

        let resumed = Network::load_or_random(&topology(), WeightInit::default(), &path, &mut rng).unwrap();
        assert_eq!(resumed.weights(), network.weights());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dump_from_other_topology_fails() {
        let dir = std::env::temp_dir().join(format!("betbot-mismatch-{}", std::process::id()));
        let path = dir.join("model.json");

        let network_a = Network::new(&topology(), None).unwrap();
        network_a.save_model(&path).unwrap();

        let topology_b = vec![
            LayerConfig::new(3, 5, Activation::Sigmoid, true),
            LayerConfig::new(5, 2, Activation::Identity, true),
        ];
        let mut network_b = Network::new(&topology_b, None).unwrap();
        let before = network_b.weights().clone();

        let err = network_b.load_weights(&path).unwrap_err();
        assert!(matches!(err, BetbotError::WeightDump(_)));
        assert_eq!(network_b.weights(), &before);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
