//! Neural network building blocks
//!
//! Activation → Neuron → Layer → Network, with all trainable parameters held
//! in a single [`WeightStore`] owned by the network.

pub mod activation;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod weights;

pub use activation::Activation;
pub use layer::{Layer, LayerConfig, LayerKind, LayerTrace};
pub use network::{ForwardPass, Network, WeightInit};
pub use neuron::{Neuron, NeuronOutput};
pub use weights::{WeightDump, WeightStore};
