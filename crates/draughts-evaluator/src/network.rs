//! Feed-forward neural network used as an evolvable board evaluator.
//!
//! A [`Network`] is an ordered list of fully connected [`Layer`]s. Each layer owns a
//! row-major `(inputs + 1) × outputs` weight buffer: row `j < inputs` holds the weights
//! from input `j`, the last row holds the bias, and column `k` is the complete incoming
//! weight vector of output neuron `k`.
//!
//! Networks are plain owned values. Cloning a network deep-copies every weight, so
//! genetic operators can work on clones without affecting other population members.

use std::iter;

use serde::{Deserialize, Serialize};

/// Activation function applied to the output of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Sigmoid,
    Linear,
}

impl Activation {
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Linear => x,
        }
    }
}

/// Error returned when a network layout is invalid.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network layout needs at least 2 layers of neurons, got {len}")]
    LayoutTooShort { len: usize },
    #[display("expected {expected} activation functions, got {actual}")]
    ActivationCount { expected: usize, actual: usize },
    #[display("layer {index} has no neurons")]
    EmptyLayer { index: usize },
    #[display("layer expects {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[display("layer {index} expects {expected} inputs, previous layer has {actual} outputs")]
    Disconnected {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[display("evaluator network must have exactly one output, got {outputs}")]
    OutputCount { outputs: usize },
}

/// Serialized form of [`Layer`], validated on deserialization.
#[derive(Deserialize)]
struct RawLayer {
    inputs: usize,
    outputs: usize,
    activation: Activation,
    weights: Vec<f64>,
}

impl TryFrom<RawLayer> for Layer {
    type Error = NetworkError;

    fn try_from(raw: RawLayer) -> Result<Self, Self::Error> {
        let expected = (raw.inputs + 1) * raw.outputs;
        if raw.weights.len() != expected {
            return Err(NetworkError::WeightCount {
                expected,
                actual: raw.weights.len(),
            });
        }
        Ok(Self {
            inputs: raw.inputs,
            outputs: raw.outputs,
            activation: raw.activation,
            weights: raw.weights,
        })
    }
}

/// A fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLayer")]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    activation: Activation,
    weights: Vec<f64>,
}

impl Layer {
    /// Creates a layer with all weights set to zero.
    #[must_use]
    pub fn zeros(inputs: usize, outputs: usize, activation: Activation) -> Self {
        Self {
            inputs,
            outputs,
            activation,
            weights: vec![0.0; (inputs + 1) * outputs],
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Number of rows of the weight matrix (inputs plus the bias row).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.inputs + 1
    }

    /// Weight from input `j` (or the bias when `j == inputs`) to output neuron `k`.
    #[must_use]
    pub fn weight(&self, j: usize, k: usize) -> f64 {
        self.weights[j * self.outputs + k]
    }

    pub fn set_weight(&mut self, j: usize, k: usize, value: f64) {
        self.weights[j * self.outputs + k] = value;
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Incoming weights of output neuron `k`, bias last.
    pub fn column(&self, k: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows()).map(move |j| self.weight(j, k))
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.inputs);
        let bias_row = &self.weights[self.inputs * self.outputs..];
        let mut sums = bias_row.to_vec();
        for (row, &x) in self.weights.chunks_exact(self.outputs).zip(input) {
            for (sum, w) in iter::zip(&mut sums, row) {
                *sum += x * w;
            }
        }
        for sum in &mut sums {
            *sum = self.activation.apply(*sum);
        }
        sums
    }
}

#[derive(Deserialize)]
struct RawNetwork {
    layers: Vec<Layer>,
}

impl TryFrom<RawNetwork> for Network {
    type Error = NetworkError;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        Self::from_layers(raw.layers)
    }
}

/// Feed-forward neural network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a network with zero weights.
    ///
    /// `layout` lists the neuron count of every layer, inputs first. `activations` holds
    /// one function per weight layer, i.e. `layout.len() - 1` entries.
    pub fn new(layout: &[usize], activations: &[Activation]) -> Result<Self, NetworkError> {
        if layout.len() < 2 {
            return Err(NetworkError::LayoutTooShort { len: layout.len() });
        }
        if activations.len() != layout.len() - 1 {
            return Err(NetworkError::ActivationCount {
                expected: layout.len() - 1,
                actual: activations.len(),
            });
        }
        if let Some(index) = layout.iter().position(|&n| n == 0) {
            return Err(NetworkError::EmptyLayer { index });
        }
        let layers = iter::zip(layout.windows(2), activations)
            .map(|(pair, &activation)| Layer::zeros(pair[0], pair[1], activation))
            .collect();
        Ok(Self { layers })
    }

    /// Builds a network from already constructed layers.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, NetworkError> {
        if layers.is_empty() {
            return Err(NetworkError::LayoutTooShort { len: 0 });
        }
        if layers[0].inputs == 0 {
            return Err(NetworkError::EmptyLayer { index: 0 });
        }
        if let Some(index) = layers.iter().position(|l| l.outputs == 0) {
            return Err(NetworkError::EmptyLayer { index: index + 1 });
        }
        for (index, pair) in layers.windows(2).enumerate() {
            if pair[1].inputs != pair[0].outputs {
                return Err(NetworkError::Disconnected {
                    index: index + 1,
                    expected: pair[1].inputs,
                    actual: pair[0].outputs,
                });
            }
        }
        Ok(Self { layers })
    }

    /// Neuron count of every layer, inputs first.
    #[must_use]
    pub fn layout(&self) -> Vec<usize> {
        iter::once(self.input_count())
            .chain(self.layers.iter().map(Layer::outputs))
            .collect()
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.layers[0].inputs
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Total number of weights, biases included.
    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len()).sum()
    }

    /// Iterates over every weight, layer by layer.
    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flat_map(|l| l.weights.iter().copied())
    }

    /// Iterates mutably over every weight, layer by layer.
    pub fn weights_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.layers.iter_mut().flat_map(|l| l.weights.iter_mut())
    }

    /// Propagates `input` through all layers.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not match the input layer size.
    #[must_use]
    pub fn feed_forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.input_count(),
            "network expects {} inputs",
            self.input_count()
        );
        let mut values = input.to_vec();
        for layer in &self.layers {
            values = layer.forward(&values);
        }
        values
    }
}
