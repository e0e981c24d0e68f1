//! Fully-connected feed-forward network with online backpropagation.

use log::debug;
use rand::Rng;

use crate::activation::{Activation, Sigmoid};

/// One weight row per destination node. Entry 0 of a row is the bias weight, entry i + 1 the
/// weight from source node i.
pub type Layer = Vec<Vec<f64>>;

/// `weights[l]` connects layer l to layer l + 1.
pub type Weights = Vec<Layer>;

/// Per-layer node values from one forward pass. Index 0 holds the input itself in both vectors,
/// index l + 1 the nodes computed by weight layer l.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub raw: Vec<Vec<f64>>,
    pub activated: Vec<Vec<f64>>,
}

impl Trace {
    pub fn output(&self) -> &[f64] {
        match self.activated.last() {
            Some(output) => output,
            None => &[],
        }
    }
}

/// Layer widths `[n0, n1, ..., nk]` of a weight tensor, or None if the tensor is not a valid
/// network: no layers, an empty layer, ragged rows, or a row length that does not match the width
/// of the layer before it plus the bias.
pub fn layout_of(weights: &[Layer]) -> Option<Vec<usize>> {
    let first = weights.first()?.first()?;
    if first.is_empty() {
        return None;
    }
    let mut layout = vec![first.len() - 1];
    for layer in weights {
        let source = *layout.last()?;
        if layer.is_empty() || layer.iter().any(|row| row.len() != source + 1) {
            return None;
        }
        layout.push(layer.len());
    }
    Some(layout)
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    assert_eq!(
        weights.len(),
        values.len(),
        "weight row has {} entries but its input has {}",
        weights.len(),
        values.len()
    );
    weights.iter().zip(values).map(|(w, x)| w * x).sum()
}

/// Multi-layer perceptron owning its weight tensor.
#[derive(Clone, Debug)]
pub struct Network<A = Sigmoid> {
    weights: Weights,
    learning_rate: f64,
    activation: A,
}

impl<A: Activation> Network<A> {
    /// A network with the given layer widths and every weight drawn uniformly from [-1, 1].
    ///
    /// `Network::create(&[10, 10, 1], ..)` has 10 inputs, 10 hidden nodes and 1 output.
    pub fn create<R: Rng>(
        layout: &[usize],
        learning_rate: f64,
        activation: A,
        rng: &mut R,
    ) -> Self {
        assert!(
            layout.len() >= 2,
            "a network needs at least an input and an output layer, got {:?}",
            layout
        );
        let mut weights = Vec::with_capacity(layout.len() - 1);
        for pair in layout.windows(2) {
            let (source, destination) = (pair[0], pair[1]);
            let mut layer = Vec::with_capacity(destination);
            for _ in 0..destination {
                let row: Vec<f64> = (0..=source).map(|_| rng.random_range(-1.0..=1.0)).collect();
                layer.push(row);
            }
            weights.push(layer);
        }
        Network::from_weights(weights, learning_rate, activation)
    }

    /// Wrap an existing weight tensor. Panics if the tensor is malformed (see [`layout_of`]).
    pub fn from_weights(weights: Weights, learning_rate: f64, activation: A) -> Self {
        assert!(
            layout_of(&weights).is_some(),
            "malformed weight tensor: every row of layer l must have (width of layer l) + 1 entries"
        );
        Network {
            weights,
            learning_rate,
            activation,
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn into_weights(self) -> Weights {
        self.weights
    }

    pub fn layout(&self) -> Vec<usize> {
        match layout_of(&self.weights) {
            Some(layout) => layout,
            None => unreachable!("weights were validated on construction"),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn activation(&self) -> &A {
        &self.activation
    }

    /// Output of the network for `input`.
    pub fn run(&self, input: &[f64]) -> Vec<f64> {
        let mut trace = self.run_traced(input);
        trace.activated.pop().unwrap_or_default()
    }

    /// Forward pass that keeps the raw and activated values of every layer for [`Network::learn`].
    pub fn run_traced(&self, input: &[f64]) -> Trace {
        let width = self.weights[0][0].len() - 1;
        assert_eq!(
            input.len(),
            width,
            "network expects {} inputs, got {}",
            width,
            input.len()
        );

        let mut raw = Vec::with_capacity(self.weights.len() + 1);
        let mut activated = Vec::with_capacity(self.weights.len() + 1);
        raw.push(input.to_vec());
        activated.push(input.to_vec());

        let mut augmented = Vec::with_capacity(input.len() + 1);
        for layer in self.weights.iter() {
            augmented.clear();
            augmented.push(1.0);
            augmented.extend_from_slice(&activated[activated.len() - 1]);

            let layer_raw: Vec<f64> = layer.iter().map(|row| dot(row, &augmented)).collect();
            let layer_activated = layer_raw
                .iter()
                .map(|&x| self.activation.activate(x))
                .collect();
            raw.push(layer_raw);
            activated.push(layer_activated);
        }

        Trace { raw, activated }
    }

    /// One backpropagation step towards `target` from a forward pass of the current weights.
    /// Returns the mean of all node deltas.
    pub fn learn(&mut self, target: &[f64], trace: &Trace) -> f64 {
        let layers = self.weights.len();
        assert_eq!(
            trace.raw.len(),
            layers + 1,
            "trace does not come from this network"
        );
        let (out_raw, out_activated) = (&trace.raw[layers], &trace.activated[layers]);
        assert_eq!(
            target.len(),
            self.weights[layers - 1].len(),
            "target has {} entries but the network has {} outputs",
            target.len(),
            self.weights[layers - 1].len()
        );
        assert_eq!(out_activated.len(), target.len());

        let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); layers];
        deltas[layers - 1] = target
            .iter()
            .zip(out_activated)
            .zip(out_raw)
            .map(|((t, a), &v)| (t - a) * self.activation.derivative(v))
            .collect();

        // hidden layers, last to first; row[i + 1] skips the bias weight
        for l in (1..layers).rev() {
            let width = self.weights[l - 1].len();
            let hidden: Vec<f64> = (0..width)
                .map(|i| {
                    let sum: f64 = self.weights[l]
                        .iter()
                        .zip(&deltas[l])
                        .map(|(row, d)| d * row[i + 1])
                        .sum();
                    self.activation.derivative(trace.raw[l][i]) * sum
                })
                .collect();
            deltas[l - 1] = hidden;
        }

        let learning_rate = self.learning_rate;
        for (l, layer) in self.weights.iter_mut().enumerate() {
            let input = &trace.activated[l];
            for (row, &delta) in layer.iter_mut().zip(&deltas[l]) {
                assert_eq!(
                    row.len(),
                    input.len() + 1,
                    "weight row has {} entries but its input has {}",
                    row.len(),
                    input.len() + 1
                );
                row[0] += learning_rate * delta;
                for (w, &x) in row[1..].iter_mut().zip(input) {
                    *w += learning_rate * x * delta;
                }
            }
        }

        let count: usize = deltas.iter().map(Vec::len).sum();
        deltas.iter().flatten().sum::<f64>() / count as f64
    }

    /// Online training: one forward pass and one update per (input, target) pair, in order.
    /// Returns the mean of the per-example delta means.
    pub fn train(&mut self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> f64 {
        assert_eq!(
            inputs.len(),
            targets.len(),
            "{} inputs but {} targets",
            inputs.len(),
            targets.len()
        );
        if inputs.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            let trace = self.run_traced(input);
            total += self.learn(target, &trace);
        }
        let mean = total / inputs.len() as f64;
        debug!(
            "trained on {} examples, mean delta {:.6}",
            inputs.len(),
            mean
        );
        mean
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn squared_error(network: &Network, input: &[f64], target: &[f64]) -> f64 {
        network
            .run(input)
            .iter()
            .zip(target)
            .map(|(a, t)| (t - a) * (t - a))
            .sum()
    }

    #[test]
    fn test_create_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let network = Network::create(&[3, 4, 2], 0.1, Sigmoid, &mut rng);
        let weights = network.weights();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].len(), 4);
        assert!(weights[0].iter().all(|row| row.len() == 4));
        assert_eq!(weights[1].len(), 2);
        assert!(weights[1].iter().all(|row| row.len() == 5));
        assert!(weights
            .iter()
            .flatten()
            .flatten()
            .all(|w| (-1.0..=1.0).contains(w)));
        assert_eq!(network.layout(), vec![3, 4, 2]);
    }

    #[test]
    fn test_run_with_known_weights() {
        let network = Network::from_weights(vec![vec![vec![0.5, 1.0, -1.0]]], 0.1, Sigmoid);
        let output = network.run(&[2.0, 1.0]);
        assert_eq!(output, vec![Sigmoid.activate(1.5)]);

        let trace = network.run_traced(&[2.0, 1.0]);
        assert_eq!(trace.raw, vec![vec![2.0, 1.0], vec![1.5]]);
        assert_eq!(trace.activated[0], vec![2.0, 1.0]);
        assert_eq!(trace.output(), &output[..]);
    }

    #[test]
    fn test_two_layer_forward() {
        // hidden nodes see raw 0 and 2, output weights are bias -1 and 2, 0
        let weights = vec![
            vec![vec![0.0, 0.0], vec![2.0, 0.0]],
            vec![vec![-1.0, 2.0, 0.0]],
        ];
        let network = Network::from_weights(weights, 0.1, Sigmoid);
        let expected = Sigmoid.activate(-1.0 + 2.0 * 0.5);
        assert_eq!(network.run(&[3.0]), vec![expected]);
    }

    #[test]
    fn test_learn_follows_the_error_gradient() {
        let mut rng = StdRng::seed_from_u64(11);
        let network = Network::create(&[3, 4, 3, 2], 0.01, Sigmoid, &mut rng);
        let input = [0.3, -1.0, 1.0];
        let target = [1.0, 0.0];
        // half squared error: the update is -learning_rate * dE/dw
        let error = |n: &Network| squared_error(n, &input, &target) / 2.0;

        let mut trained = network.clone();
        let trace = trained.run_traced(&input);
        trained.learn(&target, &trace);

        let h = 1e-6;
        for l in 0..network.weights().len() {
            for j in 0..network.weights()[l].len() {
                for i in 0..network.weights()[l][j].len() {
                    let mut plus = network.weights().clone();
                    plus[l][j][i] += h;
                    let mut minus = network.weights().clone();
                    minus[l][j][i] -= h;
                    let gradient = (error(&Network::from_weights(plus, 0.01, Sigmoid))
                        - error(&Network::from_weights(minus, 0.01, Sigmoid)))
                        / (2.0 * h);
                    let step = trained.weights()[l][j][i] - network.weights()[l][j][i];
                    assert!(
                        (step + 0.01 * gradient).abs() < 1e-9,
                        "w[{}][{}][{}]: step {} gradient {}",
                        l,
                        j,
                        i,
                        step,
                        gradient
                    );
                }
            }
        }
    }

    #[test]
    fn test_repeated_training_decreases_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut network = Network::create(&[4, 5, 1], 0.5, Sigmoid, &mut rng);
        let input = vec![1.0, -1.0, 0.0, 1.0];
        let target = vec![0.9];

        let mut previous = squared_error(&network, &input, &target);
        for _ in 0..500 {
            network.train(&[input.clone()], &[target.clone()]);
            let error = squared_error(&network, &input, &target);
            assert!(error < previous, "error went from {} to {}", previous, error);
            previous = error;
        }
        assert!(previous < 1e-3, "error still {}", previous);
    }

    #[test]
    fn test_train_moves_outputs_towards_targets() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::create(&[2, 4, 1], 0.5, Sigmoid, &mut rng);
        let inputs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let targets = vec![vec![0.9], vec![0.1]];
        for _ in 0..2000 {
            network.train(&inputs, &targets);
        }
        assert!(network.run(&inputs[0])[0] > 0.8);
        assert!(network.run(&inputs[1])[0] < 0.2);
    }

    #[test]
    fn test_json_round_trip_is_bit_identical() {
        let mut rng = StdRng::seed_from_u64(9);
        let network = Network::create(&[10, 6, 1], 0.1, Sigmoid, &mut rng);
        let json = serde_json::to_string(network.weights()).unwrap();
        let weights: Weights = serde_json::from_str(&json).unwrap();
        let restored = Network::from_weights(weights, 0.1, Sigmoid);
        let input: Vec<f64> = (0..10).map(|i| i as f64 / 7.0 - 0.6).collect();
        let a = network.run(&input);
        let b = restored.run(&input);
        assert_eq!(a[0].to_bits(), b[0].to_bits());
    }

    #[test]
    fn test_layout_of_rejects_malformed_tensors() {
        assert_eq!(layout_of(&[]), None);
        assert_eq!(layout_of(&[vec![]]), None);
        assert_eq!(layout_of(&[vec![vec![1.0, 2.0], vec![1.0]]]), None);
        assert_eq!(
            layout_of(&[vec![vec![1.0, 2.0]], vec![vec![1.0, 2.0, 3.0]]]),
            None
        );
        assert_eq!(
            layout_of(&[vec![vec![1.0, 2.0]], vec![vec![1.0, 2.0]]]),
            Some(vec![1, 1, 1])
        );
    }

    #[test]
    #[should_panic(expected = "network expects 2 inputs")]
    fn test_run_rejects_wrong_input_length() {
        let network = Network::from_weights(vec![vec![vec![0.5, 1.0, -1.0]]], 0.1, Sigmoid);
        network.run(&[1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "target has 2 entries")]
    fn test_learn_rejects_wrong_target_length() {
        let mut network = Network::from_weights(vec![vec![vec![0.5, 1.0, -1.0]]], 0.1, Sigmoid);
        let trace = network.run_traced(&[1.0, 2.0]);
        network.learn(&[1.0, 0.0], &trace);
    }

    #[test]
    #[should_panic(expected = "malformed weight tensor")]
    fn test_from_weights_rejects_ragged_rows() {
        Network::from_weights(vec![vec![vec![0.5, 1.0], vec![0.5]]], 0.1, Sigmoid);
    }
}
