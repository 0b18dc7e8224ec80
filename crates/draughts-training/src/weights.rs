//! Genetic operators on network weights.
//!
//! These functions implement the initialization, crossover and mutation steps used by
//! [`genetic::Trainer`](crate::genetic::Trainer). All of them work on owned networks:
//! crossover returns fresh children and mutation modifies a network the caller owns,
//! so no weight buffer is ever shared between population members.
//!
//! # Operations
//!
//! - **Initialization**: [`random_network`] draws every weight from a Gaussian
//! - **Crossover**: [`crossover`] exchanges whole neurons between two parents
//! - **Mutation**: [`mutate`] adds Gaussian noise to randomly chosen weights
//!
//! # Design Decisions
//!
//! ## Neuron-wise Crossover
//!
//! The unit of inheritance is the complete incoming weight column of a neuron, bias
//! included. Splitting a column between parents would mix weights that were only ever
//! tuned together, while exchanging whole columns keeps every neuron's response intact.

use std::iter;

use draughts_evaluator::network::{Activation, Layer, Network, NetworkError};
use rand::Rng;
use rand_distr::Normal;

/// Creates a network with weights drawn from `init`.
///
/// Hidden layers use [`Activation::Sigmoid`] and the output layer [`Activation::Linear`].
pub fn random_network<R>(
    layout: &[usize],
    init: &Normal<f64>,
    rng: &mut R,
) -> Result<Network, NetworkError>
where
    R: Rng + ?Sized,
{
    let weight_layers = layout.len().saturating_sub(1);
    let activations: Vec<Activation> = (0..weight_layers)
        .map(|i| {
            if i + 1 == weight_layers {
                Activation::Linear
            } else {
                Activation::Sigmoid
            }
        })
        .collect();
    let mut network = Network::new(layout, &activations)?;
    for w in network.weights_mut() {
        *w = rng.sample(init);
    }
    Ok(network)
}

/// Recombines two parents into two children.
///
/// For every neuron of every layer, the first child inherits the incoming weight column
/// from the first parent and the second child from the second parent, or the other way
/// round, with equal probability.
///
/// # Panics
///
/// Panics if the parents have different layouts.
#[must_use]
pub fn crossover<R>(a: &Network, b: &Network, rng: &mut R) -> (Network, Network)
where
    R: Rng + ?Sized,
{
    assert_eq!(a.layout(), b.layout(), "parents must share a layout");
    let mut child_a = a.clone();
    let mut child_b = b.clone();
    for (la, lb) in iter::zip(child_a.layers_mut(), child_b.layers_mut()) {
        for k in 0..la.outputs() {
            if rng.random_bool(0.5) {
                swap_column(la, lb, k);
            }
        }
    }
    (child_a, child_b)
}

fn swap_column(a: &mut Layer, b: &mut Layer, k: usize) {
    for j in 0..a.rows() {
        let wa = a.weight(j, k);
        a.set_weight(j, k, b.weight(j, k));
        b.set_weight(j, k, wa);
    }
}

/// Perturbs each weight with probability `bit_rate` by a sample of `noise`.
///
/// `bit_rate` must lie in `[0, 1]`.
pub fn mutate<R>(network: &mut Network, bit_rate: f64, noise: &Normal<f64>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in network.weights_mut() {
        if rng.random_bool(bit_rate) {
            *w += rng.sample(noise);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    const LAYOUT: [usize; 3] = [6, 4, 1];

    fn parents(rng: &mut Pcg64Mcg) -> (Network, Network) {
        let init = Normal::new(1.0, 0.2).unwrap();
        let a = random_network(&LAYOUT, &init, rng).unwrap();
        let b = random_network(&LAYOUT, &init, rng).unwrap();
        (a, b)
    }

    fn columns(network: &Network) -> Vec<Vec<Vec<f64>>> {
        network
            .layers()
            .iter()
            .map(|layer| {
                (0..layer.outputs())
                    .map(|k| layer.column(k).collect())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_random_network_shape() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let (a, _) = parents(&mut rng);
        assert_eq!(a.layout(), LAYOUT.to_vec());
        assert_eq!(a.layers()[0].activation(), Activation::Sigmoid);
        assert_eq!(a.layers()[1].activation(), Activation::Linear);
        assert!(a.weights().all(|w| (w - 1.0).abs() < 2.0));
    }

    #[test]
    fn test_crossover_keeps_whole_columns() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let (a, b) = parents(&mut rng);
        let (ca, cb) = crossover(&a, &b, &mut rng);

        let (pa, pb) = (columns(&a), columns(&b));
        let (xa, xb) = (columns(&ca), columns(&cb));
        for layer in 0..pa.len() {
            for k in 0..pa[layer].len() {
                let kept = xa[layer][k] == pa[layer][k] && xb[layer][k] == pb[layer][k];
                let swapped = xa[layer][k] == pb[layer][k] && xb[layer][k] == pa[layer][k];
                assert!(kept ^ swapped, "layer {layer} neuron {k}");
            }
        }
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let (a, b) = parents(&mut rng);
        let (a0, b0) = (a.clone(), b.clone());
        let _children = crossover(&a, &b, &mut rng);
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_mutation_bounds() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let (original, _) = parents(&mut rng);

        let mut unchanged = original.clone();
        mutate(&mut unchanged, 0.0, &noise, &mut rng);
        assert_eq!(unchanged, original);

        let mut changed = original.clone();
        mutate(&mut changed, 1.0, &noise, &mut rng);
        assert!(iter::zip(changed.weights(), original.weights()).all(|(x, y)| x != y));
    }
}
