//! Position encoding for network input.

use crate::rules::Game;

/// Encoded tensor data in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedState {
    pub tensor: Vec<f32>,

    /// Shape of the tensor, e.g. `[batch, features]`.
    pub shape: Vec<usize>,
}

impl EncodedState {
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Row `i` of a batched tensor.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let width = self.shape.get(1).copied()?;
        self.tensor.get(i * width..(i + 1) * width)
    }
}

/// Encode one position as a `[OBSERVATION_SIZE]` tensor.
pub fn encode<G: Game>(game: &G) -> EncodedState {
    EncodedState::new(game.encode(), vec![G::OBSERVATION_SIZE])
}

/// Encode a batch as a `[batch, OBSERVATION_SIZE]` tensor.
pub fn encode_batch<G: Game>(states: &[&G]) -> EncodedState {
    let mut tensor = Vec::with_capacity(states.len() * G::OBSERVATION_SIZE);
    for game in states {
        tensor.extend(game.encode());
    }
    EncodedState::new(tensor, vec![states.len(), G::OBSERVATION_SIZE])
}

/// Softmax over the entries where `mask` is set; the rest become 0.
///
/// Returns all zeros when nothing is masked in.
pub fn masked_softmax(logits: &[f32], mask: &[bool]) -> Vec<f32> {
    let max = logits
        .iter()
        .zip(mask)
        .filter(|(_, &m)| m)
        .map(|(&l, _)| l)
        .fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return vec![0.0; logits.len()];
    }

    let mut probs: Vec<f32> = logits
        .iter()
        .zip(mask)
        .map(|(&l, &m)| if m { (l - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = probs.iter().sum();
    for p in &mut probs {
        *p /= sum;
    }
    probs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Checkers, ConnectFour, Othello};

    #[test]
    fn test_encode_shapes() {
        let othello = Othello::new();
        let encoded = encode(&othello);
        assert_eq!(encoded.shape, vec![128]);
        // Two discs each at the start.
        assert_eq!(encoded.tensor.iter().sum::<f32>(), 4.0);

        let checkers = Checkers::new();
        assert_eq!(encode(&checkers).len(), Checkers::OBSERVATION_SIZE);
    }

    #[test]
    fn test_encode_batch() {
        let a = ConnectFour::new();
        let mut b = ConnectFour::new();
        b.play(3).unwrap();

        let batch = encode_batch(&[&a, &b]);
        assert_eq!(batch.shape, vec![2, ConnectFour::OBSERVATION_SIZE]);
        assert_eq!(batch.row(0).unwrap().iter().sum::<f32>(), 0.0);
        assert_eq!(batch.row(1).unwrap().iter().sum::<f32>(), 1.0);
        assert!(batch.row(2).is_none());
    }

    #[test]
    fn test_masked_softmax() {
        let probs = masked_softmax(&[1.0, 5.0, 1.0], &[true, false, true]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert_eq!(probs[1], 0.0);
        assert!((probs[2] - 0.5).abs() < 1e-6);

        assert_eq!(masked_softmax(&[1.0, 2.0], &[false, false]), vec![0.0, 0.0]);
    }
}
