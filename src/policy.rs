//! Policy decoding: one raw policy vector in, one concrete legal move out.
//!
//! The vector covers the padded memory grid plus the pass slot (logits,
//! pre-softmax). Decoding normalizes, strips mass the board forbids, then
//! selects deterministically (temperature 0) or samples (temperature > 0).
//! Pure: the same inputs and RNG stream always produce the same move.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::board::{Color, Move};
use crate::coords::Geometry;
use crate::error::PolicyError;

/// Numerically stable in-place softmax: subtract the max before
/// exponentiating so large logits cannot overflow.
pub fn softmax_in_place(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        // Every slot is -inf; leave the zeros that exp would produce.
        values.fill(0.0);
        return;
    }
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

/// Lowest index attaining the maximum value. The strict `>` keeps the first
/// maximum, which pins the tie-break for deterministic selection.
fn argmax_lowest(values: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Decode a raw policy vector into a single move for `color`.
///
/// - `logits` must have length `geometry.policy_len()`; a mismatch is a
///   programming error and panics.
/// - `mask`, when supplied, has one bool per board cell (`y * width + x`);
///   cells marked false lose all probability mass. Padding-border cells are
///   always suppressed, mask or not: the predictor may put mass there but
///   such a cell must never be selected.
/// - `allow_pass == false` removes the pass slot before normalization.
/// - `temperature == 0` selects the lowest index among the probability
///   maxima; `temperature > 0` divides log-probabilities by the temperature
///   and samples from the rescaled distribution using `rng`.
///
/// # Errors
/// [`PolicyError::NoLegalMove`] when masking leaves no probability mass.
/// Cannot happen while pass is allowed and carries finite mass; the caller
/// treats it as fatal.
pub fn decode<R: Rng>(
    logits: &[f32],
    mask: Option<&[bool]>,
    temperature: f32,
    allow_pass: bool,
    color: Color,
    geometry: &Geometry,
    rng: &mut R,
) -> Result<Move, PolicyError> {
    assert_eq!(
        logits.len(),
        geometry.policy_len(),
        "policy vector length does not match the board geometry"
    );
    debug_assert!(temperature >= 0.0, "temperature must be non-negative");
    if let Some(mask) = mask {
        assert_eq!(
            mask.len(),
            geometry.width * geometry.height,
            "legality mask length does not match the board"
        );
    }

    let mut probs = logits.to_vec();
    if !allow_pass {
        probs[geometry.pass_index()] = f32::NEG_INFINITY;
    }
    softmax_in_place(&mut probs);

    suppress_forbidden(&mut probs, mask, geometry);

    let total: f32 = probs.iter().sum();
    if !(total > 0.0) {
        return Err(PolicyError::NoLegalMove);
    }

    let index = if temperature == 0.0 {
        argmax_lowest(&probs)
    } else {
        sample_with_temperature(&probs, temperature, rng)?
    };

    let vertex = geometry.vertex_at(index)?;
    Ok(Move { color, vertex })
}

/// Zero out probability mass anywhere the board forbids: every padding
/// cell, plus board cells the mask marks illegal. The pass slot is left
/// alone.
fn suppress_forbidden(probs: &mut [f32], mask: Option<&[bool]>, geometry: &Geometry) {
    let ds = geometry.data_size();
    for mem_y in 0..ds {
        for mem_x in 0..ds {
            let on_board = mem_x >= geometry.pad
                && mem_y >= geometry.pad
                && mem_x - geometry.pad < geometry.width
                && mem_y - geometry.pad < geometry.height;
            let index = mem_y * ds + mem_x;
            if !on_board {
                probs[index] = 0.0;
            } else if let Some(mask) = mask {
                let x = mem_x - geometry.pad;
                let y = mem_y - geometry.pad;
                if !mask[y * geometry.width + x] {
                    probs[index] = 0.0;
                }
            }
        }
    }
}

/// Sample an index from `probs` rescaled by `1/temperature` in log space.
/// Shifting by the maximum log-probability keeps the weights in (0, 1], so
/// small temperatures sharpen without overflowing.
fn sample_with_temperature<R: Rng>(
    probs: &[f32],
    temperature: f32,
    rng: &mut R,
) -> Result<usize, PolicyError> {
    let max_log = probs
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| p.ln())
        .fold(f32::NEG_INFINITY, f32::max);
    let weights: Vec<f64> = probs
        .iter()
        .map(|&p| {
            if p > 0.0 {
                (((p.ln() - max_log) / temperature) as f64).exp()
            } else {
                0.0
            }
        })
        .collect();
    let dist = WeightedIndex::new(&weights).map_err(|_| PolicyError::NoLegalMove)?;
    Ok(dist.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Coord, Vertex};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn geometry() -> Geometry {
        Geometry::with_pad(5, 5, 1)
    }

    fn flat_logits(g: &Geometry) -> Vec<f32> {
        vec![0.0; g.policy_len()]
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut v = vec![1.0, 2.0, 3.0, 4.0];
        softmax_in_place(&mut v);
        let sum: f32 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(v[3] > v[0]);
    }

    #[test]
    fn test_softmax_survives_large_logits() {
        let mut v = vec![1000.0, 999.0];
        softmax_in_place(&mut v);
        assert!(v.iter().all(|p| p.is_finite()));
        assert!(v[0] > v[1]);
    }

    #[test]
    fn test_deterministic_argmax_prefers_lowest_index_on_tie() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        let a = g.index_of(Coord::new(1, 1));
        let b = g.index_of(Coord::new(3, 3));
        logits[a] = 5.0;
        logits[b] = 5.0;
        let mv = decode(&logits, None, 0.0, true, Color::Black, &g, &mut rng()).unwrap();
        assert_eq!(mv.vertex, Vertex::Point(Coord::new(1, 1)));
    }

    #[test]
    fn test_deterministic_decode_is_repeatable() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        logits[g.index_of(Coord::new(2, 0))] = 3.0;
        let first = decode(&logits, None, 0.0, true, Color::White, &g, &mut rng()).unwrap();
        for _ in 0..10 {
            let again =
                decode(&logits, None, 0.0, true, Color::White, &g, &mut rng()).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_padding_mass_never_selected() {
        let g = geometry();
        let mut logits = vec![f32::NEG_INFINITY; g.policy_len()];
        // Huge mass on a padding-border cell, small mass on a real one.
        logits[0] = 100.0;
        let real = g.index_of(Coord::new(0, 0));
        logits[real] = 1.0;
        let mv = decode(&logits, None, 0.0, true, Color::Black, &g, &mut rng()).unwrap();
        assert_eq!(mv.vertex, Vertex::Point(Coord::new(0, 0)));
    }

    #[test]
    fn test_mask_zeroes_cells_not_log_suppresses() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        let blocked = Coord::new(2, 2);
        logits[g.index_of(blocked)] = 50.0;
        let mut mask = vec![true; g.width * g.height];
        mask[blocked.y * g.width + blocked.x] = false;
        let mv = decode(&logits, Some(&mask), 0.0, true, Color::Black, &g, &mut rng()).unwrap();
        assert_ne!(mv.vertex, Vertex::Point(blocked));
    }

    #[test]
    fn test_forced_pass_at_any_temperature() {
        let g = geometry();
        let mut logits = vec![f32::NEG_INFINITY; g.policy_len()];
        logits[g.pass_index()] = 0.0;
        for temperature in [0.0, 0.5, 1.0, 2.0] {
            let mv = decode(
                &logits,
                None,
                temperature,
                true,
                Color::Black,
                &g,
                &mut rng(),
            )
            .unwrap();
            assert_eq!(mv.vertex, Vertex::Pass, "temperature {temperature}");
        }
    }

    #[test]
    fn test_disallowed_pass_is_never_chosen() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        logits[g.pass_index()] = 100.0;
        let mv = decode(&logits, None, 0.0, false, Color::Black, &g, &mut rng()).unwrap();
        assert_ne!(mv.vertex, Vertex::Pass);
    }

    #[test]
    fn test_all_mass_masked_is_no_legal_move() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        logits[g.pass_index()] = f32::NEG_INFINITY;
        let mask = vec![false; g.width * g.height];
        let err = decode(&logits, Some(&mask), 0.0, false, Color::Black, &g, &mut rng())
            .unwrap_err();
        assert_eq!(err, PolicyError::NoLegalMove);
    }

    #[test]
    fn test_sampling_is_reproducible_with_equal_seeds() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        logits[g.index_of(Coord::new(1, 2))] = 2.0;
        logits[g.index_of(Coord::new(3, 1))] = 2.0;
        let a = decode(&logits, None, 1.0, true, Color::Black, &g, &mut rng()).unwrap();
        let b = decode(&logits, None, 1.0, true, Color::Black, &g, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_low_temperature_sampling_tracks_the_maximum() {
        let g = geometry();
        let mut logits = flat_logits(&g);
        let peak = Coord::new(2, 3);
        logits[g.index_of(peak)] = 8.0;
        // At a tiny temperature the rescaled distribution is nearly a point
        // mass; every draw should hit the peak.
        for seed in 0..20 {
            let mut r = StdRng::seed_from_u64(seed);
            let mv = decode(&logits, None, 0.01, true, Color::Black, &g, &mut r).unwrap();
            assert_eq!(mv.vertex, Vertex::Point(peak));
        }
    }

    #[test]
    #[should_panic(expected = "policy vector length")]
    fn test_wrong_length_is_a_programming_error() {
        let g = geometry();
        let logits = vec![0.0; 3];
        let _ = decode(&logits, None, 0.0, true, Color::Black, &g, &mut rng());
    }
}
