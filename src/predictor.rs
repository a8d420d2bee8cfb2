//! The predictor collaborator: a black-box function from board state to a
//! raw policy vector and a value estimate.
//!
//! The session never inspects model internals; it hands the board and the
//! side to move to [`Predictor::predict`] and gets back logits over the
//! padded memory grid plus the pass slot. Decoding those logits into a move
//! is the policy decoder's job, not the predictor's.

use crate::board::{BoardEngine, Color};
use crate::error::PredictError;

/// One prediction: unnormalized logits of length
/// [`Geometry::policy_len`](crate::coords::Geometry::policy_len), and a
/// scalar value estimate for the side to move.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub policy: Vec<f32>,
    pub value: f32,
}

/// A pluggable move-prediction backend.
///
/// `temperature` and `allow_pass` are forwarded as hints for backends that
/// condition on them; the decoder applies both authoritatively, so a backend
/// that ignores the hints is still correct.
pub trait Predictor {
    fn predict(
        &mut self,
        board: &dyn BoardEngine,
        to_play: Color,
        temperature: f32,
        allow_pass: bool,
    ) -> Result<Prediction, PredictError>;
}

/// Backend stand-in producing uniform random logits. Useful for wiring
/// tests, protocol smoke runs and unattended self-play without a trained
/// checkpoint.
pub struct UniformPredictor {
    rng: fastrand::Rng,
}

impl UniformPredictor {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Reproducible variant for tests and seeded self-play.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for UniformPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for UniformPredictor {
    fn predict(
        &mut self,
        board: &dyn BoardEngine,
        _to_play: Color,
        _temperature: f32,
        _allow_pass: bool,
    ) -> Result<Prediction, PredictError> {
        let len = board.geometry().policy_len();
        let policy = (0..len).map(|_| self.rng.f32()).collect();
        let value = self.rng.f32() * 2.0 - 1.0;
        Ok(Prediction { policy, value })
    }
}
