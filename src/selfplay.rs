//! Unattended self-play: the predictor plays both sides until two
//! consecutive passes or a move limit.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::board::{BoardEngine, Color};
use crate::coords::{Vertex, format_vertex};
use crate::error::SelfPlayError;
use crate::policy;
use crate::predictor::Predictor;

/// Why a self-play game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TwoConsecutivePasses,
    MoveLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TwoConsecutivePasses => write!(f, "two consecutive passes"),
            StopReason::MoveLimit => write!(f, "maximum moves reached"),
        }
    }
}

/// Outcome of one self-play game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfPlayOutcome {
    pub move_count: usize,
    pub reason: StopReason,
}

/// Drives repeated predict/decode/play cycles on its own board.
pub struct SelfPlayLoop<B: BoardEngine, P: Predictor> {
    board: B,
    predictor: P,
    temperature: f32,
    max_moves: usize,
    rng: StdRng,
}

impl<B: BoardEngine, P: Predictor> SelfPlayLoop<B, P> {
    pub fn new(
        board: B,
        predictor: P,
        temperature: f32,
        max_moves: usize,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            board,
            predictor,
            temperature,
            max_moves,
            rng,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Play one game to termination. Black moves first; passes count toward
    /// the move total, and two in a row end the game.
    pub fn run(&mut self) -> Result<SelfPlayOutcome, SelfPlayError> {
        let mut color = Color::Black;
        let mut consecutive_passes = 0usize;
        let mut move_count = 0usize;

        while move_count < self.max_moves && consecutive_passes < 2 {
            let geometry = self.board.geometry();
            let prediction =
                self.predictor
                    .predict(&self.board, color, self.temperature, true)?;
            let mask = self.board.legality_mask(color);
            let mv = policy::decode(
                &prediction.policy,
                Some(&mask),
                self.temperature,
                true,
                color,
                &geometry,
                &mut self.rng,
            )?;

            match mv.vertex {
                Vertex::Pass => consecutive_passes += 1,
                Vertex::Point(_) => consecutive_passes = 0,
            }

            self.board.play(mv)?;
            move_count += 1;
            info!(
                "move {move_count}: {color} plays {}",
                format_vertex(mv.vertex, &geometry)
            );
            debug!("value estimate: {:.3}", prediction.value);
            debug!("\n{}", self.board.render());

            color = color.opposite();
        }

        let reason = if consecutive_passes >= 2 {
            StopReason::TwoConsecutivePasses
        } else {
            StopReason::MoveLimit
        };
        info!("game over after {move_count} moves: {reason}");
        Ok(SelfPlayOutcome { move_count, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SimpleBoard;
    use crate::coords::Geometry;
    use crate::error::PredictError;
    use crate::predictor::Prediction;

    /// Predictor that always puts all its mass on the pass slot.
    struct AlwaysPass;

    impl Predictor for AlwaysPass {
        fn predict(
            &mut self,
            board: &dyn BoardEngine,
            _to_play: Color,
            _temperature: f32,
            _allow_pass: bool,
        ) -> Result<Prediction, PredictError> {
            let g = board.geometry();
            let mut policy = vec![f32::NEG_INFINITY; g.policy_len()];
            policy[g.pass_index()] = 0.0;
            Ok(Prediction { policy, value: 0.0 })
        }
    }

    /// Predictor whose pass slot never carries mass.
    struct NeverPass;

    impl Predictor for NeverPass {
        fn predict(
            &mut self,
            board: &dyn BoardEngine,
            _to_play: Color,
            _temperature: f32,
            _allow_pass: bool,
        ) -> Result<Prediction, PredictError> {
            let g = board.geometry();
            let mut policy = vec![0.0; g.policy_len()];
            policy[g.pass_index()] = f32::NEG_INFINITY;
            Ok(Prediction { policy, value: 0.0 })
        }
    }

    #[test]
    fn test_two_passes_end_the_game() {
        let board = SimpleBoard::new(Geometry::new(9, 9), 7.5);
        let mut game = SelfPlayLoop::new(board, AlwaysPass, 0.0, 100, Some(1));
        let outcome = game.run().unwrap();
        assert_eq!(outcome.reason, StopReason::TwoConsecutivePasses);
        assert_eq!(outcome.move_count, 2);
    }

    #[test]
    fn test_move_limit_ends_the_game() {
        let board = SimpleBoard::new(Geometry::new(9, 9), 7.5);
        let mut game = SelfPlayLoop::new(board, NeverPass, 1.0, 10, Some(5));
        let outcome = game.run().unwrap();
        assert_eq!(outcome.move_count, 10);
        assert_eq!(outcome.reason, StopReason::MoveLimit);
    }
}
