//! Error types shared across the engine core.
//!
//! Every failure the session can recover from is an explicit enum variant;
//! the GTP dispatcher matches on the kind to pick the reply text instead of
//! stringifying whatever bubbled up.

use thiserror::Error;

/// Failures of the coordinate codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// The token is not a well-formed GTP vertex for the current board:
    /// empty, non-letter first character, the forbidden letter 'I',
    /// a non-numeric remainder, or a row/column outside the board.
    #[error("invalid vertex: {token}")]
    Parse { token: String },

    /// A memory-grid index landed in the padding border or beyond the pass
    /// slot. The predictor emitted a non-board cell; such an index must
    /// never be selected by the decoder.
    #[error("policy index {index} maps outside the board")]
    OutOfRange { index: usize },
}

/// Failures of the policy decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Masking removed every bit of probability mass. Unreachable while
    /// pass stays legal; fatal for the engine if it does occur.
    #[error("no probability mass left after legality masking")]
    NoLegalMove,

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Failures of the handicap planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandicapError {
    /// Fixed handicap is a lookup table: only 2..=9 stones on 19x19.
    #[error("fixed handicap is only defined for 2..=9 stones on a 19x19 board")]
    Unsupported,

    /// Free handicap placement needs at least two stones.
    #[error("free handicap needs at least two stones")]
    InvalidCount,

    /// A placement that was decoded as legal could not be set up, or the
    /// predictor/decoder failed mid-sequence. Internal by definition.
    #[error("handicap placement failed: {0}")]
    Placement(String),
}

/// Failure of the predictor collaborator. The backend is a black box, so
/// everything it reports collapses into one message-carrying kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("predictor failure: {0}")]
pub struct PredictError(pub String);

/// Failures of the self-play loop, aggregated from its collaborators.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Decode(#[from] PolicyError),

    #[error("board rejected a decoded move: {0}")]
    Board(#[from] crate::board::MoveError),
}
