//! Constants for board geometry, the predictor's feature grid, and defaults.
//!
//! The GTP layer is size-agnostic at runtime: `boardsize` may pick any side
//! length within [`MIN_BOARD_SIZE`, `MAX_BOARD_SIZE`]. The predictor works on
//! a padded square memory grid whose border width is fixed by the feature
//! encoding and shared by every model checkpoint (see [`PAD`]).

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest board side accepted by `boardsize`.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest board side accepted by `boardsize`. GTP coordinates only have
/// 25 usable column letters (A-Z without I), which caps the width.
pub const MAX_BOARD_SIZE: usize = 25;

/// Board side used at process start and by the self-play loop.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Padding border around the logical board in the predictor's memory grid.
/// Fixed by the feature encoding the model was trained with.
pub const PAD: usize = 1;

/// GTP column letters in order. 'I' is skipped by convention to avoid
/// confusion with 'J', leaving exactly [`MAX_BOARD_SIZE`] usable letters.
pub const GTP_COLUMNS: [u8; MAX_BOARD_SIZE] = *b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Session Defaults
// =============================================================================

/// Komi applied to a fresh board.
pub const DEFAULT_KOMI: f32 = 7.5;

/// Sampling temperature: near-deterministic but not exactly argmax.
pub const DEFAULT_TEMPERATURE: f32 = 0.01;

/// Move limit for unattended self-play games.
pub const DEFAULT_MAX_MOVES: usize = 400;

/// Engine identity reported by the GTP `name` command.
pub const ENGINE_NAME: &str = "GoNet";
