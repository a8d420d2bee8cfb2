//! GoNet-GTP: a GTP front end for a trained move-prediction model.
//!
//! The crate is the control layer between a Go client speaking the Go Text
//! Protocol and a policy network: it parses commands, keeps board/session
//! state, converts between GTP vertices, logical coordinates and the
//! predictor's padded memory grid, and turns a raw policy vector into one
//! legal move.
//!
//! ## Modules
//!
//! - [`constants`] - Geometry bounds, predictor padding, defaults
//! - [`coords`] - Vertex/coordinate/memory-index conversions
//! - [`board`] - Board collaborator trait and the bundled implementation
//! - [`predictor`] - Predictor collaborator trait and a uniform stand-in
//! - [`policy`] - Policy vector decoding (softmax, masking, temperature)
//! - [`handicap`] - Fixed and free handicap placement
//! - [`gtp`] - The GTP session state machine
//! - [`selfplay`] - Unattended self-play loop
//! - [`error`] - Error taxonomy shared across the core
//!
//! ## Example
//!
//! ```
//! use gonet_gtp::coords::{Geometry, Vertex, format_vertex, parse_vertex};
//!
//! let geometry = Geometry::new(19, 19);
//! let vertex = parse_vertex("D4", &geometry).unwrap();
//! assert_eq!(format_vertex(vertex, &geometry), "D4");
//! assert_eq!(parse_vertex("pass", &geometry).unwrap(), Vertex::Pass);
//! ```

pub mod board;
pub mod constants;
pub mod coords;
pub mod error;
pub mod gtp;
pub mod handicap;
pub mod policy;
pub mod predictor;
pub mod selfplay;
