//! Coordinate conversions between the three incompatible spaces the engine
//! straddles:
//!
//! - **GTP vertex text** ("D4", "pass"): columns A-Z skipping 'I', rows
//!   counted from the bottom starting at 1.
//! - **Logical coordinates** ([`Coord`]): 0-based (x, y) with y = 0 at the
//!   top row, so GTP row H is y = 0.
//! - **Memory-grid indices**: the predictor's padded square grid of side
//!   `data_size = width + 2 * pad`, flattened row-major, with the final
//!   index `data_size * data_size` reserved for pass.
//!
//! [`Geometry`] is the single authority for the index math; nothing else in
//! the crate computes a memory index, which keeps the padded scheme from
//! being mixed with an unpadded one.

use std::fmt;

use crate::constants::{GTP_COLUMNS, PAD};
use crate::error::CoordError;

/// A point on the logical board. `x` grows to the right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A GTP vertex: either a board point or the pass sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    Pass,
    Point(Coord),
}

/// Board dimensions plus the predictor's padding border.
///
/// `data_size` is always derived, never stored, so it cannot drift from the
/// width it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub pad: usize,
}

impl Geometry {
    /// Geometry with the crate-wide predictor padding.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_pad(width, height, PAD)
    }

    /// Geometry with an explicit padding border (tests exercise several).
    pub fn with_pad(width: usize, height: usize, pad: usize) -> Self {
        Self { width, height, pad }
    }

    /// Side length of the padded memory grid.
    pub fn data_size(&self) -> usize {
        self.width + 2 * self.pad
    }

    /// Length of a policy vector over this geometry: one slot per padded
    /// grid cell plus the pass slot.
    pub fn policy_len(&self) -> usize {
        let ds = self.data_size();
        ds * ds + 1
    }

    /// The reserved pass index, one past the last grid cell.
    pub fn pass_index(&self) -> usize {
        let ds = self.data_size();
        ds * ds
    }

    /// Whether a logical coordinate lies on the board.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Memory-grid index of a logical coordinate: `(y+pad)*ds + (x+pad)`.
    pub fn index_of(&self, coord: Coord) -> usize {
        debug_assert!(self.contains(coord));
        (coord.y + self.pad) * self.data_size() + (coord.x + self.pad)
    }

    /// Inverse of [`Geometry::index_of`], with the pass slot mapped to
    /// [`Vertex::Pass`].
    ///
    /// # Errors
    /// [`CoordError::OutOfRange`] if the index lands in the padding border
    /// or past the pass slot. Such indices exist in every policy vector but
    /// must never reach this call; the decoder suppresses them.
    pub fn vertex_at(&self, index: usize) -> Result<Vertex, CoordError> {
        if index == self.pass_index() {
            return Ok(Vertex::Pass);
        }
        if index > self.pass_index() {
            return Err(CoordError::OutOfRange { index });
        }
        let ds = self.data_size();
        let (mem_x, mem_y) = (index % ds, index / ds);
        if mem_x < self.pad || mem_y < self.pad {
            return Err(CoordError::OutOfRange { index });
        }
        let coord = Coord::new(mem_x - self.pad, mem_y - self.pad);
        if !self.contains(coord) {
            return Err(CoordError::OutOfRange { index });
        }
        Ok(Vertex::Point(coord))
    }
}

/// Parse a GTP vertex token ("D4", "pass") into a [`Vertex`].
///
/// Case-insensitive. The letter 'I' is rejected outright; letters past it
/// shift down one column so that H5 and J5 are adjacent.
///
/// # Errors
/// [`CoordError::Parse`] on an empty token, a non-letter first character,
/// a non-numeric remainder, or a row/column outside the board.
pub fn parse_vertex(token: &str, geometry: &Geometry) -> Result<Vertex, CoordError> {
    let parse_err = || CoordError::Parse {
        token: token.to_string(),
    };

    if token.eq_ignore_ascii_case("pass") {
        return Ok(Vertex::Pass);
    }

    let mut chars = token.chars();
    let letter = chars.next().ok_or_else(parse_err)?.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() || letter == 'I' {
        return Err(parse_err());
    }

    let mut x = (letter as u8 - b'A') as usize;
    if letter > 'I' {
        x -= 1;
    }
    if x >= geometry.width {
        return Err(parse_err());
    }

    let row: usize = chars.as_str().parse().map_err(|_| parse_err())?;
    if row < 1 || row > geometry.height {
        return Err(parse_err());
    }

    Ok(Vertex::Point(Coord::new(x, geometry.height - row)))
}

/// Render a [`Vertex`] as GTP text, re-adding the 'I' skip.
pub fn format_vertex(vertex: Vertex, geometry: &Geometry) -> String {
    match vertex {
        Vertex::Pass => "pass".to_string(),
        Vertex::Point(coord) => {
            debug_assert!(geometry.contains(coord));
            let letter = GTP_COLUMNS[coord.x] as char;
            format!("{letter}{}", geometry.height - coord.y)
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
