//! The board collaborator: colors, moves, and the narrow engine interface
//! the session drives.
//!
//! The GTP core never reaches into board internals; everything goes through
//! [`BoardEngine`]. [`SimpleBoard`] is the bundled implementation (stone
//! placement, flood-fill capture, suicide rejection and single-point ko),
//! enough to host real games and the full test suite. A stronger external
//! engine plugs in by implementing the same trait.

use std::fmt::Write as _;

use thiserror::Error;

use crate::constants::GTP_COLUMNS;
use crate::coords::{Coord, Geometry, Vertex};

/// Stone color. Black moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other color. Total: every color has an opposite.
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a GTP color argument: "b"/"black" or "w"/"white", any case.
    pub fn from_gtp(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A move: a color plus either a board point or pass. The pass/point split
/// is structural, so pass moves cannot leak a stale coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub color: Color,
    pub vertex: Vertex,
}

impl Move {
    pub fn place(color: Color, coord: Coord) -> Self {
        Self {
            color,
            vertex: Vertex::Point(coord),
        }
    }

    pub fn pass(color: Color) -> Self {
        Self {
            color,
            vertex: Vertex::Pass,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.vertex, Vertex::Pass)
    }
}

/// Result of attempting to place a stone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: point not empty")]
    Occupied,

    #[error("illegal move: retakes ko")]
    Ko,

    #[error("illegal move: suicide")]
    Suicide,

    #[error("illegal move: outside the board")]
    OutOfBounds,
}

/// The narrow interface the GTP session, handicap planner and self-play
/// loop consume. Mirrors what any full-strength engine exposes.
pub trait BoardEngine {
    /// Construct a fresh board of the given geometry.
    fn with_size(geometry: Geometry, komi: f32) -> Self
    where
        Self: Sized;

    /// Apply a move under normal play rules.
    fn play(&mut self, mv: Move) -> Result<(), MoveError>;

    /// Whether a move would be accepted by [`BoardEngine::play`] right now.
    fn is_legal(&self, mv: &Move) -> bool;

    /// Place a stone outside normal turn order (handicap setup). Does not
    /// flip the side to move and does not touch ko state. Pass is a no-op.
    fn setup_move(&mut self, mv: Move) -> Result<(), MoveError>;

    /// Reset to an empty board, keeping geometry and komi.
    fn reset(&mut self);

    /// Current board geometry (dimensions plus predictor padding).
    fn geometry(&self) -> Geometry;

    fn komi(&self) -> f32;

    fn set_komi(&mut self, komi: f32);

    /// Debug rendering for `showboard` and logs.
    fn render(&self) -> String;

    /// Per-cell legality of placements for `color`, indexed `y * width + x`.
    /// Pass is not part of the mask; it stays legal unless the decoder is
    /// told otherwise.
    fn legality_mask(&self, color: Color) -> Vec<bool> {
        let geometry = self.geometry();
        let mut mask = Vec::with_capacity(geometry.width * geometry.height);
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                let mv = Move::place(color, Coord::new(x, y));
                mask.push(self.is_legal(&mv));
            }
        }
        mask
    }
}

/// Bundled board implementation.
///
/// Stones live in a flat `Vec<Option<Color>>`; captures and liberty counts
/// use flood fill over orthogonal neighbors. Ko is the single-point rule:
/// capturing exactly one stone inside an enemy eye marks the captured point
/// forbidden for the immediately following move.
pub struct SimpleBoard {
    geometry: Geometry,
    cells: Vec<Option<Color>>,
    komi: f32,
    ko: Option<Coord>,
}

impl SimpleBoard {
    pub fn new(geometry: Geometry, komi: f32) -> Self {
        Self {
            cells: vec![None; geometry.width * geometry.height],
            geometry,
            komi,
            ko: None,
        }
    }

    fn idx(&self, coord: Coord) -> usize {
        coord.y * self.geometry.width + coord.x
    }

    pub fn get(&self, coord: Coord) -> Option<Color> {
        if !self.geometry.contains(coord) {
            return None;
        }
        self.cells[self.idx(coord)]
    }

    fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        let Coord { x, y } = coord;
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(Coord::new(x - 1, y));
        }
        if x + 1 < self.geometry.width {
            out.push(Coord::new(x + 1, y));
        }
        if y > 0 {
            out.push(Coord::new(x, y - 1));
        }
        if y + 1 < self.geometry.height {
            out.push(Coord::new(x, y + 1));
        }
        out
    }

    /// Whether every neighbor of `coord` is a stone of `by`'s opponent.
    /// Used for ko detection before the stone goes down.
    fn is_enemy_eye(&self, coord: Coord, by: Color) -> bool {
        let enemy = by.opposite();
        self.neighbors(coord)
            .into_iter()
            .all(|n| self.get(n) == Some(enemy))
    }

    /// Flood-fill the group containing `start`, appending its stones to
    /// `out`. Returns the group size.
    fn collect_group(&self, start: Coord, out: &mut Vec<Coord>) -> usize {
        let color = match self.get(start) {
            Some(c) => c,
            None => return 0,
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut count = 0;
        while let Some(c) = stack.pop() {
            let i = self.idx(c);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(c) == Some(color) {
                out.push(c);
                count += 1;
                for n in self.neighbors(c) {
                    if !visited[self.idx(n)] && self.get(n) == Some(color) {
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    /// Count distinct empty points adjacent to the group containing `start`.
    fn group_liberties(&self, start: Coord) -> usize {
        let color = match self.get(start) {
            Some(c) => c,
            None => return 0,
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut liberty_seen = vec![false; self.cells.len()];
        let mut liberties = 0;
        while let Some(c) = stack.pop() {
            let i = self.idx(c);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.neighbors(c) {
                let ni = self.idx(n);
                match self.get(n) {
                    None => {
                        if !liberty_seen[ni] {
                            liberty_seen[ni] = true;
                            liberties += 1;
                        }
                    }
                    Some(nc) if nc == color && !visited[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        liberties
    }

    fn place_stone(&mut self, coord: Coord, color: Color) -> Result<(), MoveError> {
        if !self.geometry.contains(coord) {
            return Err(MoveError::OutOfBounds);
        }
        if self.get(coord).is_some() {
            return Err(MoveError::Occupied);
        }
        if self.ko == Some(coord) {
            return Err(MoveError::Ko);
        }

        let into_enemy_eye = self.is_enemy_eye(coord, color);

        let idx = self.idx(coord);
        self.cells[idx] = Some(color);

        // Remove opponent groups left without liberties.
        let enemy = color.opposite();
        let mut captured: Vec<Coord> = Vec::new();
        for n in self.neighbors(coord) {
            if self.get(n) == Some(enemy) && self.group_liberties(n) == 0 {
                self.collect_group(n, &mut captured);
            }
        }
        for &c in &captured {
            let i = self.idx(c);
            self.cells[i] = None;
        }

        if captured.is_empty() && self.group_liberties(coord) == 0 {
            self.cells[idx] = None;
            return Err(MoveError::Suicide);
        }

        self.ko = if captured.len() == 1 && into_enemy_eye {
            Some(captured[0])
        } else {
            None
        };
        Ok(())
    }
}

impl BoardEngine for SimpleBoard {
    fn with_size(geometry: Geometry, komi: f32) -> Self {
        SimpleBoard::new(geometry, komi)
    }

    fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        match mv.vertex {
            Vertex::Pass => {
                // Ko is cleared on pass.
                self.ko = None;
                Ok(())
            }
            Vertex::Point(coord) => self.place_stone(coord, mv.color),
        }
    }

    fn is_legal(&self, mv: &Move) -> bool {
        match mv.vertex {
            Vertex::Pass => true,
            Vertex::Point(coord) => {
                if !self.geometry.contains(coord)
                    || self.get(coord).is_some()
                    || self.ko == Some(coord)
                {
                    return false;
                }
                // Trial placement on a scratch copy; captures make some
                // zero-liberty placements legal, so occupancy alone is not
                // enough.
                let mut scratch = SimpleBoard {
                    geometry: self.geometry,
                    cells: self.cells.clone(),
                    komi: self.komi,
                    ko: self.ko,
                };
                scratch.place_stone(coord, mv.color).is_ok()
            }
        }
    }

    fn setup_move(&mut self, mv: Move) -> Result<(), MoveError> {
        match mv.vertex {
            Vertex::Pass => Ok(()),
            Vertex::Point(coord) => {
                if !self.geometry.contains(coord) {
                    return Err(MoveError::OutOfBounds);
                }
                if self.get(coord).is_some() {
                    return Err(MoveError::Occupied);
                }
                let idx = self.idx(coord);
                self.cells[idx] = Some(mv.color);
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.cells.fill(None);
        self.ko = None;
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn komi(&self) -> f32 {
        self.komi
    }

    fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for y in 0..self.geometry.height {
            let row = self.geometry.height - y;
            let _ = write!(out, "{row:>2} ");
            for x in 0..self.geometry.width {
                let ch = match self.get(Coord::new(x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                out.push(ch);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("   ");
        for x in 0..self.geometry.width {
            out.push(GTP_COLUMNS[x] as char);
            out.push(' ');
        }
        out
    }
}
