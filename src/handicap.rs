//! Handicap placement: the fixed 19x19 star-point table and predictor-driven
//! free placement.

use rand::Rng;

use crate::board::{BoardEngine, Color, Move};
use crate::coords::{Coord, Vertex};
use crate::error::HandicapError;
use crate::policy;
use crate::predictor::Predictor;

/// Star-point layouts for 2..=9 handicap stones on 19x19, in reply order.
/// Coordinates are 0-based logical (x, y) with y = 0 at the top, so (3, 3)
/// is D16 and (3, 15) is D4.
fn fixed_points(stones: usize) -> Option<&'static [(usize, usize)]> {
    match stones {
        2 => Some(&[(3, 15), (15, 3)]),
        3 => Some(&[(3, 15), (15, 3), (15, 15)]),
        4 => Some(&[(3, 3), (3, 15), (15, 3), (15, 15)]),
        5 => Some(&[(3, 3), (3, 15), (9, 9), (15, 3), (15, 15)]),
        6 => Some(&[(3, 3), (3, 15), (9, 3), (9, 15), (15, 3), (15, 15)]),
        7 => Some(&[
            (3, 3),
            (3, 15),
            (9, 3),
            (9, 9),
            (9, 15),
            (15, 3),
            (15, 15),
        ]),
        8 => Some(&[
            (3, 3),
            (3, 9),
            (3, 15),
            (9, 3),
            (9, 15),
            (15, 3),
            (15, 9),
            (15, 15),
        ]),
        9 => Some(&[
            (3, 3),
            (3, 9),
            (3, 15),
            (9, 3),
            (9, 9),
            (9, 15),
            (15, 3),
            (15, 9),
            (15, 15),
        ]),
        _ => None,
    }
}

/// Look up the fixed-handicap points for `stones` on the given board.
///
/// # Errors
/// [`HandicapError::Unsupported`] unless `stones` is in 2..=9 and the board
/// is 19x19. The board is untouched either way; applying the stones is the
/// caller's move.
pub fn fixed_handicap<B: BoardEngine + ?Sized>(
    stones: usize,
    board: &B,
) -> Result<Vec<Coord>, HandicapError> {
    let geometry = board.geometry();
    if geometry.width != 19 || geometry.height != 19 {
        return Err(HandicapError::Unsupported);
    }
    let points = fixed_points(stones).ok_or(HandicapError::Unsupported)?;
    Ok(points.iter().map(|&(x, y)| Coord::new(x, y)).collect())
}

/// Let the predictor pick `stones` free handicap placements for Black.
///
/// Each round queries the predictor with pass disabled, decodes against the
/// board's current legality mask, and applies the stone via `setup_move`
/// (normal turn alternation is bypassed). The coordinates are returned in
/// placement order; none of them can be a pass.
///
/// # Errors
/// [`HandicapError::InvalidCount`] for fewer than two stones;
/// [`HandicapError::Placement`] if the predictor, the decoder, or the setup
/// operation fails mid-sequence. Decoded placements are legal at call
/// time, so a setup failure is an internal error, not a user one.
pub fn place_free_handicap<B, P, R>(
    stones: usize,
    board: &mut B,
    predictor: &mut P,
    temperature: f32,
    rng: &mut R,
) -> Result<Vec<Coord>, HandicapError>
where
    B: BoardEngine,
    P: Predictor + ?Sized,
    R: Rng,
{
    if stones < 2 {
        return Err(HandicapError::InvalidCount);
    }

    let internal = |e: &dyn std::fmt::Display| HandicapError::Placement(e.to_string());

    let geometry = board.geometry();
    let mut placed = Vec::with_capacity(stones);
    for _ in 0..stones {
        let prediction = predictor
            .predict(board, Color::Black, temperature, false)
            .map_err(|e| internal(&e))?;
        let mask = board.legality_mask(Color::Black);
        let mv = policy::decode(
            &prediction.policy,
            Some(&mask),
            temperature,
            false,
            Color::Black,
            &geometry,
            rng,
        )
        .map_err(|e| internal(&e))?;
        let coord = match mv.vertex {
            Vertex::Point(coord) => coord,
            // Pass is disabled above; reaching it means the decoder broke
            // its contract.
            Vertex::Pass => return Err(internal(&"decoder returned pass")),
        };
        board.setup_move(Move::place(Color::Black, coord)).map_err(|e| internal(&e))?;
        placed.push(coord);
    }
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SimpleBoard;
    use crate::coords::{Geometry, format_vertex};
    use crate::predictor::UniformPredictor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board19() -> SimpleBoard {
        SimpleBoard::new(Geometry::new(19, 19), 7.5)
    }

    #[test]
    fn test_four_stone_handicap_renders_star_points() {
        let board = board19();
        let coords = fixed_handicap(4, &board).unwrap();
        let rendered: Vec<String> = coords
            .iter()
            .map(|&c| format_vertex(Vertex::Point(c), &board.geometry()))
            .collect();
        assert_eq!(rendered, ["D16", "D4", "Q16", "Q4"]);
    }

    #[test]
    fn test_fixed_handicap_bounds() {
        let board = board19();
        for n in [0, 1, 10, 100] {
            assert_eq!(fixed_handicap(n, &board), Err(HandicapError::Unsupported));
        }
        for n in 2..=9 {
            assert_eq!(fixed_handicap(n, &board).unwrap().len(), n);
        }
    }

    #[test]
    fn test_fixed_handicap_requires_19x19() {
        let board = SimpleBoard::new(Geometry::new(9, 9), 7.5);
        assert_eq!(fixed_handicap(4, &board), Err(HandicapError::Unsupported));
    }

    #[test]
    fn test_free_handicap_rejects_small_counts() {
        let mut board = board19();
        let mut predictor = UniformPredictor::seeded(3);
        let mut rng = StdRng::seed_from_u64(3);
        for n in [0, 1] {
            assert_eq!(
                place_free_handicap(n, &mut board, &mut predictor, 0.0, &mut rng),
                Err(HandicapError::InvalidCount)
            );
        }
    }

    #[test]
    fn test_free_handicap_places_distinct_stones() {
        let mut board = board19();
        let mut predictor = UniformPredictor::seeded(11);
        let mut rng = StdRng::seed_from_u64(11);
        let coords =
            place_free_handicap(5, &mut board, &mut predictor, 0.5, &mut rng).unwrap();
        assert_eq!(coords.len(), 5);
        for (i, a) in coords.iter().enumerate() {
            assert_eq!(board.get(*a), Some(Color::Black));
            for b in &coords[i + 1..] {
                assert_ne!(a, b, "free handicap placed two stones on one point");
            }
        }
    }
}
