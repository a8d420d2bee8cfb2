//! Go Text Protocol (GTP) session.
//!
//! GTP is a line-based protocol: one command in, one reply out, every reply
//! terminated by a blank line. This module implements GTP version 2 so the
//! engine can sit behind Sabaki, GoGui, or a tournament manager.
//!
//! Each command handler returns `Result<String, GtpError>`; the dispatcher
//! turns an `Ok` into `= ...` and matches the error kind into the exact
//! `? ...` text. Collaborator failures are caught at this boundary and
//! reported as `? internal error: ...`; the session keeps running. Only
//! `quit`, end of input, or the cooperative stop flag end the loop.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::board::{BoardEngine, Color, Move};
use crate::constants::{ENGINE_NAME, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::coords::{Geometry, Vertex, format_vertex, parse_vertex};
use crate::error::{HandicapError, PolicyError};
use crate::handicap;
use crate::policy;
use crate::predictor::Predictor;

/// The list of supported GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "fixed_handicap",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "place_free_handicap",
    "play",
    "protocol_version",
    "quit",
    "set_free_handicap",
    "showboard",
    "version",
];

/// Everything a command handler can report back. The `Display` text is the
/// reply body after `? `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GtpError {
    /// Wrong argument count; the expected count is spelled out in words.
    #[error("{command} requires {expected}")]
    MissingArguments {
        command: &'static str,
        expected: &'static str,
    },

    #[error("unacceptable size")]
    UnacceptableSize,

    #[error("invalid color")]
    InvalidColor,

    #[error("invalid komi")]
    InvalidKomi,

    #[error("invalid vertex")]
    InvalidVertex,

    #[error("illegal move")]
    IllegalMove,

    #[error("invalid number of handicap stones")]
    BadHandicap,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Catch-all for unexpected collaborator failures.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A GTP session: the board, the predictor, and the sampling knobs.
///
/// Single-threaded and synchronous: the only suspension point is the
/// blocking read of the next line. The `running` flag is cooperative: a
/// signal handler may clear it, and the loop checks it before each read.
pub struct GtpSession<B: BoardEngine, P: Predictor> {
    board: B,
    predictor: P,
    temperature: f32,
    rng: StdRng,
    running: Arc<AtomicBool>,
}

impl<B: BoardEngine, P: Predictor> GtpSession<B, P> {
    /// Create a session around an existing board and predictor. `seed`
    /// makes temperature sampling reproducible.
    pub fn new(board: B, predictor: P, temperature: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            board,
            predictor,
            temperature,
            rng,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for cooperative shutdown: clearing the flag stops the read
    /// loop before its next command. An in-flight command is not
    /// interrupted.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Run the command loop over stdin/stdout until `quit`, EOF, or the
    /// stop flag.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_io(stdin.lock(), stdout.lock())
    }

    /// Same loop over arbitrary streams; tests drive this directly.
    pub fn run_io<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
            let line = line?;
            let Some((reply, keep_going)) = self.handle_line(&line) else {
                continue;
            };
            write!(output, "{reply}\n\n")?;
            output.flush()?;
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Process one input line into a formatted reply (without the trailing
    /// blank line). `None` for empty lines and `#` comments; the bool is
    /// false once the session should stop.
    pub fn handle_line(&mut self, line: &str) -> Option<(String, bool)> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (id, rest) = parse_id(line);
        let mut parts = rest.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let args: Vec<&str> = parts.collect();

        let result = self.execute(&command, &args);
        let id_str = id.map(|i| i.to_string()).unwrap_or_default();
        let reply = match &result {
            Ok(msg) if msg.is_empty() => format!("={id_str}"),
            Ok(msg) => format!("={id_str} {msg}"),
            Err(e) => format!("?{id_str} {e}"),
        };
        let keep_going = !(command == "quit" && result.is_ok());
        Some((reply, keep_going))
    }

    /// Execute a single command. Exposed so tests and embedders can drive
    /// the session without the I/O loop.
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Result<String, GtpError> {
        match command {
            "protocol_version" => Ok("2".to_string()),

            "name" => Ok(ENGINE_NAME.to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let arg = require_one(args, "known_command")?;
                let known = KNOWN_COMMANDS.contains(&arg.to_lowercase().as_str());
                Ok(if known { "true" } else { "false" }.to_string())
            }

            "boardsize" => {
                let arg = require_one(args, "boardsize")?;
                let size: usize = arg.parse().map_err(|_| GtpError::UnacceptableSize)?;
                if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
                    return Err(GtpError::UnacceptableSize);
                }
                // Replace the board, preserving komi.
                let komi = self.board.komi();
                self.board = B::with_size(Geometry::new(size, size), komi);
                Ok(String::new())
            }

            "clear_board" => {
                self.board.reset();
                Ok(String::new())
            }

            "komi" => {
                let arg = require_one(args, "komi")?;
                let komi: f32 = arg.parse().map_err(|_| GtpError::InvalidKomi)?;
                self.board.set_komi(komi);
                Ok(String::new())
            }

            "play" => {
                if args.len() < 2 {
                    return Err(GtpError::MissingArguments {
                        command: "play",
                        expected: "two arguments",
                    });
                }
                let color = Color::from_gtp(args[0]).ok_or(GtpError::InvalidColor)?;
                let vertex = parse_vertex(args[1], &self.board.geometry())
                    .map_err(|_| GtpError::InvalidVertex)?;
                let mv = Move { color, vertex };
                if !self.board.is_legal(&mv) {
                    return Err(GtpError::IllegalMove);
                }
                self.board
                    .play(mv)
                    .map_err(|e| GtpError::Internal(e.to_string()))?;
                Ok(String::new())
            }

            "genmove" => {
                let arg = require_one(args, "genmove")?;
                let color = Color::from_gtp(arg).ok_or(GtpError::InvalidColor)?;
                self.generate_move(color)
            }

            "fixed_handicap" => {
                let arg = require_one(args, "fixed_handicap")?;
                let stones: usize = arg.parse().map_err(|_| GtpError::BadHandicap)?;
                let coords =
                    handicap::fixed_handicap(stones, &self.board).map_err(map_handicap)?;
                for &coord in &coords {
                    self.board
                        .setup_move(Move::place(Color::Black, coord))
                        .map_err(|e| GtpError::Internal(e.to_string()))?;
                }
                Ok(self.join_vertices(&coords))
            }

            "place_free_handicap" => {
                let arg = require_one(args, "place_free_handicap")?;
                let stones: usize = arg.parse().map_err(|_| GtpError::BadHandicap)?;
                let coords = handicap::place_free_handicap(
                    stones,
                    &mut self.board,
                    &mut self.predictor,
                    self.temperature,
                    &mut self.rng,
                )
                .map_err(map_handicap)?;
                Ok(self.join_vertices(&coords))
            }

            "set_free_handicap" => {
                if args.is_empty() {
                    return Err(GtpError::MissingArguments {
                        command: "set_free_handicap",
                        expected: "at least one argument",
                    });
                }
                let geometry = self.board.geometry();
                let mut coords = Vec::with_capacity(args.len());
                for arg in args {
                    // A setup stone cannot be a pass.
                    match parse_vertex(arg, &geometry) {
                        Ok(Vertex::Point(coord)) => coords.push(coord),
                        Ok(Vertex::Pass) | Err(_) => return Err(GtpError::InvalidVertex),
                    }
                }
                for coord in coords {
                    self.board
                        .setup_move(Move::place(Color::Black, coord))
                        .map_err(|e| GtpError::Internal(e.to_string()))?;
                }
                Ok(String::new())
            }

            "showboard" => Ok(format!("\n{}", self.board.render())),

            "quit" => Ok(String::new()),

            _ => Err(GtpError::UnknownCommand(command.to_string())),
        }
    }

    /// genmove body: predictor → decoder → board, replying with the vertex.
    fn generate_move(&mut self, color: Color) -> Result<String, GtpError> {
        let geometry = self.board.geometry();
        let prediction = self
            .predictor
            .predict(&self.board, color, self.temperature, true)
            .map_err(|e| GtpError::Internal(e.to_string()))?;
        let mask = self.board.legality_mask(color);
        let mv = policy::decode(
            &prediction.policy,
            Some(&mask),
            self.temperature,
            true,
            color,
            &geometry,
            &mut self.rng,
        )
        // Pass was available, so running dry or an off-board index is an
        // engine defect, not the user's.
        .map_err(|e: PolicyError| GtpError::Internal(e.to_string()))?;
        // The decoded move honors the legality mask, so a rejection here is
        // internal as well.
        self.board
            .play(mv)
            .map_err(|e| GtpError::Internal(e.to_string()))?;
        debug!("value estimate for {color}: {:.3}", prediction.value);
        debug!("board after genmove:\n{}", self.board.render());
        Ok(format_vertex(mv.vertex, &geometry))
    }

    fn join_vertices(&self, coords: &[crate::coords::Coord]) -> String {
        let geometry = self.board.geometry();
        coords
            .iter()
            .map(|&c| format_vertex(Vertex::Point(c), &geometry))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn require_one<'a>(args: &[&'a str], command: &'static str) -> Result<&'a str, GtpError> {
    args.first().copied().ok_or(GtpError::MissingArguments {
        command,
        expected: "one argument",
    })
}

fn map_handicap(e: HandicapError) -> GtpError {
    match e {
        HandicapError::Unsupported | HandicapError::InvalidCount => GtpError::BadHandicap,
        HandicapError::Placement(msg) => GtpError::Internal(msg),
    }
}

/// Parse an optional numeric command ID from the beginning of the line.
fn parse_id(line: &str) -> (Option<u32>, &str) {
    let trimmed = line.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    if end > 0 {
        if let Ok(id) = trimmed[..end].parse::<u32>() {
            return (Some(id), trimmed[end..].trim());
        }
    }
    (None, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SimpleBoard;
    use crate::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI};
    use crate::predictor::UniformPredictor;

    fn session() -> GtpSession<SimpleBoard, UniformPredictor> {
        let board = SimpleBoard::new(
            Geometry::new(DEFAULT_BOARD_SIZE, DEFAULT_BOARD_SIZE),
            DEFAULT_KOMI,
        );
        GtpSession::new(board, UniformPredictor::seeded(9), 0.0, Some(9))
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_protocol_version_and_name() {
        let mut s = session();
        assert_eq!(s.execute("protocol_version", &[]).unwrap(), "2");
        assert_eq!(s.execute("name", &[]).unwrap(), ENGINE_NAME);
        assert!(!s.execute("version", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_known_command() {
        let mut s = session();
        assert_eq!(s.execute("known_command", &["play"]).unwrap(), "true");
        assert_eq!(s.execute("known_command", &["undo"]).unwrap(), "false");
        assert_eq!(
            s.execute("known_command", &[]),
            Err(GtpError::MissingArguments {
                command: "known_command",
                expected: "one argument",
            })
        );
    }

    #[test]
    fn test_list_commands_covers_the_table() {
        let mut s = session();
        let listing = s.execute("list_commands", &[]).unwrap();
        for cmd in KNOWN_COMMANDS {
            assert!(listing.contains(cmd), "missing {cmd}");
        }
    }

    #[test]
    fn test_boardsize_replaces_board_and_keeps_komi() {
        let mut s = session();
        s.execute("komi", &["5.5"]).unwrap();
        s.execute("boardsize", &["9"]).unwrap();
        assert_eq!(s.board().geometry().width, 9);
        assert_eq!(s.board().komi(), 5.5);
    }

    #[test]
    fn test_boardsize_out_of_range() {
        let mut s = session();
        s.execute("play", &["b", "D4"]).unwrap();
        for arg in ["0", "26", "x"] {
            assert_eq!(
                s.execute("boardsize", &[arg]),
                Err(GtpError::UnacceptableSize)
            );
        }
        // The prior board survives a rejected resize, stones included.
        assert_eq!(s.board().geometry().width, DEFAULT_BOARD_SIZE);
        assert_eq!(s.execute("play", &["w", "D4"]), Err(GtpError::IllegalMove));
    }

    #[test]
    fn test_play_argument_validation() {
        let mut s = session();
        assert_eq!(
            s.execute("play", &["b"]),
            Err(GtpError::MissingArguments {
                command: "play",
                expected: "two arguments",
            })
        );
        assert_eq!(s.execute("play", &["q", "D4"]), Err(GtpError::InvalidColor));
        assert_eq!(s.execute("play", &["b", "I5"]), Err(GtpError::InvalidVertex));
        assert_eq!(s.execute("play", &["b", "Z99"]), Err(GtpError::InvalidVertex));
    }

    #[test]
    fn test_play_pass_and_illegal_move() {
        let mut s = session();
        s.execute("play", &["b", "pass"]).unwrap();
        s.execute("play", &["w", "Q16"]).unwrap();
        assert_eq!(
            s.execute("play", &["b", "Q16"]),
            Err(GtpError::IllegalMove)
        );
    }

    #[test]
    fn test_genmove_replies_with_a_vertex_and_plays_it() {
        let mut s = session();
        let reply = s.execute("genmove", &["b"]).unwrap();
        if reply != "pass" {
            // The move is on the board now, so playing it again is illegal.
            assert_eq!(
                s.execute("play", &["w", &reply]),
                Err(GtpError::IllegalMove)
            );
        }
    }

    #[test]
    fn test_set_free_handicap_rejects_pass() {
        let mut s = session();
        assert_eq!(
            s.execute("set_free_handicap", &["D4", "pass"]),
            Err(GtpError::InvalidVertex)
        );
        assert_eq!(
            s.execute("set_free_handicap", &[]),
            Err(GtpError::MissingArguments {
                command: "set_free_handicap",
                expected: "at least one argument",
            })
        );
        s.execute("set_free_handicap", &["D4", "Q16"]).unwrap();
    }

    #[test]
    fn test_unknown_command_reply() {
        let mut s = session();
        assert_eq!(
            s.execute("undo", &[]),
            Err(GtpError::UnknownCommand("undo".to_string()))
        );
    }

    #[test]
    fn test_handle_line_formats_replies() {
        let mut s = session();
        let (reply, keep_going) = s.handle_line("play b").unwrap();
        assert_eq!(reply, "? play requires two arguments");
        assert!(keep_going);

        let (reply, _) = s.handle_line("7 protocol_version").unwrap();
        assert_eq!(reply, "=7 2");

        let (reply, keep_going) = s.handle_line("quit").unwrap();
        assert_eq!(reply, "=");
        assert!(!keep_going);

        assert!(s.handle_line("").is_none());
        assert!(s.handle_line("# comment").is_none());
    }

    #[test]
    fn test_run_io_blank_line_terminated_replies() {
        let mut s = session();
        let input = b"name\nquit\nplay b D4\n" as &[u8];
        let mut output = Vec::new();
        s.run_io(input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        // quit stops the loop; the play line is never processed.
        assert_eq!(text, format!("= {ENGINE_NAME}\n\n=\n\n"));
    }
}
