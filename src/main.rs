//! GoNet-GTP: GTP front end for a trained move-prediction model.
//!
//! ## Usage
//!
//! - `gonet-gtp` - Start the GTP server on stdin/stdout
//! - `gonet-gtp gtp` - Same, explicitly
//! - `gonet-gtp selfplay` - Play an unattended game against itself

use anyhow::Result;
use clap::{Parser, Subcommand};

use gonet_gtp::board::{BoardEngine, SimpleBoard};
use gonet_gtp::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_KOMI, DEFAULT_MAX_MOVES, DEFAULT_TEMPERATURE,
};
use gonet_gtp::coords::Geometry;
use gonet_gtp::gtp::GtpSession;
use gonet_gtp::predictor::UniformPredictor;
use gonet_gtp::selfplay::SelfPlayLoop;

/// GoNet-GTP: GTP front end for a move-prediction model
#[derive(Parser)]
#[command(name = "gonet-gtp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log at debug level (boards, value estimates) instead of info
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP server for use with GUI applications and managers
    Gtp {
        /// Temperature for move sampling (0 = deterministic argmax)
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Random seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Initial board side length
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,

        /// Initial komi
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f32,
    },
    /// Play one unattended game of self-play
    Selfplay {
        /// Temperature for move sampling (0 = deterministic argmax)
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of moves before the game is cut off
        #[arg(long, default_value_t = DEFAULT_MAX_MOVES)]
        max_moves: usize,

        /// Board side length
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,

        /// Komi
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    match cli.command {
        Some(Commands::Selfplay {
            temperature,
            seed,
            max_moves,
            size,
            komi,
        }) => run_selfplay(temperature, seed, max_moves, size, komi),
        Some(Commands::Gtp {
            temperature,
            seed,
            size,
            komi,
        }) => run_gtp(temperature, seed, size, komi),
        None => run_gtp(DEFAULT_TEMPERATURE, None, DEFAULT_BOARD_SIZE, DEFAULT_KOMI),
    }
}

/// Logging goes to stderr only: stdout belongs to the GTP stream.
fn init_logger(verbose: bool) -> Result<()> {
    use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

fn run_gtp(temperature: f32, seed: Option<u64>, size: usize, komi: f32) -> Result<()> {
    let board = SimpleBoard::with_size(Geometry::new(size, size), komi);
    let predictor = match seed {
        Some(seed) => UniformPredictor::seeded(seed),
        None => UniformPredictor::new(),
    };
    let mut session = GtpSession::new(board, predictor, temperature, seed);
    session.run()?;
    Ok(())
}

fn run_selfplay(
    temperature: f32,
    seed: Option<u64>,
    max_moves: usize,
    size: usize,
    komi: f32,
) -> Result<()> {
    let board = SimpleBoard::with_size(Geometry::new(size, size), komi);
    let predictor = match seed {
        Some(seed) => UniformPredictor::seeded(seed),
        None => UniformPredictor::new(),
    };
    let mut game = SelfPlayLoop::new(board, predictor, temperature, max_moves, seed);
    let outcome = game.run()?;
    println!("game ended after {} moves: {}", outcome.move_count, outcome.reason);
    println!("{}", game.board().render());
    Ok(())
}
