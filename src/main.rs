use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use gambit::console::Console;
use gambit::piece::Color;
use gambit::search::SearchOptions;

#[derive(Parser, Debug)]
#[command(name = "gambit", version, author, about = "Play chess against a minimax engine")]
struct Cli {
    /// Search depth in plies
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..))]
    depth: u8,

    /// Seed for move shuffling and jitter, entropy when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the random term added to leaf evaluations
    #[arg(long)]
    no_jitter: bool,

    /// Side played by the engine
    #[arg(long, value_enum, default_value_t = EngineColor::Black)]
    engine_color: EngineColor,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the leaves of the legal move tree from the initial position
    Perft { depth: u32 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EngineColor {
    White,
    Black,
    None,
}

impl From<EngineColor> for Option<Color> {
    fn from(c: EngineColor) -> Self {
        match c {
            EngineColor::White => Some(Color::White),
            EngineColor::Black => Some(Color::Black),
            EngineColor::None => None,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    println!("gambit v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    if let Some(Command::Perft { depth }) = cli.command {
        gambit::run_perft(depth);
        return;
    }

    let mut options = SearchOptions::default();
    options
        .set_depth(cli.depth)
        .set_jitter(!cli.no_jitter)
        .set_seed(cli.seed);

    let result = Console::new(options, cli.engine_color.into()).and_then(|mut console| console.run());
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
