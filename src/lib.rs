use std::time::Instant;

use crate::game_state::GameState;
use crate::piece::PieceType;
use crate::search::{SearchOptions, Searcher};

pub mod board;
pub mod castling;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod game_state;
pub mod move_generator;
pub mod piece;
pub mod random;
pub mod search;
pub mod square;
mod r#move;

pub use crate::error::{ChessError, ChessResult};
pub use crate::r#move::Move;

/// Standard initial position, white to move
pub fn create_initial_state() -> GameState {
    GameState::new()
}

/// Every legal move of the side to move
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    move_generator::legal_moves(state)
}

/// Plays a move taken from `legal_moves`, returning the next snapshot
pub fn apply_move(state: &GameState, mv: &Move) -> GameState {
    state.apply_move(mv)
}

/// Replaces the default queen of a promoting move with the player's choice
///
/// ```
/// use gambit::piece::PieceType;
///
/// let state = gambit::create_initial_state();
/// let mv = gambit::legal_moves(&state)[0];
/// assert!(gambit::attach_promotion_choice(&mv, PieceType::Knight).is_err());
/// ```
pub fn attach_promotion_choice(mv: &Move, piece_type: PieceType) -> ChessResult<Move> {
    mv.with_promotion(piece_type)
}

/// Searches `depth` plies with jitter and an entropy seeded shuffle.
/// `None` when the side to move has no legal move.
pub fn best_move(state: &GameState, depth: u8) -> Option<Move> {
    Searcher::new(SearchOptions::default()).best_move(state, depth)
}

/// Counts the leaf nodes of the legal move tree, every promotion choice
/// counted separately
pub fn perft(state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for mv in legal_moves(state) {
        if mv.is_promotion() {
            for choice in mv.promotion_choices() {
                nodes += perft(&state.apply_move(&choice), depth - 1);
            }
        } else {
            nodes += perft(&state.apply_move(&mv), depth - 1);
        }
    }
    nodes
}

/// Prints perft counts of the initial position for every depth up to `depth`
pub fn run_perft(depth: u32) {
    let state = create_initial_state();
    println!("perft");
    println!("{}\n", state);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = perft(&state, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
}
