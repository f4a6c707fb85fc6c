use std::fmt::Display;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::evaluation::{Evaluation, Score};
use crate::game_state::GameState;
use crate::move_generator::legal_moves;
use crate::piece::Color;
use crate::r#move::Move;
use crate::random::{shuffle, RandomSource, SeededRandom};

/// Groups every knob of a search, so a `Searcher` can be built from a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Plies searched from the root
    pub depth: u8,
    /// Adds a small random term to every leaf so equal positions do not
    /// always resolve to the same move
    pub jitter: bool,
    /// Seeds the random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            depth: 3,
            jitter: true,
            seed: None,
        }
    }
}
impl SearchOptions {
    pub fn set_depth(&mut self, value: u8) -> &mut Self {
        self.depth = value;
        self
    }
    pub fn set_jitter(&mut self, value: bool) -> &mut Self {
        self.jitter = value;
        self
    }
    pub fn set_seed(&mut self, value: Option<u64>) -> &mut Self {
        self.seed = value;
        self
    }
}

/// What a finished search found, and what it cost
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u8,
    pub nodes_searched: u64,
    pub time: Duration,
}
impl Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mate_score =
            self.score <= -Evaluation::MATE_SCORE || self.score >= Evaluation::MATE_SCORE;
        let secs = self.time.as_secs_f64();
        write!(
            f,
            "depth {} time {} nodes {} nps {} score {} bestmove {}",
            self.depth,
            self.time.as_millis(),
            self.nodes_searched,
            if secs > 0.0 {
                (self.nodes_searched as f64 / secs) as u64
            } else {
                0
            },
            if mate_score {
                if self.score < 0 {
                    String::from("mate black")
                } else {
                    String::from("mate white")
                }
            } else {
                format!("cp {}", self.score)
            },
            self.best_move
                .map_or_else(|| String::from("(none)"), |mv| mv.to_string())
        )
    }
}

/// Fixed depth minimax with alpha-beta pruning. Scores are always from
/// white's point of view: white maximizes, black minimizes.
pub struct Searcher {
    options: SearchOptions,
    rng: Box<dyn RandomSource>,
    nodes: u64,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Searcher {
        let rng: Box<dyn RandomSource> = match options.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        Self::with_random_source(options, rng)
    }

    /// Uses `rng` for shuffling and jitter, whatever `options.seed` says
    pub fn with_random_source(options: SearchOptions, rng: Box<dyn RandomSource>) -> Searcher {
        Searcher {
            options,
            rng,
            nodes: 0,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }
    pub fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }

    /// Searches `state` to the configured depth
    pub fn search(&mut self, state: &GameState) -> SearchReport {
        self.search_to_depth(state, self.options.depth)
    }

    /// Picks a move for the side to move, `None` if it has none
    pub fn best_move(&mut self, state: &GameState, depth: u8) -> Option<Move> {
        self.search_to_depth(state, depth).best_move
    }

    fn search_to_depth(&mut self, state: &GameState, depth: u8) -> SearchReport {
        let start = Instant::now();
        self.nodes = 0;
        let maximizing = state.side_to_move() == Color::White;
        debug!(side = %state.side_to_move(), depth, "starting search");

        let mut moves = legal_moves(state);
        if moves.is_empty() {
            let report = SearchReport {
                best_move: None,
                score: self.terminal_score(state, maximizing),
                depth,
                nodes_searched: 0,
                time: start.elapsed(),
            };
            info!(%report, "no legal move to search");
            return report;
        }
        shuffle(&mut moves, self.rng.as_mut());

        let mut alpha = -Evaluation::MATE_SCORE;
        let mut beta = Evaluation::MATE_SCORE;
        let mut best: Option<(Move, Score)> = None;
        for mv in &moves {
            let child = state.apply_move(mv);
            let score = self.minimax(&child, depth.saturating_sub(1), !maximizing, alpha, beta);
            let bar = best.map_or(if maximizing { alpha } else { beta }, |(_, s)| s);
            let improves = if maximizing { score > bar } else { score < bar };
            if improves {
                best = Some((*mv, score));
                if maximizing {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
            }
        }

        let (best_move, score) = match best {
            Some(found) => found,
            None => {
                // every move is lost by force, play anything
                warn!(side = %state.side_to_move(), "no move improved on a forced loss, falling back to the first one");
                let score = if maximizing { -Evaluation::MATE_SCORE } else { Evaluation::MATE_SCORE };
                (moves[0], score)
            }
        };
        let report = SearchReport {
            best_move: Some(best_move),
            score,
            depth,
            nodes_searched: self.nodes,
            time: start.elapsed(),
        };
        info!(%report, "search finished");
        report
    }

    /// Value of `state` searched `depth` plies deep. Cuts off as soon as the
    /// window closes, so only values strictly inside `(alpha, beta)` are exact.
    pub fn minimax(
        &mut self,
        state: &GameState,
        depth: u8,
        maximizing: bool,
        mut alpha: Score,
        mut beta: Score,
    ) -> Score {
        self.nodes += 1;
        if state.is_game_over() {
            return self.terminal_score(state, maximizing);
        }
        if depth == 0 {
            return Evaluation::static_eval(state) + self.jitter();
        }

        let mut best = if maximizing { -Evaluation::MATE_SCORE } else { Evaluation::MATE_SCORE };
        for mv in legal_moves(state) {
            let score = self.minimax(&state.apply_move(&mv), depth - 1, !maximizing, alpha, beta);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }

    fn terminal_score(&self, state: &GameState, maximizing: bool) -> Score {
        if state.is_checkmate() {
            if maximizing {
                -Evaluation::MATE_SCORE
            } else {
                Evaluation::MATE_SCORE
            }
        } else if state.is_stalemate() {
            Evaluation::DRAW_SCORE
        } else {
            Evaluation::static_eval(state)
        }
    }

    fn jitter(&mut self) -> Score {
        if !self.options.jitter {
            return 0;
        }
        let range = Evaluation::JITTER_RANGE;
        (self.rng.next_f64() * range as f64) as Score - range / 2
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}
