use std::fmt::{Display, Formatter};

use tracing::warn;

use crate::board::Board;
use crate::castling::CastlingRights;
use crate::move_generator::{has_legal_move, is_square_attacked};
use crate::piece::{Color, PieceType};
use crate::r#move::Move;
use crate::square::Square;

/// Derived terminal flags of a position, recomputed after every move
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct GameStatus {
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        self.checkmate || self.stalemate
    }
}

/// An immutable snapshot of a game. Transitions build a new snapshot and
/// leave the receiver as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    history: Vec<Move>,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    status: GameStatus,
}

impl GameState {
    /// Standard initial position, white to move, full rights, no history
    pub fn new() -> GameState {
        Self::from_position(Board::standard(), Color::White, CastlingRights::new(), None)
    }

    /// Starts a game from an arbitrary position. History parity counts from
    /// this position, so it only matches the side to move for white-first setups.
    pub fn from_position(
        board: Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant_target: Option<Square>,
    ) -> GameState {
        let mut state = GameState {
            board,
            side_to_move,
            history: Vec::new(),
            castling_rights,
            en_passant_target,
            halfmove_clock: 0,
            fullmove_number: 1,
            status: GameStatus::default(),
        };
        state.status = state.check_game_status();
        state
    }

    /// Rebuilds a game by playing `moves` from the initial position
    pub fn replay(moves: &[Move]) -> GameState {
        moves
            .iter()
            .fold(GameState::new(), |state, mv| state.apply_move(mv))
    }

    /// Takes back the last move of each side by replaying the history minus
    /// its last two entries
    pub fn undo_last_turn(&self) -> GameState {
        let keep = self.history.len().saturating_sub(2);
        Self::replay(&self.history[..keep])
    }

    /// Plays a move the caller got from the legal move list. Illegal moves
    /// are not detected and produce an unspecified position.
    pub fn apply_move(&self, mv: &Move) -> GameState {
        let mut next = self.transition(mv);
        next.status = next.check_game_status();
        next
    }

    /// Every effect of `mv` except the terminal classification
    fn transition(&self, mv: &Move) -> GameState {
        let is_pawn = mv.piece.piece_type == PieceType::Pawn;
        let is_capture = mv.is_capture() || !self.board.is_empty(mv.target);

        let en_passant_target = if is_pawn && mv.origin.row().abs_diff(mv.target.row()) == 2 {
            Square::new((mv.origin.row() + mv.target.row()) / 2, mv.origin.col())
        } else {
            None
        };

        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend_from_slice(&self.history);
        history.push(*mv);

        GameState {
            board: self.board.after_move(mv),
            side_to_move: self.side_to_move.opposite(),
            history,
            castling_rights: self.castling_rights.after_move(mv.origin, mv.target),
            en_passant_target,
            halfmove_clock: if is_pawn || is_capture {
                0
            } else {
                self.halfmove_clock + 1
            },
            fullmove_number: if self.side_to_move == Color::Black {
                self.fullmove_number + 1
            } else {
                self.fullmove_number
            },
            status: GameStatus::default(),
        }
    }

    /// Classifies the position for the side to move. A missing king can only
    /// come from a broken setup and is scored as that side being mated.
    pub fn check_game_status(&self) -> GameStatus {
        let king = match self.board.find_king(self.side_to_move) {
            Some(sq) => sq,
            None => {
                warn!(side = %self.side_to_move, "no king on the board, treating as checkmate");
                return GameStatus {
                    in_check: true,
                    checkmate: true,
                    stalemate: false,
                };
            }
        };
        let in_check = is_square_attacked(&self.board, king, self.side_to_move.opposite());
        let can_move = has_legal_move(self);
        GameStatus {
            in_check,
            checkmate: in_check && !can_move,
            stalemate: !in_check && !can_move,
        }
    }

    /*
    GETTERS
     */
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }
    pub fn history(&self) -> &[Move] {
        &self.history
    }
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }
    pub fn status(&self) -> GameStatus {
        self.status
    }
    pub fn is_check(&self) -> bool {
        self.status.in_check
    }
    pub fn is_checkmate(&self) -> bool {
        self.status.checkmate
    }
    pub fn is_stalemate(&self) -> bool {
        self.status.stalemate
    }
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let board = self.board.to_string();
        let mut ranks = board.lines();
        let mut next_rank = || ranks.next().unwrap_or("");
        writeln!(f, "{}", next_rank())?;
        writeln!(f, "{}  side to move: {}", next_rank(), self.side_to_move)?;
        writeln!(f, "{}  castling rights: {}", next_rank(), self.castling_rights)?;
        writeln!(
            f,
            "{}  en passant: {}",
            next_rank(),
            self.en_passant_target.map_or_else(|| String::from("-"), |sq| sq.to_string())
        )?;
        writeln!(
            f,
            "{}  move {} ({} reversible plies)",
            next_rank(),
            self.fullmove_number,
            self.halfmove_clock
        )?;
        writeln!(
            f,
            "{}  last move: {}",
            next_rank(),
            self.last_move().map_or_else(|| String::from("-"), |mv| mv.to_string())
        )?;
        writeln!(f, "{}", next_rank())?;
        writeln!(f, "{}", next_rank())?;
        write!(f, "{}", next_rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastlingSide;
    use crate::move_generator::{find_legal_move, legal_moves};
    use crate::piece::Color::{Black, White};
    use crate::piece::Piece;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn play_from(state: GameState, moves: &[&str]) -> GameState {
        moves.iter().fold(state, |state, text| {
            let (o, t, p) = Move::parse_coordinates(text).unwrap();
            let mv = find_legal_move(&state, o, t, p)
                .unwrap_or_else(|e| panic!("{} in\n{}", e, state));
            state.apply_move(&mv)
        })
    }

    fn play(moves: &[&str]) -> GameState {
        play_from(GameState::new(), moves)
    }

    fn position(placement: &str, side: Color, castling: &str) -> GameState {
        GameState::from_position(
            Board::from_placement(placement).unwrap(),
            side,
            CastlingRights::from_field(castling),
            None,
        )
    }

    #[test]
    fn initial_state() {
        let state = GameState::new();
        assert_eq!(state.side_to_move(), White);
        assert_eq!(state.castling_rights(), CastlingRights::new());
        assert!(state.history().is_empty());
        assert_eq!(state.en_passant_target(), None);
        assert_eq!((state.halfmove_clock(), state.fullmove_number()), (0, 1));
        assert_eq!(state.status(), GameStatus::default());
    }

    #[test]
    fn applying_a_move_leaves_the_original_untouched() {
        let state = GameState::new();
        let snapshot = state.clone();
        let mv = find_legal_move(&state, sq("g1"), sq("f3"), None).unwrap();
        let next = state.apply_move(&mv);
        assert_eq!(state, snapshot);
        assert_ne!(next, state);
        assert_eq!(next.history(), &[mv]);
    }

    #[test]
    fn history_parity_gives_the_side_to_move() {
        let mut state = GameState::new();
        for _ in 0..9 {
            let expected = if state.history().len() % 2 == 0 { White } else { Black };
            assert_eq!(state.side_to_move(), expected);
            let mv = legal_moves(&state)[0];
            state = state.apply_move(&mv);
        }
    }

    #[test]
    fn clocks_follow_pawn_moves_and_captures() {
        let state = play(&["g1f3"]);
        assert_eq!((state.halfmove_clock(), state.fullmove_number()), (1, 1));
        let state = play_from(state, &["g8f6"]);
        assert_eq!((state.halfmove_clock(), state.fullmove_number()), (2, 2));
        let state = play_from(state, &["e2e4"]);
        assert_eq!(state.halfmove_clock(), 0);
        let state = play_from(state, &["b8c6", "f1c4", "f6e4"]);
        assert_eq!((state.halfmove_clock(), state.fullmove_number()), (0, 4));
    }

    #[test]
    fn double_step_sets_en_passant_target_for_one_move() {
        let state = play(&["e2e4"]);
        assert_eq!(state.en_passant_target(), Some(sq("e3")));
        let state = play_from(state, &["g8f6"]);
        assert_eq!(state.en_passant_target(), None);
        let state = play_from(state, &["e4e5", "d7d5"]);
        assert_eq!(state.en_passant_target(), Some(sq("d6")));
        let state = play_from(state, &["e5d6"]);
        assert_eq!(state.en_passant_target(), None);
        assert!(state.board().is_empty(sq("d5")));
        assert_eq!(state.board().piece_on(sq("d6")), Some(Piece::new(PieceType::Pawn, White)));
        assert_eq!(state.halfmove_clock(), 0);
    }

    #[test]
    fn scholars_mate() {
        let state = play(&["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);
        assert!(state.is_check());
        assert!(state.is_checkmate());
        assert!(!state.is_stalemate());
        assert!(state.is_game_over());
        assert!(legal_moves(&state).is_empty());

        // g6 blocks the diagonal, so the queen cannot reach f7 at all
        let blocked = play(&["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g7g6"]);
        assert!(find_legal_move(&blocked, sq("h5"), sq("f7"), None).is_err());
    }

    #[test]
    fn fools_mate() {
        let state = play(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(state.is_checkmate());
        assert_eq!(state.side_to_move(), White);
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        // black king cornered by a queen, not in check
        let state = position("7k/8/6Q1/8/8/8/8/K7", Black, "-");
        assert!(state.is_stalemate());
        assert!(!state.is_checkmate());
        assert!(!state.is_check());
        assert!(state.is_game_over());
        assert!(legal_moves(&state).is_empty());

        // reached through a move as well
        let state = position("7k/8/5Q2/8/8/8/8/K7", White, "-");
        let state = play_from(state, &["f6g6"]);
        assert!(state.is_stalemate());
    }

    #[test]
    fn missing_king_is_treated_as_checkmate() {
        let state = position("8/8/8/8/8/8/8/K7", Black, "-");
        assert!(state.is_checkmate());
        assert!(!state.is_stalemate());
        assert!(state.is_game_over());
    }

    #[test]
    fn castling_moves_the_rook_and_revokes_rights_for_good() {
        let state = play(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);
        assert_eq!(state.last_move().unwrap().castling, Some(CastlingSide::KingSide));
        assert_eq!(state.board().piece_on(sq("f1")).map(|p| p.piece_type), Some(PieceType::Rook));
        assert_eq!(state.board().piece_on(sq("g1")).map(|p| p.piece_type), Some(PieceType::King));
        assert_eq!(state.castling_rights().get(White), (false, false));
        assert_eq!(state.castling_rights().get(Black), (true, true));
    }

    #[test]
    fn castling_rights_never_come_back() {
        let mut state = play(&["a2a4", "h7h5", "a1a3", "h8h6", "a3a1", "h6h8"]);
        assert_eq!(state.castling_rights().get(White), (true, false));
        assert_eq!(state.castling_rights().get(Black), (false, true));
        let lost = state.castling_rights();
        for _ in 0..20 {
            let moves = legal_moves(&state);
            if moves.is_empty() {
                break;
            }
            state = state.apply_move(&moves[moves.len() / 2]);
            for color in [White, Black] {
                for side in CastlingSide::BOTH {
                    if !lost.has(color, side) {
                        assert!(!state.castling_rights().has(color, side));
                    }
                }
            }
        }
    }

    #[test]
    fn capturing_a_rook_on_its_home_square_revokes_that_wing() {
        let state = position("r3k3/8/8/8/8/8/8/4K2B", White, "q");
        let state = play_from(state, &["h1a8"]);
        assert_eq!(state.castling_rights(), CastlingRights::none());
    }

    #[test]
    fn promotion_applies_the_chosen_piece() {
        let state = position("4k3/1P6/8/8/8/8/8/4K3", White, "-");
        let queen = play_from(state.clone(), &["b7b8"]);
        assert_eq!(queen.board().piece_on(sq("b8")), Some(Piece::new(PieceType::Queen, White)));
        let knight = play_from(state, &["b7b8n"]);
        assert_eq!(knight.board().piece_on(sq("b8")), Some(Piece::new(PieceType::Knight, White)));
        assert_eq!(knight.last_move().unwrap().piece.piece_type, PieceType::Pawn);
    }

    #[test]
    fn undo_replays_history_minus_the_last_turn() {
        let before = play(&["e2e4", "e7e5"]);
        let after = play_from(before.clone(), &["g1f3", "b8c6"]);
        assert_eq!(after.undo_last_turn(), before);
        assert_eq!(GameState::new().undo_last_turn(), GameState::new());
        assert_eq!(GameState::replay(after.history()), after);
    }

    #[test]
    fn display_shows_side_and_rights() {
        let text = play(&["e2e4"]).to_string();
        assert!(text.contains("side to move: black"));
        assert!(text.contains("castling rights: KQkq"));
        assert!(text.contains("en passant: e3"));
        assert!(text.contains("last move: e2e4"));
    }
}
