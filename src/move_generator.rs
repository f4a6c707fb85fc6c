use crate::{
    board::Board,
    castling::{king_home, CastlingRights, CastlingSide},
    error::{ChessError, ChessResult},
    game_state::GameState,
    piece::{Color, Piece, PieceType},
    r#move::Move,
    square::Square,
};

/// How far move generation goes for a single piece.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub enum GenType {
    /// Every pseudo-legal move, castling included
    Standard,
    /// Used by attack tests: castling is never generated (its own legality
    /// depends on attack tests), and pawns report the diagonals they attack
    /// instead of their pushes
    IgnoreKingSafety,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const CARDINALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Generates the pseudo-legal moves of `piece` standing on `origin`: board
/// bounds and same-color occupancy are respected, but the mover's king may be
/// left in check.
pub fn moves_for(
    board: &Board,
    origin: Square,
    piece: Piece,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    gen_type: GenType,
) -> Vec<Move> {
    let mut move_list = Vec::with_capacity(28);
    match piece.piece_type {
        PieceType::Pawn => pawn_moves(board, origin, piece, en_passant_target, gen_type, &mut move_list),
        PieceType::Knight => step_moves(board, origin, piece, &KNIGHT_OFFSETS, &mut move_list),
        PieceType::Bishop => slider_moves(board, origin, piece, &DIAGONALS, &mut move_list),
        PieceType::Rook => slider_moves(board, origin, piece, &CARDINALS, &mut move_list),
        PieceType::Queen => {
            slider_moves(board, origin, piece, &DIAGONALS, &mut move_list);
            slider_moves(board, origin, piece, &CARDINALS, &mut move_list);
        }
        PieceType::King => {
            step_moves(board, origin, piece, &KING_OFFSETS, &mut move_list);
            if gen_type == GenType::Standard {
                castling(board, origin, piece.color, castling_rights, &mut move_list);
            }
        }
    }
    move_list
}

/// Pushes a move onto `target` unless it holds a piece of the mover's color.
/// Returns whether the square was empty, which is what rays need to keep going.
fn push_if_reachable(board: &Board, origin: Square, target: Square, piece: Piece, move_list: &mut Vec<Move>) -> bool {
    match board.piece_on(target) {
        None => {
            move_list.push(Move::new_quiet(origin, target, piece));
            true
        }
        Some(occupant) => {
            if occupant.color != piece.color {
                move_list.push(Move::new_capture(origin, target, piece, occupant));
            }
            false
        }
    }
}

fn pawn_moves(
    board: &Board,
    origin: Square,
    piece: Piece,
    en_passant_target: Option<Square>,
    gen_type: GenType,
    move_list: &mut Vec<Move>,
) {
    let color = piece.color;
    let forward = color.forward();
    let first = move_list.len();

    if gen_type == GenType::IgnoreKingSafety {
        for d_col in [-1, 1] {
            if let Some(target) = origin.offset(forward, d_col) {
                push_if_reachable(board, origin, target, piece, move_list);
            }
        }
        return;
    }

    if let Some(one) = origin.offset(forward, 0).filter(|sq| board.is_empty(*sq)) {
        move_list.push(Move::new_quiet(origin, one, piece));
        if origin.row() == color.pawn_row() {
            if let Some(two) = one.offset(forward, 0).filter(|sq| board.is_empty(*sq)) {
                move_list.push(Move::new_quiet(origin, two, piece));
            }
        }
    }

    for d_col in [-1, 1] {
        let target = match origin.offset(forward, d_col) {
            Some(sq) => sq,
            None => continue,
        };
        match board.piece_on(target) {
            Some(occupant) if occupant.color != color => {
                move_list.push(Move::new_capture(origin, target, piece, occupant))
            }
            None if en_passant_target == Some(target) => {
                move_list.push(Move::new_en_passant(origin, target, color))
            }
            _ => (),
        }
    }

    // Promotions default to a queen, the player may pick something else later
    for mv in &mut move_list[first..] {
        if mv.target.row() == color.promotion_row() {
            mv.promotion = Some(PieceType::Queen);
        }
    }
}

fn step_moves(board: &Board, origin: Square, piece: Piece, offsets: &[(i8, i8)], move_list: &mut Vec<Move>) {
    for &(d_row, d_col) in offsets {
        if let Some(target) = origin.offset(d_row, d_col) {
            push_if_reachable(board, origin, target, piece, move_list);
        }
    }
}

fn slider_moves(board: &Board, origin: Square, piece: Piece, directions: &[(i8, i8)], move_list: &mut Vec<Move>) {
    for &(d_row, d_col) in directions {
        let mut current = origin;
        while let Some(target) = current.offset(d_row, d_col) {
            if !push_if_reachable(board, origin, target, piece, move_list) {
                break;
            }
            current = target;
        }
    }
}

fn castling(board: &Board, origin: Square, color: Color, rights: CastlingRights, move_list: &mut Vec<Move>) {
    if origin != king_home(color) {
        return;
    }
    let opponent = color.opposite();
    let row = color.back_row();
    for side in CastlingSide::BOTH {
        if !rights.has(color, side) {
            continue;
        }
        let rook_home = side.rook_home(color);
        if board.piece_on(rook_home) != Some(Piece::new(PieceType::Rook, color)) {
            continue;
        }
        let (low, high) = if rook_home.col() < origin.col() {
            (rook_home.col() + 1, origin.col())
        } else {
            (origin.col() + 1, rook_home.col())
        };
        let path_clear = (low..high)
            .filter_map(|col| Square::new(row, col))
            .all(|sq| board.is_empty(sq));
        if !path_clear {
            continue;
        }
        let king_path = [origin.col(), side.rook_target_col(), side.king_target_col()];
        let path_safe = king_path
            .iter()
            .filter_map(|&col| Square::new(row, col))
            .all(|sq| !is_square_attacked(board, sq, opponent));
        if path_safe {
            move_list.push(Move::new_castle(color, side));
        }
    }
}

/// Whether any piece of `by` could move onto `target`, using generation with
/// king safety ignored so that castling never recurses into this test.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board.pieces_of(by).any(|(origin, piece)| {
        moves_for(board, origin, piece, CastlingRights::none(), None, GenType::IgnoreKingSafety)
            .iter()
            .any(|mv| mv.target == target)
    })
}

/// Whether `mv` keeps the mover's king out of attack, checked by playing it
/// on a throwaway copy of the board
pub fn leaves_king_safe(board: &Board, mv: &Move) -> bool {
    let color = mv.piece.color;
    let after = board.after_move(mv);
    match after.find_king(color) {
        Some(king) => !is_square_attacked(&after, king, color.opposite()),
        None => false,
    }
}

fn pseudo_legal_moves_from(state: &GameState, origin: Square) -> Vec<Move> {
    match state.board().piece_on(origin) {
        Some(piece) if piece.color == state.side_to_move() => moves_for(
            state.board(),
            origin,
            piece,
            state.castling_rights(),
            state.en_passant_target(),
            GenType::Standard,
        ),
        _ => vec![],
    }
}

/// Legal moves of the piece on `origin`, empty if it is not the side to move's
pub fn legal_moves_from(state: &GameState, origin: Square) -> Vec<Move> {
    pseudo_legal_moves_from(state, origin)
        .into_iter()
        .filter(|mv| leaves_king_safe(state.board(), mv))
        .collect()
}

/// Every legal move of the side to move
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    state
        .board()
        .pieces_of(state.side_to_move())
        .flat_map(|(origin, _)| legal_moves_from(state, origin))
        .collect()
}

/// Stops at the first legal move found
pub fn has_legal_move(state: &GameState) -> bool {
    state
        .board()
        .pieces_of(state.side_to_move())
        .any(|(origin, _)| {
            pseudo_legal_moves_from(state, origin)
                .iter()
                .any(|mv| leaves_king_safe(state.board(), mv))
        })
}

/// Looks a host supplied move up in the legal move list. Promotions without
/// an explicit choice keep the generated queen.
pub fn find_legal_move(
    state: &GameState,
    origin: Square,
    target: Square,
    promotion: Option<PieceType>,
) -> ChessResult<Move> {
    let illegal = || {
        let promotion = promotion.map(|p| p.to_string()).unwrap_or_default();
        ChessError::IllegalMove(format!("{}{}{}", origin, target, promotion))
    };
    let mv = legal_moves_from(state, origin)
        .into_iter()
        .find(|m| m.target == target)
        .ok_or_else(illegal)?;
    match promotion {
        Some(p) => mv.with_promotion(p).map_err(|_| illegal()),
        None => Ok(mv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color::{Black, White};

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn position(placement: &str, side: Color, castling: &str, ep: Option<&str>) -> GameState {
        GameState::from_position(
            Board::from_placement(placement).unwrap(),
            side,
            CastlingRights::from_field(castling),
            ep.map(sq),
        )
    }

    fn play(moves: &[&str]) -> GameState {
        moves.iter().fold(GameState::new(), |state, text| {
            let (o, t, p) = Move::parse_coordinates(text).unwrap();
            let mv = find_legal_move(&state, o, t, p).unwrap();
            state.apply_move(&mv)
        })
    }

    fn targets(moves: &[Move]) -> Vec<String> {
        let mut t: Vec<String> = moves.iter().map(|m| m.target.to_string()).collect();
        t.sort();
        t
    }

    #[test]
    fn initial_position_has_twenty_moves() {
        let moves = legal_moves(&GameState::new());
        assert_eq!(moves.len(), 20);
        let pawn_moves = moves
            .iter()
            .filter(|m| m.piece.piece_type == PieceType::Pawn)
            .count();
        assert_eq!(pawn_moves, 16);
        assert_eq!(moves.len() - pawn_moves, 4);
    }

    #[test]
    fn sliders_stop_on_first_occupied_square() {
        let state = play(&["e2e4", "e7e5", "d1h5"]);
        let board = state.board();
        let queen = board.piece_on(sq("h5")).unwrap();
        let moves = moves_for(board, sq("h5"), queen, state.castling_rights(), None, GenType::Standard);
        for mv in &moves {
            assert_ne!(board.color_on(mv.target), Some(White), "{} lands on own piece", mv);
        }
        // f7 is captured, nothing behind it is reached
        assert!(moves.iter().any(|m| m.target == sq("f7") && m.is_capture()));
        assert!(!moves.iter().any(|m| m.target == sq("e8")));
        // h7 is captured on the file, h8 behind it is not
        assert!(moves.iter().any(|m| m.target == sq("h7")));
        assert!(!moves.iter().any(|m| m.target == sq("h8")));
        // h2 blocks the way down the file
        assert!(moves.iter().any(|m| m.target == sq("h3")));
        assert!(!moves.iter().any(|m| m.target == sq("h2")));

        let after = state.apply_move(&find_legal_move(&state, sq("b8"), sq("c6"), None).unwrap());
        for mv in legal_moves(&after) {
            assert_ne!(after.board().color_on(mv.target), Some(mv.piece.color), "{}", mv);
        }
    }

    #[test]
    fn knight_jumps_respect_board_edges() {
        let state = position("4k3/8/8/8/8/8/8/N3K3", White, "-", None);
        let knight = state.board().piece_on(sq("a1")).unwrap();
        let moves = moves_for(state.board(), sq("a1"), knight, CastlingRights::none(), None, GenType::Standard);
        assert_eq!(targets(&moves), vec!["b3", "c2"]);
    }

    #[test]
    fn pawns_push_capture_and_promote() {
        let state = position("1n2k3/P7/8/8/8/2p5/3P4/4K3", White, "-", None);
        let d2 = legal_moves_from(&state, sq("d2"));
        assert_eq!(targets(&d2), vec!["c3", "d3", "d4"]);

        let a7 = legal_moves_from(&state, sq("a7"));
        assert_eq!(targets(&a7), vec!["a8", "b8"]);
        assert!(a7.iter().all(|m| m.promotion == Some(PieceType::Queen)));
        assert!(a7.iter().any(|m| m.captured == Some(Piece::new(PieceType::Knight, Black))));
    }

    #[test]
    fn blocked_pawn_cannot_double_step() {
        let state = position("4k3/8/8/8/8/4n3/4P3/4K3", White, "-", None);
        assert!(legal_moves_from(&state, sq("e2")).is_empty());
        let state = position("4k3/8/8/8/4n3/8/4P3/4K3", White, "-", None);
        assert_eq!(targets(&legal_moves_from(&state, sq("e2"))), vec!["e3"]);
    }

    #[test]
    fn attack_mode_counts_pawn_diagonals_not_pushes() {
        let board = Board::from_placement("4k3/8/8/8/8/8/4P3/4K3").unwrap();
        assert!(is_square_attacked(&board, sq("d3"), White));
        assert!(is_square_attacked(&board, sq("f3"), White));
        assert!(!is_square_attacked(&board, sq("e3"), White));
        assert!(!is_square_attacked(&board, sq("e4"), White));
    }

    #[test]
    fn pinned_piece_may_only_move_along_the_pin() {
        let state = position("4r1k1/8/8/8/8/8/4R3/4K3", White, "-", None);
        let moves = legal_moves_from(&state, sq("e2"));
        assert_eq!(targets(&moves), vec!["e3", "e4", "e5", "e6", "e7", "e8"]);
    }

    #[test]
    fn castling_requires_rights_empty_path_and_safe_squares() {
        let state = position("r3k2r/8/8/8/8/8/8/R3K2R", White, "KQkq", None);
        let king = legal_moves_from(&state, sq("e1"));
        let castles: Vec<_> = king.iter().filter_map(|m| m.castling).collect();
        assert_eq!(castles.len(), 2);

        // f1 attacked: no kingside castle, queenside still fine
        let state = position("r3kr2/8/8/8/8/8/8/R3K2R", White, "KQkq", None);
        let castles: Vec<_> = legal_moves_from(&state, sq("e1"))
            .iter()
            .filter_map(|m| m.castling)
            .collect();
        assert_eq!(castles, vec![CastlingSide::QueenSide]);

        // b1 attacked does not matter, b1 occupied does
        let state = position("1r2k3/8/8/8/8/8/8/R3K3", White, "Q", None);
        assert!(legal_moves_from(&state, sq("e1")).iter().any(|m| m.castling.is_some()));
        let state = position("4k3/8/8/8/8/8/8/RN2K3", White, "Q", None);
        assert!(!legal_moves_from(&state, sq("e1")).iter().any(|m| m.castling.is_some()));

        // in check: no castling at all
        let state = position("4k3/8/8/8/8/8/4r3/R3K2R", White, "KQ", None);
        assert!(!legal_moves_from(&state, sq("e1")).iter().any(|m| m.castling.is_some()));

        // no rights
        let state = position("r3k2r/8/8/8/8/8/8/R3K2R", White, "kq", None);
        assert!(!legal_moves_from(&state, sq("e1")).iter().any(|m| m.castling.is_some()));
    }

    #[test]
    fn attack_tests_never_generate_castling() {
        let board = Board::from_placement("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let king = board.piece_on(sq("e1")).unwrap();
        let moves = moves_for(&board, sq("e1"), king, CastlingRights::new(), None, GenType::IgnoreKingSafety);
        assert!(moves.iter().all(|m| m.castling.is_none()));
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn en_passant_is_offered_only_on_the_next_move() {
        let state = play(&["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(state.en_passant_target(), Some(sq("d6")));
        let ep: Vec<Move> = legal_moves(&state).into_iter().filter(|m| m.en_passant).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_string(), "e5d6");

        let later = play(&["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
        assert_eq!(later.en_passant_target(), None);
        assert!(legal_moves(&later).iter().all(|m| !m.en_passant));
    }

    #[test]
    fn en_passant_that_exposes_the_king_is_rejected() {
        let state = position("8/8/8/K2pP2r/8/8/8/7k", White, "-", Some("d6"));
        assert!(legal_moves(&state).iter().all(|m| !m.en_passant));
    }

    #[test]
    fn no_legal_move_leaves_the_king_attacked() {
        let positions = [
            GameState::new(),
            position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R", White, "KQkq", None),
            position("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8", White, "-", None),
            position("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1", White, "kq", None),
        ];
        for state in positions {
            for mv in legal_moves(&state) {
                let next = state.apply_move(&mv);
                let king = next.board().find_king(mv.piece.color).unwrap();
                assert!(!is_square_attacked(next.board(), king, mv.piece.color.opposite()), "{}", mv);
            }
        }
    }

    #[test]
    fn host_moves_are_matched_against_legal_moves() {
        let state = GameState::new();
        assert!(find_legal_move(&state, sq("e2"), sq("e4"), None).is_ok());
        assert!(matches!(
            find_legal_move(&state, sq("e2"), sq("e5"), None),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            find_legal_move(&state, sq("e7"), sq("e5"), None),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            find_legal_move(&state, sq("e2"), sq("e4"), Some(PieceType::Queen)),
            Err(ChessError::IllegalMove(_))
        ));

        let promo = position("4k3/1P6/8/8/8/8/8/4K3", White, "-", None);
        let knight = find_legal_move(&promo, sq("b7"), sq("b8"), Some(PieceType::Knight)).unwrap();
        assert_eq!(knight.promotion, Some(PieceType::Knight));
        let queen = find_legal_move(&promo, sq("b7"), sq("b8"), None).unwrap();
        assert_eq!(queen.promotion, Some(PieceType::Queen));
    }
}
