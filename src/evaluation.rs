use crate::board::Board;
use crate::game_state::GameState;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

pub type Score = i32;

// Piece-square tables from Tomasz Michniewski's simplified evaluation function
// https://www.chessprogramming.org/Simplified_Evaluation_Function
// Written from white's side with rank 8 on the first line, black reads them mirrored.
const PAWN_TABLE: [[Score; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];
const KNIGHT_TABLE: [[Score; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];
const BISHOP_TABLE: [[Score; 8]; 8] = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];
const ROOK_TABLE: [[Score; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];
const QUEEN_TABLE: [[Score; 8]; 8] = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];
const KING_TABLE: [[Score; 8]; 8] = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

pub struct Evaluation;

impl Evaluation {
    /// Indexed by `PieceType as usize`
    pub const PIECE_TYPE_VALUE: [Score; 6] = [100, 320, 330, 500, 900, 20000];
    /// Stands in for infinity: a side being mated scores minus this
    pub const MATE_SCORE: Score = i32::MAX / 2;
    pub const DRAW_SCORE: Score = 0;
    /// Width of the random term the search may add to a leaf
    pub const JITTER_RANGE: Score = 10;

    pub fn piece_value(piece_type: PieceType) -> Score {
        Self::PIECE_TYPE_VALUE[piece_type as usize]
    }

    /// Positional bonus of `piece` on `sq`, seen from its own side
    pub fn piece_square_value(piece: Piece, sq: Square) -> Score {
        let sq = match piece.color {
            Color::White => sq,
            Color::Black => sq.vertical_symmetry(),
        };
        let table = match piece.piece_type {
            PieceType::Pawn => &PAWN_TABLE,
            PieceType::Knight => &KNIGHT_TABLE,
            PieceType::Bishop => &BISHOP_TABLE,
            PieceType::Rook => &ROOK_TABLE,
            PieceType::Queen => &QUEEN_TABLE,
            PieceType::King => &KING_TABLE,
        };
        table[sq.row()][sq.col()]
    }

    /// Material plus piece-square bonuses, positive when white is better
    pub fn evaluate_board(board: &Board) -> Score {
        board
            .pieces()
            .map(|(sq, piece)| {
                let value = Self::piece_value(piece.piece_type) + Self::piece_square_value(piece, sq);
                match piece.color {
                    Color::White => value,
                    Color::Black => -value,
                }
            })
            .sum()
    }

    /// Static evaluation of a position. Pure: the search adds any jitter.
    pub fn static_eval(state: &GameState) -> Score {
        Self::evaluate_board(state.board())
    }
}
