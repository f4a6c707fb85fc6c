use crate::piece::Color::{Black, White};
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::Move;
use crate::square::Square;
use std::fmt::{Display, Formatter};

const BACK_RANK: [PieceType; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

/// An 8x8 mailbox. Row 0 holds rank 8, so iterating rows top to bottom
/// prints the board from white's point of view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard initial layout
    pub fn standard() -> Board {
        let mut board = Board::empty();
        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            board.squares[Black.back_row()][col] = Some(Piece::new(piece_type, Black));
            board.squares[Black.pawn_row()][col] = Some(Piece::new(Pawn, Black));
            board.squares[White.pawn_row()][col] = Some(Piece::new(Pawn, White));
            board.squares[White.back_row()][col] = Some(Piece::new(piece_type, White));
        }
        board
    }

    /// Builds a board from the piece placement field of a FEN string
    /// (`rnbqkbnr/pppppppp/8/...`), rank 8 first. Returns `None` on anything
    /// that does not describe exactly 8 ranks of 8 squares.
    pub fn from_placement(placement: &str) -> Option<Board> {
        let mut board = Board::empty();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return None;
        }
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let piece = Piece::from_char(c)?;
                    *board.squares.get_mut(row)?.get_mut(col)? = Some(piece);
                    col += 1;
                }
            }
            if col != 8 {
                return None;
            }
        }
        Some(board)
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row()][sq.col()]
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.piece_on(sq).map(|p| p.color)
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_on(sq).is_none()
    }

    /// Places a new piece on a given square, replacing whatever stood there
    pub fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.squares[sq.row()][sq.col()] = Some(piece);
    }

    /// Clears the given square, returning the piece that has been removed if any
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row()][sq.col()].take()
    }

    /// Returns a copy of the board with `mv` played on it. The receiver is
    /// left untouched, which is what speculative legality checks rely on.
    pub fn after_move(&self, mv: &Move) -> Board {
        let mut board = *self;
        let color = mv.piece.color;

        board.remove_piece(mv.origin);
        if mv.en_passant {
            board.remove_piece(mv.capture_square());
        }
        let placed = match mv.promotion {
            Some(p) => Piece::new(p, color),
            None => mv.piece,
        };
        board.add_piece(placed, mv.target);

        if let Some(side) = mv.castling {
            let rook_target = Square::new(color.back_row(), side.rook_target_col());
            if let (Some(rook), Some(rook_target)) =
                (board.remove_piece(side.rook_home(color)), rook_target)
            {
                board.add_piece(rook, rook_target);
            }
        }
        board
    }

    /// Scans the board for the king of `color`
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Every occupied square with its occupant, a8 first
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_on(sq).map(|p| (sq, p)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (row, rank) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for sq in rank {
                match sq {
                    None => write!(f, ". ")?,
                    Some(p) => write!(f, "{} ", p)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
