use crate::castling::{king_home, CastlingSide};
use crate::error::{ChessError, ChessResult};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;
use std::fmt::{Display, Formatter};

/// A pure description of a transition. Moves never hold a reference to the
/// board they were generated from, so they can be built speculatively.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub origin: Square,
    pub target: Square,
    /// The moving piece as it stood before the move
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub castling: Option<CastlingSide>,
    pub en_passant: bool,
}

impl Move {
    pub fn new_quiet(origin: Square, target: Square, piece: Piece) -> Move {
        Move {
            origin,
            target,
            piece,
            captured: None,
            promotion: None,
            castling: None,
            en_passant: false,
        }
    }
    pub fn new_capture(origin: Square, target: Square, piece: Piece, captured: Piece) -> Move {
        Move {
            captured: Some(captured),
            ..Self::new_quiet(origin, target, piece)
        }
    }
    /// The captured pawn stands beside the mover, not on `target`
    pub fn new_en_passant(origin: Square, target: Square, color: Color) -> Move {
        Move {
            captured: Some(Piece::new(PieceType::Pawn, color.opposite())),
            en_passant: true,
            ..Self::new_quiet(origin, target, Piece::new(PieceType::Pawn, color))
        }
    }
    pub fn new_castle(color: Color, side: CastlingSide) -> Move {
        let origin = king_home(color);
        let target = match Square::new(color.back_row(), side.king_target_col()) {
            Some(sq) => sq,
            None => unreachable!("castling targets are on the back row"),
        };
        Move {
            castling: Some(side),
            ..Self::new_quiet(origin, target, Piece::new(PieceType::King, color))
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Square the captured piece is removed from
    pub fn capture_square(&self) -> Square {
        if self.en_passant {
            Square::new(self.origin.row(), self.target.col()).unwrap_or(self.target)
        } else {
            self.target
        }
    }

    /// Rebinds a pending promotion to the piece type chosen by the player
    pub fn with_promotion(&self, promote_to: PieceType) -> ChessResult<Move> {
        if !self.is_promotion() {
            return Err(ChessError::NotAPromotion);
        }
        if !promote_to.is_promotion_target() {
            return Err(ChessError::InvalidPromotion(promote_to));
        }
        Ok(Move {
            promotion: Some(promote_to),
            ..*self
        })
    }

    /// Every promotion choice of this move, queen first. Non promotions
    /// yield themselves only.
    pub fn promotion_choices(&self) -> Vec<Move> {
        if self.is_promotion() {
            PieceType::PROMOTIONS
                .iter()
                .map(|&p| Move {
                    promotion: Some(p),
                    ..*self
                })
                .collect()
        } else {
            vec![*self]
        }
    }

    /// Parses a move in coordinate notation (`e2e4`, `e7e8n`).
    /// Since no information can be given on flags, it simply returns origin, target and potential
    /// piece type to promote to
    pub fn parse_coordinates(mv: &str) -> ChessResult<(Square, Square, Option<PieceType>)> {
        let malformed = || ChessError::MalformedMove(mv.to_string());
        if !mv.is_ascii() || !(4..=5).contains(&mv.len()) {
            return Err(malformed());
        }
        let origin = Square::parse(&mv[0..2]).map_err(|_| malformed())?;
        let target = Square::parse(&mv[2..4]).map_err(|_| malformed())?;
        let promotion = match mv[4..].chars().next() {
            Some(c) => match PieceType::from_char(c) {
                Some(p) if p.is_promotion_target() => Some(p),
                _ => return Err(malformed()),
            },
            None => None,
        };
        Ok((origin, target, promotion))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(p) = self.promotion {
            write!(f, "{}{}{}", self.origin, self.target, p)
        } else {
            write!(f, "{}{}", self.origin, self.target)
        }
    }
}
