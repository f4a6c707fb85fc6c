use crate::piece::Color;
use crate::piece::Color::{Black, White};
use crate::square::Square;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    pub const BOTH: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    /// Home column of the rook castling on this wing
    pub fn rook_col(&self) -> usize {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }
    /// Column the king lands on
    pub fn king_target_col(&self) -> usize {
        match self {
            CastlingSide::KingSide => 6,
            CastlingSide::QueenSide => 2,
        }
    }
    /// Column the rook lands on, which is also the square the king passes through
    pub fn rook_target_col(&self) -> usize {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }
    /// Home square of the rook of `color` on this wing
    pub fn rook_home(&self, color: Color) -> Square {
        home(color, self.rook_col())
    }
}

/// King's starting square for `color`
pub fn king_home(color: Color) -> Square {
    home(color, 4)
}

fn home(color: Color, col: usize) -> Square {
    match Square::new(color.back_row(), col) {
        Some(sq) => sq,
        None => unreachable!("back rows and castling columns are on the board"),
    }
}

/// Four independent permissions, one per color and wing.
/// Rights are only ever revoked, never granted back.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub fn new() -> CastlingRights {
        CastlingRights(0b1111)
    }
    pub fn none() -> CastlingRights {
        CastlingRights(0)
    }
    /// Reads the castling field of a FEN string (`KQkq`, `Kq`, `-`)
    pub fn from_field(s: &str) -> CastlingRights {
        let mut res = CastlingRights(0);
        if s.contains('K') {
            res.0 |= 0b1000
        }
        if s.contains('Q') {
            res.0 |= 0b0100
        }
        if s.contains('k') {
            res.0 |= 0b0010
        }
        if s.contains('q') {
            res.0 |= 0b0001
        }
        res
    }

    fn mask(color: Color, side: CastlingSide) -> u8 {
        match (color, side) {
            (White, CastlingSide::KingSide) => 0b1000,
            (White, CastlingSide::QueenSide) => 0b0100,
            (Black, CastlingSide::KingSide) => 0b0010,
            (Black, CastlingSide::QueenSide) => 0b0001,
        }
    }

    pub fn has(&self, color: Color, side: CastlingSide) -> bool {
        self.0 & Self::mask(color, side) != 0
    }

    /// Returns the (kingside, queenside) rights of a given color
    pub fn get(&self, color: Color) -> (bool, bool) {
        (
            self.has(color, CastlingSide::KingSide),
            self.has(color, CastlingSide::QueenSide),
        )
    }

    /// Returns a copy with the given wing revoked
    pub fn without(self, color: Color, side: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 & !Self::mask(color, side))
    }

    /// Returns a copy with both wings of `color` revoked
    pub fn without_color(self, color: Color) -> CastlingRights {
        self.without(color, CastlingSide::KingSide)
            .without(color, CastlingSide::QueenSide)
    }

    /// Rights left once a piece has moved from `origin` to `target`.
    /// Touching a king's or rook's home square, by leaving it or capturing on
    /// it, revokes every right tied to that square.
    pub fn after_move(self, origin: Square, target: Square) -> CastlingRights {
        let mut rights = self;
        for color in [White, Black] {
            if origin == king_home(color) {
                rights = rights.without_color(color);
            }
            for side in CastlingSide::BOTH {
                let rook_home = side.rook_home(color);
                if origin == rook_home || target == rook_home {
                    rights = rights.without(color, side);
                }
            }
        }
        rights
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}
