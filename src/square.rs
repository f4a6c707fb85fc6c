use crate::error::ChessError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A board coordinate in array order: row 0 is rank 8, row 7 is rank 1,
/// col 0 is the a-file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Builds a square from array indices, `None` if either is off the board
    pub fn new(row: usize, col: usize) -> Option<Square> {
        if row < 8 && col < 8 {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }
    pub fn col(&self) -> usize {
        self.col as usize
    }

    /// Rank number as printed on a board (1..=8)
    pub fn rank(&self) -> u8 {
        8 - self.row
    }

    /// Returns the square `d_row` rows and `d_col` columns away, if it exists
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Mirrors the square across the horizontal middle line (a1 <-> a8)
    pub fn vertical_symmetry(&self) -> Square {
        Square {
            row: 7 - self.row,
            col: self.col,
        }
    }

    /// Every square in array order, a8 first
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(|i| Square {
            row: i / 8,
            col: i % 8,
        })
    }

    /// Parses a two character coordinate such as `e4`
    pub fn parse(s: &str) -> Result<Square, ChessError> {
        if s.len() != 2 {
            return Err(ChessError::InvalidCoordinate(s.to_string()));
        }
        square_to_position(s)
            .and_then(|(row, col)| Square::new(row, col))
            .ok_or_else(|| ChessError::InvalidCoordinate(s.to_string()))
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parse(s)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let file = (b'a' + self.col) as char;
        write!(f, "{}{}", file, self.rank())
    }
}

/// Converts a coordinate into its (row, col) pair,
/// only caring that the first two characters form a valid square representation
/// ```
/// use gambit::square::square_to_position;
/// assert_eq!(square_to_position("a8"), Some((0, 0)));
/// assert_eq!(square_to_position("e2"), Some((6, 4)));
/// assert_eq!(square_to_position("h1andmore"), Some((7, 7)));
/// assert_eq!(square_to_position("k9"), None);
/// ```
pub fn square_to_position(s: &str) -> Option<(usize, usize)> {
    let mut chars_iter = s.chars();
    let col = match chars_iter.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let row = match chars_iter.next()?.to_digit(10) {
        Some(rank) if (1..=8).contains(&rank) => 8 - rank as usize,
        _ => return None,
    };
    Some((row, col))
}

/// Returns the coordinate of a (row, col) pair
/// ```
/// use gambit::square::position_to_square;
/// assert_eq!(position_to_square(6, 4), Some(String::from("e2")));
/// assert_eq!(position_to_square(0, 7), Some(String::from("h8")));
/// assert_eq!(position_to_square(8, 0), None);
/// ```
pub fn position_to_square(row: usize, col: usize) -> Option<String> {
    Square::new(row, col).map(|sq| sq.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_round_trip_on_every_square() {
        for file in 'a'..='h' {
            for rank in '1'..='8' {
                let s: String = [file, rank].iter().collect();
                let (row, col) = square_to_position(&s).unwrap();
                assert_eq!(position_to_square(row, col), Some(s.clone()));
                assert_eq!(Square::parse(&s).unwrap().to_string(), s);
            }
        }
    }

    #[test]
    fn rejects_coordinates_off_the_board() {
        for bad in ["", "e", "i1", "a0", "a9", "e44", "4e"] {
            assert!(
                matches!(Square::parse(bad), Err(ChessError::InvalidCoordinate(_))),
                "{} should not parse",
                bad
            );
        }
    }

    #[test]
    fn offsets_stay_on_the_board() {
        let a8 = Square::parse("a8").unwrap();
        assert_eq!(a8.offset(-1, 0), None);
        assert_eq!(a8.offset(0, -1), None);
        assert_eq!(a8.offset(1, 1), Some(Square::parse("b7").unwrap()));
        assert_eq!(Square::parse("h1").unwrap().offset(1, 0), None);
        assert_eq!(Square::all().count(), 64);
        assert_eq!(a8.vertical_symmetry(), Square::parse("a1").unwrap());
    }
}
