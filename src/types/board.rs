//! Board primitives: colors, ranks, pieces, squares and the board itself.
//!
//! Pieces carry a tagged `(color, rank)` pair internally but serialize to the
//! wire strings `"red"`, `"blue"`, `"red_king"`, `"blue_king"` so board
//! payloads stay compatible with existing clients. Empty squares serialize
//! as `null`.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red starts at rows 0-2 and moves toward row 7.
    Red,
    /// Blue starts at rows 5-7 and moves toward row 0.
    Blue,
}

impl Color {
    /// Get the opposing color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Row delta for this color's forward direction.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Blue => -1,
        }
    }

    /// The farthest row for this color; landing there promotes a man.
    #[must_use]
    pub const fn crown_row(self) -> u8 {
        match self {
            Self::Red => 7,
            Self::Blue => 0,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Rank of a piece: an ordinary man or a crowned king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    /// Moves one step toward the far row; jumps in any diagonal direction.
    Man,
    /// Slides any distance along diagonals and captures while sliding.
    King,
}

/// A piece on the board. Immutable value; promotion replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Owning side.
    pub color: Color,
    /// Man or king.
    pub rank: Rank,
}

impl Piece {
    /// Create a man of the given color.
    #[must_use]
    pub const fn man(color: Color) -> Self {
        Self {
            color,
            rank: Rank::Man,
        }
    }

    /// Create a king of the given color.
    #[must_use]
    pub const fn king(color: Color) -> Self {
        Self {
            color,
            rank: Rank::King,
        }
    }

    /// Returns true if this piece is a king.
    #[must_use]
    pub const fn is_king(self) -> bool {
        matches!(self.rank, Rank::King)
    }

    /// The king-ranked piece of the same color.
    #[must_use]
    pub const fn promoted(self) -> Self {
        Self::king(self.color)
    }

    /// Wire representation of this piece.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match (self.color, self.rank) {
            (Color::Red, Rank::Man) => "red",
            (Color::Red, Rank::King) => "red_king",
            (Color::Blue, Rank::Man) => "blue",
            (Color::Blue, Rank::King) => "blue_king",
        }
    }

    /// Parse the wire representation.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Self::man(Color::Red)),
            "red_king" => Some(Self::king(Color::Red)),
            "blue" => Some(Self::man(Color::Blue)),
            "blue_king" => Some(Self::king(Color::Blue)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_wire(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown piece encoding: {s:?}")))
    }
}

/// A square on the 8x8 board, addressed as `(row, col)`.
///
/// Construction is checked, so a `Square` value is always in bounds.
/// Serializes as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Create a square from row and column, both in `[0, 8)`.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < Board::SIZE as u8 && col < Board::SIZE as u8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Row index, 0-7.
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Column index, 0-7.
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Step by the given deltas, returning `None` when the result leaves
    /// the board.
    #[must_use]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        if (0..Board::SIZE as i16).contains(&row) && (0..Board::SIZE as i16).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Returns true for the playable (dark) squares, where `row + col` is odd.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.row, self.col).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (row, col) = <(u8, u8)>::deserialize(deserializer)?;
        Self::new(row, col)
            .ok_or_else(|| de::Error::custom(format!("square ({row}, {col}) out of bounds")))
    }
}

/// An 8x8 grid of optional pieces.
///
/// Pure data; the rules live in [`crate::checkers::engine`]. Serializes as
/// the row-major grid of wire strings clients render directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    squares: [[Option<Piece>; Board::SIZE]; Board::SIZE],
}

impl Board {
    /// Side length of the board.
    pub const SIZE: usize = 8;

    /// An empty board.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [[None; Self::SIZE]; Self::SIZE],
        }
    }

    /// The standard starting position: red men on the dark squares of rows
    /// 0-2, blue men on the dark squares of rows 5-7.
    #[must_use]
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for row in 0..Self::SIZE as u8 {
            for col in 0..Self::SIZE as u8 {
                let sq = Square::new(row, col).expect("loop stays in bounds");
                if !sq.is_dark() {
                    continue;
                }
                if row < 3 {
                    board.set(sq, Some(Piece::man(Color::Red)));
                } else if row > 4 {
                    board.set(sq, Some(Piece::man(Color::Blue)));
                }
            }
        }
        board
    }

    /// Piece on the given square, if any.
    #[must_use]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    /// Place (or clear) the given square.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row() as usize][sq.col() as usize] = piece;
    }

    /// Remove and return the piece on the given square.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize].take()
    }

    /// Number of pieces of the given color remaining.
    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }

    /// Iterate over all occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter().enumerate().filter_map(move |(col, piece)| {
                let sq = Square::new(row as u8, col as u8)?;
                Some((sq, (*piece)?))
            })
        })
    }

    /// Iterate over the squares occupied by the given color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn square_bounds() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
    }

    #[test]
    fn square_offset_stays_in_bounds() {
        assert_eq!(sq(3, 3).offset(1, 1), Some(sq(4, 4)));
        assert_eq!(sq(0, 0).offset(-1, 1), None);
        assert_eq!(sq(7, 7).offset(1, -1), None);
        assert_eq!(sq(7, 0).offset(-1, -1), None);
    }

    #[test]
    fn standard_layout() {
        let board = Board::standard();
        assert_eq!(board.count(Color::Red), 12);
        assert_eq!(board.count(Color::Blue), 12);
        for (square, piece) in board.pieces() {
            assert!(square.is_dark(), "piece on light square {square}");
            assert_eq!(piece.rank, Rank::Man);
        }
        assert_eq!(board.get(sq(0, 1)), Some(Piece::man(Color::Red)));
        assert_eq!(board.get(sq(7, 0)), Some(Piece::man(Color::Blue)));
        assert_eq!(board.get(sq(3, 0)), None);
        assert_eq!(board.get(sq(4, 1)), None);
    }

    #[test]
    fn piece_wire_roundtrip() {
        for piece in [
            Piece::man(Color::Red),
            Piece::king(Color::Red),
            Piece::man(Color::Blue),
            Piece::king(Color::Blue),
        ] {
            assert_eq!(Piece::from_wire(piece.as_wire()), Some(piece));
        }
        assert_eq!(Piece::from_wire("green"), None);
    }

    #[test]
    fn board_serializes_as_wire_grid() {
        let mut board = Board::empty();
        board.set(sq(0, 1), Some(Piece::man(Color::Red)));
        board.set(sq(7, 0), Some(Piece::king(Color::Blue)));

        let json = serde_json::to_value(&board).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0][1], serde_json::json!("red"));
        assert_eq!(rows[0][0], serde_json::Value::Null);
        assert_eq!(rows[7][0], serde_json::json!("blue_king"));

        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn square_serializes_as_pair() {
        let json = serde_json::to_value(sq(3, 4)).unwrap();
        assert_eq!(json, serde_json::json!([3, 4]));
        let back: Square = serde_json::from_value(json).unwrap();
        assert_eq!(back, sq(3, 4));
        assert!(serde_json::from_value::<Square>(serde_json::json!([8, 0])).is_err());
    }

    #[test]
    fn promotion_keeps_color() {
        let man = Piece::man(Color::Blue);
        let king = man.promoted();
        assert_eq!(king.color, Color::Blue);
        assert!(king.is_king());
    }
}
