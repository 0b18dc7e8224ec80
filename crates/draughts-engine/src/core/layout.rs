use std::fmt;

use crate::{LayoutError, PieceColor, core::position::Position};

/// Identifier of a rules variant.
///
/// Two board states only compare equal if they were produced under the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesVariant {
    English,
    /// Variants defined outside this crate, e.g. synthetic rules used in tests.
    Custom(u32),
}

impl fmt::Display for RulesVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "english"),
            Self::Custom(id) => write!(f, "custom#{id}"),
        }
    }
}

/// Dimensions of the board together with the rules variant identifier.
///
/// Only dark squares (`(row + column)` odd) are playable. With an even number of
/// columns, every row holds exactly `columns / 2` playable squares, so the square at
/// `(column, row)` maps to bit `(row * columns + column) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardLayout {
    variant: RulesVariant,
    columns: u8,
    rows: u8,
}

impl BoardLayout {
    pub const MAX_PLAYABLE_SQUARES: usize = 64;

    pub fn new(variant: RulesVariant, columns: u8, rows: u8) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::Empty);
        }
        if columns % 2 != 0 {
            return Err(LayoutError::OddColumns { columns });
        }
        let squares = usize::from(columns) * usize::from(rows) / 2;
        if squares > Self::MAX_PLAYABLE_SQUARES {
            return Err(LayoutError::TooManySquares { squares });
        }
        Ok(Self {
            variant,
            columns,
            rows,
        })
    }

    #[must_use]
    pub const fn variant(&self) -> RulesVariant {
        self.variant
    }

    #[must_use]
    pub const fn columns(&self) -> u8 {
        self.columns
    }

    #[must_use]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of playable (dark) squares.
    #[must_use]
    pub fn playable_squares(&self) -> usize {
        usize::from(self.columns) * usize::from(self.rows) / 2
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.column() < self.columns && pos.row() < self.rows
    }

    #[must_use]
    pub fn is_playable(&self, pos: Position) -> bool {
        self.contains(pos) && pos.is_dark()
    }

    /// Bit index of a playable square.
    #[must_use]
    pub(crate) fn bit_index(&self, pos: Position) -> u32 {
        (u32::from(pos.row()) * u32::from(self.columns) + u32::from(pos.column())) >> 1
    }

    /// Inverse of [`Self::bit_index`].
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn position_of(&self, index: usize) -> Position {
        let half = usize::from(self.columns / 2);
        let row = index / half;
        let column = (index % half) * 2 + usize::from(row % 2 == 0);
        Position::new(column as u8, row as u8)
    }

    /// Iterates over all playable squares in bit-index order.
    pub fn playable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.playable_squares()).map(|i| self.position_of(i))
    }

    /// Row a man of the given color promotes on.
    #[must_use]
    pub fn promotion_row(&self, color: PieceColor) -> u8 {
        match color {
            PieceColor::White => 0,
            PieceColor::Black => self.rows - 1,
        }
    }
}
