use std::fmt;

use serde::{Deserialize, Serialize};

/// A square on the board, addressed by column and row.
///
/// Row 0 is Black's home row (top of the board), the last row is White's home row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: u8,
    row: u8,
}

impl Position {
    #[must_use]
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }

    #[must_use]
    pub const fn column(self) -> u8 {
        self.column
    }

    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns `true` for dark squares, the only squares pieces can stand on.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        (self.column + self.row) & 1 == 1
    }

    /// Returns the position shifted by the given offset, or `None` if it leaves the
    /// non-negative quadrant.
    #[must_use]
    pub fn offset(self, dc: i8, dr: i8) -> Option<Self> {
        let column = self.column.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        Some(Self { column, row })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}
