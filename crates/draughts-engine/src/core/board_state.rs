use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::core::{
    layout::BoardLayout,
    moves::Move,
    piece::{PieceColor, PieceType},
    position::Position,
};

/// Immutable, bit-packed board position.
///
/// # Encoding
///
/// Only dark squares can hold pieces, so each playable square gets one bit in three
/// 64-bit planes:
///
/// - `presence` - a piece occupies the square
/// - `ranks` - the piece is a king
/// - `colors` - the piece is black
///
/// Rank and color bits are kept at zero for empty squares, so equal boards always have
/// equal planes. Numbering for an 8x8 board (`x` marks light squares):
///
/// ```text
///                      [Black]
///  column:  0   1   2   3   4   5   6   7
/// row: 0 |  x   0   x   1   x   2   x   3
///      1 |  4   x   5   x   6   x   7   x
///      2 |  x   8   x   9   x  10   x  11
///      3 | 12   x  13   x  14   x  15   x
///      4 |  x  16   x  17   x  18   x  19
///      5 | 20   x  21   x  22   x  23   x
///      6 |  x  24   x  25   x  26   x  27
///      7 | 28   x  29   x  30   x  31   x
///                      [White]
/// ```
///
/// Copying, comparing and hashing a state are a handful of word operations, which
/// matters because the search engine creates and discards states at a high rate.
///
/// Equality and hashing consider the three planes, the side to move and the rules
/// variant, never how the position was reached.
#[derive(Debug, Clone, Copy)]
pub struct BoardState {
    presence: u64,
    ranks: u64,
    colors: u64,
    on_move: PieceColor,
    layout: BoardLayout,
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.presence == other.presence
            && self.ranks == other.ranks
            && self.colors == other.colors
            && self.on_move == other.on_move
            && self.layout.variant() == other.layout.variant()
    }
}

impl Eq for BoardState {}

impl Hash for BoardState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.presence.hash(state);
        self.ranks.hash(state);
        self.colors.hash(state);
        self.on_move.hash(state);
        self.layout.variant().hash(state);
    }
}

impl BoardState {
    /// Creates an empty board.
    #[must_use]
    pub const fn empty(layout: BoardLayout, on_move: PieceColor) -> Self {
        Self {
            presence: 0,
            ranks: 0,
            colors: 0,
            on_move,
            layout,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    #[must_use]
    pub const fn on_move(&self) -> PieceColor {
        self.on_move
    }

    /// Returns the same board with a different side to move.
    #[must_use]
    pub const fn with_on_move(mut self, color: PieceColor) -> Self {
        self.on_move = color;
        self
    }

    /// Returns the piece on the given square.
    ///
    /// Light squares are always empty. Positions outside the board are a programmer
    /// error and only checked in debug builds.
    #[must_use]
    pub fn piece(&self, pos: Position) -> PieceType {
        debug_assert!(
            self.layout.contains(pos),
            "position {pos} is outside the board"
        );
        if !pos.is_dark() {
            return PieceType::None;
        }
        let bit = self.layout.bit_index(pos);
        if (self.presence >> bit) & 1 == 0 {
            return PieceType::None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let rank = ((self.ranks >> bit) & 1) as u8;
        #[expect(clippy::cast_possible_truncation)]
        let color = ((self.colors >> bit) & 1) as u8;
        PieceType::from_bits(PieceType::PRESENCE_BIT | (rank << 1) | color)
    }

    /// Returns a copy of the board with the given square set to `piece`.
    ///
    /// Only playable squares can be set. This is checked in debug builds only.
    #[must_use]
    pub fn with_piece(mut self, pos: Position, piece: PieceType) -> Self {
        debug_assert!(
            self.layout.is_playable(pos),
            "position {pos} is not a playable square"
        );
        let bit = self.layout.bit_index(pos);
        let mask = 1_u64 << bit;
        self.presence &= !mask;
        self.ranks &= !mask;
        self.colors &= !mask;

        let bits = piece.bits();
        if bits & PieceType::PRESENCE_BIT != 0 {
            self.presence |= mask;
            if bits & PieceType::RANK_BIT != 0 {
                self.ranks |= mask;
            }
            if bits & PieceType::COLOR_BIT != 0 {
                self.colors |= mask;
            }
        }
        self
    }

    /// Returns the state after playing `mv`.
    ///
    /// The origin square is cleared, the destination receives the moving piece (promoted
    /// if the move says so), every captured square is cleared and the side to move is
    /// swapped.
    ///
    /// Moves must come from the rules component of this board. Debug builds assert that
    /// the moving piece belongs to the side to move, that every landing square is empty
    /// and that every captured square holds an opposing piece.
    #[must_use]
    pub fn apply_move(&self, mv: &Move) -> Self {
        let piece = self.piece(mv.from());
        debug_assert_eq!(
            piece.color(),
            Some(self.on_move),
            "{:?} is not on move (move {mv})",
            piece.color()
        );
        debug_assert!(
            mv.path()[1..].iter().all(|&pos| self.piece(pos).is_none()),
            "cannot land on a non-empty square (move {mv})"
        );
        debug_assert!(
            mv.captured()
                .iter()
                .all(|&pos| self.piece(pos).color() == Some(self.on_move.opponent())),
            "cannot capture an empty square or an own piece (move {mv})"
        );

        let piece = if mv.promotes() {
            piece.promoted()
        } else {
            piece
        };
        let mut next = self
            .with_piece(mv.from(), PieceType::None)
            .with_piece(mv.to(), piece);
        for &pos in mv.captured() {
            next = next.with_piece(pos, PieceType::None);
        }
        next.on_move = self.on_move.opponent();
        next
    }

    /// Iterates over every playable square and its content, in bit-index order.
    ///
    /// The iterator borrows nothing but a copy of the state, so it can be restarted by
    /// calling this method again.
    pub fn iter(&self) -> impl Iterator<Item = (Position, PieceType)> + use<> {
        let state = *self;
        (0..state.layout.playable_squares()).map(move |i| {
            let pos = state.layout.position_of(i);
            (pos, state.piece(pos))
        })
    }

    /// Iterates over occupied squares only.
    pub fn iter_pieces(&self) -> impl Iterator<Item = (Position, PieceType)> + use<> {
        self.iter().filter(|(_, piece)| !piece.is_none())
    }

    /// Number of pieces of the given color.
    #[must_use]
    pub fn count(&self, color: PieceColor) -> u32 {
        let color_mask = match color {
            PieceColor::White => !self.colors,
            PieceColor::Black => self.colors,
        };
        (self.presence & color_mask).count_ones()
    }

    /// Number of kings of the given color.
    #[must_use]
    pub fn count_kings(&self, color: PieceColor) -> u32 {
        let color_mask = match color {
            PieceColor::White => !self.colors,
            PieceColor::Black => self.colors,
        };
        (self.presence & self.ranks & color_mask).count_ones()
    }

    /// Creates a board from ASCII art, for tests and fixtures.
    ///
    /// One line per row from row 0 (Black's side) downwards, one character per column:
    /// `w`/`W` white man/king, `b`/`B` black man/king, `.` empty. Blank lines and
    /// spaces are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the art does not match the layout or places a piece on a light square.
    #[must_use]
    pub fn from_ascii(layout: BoardLayout, on_move: PieceColor, art: &str) -> Self {
        let mut state = Self::empty(layout, on_move);
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert_eq!(
            lines.len(),
            usize::from(layout.rows()),
            "expected {} rows, got {}",
            layout.rows(),
            lines.len()
        );

        for (row, line) in (0_u8..).zip(&lines) {
            let cells: Vec<PieceType> = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| {
                    PieceType::from_char(c)
                        .unwrap_or_else(|| panic!("invalid cell '{c}' at row {row}"))
                })
                .collect();
            assert_eq!(
                cells.len(),
                usize::from(layout.columns()),
                "expected {} cells, got {} at row {row}",
                layout.columns(),
                cells.len()
            );
            for (column, piece) in (0_u8..).zip(cells) {
                if piece.is_none() {
                    continue;
                }
                let pos = Position::new(column, row);
                assert!(pos.is_dark(), "piece on light square {pos}");
                state = state.with_piece(pos, piece);
            }
        }
        state
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.layout.rows() {
            for column in 0..self.layout.columns() {
                write!(f, "{}", self.piece(Position::new(column, row)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move", self.on_move)
    }
}
