use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of a piece, or the side to move.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
    derive_more::Display,
    derive_more::FromStr,
)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Sign applied to scores from White's point of view.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::White => 1.0,
            Self::Black => -1.0,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum PieceRank {
    Man,
    King,
}

impl PieceRank {
    const fn bit(self) -> u8 {
        match self {
            Self::Man => 0,
            Self::King => 1,
        }
    }
}

/// Content of a board square.
///
/// The discriminants follow the bit-plane encoding used by
/// [`BoardState`](crate::BoardState): bit 2 is presence, bit 1 is rank (king), bit 0 is
/// color (black).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[repr(u8)]
pub enum PieceType {
    #[default]
    None = 0b000,
    WhiteMan = 0b100,
    BlackMan = 0b101,
    WhiteKing = 0b110,
    BlackKing = 0b111,
}

impl PieceType {
    pub(crate) const PRESENCE_BIT: u8 = 0b100;
    pub(crate) const RANK_BIT: u8 = 0b010;
    pub(crate) const COLOR_BIT: u8 = 0b001;

    #[must_use]
    pub const fn from_parts(color: PieceColor, rank: PieceRank) -> Self {
        Self::from_bits(Self::PRESENCE_BIT | (rank.bit() << 1) | color.bit())
    }

    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b100 => Self::WhiteMan,
            0b101 => Self::BlackMan,
            0b110 => Self::WhiteKing,
            0b111 => Self::BlackKing,
            _ => Self::None,
        }
    }

    pub(crate) const fn bits(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn color(self) -> Option<PieceColor> {
        match self {
            Self::None => None,
            Self::WhiteMan | Self::WhiteKing => Some(PieceColor::White),
            Self::BlackMan | Self::BlackKing => Some(PieceColor::Black),
        }
    }

    #[must_use]
    pub const fn rank(self) -> Option<PieceRank> {
        match self {
            Self::None => None,
            Self::WhiteMan | Self::BlackMan => Some(PieceRank::Man),
            Self::WhiteKing | Self::BlackKing => Some(PieceRank::King),
        }
    }

    /// Returns the king of the same color. Kings and empty squares are unchanged.
    #[must_use]
    pub const fn promoted(self) -> Self {
        match self {
            Self::WhiteMan => Self::WhiteKing,
            Self::BlackMan => Self::BlackKing,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::None => '.',
            Self::WhiteMan => 'w',
            Self::WhiteKing => 'W',
            Self::BlackMan => 'b',
            Self::BlackKing => 'B',
        }
    }

    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' | '_' => Some(Self::None),
            'w' => Some(Self::WhiteMan),
            'W' => Some(Self::WhiteKing),
            'b' => Some(Self::BlackMan),
            'B' => Some(Self::BlackKing),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
