use arrayvec::ArrayVec;

use crate::{
    Rules,
    core::{BoardLayout, BoardState, Move, PieceColor, PieceRank, PieceType, Position, RulesVariant},
};

const SIZE: u8 = 8;
const HOME_ROWS: u8 = 3;
const MOVE_LIMIT_FOR_TIE: usize = 150;

type Directions = ArrayVec<(i8, i8), 4>;

/// English draughts (checkers) on an 8x8 board.
///
/// - White starts at the bottom (rows 5-7) and moves first, Black starts on rows 0-2
/// - Men move and capture diagonally forward only, kings move one square in any
///   diagonal direction
/// - Capturing is mandatory, and a capturing piece must continue jumping while it can
/// - A man reaching the far row is promoted and its move ends there
/// - The game is a tie after [`Rules::move_limit_for_tie`] plies
#[derive(Debug, Clone)]
pub struct EnglishDraughts {
    layout: BoardLayout,
}

impl Default for EnglishDraughts {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishDraughts {
    #[must_use]
    pub fn new() -> Self {
        let layout = BoardLayout::new(RulesVariant::English, SIZE, SIZE)
            .expect("8x8 layout is always valid");
        Self { layout }
    }

    fn directions(piece: PieceType) -> Directions {
        let mut dirs = Directions::new();
        let forward = match piece.color() {
            Some(PieceColor::White) => -1,
            Some(PieceColor::Black) => 1,
            None => return dirs,
        };
        dirs.push((-1, forward));
        dirs.push((1, forward));
        if piece.rank() == Some(PieceRank::King) {
            dirs.push((-1, -forward));
            dirs.push((1, -forward));
        }
        dirs
    }

    fn step(&self, pos: Position, dc: i8, dr: i8) -> Option<Position> {
        pos.offset(dc, dr).filter(|&p| self.layout.contains(p))
    }

    fn promotes(&self, piece: PieceType, to: Position) -> bool {
        match (piece.rank(), piece.color()) {
            (Some(PieceRank::Man), Some(color)) => to.row() == self.layout.promotion_row(color),
            _ => false,
        }
    }

    fn push_simple_moves(&self, state: &BoardState, from: Position, moves: &mut Vec<Move>) {
        let piece = state.piece(from);
        for (dc, dr) in Self::directions(piece) {
            let Some(to) = self.step(from, dc, dr) else {
                continue;
            };
            if state.piece(to).is_none() {
                moves.push(Move::step(from, to, self.promotes(piece, to)));
            }
        }
    }

    /// Extends a jump chain from the last square of `path`.
    ///
    /// Landing squares are checked against the board before the move, so the origin
    /// square counts as occupied and a chain can never pass through it.
    fn push_jumps(
        &self,
        state: &BoardState,
        piece: PieceType,
        path: &mut Vec<Position>,
        captured: &mut Vec<Position>,
        moves: &mut Vec<Move>,
    ) {
        let Some(&at) = path.last() else {
            return;
        };
        let opponent = state.on_move().opponent();
        let mut extended = false;

        for (dc, dr) in Self::directions(piece) {
            let Some(over) = self.step(at, dc, dr) else {
                continue;
            };
            let Some(to) = self.step(over, dc, dr) else {
                continue;
            };
            if state.piece(over).color() != Some(opponent)
                || captured.contains(&over)
                || !state.piece(to).is_none()
            {
                continue;
            }

            extended = true;
            path.push(to);
            captured.push(over);
            if self.promotes(piece, to) {
                moves.push(Move::new(path.clone(), captured.clone(), true));
            } else {
                self.push_jumps(state, piece, path, captured, moves);
            }
            path.pop();
            captured.pop();
        }

        if !extended && path.len() >= 2 {
            moves.push(Move::new(path.clone(), captured.clone(), false));
        }
    }
}

impl Rules for EnglishDraughts {
    fn variant(&self) -> RulesVariant {
        RulesVariant::English
    }

    fn layout(&self) -> BoardLayout {
        self.layout
    }

    fn initial_state(&self) -> BoardState {
        let mut state = BoardState::empty(self.layout, self.starting_color());
        for pos in self.layout.playable_positions() {
            if pos.row() < HOME_ROWS {
                state = state.with_piece(pos, PieceType::BlackMan);
            } else if pos.row() >= SIZE - HOME_ROWS {
                state = state.with_piece(pos, PieceType::WhiteMan);
            }
        }
        state
    }

    fn starting_color(&self) -> PieceColor {
        PieceColor::White
    }

    fn move_limit_for_tie(&self) -> usize {
        MOVE_LIMIT_FOR_TIE
    }

    fn available_moves(&self, state: &BoardState) -> Vec<Move> {
        let own: Vec<(Position, PieceType)> = state
            .iter_pieces()
            .filter(|(_, piece)| piece.color() == Some(state.on_move()))
            .collect();

        let mut captures = vec![];
        let mut path = vec![];
        let mut captured = vec![];
        for &(pos, piece) in &own {
            path.push(pos);
            self.push_jumps(state, piece, &mut path, &mut captured, &mut captures);
            path.clear();
            captured.clear();
        }
        if !captures.is_empty() {
            return captures;
        }

        let mut moves = vec![];
        for &(pos, _) in &own {
            self.push_simple_moves(state, pos, &mut moves);
        }
        moves
    }
}
