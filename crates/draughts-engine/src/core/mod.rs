pub use self::{board_state::*, layout::*, moves::*, piece::*, position::*};

pub(crate) mod board_state;
pub(crate) mod layout;
pub(crate) mod moves;
pub(crate) mod piece;
pub(crate) mod position;
