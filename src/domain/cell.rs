/// Board cell values and their glyphs.
/// The board stores typed cells; characters only appear when a frame
/// is flattened to text.

use super::entity::{EnemyKind, GateOrientation, ItemKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Wall,
    Gate(GateOrientation),
    Enemy(EnemyKind),
    Item(ItemKind),
    Player,
}

impl Cell {
    pub const EMPTY_GLYPH: char = ' ';
    pub const WALL_GLYPH: char = '#';
    pub const PLAYER_GLYPH: char = '@';

    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => Self::EMPTY_GLYPH,
            Cell::Wall => Self::WALL_GLYPH,
            Cell::Gate(o) => o.glyph(),
            Cell::Enemy(k) => k.glyph(),
            Cell::Item(k) => k.glyph(),
            Cell::Player => Self::PLAYER_GLYPH,
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Enemy kind shown in this cell, if any.
    pub fn enemy(self) -> Option<EnemyKind> {
        match self {
            Cell::Enemy(k) => Some(k),
            _ => None,
        }
    }

    /// Item kind shown in this cell, if any.
    pub fn item(self) -> Option<ItemKind> {
        match self {
            Cell::Item(k) => Some(k),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}
