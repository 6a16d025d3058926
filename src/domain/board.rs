/// The board: a fixed-size grid of cells, rebuilt every frame.
///
/// Invariant: the outer ring (row 0, last row, column 0, last column)
/// is always `Cell::Wall`.

use super::cell::Cell;
use super::entity::Placeable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl Board {
    /// Allocate a board filled with `fill`, ringed by walls.
    pub fn new(width: usize, height: usize, fill: Cell) -> Self {
        let cells = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if y == 0 || y + 1 == height || x == 0 || x + 1 == width {
                            Cell::Wall
                        } else {
                            fill
                        }
                    })
                    .collect()
            })
            .collect();
        Board { cells, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y). Out of bounds reads as wall.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y][x]
        } else {
            Cell::Wall
        }
    }

    /// Write a cell. Writes outside the board are dropped.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y][x] = cell;
        }
    }

    /// Stamp the border of the rectangle (inclusive bounds) with walls.
    /// The interior is left as it was.
    pub fn draw_room(&mut self, top: usize, left: usize, bottom: usize, right: usize) {
        for x in left..=right {
            self.set(x, top, Cell::Wall);
            self.set(x, bottom, Cell::Wall);
        }
        for y in top..=bottom {
            self.set(left, y, Cell::Wall);
            self.set(right, y, Cell::Wall);
        }
    }

    /// Put an entity on the board using its own cell. Last write wins.
    pub fn add<P: Placeable>(&mut self, entity: &P) {
        self.add_as(entity, entity.cell());
    }

    /// Put an entity on the board with an explicit cell.
    pub fn add_as<P: Placeable>(&mut self, entity: &P, cell: Cell) {
        let (x, y) = entity.position();
        self.set(x, y, cell);
    }

    /// Flatten to text: one line per row, each terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut screen = String::with_capacity((self.width + 1) * self.height);
        for row in &self.cells {
            screen.extend(row.iter().map(|c| c.glyph()));
            screen.push('\n');
        }
        screen
    }
}
