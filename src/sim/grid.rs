/// Grid: the cell map of one stage.
///
/// ## Layout
///
///   - Border cells are `Wall`, the four corners are `Corner`.
///   - Interior starts `Empty`; stage setup lays obstacles on top.
///   - Items and gate markers are written by the item manager.
///
/// All mutations go through `set()`. Reads outside the grid return
/// `Wall`, so stepping off the map is a wall collision.

use crate::domain::cell::{Cell, Pos};
use crate::domain::rules::MapView;

#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,
}

impl Grid {
    /// Fresh map: empty interior, wall border, corner markers.
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Grid {
            cells: vec![vec![Cell::Empty; width]; height],
            width,
            height,
        };
        grid.setup_map();
        grid
    }

    /// Reallocate and draw the border.
    pub fn setup_map(&mut self) {
        self.cells = vec![vec![Cell::Empty; self.width]; self.height];
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.cells[0][x] = Cell::Wall;
            self.cells[h - 1][x] = Cell::Wall;
        }
        for y in 0..h {
            self.cells[y][0] = Cell::Wall;
            self.cells[y][w - 1] = Cell::Wall;
        }
        self.cells[0][0] = Cell::Corner;
        self.cells[0][w - 1] = Cell::Corner;
        self.cells[h - 1][0] = Cell::Corner;
        self.cells[h - 1][w - 1] = Cell::Corner;
    }

    /// Reset everything except walls and corners to Empty.
    pub fn clear_interior(&mut self) {
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                if !cell.is_lethal() {
                    *cell = Cell::Empty;
                }
            }
        }
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        if self.contains(pos) {
            self.cells[pos.y as usize][pos.x as usize]
        } else {
            Cell::Wall // out of bounds = wall
        }
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        if self.contains(pos) {
            self.cells[pos.y as usize][pos.x as usize] = cell;
        }
    }

    /// Draw a wall line from `from` (inclusive) `len` cells along (dx, dy).
    pub fn draw_wall(&mut self, from: Pos, dx: i32, dy: i32, len: i32) {
        for i in 0..len {
            self.set(from.offset(dx * i, dy * i), Cell::Wall);
        }
    }

    /// Every in-bounds position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Pos::new(x, y)))
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn view(&self) -> MapView<'_> {
        MapView { cells: &self.cells, width: self.width, height: self.height }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }
}
