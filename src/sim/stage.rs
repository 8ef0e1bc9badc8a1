/// Stage layouts.
///
/// Four built-in stages, all drawn relative to the grid size:
///
///   1. Open field.
///   2. L-shaped wall in the lower left:
///        vertical   x = 15,          y ∈ [h-15, h-5)
///        horizontal y = h-15,        x ∈ [5, 15)
///   3. Two horizontal walls at h/3 and 2h/3, x ∈ [5, w-5).
///   4. Windmill at the center (blade length 5, starts vertical);
///      the serpent starts top-right heading down.
///
/// Stage 1-3 serpents start at the grid center heading right.

use crate::domain::cell::{Cell, Pos};
use crate::domain::serpent::Direction;
use crate::domain::windmill::Windmill;
use super::grid::Grid;

pub const FIRST_STAGE: u8 = 1;
pub const FINAL_STAGE: u8 = 4;
pub const WINDMILL_LENGTH: i32 = 5;

/// Smallest grid every layout fits in.
pub const MIN_WIDTH: usize = 36;
pub const MIN_HEIGHT: usize = 20;

/// Where the serpent spawns and which way it heads.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawn {
    pub head: Pos,
    pub heading: Direction,
}

pub fn spawn_for(level: u8, width: usize, height: usize) -> Spawn {
    let (w, h) = (width as i32, height as i32);
    if level == FINAL_STAGE {
        Spawn { head: Pos::new(w - 5, 1), heading: Direction::Down }
    } else {
        Spawn { head: Pos::new(w / 2, h / 2), heading: Direction::Right }
    }
}

/// Draw the stage's static obstacles onto a cleared grid.
/// Returns the windmill for the stage that has one.
pub fn lay_obstacles(grid: &mut Grid, level: u8) -> Option<Windmill> {
    grid.clear_interior();
    let (w, h) = (grid.width as i32, grid.height as i32);

    match level {
        2 => {
            let corner_x = 15;
            let top_y = h - 15;
            grid.draw_wall(Pos::new(corner_x, top_y), 0, 1, (h - 5) - top_y);
            grid.draw_wall(Pos::new(5, top_y), 1, 0, corner_x - 5);
            None
        }
        3 => {
            let span = (w - 5) - 5;
            grid.draw_wall(Pos::new(5, h / 3), 1, 0, span);
            grid.draw_wall(Pos::new(5, 2 * h / 3), 1, 0, span);
            None
        }
        FINAL_STAGE => {
            let windmill = Windmill::new(Pos::new(w / 2, h / 2), WINDMILL_LENGTH);
            for pos in windmill.blade_cells() {
                grid.set(pos, Cell::Wall);
            }
            Some(windmill)
        }
        _ => None,
    }
}
