/// Gate exit rules, truth-table driven.
///
/// Pure functions over a read-only map view and the serpent body.
/// These decide "where may the serpent come out" without moving it.
///
/// ## Exit Candidate Order
/// ┌───────────────┬────────────────────────────┐
/// │ Entry moving  │ Candidates (first wins)    │
/// ├───────────────┼────────────────────────────┤
/// │ Up            │ Up, Right, Left, Down      │
/// │ Down          │ Down, Right, Left, Up      │
/// │ Left          │ Left, Up, Down, Right      │
/// │ Right         │ Right, Down, Up, Left      │
/// └───────────────┴────────────────────────────┘
///
/// ## Candidate Acceptance
/// ┌──────────────────────────────┬───────────┐
/// │ Condition on cell beside exit │ Accept?   │
/// ├──────────────────────────────┼───────────┤
/// │ Outside the grid              │ NO        │
/// │ Cell not Empty                │ NO        │
/// │ Serpent segment on the cell   │ NO        │
/// │ Otherwise                     │ YES       │
/// └──────────────────────────────┴───────────┘
///
/// No accepted candidate → no safe exit, the run ends.

use super::cell::{Cell, Pos};
use super::serpent::{Direction, Serpent};

/// Immutable view of the cell map for rule queries.
pub struct MapView<'a> {
    pub cells: &'a [Vec<Cell>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        if !self.contains(pos) {
            return Cell::Wall; // out of bounds = wall
        }
        self.cells[pos.y as usize][pos.x as usize]
    }
}

/// Can the serpent be placed on `pos` as it leaves a gate?
pub fn is_safe_exit(map: &MapView, serpent: &Serpent, pos: Pos) -> bool {
    map.contains(pos) && map.cell_at(pos).is_open() && !serpent.occupies(pos)
}

/// First acceptable cell next to `exit_gate`, in priority order for the
/// serpent's current direction. Returns the new head and heading.
pub fn find_gate_exit(map: &MapView, serpent: &Serpent, exit_gate: Pos) -> Option<(Pos, Direction)> {
    serpent
        .direction()
        .exit_priority()
        .into_iter()
        .map(|dir| (exit_gate.step(dir), dir))
        .find(|&(pos, _)| is_safe_exit(map, serpent, pos))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::serpent::SpeedProfile;
    use std::time::Instant;

    /// Legend: '#'=Wall  '*'=Corner  'G'=Gate  '+'=Grow  ' '=Empty
    fn map_from(rows: &[&str]) -> (Vec<Vec<Cell>>, usize, usize) {
        let height = rows.len();
        let width = rows[0].len();
        let mut cells = vec![vec![Cell::Empty; width]; height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y][x] = match ch {
                    '#' => Cell::Wall,
                    '*' => Cell::Corner,
                    'G' => Cell::Gate,
                    '+' => Cell::Grow,
                    _ => Cell::Empty,
                };
            }
        }
        (cells, width, height)
    }

    fn serpent(head: Pos, dir: Direction) -> Serpent {
        let mut s = Serpent::new(head, SpeedProfile::default(), Instant::now());
        if dir != Direction::Right {
            // Turn through a perpendicular when asked to face Left
            if dir == Direction::Left {
                s.set_direction(Direction::Up).unwrap();
            }
            s.set_direction(dir).unwrap();
        }
        s
    }

    #[test]
    fn straight_through_preferred() {
        let (c, w, h) = map_from(&[
            "*##G##*",
            "#     #",
            "#     #",
            "*##G##*",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        // Entered bottom gate moving Down; exit at top gate (3,0)
        let s = serpent(Pos::new(5, 2), Direction::Down);
        assert_eq!(
            find_gate_exit(&m, &s, Pos::new(3, 0)),
            Some((Pos::new(3, 1), Direction::Down))
        );
    }

    #[test]
    fn out_of_grid_candidate_skipped() {
        let (c, w, h) = map_from(&[
            "*##G##*",
            "#     #",
            "#     #",
            "*##G##*",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        // Moving Up at the top gate: Up is off-grid, Right/Left are walls, Down is open
        let s = serpent(Pos::new(5, 2), Direction::Up);
        assert_eq!(
            find_gate_exit(&m, &s, Pos::new(3, 0)),
            Some((Pos::new(3, 1), Direction::Down))
        );
    }

    #[test]
    fn perpendicular_tie_break_order() {
        let (c, w, h) = map_from(&[
            "*#####*",
            "#     #",
            "#  G  #",
            "#     #",
            "*#####*",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        // Interior gate, moving Right: Right first
        let s = serpent(Pos::new(1, 1), Direction::Right);
        assert_eq!(find_gate_exit(&m, &s, Pos::new(3, 2)), Some((Pos::new(4, 2), Direction::Right)));

        // Block Right with an item: next is Down
        let (mut c2, w, h) = map_from(&[
            "*#####*",
            "#     #",
            "#  G+ #",
            "#     #",
            "*#####*",
        ]);
        let m2 = MapView { cells: &c2, width: w, height: h };
        assert_eq!(find_gate_exit(&m2, &s, Pos::new(3, 2)), Some((Pos::new(3, 3), Direction::Down)));

        // Block Down too: Up
        c2[3][3] = Cell::Wall;
        let m3 = MapView { cells: &c2, width: w, height: h };
        assert_eq!(find_gate_exit(&m3, &s, Pos::new(3, 2)), Some((Pos::new(3, 1), Direction::Up)));
    }

    #[test]
    fn body_blocks_exit() {
        let (c, w, h) = map_from(&[
            "*#####*",
            "#     #",
            "G     #",
            "#     #",
            "*#####*",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        // Serpent lying right next to the left gate, heading Right
        let s = serpent(Pos::new(3, 2), Direction::Right);
        assert!(s.occupies(Pos::new(1, 2)));
        assert_eq!(find_gate_exit(&m, &s, Pos::new(0, 2)), None);
    }

    #[test]
    fn no_exit_when_boxed_in() {
        let (c, w, h) = map_from(&[
            "###",
            "#G#",
            "###",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let s = serpent(Pos::new(10, 10), Direction::Left);
        assert_eq!(find_gate_exit(&m, &s, Pos::new(1, 1)), None);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let (c, w, h) = map_from(&[" "]);
        let m = MapView { cells: &c, width: w, height: h };
        assert_eq!(m.cell_at(Pos::new(-1, 0)), Cell::Wall);
        assert_eq!(m.cell_at(Pos::new(1, 0)), Cell::Wall);
        assert_eq!(m.cell_at(Pos::new(0, 0)), Cell::Empty);
    }
}
