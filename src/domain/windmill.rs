/// Windmill geometry: a straight blade pivoting around a fixed center.
///
/// The blade is two arms of `length` cells each, on opposite sides of the
/// center, along one of eight 45° orientations:
///
///   state 0/4 → vertical   (0, ±i)
///   state 1/5 → diagonal   (±i, ±i)
///   state 2/6 → horizontal (±i, 0)
///   state 3/7 → diagonal   (∓i, ±i)
///
/// Opposite states draw the same cells; the state still cycles through all
/// eight so a full turn takes eight steps. The center cell is never part
/// of the blade.
///
/// Rotation can be suspended until a point in time (set when the serpent
/// exits a gate inside the footprint). Pure geometry: the caller owns the
/// grid and applies `blade_cells()` after each turn.

use std::time::Instant;

use super::cell::Pos;

pub const STATES: u8 = 8;

/// Axis vector for each orientation class (state % 4).
const AXES: [(i32, i32); 4] = [(0, 1), (1, 1), (1, 0), (-1, 1)];

#[derive(Clone, Debug)]
pub struct Windmill {
    pub center: Pos,
    pub length: i32,
    pub state: u8,
    suspended_until: Option<Instant>,
}

impl Windmill {
    pub fn new(center: Pos, length: i32) -> Self {
        Windmill { center, length, state: 0, suspended_until: None }
    }

    /// Cells the blade occupies in its current state.
    pub fn blade_cells(&self) -> Vec<Pos> {
        Self::cells_for_state(self.center, self.length, self.state)
    }

    /// Every cell any orientation can occupy (all eight arm directions).
    pub fn sweep_cells(&self) -> Vec<Pos> {
        (0..4u8)
            .flat_map(|s| Self::cells_for_state(self.center, self.length, s))
            .collect()
    }

    fn cells_for_state(center: Pos, length: i32, state: u8) -> Vec<Pos> {
        let (ax, ay) = AXES[(state % 4) as usize];
        let mut cells = Vec::with_capacity(2 * length.max(0) as usize);
        for i in 1..=length {
            cells.push(center.offset(ax * i, ay * i));
            cells.push(center.offset(-ax * i, -ay * i));
        }
        cells
    }

    /// Is `pos` under the blade right now?
    pub fn covers(&self, pos: Pos) -> bool {
        self.blade_cells().contains(&pos)
    }

    /// Could the blade ever reach `pos`?
    pub fn sweeps(&self, pos: Pos) -> bool {
        let dx = pos.x - self.center.x;
        let dy = pos.y - self.center.y;
        if dx == 0 && dy == 0 {
            return false;
        }
        let (adx, ady) = (dx.abs(), dy.abs());
        (dx == 0 || dy == 0 || adx == ady) && adx.max(ady) <= self.length
    }

    /// Same row/column within blade length, or inside the bounding square.
    pub fn footprint_contains(&self, pos: Pos) -> bool {
        let dx = (pos.x - self.center.x).abs();
        let dy = (pos.y - self.center.y).abs();
        (dx == 0 && dy <= self.length)
            || (dy == 0 && dx <= self.length)
            || (dx <= self.length && dy <= self.length)
    }

    pub fn suspend_until(&mut self, until: Instant) {
        self.suspended_until = Some(until);
    }

    pub fn is_suspended(&self, now: Instant) -> bool {
        self.suspended_until.map_or(false, |t| now < t)
    }

    /// Advance one 45° step unless suspended. Returns true if it turned.
    pub fn turn(&mut self, now: Instant) -> bool {
        if self.is_suspended(now) {
            return false;
        }
        self.suspended_until = None;
        self.state = (self.state + 1) % STATES;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn mill() -> Windmill {
        Windmill::new(Pos::new(20, 12), 5)
    }

    #[test]
    fn state_zero_is_vertical() {
        let w = mill();
        let cells = w.blade_cells();
        assert_eq!(cells.len(), 10);
        for i in 1..=5 {
            assert!(cells.contains(&Pos::new(20, 12 + i)));
            assert!(cells.contains(&Pos::new(20, 12 - i)));
        }
        assert!(!w.covers(Pos::new(20, 12)));
    }

    #[test]
    fn state_one_is_main_diagonal() {
        let mut w = mill();
        assert!(w.turn(Instant::now()));
        assert_eq!(w.state, 1);
        assert!(w.covers(Pos::new(25, 17)));
        assert!(w.covers(Pos::new(15, 7)));
        assert!(!w.covers(Pos::new(20, 13)));
    }

    #[test]
    fn states_three_and_seven_are_anti_diagonal() {
        let mut w = mill();
        w.state = 3;
        assert!(w.covers(Pos::new(19, 13)));
        assert!(w.covers(Pos::new(21, 11)));
        let three = w.blade_cells();
        w.state = 7;
        let mut seven = w.blade_cells();
        let mut three_sorted = three.clone();
        three_sorted.sort_by_key(|p| (p.x, p.y));
        seven.sort_by_key(|p| (p.x, p.y));
        assert_eq!(three_sorted, seven);
    }

    #[test]
    fn full_cycle_returns_to_zero() {
        let mut w = mill();
        let now = Instant::now();
        for _ in 0..8 { w.turn(now); }
        assert_eq!(w.state, 0);
    }

    #[test]
    fn sweep_covers_all_eight_arms() {
        let w = mill();
        let sweep = w.sweep_cells();
        assert_eq!(sweep.len(), 40);
        for p in &sweep {
            assert!(w.sweeps(*p));
        }
        assert!(!w.sweeps(Pos::new(20, 12)));
        assert!(!w.sweeps(Pos::new(21, 14)));
        assert!(!w.sweeps(Pos::new(20, 18)));
    }

    #[test]
    fn footprint_is_bounding_square() {
        let w = mill();
        assert!(w.footprint_contains(Pos::new(20, 17)));
        assert!(w.footprint_contains(Pos::new(25, 7)));
        assert!(w.footprint_contains(Pos::new(22, 14)));
        assert!(!w.footprint_contains(Pos::new(26, 12)));
        assert!(!w.footprint_contains(Pos::new(20, 18)));
    }

    #[test]
    fn suspension_blocks_turns_until_deadline() {
        let mut w = mill();
        let t0 = Instant::now();
        w.suspend_until(t0 + Duration::from_secs(1));
        assert!(!w.turn(t0 + Duration::from_millis(500)));
        assert_eq!(w.state, 0);
        assert!(w.turn(t0 + Duration::from_secs(1)));
        assert_eq!(w.state, 1);
        assert!(!w.is_suspended(t0 + Duration::from_millis(500)));
    }
}
