/// Item and gate lifecycle.
///
/// ## Items
///
/// Four kinds, each with its own capacity:
///
///   Grow 3 · Poison 3 · Boost 1 · Slow 1
///
/// While a kind is below capacity, one new item of that kind is placed
/// per `distribute()` call on a uniformly chosen cell that is Empty, not
/// under the serpent, and not reachable by the windmill blade. Items older
/// than the lifetime are cleared by `expire()`. Eaten items leave tracking
/// immediately via `consume()`.
///
/// ## Gates
///
/// Once the serpent is at least `GATE_MIN_LENGTH` long, two distinct Wall
/// cells become a gate pair. After the gate lifetime the pair moves to two
/// new Wall cells, but only when neither gate cell is under the serpent;
/// otherwise the move is retried on later calls.
///
/// Placement collects every candidate and picks with `SliceRandom`, so a
/// crowded board costs one scan instead of unbounded retries. With no
/// candidate the placement is skipped for this call.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::cell::{Cell, Pos};
use crate::domain::serpent::Serpent;
use crate::domain::windmill::Windmill;
use super::event::GameEvent;
use super::grid::Grid;

pub const GATE_MIN_LENGTH: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ItemKind {
    Grow,
    Poison,
    Boost,
    Slow,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [ItemKind::Grow, ItemKind::Poison, ItemKind::Boost, ItemKind::Slow];

    pub fn cell(self) -> Cell {
        match self {
            ItemKind::Grow => Cell::Grow,
            ItemKind::Poison => Cell::Poison,
            ItemKind::Boost => Cell::Boost,
            ItemKind::Slow => Cell::Slow,
        }
    }

    pub fn from_cell(cell: Cell) -> Option<ItemKind> {
        match cell {
            Cell::Grow => Some(ItemKind::Grow),
            Cell::Poison => Some(ItemKind::Poison),
            Cell::Boost => Some(ItemKind::Boost),
            Cell::Slow => Some(ItemKind::Slow),
            _ => None,
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            ItemKind::Grow | ItemKind::Poison => 3,
            ItemKind::Boost | ItemKind::Slow => 1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Item {
    pub pos: Pos,
    pub spawned_at: Instant,
}

#[derive(Clone, Copy, Debug)]
pub struct GatePair {
    pub a: Pos,
    pub b: Pos,
    pub placed_at: Instant,
}

impl GatePair {
    /// The other end of the pair, if `pos` is one of the gates.
    pub fn partner(&self, pos: Pos) -> Option<Pos> {
        if pos == self.a {
            Some(self.b)
        } else if pos == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct ItemManager {
    items: [Vec<Item>; 4],
    gates: Option<GatePair>,
    item_lifetime: Duration,
    gate_lifetime: Duration,
}

impl ItemManager {
    pub fn new(item_lifetime: Duration, gate_lifetime: Duration) -> Self {
        ItemManager {
            items: Default::default(),
            gates: None,
            item_lifetime,
            gate_lifetime,
        }
    }

    /// Forget all items and gates (the grid is rebuilt separately).
    pub fn clear(&mut self) {
        for list in &mut self.items {
            list.clear();
        }
        self.gates = None;
    }

    pub fn active(&self, kind: ItemKind) -> &[Item] {
        &self.items[kind.index()]
    }

    pub fn gates(&self) -> Option<&GatePair> {
        self.gates.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn install_gates(&mut self, pair: GatePair) {
        self.gates = Some(pair);
    }

    /// Other end of the gate at `pos`, if the pair is active.
    pub fn gate_partner(&self, pos: Pos) -> Option<Pos> {
        self.gates.as_ref().and_then(|g| g.partner(pos))
    }

    // ── Expiry / consumption ──

    /// Clear every item at least `item_lifetime` old.
    pub fn expire(&mut self, grid: &mut Grid, now: Instant, events: &mut Vec<GameEvent>) {
        let lifetime = self.item_lifetime;
        for kind in ItemKind::ALL {
            self.items[kind.index()].retain(|item| {
                if now.saturating_duration_since(item.spawned_at) >= lifetime {
                    if grid.get(item.pos) == kind.cell() {
                        grid.set(item.pos, Cell::Empty);
                    }
                    events.push(GameEvent::ItemExpired { kind, pos: item.pos });
                    false
                } else {
                    true
                }
            });
        }
    }

    /// Eat whatever item sits at `pos`: clear the cell, stop tracking it.
    pub fn consume(&mut self, grid: &mut Grid, pos: Pos) -> Option<ItemKind> {
        let kind = ItemKind::from_cell(grid.get(pos))?;
        grid.set(pos, Cell::Empty);
        self.items[kind.index()].retain(|item| item.pos != pos);
        Some(kind)
    }

    // ── Placement ──

    /// Top up each item kind by one and run the gate lifecycle.
    pub fn distribute<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        serpent: &Serpent,
        windmill: Option<&Windmill>,
        rng: &mut R,
        now: Instant,
        events: &mut Vec<GameEvent>,
    ) {
        for kind in ItemKind::ALL {
            if self.items[kind.index()].len() >= kind.capacity() {
                continue;
            }
            let free = item_candidates(grid, serpent, windmill);
            if let Some(&pos) = free.choose(rng) {
                grid.set(pos, kind.cell());
                self.items[kind.index()].push(Item { pos, spawned_at: now });
                events.push(GameEvent::ItemSpawned { kind, pos });
            }
        }

        match self.gates {
            None if serpent.len() >= GATE_MIN_LENGTH => {
                if let Some(pair) = place_gates(grid, windmill, rng, now) {
                    events.push(GameEvent::GatesOpened { a: pair.a, b: pair.b });
                    self.gates = Some(pair);
                }
            }
            Some(old) if now.saturating_duration_since(old.placed_at) >= self.gate_lifetime => {
                if serpent.occupies(old.a) || serpent.occupies(old.b) {
                    return; // retry next call
                }
                grid.set(old.a, Cell::Wall);
                grid.set(old.b, Cell::Wall);
                match place_gates(grid, windmill, rng, now) {
                    Some(pair) => {
                        events.push(GameEvent::GatesMoved { a: pair.a, b: pair.b });
                        self.gates = Some(pair);
                    }
                    None => {
                        // Can only happen on a degenerate map; put the old pair back.
                        grid.set(old.a, Cell::Gate);
                        grid.set(old.b, Cell::Gate);
                        self.gates = Some(GatePair { placed_at: now, ..old });
                    }
                }
            }
            _ => {}
        }
    }
}

fn item_candidates(grid: &Grid, serpent: &Serpent, windmill: Option<&Windmill>) -> Vec<Pos> {
    grid.positions()
        .filter(|&p| grid.get(p) == Cell::Empty)
        .filter(|&p| !serpent.occupies(p))
        .filter(|&p| windmill.map_or(true, |w| !w.sweeps(p)))
        .collect()
}

fn place_gates<R: Rng + ?Sized>(
    grid: &mut Grid,
    windmill: Option<&Windmill>,
    rng: &mut R,
    now: Instant,
) -> Option<GatePair> {
    let walls: Vec<Pos> = grid
        .positions()
        .filter(|&p| grid.get(p) == Cell::Wall)
        .filter(|&p| windmill.map_or(true, |w| !w.sweeps(p)))
        .collect();
    if walls.len() < 2 {
        return None;
    }
    let mut picked = walls.choose_multiple(rng, 2).copied();
    let (a, b) = (picked.next()?, picked.next()?);
    grid.set(a, Cell::Gate);
    grid.set(b, Cell::Gate);
    Some(GatePair { a, b, placed_at: now })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::serpent::SpeedProfile;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const LIFE: Duration = Duration::from_secs(10);
    const GATE_LIFE: Duration = Duration::from_secs(20);

    fn setup() -> (Grid, Serpent, ItemManager, Pcg32, Instant) {
        let t0 = Instant::now();
        let grid = Grid::new(20, 12);
        let serpent = Serpent::new(Pos::new(10, 6), SpeedProfile::default(), t0);
        (grid, serpent, ItemManager::new(LIFE, GATE_LIFE), Pcg32::seed_from_u64(7), t0)
    }

    fn grow_to(serpent: &mut Serpent, len: usize) {
        while serpent.len() < len {
            serpent.extend();
            serpent.advance();
        }
    }

    #[test]
    fn first_distribute_places_one_of_each() {
        let (mut g, s, mut im, mut rng, t0) = setup();
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        for kind in ItemKind::ALL {
            assert_eq!(im.active(kind).len(), 1, "{kind:?}");
            assert_eq!(g.count(kind.cell()), 1);
        }
        assert!(im.gates().is_none()); // serpent too short
        assert_eq!(ev.len(), 4);
    }

    #[test]
    fn capacities_are_respected() {
        let (mut g, s, mut im, mut rng, t0) = setup();
        let mut ev = vec![];
        for _ in 0..10 {
            im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        }
        assert_eq!(im.active(ItemKind::Grow).len(), 3);
        assert_eq!(im.active(ItemKind::Poison).len(), 3);
        assert_eq!(im.active(ItemKind::Boost).len(), 1);
        assert_eq!(im.active(ItemKind::Slow).len(), 1);
        assert_eq!(g.count(Cell::Grow), 3);
    }

    #[test]
    fn items_never_land_on_serpent_or_walls() {
        let (mut g, s, mut im, mut rng, t0) = setup();
        let mut ev = vec![];
        for _ in 0..5 {
            im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        }
        for kind in ItemKind::ALL {
            for item in im.active(kind) {
                assert!(!s.occupies(item.pos));
                assert_eq!(g.get(item.pos), kind.cell());
            }
        }
    }

    #[test]
    fn expiry_at_lifetime() {
        let (mut g, s, mut im, mut rng, t0) = setup();
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        let grow_pos = im.active(ItemKind::Grow)[0].pos;

        ev.clear();
        im.expire(&mut g, t0 + Duration::from_millis(9_999), &mut ev);
        assert!(ev.is_empty());
        assert_eq!(im.active(ItemKind::Grow).len(), 1);

        im.expire(&mut g, t0 + LIFE, &mut ev);
        assert_eq!(ev.len(), 4);
        assert!(im.active(ItemKind::Grow).is_empty());
        assert_eq!(g.get(grow_pos), Cell::Empty);
    }

    #[test]
    fn consume_clears_cell_and_tracking() {
        let (mut g, s, mut im, mut rng, t0) = setup();
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        let pos = im.active(ItemKind::Poison)[0].pos;
        assert_eq!(im.consume(&mut g, pos), Some(ItemKind::Poison));
        assert_eq!(g.get(pos), Cell::Empty);
        assert!(im.active(ItemKind::Poison).is_empty());
        assert_eq!(im.consume(&mut g, pos), None);
    }

    #[test]
    fn gates_open_at_length_four_on_distinct_walls() {
        let (mut g, mut s, mut im, mut rng, t0) = setup();
        grow_to(&mut s, 4);
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        let pair = *im.gates().expect("gates open");
        assert_ne!(pair.a, pair.b);
        assert_eq!(g.get(pair.a), Cell::Gate);
        assert_eq!(g.get(pair.b), Cell::Gate);
        assert_eq!(g.count(Cell::Gate), 2);
        assert_eq!(im.gate_partner(pair.a), Some(pair.b));
        assert_eq!(im.gate_partner(pair.b), Some(pair.a));
        assert!(ev.contains(&GameEvent::GatesOpened { a: pair.a, b: pair.b }));
    }

    #[test]
    fn gates_move_after_lifetime() {
        let (mut g, mut s, mut im, mut rng, t0) = setup();
        grow_to(&mut s, 4);
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        let first = *im.gates().unwrap();

        im.distribute(&mut g, &s, None, &mut rng, t0 + Duration::from_secs(19), &mut ev);
        assert_eq!(im.gates().unwrap().placed_at, t0);

        let later = t0 + GATE_LIFE;
        im.distribute(&mut g, &s, None, &mut rng, later, &mut ev);
        let second = *im.gates().unwrap();
        assert_eq!(second.placed_at, later);
        assert_eq!(g.count(Cell::Gate), 2);
        // Old cells are walls again unless re-picked
        for old in [first.a, first.b] {
            if old != second.a && old != second.b {
                assert_eq!(g.get(old), Cell::Wall);
            }
        }
    }

    #[test]
    fn gate_move_waits_while_occupied() {
        let t0 = Instant::now();
        let mut g = Grid::new(20, 12);
        // Serpent whose body lies on the left border cell (0, 6)
        let mut s = Serpent::new(Pos::new(2, 6), SpeedProfile::default(), t0);
        grow_to(&mut s, 4);
        assert!(s.occupies(Pos::new(2, 6)));
        let mut im = ItemManager::new(LIFE, GATE_LIFE);
        let mut rng = Pcg32::seed_from_u64(1);
        let body_cell = *s.segments().back().unwrap();
        g.set(body_cell, Cell::Gate);
        g.set(Pos::new(5, 0), Cell::Gate);
        im.gates = Some(GatePair { a: body_cell, b: Pos::new(5, 0), placed_at: t0 });

        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0 + GATE_LIFE, &mut ev);
        assert_eq!(im.gates().unwrap().a, body_cell);
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::GatesMoved { .. })));
    }

    #[test]
    fn windmill_sweep_is_avoided() {
        let t0 = Instant::now();
        let mut g = Grid::new(40, 25);
        let mill = crate::sim::stage::lay_obstacles(&mut g, 4).unwrap();
        let mut s = Serpent::new(Pos::new(35, 1), SpeedProfile::default(), t0);
        grow_to(&mut s, 4);
        let mut im = ItemManager::new(LIFE, GATE_LIFE);
        let mut rng = Pcg32::seed_from_u64(99);
        let mut ev = vec![];
        for i in 0..30 {
            im.distribute(&mut g, &s, Some(&mill), &mut rng, t0 + GATE_LIFE * i, &mut ev);
            let gates = im.gates().unwrap();
            assert!(!mill.sweeps(gates.a) && !mill.sweeps(gates.b));
        }
        for kind in ItemKind::ALL {
            for item in im.active(kind) {
                assert!(!mill.sweeps(item.pos));
            }
        }
    }

    #[test]
    fn full_board_skips_placement() {
        let t0 = Instant::now();
        let mut g = Grid::new(3, 3); // single interior cell
        let s = Serpent::new(Pos::new(1, 1), SpeedProfile::default(), t0);
        let mut im = ItemManager::new(LIFE, GATE_LIFE);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ev = vec![];
        im.distribute(&mut g, &s, None, &mut rng, t0, &mut ev);
        assert!(ev.is_empty());
        assert_eq!(im.active(ItemKind::Grow).len(), 0);
    }
}
