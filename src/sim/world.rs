/// StageController: the complete state of a running game.
///
/// ## Ownership
///
/// The controller owns everything the tick mutates: grid, serpent, item
/// manager, mission tracker, the stage-4 windmill, counters and the rng.
/// Nothing is global; a fresh controller is a fresh game.
///
/// ## Stage lifecycle
///
///   new ──► reset_stage(1) ──► Running ──tick──► … ──► gating missions met
///                                 ▲                          │
///                                 │                  proceed_next_stage
///                                 │                          │
///                          StageTransition ◄── level ≤ 4 ────┤
///                                                            │
///                                          level > 4 ──► Terminated(Victory)
///
/// `reset_stage` rebuilds the map, respawns the serpent, clears items,
/// scores and mission flags, restarts the stage clock and places the first
/// item of each kind.

use std::time::{Duration, Instant};

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{GridConfig, RulesConfig};
use crate::domain::serpent::Serpent;
use crate::domain::windmill::Windmill;
use super::event::{GameEvent, Termination, TickOutcome};
use super::grid::Grid;
use super::items::ItemManager;
use super::mission::{MissionTargets, MissionTracker, Scores};
use super::stage::{self, FINAL_STAGE, FIRST_STAGE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    /// Set by a stage advance; cleared by the next tick.
    StageTransition,
    Terminated(Termination),
}

pub struct StageController {
    // ── Map ──
    pub grid: Grid,
    pub windmill: Option<Windmill>,

    // ── Actors ──
    pub serpent: Serpent,
    pub items: ItemManager,

    // ── Progress ──
    pub missions: MissionTracker,
    pub scores: Scores,
    pub level: u8,
    pub phase: Phase,

    // ── Timing ──
    pub stage_started: Instant,
    /// Ticks since stage setup; drives windmill cadence.
    pub tick: u64,
    /// Input poll timeout for the next tick; tracks the serpent's interval.
    pub timeout: Duration,

    pub rules: RulesConfig,
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

// ── Construction ──

impl StageController {
    pub fn new(grid: GridConfig, rules: RulesConfig, seed: u64, now: Instant) -> Self {
        let spawn = stage::spawn_for(FIRST_STAGE, grid.width, grid.height);
        let serpent = Serpent::new(spawn.head, rules.speed_profile(), now);
        let mut ctrl = StageController {
            grid: Grid::new(grid.width, grid.height),
            windmill: None,
            timeout: serpent.interval(),
            serpent,
            items: ItemManager::new(rules.item_lifetime(), rules.gate_lifetime()),
            missions: MissionTracker::new(MissionTargets::INITIAL),
            scores: Scores::default(),
            level: FIRST_STAGE,
            phase: Phase::Running,
            stage_started: now,
            tick: 0,
            rules,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        ctrl.reset_stage(now);
        ctrl
    }
}

// ── Stage lifecycle ──

impl StageController {
    /// Rebuild the current level from scratch.
    pub fn reset_stage(&mut self, now: Instant) {
        let (w, h) = (self.grid.width, self.grid.height);
        self.grid.setup_map();
        self.windmill = stage::lay_obstacles(&mut self.grid, self.level);

        let spawn = stage::spawn_for(self.level, w, h);
        let mut serpent = Serpent::new(spawn.head, self.rules.speed_profile(), now);
        // Fresh serpents face Right; any other heading is a quarter turn.
        if serpent.set_direction(spawn.heading).is_err() {
            debug!("spawn heading {:?} is a reversal, keeping Right", spawn.heading);
        }
        self.serpent = serpent;

        self.items.clear();
        self.scores = Scores::default();
        self.missions.reset(self.missions.targets());
        self.stage_started = now;
        self.tick = 0;
        self.timeout = self.serpent.interval();

        self.replenish(now);
        info!("stage {} started ({}x{})", self.level, w, h);
    }

    /// Stage cleared: move on, or win after the last stage.
    pub fn proceed_next_stage(&mut self, now: Instant) -> TickOutcome {
        let cleared = self.level;
        self.events.push(GameEvent::StageCleared { stage: cleared });
        self.level += 1;
        if self.level > FINAL_STAGE {
            self.level = FINAL_STAGE;
            return self.terminate(Termination::Victory);
        }

        self.missions.reset(self.missions.targets().next_stage());
        self.reset_stage(now);
        // Each later stage starts at double speed relative to the baseline.
        self.serpent.set_interval(self.rules.speed_profile().base / 2);
        self.timeout = self.serpent.interval();
        self.phase = Phase::StageTransition;
        info!("stage {cleared} cleared, entering stage {}", self.level);
        TickOutcome::StageCleared { next: self.level }
    }

    /// Top up items and run the gate lifecycle.
    pub fn replenish(&mut self, now: Instant) {
        self.items.distribute(
            &mut self.grid,
            &self.serpent,
            self.windmill.as_ref(),
            &mut self.rng,
            now,
            &mut self.events,
        );
    }

    /// End the run. Later ticks keep reporting the same cause.
    pub fn terminate(&mut self, cause: Termination) -> TickOutcome {
        info!("run ended at stage {}: {cause}", self.level);
        self.phase = Phase::Terminated(cause);
        TickOutcome::Over(cause)
    }
}

// ── Queries ──

impl StageController {
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stage_started)
    }

    pub fn poll_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            Phase::Terminated(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::{Cell, Pos};
    use crate::domain::serpent::Direction;
    use crate::sim::items::ItemKind;

    fn controller(t0: Instant) -> StageController {
        StageController::new(GridConfig::default(), RulesConfig::default(), 11, t0)
    }

    #[test]
    fn new_game_starts_stage_one() {
        let t0 = Instant::now();
        let c = controller(t0);
        assert_eq!(c.level, 1);
        assert_eq!(c.phase, Phase::Running);
        assert_eq!(c.serpent.head(), Pos::new(20, 12));
        assert_eq!(c.serpent.len(), 3);
        assert_eq!(c.serpent.direction(), Direction::Right);
        assert_eq!(c.poll_timeout(), Duration::from_millis(200));
        assert!(c.windmill.is_none());
        for kind in ItemKind::ALL {
            assert_eq!(c.items.active(kind).len(), 1);
        }
    }

    #[test]
    fn stage_advance_resets_and_halves_interval() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.scores.grow = 3;
        c.scores.gate = 2;
        c.serpent.extend();
        c.serpent.advance();

        let t1 = t0 + Duration::from_secs(30);
        assert_eq!(c.proceed_next_stage(t1), TickOutcome::StageCleared { next: 2 });
        assert_eq!(c.level, 2);
        assert_eq!(c.phase, Phase::StageTransition);
        assert_eq!(c.scores, Scores::default());
        assert_eq!(c.serpent.len(), 3);
        assert_eq!(c.serpent.interval(), Duration::from_millis(100));
        assert_eq!(c.poll_timeout(), Duration::from_millis(100));
        assert_eq!(c.missions.targets().grow, 2);
        assert_eq!(c.stage_started, t1);
        assert!(c.items.gates().is_none());
        assert_eq!(c.grid.get(Pos::new(15, 12)), Cell::Wall);
    }

    #[test]
    fn interval_halving_is_not_cumulative() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.proceed_next_stage(t0);
        c.proceed_next_stage(t0);
        assert_eq!(c.level, 3);
        assert_eq!(c.serpent.interval(), Duration::from_millis(100));
    }

    #[test]
    fn stage_four_has_windmill_and_top_right_spawn() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        for _ in 0..3 {
            c.proceed_next_stage(t0);
        }
        assert_eq!(c.level, 4);
        assert!(c.windmill.is_some());
        assert_eq!(c.serpent.head(), Pos::new(35, 1));
        assert_eq!(c.serpent.direction(), Direction::Down);
        assert_eq!(c.missions.targets().grow, 4);
    }

    #[test]
    fn clearing_final_stage_is_victory() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        for _ in 0..3 {
            c.proceed_next_stage(t0);
        }
        assert_eq!(c.proceed_next_stage(t0), TickOutcome::Over(Termination::Victory));
        assert_eq!(c.termination(), Some(Termination::Victory));
        assert_eq!(c.level, 4);
    }

    #[test]
    fn same_seed_same_layout() {
        let t0 = Instant::now();
        let a = controller(t0);
        let b = controller(t0);
        assert_eq!(a.grid.rows(), b.grid.rows());
    }
}
