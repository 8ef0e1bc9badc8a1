/// Draw model handed to the display each frame.
///
/// A plain-data copy of what the screen shows: cells, serpent body, stage,
/// clock, score board and mission board. The display never reads the
/// controller directly.

use std::time::Instant;

use crate::domain::cell::{Cell, Pos};
use crate::domain::serpent::SpeedState;
use super::mission::{MissionLine, Scores};
use super::world::{Phase, StageController};

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
    /// Head first.
    pub serpent: Vec<Pos>,
    pub stage: u8,
    pub elapsed_secs: u64,
    pub time_limit_secs: u64,
    pub length: usize,
    pub scores: Scores,
    pub missions: Vec<MissionLine>,
    pub speed: SpeedState,
    pub phase: Phase,
}

impl Snapshot {
    pub fn capture(ctrl: &StageController, now: Instant) -> Self {
        Snapshot {
            width: ctrl.grid.width,
            height: ctrl.grid.height,
            cells: ctrl.grid.rows().to_vec(),
            serpent: ctrl.serpent.segments().iter().copied().collect(),
            stage: ctrl.level,
            elapsed_secs: ctrl.elapsed(now).as_secs(),
            time_limit_secs: ctrl.rules.stage_time_limit_secs,
            length: ctrl.serpent.len(),
            scores: ctrl.scores,
            missions: ctrl.missions.lines(),
            speed: ctrl.serpent.speed_state(),
            phase: ctrl.phase,
        }
    }

    /// "mm:ss" of the stage clock.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        if pos.x < 0 || pos.y < 0 {
            return Cell::Wall;
        }
        self.cells
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
            .unwrap_or(Cell::Wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, RulesConfig};
    use std::time::Duration;

    #[test]
    fn capture_reflects_controller() {
        let t0 = Instant::now();
        let c = StageController::new(GridConfig::default(), RulesConfig::default(), 3, t0);
        let snap = Snapshot::capture(&c, t0 + Duration::from_secs(75));
        assert_eq!((snap.width, snap.height), (40, 25));
        assert_eq!(snap.serpent[0], c.serpent.head());
        assert_eq!(snap.length, 3);
        assert_eq!(snap.stage, 1);
        assert_eq!(snap.clock(), "01:15");
        assert_eq!(snap.missions.len(), 5);
        assert_eq!(snap.cell(Pos::new(0, 0)), Cell::Corner);
        assert_eq!(snap.cell(Pos::new(-1, 3)), Cell::Wall);
        assert_eq!(snap.phase, Phase::Running);
    }
}
