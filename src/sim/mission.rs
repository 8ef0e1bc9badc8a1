/// Per-stage missions.
///
/// Five goals are tracked against the stage's counters. Four of them gate
/// stage progression; the max-length goal is shown but never required.
///
///   Goal        Counter                    Gating
///   ─────────   ────────────────────────   ──────
///   B           current length             yes
///   Max B       longest length this stage  no
///   +           Grow items eaten           yes
///   -           Poison items eaten         yes
///   G           gates passed               yes
///
/// Flags latch: once a goal is met it stays met until the stage resets,
/// even if the serpent later shrinks below the length target.

/// Thresholds for one stage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MissionTargets {
    pub length: usize,
    pub max_length: usize,
    pub grow: u32,
    pub poison: u32,
    pub gate: u32,
}

impl MissionTargets {
    /// Stage 1 thresholds.
    pub const INITIAL: MissionTargets = MissionTargets {
        length: 4,
        max_length: 5,
        grow: 1,
        poison: 1,
        gate: 1,
    };

    /// Next stage asks for one more Grow item; nothing else changes.
    pub fn next_stage(self) -> MissionTargets {
        MissionTargets { grow: self.grow + 1, ..self }
    }
}

/// Counters that feed the missions. Reset on every stage setup.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Scores {
    pub max_length: usize,
    pub grow: u32,
    pub poison: u32,
    pub gate: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Goal {
    Length,
    MaxLength,
    Grow,
    Poison,
    Gate,
}

impl Goal {
    pub const ALL: [Goal; 5] = [Goal::Length, Goal::MaxLength, Goal::Grow, Goal::Poison, Goal::Gate];

    pub fn label(self) -> &'static str {
        match self {
            Goal::Length => "B",
            Goal::MaxLength => "Max B",
            Goal::Grow => "+",
            Goal::Poison => "-",
            Goal::Gate => "G",
        }
    }

    pub fn is_gating(self) -> bool {
        self != Goal::MaxLength
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One row of the mission board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissionLine {
    pub label: &'static str,
    pub target: u64,
    pub done: bool,
}

#[derive(Clone, Debug)]
pub struct MissionTracker {
    targets: MissionTargets,
    done: [bool; 5],
}

impl MissionTracker {
    pub fn new(targets: MissionTargets) -> Self {
        MissionTracker { targets, done: [false; 5] }
    }

    pub fn targets(&self) -> MissionTargets {
        self.targets
    }

    /// Install new thresholds and clear every flag.
    pub fn reset(&mut self, targets: MissionTargets) {
        self.targets = targets;
        self.done = [false; 5];
    }

    /// Re-check each goal; met goals stay met.
    pub fn evaluate(&mut self, length: usize, scores: &Scores) {
        let t = self.targets;
        let met = [
            length >= t.length,
            scores.max_length >= t.max_length,
            scores.grow >= t.grow,
            scores.poison >= t.poison,
            scores.gate >= t.gate,
        ];
        for (flag, now_met) in self.done.iter_mut().zip(met) {
            *flag |= now_met;
        }
    }

    pub fn is_done(&self, goal: Goal) -> bool {
        self.done[goal.index()]
    }

    /// All goals that gate progression are met.
    pub fn gating_complete(&self) -> bool {
        Goal::ALL.iter().filter(|g| g.is_gating()).all(|&g| self.is_done(g))
    }

    pub fn lines(&self) -> Vec<MissionLine> {
        let t = self.targets;
        Goal::ALL
            .iter()
            .map(|&goal| {
                let target = match goal {
                    Goal::Length => t.length as u64,
                    Goal::MaxLength => t.max_length as u64,
                    Goal::Grow => t.grow as u64,
                    Goal::Poison => t.poison as u64,
                    Goal::Gate => t.gate as u64,
                };
                MissionLine { label: goal.label(), target, done: self.is_done(goal) }
            })
            .collect()
    }
}
