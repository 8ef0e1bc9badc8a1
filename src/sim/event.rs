/// Events emitted during a simulation tick, and how a tick can end.
/// The loop logs events; the renderer shows the termination cause.

use std::fmt;

use crate::domain::cell::Pos;
use super::items::ItemKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ItemSpawned { kind: ItemKind, pos: Pos },
    ItemExpired { kind: ItemKind, pos: Pos },
    ItemEaten { kind: ItemKind, pos: Pos },
    GatesOpened { a: Pos, b: Pos },
    GatesMoved { a: Pos, b: Pos },
    GateUsed { entry: Pos, exit: Pos },
    WindmillTurned { state: u8 },
    WindmillFrozen,
    StageCleared { stage: u8 },
}

/// Why a run ended. Every cause is terminal; none is retried.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Termination {
    WallCollision,
    SelfCollision,
    WindmillStrike,
    Poisoned,
    NoGateExit,
    IllegalReversal,
    TimeUp,
    Victory,
    Quit,
}

impl Termination {
    pub fn is_victory(self) -> bool {
        self == Termination::Victory
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Termination::WallCollision => "Crashed into a wall",
            Termination::SelfCollision => "Bit its own tail",
            Termination::WindmillStrike => "Struck by the windmill",
            Termination::Poisoned => "Poisoned below minimum length",
            Termination::NoGateExit => "No way out of the gate",
            Termination::IllegalReversal => "Reversed into itself",
            Termination::TimeUp => "Out of time",
            Termination::Victory => "All stages cleared!",
            Termination::Quit => "Quit",
        };
        f.write_str(msg)
    }
}

/// Result of one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Continue,
    StageCleared { next: u8 },
    Over(Termination),
}
