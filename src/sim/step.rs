/// The tick function: advances the stage by one step.
///
/// Processing order:
///   1. Steering input (a 180° turn ends the run)
///   2. Serpent clock (advance if its interval elapsed), poll timeout retuned
///   3. Stage time limit
///   4. Max-length tracking, item expiry
///   5. Hazards at the head: windmill blade, wall/corner, own body
///   6. Item at the head (Grow / Poison / Boost / Slow)
///   7. Gate at the head → teleport to the partner gate
///   8. Missions; all gating goals met → next stage (tick ends here)
///   9. Item / gate replenishment
///  10. Windmill rotation every `windmill_turn_ticks` ticks
///
/// Every check runs on every tick, moved or not. The head only changes on
/// an advance or a teleport, and consumed cells are cleared at once, so a
/// resting head never triggers the same effect twice.

use std::time::Instant;

use log::debug;

use crate::domain::cell::Cell;
use crate::domain::rules;
use crate::domain::serpent::Direction;
use super::event::{GameEvent, Termination, TickOutcome};
use super::items::ItemKind;
use super::world::{Phase, StageController};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn tick(ctrl: &mut StageController, input: Option<Direction>, now: Instant) -> TickOutcome {
    match ctrl.phase {
        Phase::Terminated(cause) => return TickOutcome::Over(cause),
        Phase::StageTransition => ctrl.phase = Phase::Running,
        Phase::Running => {}
    }

    if let Some(dir) = input {
        if let Err(e) = ctrl.serpent.set_direction(dir) {
            debug!("{e}");
            return ctrl.terminate(Termination::IllegalReversal);
        }
    }

    ctrl.serpent.refresh(now);
    ctrl.timeout = ctrl.serpent.interval();

    if ctrl.elapsed(now) > ctrl.rules.stage_time_limit() {
        return ctrl.terminate(Termination::TimeUp);
    }

    ctrl.scores.max_length = ctrl.scores.max_length.max(ctrl.serpent.len());
    ctrl.items.expire(&mut ctrl.grid, now, &mut ctrl.events);

    if let Some(cause) = check_hazards(ctrl) {
        return ctrl.terminate(cause);
    }
    if let Some(cause) = resolve_item(ctrl, now) {
        return ctrl.terminate(cause);
    }
    if let Some(cause) = resolve_gate(ctrl, now) {
        return ctrl.terminate(cause);
    }

    ctrl.missions.evaluate(ctrl.serpent.len(), &ctrl.scores);
    if ctrl.missions.gating_complete() {
        return ctrl.proceed_next_stage(now);
    }

    ctrl.replenish(now);
    rotate_windmill(ctrl, now);

    TickOutcome::Continue
}

// ══════════════════════════════════════════════════════════════
// Hazards
// ══════════════════════════════════════════════════════════════

fn check_hazards(ctrl: &StageController) -> Option<Termination> {
    let head = ctrl.serpent.head();
    if ctrl.windmill.as_ref().map_or(false, |w| w.covers(head)) {
        return Some(Termination::WindmillStrike);
    }
    if ctrl.grid.get(head).is_lethal() {
        return Some(Termination::WallCollision);
    }
    if ctrl.serpent.detect_collision() {
        return Some(Termination::SelfCollision);
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Items
// ══════════════════════════════════════════════════════════════

fn resolve_item(ctrl: &mut StageController, now: Instant) -> Option<Termination> {
    let head = ctrl.serpent.head();
    let kind = ctrl.items.consume(&mut ctrl.grid, head)?;
    ctrl.events.push(GameEvent::ItemEaten { kind, pos: head });

    match kind {
        ItemKind::Grow => {
            ctrl.serpent.extend();
            ctrl.scores.grow += 1;
        }
        ItemKind::Poison => {
            ctrl.serpent.shrink();
            ctrl.scores.poison += 1;
            if ctrl.serpent.len() < ctrl.rules.min_length {
                return Some(Termination::Poisoned);
            }
        }
        ItemKind::Boost => ctrl.serpent.boost_speed(now),
        ItemKind::Slow => ctrl.serpent.reduce_speed(now),
    }
    ctrl.timeout = ctrl.serpent.interval();
    None
}

// ══════════════════════════════════════════════════════════════
// Gates
// ══════════════════════════════════════════════════════════════

fn resolve_gate(ctrl: &mut StageController, now: Instant) -> Option<Termination> {
    let entry = ctrl.serpent.head();
    if ctrl.grid.get(entry) != Cell::Gate {
        return None;
    }
    // A stray marker without an active pair behaves like the wall it replaced.
    let Some(exit_gate) = ctrl.items.gate_partner(entry) else {
        return Some(Termination::WallCollision);
    };

    let Some((pos, dir)) = rules::find_gate_exit(&ctrl.grid.view(), &ctrl.serpent, exit_gate) else {
        return Some(Termination::NoGateExit);
    };
    ctrl.serpent.assign_head(pos, dir);
    ctrl.scores.gate += 1;
    ctrl.events.push(GameEvent::GateUsed { entry, exit: exit_gate });

    if let Some(windmill) = ctrl.windmill.as_mut() {
        if windmill.footprint_contains(exit_gate) {
            windmill.suspend_until(now + ctrl.rules.windmill_freeze());
            ctrl.events.push(GameEvent::WindmillFrozen);
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Windmill
// ══════════════════════════════════════════════════════════════

/// Every Nth tick, turn the blade one step and redraw it. A suspended
/// blade skips its turn but the slot is still used up.
fn rotate_windmill(ctrl: &mut StageController, now: Instant) {
    let Some(windmill) = ctrl.windmill.as_mut() else { return };
    ctrl.tick += 1;
    if ctrl.tick % ctrl.rules.windmill_turn_ticks != 0 {
        return;
    }
    if !windmill.turn(now) {
        return;
    }
    for pos in windmill.sweep_cells() {
        if ctrl.grid.get(pos) == Cell::Wall {
            ctrl.grid.set(pos, Cell::Empty);
        }
    }
    for pos in windmill.blade_cells() {
        ctrl.grid.set(pos, Cell::Wall);
    }
    ctrl.events.push(GameEvent::WindmillTurned { state: windmill.state });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
