//! Stateful simulation: the stage controller and everything it owns.

pub mod event;
pub mod grid;
pub mod items;
pub mod mission;
pub mod snapshot;
pub mod stage;
pub mod step;
pub mod world;
