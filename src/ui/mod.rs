//! Terminal collaborators: the display sink and the command sources.
//!
//! The game loop only sees the two traits below, so it can be driven by
//! fakes in tests and by crossterm/gilrs in the real binary.

pub mod gamepad;
pub mod input;
pub mod renderer;

use std::io;
use std::time::Duration;

use crate::domain::serpent::Direction;
use crate::sim::snapshot::Snapshot;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Steer(Direction),
    Quit,
}

/// Paints a draw model. Never reads simulation state directly.
pub trait Display {
    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

/// Yields at most one command per poll, waiting up to `timeout`.
pub trait CommandSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Command>>;
}
