/// Keyboard command source.
///
/// Waits up to the poll timeout for one key event and maps it:
///   Arrows / WASD      →  Steer
///   Esc / q / Ctrl+C   →  Quit
///
/// Release events are ignored (terminals with keyboard enhancement send
/// them); Repeat counts as a press, so holding a key keeps steering.
/// Unmapped keys yield no command and end the wait early, like any key.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::serpent::Direction;
use super::gamepad::GamepadState;
use super::{Command, CommandSource};

pub struct KeyboardInput;

impl KeyboardInput {
    pub fn new() -> Self {
        KeyboardInput
    }
}

impl CommandSource for KeyboardInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(command_for_key(&key)),
            _ => Ok(None),
        }
    }
}

/// Keyboard plus gamepad. A pending pad command is returned at once;
/// otherwise the keyboard wait covers the timeout.
pub struct Controls {
    pub keyboard: KeyboardInput,
    pub gamepad: GamepadState,
}

impl CommandSource for Controls {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        self.gamepad.update();
        if let Some(cmd) = self.gamepad.take_command() {
            return Ok(Some(cmd));
        }
        self.keyboard.poll(timeout)
    }
}

pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }
    let dir = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Direction::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Direction::Down,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Direction::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Direction::Right,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::Steer(dir))
}
