/// Gamepad command source using gilrs.
///
/// Quit buttons are loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Steer (edge-triggered)
///   Select                →  Quit
///
/// Without the `gamepad` feature this compiles to a pad that is never
/// connected and never yields a command.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::serpent::Direction;
use super::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-direction state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct EdgeState {
    held: bool,
    just_pressed: bool,
}

impl EdgeState {
    fn set_held(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    dpad: [EdgeState; 4],
    stick: [EdgeState; 4],
    stick_x: f32,
    stick_y: f32,

    quit_buttons: Vec<Btn>,
    quit_pressed: bool,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            dpad: [EdgeState::default(); 4],
            stick: [EdgeState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            quit_buttons: vec![Btn::Select],
            quit_pressed: false,
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// empty result keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let quit: Vec<Btn> = cfg.quit.iter().filter_map(|s| Btn::from_name(s)).collect();
        if !quit.is_empty() {
            self.quit_buttons = quit;
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// The command for this update, if any: quit wins over steering, and
    /// the d-pad wins over the stick.
    pub fn take_command(&mut self) -> Option<Command> {
        if std::mem::take(&mut self.quit_pressed) {
            return Some(Command::Quit);
        }
        DIRECTIONS
            .iter()
            .find(|&&d| self.dpad[dir_index(d)].just_pressed)
            .or_else(|| DIRECTIONS.iter().find(|&&d| self.stick[dir_index(d)].just_pressed))
            .map(|&d| Command::Steer(d))
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.derive_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[dir_index(d)].set_held(held);
            return;
        }
        if held && Btn::from_gilrs(gilrs_btn).map_or(false, |b| self.quit_buttons.contains(&b)) {
            self.quit_pressed = true;
        }
    }

    /// Stick axes → digital directions (y grows upward on gilrs).
    fn derive_stick(&mut self) {
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[dir_index(Direction::Left)].set_held(x < -STICK_DEADZONE);
        self.stick[dir_index(Direction::Right)].set_held(x > STICK_DEADZONE);
        self.stick[dir_index(Direction::Up)].set_held(y > STICK_DEADZONE);
        self.stick[dir_index(Direction::Down)].set_held(y < -STICK_DEADZONE);
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for s in self.dpad.iter_mut().chain(self.stick.iter_mut()) {
            s.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.dpad = [EdgeState::default(); 4];
        self.stick = [EdgeState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
        self.quit_pressed = false;
    }
}
