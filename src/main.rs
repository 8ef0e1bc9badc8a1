/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use config::{GameConfig, GeneralConfig};
use sim::event::{GameEvent, Termination, TickOutcome};
use sim::snapshot::Snapshot;
use sim::step;
use sim::world::StageController;
use ui::gamepad::GamepadState;
use ui::input::{Controls, KeyboardInput};
use ui::renderer::Renderer;
use ui::{Command, CommandSource, Display};

/// How long the final frame stays up before teardown (any key skips).
const FINAL_FRAME_HOLD: Duration = Duration::from_millis(1500);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.general);

    let seed = config.general.seed.unwrap_or_else(rand::random);
    info!("seed {seed}, grid {}x{}", config.grid.width, config.grid.height);

    let mut ctrl = StageController::new(config.grid, config.rules.clone(), seed, Instant::now());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut gamepad = GamepadState::new();
    gamepad.load_button_config(&config.gamepad);
    debug!("gamepad connected: {}", gamepad.connected);
    let mut controls = Controls { keyboard: KeyboardInput::new(), gamepad };

    let result = game_loop(&mut ctrl, &mut renderer, &mut controls, &mut Instant::now);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    let cause = match result {
        Ok(cause) => cause,
        Err(e) => {
            eprintln!("Game error: {e}");
            warn!("game loop aborted: {e}");
            ctrl.termination().unwrap_or(Termination::Quit)
        }
    };

    println!();
    println!("{cause}");
    println!(
        "Stage {}  Length {}  Max {}  +{} -{} G{}",
        ctrl.level,
        ctrl.serpent.len(),
        ctrl.scores.max_length,
        ctrl.scores.grow,
        ctrl.scores.poison,
        ctrl.scores.gate,
    );
    println!("Thanks for playing Serpent Stages!");
}

/// Route `log` output to a file; the terminal belongs to the game.
fn init_logging(general: &GeneralConfig) {
    let Some(path) = &general.log_file else { return };
    match std::fs::File::create(path) {
        Ok(file) => {
            let result = env_logger::Builder::new()
                .parse_filters(&general.log_level)
                .parse_env("RUST_LOG")
                .target(env_logger::Target::Pipe(Box::new(file)))
                .try_init();
            if let Err(e) = result {
                eprintln!("Warning: logging disabled: {e}");
            }
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
    }
}

/// render → poll (timeout = serpent interval) → tick, until the run ends.
fn game_loop<D, C>(
    ctrl: &mut StageController,
    display: &mut D,
    input: &mut C,
    clock: &mut dyn FnMut() -> Instant,
) -> Result<Termination, Box<dyn std::error::Error>>
where
    D: Display,
    C: CommandSource,
{
    loop {
        display.draw(&Snapshot::capture(ctrl, clock()))?;

        let steer = match input.poll(ctrl.poll_timeout())? {
            Some(Command::Quit) => {
                ctrl.terminate(Termination::Quit);
                display.draw(&Snapshot::capture(ctrl, clock()))?;
                return Ok(Termination::Quit);
            }
            Some(Command::Steer(dir)) => Some(dir),
            None => None,
        };

        let outcome = step::tick(ctrl, steer, clock());
        log_events(ctrl);

        if let TickOutcome::Over(cause) = outcome {
            display.draw(&Snapshot::capture(ctrl, clock()))?;
            input.poll(FINAL_FRAME_HOLD)?;
            return Ok(cause);
        }
    }
}

fn log_events(ctrl: &mut StageController) {
    for event in ctrl.drain_events() {
        match event {
            GameEvent::ItemSpawned { .. } | GameEvent::ItemExpired { .. } => debug!("{event:?}"),
            GameEvent::WindmillTurned { state } => debug!("windmill turned to state {state}"),
            other => info!("{other:?}"),
        }
    }
}
