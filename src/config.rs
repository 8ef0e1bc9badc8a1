/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// user config directory. Every key is optional; a missing file, missing
/// key, or parse error falls back to the built-in rules.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::serpent::SpeedProfile;
use crate::sim::stage::{MIN_HEIGHT, MIN_WIDTH};

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub rules: RulesConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub base_interval_ms: u64,
    pub boost_interval_ms: u64,
    pub slow_interval_ms: u64,
    pub speed_effect_secs: u64,
    pub item_lifetime_secs: u64,
    pub gate_lifetime_secs: u64,
    pub stage_time_limit_secs: u64,
    pub windmill_turn_ticks: u64,   // ticks between 45° steps
    pub windmill_freeze_ms: u64,    // pause after a gate exit near the blade
    pub min_length: usize,          // poison below this ends the run
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    pub seed: Option<u64>,
    /// None disables logging.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub quit: Vec<String>,
}

impl RulesConfig {
    pub fn speed_profile(&self) -> SpeedProfile {
        SpeedProfile {
            base: Duration::from_millis(self.base_interval_ms),
            boosted: Duration::from_millis(self.boost_interval_ms),
            slowed: Duration::from_millis(self.slow_interval_ms),
            effect: Duration::from_secs(self.speed_effect_secs),
        }
    }

    pub fn item_lifetime(&self) -> Duration {
        Duration::from_secs(self.item_lifetime_secs)
    }

    pub fn gate_lifetime(&self) -> Duration {
        Duration::from_secs(self.gate_lifetime_secs)
    }

    pub fn stage_time_limit(&self) -> Duration {
        Duration::from_secs(self.stage_time_limit_secs)
    }

    pub fn windmill_freeze(&self) -> Duration {
        Duration::from_millis(self.windmill_freeze_ms)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_base_interval")]
    base_interval_ms: u64,
    #[serde(default = "default_boost_interval")]
    boost_interval_ms: u64,
    #[serde(default = "default_slow_interval")]
    slow_interval_ms: u64,
    #[serde(default = "default_speed_effect")]
    speed_effect_secs: u64,
    #[serde(default = "default_item_lifetime")]
    item_lifetime_secs: u64,
    #[serde(default = "default_gate_lifetime")]
    gate_lifetime_secs: u64,
    #[serde(default = "default_time_limit")]
    stage_time_limit_secs: u64,
    #[serde(default = "default_windmill_ticks")]
    windmill_turn_ticks: u64,
    #[serde(default = "default_windmill_freeze")]
    windmill_freeze_ms: u64,
    #[serde(default = "default_min_length")]
    min_length: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_width() -> usize { 40 }
fn default_height() -> usize { 25 }
fn default_base_interval() -> u64 { 200 }
fn default_boost_interval() -> u64 { 100 }
fn default_slow_interval() -> u64 { 400 }
fn default_speed_effect() -> u64 { 5 }
fn default_item_lifetime() -> u64 { 10 }
fn default_gate_lifetime() -> u64 { 20 }
fn default_time_limit() -> u64 { 120 }   // 2 minutes per stage
fn default_windmill_ticks() -> u64 { 10 }
fn default_windmill_freeze() -> u64 { 1000 }
fn default_min_length() -> usize { 3 }

fn default_log_file() -> String {
    std::env::temp_dir().join("serpent-stages.log").to_string_lossy().into_owned()
}
fn default_log_level() -> String { "info".into() }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { width: default_width(), height: default_height() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            base_interval_ms: default_base_interval(),
            boost_interval_ms: default_boost_interval(),
            slow_interval_ms: default_slow_interval(),
            speed_effect_secs: default_speed_effect(),
            item_lifetime_secs: default_item_lifetime(),
            gate_lifetime_secs: default_gate_lifetime(),
            stage_time_limit_secs: default_time_limit(),
            windmill_turn_ticks: default_windmill_ticks(),
            windmill_freeze_ms: default_windmill_freeze(),
            min_length: default_min_length(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { quit: default_quit() }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        TomlGrid::default().into()
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlRules::default().into()
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        TomlGeneral::default().into()
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig { quit: default_quit() }
    }
}

// ── Conversion (with clamping) ──

impl From<TomlGrid> for GridConfig {
    fn from(t: TomlGrid) -> Self {
        let width = t.width.max(MIN_WIDTH);
        let height = t.height.max(MIN_HEIGHT);
        if (width, height) != (t.width, t.height) {
            eprintln!(
                "Warning: grid {}x{} is too small, using {width}x{height}.",
                t.width, t.height
            );
        }
        GridConfig { width, height }
    }
}

impl From<TomlRules> for RulesConfig {
    fn from(t: TomlRules) -> Self {
        RulesConfig {
            base_interval_ms: t.base_interval_ms.max(1),
            boost_interval_ms: t.boost_interval_ms.max(1),
            slow_interval_ms: t.slow_interval_ms.max(1),
            speed_effect_secs: t.speed_effect_secs,
            item_lifetime_secs: t.item_lifetime_secs,
            gate_lifetime_secs: t.gate_lifetime_secs,
            stage_time_limit_secs: t.stage_time_limit_secs,
            windmill_turn_ticks: t.windmill_turn_ticks.max(1),
            windmill_freeze_ms: t.windmill_freeze_ms,
            min_length: t.min_length.max(1),
        }
    }
}

impl From<TomlGeneral> for GeneralConfig {
    fn from(t: TomlGeneral) -> Self {
        let log_file = if t.log_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.log_file))
        };
        GeneralConfig { seed: t.seed, log_file, log_level: t.log_level }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            grid: t.grid.into(),
            rules: t.rules.into(),
            general: t.general.into(),
            gamepad: GamepadConfig { quit: t.gamepad.quit },
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) CWD, (3) user config dir.
    pub fn load() -> Self {
        load_toml(&candidate_dirs()).into()
    }

    /// Parse config text directly. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + user config (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG config home (~/.config/serpent-stages)
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")));
    if let Ok(base) = config_home {
        let dir = base.join("serpent-stages");
        if dir.is_dir() && !dirs.iter().any(|d| d == &dir) {
            dirs.push(dir);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_builtin_rules() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.grid, GridConfig { width: 40, height: 25 });
        assert_eq!(cfg.rules, RulesConfig::default());
        assert_eq!(cfg.rules.speed_profile(), SpeedProfile::default());
        assert_eq!(cfg.rules.stage_time_limit(), Duration::from_secs(120));
        assert_eq!(cfg.general.seed, None);
        assert_eq!(cfg.general.log_level, "info");
        assert!(cfg.general.log_file.is_some());
        assert_eq!(cfg.gamepad.quit, vec!["Select".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[rules]\nbase_interval_ms = 150\n[general]\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(cfg.rules.base_interval_ms, 150);
        assert_eq!(cfg.rules.boost_interval_ms, 100);
        assert_eq!(cfg.general.seed, Some(42));
        assert_eq!(cfg.grid.width, 40);
    }

    #[test]
    fn small_grid_is_clamped() {
        let cfg = GameConfig::from_toml_str("[grid]\nwidth = 10\nheight = 50\n").unwrap();
        assert_eq!(cfg.grid, GridConfig { width: MIN_WIDTH, height: 50 });
    }

    #[test]
    fn empty_log_file_disables_logging() {
        let cfg = GameConfig::from_toml_str("[general]\nlog_file = \"\"\n").unwrap();
        assert!(cfg.general.log_file.is_none());
    }

    #[test]
    fn zero_tick_counts_are_raised() {
        let cfg = GameConfig::from_toml_str("[rules]\nwindmill_turn_ticks = 0\nmin_length = 0\n").unwrap();
        assert_eq!(cfg.rules.windmill_turn_ticks, 1);
        assert_eq!(cfg.rules.min_length, 1);
    }

    #[test]
    fn bad_types_are_errors() {
        assert!(GameConfig::from_toml_str("[grid]\nwidth = \"wide\"\n").is_err());
    }
}
