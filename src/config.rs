/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The physics defaults reproduce the tuning the game was balanced for;
/// override them at your own risk.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub runner: RunnerTuning,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
}

/// Campaign-mode physics tuning. Per-tick quantities, pixel units.
#[derive(Clone, Debug)]
pub struct Tuning {
    pub tick_rate_ms: u64,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
}

/// Endless-mode tuning.
#[derive(Clone, Debug)]
pub struct RunnerTuning {
    pub scroll_speed: f32,
    pub lane_count: usize,
    /// Spawn a new entity once the rightmost one is at least this many
    /// pixels left of the right edge.
    pub spawn_gap_min: f32,
    /// Probability that a spawn is a coin; the rest are obstacles.
    pub coin_chance: f64,
    /// How fast the player slides between lanes, pixels per tick.
    pub lane_switch_speed: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    runner: TomlRunner,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRunner {
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
    #[serde(default = "default_lane_count")]
    lane_count: usize,
    #[serde(default = "default_spawn_gap")]
    spawn_gap_min: f32,
    #[serde(default = "default_coin_chance")]
    coin_chance: f64,
    #[serde(default = "default_lane_switch")]
    lane_switch_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_btns")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }        // ~60 ticks/s
fn default_gravity() -> f32 { 0.8 }
fn default_jump_velocity() -> f32 { -15.0 }
fn default_move_speed() -> f32 { 5.0 }

fn default_scroll_speed() -> f32 { 4.0 }
fn default_lane_count() -> usize { 3 }
fn default_spawn_gap() -> f32 { 180.0 }
fn default_coin_chance() -> f64 { 0.35 }    // obstacles are more likely
fn default_lane_switch() -> f32 { 8.0 }

fn default_jump_btns() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            jump_velocity: default_jump_velocity(),
            move_speed: default_move_speed(),
        }
    }
}

impl Default for TomlRunner {
    fn default() -> Self {
        TomlRunner {
            scroll_speed: default_scroll_speed(),
            lane_count: default_lane_count(),
            spawn_gap_min: default_spawn_gap(),
            coin_chance: default_coin_chance(),
            lane_switch_speed: default_lane_switch(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_btns(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            jump_velocity: default_jump_velocity(),
            move_speed: default_move_speed(),
        }
    }
}

impl Default for RunnerTuning {
    fn default() -> Self {
        RunnerTuning {
            scroll_speed: default_scroll_speed(),
            lane_count: default_lane_count(),
            spawn_gap_min: default_spawn_gap(),
            coin_chance: default_coin_chance(),
            lane_switch_speed: default_lane_switch(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            tuning: Tuning {
                tick_rate_ms: toml_cfg.physics.tick_rate_ms,
                gravity: toml_cfg.physics.gravity,
                jump_velocity: toml_cfg.physics.jump_velocity,
                move_speed: toml_cfg.physics.move_speed,
            },
            runner: RunnerTuning {
                scroll_speed: toml_cfg.runner.scroll_speed,
                lane_count: toml_cfg.runner.lane_count.max(1),
                spawn_gap_min: toml_cfg.runner.spawn_gap_min,
                coin_chance: toml_cfg.runner.coin_chance.clamp(0.0, 1.0),
                lane_switch_speed: toml_cfg.runner.lane_switch_speed,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                restart: toml_cfg.gamepad.restart,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
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
    fn empty_toml_yields_defaults() {
        let cfg: TomlConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(cfg.physics.tick_rate_ms, 16);
        assert_eq!(cfg.physics.gravity, 0.8);
        assert_eq!(cfg.physics.jump_velocity, -15.0);
        assert_eq!(cfg.physics.move_speed, 5.0);
        assert_eq!(cfg.runner.lane_count, 3);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: TomlConfig = toml::from_str(
            "[physics]\ngravity = 1.2\n",
        ).expect("partial config parses");
        assert_eq!(cfg.physics.gravity, 1.2);
        assert_eq!(cfg.physics.jump_velocity, -15.0);
        assert_eq!(cfg.runner.scroll_speed, 4.0);
    }

    #[test]
    fn runner_section_overrides() {
        let cfg: TomlConfig = toml::from_str(
            "[runner]\ncoin_chance = 0.5\nlane_count = 4\n",
        ).expect("runner config parses");
        assert_eq!(cfg.runner.coin_chance, 0.5);
        assert_eq!(cfg.runner.lane_count, 4);
        assert_eq!(cfg.runner.spawn_gap_min, 180.0);
    }
}
