/// WorldState: the complete snapshot of a running game.
///
/// One level session owns the entity list exclusively; the player is a
/// singleton owned here. Level templates are kept separately from the live
/// entities so a respawn or restart always re-instantiates fresh copies
/// (a prior run marks entities removed, so templates must never be
/// mutated in place).

use crate::config::{RunnerTuning, Tuning};
use crate::domain::entity::{Entity, Player};
use crate::sim::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Dying,
    LevelComplete,
    GameOver,
    GameComplete,
}

/// Which game is being played.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Fixed levels with gravity, jumping, and a goal.
    Campaign,
    /// World-scroll lanes with procedural coins and obstacles.
    Endless,
}

pub struct WorldState {
    // ── Entities ──
    pub entities: Vec<Entity>,
    pub player: Player,

    // ── Level session ──
    /// Pristine descriptor of the current level. Never mutated after load.
    pub template: LevelDef,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,

    // ── Game state ──
    pub coins: u32,
    pub lives: u32,
    pub phase: Phase,
    pub mode: Mode,
    pub tick: u64,
    /// Ticks spent in Playing since the run started; drives the HUD clock.
    pub elapsed_ticks: u64,

    // ── Endless mode ──
    pub lane: usize,
    pub distance: f32,

    // ── Tuning ──
    pub tuning: Tuning,
    pub runner: RunnerTuning,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
    pub paused: bool,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            entities: vec![],
            player: Player::new(0.0, 0.0),
            template: LevelDef::empty(),
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            coins: 0,
            lives: 3,
            phase: Phase::Title,
            mode: Mode::Campaign,
            tick: 0,
            elapsed_ticks: 0,
            lane: 0,
            distance: 0.0,
            tuning: Tuning::default(),
            runner: RunnerTuning::default(),
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            paused: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Drop everything flagged for removal. Called once at the end of each
    /// tick, after all interaction checks have completed.
    pub fn purge_removed(&mut self) {
        self.entities.retain(|e| !e.pending_removal);
    }

    /// Elapsed play time in whole seconds, derived from the tick count.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ticks * self.tuning.tick_rate_ms / 1000
    }
}
