/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::{FrameInput, LaneShift, MoveDir};
use sim::event::GameEvent;
use sim::level::{self, load_level};
use sim::step;
use sim::world::{Mode, Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::theme::Skin;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new();
    world.tuning = config.tuning.clone();
    world.runner = config.runner.clone();
    world.total_levels = level::level_names(&config).len();

    let mut renderer = Renderer::new(Skin::load());
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Sky Hopper!");
    println!("Coins collected: {}", world.coins);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tuning.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp, config) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            if world.paused {
                // Pause blocks simulation but keeps the blink animation alive
                world.anim_tick = world.anim_tick.wrapping_add(1);
            } else {
                match world.phase {
                    Phase::Playing => {
                        let input = collect_input(&kb, &gp, world.mode);
                        let events = step::step(world, input);
                        process_sound_events(sound, &events);
                    }
                    Phase::Dying => tick_dying(world),
                    Phase::LevelComplete => tick_level_complete(world, config),
                    Phase::GameOver => tick_game_over(world),
                    Phase::GameComplete => tick_game_complete(world),
                    Phase::Title => world.anim_tick = world.anim_tick.wrapping_add(1),
                }

                // step() owns the message timer while Playing
                if world.phase != Phase::Playing && world.message_timer > 0 {
                    world.message_timer -= 1;
                    if world.message_timer == 0 {
                        world.message.clear();
                    }
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CoinCollected => sfx.play_coin(),
            GameEvent::PlayerJumped => sfx.play_jump(),
            GameEvent::EnemyStomped => sfx.play_stomp(),
            GameEvent::PlayerKilled => sfx.play_die(),
            GameEvent::LevelCleared => sfx.play_clear(),
        }
    }
}

// ── Key Constants ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_ENDLESS: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Merge keyboard and gamepad intent into one tick's FrameInput.
fn collect_input(kb: &InputState, gp: &GamepadState, mode: Mode) -> FrameInput {
    let mut input = kb.frame_input(mode);
    match mode {
        Mode::Campaign => {
            if input.movement.is_none() {
                if gp.left_held() {
                    input.movement = Some(MoveDir::Left);
                } else if gp.right_held() {
                    input.movement = Some(MoveDir::Right);
                }
            }
            input.jump = input.jump || gp.jump_pressed();
        }
        Mode::Endless => {
            if input.lane_shift.is_none() {
                if gp.up_pressed() {
                    input.lane_shift = Some(LaneShift::Up);
                } else if gp.down_pressed() {
                    input.lane_shift = Some(LaneShift::Down);
                }
            }
        }
    }
    input
}

/// Reset to the title screen, preserving config-derived state.
fn return_to_title(world: &mut WorldState) {
    let tuning = world.tuning.clone();
    let runner = world.runner.clone();
    let total = world.total_levels;
    *world = WorldState::new();
    world.tuning = tuning;
    world.runner = runner;
    world.total_levels = total;
    world.phase = Phase::Title;
}

fn start_campaign(world: &mut WorldState, config: &GameConfig) {
    step::reset_progress(world);
    load_level(world, 0, config);
}

fn start_endless(world: &mut WorldState) {
    step::reset_progress(world);
    step::start_endless(world);
}

/// Handle meta keys (menus, pause, quit). Returns true to exit the game.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState, config: &GameConfig) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    if world.paused {
        if kb.any_pressed(KEYS_PAUSE) {
            world.paused = false;
        } else if esc {
            world.paused = false;
            return_to_title(world);
        }
        return false; // block all other input while paused
    }

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                start_campaign(world, config);
            } else if kb.any_pressed(KEYS_ENDLESS) {
                start_endless(world);
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                return_to_title(world);
            } else if kb.any_pressed(KEYS_PAUSE) {
                world.paused = true;
            } else if world.mode == Mode::Campaign
                && (kb.any_pressed(KEYS_RESTART) || gp.restart_pressed())
            {
                step::restart_level(world);
                world.set_message("Stage Restarted", 30);
            }
        }

        // ── Dying: the animation cannot be skipped ──
        Phase::Dying => {}

        // ── Stage-clear banner: confirm skips the wait ──
        Phase::LevelComplete => {
            if confirm {
                advance_level(world, config);
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Game over / game complete banners ──
        Phase::GameOver | Phase::GameComplete => {
            if confirm || esc {
                step::reset_progress(world);
                return_to_title(world);
            }
        }
    }

    false
}

// ── Banner phase timers ──

const DYING_TICKS: u32 = 30;
const CLEAR_TICKS: u32 = 60;
const OVER_TICKS: u32 = 150;
const COMPLETE_TICKS: u32 = 180;

fn tick_dying(world: &mut WorldState) {
    world.anim_tick += 1;
    if world.anim_tick >= DYING_TICKS {
        step::finish_dying(world);
        if world.phase == Phase::GameOver {
            world.set_message("GAME OVER", 120);
        }
    }
}

fn advance_level(world: &mut WorldState, config: &GameConfig) {
    match world.mode {
        Mode::Campaign => load_level(world, world.current_level + 1, config),
        // Endless never raises LevelComplete; guard anyway.
        Mode::Endless => world.phase = Phase::Playing,
    }
}

fn tick_level_complete(world: &mut WorldState, config: &GameConfig) {
    world.anim_tick += 1;
    if world.anim_tick >= CLEAR_TICKS {
        advance_level(world, config);
    }
}

fn tick_game_over(world: &mut WorldState) {
    world.anim_tick += 1;
    if world.anim_tick >= OVER_TICKS {
        step::reset_progress(world);
        return_to_title(world);
    }
}

fn tick_game_complete(world: &mut WorldState) {
    world.anim_tick += 1;
    if world.anim_tick >= COMPLETE_TICKS {
        step::reset_progress(world);
        return_to_title(world);
    }
}
