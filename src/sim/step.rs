/// The step function: advances the world by one simulation tick.
///
/// Campaign processing order:
///   1. Player intent (horizontal velocity, jump)
///   2. Enemy patrol
///   3. Gravity integration (airborne only)
///   4. Axis-separated collision resolution, X then Y
///   5. Ground probe (keeps `grounded` stable while standing)
///   6. Interactions: coins, enemies, goal
///   7. Screen clamp + fall-off-screen death
///   8. Purge of removal-flagged entities
///
/// Removal flags set during interactions only take effect at the purge, so
/// an entity can never be collected twice within a tick, and a stomped
/// enemy can never also kill the player in the same encounter.

use rand::Rng;

use crate::domain::entity::{EntityKind, FrameInput, LaneShift, MoveDir};
use crate::domain::physics::{self, GAME_WIDTH};
use crate::sim::event::GameEvent;
use crate::sim::spawn;
use crate::sim::world::{Mode, Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing || world.paused {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.elapsed_ticks += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    match world.mode {
        Mode::Campaign => step_campaign(world, input, &mut events),
        Mode::Endless => step_endless(world, input, &mut events, &mut rand::thread_rng()),
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Campaign mode
// ══════════════════════════════════════════════════════════════

fn step_campaign(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    apply_intent(world, input, events);
    patrol_enemies(world);

    physics::apply_gravity(&mut world.player, world.tuning.gravity);
    world.player.grounded = false;
    physics::resolve_horizontal(&mut world.player, &world.entities);
    physics::resolve_vertical(&mut world.player, &world.entities);
    if world.player.vy == 0.0 && physics::probe_ground(&world.player, &world.entities) {
        world.player.grounded = true;
    }

    let died = resolve_interactions(world, events);

    physics::clamp_horizontal(&mut world.player);

    // Falling out of the world kills even if something else happened
    // this tick (unless the player is already dead).
    if !died && physics::fell_off_screen(&world.player) {
        kill_player(world, events);
    }

    world.purge_removed();
}

/// Translate this tick's intent into player velocity. Horizontal intent
/// maps directly to velocity (released keys arrive as `None` and zero
/// it); jump only fires from the ground.
fn apply_intent(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    world.player.vx = match input.movement {
        Some(MoveDir::Left) => -world.tuning.move_speed,
        Some(MoveDir::Right) => world.tuning.move_speed,
        None => 0.0,
    };

    if input.jump && world.player.grounded {
        world.player.vy = world.tuning.jump_velocity;
        world.player.grounded = false;
        events.push(GameEvent::PlayerJumped);
    }
}

/// Enemies walk back and forth, reversing at the screen edges.
fn patrol_enemies(world: &mut WorldState) {
    for e in world.entities.iter_mut() {
        if e.pending_removal {
            continue;
        }
        if let EntityKind::Enemy { speed, dir } = &mut e.kind {
            e.rect.x += *speed * dir.sign();
            if e.rect.x <= 0.0 || e.rect.right() >= GAME_WIDTH {
                *dir = dir.flip();
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Endless mode
// ══════════════════════════════════════════════════════════════

fn step_endless<R: Rng>(
    world: &mut WorldState,
    input: FrameInput,
    events: &mut Vec<GameEvent>,
    rng: &mut R,
) {
    match input.lane_shift {
        Some(LaneShift::Up) if world.lane + 1 < world.runner.lane_count => world.lane += 1,
        Some(LaneShift::Down) if world.lane > 0 => world.lane -= 1,
        _ => {}
    }

    // Slide toward the target lane; lanes are the only vertical motion.
    let target_y = spawn::lane_floor_y(world.lane) - world.player.rect.h;
    let dy = target_y - world.player.rect.y;
    let slide = world.runner.lane_switch_speed;
    if dy.abs() <= slide {
        world.player.rect.y = target_y;
    } else {
        world.player.rect.y += slide * dy.signum();
    }

    spawn::scroll_entities(world);
    spawn::maybe_spawn(world, rng);

    let died = resolve_interactions(world, events);
    if !died {
        world.distance += world.runner.scroll_speed;
    }

    world.purge_removed();
}

// ══════════════════════════════════════════════════════════════
// Interactions: coins, enemies, goal
// ══════════════════════════════════════════════════════════════

/// Evaluate overlap interactions with non-solid entities (plus the goal).
/// Returns true if the player died this tick. Flagged entities are
/// skipped, which is what makes coin collection idempotent.
fn resolve_interactions(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    for i in 0..world.entities.len() {
        if world.entities[i].pending_removal {
            continue;
        }
        let kind = world.entities[i].kind;
        let rect = world.entities[i].rect;
        // The goal is solid: the push-out parks the player flush against
        // it with no strict overlap left, so goal contact is tested
        // edge-inclusive. Everything else stays strict.
        let contact = if kind == EntityKind::Goal {
            world.player.rect.touches(&rect)
        } else {
            world.player.rect.overlaps(&rect)
        };
        if !contact {
            continue;
        }

        match kind {
            EntityKind::Coin => {
                world.entities[i].pending_removal = true;
                world.coins += 1;
                events.push(GameEvent::CoinCollected);
            }
            EntityKind::Enemy { .. } => {
                // Stomp and death are mutually exclusive for a pair.
                if physics::is_stomp(&world.player, &rect) {
                    world.entities[i].pending_removal = true;
                    world.player.vy = world.tuning.jump_velocity / 2.0;
                    events.push(GameEvent::EnemyStomped);
                } else {
                    kill_player(world, events);
                    return true;
                }
            }
            EntityKind::Goal => {
                events.push(GameEvent::LevelCleared);
                world.phase = Phase::LevelComplete;
                world.anim_tick = 0;
                return false;
            }
            EntityKind::Platform { .. } => {}
        }
    }
    false
}

fn kill_player(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::PlayerKilled);
    world.phase = Phase::Dying;
    world.anim_tick = 0;
}

// ══════════════════════════════════════════════════════════════
// Session transitions
// ══════════════════════════════════════════════════════════════

/// Rebuild the level session from its template: fresh entity instances,
/// player back at the spawn point with zero velocity.
pub fn restart_level(world: &mut WorldState) {
    match world.mode {
        Mode::Campaign => {
            world.entities = world.template.instantiate();
            let (sx, sy) = world.template.spawn;
            world.player.respawn(sx, sy);
        }
        Mode::Endless => {
            world.entities.clear();
            world.lane = world.runner.lane_count / 2;
            let floor = spawn::lane_floor_y(world.lane);
            let h = world.player.rect.h;
            world.player.respawn(spawn::RUNNER_X, floor - h);
        }
    }
}

/// Begin an endless run.
pub fn start_endless(world: &mut WorldState) {
    world.mode = Mode::Endless;
    world.level_name = "Endless Run".to_string();
    world.distance = 0.0;
    restart_level(world);
    world.phase = Phase::Playing;
    world.set_message("Endless Run", 90);
}

/// Called when the death banner completes: spend a life, then either
/// respawn into the same level or go to game over.
pub fn finish_dying(world: &mut WorldState) {
    world.lives = world.lives.saturating_sub(1);
    if world.lives == 0 {
        world.phase = Phase::GameOver;
        world.anim_tick = 0;
    } else {
        restart_level(world);
        world.phase = Phase::Playing;
    }
}

/// Full progress reset after game over or game completion.
pub fn reset_progress(world: &mut WorldState) {
    world.coins = 0;
    world.lives = 3;
    world.current_level = 0;
    world.distance = 0.0;
    world.elapsed_ticks = 0;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Entity, Paint};
    use crate::domain::physics::GAME_HEIGHT;
    use crate::domain::rect::Rect;
    use crate::sim::level::LevelDef;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GROUND_Y: f32 = 352.0;

    /// A playing campaign world standing on a full-width ground platform.
    fn campaign_world() -> WorldState {
        let mut w = WorldState::new();
        w.template = LevelDef {
            name: "test".to_string(),
            spawn: (50.0, GROUND_Y - 32.0),
            platforms: vec![(Rect::new(0.0, GROUND_Y, 640.0, 32.0), Paint::Green)],
            coins: vec![],
            enemies: vec![],
            goal: None,
        };
        restart_level(&mut w);
        w.phase = Phase::Playing;
        // Settle: one tick grounds the player.
        step(&mut w, FrameInput::default());
        w
    }

    fn endless_world() -> WorldState {
        let mut w = WorldState::new();
        start_endless(&mut w);
        w
    }

    #[test]
    fn step_is_inert_outside_playing() {
        let mut w = campaign_world();
        w.phase = Phase::Title;
        let tick_before = w.tick;
        let events = step(&mut w, FrameInput::default());
        assert!(events.is_empty());
        assert_eq!(w.tick, tick_before);
    }

    #[test]
    fn standing_player_stays_grounded() {
        let mut w = campaign_world();
        assert!(w.player.grounded);
        for _ in 0..10 {
            step(&mut w, FrameInput::default());
            assert!(w.player.grounded);
            assert_eq!(w.player.rect.y, GROUND_Y - 32.0);
        }
    }

    #[test]
    fn player_falls_when_support_vanishes() {
        let mut w = campaign_world();
        assert!(w.player.grounded);
        w.entities.clear(); // ground gone
        // First tick clears the stale grounded flag, second integrates
        // gravity (it only applies to a player known to be airborne).
        step(&mut w, FrameInput::default());
        assert!(!w.player.grounded);
        step(&mut w, FrameInput::default());
        assert_eq!(w.player.vy, w.tuning.gravity);
    }

    #[test]
    fn jump_only_fires_from_the_ground() {
        let mut w = campaign_world();
        let jump = FrameInput { jump: true, ..Default::default() };

        let events = step(&mut w, jump);
        assert!(matches!(events[0], GameEvent::PlayerJumped));
        assert!(w.player.vy < 0.0);
        assert!(!w.player.grounded);

        // Airborne now: repeated jump requests are no-ops.
        let vy_before = w.player.vy;
        let events = step(&mut w, jump);
        assert!(events.is_empty());
        assert_eq!(w.player.vy, vy_before + w.tuning.gravity);
    }

    #[test]
    fn horizontal_intent_maps_to_velocity() {
        let mut w = campaign_world();
        let x0 = w.player.rect.x;
        step(&mut w, FrameInput { movement: Some(MoveDir::Right), ..Default::default() });
        assert_eq!(w.player.rect.x, x0 + w.tuning.move_speed);

        // Key released: intent is None, motion stops.
        step(&mut w, FrameInput::default());
        assert_eq!(w.player.rect.x, x0 + w.tuning.move_speed);
    }

    #[test]
    fn player_is_clamped_to_screen_bounds() {
        let mut w = campaign_world();
        w.player.rect.x = 0.0;
        for _ in 0..20 {
            step(&mut w, FrameInput { movement: Some(MoveDir::Left), ..Default::default() });
            assert!(w.player.rect.x >= 0.0);
        }
        w.player.rect.x = GAME_WIDTH - w.player.rect.w;
        for _ in 0..20 {
            step(&mut w, FrameInput { movement: Some(MoveDir::Right), ..Default::default() });
            assert!(w.player.rect.x <= GAME_WIDTH - w.player.rect.w);
        }
    }

    #[test]
    fn coin_collects_exactly_once() {
        let mut w = campaign_world();
        let px = w.player.rect.x;
        let py = w.player.rect.y;
        w.entities.push(Entity::coin(px + 5.0, py + 5.0));

        let events = step(&mut w, FrameInput::default());
        assert_eq!(w.coins, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::CoinCollected)));
        // Purged before the next tick begins.
        assert!(!w.entities.iter().any(|e| matches!(e.kind, EntityKind::Coin)));

        // Overlap can no longer persist; counter stays at 1.
        step(&mut w, FrameInput::default());
        assert_eq!(w.coins, 1);
    }

    #[test]
    fn stomp_defeats_enemy_and_rebounds() {
        let mut w = campaign_world();
        // Put the player in the air directly above an enemy, falling.
        w.player.rect.x = 200.0;
        w.player.rect.y = GROUND_Y - 80.0;
        w.player.grounded = false;
        w.player.vy = 6.0;
        w.entities.push(Entity::enemy(200.0, GROUND_Y - 30.0, 0.0));

        let mut stomped = false;
        for _ in 0..10 {
            let events = step(&mut w, FrameInput::default());
            if events.iter().any(|e| matches!(e, GameEvent::EnemyStomped)) {
                stomped = true;
                break;
            }
        }
        assert!(stomped);
        assert_eq!(w.phase, Phase::Playing); // stomp is never lethal
        assert_eq!(w.player.vy, w.tuning.jump_velocity / 2.0);
        assert!(!w.entities.iter().any(|e| matches!(e.kind, EntityKind::Enemy { .. })));
    }

    #[test]
    fn side_contact_with_enemy_is_lethal() {
        let mut w = campaign_world();
        let px = w.player.rect.x;
        let py = w.player.rect.y;
        w.entities.push(Entity::enemy(px + 20.0, py + 2.0, 0.0));

        let events = step(&mut w, FrameInput::default());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert_eq!(w.phase, Phase::Dying);
        // Mutual exclusivity: the enemy survives the encounter.
        assert!(w.entities.iter().any(|e| matches!(e.kind, EntityKind::Enemy { .. })));
    }

    #[test]
    fn walking_into_the_goal_clears_the_stage() {
        // The goal is solid, so the horizontal push-out leaves the player
        // flush against its face; the clear must fire from that flush
        // position through ordinary movement. Stage-1 goal geometry.
        let mut w = WorldState::new();
        w.template = LevelDef {
            name: "goalpost".to_string(),
            spawn: (400.0, GROUND_Y - 32.0),
            platforms: vec![(Rect::new(0.0, GROUND_Y, 640.0, 32.0), Paint::Green)],
            coins: vec![],
            enemies: vec![],
            goal: Some(Rect::new(590.0, 304.0, 40.0, 48.0)),
        };
        restart_level(&mut w);
        w.phase = Phase::Playing;

        let mut cleared = false;
        for _ in 0..600 {
            let events = step(
                &mut w,
                FrameInput { movement: Some(MoveDir::Right), ..Default::default() },
            );
            if events.iter().any(|e| matches!(e, GameEvent::LevelCleared)) {
                cleared = true;
                break;
            }
        }
        assert!(cleared, "player never reached the goal, stopped at x={}", w.player.rect.x);
        assert_eq!(w.phase, Phase::LevelComplete);
    }

    #[test]
    fn fall_off_screen_costs_a_life_and_respawns() {
        // Spawn in open air with no ground anywhere: the player must fall
        // out of the world, die, and come back at the spawn point.
        let mut w = WorldState::new();
        w.template = LevelDef {
            name: "pit".to_string(),
            spawn: (50.0, 0.0),
            platforms: vec![],
            coins: vec![],
            enemies: vec![],
            goal: None,
        };
        restart_level(&mut w);
        w.phase = Phase::Playing;

        let mut ticks = 0;
        while w.phase == Phase::Playing && ticks < 300 {
            step(&mut w, FrameInput::default());
            ticks += 1;
        }
        assert_eq!(w.phase, Phase::Dying);
        assert!(w.player.rect.y > GAME_HEIGHT);

        finish_dying(&mut w);
        assert_eq!(w.lives, 2);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player.rect.x, 50.0);
        assert_eq!(w.player.rect.y, 0.0);
        assert_eq!(w.player.vy, 0.0);
    }

    #[test]
    fn last_life_leads_to_game_over_and_reset() {
        let mut w = campaign_world();
        w.lives = 1;
        w.coins = 7;
        w.current_level = 1;
        w.phase = Phase::Dying;

        finish_dying(&mut w);
        assert_eq!(w.phase, Phase::GameOver);

        reset_progress(&mut w);
        assert_eq!(w.coins, 0);
        assert_eq!(w.lives, 3);
        assert_eq!(w.current_level, 0);
    }

    #[test]
    fn respawn_rebuilds_entities_from_template() {
        let mut w = campaign_world();
        w.template.coins.push((100.0, GROUND_Y - 20.0));
        restart_level(&mut w);
        let coins_before = w.entities.iter()
            .filter(|e| matches!(e.kind, EntityKind::Coin))
            .count();
        assert_eq!(coins_before, 1);

        // Collect the coin, then die: the reload must bring it back.
        if let Some(e) = w.entities.iter_mut().find(|e| matches!(e.kind, EntityKind::Coin)) {
            e.pending_removal = true;
        }
        w.purge_removed();
        restart_level(&mut w);
        let coins_after = w.entities.iter()
            .filter(|e| matches!(e.kind, EntityKind::Coin))
            .count();
        assert_eq!(coins_after, 1);
    }

    #[test]
    fn enemies_patrol_and_reverse_at_edges() {
        let mut w = campaign_world();
        w.entities.push(Entity::enemy(GAME_WIDTH - 32.0, 100.0, 2.0));
        step(&mut w, FrameInput::default());
        // Walked into the right edge and turned around.
        let dir = w.entities.iter()
            .find_map(|e| match e.kind {
                EntityKind::Enemy { dir, .. } => Some(dir),
                _ => None,
            })
            .expect("enemy present");
        assert_eq!(dir, crate::domain::entity::Dir::Left);
    }

    // ── Endless mode ──

    #[test]
    fn lane_shifts_clamp_to_lane_range() {
        let mut w = endless_world();
        let top = w.runner.lane_count - 1;
        for _ in 0..10 {
            step_endless(
                &mut w,
                FrameInput { lane_shift: Some(LaneShift::Up), ..Default::default() },
                &mut vec![],
                &mut StdRng::seed_from_u64(1),
            );
        }
        assert_eq!(w.lane, top);
        for _ in 0..10 {
            step_endless(
                &mut w,
                FrameInput { lane_shift: Some(LaneShift::Down), ..Default::default() },
                &mut vec![],
                &mut StdRng::seed_from_u64(1),
            );
        }
        assert_eq!(w.lane, 0);
    }

    #[test]
    fn player_slides_to_target_lane_floor() {
        let mut w = endless_world();
        let start_lane = w.lane;
        step_endless(
            &mut w,
            FrameInput { lane_shift: Some(LaneShift::Up), ..Default::default() },
            &mut vec![],
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(w.lane, start_lane + 1);
        for _ in 0..50 {
            step_endless(&mut w, FrameInput::default(), &mut vec![], &mut StdRng::seed_from_u64(1));
        }
        let target = spawn::lane_floor_y(w.lane) - w.player.rect.h;
        assert_eq!(w.player.rect.y, target);
    }

    #[test]
    fn obstacle_contact_in_endless_is_lethal() {
        let mut w = endless_world();
        let px = w.player.rect.x;
        let py = w.player.rect.y;
        w.entities.push(Entity::enemy(px + 10.0, py + 2.0, 0.0));
        let mut events = vec![];
        step_endless(&mut w, FrameInput::default(), &mut events, &mut StdRng::seed_from_u64(1));
        assert_eq!(w.phase, Phase::Dying);
    }

    #[test]
    fn distance_accrues_while_alive() {
        let mut w = endless_world();
        let mut events = vec![];
        for _ in 0..5 {
            step_endless(&mut w, FrameInput::default(), &mut events, &mut StdRng::seed_from_u64(9));
        }
        assert_eq!(w.distance, 5.0 * w.runner.scroll_speed);
    }
}
