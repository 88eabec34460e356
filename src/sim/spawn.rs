/// Procedural generation for endless mode.
///
/// The world scrolls left under the player; new coins and obstacles spawn
/// beyond the right edge once the rightmost live entity has moved far
/// enough in, and despawn once fully off the left edge. Lane and kind are
/// random with obstacles weighted above coins.
///
/// The naive random policy does not prove that some lane is always
/// passable; see DESIGN.md.

use rand::Rng;

use crate::domain::entity::{Entity, COIN_DIM, ENEMY_DIM};
use crate::domain::physics::{GAME_HEIGHT, GAME_WIDTH};
use crate::sim::world::WorldState;

/// Fixed player column in endless mode; the world moves, not the player.
pub const RUNNER_X: f32 = 80.0;

const LANE_SPACING: f32 = 72.0;
const LANE_BASE: f32 = 24.0;

/// World Y of a lane's floor line. Lane 0 is the bottom lane.
pub fn lane_floor_y(lane: usize) -> f32 {
    GAME_HEIGHT - LANE_BASE - lane as f32 * LANE_SPACING
}

/// Translate every entity left by the scroll speed and flag the ones that
/// have fully left the screen.
pub fn scroll_entities(world: &mut WorldState) {
    let dx = world.runner.scroll_speed;
    for e in world.entities.iter_mut() {
        e.rect.x -= dx;
        if e.rect.right() <= 0.0 {
            e.pending_removal = true;
        }
    }
}

/// Spawn a new coin or obstacle beyond the right edge when the field has
/// opened up enough. At most one spawn per tick.
pub fn maybe_spawn<R: Rng>(world: &mut WorldState, rng: &mut R) {
    let rightmost = world.entities.iter()
        .filter(|e| !e.pending_removal)
        .map(|e| e.rect.x)
        .fold(f32::MIN, f32::max);

    if rightmost > GAME_WIDTH - world.runner.spawn_gap_min {
        return; // last spawn is still too close to the edge
    }

    let lane = rng.gen_range(0..world.runner.lane_count);
    let x = GAME_WIDTH + rng.gen_range(0.0..48.0);
    let floor = lane_floor_y(lane);

    let entity = if rng.gen_bool(world.runner.coin_chance) {
        Entity::coin(x, floor - COIN_DIM)
    } else {
        // Obstacles do not patrol; the world scroll moves them.
        Entity::enemy(x, floor - ENEMY_DIM, 0.0)
    };
    world.entities.push(entity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn runner_world() -> WorldState {
        let mut w = WorldState::new();
        w.mode = crate::sim::world::Mode::Endless;
        w
    }

    #[test]
    fn lanes_are_distinct_and_on_screen() {
        for lane in 0..3 {
            let y = lane_floor_y(lane);
            assert!(y > 0.0 && y <= GAME_HEIGHT);
        }
        assert!(lane_floor_y(1) < lane_floor_y(0));
        assert!(lane_floor_y(2) < lane_floor_y(1));
    }

    #[test]
    fn empty_field_spawns_beyond_right_edge() {
        let mut w = runner_world();
        let mut rng = StdRng::seed_from_u64(7);
        maybe_spawn(&mut w, &mut rng);
        assert_eq!(w.entities.len(), 1);
        assert!(w.entities[0].rect.x >= GAME_WIDTH);
    }

    #[test]
    fn no_spawn_while_gap_unfilled() {
        let mut w = runner_world();
        let mut rng = StdRng::seed_from_u64(7);
        maybe_spawn(&mut w, &mut rng);
        let count = w.entities.len();
        // The fresh spawn sits at the right edge; nothing else may spawn.
        maybe_spawn(&mut w, &mut rng);
        assert_eq!(w.entities.len(), count);
    }

    #[test]
    fn scroll_moves_and_despawns() {
        let mut w = runner_world();
        w.runner.scroll_speed = 10.0;
        w.entities.push(Entity::coin(5.0, 100.0)); // right edge at 25
        w.entities.push(Entity::coin(300.0, 100.0));
        scroll_entities(&mut w);
        scroll_entities(&mut w);
        scroll_entities(&mut w); // first coin right edge now at -5
        assert!(w.entities[0].pending_removal);
        assert!(!w.entities[1].pending_removal);
        assert_eq!(w.entities[1].rect.x, 270.0);
    }

    #[test]
    fn coin_chance_zero_spawns_only_obstacles() {
        let mut w = runner_world();
        w.runner.coin_chance = 0.0;
        w.runner.spawn_gap_min = f32::MAX; // always allowed to spawn
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            maybe_spawn(&mut w, &mut rng);
        }
        assert!(w.entities.iter().all(|e| matches!(e.kind, EntityKind::Enemy { .. })));
    }

    #[test]
    fn spawned_entities_sit_on_a_lane_floor() {
        let mut w = runner_world();
        w.runner.spawn_gap_min = f32::MAX;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            maybe_spawn(&mut w, &mut rng);
        }
        for e in &w.entities {
            let bottom = e.rect.bottom();
            let on_some_lane = (0..w.runner.lane_count)
                .any(|l| (bottom - lane_floor_y(l)).abs() < 1e-3);
            assert!(on_some_lane, "entity bottom {bottom} not on a lane floor");
        }
    }
}
