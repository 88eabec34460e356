/// Entities: the passive data the physics step operates on.
///
/// Per-kind behavior is dispatched with a single exhaustive match wherever
/// it is needed (step, renderer) — there is no per-kind vtable.

use super::rect::Rect;

/// Horizontal facing / patrol direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
}

impl Dir {
    pub fn sign(self) -> f32 {
        match self {
            Dir::Left => -1.0,
            Dir::Right => 1.0,
        }
    }

    pub fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Cosmetic platform/goal color. Physics ignores it; the renderer maps it
/// to a terminal color.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Paint {
    Green,
    Red,
    Yellow,
    Blue,
    Gray,
}

impl Paint {
    /// Parse a color name from a level file. Unknown names fall back to
    /// Green rather than failing the level load.
    pub fn from_name(name: &str) -> Paint {
        match name.to_lowercase().as_str() {
            "red" | "darkred" => Paint::Red,
            "yellow" | "gold" => Paint::Yellow,
            "blue" | "darkblue" => Paint::Blue,
            "gray" | "grey" | "stone" => Paint::Gray,
            _ => Paint::Green,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EntityKind {
    Platform { color: Paint },
    Coin,
    Enemy { speed: f32, dir: Dir },
    Goal,
}

/// A live level entity. `pending_removal` is a soft-delete flag: flagged
/// entities are skipped by all collision and interaction checks and purged
/// at the end of the tick, so removal never mutates the list mid-iteration.
#[derive(Clone, Debug)]
pub struct Entity {
    pub rect: Rect,
    pub kind: EntityKind,
    pub pending_removal: bool,
}

pub const COIN_DIM: f32 = 20.0;
pub const ENEMY_DIM: f32 = 30.0;

impl Entity {
    pub fn platform(rect: Rect, color: Paint) -> Self {
        Entity { rect, kind: EntityKind::Platform { color }, pending_removal: false }
    }

    pub fn coin(x: f32, y: f32) -> Self {
        Entity {
            rect: Rect::new(x, y, COIN_DIM, COIN_DIM),
            kind: EntityKind::Coin,
            pending_removal: false,
        }
    }

    pub fn enemy(x: f32, y: f32, speed: f32) -> Self {
        Entity {
            rect: Rect::new(x, y, ENEMY_DIM, ENEMY_DIM),
            kind: EntityKind::Enemy { speed, dir: Dir::Right },
            pending_removal: false,
        }
    }

    pub fn goal(rect: Rect) -> Self {
        Entity { rect, kind: EntityKind::Goal, pending_removal: false }
    }

    /// Solid entities block the player and can be stood on.
    pub fn is_solid(&self) -> bool {
        matches!(self.kind, EntityKind::Platform { .. } | EntityKind::Goal)
    }
}

/// The player: a rectangle plus kinematic state. Exactly one instance,
/// owned by the world. Position is mutated only by the physics step; the
/// input layer writes intent (velocity / jump) and nothing else.
#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
}

pub const PLAYER_DIM: f32 = 32.0;

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            rect: Rect::new(x, y, PLAYER_DIM, PLAYER_DIM),
            vx: 0.0,
            vy: 0.0,
            grounded: false,
        }
    }

    /// Reset to a spawn point with all motion cleared.
    pub fn respawn(&mut self, x: f32, y: f32) {
        self.rect.x = x;
        self.rect.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.grounded = false;
    }
}

/// Movement direction from held keys (continuous intent).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Lane change request (endless mode, edge-triggered).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LaneShift {
    Up,
    Down,
}

/// One tick's worth of player intent. Movement is continuous (held key),
/// jump and lane shifts are edge-triggered (fresh press).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
    pub jump: bool,
    pub lane_shift: Option<LaneShift>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_sign_and_flip() {
        assert_eq!(Dir::Left.sign(), -1.0);
        assert_eq!(Dir::Right.sign(), 1.0);
        assert_eq!(Dir::Left.flip(), Dir::Right);
        assert_eq!(Dir::Right.flip(), Dir::Left);
    }

    #[test]
    fn paint_parses_known_names() {
        assert_eq!(Paint::from_name("darkred"), Paint::Red);
        assert_eq!(Paint::from_name("GOLD"), Paint::Yellow);
        assert_eq!(Paint::from_name("grey"), Paint::Gray);
    }

    #[test]
    fn paint_falls_back_to_green() {
        assert_eq!(Paint::from_name("chartreuse"), Paint::Green);
        assert_eq!(Paint::from_name(""), Paint::Green);
    }

    #[test]
    fn solidity_by_kind() {
        let p = Entity::platform(Rect::new(0.0, 0.0, 10.0, 10.0), Paint::Green);
        let g = Entity::goal(Rect::new(0.0, 0.0, 10.0, 10.0));
        let c = Entity::coin(0.0, 0.0);
        let e = Entity::enemy(0.0, 0.0, 1.0);
        assert!(p.is_solid());
        assert!(g.is_solid());
        assert!(!c.is_solid());
        assert!(!e.is_solid());
    }

    #[test]
    fn respawn_clears_motion() {
        let mut p = Player::new(0.0, 0.0);
        p.vx = 5.0;
        p.vy = -3.0;
        p.grounded = true;
        p.respawn(50.0, 0.0);
        assert_eq!(p.rect.x, 50.0);
        assert_eq!(p.vx, 0.0);
        assert_eq!(p.vy, 0.0);
        assert!(!p.grounded);
    }
}
