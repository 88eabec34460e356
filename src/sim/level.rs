/// Level loader and entity factory.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.toml` files, sorted by filename)
///   2. Built-in embedded levels
///
/// ## Level file format (`.toml`):
///   ```toml
///   name = "Green Hills"
///
///   [spawn]
///   x = 50.0
///   y = 0.0
///
///   [[platforms]]
///   x = 0.0
///   y = 352.0
///   w = 640.0
///   h = 32.0
///   color = "green"    # optional
///
///   [[coins]]
///   x = 200.0
///   y = 254.0
///
///   [[enemies]]
///   x = 500.0
///   y = 322.0
///   speed = 1.0
///
///   [goal]             # optional, at most one
///   x = 590.0
///   y = 304.0
///   w = 40.0
///   h = 48.0
///   ```
///
/// A malformed file is skipped with a warning on stderr; it never aborts
/// the game.

use std::path::Path;

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::entity::{Entity, Paint};
use crate::domain::rect::Rect;
use crate::sim::step;
use crate::sim::world::{Mode, Phase, WorldState};

/// A level descriptor: the persisted template the factory instantiates
/// live entities from. Loads never mutate it.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub spawn: (f32, f32),
    pub platforms: Vec<(Rect, Paint)>,
    pub coins: Vec<(f32, f32)>,
    pub enemies: Vec<(f32, f32, f32)>, // x, y, speed
    pub goal: Option<Rect>,
}

impl LevelDef {
    pub fn empty() -> Self {
        LevelDef {
            name: String::new(),
            spawn: (0.0, 0.0),
            platforms: vec![],
            coins: vec![],
            enemies: vec![],
            goal: None,
        }
    }

    /// Produce a fresh entity list from this template. Every call builds
    /// new instances with clear removal flags. Descriptors with
    /// non-positive dimensions are dropped with a warning.
    pub fn instantiate(&self) -> Vec<Entity> {
        let mut out = Vec::new();
        for &(rect, color) in &self.platforms {
            if rect.w <= 0.0 || rect.h <= 0.0 {
                eprintln!("Warning: level {:?}: dropping degenerate platform at ({}, {})",
                          self.name, rect.x, rect.y);
                continue;
            }
            out.push(Entity::platform(rect, color));
        }
        if let Some(goal) = self.goal {
            if goal.w > 0.0 && goal.h > 0.0 {
                out.push(Entity::goal(goal));
            }
        }
        for &(x, y) in &self.coins {
            out.push(Entity::coin(x, y));
        }
        for &(x, y, speed) in &self.enemies {
            out.push(Entity::enemy(x, y, speed));
        }
        out
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load a level into the world state. Preserves coins and lives.
/// An index past the last level means the game is complete.
pub fn load_level(world: &mut WorldState, level_idx: usize, config: &GameConfig) {
    let levels = available_levels(config);

    if level_idx >= levels.len() {
        world.phase = Phase::GameComplete;
        world.anim_tick = 0;
        return;
    }

    world.mode = Mode::Campaign;
    world.current_level = level_idx;
    world.total_levels = levels.len();
    world.template = levels[level_idx].clone();
    world.level_name = world.template.name.clone();
    world.tick = 0;

    step::restart_level(world);
    world.phase = Phase::Playing;
    let name = world.level_name.clone();
    world.set_message(&name, 90);
}

/// Level names, for the title screen.
pub fn level_names(config: &GameConfig) -> Vec<String> {
    available_levels(config).iter().map(|l| l.name.clone()).collect()
}

fn available_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let from_dir = load_from_directory(dir);
        if !from_dir.is_empty() {
            return from_dir;
        }
    }
    embedded_levels()
}

// ══════════════════════════════════════════════════════════════
// TOML schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct TomlLevel {
    #[serde(default)]
    name: String,
    spawn: TomlPoint,
    #[serde(default)]
    platforms: Vec<TomlPlatform>,
    #[serde(default)]
    coins: Vec<TomlPoint>,
    #[serde(default)]
    enemies: Vec<TomlEnemy>,
    goal: Option<TomlRect>,
}

#[derive(Deserialize, Debug)]
struct TomlPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPlatform {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    x: f32,
    y: f32,
    speed: f32,
}

fn parse_level(text: &str, fallback_name: &str) -> Result<LevelDef, toml::de::Error> {
    let raw: TomlLevel = toml::from_str(text)?;
    let name = if raw.name.is_empty() {
        fallback_name.to_string()
    } else {
        raw.name
    };
    Ok(LevelDef {
        name,
        spawn: (raw.spawn.x, raw.spawn.y),
        platforms: raw.platforms.iter()
            .map(|p| {
                let color = p.color.as_deref().map(Paint::from_name).unwrap_or(Paint::Green);
                (Rect::new(p.x, p.y, p.w, p.h), color)
            })
            .collect(),
        coins: raw.coins.iter().map(|c| (c.x, c.y)).collect(),
        enemies: raw.enemies.iter().map(|e| (e.x, e.y, e.speed)).collect(),
        goal: raw.goal.map(|g| Rect::new(g.x, g.y, g.w, g.h)),
    })
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let mut found: Vec<(String, LevelDef)> = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().map_or(false, |e| e == "toml") {
            continue;
        }
        let stem = path.file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        match std::fs::read_to_string(&path) {
            Ok(text) => match parse_level(&text, &stem) {
                Ok(def) => found.push((stem, def)),
                Err(e) => eprintln!("Warning: skipping {}: {e}", path.display()),
            },
            Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.into_iter().map(|(_, def)| def).collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    let ground = |color| (Rect::new(0.0, 352.0, 640.0, 32.0), color);
    vec![
        LevelDef {
            name: "Stage 1 - Green Hills".to_string(),
            spawn: (50.0, 0.0),
            platforms: vec![
                ground(Paint::Green),
                (Rect::new(150.0, 284.0, 100.0, 20.0), Paint::Green),
                (Rect::new(350.0, 204.0, 80.0, 20.0), Paint::Green),
            ],
            coins: vec![(200.0, 254.0), (370.0, 174.0)],
            enemies: vec![(500.0, 322.0, 1.0)],
            goal: Some(Rect::new(590.0, 304.0, 40.0, 48.0)),
        },
        LevelDef {
            name: "Stage 2 - Crimson Climb".to_string(),
            spawn: (50.0, 0.0),
            platforms: vec![
                ground(Paint::Red),
                (Rect::new(100.0, 234.0, 60.0, 20.0), Paint::Red),
                (Rect::new(250.0, 134.0, 50.0, 20.0), Paint::Red),
                (Rect::new(400.0, 284.0, 200.0, 20.0), Paint::Red),
            ],
            coins: vec![(120.0, 204.0), (500.0, 254.0), (550.0, 254.0)],
            enemies: vec![(150.0, 322.0, 2.0), (450.0, 322.0, 1.5)],
            goal: Some(Rect::new(590.0, 304.0, 40.0, 48.0)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityKind;

    #[test]
    fn embedded_levels_are_well_formed() {
        let levels = embedded_levels();
        assert_eq!(levels.len(), 2);
        for def in &levels {
            assert!(!def.name.is_empty());
            assert!(def.goal.is_some());
            assert!(!def.platforms.is_empty());
            for &(rect, _) in &def.platforms {
                assert!(rect.w > 0.0 && rect.h > 0.0);
            }
        }
    }

    #[test]
    fn instantiate_builds_fresh_entities() {
        let def = &embedded_levels()[0];
        let a = def.instantiate();
        let b = def.instantiate();
        // 3 platforms + 1 goal + 2 coins + 1 enemy
        assert_eq!(a.len(), 7);
        assert_eq!(b.len(), 7);
        assert!(a.iter().all(|e| !e.pending_removal));
        assert_eq!(
            a.iter().filter(|e| matches!(e.kind, EntityKind::Coin)).count(),
            2
        );
    }

    #[test]
    fn degenerate_platforms_are_dropped() {
        let mut def = embedded_levels()[0].clone();
        def.platforms.push((Rect::new(10.0, 10.0, 0.0, 20.0), Paint::Green));
        let entities = def.instantiate();
        assert_eq!(entities.len(), 7); // the zero-width platform is gone
    }

    #[test]
    fn parse_minimal_level() {
        let text = r#"
            name = "Test Pit"

            [spawn]
            x = 10.0
            y = 0.0

            [[platforms]]
            x = 0.0
            y = 352.0
            w = 640.0
            h = 32.0
            color = "darkred"

            [[coins]]
            x = 100.0
            y = 300.0

            [[enemies]]
            x = 200.0
            y = 322.0
            speed = 1.5

            [goal]
            x = 590.0
            y = 304.0
            w = 40.0
            h = 48.0
        "#;
        let def = parse_level(text, "fallback").expect("level parses");
        assert_eq!(def.name, "Test Pit");
        assert_eq!(def.spawn, (10.0, 0.0));
        assert_eq!(def.platforms.len(), 1);
        assert_eq!(def.platforms[0].1, Paint::Red);
        assert_eq!(def.coins.len(), 1);
        assert_eq!(def.enemies[0].2, 1.5);
        assert!(def.goal.is_some());
    }

    #[test]
    fn parse_uses_fallback_name_and_defaults() {
        let text = r#"
            [spawn]
            x = 0.0
            y = 0.0
        "#;
        let def = parse_level(text, "03_cavern").expect("sparse level parses");
        assert_eq!(def.name, "03_cavern");
        assert!(def.platforms.is_empty());
        assert!(def.goal.is_none());
    }
}
