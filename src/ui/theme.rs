/// Visual skin loader.
///
/// Reads `skin.toml` from the executable's directory (or CWD) and maps
/// the game's logical colors and glyphs to terminal output. A missing or
/// broken file falls back to the built-in skin with a warning; cosmetics
/// never block startup.
///
/// Colors accept either a named color ("red", "darkgrey", ...) or a hex
/// triplet ("#1a2b3c").

use crossterm::style::Color;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::entity::Paint;

#[derive(Clone, Debug)]
pub struct Skin {
    pub player_glyph: char,
    pub coin_glyph: char,
    pub enemy_glyph: char,
    pub goal_glyph: char,
    pub platform_glyph: char,
    pub lane_glyph: char,

    pub player_fg: Color,
    pub coin_fg: Color,
    pub enemy_fg: Color,
    pub goal_fg: Color,
    pub lane_fg: Color,
    pub hud_bg: Color,
}

impl Default for Skin {
    fn default() -> Self {
        Skin {
            player_glyph: '@',
            coin_glyph: 'o',
            enemy_glyph: 'x',
            goal_glyph: '⚑',
            platform_glyph: '█',
            lane_glyph: '·',
            player_fg: Color::Rgb { r: 255, g: 255, b: 255 },
            coin_fg: Color::Rgb { r: 255, g: 215, b: 0 },
            enemy_fg: Color::Rgb { r: 255, g: 80, b: 80 },
            goal_fg: Color::Rgb { r: 255, g: 220, b: 50 },
            lane_fg: Color::Rgb { r: 70, g: 70, b: 90 },
            hud_bg: Color::Rgb { r: 20, g: 20, b: 60 },
        }
    }
}

impl Skin {
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("skin.toml");
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlSkin>(&text) {
                    Ok(raw) => return raw.into_skin(),
                    Err(e) => {
                        eprintln!("Warning: skin.toml parse error: {e}");
                        eprintln!("Using built-in skin.");
                        return Skin::default();
                    }
                },
                Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
            }
        }
        Skin::default()
    }

    /// Platform paint → terminal color.
    pub fn paint_color(&self, paint: Paint) -> Color {
        match paint {
            Paint::Green => Color::Rgb { r: 46, g: 160, b: 67 },
            Paint::Red => Color::Rgb { r: 160, g: 40, b: 40 },
            Paint::Yellow => Color::Rgb { r: 190, g: 160, b: 40 },
            Paint::Blue => Color::Rgb { r: 60, g: 90, b: 190 },
            Paint::Gray => Color::Rgb { r: 110, g: 110, b: 110 },
        }
    }
}

// ── TOML schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlSkin {
    #[serde(default)]
    glyphs: TomlGlyphs,
    #[serde(default)]
    colors: TomlColors,
}

#[derive(Deserialize, Debug)]
struct TomlGlyphs {
    #[serde(default = "default_player_glyph")]
    player: String,
    #[serde(default = "default_coin_glyph")]
    coin: String,
    #[serde(default = "default_enemy_glyph")]
    enemy: String,
    #[serde(default = "default_goal_glyph")]
    goal: String,
    #[serde(default = "default_platform_glyph")]
    platform: String,
    #[serde(default = "default_lane_glyph")]
    lane: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlColors {
    player: Option<String>,
    coin: Option<String>,
    enemy: Option<String>,
    goal: Option<String>,
    lane: Option<String>,
    hud_bg: Option<String>,
}

fn default_player_glyph() -> String { "@".into() }
fn default_coin_glyph() -> String { "o".into() }
fn default_enemy_glyph() -> String { "x".into() }
fn default_goal_glyph() -> String { "⚑".into() }
fn default_platform_glyph() -> String { "█".into() }
fn default_lane_glyph() -> String { "·".into() }

impl Default for TomlGlyphs {
    fn default() -> Self {
        TomlGlyphs {
            player: default_player_glyph(),
            coin: default_coin_glyph(),
            enemy: default_enemy_glyph(),
            goal: default_goal_glyph(),
            platform: default_platform_glyph(),
            lane: default_lane_glyph(),
        }
    }
}

impl TomlSkin {
    fn into_skin(self) -> Skin {
        let base = Skin::default();
        Skin {
            player_glyph: first_char(&self.glyphs.player, base.player_glyph),
            coin_glyph: first_char(&self.glyphs.coin, base.coin_glyph),
            enemy_glyph: first_char(&self.glyphs.enemy, base.enemy_glyph),
            goal_glyph: first_char(&self.glyphs.goal, base.goal_glyph),
            platform_glyph: first_char(&self.glyphs.platform, base.platform_glyph),
            lane_glyph: first_char(&self.glyphs.lane, base.lane_glyph),
            player_fg: parse_color(self.colors.player.as_deref(), base.player_fg),
            coin_fg: parse_color(self.colors.coin.as_deref(), base.coin_fg),
            enemy_fg: parse_color(self.colors.enemy.as_deref(), base.enemy_fg),
            goal_fg: parse_color(self.colors.goal.as_deref(), base.goal_fg),
            lane_fg: parse_color(self.colors.lane.as_deref(), base.lane_fg),
            hud_bg: parse_color(self.colors.hud_bg.as_deref(), base.hud_bg),
        }
    }
}

fn first_char(s: &str, fallback: char) -> char {
    s.chars().next().unwrap_or(fallback)
}

fn parse_color(name: Option<&str>, fallback: Color) -> Color {
    let name = match name {
        Some(n) => n.trim(),
        None => return fallback,
    };

    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            let parse = |s: &str| u8::from_str_radix(s, 16);
            if let (Ok(r), Ok(g), Ok(b)) = (parse(&hex[0..2]), parse(&hex[2..4]), parse(&hex[4..6])) {
                return Color::Rgb { r, g, b };
            }
        }
        eprintln!("Warning: skin.toml: bad hex color {name:?}");
        return fallback;
    }

    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "darkgrey" | "darkgray" => Color::DarkGrey,
        "darkred" => Color::DarkRed,
        "darkgreen" => Color::DarkGreen,
        "darkyellow" => Color::DarkYellow,
        "darkblue" => Color::DarkBlue,
        _ => {
            eprintln!("Warning: skin.toml: unknown color {name:?}");
            fallback
        }
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_skin_toml_yields_defaults() {
        let raw: TomlSkin = toml::from_str("").expect("empty skin parses");
        let skin = raw.into_skin();
        assert_eq!(skin.player_glyph, '@');
        assert_eq!(skin.coin_glyph, 'o');
    }

    #[test]
    fn partial_skin_overrides_only_named_fields() {
        let raw: TomlSkin = toml::from_str(
            "[glyphs]\nplayer = \"P\"\n\n[colors]\ncoin = \"#ff00ff\"\n",
        )
        .expect("partial skin parses");
        let skin = raw.into_skin();
        assert_eq!(skin.player_glyph, 'P');
        assert_eq!(skin.coin_fg, Color::Rgb { r: 255, g: 0, b: 255 });
        assert_eq!(skin.enemy_glyph, 'x');
    }

    #[test]
    fn named_and_hex_colors_parse() {
        let base = Color::White;
        assert_eq!(parse_color(Some("darkred"), base), Color::DarkRed);
        assert_eq!(parse_color(Some("#1a2b3c"), base), Color::Rgb { r: 26, g: 43, b: 60 });
        assert_eq!(parse_color(Some("not-a-color"), base), base);
        assert_eq!(parse_color(Some("#xyz"), base), base);
        assert_eq!(parse_color(None, base), base);
    }

    #[test]
    fn every_paint_has_a_color() {
        let skin = Skin::default();
        for paint in [Paint::Green, Paint::Red, Paint::Yellow, Paint::Blue, Paint::Gray] {
            // Distinct from the HUD background at minimum.
            assert_ne!(skin.paint_color(paint), skin.hud_bg);
        }
    }
}
