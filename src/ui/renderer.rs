/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The simulation runs on a fixed 640x384 pixel canvas; the renderer
/// rasterizes it onto an 80x24 character grid (8x16 pixels per cell) plus
/// HUD and message rows. Frames are built into a front buffer, diffed
/// against the previous frame, and only changed cells are written out.
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::EntityKind;
use crate::domain::physics::{GAME_HEIGHT, GAME_WIDTH};
use crate::domain::rect::Rect;
use crate::sim::spawn;
use crate::sim::world::{Mode, Phase, WorldState};
use crate::ui::theme::Skin;

/// Pixels per terminal cell.
const PX_PER_COL: f32 = 8.0;
const PX_PER_ROW: f32 = 16.0;

/// Playfield size in cells (640/8 by 384/16).
const MAP_COLS: usize = (GAME_WIDTH / PX_PER_COL) as usize;
const MAP_ROWS: usize = (GAME_HEIGHT / PX_PER_ROW) as usize;

/// Vertical layout.
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;
const MSG_ROW: usize = MAP_ROW + MAP_ROWS;
const HELP_ROW: usize = MSG_ROW + 1;

const MIN_TERM_W: usize = MAP_COLS;
const MIN_TERM_H: usize = HELP_ROW + 1;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// both Clear and cell backgrounds so inter-row gap pixels match.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 22, b: 38 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer; differs from any real
    /// cell so every position gets diffed.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn fill_row(&mut self, y: usize, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    skin: Skin,
}

impl Renderer {
    pub fn new(skin: Skin) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            skin,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 26));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 26));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        if self.term_w < MIN_TERM_W || self.term_h < MIN_TERM_H {
            self.compose_too_small();
        } else {
            match world.phase {
                Phase::Title => self.compose_title(world),
                Phase::Playing | Phase::Dying | Phase::LevelComplete => {
                    self.compose_game(world)
                }
                Phase::GameOver => self.compose_game_over(world),
                Phase::GameComplete => self.compose_game_complete(world),
            }

            if world.paused {
                self.compose_pause_overlay(world);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at frame start. Not ResetColor: the
        // terminal's native default may differ from BASE_BG and cause
        // line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                let mut buf = [0u8; 4];
                queue!(self.writer, Print(cell.ch.encode_utf8(&mut buf) as &str))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Rasterization helpers ──

    /// Pixel rect → inclusive cell column/row ranges, clamped to the map.
    fn rect_cells(rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        if rect.right() <= 0.0 || rect.x >= GAME_WIDTH || rect.bottom() <= 0.0 || rect.y >= GAME_HEIGHT {
            return None;
        }
        let c0 = (rect.x.max(0.0) / PX_PER_COL) as usize;
        let c1 = (((rect.right() - 0.01).min(GAME_WIDTH - 1.0)) / PX_PER_COL) as usize;
        let r0 = (rect.y.max(0.0) / PX_PER_ROW) as usize;
        let r1 = (((rect.bottom() - 0.01).min(GAME_HEIGHT - 1.0)) / PX_PER_ROW) as usize;
        Some((c0, c1.min(MAP_COLS - 1), r0, r1.min(MAP_ROWS - 1)))
    }

    fn draw_rect(&mut self, rect: &Rect, ch: char, fg: Color, bg: Color) {
        if let Some((c0, c1, r0, r1)) = Self::rect_cells(rect) {
            for r in r0..=r1 {
                for c in c0..=c1 {
                    self.front.set(c, MAP_ROW + r, Cell::new(ch, fg, bg));
                }
            }
        }
    }

    // ── Game view ──

    fn compose_game(&mut self, w: &WorldState) {
        self.compose_hud(w);

        // Endless mode has no platform entities; sketch the lane floors.
        if w.mode == Mode::Endless {
            for lane in 0..w.runner.lane_count {
                let row = (spawn::lane_floor_y(lane) / PX_PER_ROW) as usize;
                if row < MAP_ROWS {
                    for c in 0..MAP_COLS {
                        self.front.set(
                            c,
                            MAP_ROW + row,
                            Cell::new(self.skin.lane_glyph, self.skin.lane_fg, Cell::BASE_BG),
                        );
                    }
                }
            }
        }

        // Solids first, then pickups and enemies on top.
        for e in &w.entities {
            if let EntityKind::Platform { color } = e.kind {
                let fg = self.skin.paint_color(color);
                self.draw_rect(&e.rect, self.skin.platform_glyph, fg, Cell::BASE_BG);
            }
        }
        for e in &w.entities {
            match e.kind {
                EntityKind::Platform { .. } => {}
                EntityKind::Coin => {
                    self.draw_rect(&e.rect, self.skin.coin_glyph, self.skin.coin_fg, Cell::BASE_BG)
                }
                EntityKind::Enemy { .. } => {
                    self.draw_rect(&e.rect, self.skin.enemy_glyph, self.skin.enemy_fg, Cell::BASE_BG)
                }
                EntityKind::Goal => {
                    self.draw_rect(&e.rect, self.skin.goal_glyph, self.skin.goal_fg, Cell::BASE_BG)
                }
            }
        }

        // Player last. While dying, blink red.
        let player_visible = w.phase != Phase::Dying || (w.anim_tick / 3) % 2 == 0;
        if player_visible {
            let fg = if w.phase == Phase::Dying {
                Color::Rgb { r: 255, g: 60, b: 60 }
            } else {
                self.skin.player_fg
            };
            self.draw_rect(&w.player.rect, self.skin.player_glyph, fg, Cell::BASE_BG);
        }

        // Message bar
        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(MSG_ROW, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
            self.front.put_str(0, MSG_ROW, &msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }

        // Help bar
        let help = match w.mode {
            Mode::Campaign => " ←→/AD:Move  ↑/W/Space:Jump  P:Pause  R:Restart  ESC:Title",
            Mode::Endless => " ↑↓/WS:Change Lane  P:Pause  ESC:Title",
        };
        self.front.put_str(0, HELP_ROW, help, Color::DarkGrey, Cell::BASE_BG);

        // Stage-clear overlay
        if w.phase == Phase::LevelComplete {
            self.compose_clear_overlay(w);
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        self.front.fill_row(HUD_ROW, Color::White, self.skin.hud_bg);
        let hud = match w.mode {
            Mode::Campaign => format!(
                " Stage {:>2}/{}  Coins:{:<4} ♥×{}  {:>4}s ",
                w.current_level + 1,
                w.total_levels.max(1),
                w.coins,
                w.lives,
                w.elapsed_secs(),
            ),
            Mode::Endless => format!(
                " Endless  Dist:{:<6} Coins:{:<4} ♥×{}  {:>4}s ",
                w.distance as u64 / 10, // meters, roughly
                w.coins,
                w.lives,
                w.elapsed_secs(),
            ),
        };
        self.front.put_str(0, HUD_ROW, &hud, Color::White, self.skin.hud_bg);
    }

    fn compose_clear_overlay(&mut self, w: &WorldState) {
        let border = "╔══════════════════════════╗";
        let middle = "║     ★ STAGE CLEAR ★      ║";
        let bottom = "╚══════════════════════════╝";
        let cx = MAP_COLS.saturating_sub(border.chars().count()) / 2;
        let cy = MAP_ROW + MAP_ROWS / 2 - 1;
        let fg = Color::Rgb { r: 255, g: 220, b: 50 };
        let bg = Color::Rgb { r: 20, g: 60, b: 20 };
        self.front.put_str(cx, cy, border, fg, bg);
        self.front.put_str(cx, cy + 1, middle, fg, bg);
        self.front.put_str(cx, cy + 2, bottom, fg, bg);

        let next = if w.current_level + 1 < w.total_levels {
            format!("Next: Stage {}", w.current_level + 2)
        } else {
            "Final stage done!".to_string()
        };
        let nx = MAP_COLS.saturating_sub(next.chars().count()) / 2;
        self.front.put_str(nx, cy + 4, &next, Color::Rgb { r: 80, g: 255, b: 80 }, Cell::BASE_BG);
    }

    // ── Static screens ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___  _           _  _                                ",
            r" / __|| |__ _  _  | || | ___  _ __  _ __  ___  _ _     ",
            r" \__ \| / /| || | | __ |/ _ \| '_ \| '_ \/ -_)| '_|    ",
            r" |___/|_\_\ \_, | |_||_|\___/| .__/| .__/\___||_|      ",
            r"            |__/             |_|   |_|                 ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 120, g: 200, b: 255 }, Cell::BASE_BG);
        }

        let tagline = "━━━ Terminal Edition ━━━";
        self.front.put_str(16, 8, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Cell::BASE_BG);

        let menu_base = 11;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(8, menu_base, "ENTER   Campaign", hi, Cell::BASE_BG);
        self.front.put_str(8, menu_base + 1, "  E     Endless Run", Color::Rgb { r: 255, g: 220, b: 50 }, Cell::BASE_BG);
        self.front.put_str(8, menu_base + 2, "  Q     Quit", Color::White, Cell::BASE_BG);

        let help = [
            "Controls",
            "  ←→ / AD        Move       ↑ / W / Space  Jump",
            "  ↑↓ / WS        Lane up/down (endless)",
            "  P  Pause   R  Restart Level   ESC  Title",
        ];
        let help_base = menu_base + 5;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { Color::Rgb { r: 255, g: 200, b: 50 } } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Cell::BASE_BG);
        }

        if w.total_levels > 0 {
            let info = format!("  {} stages loaded", w.total_levels);
            self.front.put_str(8, help_base + 5, &info, Color::DarkGrey, Cell::BASE_BG);
        }

        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            let msg_row = self.front.height.saturating_sub(1);
            self.front.put_str(0, msg_row, &msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔═══════════════════════════╗",
            "║      ✕ GAME  OVER ✕       ║",
            "╚═══════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb { r: 255, g: 60, b: 60 }, Cell::BASE_BG);
        }
        let coins = format!("◈ Coins collected: {}", w.coins);
        self.front.put_str(8, 9, &coins, Color::White, Cell::BASE_BG);
        let progress = match w.mode {
            Mode::Campaign => format!("◈ Reached: {}", w.level_name),
            Mode::Endless => format!("◈ Distance: {}m", w.distance as u64 / 10),
        };
        self.front.put_str(8, 10, &progress, Color::White, Cell::BASE_BG);
        self.front.put_str(8, 12, "▸ Restarting...", Color::DarkGrey, Cell::BASE_BG);
    }

    fn compose_game_complete(&mut self, w: &WorldState) {
        let box_art = [
            "╔═══════════════════════════════════╗",
            "║   ★ ALL STAGES CLEARED! ★         ║",
            "╚═══════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, Color::Rgb { r: 255, g: 220, b: 50 }, Cell::BASE_BG);
        }
        let coins = format!("◈ Coins collected: {}", w.coins);
        let stages = format!("◈ All {} stages finished in {}s", w.total_levels, w.elapsed_secs());
        self.front.put_str(6, 9, &coins, Color::White, Cell::BASE_BG);
        self.front.put_str(6, 10, &stages, Color::Rgb { r: 80, g: 255, b: 80 }, Cell::BASE_BG);
        self.front.put_str(6, 12, "▸ Returning to title...", Color::DarkGrey, Cell::BASE_BG);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let blink = (w.anim_tick / 8) % 2 == 0;
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };

        let box_w = 24_usize;
        let box_h = 7_usize;
        let box_x = MAP_COLS.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + (MAP_ROWS.saturating_sub(box_h)) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }

        let label = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.front.put_str(box_x + 6, box_y + 1, label, hdr, dim);
        self.front.put_str(box_x + 3, box_y + 3, "P    Resume", Color::Rgb { r: 100, g: 200, b: 255 }, dim);
        self.front.put_str(box_x + 3, box_y + 4, "ESC  Back to Title", Color::Rgb { r: 100, g: 200, b: 255 }, dim);
    }

    fn compose_too_small(&mut self) {
        let msg = format!("Terminal too small: need {}x{}", MIN_TERM_W, MIN_TERM_H);
        self.front.put_str(0, 0, &msg, Color::Rgb { r: 255, g: 60, b: 60 }, Cell::BASE_BG);
        self.front.put_str(0, 1, "Resize the window to continue.", Color::White, Cell::BASE_BG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_maps_onto_fixed_grid() {
        assert_eq!(MAP_COLS, 80);
        assert_eq!(MAP_ROWS, 24);
    }

    #[test]
    fn rect_cells_clamp_to_map() {
        // A full-width ground platform covers the bottom rows only.
        let ground = Rect::new(0.0, 352.0, 640.0, 32.0);
        let (c0, c1, r0, r1) = Renderer::rect_cells(&ground).expect("on screen");
        assert_eq!((c0, c1), (0, 79));
        assert_eq!((r0, r1), (22, 23));
    }

    #[test]
    fn rect_cells_rejects_offscreen() {
        assert!(Renderer::rect_cells(&Rect::new(-50.0, 0.0, 20.0, 20.0)).is_none());
        assert!(Renderer::rect_cells(&Rect::new(0.0, 400.0, 20.0, 20.0)).is_none());
    }

    #[test]
    fn small_entity_still_occupies_a_cell() {
        let coin = Rect::new(200.0, 254.0, 20.0, 20.0);
        let (c0, c1, r0, r1) = Renderer::rect_cells(&coin).expect("on screen");
        assert!(c1 >= c0);
        assert!(r1 >= r0);
    }
}
