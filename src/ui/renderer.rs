/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every cell carries an explicit background from the active theme, so a
/// theme switch or screen change simply invalidates the back buffer.

use std::io::{self, BufWriter, Write};
use std::time::Instant;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use rand::Rng;

use crate::app::{AppState, Overlay, Screen};
use crate::domain::board::{Direction, Position};
use crate::domain::moves::legal_directions;
use crate::sim::progress::Achievement;
use crate::sim::session::{GameSession, SessionStatus};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    bold: bool,
}

impl Cell {
    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta, bold: false };

    fn blank(bg: Color) -> Self {
        Cell { ch: ' ', fg: Color::White, bg, bold: false }
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::INVALID; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::INVALID; w * h];
        }
    }

    fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
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
            Cell::INVALID
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg, bold });
        }
    }

    /// `s` centred in the span [x, x + w).
    fn put_centered(&mut self, x: usize, w: usize, y: usize, s: &str, fg: Color, bg: Color, bold: bool) {
        let len = s.chars().count();
        self.put_str(x + w.saturating_sub(len) / 2, y, s, fg, bg, bold);
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::blank(bg));
            }
        }
    }
}

// ── Theme ──

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

struct Theme {
    bg: Color,
    panel: Color,
    text: Color,
    dim: Color,
    accent: Color,
    board: Color,
    empty: Color,
    good: Color,
    bad: Color,
    warn: Color,
}

const DARK: Theme = Theme {
    bg: rgb(17, 24, 39),
    panel: rgb(31, 41, 55),
    text: rgb(255, 255, 255),
    dim: rgb(156, 163, 175),
    accent: rgb(245, 158, 11),
    board: rgb(31, 41, 55),
    empty: rgb(55, 65, 81),
    good: rgb(22, 163, 74),
    bad: rgb(220, 38, 38),
    warn: rgb(202, 138, 4),
};

const LIGHT: Theme = Theme {
    bg: rgb(239, 246, 255),
    panel: rgb(255, 255, 255),
    text: rgb(31, 41, 55),
    dim: rgb(107, 114, 128),
    accent: rgb(217, 119, 6),
    board: rgb(255, 255, 255),
    empty: rgb(229, 231, 235),
    good: rgb(34, 197, 94),
    bad: rgb(239, 68, 68),
    warn: rgb(234, 179, 8),
};

fn theme(dark: bool) -> &'static Theme {
    if dark { &DARK } else { &LIGHT }
}

const WHITE: Color = rgb(255, 255, 255);
const INK: Color = rgb(31, 41, 55);
const LIGHT_INK: Color = rgb(243, 244, 246);

/// (foreground, background) of a tile.
fn tile_style(value: u32, dark: bool) -> (Color, Color) {
    if dark {
        match value {
            0 => (WHITE, DARK.empty),
            2 => (LIGHT_INK, rgb(55, 65, 81)),
            4 => (LIGHT_INK, rgb(75, 85, 99)),
            8 => (WHITE, rgb(146, 64, 14)),
            16 => (WHITE, rgb(180, 83, 9)),
            32 => (WHITE, rgb(154, 52, 18)),
            64 => (WHITE, rgb(194, 65, 12)),
            128 => (WHITE, rgb(202, 138, 4)),
            256 => (WHITE, rgb(234, 179, 8)),
            512 => (WHITE, rgb(250, 204, 21)),
            1024 => (INK, rgb(253, 224, 71)),
            2048 => (INK, rgb(254, 240, 138)),
            4096 => (WHITE, rgb(34, 197, 94)),
            8192 => (WHITE, rgb(59, 130, 246)),
            16384 => (WHITE, rgb(99, 102, 241)),
            32768 => (WHITE, rgb(168, 85, 247)),
            65536 => (WHITE, rgb(236, 72, 153)),
            _ => (WHITE, rgb(147, 51, 234)),
        }
    } else {
        match value {
            0 => (INK, LIGHT.empty),
            2 => (INK, rgb(254, 249, 195)),
            4 => (INK, rgb(254, 240, 138)),
            8 => (WHITE, rgb(253, 186, 116)),
            16 => (WHITE, rgb(251, 146, 60)),
            32 => (WHITE, rgb(249, 115, 22)),
            64 => (WHITE, rgb(234, 88, 12)),
            128 => (WHITE, rgb(250, 204, 21)),
            256 => (WHITE, rgb(234, 179, 8)),
            512 => (WHITE, rgb(202, 138, 4)),
            1024 => (WHITE, rgb(161, 98, 7)),
            2048 => (WHITE, rgb(133, 77, 14)),
            4096 => (WHITE, rgb(22, 163, 74)),
            8192 => (WHITE, rgb(37, 99, 235)),
            16384 => (WHITE, rgb(79, 70, 229)),
            32768 => (WHITE, rgb(147, 51, 234)),
            65536 => (WHITE, rgb(219, 39, 119)),
            _ => (WHITE, rgb(192, 132, 252)),
        }
    }
}

/// Blend `c` 40% toward white (merge flash).
fn brighten(c: Color) -> Color {
    match c {
        Color::Rgb { r, g, b } => {
            let up = |v: u8| v + ((255 - v) as u16 * 2 / 5) as u8;
            rgb(up(r), up(g), up(b))
        }
        other => other,
    }
}

/// 12345 → "12,345"
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Label for a tile that has to fit in TILE_W columns.
fn tile_label(value: u32) -> String {
    let s = value.to_string();
    if s.len() <= TILE_W {
        s
    } else {
        format!("2^{}", value.trailing_zeros())
    }
}

// ── Layout ──

/// Tile footprint in terminal cells (roughly square on screen).
const TILE_W: usize = 7;
const TILE_H: usize = 3;

const TITLE_ROW: usize = 0;
const PANEL_ROW: usize = 2;
const BOARD_ROW: usize = 5;
const PANEL_W: usize = 10;

/// Board frame size for an n×n board, one-cell gutters included.
fn board_dims(n: usize) -> (usize, usize) {
    (n * (TILE_W + 1) + 1, n * (TILE_H + 1) + 1)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<(Screen, Overlay, bool)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        Ok(())
    }

    /// Repaint everything on the next frame.
    pub fn invalidate(&mut self) {
        self.last_view = None;
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            SetAttribute(Attribute::Reset),
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render<R: Rng>(&mut self, session: &GameSession<R>, app: &AppState, now: Instant) -> io::Result<()> {
        let th = theme(session.dark_mode());

        // Detect terminal resize
        let (tw, tht) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || tht as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = tht as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            queue!(self.writer, SetBackgroundColor(th.bg), Clear(ClearType::All))?;
        }

        // Screen, overlay or theme change → full repaint
        let view = (app.screen, app.overlay, session.dark_mode());
        if self.last_view != Some(view) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(th.bg), Clear(ClearType::All))?;
            self.last_view = Some(view);
        }

        self.front.clear(th.bg);

        match app.screen {
            Screen::Welcome => self.compose_welcome(app, th, now),
            Screen::Game => {
                self.compose_game(session, app, th, now);
                match app.overlay {
                    Overlay::Info => self.compose_info(th),
                    Overlay::Achievements => self.compose_achievements(session.achievements(), th),
                    Overlay::None => match session.status() {
                        SessionStatus::Won => self.compose_won(session, th),
                        SessionStatus::GameOver if !app.result_dismissed => self.compose_game_over(session, th),
                        _ => {}
                    },
                }
            }
        }

        self.flush_diff(th.bg)?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self, base_bg: Color) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = base_bg;
        let mut last_bold = false;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(
            self.writer,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.bold != last_bold {
                    let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.writer, SetAttribute(attr))?;
                    last_bold = cell.bold;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn board_origin(&self, n: usize) -> (usize, usize) {
        let (bw, _) = board_dims(n);
        (self.front.width.saturating_sub(bw) / 2, BOARD_ROW)
    }

    fn compose_welcome(&mut self, app: &AppState, th: &Theme, now: Instant) {
        let logo = [2u32, 4, 8, 16];
        let logo_w = logo.len() * (TILE_W + 1) - 1;
        let x0 = self.front.width.saturating_sub(logo_w) / 2;
        let y0 = (self.front.height.saturating_sub(13)) / 2;

        for (i, &v) in logo.iter().enumerate() {
            let (fg, bg) = tile_style(v, true);
            let tx = x0 + i * (TILE_W + 1);
            // Tiles drop in one after another
            let shown = app.anim_tick as usize >= i * 4;
            if shown {
                self.front.fill(tx, y0, TILE_W, TILE_H, bg);
                self.front.put_centered(tx, TILE_W, y0 + 1, &v.to_string(), fg, bg, true);
            }
        }

        let w = self.front.width;
        self.front.put_centered(0, w, y0 + 5, "2 0 4 8", th.accent, th.bg, true);
        self.front.put_centered(0, w, y0 + 6, "L E V E L S", th.dim, th.bg, false);
        self.front.put_centered(0, w, y0 + 8, "Merge tiles, reach the goal!", th.text, th.bg, false);

        // Loading bar
        let bar_w = 30;
        let progress = app.welcome_progress(now);
        let filled = (progress * bar_w as f64).round() as usize;
        let bx = w.saturating_sub(bar_w) / 2;
        for i in 0..bar_w {
            let bg = if i < filled { th.accent } else { th.empty };
            self.front.set(bx + i, y0 + 10, Cell::blank(bg));
        }
        let pct = format!("{:>3}%", (progress * 100.0).round() as u32);
        self.front.put_str(bx + bar_w + 2, y0 + 10, &pct, th.dim, th.bg, false);

        self.front.put_centered(0, w, y0 + 12, "press any key", th.dim, th.bg, false);
    }

    fn compose_game<R: Rng>(&mut self, s: &GameSession<R>, app: &AppState, th: &Theme, now: Instant) {
        let board = s.board();
        let n = board.size();
        let (bw, bh) = board_dims(n);
        let (x0, y0) = self.board_origin(n);

        // Title + level badge
        self.front.put_str(x0, TITLE_ROW, "2048", th.accent, th.bg, true);
        let badge = format!(" LVL {} ", s.level());
        self.front.put_str(x0 + 5, TITLE_ROW, &badge, WHITE, rgb(220, 38, 38), true);
        let mode = if s.dark_mode() { "dark" } else { "light" };
        self.front.put_str((x0 + bw).saturating_sub(mode.len()), TITLE_ROW, mode, th.dim, th.bg, false);

        // SCORE / TARGET / BEST panels
        let panels = [
            ("SCORE", thousands(s.score()), th.text),
            ("TARGET", thousands(s.level_target()), th.accent),
            ("BEST", thousands(s.best_score()), th.text),
        ];
        let spacing = bw.saturating_sub(PANEL_W) / 2;
        for (i, (label, value, color)) in panels.iter().enumerate() {
            let px = x0 + i * spacing;
            self.front.fill(px, PANEL_ROW, PANEL_W, 2, th.panel);
            self.front.put_centered(px, PANEL_W, PANEL_ROW, label, th.dim, th.panel, false);
            self.front.put_centered(px, PANEL_W, PANEL_ROW + 1, value, *color, th.panel, true);
        }

        // Board frame and tiles
        self.front.fill(x0, y0, bw, bh, th.board);
        let hidden = if app.spawn_visible(now) { None } else { s.new_tile().map(|p| p.pos) };
        let flash = app.merge_flash_active(now);
        for pos in board.positions() {
            let value = if Some(pos) == hidden { 0 } else { board.get(pos) };
            let merged = flash && s.merged_cells().contains(&pos);
            self.compose_tile(x0, y0, pos, value, merged, s.dark_mode());
        }

        // Status / toast line
        let status_row = y0 + bh;
        if !app.message.is_empty() {
            let msg = format!(" {} ", app.message);
            self.front.put_centered(x0, bw, status_row, &msg, INK, th.warn, true);
        } else if app.result_dismissed && s.status() == SessionStatus::GameOver {
            let line = "game over: Enter try again  U undo";
            self.front.put_centered(x0, bw, status_row, line, th.bad, th.bg, true);
        } else if s.is_keep_playing() {
            self.front.put_centered(x0, bw, status_row, "keep playing", th.dim, th.bg, false);
        }

        // Arrows that would move the board are lit
        let undo = if s.can_undo() { "U Undo" } else { "      " };
        let help = format!("  Move  {undo}  R New  T Theme  I Info  H Awards  Q Quit");
        let help_row = status_row + 1;
        let total = 4 + help.chars().count();
        let hx = self.front.width.saturating_sub(total) / 2;
        let legal = legal_directions(board);
        let arrows = [(Direction::Left, '←'), (Direction::Up, '↑'), (Direction::Right, '→'), (Direction::Down, '↓')];
        for (i, (dir, ch)) in arrows.into_iter().enumerate() {
            let fg = if legal.contains(&dir) { th.accent } else { th.dim };
            self.front.set(hx + i, help_row, Cell { ch, fg, bg: th.bg, bold: true });
        }
        self.front.put_str(hx + 4, help_row, &help, th.dim, th.bg, false);
    }

    fn compose_tile(&mut self, x0: usize, y0: usize, pos: Position, value: u32, merged: bool, dark: bool) {
        let (fg, mut bg) = tile_style(value, dark);
        if merged {
            bg = brighten(bg);
        }
        let tx = x0 + 1 + pos.col * (TILE_W + 1);
        let ty = y0 + 1 + pos.row * (TILE_H + 1);
        self.front.fill(tx, ty, TILE_W, TILE_H, bg);
        if value != 0 {
            self.front.put_centered(tx, TILE_W, ty + TILE_H / 2, &tile_label(value), fg, bg, true);
        }
    }

    /// Centered box over the board. Returns (x, y, w) of the inner area.
    fn compose_box(&mut self, w: usize, h: usize, bg: Color) -> (usize, usize, usize) {
        let x = self.front.width.saturating_sub(w) / 2;
        let y = BOARD_ROW + 1;
        self.front.fill(x, y, w, h, bg);
        (x, y, w)
    }

    fn compose_won<R: Rng>(&mut self, s: &GameSession<R>, th: &Theme) {
        let (x, y, w) = self.compose_box(31, 9, th.panel);
        let head = format!("★ LEVEL {} COMPLETE ★", s.level());
        self.front.put_centered(x, w, y + 1, &head, th.accent, th.panel, true);
        let reached = format!("You reached {}!", thousands(s.level_target()));
        self.front.put_centered(x, w, y + 3, &reached, th.text, th.panel, false);
        let advance = format!(" N  Advance to Level {} ", s.level() + 1);
        self.front.put_centered(x, w, y + 5, &advance, WHITE, th.good, true);
        self.front.put_centered(x, w, y + 7, "K / Esc  Keep playing", th.dim, th.panel, false);
    }

    fn compose_game_over<R: Rng>(&mut self, s: &GameSession<R>, th: &Theme) {
        let (x, y, w) = self.compose_box(31, 9, th.panel);
        self.front.put_centered(x, w, y + 1, "GAME OVER", th.bad, th.panel, true);
        let score = format!("Score: {}", thousands(s.score()));
        self.front.put_centered(x, w, y + 3, &score, th.text, th.panel, false);
        self.front.put_centered(x, w, y + 5, " R  Try Again ", WHITE, th.bad, true);
        if s.can_undo() {
            self.front.put_centered(x, w, y + 7, "U  Undo last move", th.dim, th.panel, false);
        }
    }

    fn compose_info(&mut self, th: &Theme) {
        let lines: [(&str, bool); 14] = [
            ("How to Play", true),
            ("Slide the tiles with the arrow keys.", false),
            ("Two equal tiles that touch merge", false),
            ("into one. Reach the level target!", false),
            ("", false),
            ("Controls", true),
            ("←↑→↓ / WASD   Move tiles", false),
            ("U / Backspace Undo last move", false),
            ("R             Restart game", false),
            ("T             Dark / light mode", false),
            ("", false),
            ("Tips", true),
            ("Keep your highest tile in a corner", false),
            ("and don't spread out big numbers.", false),
        ];
        let (x, y, w) = self.compose_box(39, lines.len() + 3, th.panel);
        for (i, (text, heading)) in lines.iter().enumerate() {
            let fg = if *heading { th.accent } else { th.text };
            self.front.put_str(x + 2, y + 1 + i, text, fg, th.panel, *heading);
        }
        self.front.put_centered(x, w, y + lines.len() + 2, "I / Esc  Close", th.dim, th.panel, false);
    }

    fn compose_achievements(&mut self, list: &[Achievement], th: &Theme) {
        let rows = list.len().max(1);
        let (x, y, w) = self.compose_box(41, rows * 2 + 7, th.panel);
        self.front.put_centered(x, w, y + 1, "Achievements", th.accent, th.panel, true);

        if list.is_empty() {
            self.front.put_centered(x, w, y + 3, "No achievements yet. Keep playing!", th.dim, th.panel, false);
        }
        for (i, a) in list.iter().enumerate() {
            let ay = y + 3 + i * 2;
            self.front.put_str(x + 2, ay, "★", th.accent, th.panel, true);
            self.front.put_str(x + 4, ay, &a.title, th.text, th.panel, true);
            self.front.put_str(x + 4, ay + 1, &a.description, th.dim, th.panel, false);
        }

        let foot = y + 3 + rows * 2 + 1;
        self.front.put_str(x + 2, foot, " C Clear current score ", INK, th.warn, false);
        self.front.put_str(x + 2, foot + 1, " X Reset all progress  ", WHITE, th.bad, false);
        self.front.put_str(x + w.saturating_sub(11), foot + 1, "H/Esc Close", th.dim, th.panel, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(16384), "16,384");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn palettes_cover_every_tile() {
        let mut v = 2u32;
        while v <= 1 << 20 {
            for dark in [true, false] {
                let (fg, bg) = tile_style(v, dark);
                assert_ne!(fg, bg, "tile {v}");
            }
            v <<= 1;
        }
        assert_ne!(tile_style(2048, true), tile_style(2048, false));
    }

    #[test]
    fn labels_fit_tiles() {
        assert_eq!(tile_label(2048), "2048");
        assert_eq!(tile_label(1 << 20), "1048576");
        assert_eq!(tile_label(1 << 30), "2^30");
        assert!(tile_label(1 << 31).len() <= TILE_W);
    }

    #[test]
    fn default_board_fits_standard_terminal() {
        let (w, h) = board_dims(4);
        assert_eq!((w, h), (33, 17));
        // board + status + help
        assert!(BOARD_ROW + h + 2 <= 24);
    }

    #[test]
    fn brighten_moves_toward_white() {
        assert_eq!(brighten(rgb(0, 0, 0)), rgb(102, 102, 102));
        assert_eq!(brighten(rgb(255, 255, 255)), rgb(255, 255, 255));
    }

    #[test]
    fn frame_buffer_clips_and_centres() {
        let mut fb = FrameBuffer::new(10, 2);
        fb.clear(Color::Black);
        fb.put_centered(0, 10, 0, "abcd", Color::White, Color::Black, false);
        assert_eq!(fb.get(3, 0).ch, 'a');
        fb.put_str(8, 1, "xyz", Color::White, Color::Black, false);
        assert_eq!(fb.get(9, 1).ch, 'y');
        assert_eq!(fb.get(10, 1), Cell::INVALID);
    }
}
