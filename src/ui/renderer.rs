/// Presentation layer: a double-buffered terminal renderer.
///
/// Each frame is composed into the `front` buffer, diffed cell-by-cell
/// against the `back` buffer (the previous frame), and only the changed
/// cells are repainted. Commands are batched with `queue!` and flushed
/// once, then the buffers swap. Full-screen redraws (and their flicker)
/// never happen outside a resize.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap pixels match the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 18, b: 28 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets diff'd after a resize.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Cell::BASE_BG }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg));
            cx += 1;
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = (self.width.saturating_sub(s.chars().count())) / 2;
        self.put_str(x, y, s, fg);
    }
}

// ── Palette ──

const FG_HUD: Color = Color::Rgb { r: 140, g: 200, b: 255 };
const FG_MESSAGE: Color = Color::Rgb { r: 255, g: 220, b: 120 };
const FG_WALL: Color = Color::Rgb { r: 96, g: 108, b: 160 };
const FG_BLOCK: Color = Color::Rgb { r: 196, g: 160, b: 96 };
const FG_PICKUP: Color = Color::Rgb { r: 255, g: 214, b: 64 };
const FG_ENEMY: Color = Color::Rgb { r: 235, g: 80, b: 80 };
const FG_TRAPPED: Color = Color::Rgb { r: 130, g: 130, b: 140 };
const FG_PLAYER: Color = Color::Rgb { r: 96, g: 240, b: 200 };
const FG_DIM: Color = Color::Rgb { r: 110, g: 116, b: 140 };

/// Each game cell maps to 2 terminal columns for a square look.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Glyph pair for one game cell.
fn tile_glyphs(tile: Tile) -> (char, char, Color) {
    match tile {
        Tile::Empty => (' ', ' ', FG_DIM),
        Tile::Wall => ('█', '█', FG_WALL),
        Tile::Block => ('▒', '▒', FG_BLOCK),
        Tile::Pickup => ('$', ' ', FG_PICKUP),
        Tile::Enemy => ('&', ' ', FG_ENEMY),
        Tile::EnemyTrapped => ('x', ' ', FG_TRAPPED),
        Tile::Player => ('@', ' ', FG_PLAYER),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
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
        )
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
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            _ => self.compose_game(world),
        }

        self.flush_diff()
    }

    // ── Frame composition ──

    fn compose_title(&mut self, world: &WorldState) {
        let mid = self.front.height / 2;
        let top = mid.saturating_sub(5);
        self.front.put_centered(top, "G R I D L O C K", FG_PLAYER);
        self.front.put_centered(top + 1, "containment protocol", FG_DIM);
        self.front.put_centered(
            top + 3,
            "Push blocks. Corner the swarm. Trapped drones turn to salvage.",
            FG_HUD,
        );
        self.front.put_centered(top + 5, "[Enter] Start    [Q] Quit", FG_MESSAGE);
        if world.total_levels > 0 {
            let line = format!("{} zones loaded", world.total_levels);
            self.front.put_centered(top + 7, &line, FG_DIM);
        }
        if !world.message.is_empty() && world.message_timer > 0 {
            self.front.put_centered(top + 9, &world.message, FG_MESSAGE);
        }
    }

    fn compose_game(&mut self, world: &WorldState) {
        self.draw_hud(world);
        self.draw_map(world);
        self.draw_message(world);

        match world.phase {
            Phase::Ready => {
                self.overlay(&["-- READY --", "any direction key to start"]);
            }
            Phase::LevelComplete => {
                self.overlay(&["ZONE CLEAR", "[Enter] next zone"]);
            }
            Phase::GameOver => {
                let score = format!("final score {}", world.score);
                self.overlay(&["GAME OVER", &score, "[Enter] title"]);
            }
            Phase::GameComplete => {
                let score = format!("final score {}", world.score);
                self.overlay(&["ALL ZONES CONTAINED", &score, "[Enter] title"]);
            }
            _ => {}
        }
    }

    fn draw_hud(&mut self, world: &WorldState) {
        let hud = format!(
            "SCORE {:06}   LIVES {}   ZONE {}/{} {}   DRONES {}",
            world.score,
            world.lives,
            world.current_level + 1,
            world.total_levels,
            world.level_name,
            world.enemies.len(),
        );
        self.front.put_str(1, HUD_ROW, &hud, FG_HUD);
    }

    fn draw_map(&mut self, world: &WorldState) {
        let map_w = world.grid.width() * CELL_W;
        let off_x = self.front.width.saturating_sub(map_w) / 2;

        for y in 0..world.grid.height() {
            let row = MAP_ROW + y;
            if row >= self.front.height {
                break;
            }
            for x in 0..world.grid.width() {
                let (a, b, fg) = tile_glyphs(world.grid.tile_at(x, y));
                self.front.set(off_x + x * CELL_W, row, Cell::new(a, fg));
                self.front.set(off_x + x * CELL_W + 1, row, Cell::new(b, fg));
            }
        }
    }

    fn draw_message(&mut self, world: &WorldState) {
        if world.message.is_empty() || world.message_timer == 0 {
            return;
        }
        let row = MAP_ROW + world.grid.height() + 1;
        if row < self.front.height {
            self.front.put_centered(row, &world.message, FG_MESSAGE);
        }
    }

    /// Centered lines over the middle of the map.
    fn overlay(&mut self, lines: &[&str]) {
        let mid = (MAP_ROW + self.front.height.min(MAP_ROW + 23)) / 2;
        let top = mid.saturating_sub(lines.len() / 2);
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { FG_MESSAGE } else { FG_HUD };
            self.front.put_centered(top + i, line, fg);
        }
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg: Option<Color> = None;
        let mut last_bg: Option<Color> = None;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}
