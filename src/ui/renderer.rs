/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of `Cell`)
///   2. Compare each cell with `back` (the previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Composition only reads the `Session` render contract and writes into a
/// `FrameBuffer`, so screens can be checked without a terminal.
///
/// Screen layout (Playing):
///   row 0                 HUD: stage, boxes placed, undo budget, time
///   rows 2..2+view_h      board through the camera
///   view_h + 3            message bar (when a message is set)
///   view_h + 5            help line

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::CellKind;
use crate::sim::session::{Phase, Session};
use super::camera::Camera;

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HIGHLIGHT: Color = Color::Rgb { r: 80, g: 255, b: 80 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell, so each position is re-sent.
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
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
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
            Cell::BLANK
        }
    }

    /// Write `s` at (x, y), one column per char, clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Paint a whole row with `bg`, then write `s` from column 0.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect::<String>().trim_end().to_string()
    }
}

// ══════════════════════════════════════════════════════════════
// Renderer
// ══════════════════════════════════════════════════════════════

/// Each board cell is two terminal columns so the grid looks square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the board, message and help rows below it.
const RESERVED_ROWS: usize = MAP_ROW + 4;

const HELP_LINE: &str =
    " ←→↑↓/WASD Move  U/Z Undo  R Reset  Esc Title  Ctrl+C Quit  │  Pad: B Undo  Y Reset";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    camera: Camera,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            camera: Camera::new(),
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.front.resize(tw as usize, th as usize);
        self.back.resize(tw as usize, th as usize);
        self.back.invalidate();
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

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(session.phase()) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase());
        }

        self.front.clear();
        match session.phase() {
            Phase::Title => compose_title(&mut self.front, session),
            Phase::Playing => compose_game(&mut self.front, &mut self.camera, session),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        // Position of the terminal cursor after the last print, if known.
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the
        // terminal's own default and leave seams between rows.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
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
}

// ── Compose: build front buffer content ──

/// Glyph pair and colours for one board cell.
fn cell_style(kind: CellKind) -> (char, char, Color, Color) {
    match kind {
        CellKind::Empty        => (' ', ' ', Color::White, BASE_BG),
        CellKind::Wall         => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        CellKind::Goal         => ('(', ')', Color::Rgb { r: 220, g: 200, b: 60 }, BASE_BG),
        CellKind::Box          => ('[', ']', Color::Rgb { r: 240, g: 170, b: 90 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        CellKind::BoxOnGoal    => ('[', ']', HIGHLIGHT, Color::Rgb { r: 20, g: 90, b: 30 }),
        CellKind::Player       => ('<', '>', Color::Rgb { r: 100, g: 200, b: 255 }, BASE_BG),
        CellKind::PlayerOnGoal => ('<', '>', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Rgb { r: 70, g: 60, b: 10 }),
    }
}

fn hud_text(session: &Session) -> String {
    let level = session.level();
    format!(
        " Stage {}/{}   Boxes {}/{}   Undo {}   Time {} ",
        session.stage_number(),
        session.level_count(),
        level.boxes_on_goals(),
        level.boxes.len(),
        session.undo_remaining(),
        session.elapsed_text(),
    )
}

fn compose_game(buf: &mut FrameBuffer, cam: &mut Camera, session: &Session) {
    let (level_w, level_h) = session.dimensions();

    // Fit the viewport to the terminal, never larger than the level.
    cam.view_w = (buf.width / CELL_W).min(level_w);
    cam.view_h = buf.height.saturating_sub(RESERVED_ROWS).max(1).min(level_h);
    cam.center_on(session.level().player, level_w, level_h);

    buf.put_bar(HUD_ROW, &hud_text(session), Color::White, HUD_BG);

    for vy in 0..cam.view_h {
        let row = MAP_ROW + vy;
        for vx in 0..cam.view_w {
            let pos = cam.view_to_level(vx, vy);
            let kind = if session.level().contains(pos) {
                session.cell_at(pos.x as usize, pos.y as usize)
            } else {
                CellKind::Empty
            };
            let (c0, c1, fg, bg) = cell_style(kind);
            let col = vx * CELL_W;
            buf.set(col, row, Cell::new(c0, fg, bg));
            buf.set(col + 1, row, Cell::new(c1, fg, bg));
        }
    }

    let msg_row = MAP_ROW + cam.view_h + 1;
    if !session.message().is_empty() {
        let msg = format!(" ◈ {} ", session.message());
        buf.put_bar(msg_row, &msg, Color::Black, MSG_BG);
    }

    let help_row = MAP_ROW + cam.view_h + 3;
    buf.put_str(0, help_row, HELP_LINE, Color::DarkGrey, BASE_BG);
}

fn compose_title(buf: &mut FrameBuffer, session: &Session) {
    let title = [
        r"  ___               ___            _    ",
        r" | _ ) ___ __ __   | _ \ _  _  ___| |_  ",
        r" | _ \/ _ \\ \ /   |  _/| || |(_-<| ' \ ",
        r" |___/\___//_\_\   |_|   \_,_|/__/|_||_|",
    ];
    for (i, line) in title.iter().enumerate() {
        buf.put_str(2, 2 + i, line, ACCENT, BASE_BG);
    }

    let subtitle = format!("◈◈  {} stages  ◈◈", session.level_count());
    let sx = 2 + title[1].chars().count().saturating_sub(subtitle.chars().count()) / 2;
    buf.put_str(sx, 7, &subtitle, HIGHLIGHT, BASE_BG);

    let menu_base = 10;
    buf.put_str(8, menu_base, "ENTER   Start", HIGHLIGHT, BASE_BG);
    buf.put_str(8, menu_base + 1, "  Q     Quit", Color::White, BASE_BG);

    let help = [
        "How to play",
        "  Push every box [] onto a goal ().",
        "  Boxes can be pushed, never pulled, one at a time.",
        "",
        "Controls",
        "  ←→↑↓ / WASD     Move",
        "  U / Z / Bksp    Undo (limited per stage)",
        "  R               Reset stage",
        "  Esc             Back to title",
    ];
    let help_base = menu_base + 3;
    for (i, line) in help.iter().enumerate() {
        let color = if line.starts_with(' ') { Color::White } else { ACCENT };
        buf.put_str(8, help_base + i, line, color, BASE_BG);
    }

    let undo_note = format!("  {} undos per stage", session.undo_remaining());
    buf.put_str(8, help_base + help.len() + 1, &undo_note, Color::DarkGrey, BASE_BG);
}
