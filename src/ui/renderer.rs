/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each glyph with the `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///
///   row 0      Stage N   Time: mm:ss
///   row 2..    map (2 columns per cell)   │ Score Board
///                                         │ Mission board
///   below map  key help / final banner

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::{Cell, Pos};
use crate::domain::serpent::SpeedState;
use crate::sim::snapshot::Snapshot;
use crate::sim::world::Phase;
use super::Display;

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer so every position diffs.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const PANEL_GAP: usize = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PANEL_FG: Color = Color::Rgb { r: 200, g: 200, b: 210 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const DONE_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.glyphs.fill(Glyph::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, snap: &Snapshot) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.glyphs.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(snap.phase) {
            self.back.glyphs.fill(Glyph::INVALID);
            self.last_phase = Some(snap.phase);
        }

        self.front.clear();
        compose(&mut self.front, snap);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }
                queue!(self.writer, Print(g.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Display for Renderer {
    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.render(snapshot)
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, snap: &Snapshot) {
    compose_hud(buf, snap);
    compose_map(buf, snap);

    let panel_x = snap.width * CELL_W + PANEL_GAP;
    let mut row = MAP_ROW;
    for (i, line) in score_lines(snap).iter().enumerate() {
        let fg = if i == 0 { TITLE_FG } else { PANEL_FG };
        buf.put_str(panel_x, row, line, fg, Color::Reset);
        row += 1;
    }
    row += 1;
    for (i, (line, done)) in mission_lines(snap).iter().enumerate() {
        let fg = match (i, done) {
            (0, _) => TITLE_FG,
            (_, true) => DONE_FG,
            _ => PANEL_FG,
        };
        buf.put_str(panel_x, row, line, fg, Color::Reset);
        row += 1;
    }

    let footer = MAP_ROW + snap.height + 1;
    match snap.phase {
        Phase::Terminated(cause) => {
            let fg = if cause.is_victory() { DONE_FG } else { Color::Rgb { r: 255, g: 60, b: 60 } };
            let banner = format!(" ◈ {cause} ◈  Stage {}  Length {} ", snap.stage, snap.length);
            buf.put_str(0, footer, &banner, fg, Color::Reset);
        }
        Phase::StageTransition => {
            let banner = format!(" ★ Stage {} ★ ", snap.stage);
            buf.put_str(0, footer, &banner, TITLE_FG, Color::Reset);
        }
        Phase::Running => {
            let help = " Arrows/WASD: Steer   Esc/Q: Quit   │  Pad: D-pad/Stick";
            buf.put_str(0, footer, help, Color::DarkGrey, Color::Reset);
        }
    }
}

fn compose_hud(buf: &mut FrameBuffer, snap: &Snapshot) {
    let speed = match snap.speed {
        SpeedState::Normal => "",
        SpeedState::Boosted => "BOOST",
        SpeedState::Slowed => "SLOW",
    };
    let hud = format!(" Stage {}   Time: {}   {speed} ", snap.stage, snap.clock());
    for x in 0..buf.width {
        buf.set(x, HUD_ROW, Glyph::new(' ', Color::White, HUD_BG));
    }
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
}

fn compose_map(buf: &mut FrameBuffer, snap: &Snapshot) {
    for y in 0..snap.height {
        for x in 0..snap.width {
            let (c0, c1, fg, bg) = cell_glyphs(snap.cell(Pos::new(x as i32, y as i32)));
            let (col, row) = (x * CELL_W, MAP_ROW + y);
            buf.set(col, row, Glyph::new(c0, fg, bg));
            buf.set(col + 1, row, Glyph::new(c1, fg, bg));
        }
    }

    // Tail first so the head wins if segments overlap.
    for (i, pos) in snap.serpent.iter().enumerate().rev() {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= snap.width || pos.y as usize >= snap.height {
            continue;
        }
        let (ch, fg) = if i == 0 {
            ('█', Color::Rgb { r: 120, g: 255, b: 120 })
        } else {
            ('▓', Color::Rgb { r: 40, g: 170, b: 60 })
        };
        let (col, row) = (pos.x as usize * CELL_W, MAP_ROW + pos.y as usize);
        buf.set(col, row, Glyph::new(ch, fg, Color::Reset));
        buf.set(col + 1, row, Glyph::new(ch, fg, Color::Reset));
    }
}

fn cell_glyphs(cell: Cell) -> (char, char, Color, Color) {
    match cell {
        Cell::Empty => (' ', ' ', Color::Reset, Color::Reset),
        Cell::Wall => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Cell::Corner => ('█', '█', Color::Rgb { r: 80, g: 80, b: 80 }, Color::Rgb { r: 50, g: 50, b: 50 }),
        Cell::Grow => ('+', '+', Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset),
        Cell::Poison => ('-', '-', Color::Rgb { r: 255, g: 70, b: 70 }, Color::Reset),
        Cell::Boost => ('»', '»', Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset),
        Cell::Slow => ('«', '«', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        Cell::Gate => ('[', ']', Color::White, Color::Rgb { r: 150, g: 60, b: 200 }),
    }
}

// ── Panel text ──

pub fn score_lines(snap: &Snapshot) -> Vec<String> {
    let s = &snap.scores;
    vec![
        "Score Board".to_string(),
        format!("B: {} / {}", snap.length, s.max_length),
        format!("+: {}", s.grow),
        format!("-: {}", s.poison),
        format!("G: {}", s.gate),
    ]
}

/// Mission board lines, each with its done flag (the header is never done).
pub fn mission_lines(snap: &Snapshot) -> Vec<(String, bool)> {
    let limit = snap.time_limit_secs;
    let deadline = if limit % 60 == 0 {
        let minutes = limit / 60;
        format!("Pass the stage in {minutes} minute{}", if minutes == 1 { "" } else { "s" })
    } else {
        format!("Pass the stage in {limit} seconds")
    };
    let mut lines = vec![("Mission".to_string(), false), (deadline, false)];
    for m in &snap.missions {
        let mark = if m.done { 'v' } else { ' ' };
        lines.push((format!("{}: {} ({mark})", m.label, m.target), m.done));
    }
    lines
}
