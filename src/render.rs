use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::game::Snapshot;
use crate::maze::Pos;

/// Terminal columns per grid cell.
const CELL_W: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Glyph {
    Player,
    Goal,
    Open,
    Wall,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "😃",
            Glyph::Goal => "🚩",
            Glyph::Open => "██",
            Glyph::Wall => "  ",
        }
    }

    fn color(self) -> Color {
        match self {
            Glyph::Player => Color::Blue,
            Glyph::Goal => Color::Red,
            Glyph::Open => Color::White,
            Glyph::Wall => Color::Reset,
        }
    }
}

/// Top-left corner of the board, centered, with one row above it for the HUD.
/// `None` when the terminal cannot fit the board.
fn board_origin(width: usize, height: usize, term: (u16, u16)) -> Option<(u16, u16)> {
    let need_w = u16::try_from(width * CELL_W).ok()?;
    let need_h = u16::try_from(height + 1).ok()?;
    let (term_w, term_h) = term;
    if term_w < need_w || term_h < need_h {
        return None;
    }
    Some(((term_w - need_w) / 2, (term_h - need_h) / 2 + 1))
}

/// Redraws only the cells that changed since the previous frame.
pub struct Renderer {
    width: usize,
    height: usize,
    drawn: Vec<Option<Glyph>>,
    drawn_level: Option<u32>,
    origin: Option<(u16, u16)>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            drawn: vec![None; width * height],
            drawn_level: None,
            origin: None,
        }
    }

    /// Forces a full redraw and a fresh layout on the next frame, e.g. after a resize.
    pub fn invalidate(&mut self) {
        self.drawn.fill(None);
        self.drawn_level = None;
        self.origin = None;
    }

    pub fn render(&mut self, out: &mut impl Write, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let (ox, oy) = match self.origin {
            Some(origin) => origin,
            None => {
                out.queue(Clear(ClearType::All))?;
                match board_origin(self.width, self.height, terminal::size()?) {
                    Some(origin) => {
                        self.origin = Some(origin);
                        origin
                    }
                    None => {
                        out.queue(MoveTo(0, 0))?
                            .queue(Print("Terminal too small for the maze, please enlarge it."))?;
                        return out.flush();
                    }
                }
            }
        };

        if self.drawn_level != Some(snapshot.level) {
            out.queue(MoveTo(ox, oy - 1))?
                .queue(Clear(ClearType::CurrentLine))?
                .queue(Print(format!("Level: {}  (q to quit)", snapshot.level)))?;
            self.drawn_level = Some(snapshot.level);
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let glyph = glyph_at(snapshot, Pos { x, y });
                let slot = &mut self.drawn[y * self.width + x];
                if *slot == Some(glyph) {
                    continue;
                }
                *slot = Some(glyph);
                let text = glyph.text();
                let pad = CELL_W.saturating_sub(text.width());
                out.queue(MoveTo(ox + (x * CELL_W) as u16, oy + y as u16))?
                    .queue(SetForegroundColor(glyph.color()))?
                    .queue(Print(format!("{text}{:pad$}", "")))?
                    .queue(ResetColor)?;
            }
        }

        out.flush()
    }
}

fn glyph_at(snapshot: &Snapshot<'_>, pos: Pos) -> Glyph {
    if pos == snapshot.player {
        Glyph::Player
    } else if pos == snapshot.goal {
        Glyph::Goal
    } else if snapshot.grid.is_open(pos) {
        Glyph::Open
    } else {
        Glyph::Wall
    }
}
