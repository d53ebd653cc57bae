use crate::playfield::Coord;
use crate::TermInt;
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};

/// Visual style of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    SnakeAlive,
    Obstacle,
    Food,
    Empty,
}

impl CellStyle {
    fn color(self) -> Color {
        match self {
            CellStyle::SnakeAlive => Color::Green,
            CellStyle::Obstacle => Color::Red,
            CellStyle::Food => Color::Blue,
            CellStyle::Empty => Color::Black,
        }
    }
}

/// Cell-addressed drawing, everything the game core needs from a terminal.
///
/// Writes may be buffered until `flush` is called.
pub trait Surface {
    fn write(&mut self, pos: Coord, style: CellStyle) -> io::Result<()>;

    fn erase(&mut self, pos: Coord) -> io::Result<()> {
        self.write(pos, CellStyle::Empty)
    }

    fn print_text(&mut self, pos: Coord, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn write(&mut self, pos: Coord, style: CellStyle) -> io::Result<()> {
        (**self).write(pos, style)
    }

    fn erase(&mut self, pos: Coord) -> io::Result<()> {
        (**self).erase(pos)
    }

    fn print_text(&mut self, pos: Coord, text: &str) -> io::Result<()> {
        (**self).print_text(pos, text)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

pub struct TermManager {
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout() }
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen)
    }

    /// Size of the terminal as `(rows, cols)`
    pub fn terminal_size(&self) -> io::Result<(TermInt, TermInt)> {
        let (cols, rows) = terminal::size()?;
        Ok((rows, cols))
    }

    pub fn color_count(&self) -> u16 {
        style::available_color_count()
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TermManager {
    fn write(&mut self, pos: Coord, style: CellStyle) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(pos.col, pos.row),
            style::SetBackgroundColor(style.color()),
            style::Print(' '),
            style::ResetColor
        )
    }

    fn print_text(&mut self, pos: Coord, text: &str) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.col, pos.row), style::Print(text))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Waits up to `timeout` for a key press. Releases and repeats are skipped.
pub fn read_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if !poll(timeout)? {
        return Ok(None);
    }

    match read()? {
        Event::Key(ev) if ev.kind == KeyEventKind::Press => Ok(Some(ev)),
        _ => Ok(None),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Remembers the last style written to each cell
    #[derive(Debug, Default)]
    pub struct MemorySurface {
        pub cells: HashMap<Coord, CellStyle>,
        pub text: HashMap<Coord, String>,
        pub writes: usize,
        pub flushes: usize,
    }

    impl MemorySurface {
        pub fn style_at(&self, pos: Coord) -> Option<CellStyle> {
            self.cells.get(&pos).copied()
        }
    }

    impl Surface for MemorySurface {
        fn write(&mut self, pos: Coord, style: CellStyle) -> io::Result<()> {
            self.cells.insert(pos, style);
            self.writes += 1;
            Ok(())
        }

        fn print_text(&mut self, pos: Coord, text: &str) -> io::Result<()> {
            self.text.insert(pos, text.to_owned());
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }
}
