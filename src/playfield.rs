use std::io;

use anyhow::{bail, ensure, Result};
use log::debug;

use crate::config::GameConfig;
use crate::snake::Direction::{self, *};
use crate::term::{CellStyle, Surface};
use crate::TermInt;

/// Smallest board, border included, that fits along either axis
const MIN_SPAN: TermInt = 6;

/// One terminal cell, addressed the way the terminal does it: rows top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: TermInt,
    pub col: TermInt,
}

impl Coord {
    pub fn new(row: TermInt, col: TermInt) -> Self {
        Coord { row, col }
    }

    /// The neighbouring cell in `dir`, `None` if it would leave the terminal
    pub fn step(self, dir: Direction) -> Option<Coord> {
        let Coord { row, col } = self;
        match dir {
            Up => row.checked_sub(1).map(|row| Coord { row, col }),
            Down => row.checked_add(1).map(|row| Coord { row, col }),
            Left => col.checked_sub(1).map(|col| Coord { row, col }),
            Right => col.checked_add(1).map(|col| Coord { row, col }),
        }
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// Board rectangle `[min_row, max_row) x [min_col, max_col)`, border included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_row: TermInt,
    pub max_row: TermInt,
    pub min_col: TermInt,
    pub max_col: TermInt,
}

impl Bounds {
    pub fn new(min_row: TermInt, max_row: TermInt, min_col: TermInt, max_col: TermInt) -> Self {
        debug_assert!(max_row >= min_row + 3 && max_col >= min_col + 3);
        Bounds { min_row, max_row, min_col, max_col }
    }

    /// Board for a terminal of `rows x cols`, keeping the configured margins
    /// when they fit and shrinking them evenly when they don't.
    pub fn from_terminal(rows: TermInt, cols: TermInt, config: &GameConfig) -> Result<Self> {
        let (Some(mr), Some(mc)) = (fit_margin(rows, config.margin_rows), fit_margin(cols, config.margin_cols)) else {
            bail!("Terminal too small: {}x{}, need at least {}x{}", cols, rows, MIN_SPAN, MIN_SPAN);
        };
        let bounds = Bounds::new(mr, rows - mr, mc, cols - mc);

        ensure!(
            bounds.interior_len() >= config.min_interior_cells(),
            "Terminal too small: board holds {} cells, need {}",
            bounds.interior_len(), config.min_interior_cells()
        );

        debug!("board {:?} for a {}x{} terminal", bounds, cols, rows);
        Ok(bounds)
    }

    /// True for the lethal border, and for anything outside it
    pub fn is_boundary(&self, pos: Coord) -> bool {
        pos.row <= self.min_row
            || pos.row >= self.max_row - 1
            || pos.col <= self.min_col
            || pos.col >= self.max_col - 1
    }

    pub fn interior_rows(&self) -> TermInt {
        self.max_row - self.min_row - 2
    }

    pub fn interior_cols(&self) -> TermInt {
        self.max_col - self.min_col - 2
    }

    pub fn interior_len(&self) -> usize {
        self.interior_rows() as usize * self.interior_cols() as usize
    }

    /// Interior cells in row-major order
    pub fn interior(&self) -> impl Iterator<Item = Coord> {
        let Bounds { min_row, max_row, min_col, max_col } = *self;
        (min_row + 1..max_row - 1)
            .flat_map(move |row| (min_col + 1..max_col - 1).map(move |col| Coord { row, col }))
    }

    /// Border cells, each exactly once
    pub fn border(&self) -> impl Iterator<Item = Coord> {
        let Bounds { min_row, max_row, min_col, max_col } = *self;
        let horizontal = (min_col..max_col)
            .flat_map(move |col| [Coord::new(min_row, col), Coord::new(max_row - 1, col)]);
        let vertical = (min_row + 1..max_row - 1)
            .flat_map(move |row| [Coord::new(row, min_col), Coord::new(row, max_col - 1)]);
        horizontal.chain(vertical)
    }

    fn index(&self, pos: Coord) -> Option<usize> {
        if self.is_boundary(pos) {
            return None;
        }
        let row = (pos.row - self.min_row - 1) as usize;
        let col = (pos.col - self.min_col - 1) as usize;
        Some(row * self.interior_cols() as usize + col)
    }
}

fn fit_margin(total: TermInt, preferred: TermInt) -> Option<TermInt> {
    let spare = total.checked_sub(MIN_SPAN)?;
    Some(preferred.min(spare / 2))
}

/// What occupies an interior cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Obstacle,
    Food,
    SnakeBody,
}

impl CellKind {
    pub fn style(self) -> CellStyle {
        match self {
            CellKind::Empty => CellStyle::Empty,
            CellKind::Obstacle => CellStyle::Obstacle,
            CellKind::Food => CellStyle::Food,
            CellKind::SnakeBody => CellStyle::SnakeAlive,
        }
    }
}

/// The board: its bounds, what sits on every interior cell, and the surface
/// it is drawn on. Cell contents only change through `set_classification`,
/// which redraws the cell in the same call.
pub struct Playfield<S: Surface> {
    bounds: Bounds,
    cells: Vec<CellKind>,
    surface: S,
}

impl<S: Surface> Playfield<S> {
    /// An all-empty board. Nothing is drawn until `draw_board`.
    pub fn new(bounds: Bounds, surface: S) -> Self {
        let cells = vec![CellKind::Empty; bounds.interior_len()];
        Playfield { bounds, cells, surface }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Paints the border in the wall style and every interior cell as classified
    pub fn draw_board(&mut self) -> io::Result<()> {
        for pos in self.bounds.border() {
            self.surface.write(pos, CellStyle::Obstacle)?;
        }
        for (pos, kind) in self.bounds.interior().zip(self.cells.iter()) {
            self.surface.write(pos, kind.style())?;
        }
        self.surface.flush()
    }

    /// Current contents of an interior cell, `None` on or past the border
    pub fn classify(&self, pos: Coord) -> Option<CellKind> {
        self.bounds.index(pos).map(|i| self.cells[i])
    }

    pub fn set_classification(&mut self, pos: Coord, kind: CellKind) -> io::Result<()> {
        let Some(i) = self.bounds.index(pos) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} is not an interior cell", pos),
            ));
        };
        self.cells[i] = kind;
        match kind {
            CellKind::Empty => self.surface.erase(pos),
            _ => self.surface.write(pos, kind.style()),
        }
    }

    pub fn is_boundary(&self, pos: Coord) -> bool {
        self.bounds.is_boundary(pos)
    }

    /// Interior cells that are neither snake nor obstacle
    pub fn free_cells(&self) -> Vec<Coord> {
        self.classified()
            .filter(|(_, kind)| !matches!(kind, CellKind::SnakeBody | CellKind::Obstacle))
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn cells_of(&self, kind: CellKind) -> Vec<Coord> {
        self.classified().filter(|(_, k)| *k == kind).map(|(pos, _)| pos).collect()
    }

    /// Draws a cell without touching its classification (used by the death blink)
    pub fn paint(&mut self, pos: Coord, style: CellStyle) -> io::Result<()> {
        self.surface.write(pos, style)
    }

    /// Score goes on the row above the top border, when there is one
    pub fn print_score(&mut self, score: u32) -> io::Result<()> {
        if self.bounds.min_row == 0 {
            return Ok(());
        }
        let pos = Coord::new(self.bounds.min_row - 1, self.bounds.min_col + 1);
        self.surface.print_text(pos, &format!("Score: {}", score))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.surface.flush()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Every interior cell with its contents, row by row; `cells` is stored in
    /// the same order
    fn classified(&self) -> impl Iterator<Item = (Coord, CellKind)> + '_ {
        self.bounds.interior().zip(self.cells.iter().copied())
    }
}
