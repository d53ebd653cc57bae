use std::collections::VecDeque;
use std::io;

use log::info;

use crate::playfield::{CellKind, Coord, Playfield};
use crate::spawner::Spawner;
use crate::term::{CellStyle, Surface};
use Direction::*;
use MoveResult::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// What the head ran into
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Boundary,
    Obstacle,
    Body,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coord, old_tail: Option<Coord> },
    Crashed(Collision),
    /// The snake is already dead
    Ignored,
}

/// The snake owns the board it lives on and the spawner that feeds it.
///
/// The body runs tail first, head last, and every cell in it is classified
/// `SnakeBody` on the board.
pub struct Snake<S: Surface> {
    body: VecDeque<Coord>,
    heading: Option<Direction>,
    alive: bool,
    shown: bool,
    score: u32,
    field: Playfield<S>,
    spawner: Spawner,
}

#[allow(clippy::len_without_is_empty)]
impl<S: Surface> Snake<S> {
    pub fn new(mut field: Playfield<S>, spawner: Spawner, origin: Coord) -> io::Result<Self> {
        field.set_classification(origin, CellKind::SnakeBody)?;
        field.print_score(0)?;
        field.flush()?;

        Ok(Snake {
            body: VecDeque::from(vec![origin]),
            heading: None,
            alive: true,
            shown: true,
            score: 0,
            field,
            spawner,
        })
    }

    pub fn move_up(&mut self) -> io::Result<MoveResult> {
        self.move_step(Up)
    }

    pub fn move_down(&mut self) -> io::Result<MoveResult> {
        self.move_step(Down)
    }

    pub fn move_left(&mut self) -> io::Result<MoveResult> {
        self.move_step(Left)
    }

    pub fn move_right(&mut self) -> io::Result<MoveResult> {
        self.move_step(Right)
    }

    /// Advances the head one cell. Food makes the snake grow, the border,
    /// obstacles and its own body kill it. A dead snake never moves again.
    pub fn move_step(&mut self, dir: Direction) -> io::Result<MoveResult> {
        if !self.alive {
            return Ok(Ignored);
        }

        let new_head = match self.target(dir) {
            Ok(pos) => pos,
            Err(collision) => {
                info!("snake died: {:?} moving {:?} from {:?}, score {}", collision, dir, self.head(), self.score);
                self.alive = false;
                return Ok(Crashed(collision));
            }
        };

        let grows = self.field.classify(new_head) == Some(CellKind::Food);
        if grows {
            self.score += 1;
            self.spawner.record_eaten(&mut self.field)?;
        }

        let old_tail = if grows {
            None
        } else {
            let tail = self.body.pop_front();
            if let Some(tail) = tail {
                self.field.set_classification(tail, CellKind::Empty)?;
            }
            tail
        };

        debug_assert!(self.body.back().map_or(true, |head| head.is_adjacent(new_head)));
        self.body.push_back(new_head);
        self.heading = Some(dir);
        self.field.set_classification(new_head, CellKind::SnakeBody)?;
        self.field.print_score(self.score)?;
        self.field.flush()?;

        Ok(Moved { new_head, old_tail })
    }

    /// One frame of the death animation: the body alternates between shown
    /// and erased. Does nothing while the snake is alive.
    pub fn blink(&mut self) -> io::Result<()> {
        if self.alive {
            return Ok(());
        }

        self.shown = !self.shown;
        let style = if self.shown { CellStyle::SnakeAlive } else { CellStyle::Empty };
        for pos in &self.body {
            self.field.paint(*pos, style)?;
        }
        self.field.flush()
    }

    /// `dir`, unless it would fold a snake longer than one cell back onto
    /// itself, in which case it keeps its heading.
    pub fn steer(&self, dir: Direction) -> Direction {
        match self.heading {
            Some(heading) if self.len() > 1 && dir == heading.opposite() => heading,
            _ => dir,
        }
    }

    pub fn head(&self) -> Coord {
        // The body is never empty: it starts with one cell and only loses its
        // tail in the same move that gains a head.
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &VecDeque<Coord> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Food eaten since the spawner last laid a batch
    pub fn eaten_since_batch(&self) -> usize {
        self.spawner.eaten()
    }

    pub fn field(&self) -> &Playfield<S> {
        &self.field
    }

    /// The cell the head would move to, or what it would crash into
    fn target(&self, dir: Direction) -> Result<Coord, Collision> {
        let pos = match self.head().step(dir) {
            Some(pos) if !self.field.is_boundary(pos) => pos,
            _ => return Err(Collision::Boundary),
        };

        match self.field.classify(pos) {
            Some(CellKind::Obstacle) => Err(Collision::Obstacle),
            // The tail moves out of the way this same step
            Some(CellKind::SnakeBody) if Some(&pos) == self.body.front() => Ok(pos),
            Some(CellKind::SnakeBody) => Err(Collision::Body),
            Some(_) => Ok(pos),
            None => Err(Collision::Boundary),
        }
    }
}
