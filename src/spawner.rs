use std::io;

use anyhow::{ensure, Context, Result};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::playfield::{CellKind, Coord, Playfield};
use crate::term::Surface;

/// Places obstacles and food. Food comes in batches: a new batch is laid
/// only once a whole batch worth of food has been eaten.
pub struct Spawner {
    rng: StdRng,
    reserve: Vec<Coord>,
    batch: usize,
    eaten: usize,
}

impl Spawner {
    pub fn new(rng: StdRng, batch: usize) -> Self {
        Spawner { rng, reserve: vec![], batch, eaten: 0 }
    }

    /// Shuffles the free cells once and carves them up: obstacles first, then
    /// the initial food, the last cell is returned as the snake's origin and
    /// whatever is left in between becomes the reserve for later batches.
    pub fn populate<S: Surface>(&mut self, field: &mut Playfield<S>, obstacle_count: usize) -> Result<Coord> {
        let mut pool = field.free_cells();
        ensure!(
            pool.len() > obstacle_count + self.batch,
            "Board too small: {} free cells for {} obstacles and {} food",
            pool.len(), obstacle_count, self.batch
        );

        pool.shuffle(&mut self.rng);
        let (obstacles, rest) = pool.split_at(obstacle_count);
        let (food, rest) = rest.split_at(self.batch);
        let (&origin, reserve) = rest.split_last().context("no free cell left for the snake")?;

        self.place_obstacles(field, obstacles)?;
        self.place_initial_food(field, food)?;
        self.reserve = reserve.to_vec();
        self.eaten = 0;

        debug!("{} obstacles, {} food, {} reserve cells, snake at {:?}",
            obstacles.len(), food.len(), self.reserve.len(), origin);
        Ok(origin)
    }

    pub fn place_obstacles<S: Surface>(&mut self, field: &mut Playfield<S>, cells: &[Coord]) -> io::Result<()> {
        for pos in cells {
            field.set_classification(*pos, CellKind::Obstacle)?;
        }
        Ok(())
    }

    pub fn place_initial_food<S: Surface>(&mut self, field: &mut Playfield<S>, cells: &[Coord]) -> io::Result<()> {
        for pos in cells {
            field.set_classification(*pos, CellKind::Food)?;
        }
        Ok(())
    }

    /// Counts one eaten food cell, laying a fresh batch when a whole batch is
    /// gone. Returns whether it did.
    pub fn record_eaten<S: Surface>(&mut self, field: &mut Playfield<S>) -> io::Result<bool> {
        self.eaten += 1;
        if self.eaten < self.batch {
            return Ok(false);
        }

        self.replenish(field)?;
        self.eaten = 0;
        Ok(true)
    }

    /// Lays up to one batch of food on reserve cells that are currently empty.
    /// Returns how many were placed.
    pub fn replenish<S: Surface>(&mut self, field: &mut Playfield<S>) -> io::Result<usize> {
        self.reserve.shuffle(&mut self.rng);

        let picks: Vec<Coord> = self.reserve
            .iter()
            .copied()
            .filter(|pos| field.classify(*pos) == Some(CellKind::Empty))
            .take(self.batch)
            .collect();

        for pos in &picks {
            field.set_classification(*pos, CellKind::Food)?;
        }

        if picks.len() < self.batch {
            warn!("only {} of {} food cells could be placed", picks.len(), self.batch);
        } else {
            debug!("replenished {} food cells", picks.len());
        }

        Ok(picks.len())
    }

    /// Food eaten since the last batch was laid
    pub fn eaten(&self) -> usize {
        self.eaten
    }

    #[cfg(test)]
    pub fn set_reserve(&mut self, reserve: Vec<Coord>) {
        self.reserve = reserve;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playfield::Bounds;
    use crate::term::testing::MemorySurface;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn field() -> Playfield<MemorySurface> {
        Playfield::new(Bounds::new(0, 12, 0, 12), MemorySurface::default())
    }

    fn spawner(seed: u64) -> Spawner {
        Spawner::new(StdRng::seed_from_u64(seed), 5)
    }

    #[test]
    fn test_populate() {
        let mut field = field();
        let mut spawner = spawner(1);
        let origin = spawner.populate(&mut field, 5).unwrap();

        let obstacles = field.cells_of(CellKind::Obstacle);
        let food = field.cells_of(CellKind::Food);
        assert_eq!(obstacles.len(), 5);
        assert_eq!(food.len(), 5);
        assert_eq!(field.classify(origin), Some(CellKind::Empty));
        assert_eq!(spawner.reserve.len(), 100 - 5 - 5 - 1);

        let reserve: HashSet<_> = spawner.reserve.iter().collect();
        assert!(!reserve.contains(&origin));
        assert!(obstacles.iter().chain(food.iter()).all(|pos| !reserve.contains(pos)));

        for pos in food {
            assert_eq!(field.surface().style_at(pos), Some(CellKind::Food.style()));
        }
    }

    #[test]
    fn test_populate_board_too_small() {
        let mut field = Playfield::new(Bounds::new(0, 5, 0, 5), MemorySurface::default());
        assert!(spawner(1).populate(&mut field, 5).is_err());
    }

    #[test]
    fn test_record_eaten_batches() {
        let mut field = field();
        let mut spawner = spawner(2);
        spawner.populate(&mut field, 5).unwrap();

        for i in 1..5 {
            assert!(!spawner.record_eaten(&mut field).unwrap());
            assert_eq!(spawner.eaten(), i);
        }
        assert_eq!(field.cells_of(CellKind::Food).len(), 5);

        assert!(spawner.record_eaten(&mut field).unwrap());
        assert_eq!(spawner.eaten(), 0);
        assert_eq!(field.cells_of(CellKind::Food).len(), 10);
    }

    #[test]
    fn test_replenish_avoids_occupied_cells() {
        let mut field = field();
        let mut spawner = spawner(3);
        let all: Vec<Coord> = field.bounds().interior().collect();
        spawner.set_reserve(all.clone());

        // Leave only the last row of the interior empty
        for pos in &all[..90] {
            let kind = if pos.col % 2 == 0 { CellKind::SnakeBody } else { CellKind::Obstacle };
            field.set_classification(*pos, kind).unwrap();
        }
        field.set_classification(all[99], CellKind::Food).unwrap();

        assert_eq!(spawner.replenish(&mut field).unwrap(), 5);
        let food = field.cells_of(CellKind::Food);
        assert_eq!(food.len(), 6);
        assert!(food.iter().all(|pos| pos.row == 10));
    }

    #[test]
    fn test_replenish_short_batch() {
        let mut field = field();
        let mut spawner = spawner(4);
        let all: Vec<Coord> = field.bounds().interior().collect();
        spawner.set_reserve(all.clone());

        for pos in &all[3..] {
            field.set_classification(*pos, CellKind::Obstacle).unwrap();
        }

        assert_eq!(spawner.replenish(&mut field).unwrap(), 3);
        assert_eq!(field.cells_of(CellKind::Food), all[..3].to_vec());
    }
}
