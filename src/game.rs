use std::{io, thread::sleep, time::Duration};

use anyhow::{ensure, Context, Result};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::input::{Command, CommandSlot, InputThread};
use crate::playfield::{Bounds, Playfield};
use crate::snake::Snake;
use crate::spawner::Spawner;
use crate::term::{Surface, TermManager};

/// How the main phase of a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Died,
    Quit,
}

pub struct SnakeGame {
    config: GameConfig,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Self {
        SnakeGame { config, term: TermManager::new() }
    }

    /// Plays one game. The terminal is restored before returning, also on errors.
    pub fn run(&mut self) -> Result<()> {
        let bounds = self.check_environment()?;

        self.term.setup().context("Failed to set up the terminal")?;
        let result = play(&self.config, bounds, &mut self.term);
        let restored = self.term.restore().context("Failed to restore the terminal");

        first_error(result, restored)
    }

    fn check_environment(&self) -> Result<Bounds> {
        let colors = self.term.color_count();
        check_colors(colors, &self.config)?;

        let (rows, cols) = self.term.terminal_size().context("Failed to read the terminal size")?;
        info!("terminal is {}x{} with {} colors", cols, rows, colors);
        Bounds::from_terminal(rows, cols, &self.config)
    }
}

/// Fails when the terminal has fewer colours than the game draws with
pub fn check_colors(available: u16, config: &GameConfig) -> Result<()> {
    ensure!(
        available >= config.min_colors,
        "This terminal does not support colors ({} available, {} needed)",
        available, config.min_colors
    );
    Ok(())
}

/// `first` wins when both failed; the other error is only logged
fn first_error(first: Result<()>, second: Result<()>) -> Result<()> {
    match (first, second) {
        (Err(e), Err(other)) => {
            error!("{:#}", other);
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn play<S: Surface>(config: &GameConfig, bounds: Bounds, surface: S) -> Result<()> {
    let mut field = Playfield::new(bounds, surface);
    field.draw_board()?;

    let mut spawner = Spawner::new(StdRng::from_entropy(), config.food_batch);
    let origin = spawner.populate(&mut field, config.obstacle_count)?;
    let mut snake = Snake::new(field, spawner, origin)?;

    let slot = CommandSlot::new();
    let input = InputThread::spawn(slot.clone(), config.input_poll)?;

    let result = match run_ticks(&mut snake, &slot, config.tick, || input.is_finished()) {
        Ok(Outcome::Died) => blink_until(&mut snake, config.blink_interval, || input.is_finished()),
        Ok(Outcome::Quit) => Ok(()),
        Err(e) => Err(e),
    };
    info!("game over with score {}", snake.score());

    first_error(result.context("Failed to draw the game"), input.join())
}

/// Applies at most one move per tick, following the latest command, until the
/// snake dies or the player quits. Before the first arrow key the snake waits.
/// `stop` firing, e.g. because input is gone, counts as quitting.
pub fn run_ticks<S, F>(snake: &mut Snake<S>, slot: &CommandSlot, tick: Duration, stop: F) -> io::Result<Outcome>
where
    S: Surface,
    F: Fn() -> bool,
{
    while snake.is_alive() {
        if stop() {
            return Ok(Outcome::Quit);
        }

        match slot.latest() {
            Some(Command::Quit) => return Ok(Outcome::Quit),
            Some(Command::Move(dir)) => {
                let dir = snake.steer(dir);
                snake.move_step(dir)?;
            }
            None => {}
        }

        sleep(tick);
    }

    Ok(Outcome::Died)
}

/// Blinks the dead snake every `interval` until `stop` says otherwise
pub fn blink_until<S, F>(snake: &mut Snake<S>, interval: Duration, stop: F) -> io::Result<()>
where
    S: Surface,
    F: Fn() -> bool,
{
    while !stop() {
        snake.blink()?;
        sleep(interval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playfield::{CellKind, Coord};
    use crate::snake::Direction::*;
    use crate::term::testing::MemorySurface;
    use crate::term::CellStyle;
    use anyhow::anyhow;
    use std::cell::Cell;

    fn snake_at(origin: Coord, food: &[Coord]) -> Snake<MemorySurface> {
        let mut field = Playfield::new(Bounds::new(0, 12, 0, 12), MemorySurface::default());
        for pos in food {
            field.set_classification(*pos, CellKind::Food).unwrap();
        }
        Snake::new(field, Spawner::new(StdRng::seed_from_u64(5), 5), origin).unwrap()
    }

    #[test]
    fn test_ticks_until_death() {
        let mut snake = snake_at(Coord::new(5, 5), &[]);
        let slot = CommandSlot::new();
        slot.publish(Command::Move(Right));

        let outcome = run_ticks(&mut snake, &slot, Duration::ZERO, || false).unwrap();
        assert_eq!(outcome, Outcome::Died);
        assert_eq!(snake.head(), Coord::new(5, 10));
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_ticks_stop_on_quit() {
        let mut snake = snake_at(Coord::new(5, 5), &[]);
        let slot = CommandSlot::new();
        slot.publish(Command::Quit);

        assert_eq!(run_ticks(&mut snake, &slot, Duration::ZERO, || false).unwrap(), Outcome::Quit);
        assert!(snake.is_alive());
        assert_eq!(snake.head(), Coord::new(5, 5));
    }

    #[test]
    fn test_ticks_keep_heading_on_reversal() {
        let mut snake = snake_at(Coord::new(5, 5), &[Coord::new(5, 6)]);
        snake.move_right().unwrap();

        let slot = CommandSlot::new();
        slot.publish(Command::Move(Left));

        assert_eq!(run_ticks(&mut snake, &slot, Duration::ZERO, || false).unwrap(), Outcome::Died);
        assert_eq!(snake.head(), Coord::new(5, 10));
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn test_ticks_stop_when_input_fails() {
        let mut snake = snake_at(Coord::new(5, 5), &[]);
        let slot = CommandSlot::new();
        let input = InputThread::spawn_with(slot.clone(), Duration::from_millis(1), |_| {
            Err(io::Error::new(io::ErrorKind::Other, "tty gone"))
        })
        .unwrap();

        let outcome = run_ticks(&mut snake, &slot, Duration::from_millis(1), || input.is_finished()).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert!(snake.is_alive());
        assert_eq!(slot.latest(), None);
        assert!(input.join().is_err());
    }

    #[test]
    fn test_check_colors() {
        let config = GameConfig::default();
        assert!(check_colors(256, &config).is_ok());
        assert!(check_colors(8, &config).is_ok());

        let err = check_colors(2, &config).unwrap_err().to_string();
        assert!(err.contains("does not support colors"));
        assert!(err.contains("2 available, 8 needed"));

        let mono = check_colors(0, &GameConfig { min_colors: 1, ..config });
        assert!(mono.is_err());
    }

    #[test]
    fn test_first_error_wins() {
        let both = first_error(Err(anyhow!("game")), Err(anyhow!("join")));
        assert_eq!(both.unwrap_err().to_string(), "game");

        let second = first_error(Ok(()), Err(anyhow!("restore")));
        assert_eq!(second.unwrap_err().to_string(), "restore");

        assert!(first_error(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn test_blink_until_stopped() {
        let mut snake = snake_at(Coord::new(1, 5), &[]);
        snake.move_up().unwrap();
        assert!(!snake.is_alive());

        let frames = Cell::new(0);
        blink_until(&mut snake, Duration::ZERO, || {
            frames.set(frames.get() + 1);
            frames.get() > 3
        })
        .unwrap();

        // Three frames: erased, shown, erased
        assert_eq!(snake.field().surface().style_at(Coord::new(1, 5)), Some(CellStyle::Empty));
        assert_eq!(snake.field().classify(Coord::new(1, 5)), Some(CellKind::SnakeBody));
    }
}
