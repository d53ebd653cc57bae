use std::time::Duration;

use crate::TermInt;

/// Tunables for one run of the game
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Rows kept free above and below the board
    pub margin_rows: TermInt,
    /// Columns kept free left and right of the board
    pub margin_cols: TermInt,
    /// Permanent obstacles placed at startup
    pub obstacle_count: usize,
    /// Food cells per batch, and eaten cells needed to trigger the next one
    pub food_batch: usize,
    /// Time between snake moves
    pub tick: Duration,
    /// Time between blink frames once the snake is dead
    pub blink_interval: Duration,
    /// How long the input thread waits for a key before checking for shutdown
    pub input_poll: Duration,
    /// Fewer colours than this and the game refuses to start
    pub min_colors: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            margin_rows: 10,
            margin_cols: 50,
            obstacle_count: 5,
            food_batch: 5,
            tick: Duration::from_millis(100),
            blink_interval: Duration::from_millis(300),
            input_poll: Duration::from_millis(50),
            min_colors: 8,
        }
    }
}

impl GameConfig {
    /// Interior cells the board needs: obstacles, one food batch, the snake
    /// origin and one spare cell to move into.
    pub fn min_interior_cells(&self) -> usize {
        self.obstacle_count + self.food_batch + 2
    }
}
