//! Terminal snake: a bordered board with obstacles and batches of food, a
//! snake steered with the arrow keys, and a blinking corpse when it crashes.

pub mod config;
pub mod game;
pub mod input;
pub mod playfield;
pub mod snake;
pub mod spawner;
pub mod term;

pub type TermInt = u16;
