use std::process::exit;

use blinksnake::config::GameConfig;
use blinksnake::game::SnakeGame;
use log::error;

fn main() {
    pretty_env_logger::init();

    let mut game = SnakeGame::new(GameConfig::default());

    // The game restores the terminal itself before handing back an error
    if let Err(e) = game.run() {
        error!("{:?}", e);
        eprintln!("{:#}", e);
        exit(1);
    }
}
