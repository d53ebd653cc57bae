use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::snake::Direction::{self, *};
use crate::term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Quit,
}

impl Command {
    fn encode(self) -> u8 {
        match self {
            Command::Move(Up) => 1,
            Command::Move(Down) => 2,
            Command::Move(Left) => 3,
            Command::Move(Right) => 4,
            Command::Quit => 5,
        }
    }

    fn decode(raw: u8) -> Option<Command> {
        match raw {
            1 => Some(Command::Move(Up)),
            2 => Some(Command::Move(Down)),
            3 => Some(Command::Move(Left)),
            4 => Some(Command::Move(Right)),
            5 => Some(Command::Quit),
            _ => None,
        }
    }
}

pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Move(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Move(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Move(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Move(Right)),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

/// The most recent command, shared between the input thread and the game
/// loop. A newer command replaces an older one that was never read.
#[derive(Clone, Default)]
pub struct CommandSlot {
    latest: Arc<AtomicU8>,
}

impl CommandSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, cmd: Command) {
        self.latest.store(cmd.encode(), Ordering::Release);
    }

    /// Reading does not clear the slot
    pub fn latest(&self) -> Option<Command> {
        Command::decode(self.latest.load(Ordering::Acquire))
    }
}

/// Background thread turning key presses into commands. It ends by itself
/// once it publishes `Quit`, or when asked to stop.
pub struct InputThread {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<io::Result<()>>,
}

impl InputThread {
    pub fn spawn(slot: CommandSlot, poll: Duration) -> Result<Self> {
        Self::spawn_with(slot, poll, term::read_key)
    }

    /// Same as `spawn`, reading keys from `read_key` instead of the terminal
    pub fn spawn_with<F>(slot: CommandSlot, poll: Duration, mut read_key: F) -> Result<Self>
    where
        F: FnMut(Duration) -> io::Result<Option<KeyEvent>> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("input".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) {
                    let Some(key) = read_key(poll)? else { continue };
                    let Some(cmd) = command_for(&key) else { continue };

                    slot.publish(cmd);
                    if cmd == Command::Quit {
                        debug!("quit requested");
                        break;
                    }
                }
                Ok(())
            })
            .context("Failed to spawn the input thread")?;

        Ok(InputThread { stop, handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the thread, waiting out at most one poll interval
    pub fn join(self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        self.handle
            .join()
            .map_err(|_| anyhow!("input thread panicked"))?
            .context("Failed to read from the terminal")
    }
}
