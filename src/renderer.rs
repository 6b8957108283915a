use crate::entity::Direction;
use crate::game::{Event, Game};
use crate::session::SessionStore;
use std::io;
use std::time::Duration;

/// Player intent, already decoded from raw keys. What each one does depends
/// on the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Steers the snake, or moves the menu cursor.
    Direction(Direction),
    Select,
    Pause,
    /// Leaves the game; while running it only pauses.
    Quit,
    /// Resumes a paused game, restarts a lost one.
    Restart,
}

/// Trait that abstracts the display layer.
/// The engine never draws; it only hands a game to a renderer.
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Draw the current game state
    fn render<S: SessionStore>(&mut self, game: &Game<S>) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for a key press or resize
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}
