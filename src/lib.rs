pub mod account;
pub mod board;
pub mod cli_renderer;
pub mod config;
pub mod entity;
pub mod error;
pub mod food;
pub mod frame;
pub mod game;
pub mod renderer;
pub mod session;
pub mod snake;
pub mod timing;

pub use board::{Board, Viewport};
pub use cli_renderer::CliRenderer;
pub use config::{EngineConfig, TimingConfig};
pub use entity::{Direction, Position};
pub use error::{Error, Result};
pub use food::Food;
pub use frame::{render, Frame, RenderConfig};
pub use game::{Event, Game, Menu, MenuOption, Phase};
pub use renderer::{Input, Renderer};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use snake::{Snake, SnakeSegment};
pub use timing::{Command, Scheduler, Tick};
