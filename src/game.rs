use std::time::SystemTime;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::board::{Board, Viewport};
use crate::config::EngineConfig;
use crate::entity::Direction;
use crate::error::Result;
use crate::food::{BlinkPhase, Food};
use crate::renderer::Input;
use crate::session::{Session, SessionStore};
use crate::snake::{check_loss, Snake, Step};
use crate::timing::{tick_interval, Command, Tick, HUNGER_PERIOD, RESUME_BLINK_DELAY, START_BLINK_DELAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Running,
    Paused,
    Lost,
}

/// Choices offered when a suspended session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Continue,
    StartOver,
}

impl MenuOption {
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Continue => "Continue",
            MenuOption::StartOver => "Start Over",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub options: Vec<MenuOption>,
    pub cursor: usize,
}

impl Menu {
    pub fn resume() -> Self {
        Self {
            options: vec![MenuOption::Continue, MenuOption::StartOver],
            cursor: 0,
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.options.len() {
            self.cursor += 1;
        }
    }

    pub fn selected(&self) -> Option<MenuOption> {
        self.options.get(self.cursor).copied()
    }
}

/// Everything the event loop can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The game screen was opened.
    Start,
    Input(Input),
    Resize(Viewport),
    Tick(Tick),
}

pub struct Game<S> {
    pub snake: Snake,
    pub food: Food,
    pub score: u32,
    pub phase: Phase,
    pub menu: Menu,
    /// Bumped on every entry into `Running`; ticks from older periods are dropped.
    pub generation: u64,
    pub viewport: Viewport,
    config: EngineConfig,
    store: S,
    rng: StdRng,
}

impl<S: SessionStore> Game<S> {
    pub fn new(config: EngineConfig, store: S, now: SystemTime) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy(), now)
    }

    pub fn with_rng(config: EngineConfig, store: S, rng: StdRng, now: SystemTime) -> Self {
        Self {
            snake: Snake::from_config(&config),
            food: Food::unplaced(now, config.food_ttl()),
            score: 0,
            phase: Phase::Start,
            menu: Menu::default(),
            generation: 0,
            viewport: Viewport::default(),
            config,
            store,
            rng,
        }
    }

    pub fn board(&self) -> Board {
        Board::from_viewport(self.viewport)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Session {
        Session {
            snake: self.snake.clone(),
            food: self.food.clone(),
            score: self.score,
        }
    }

    /// Applies one event and returns the timers and exits it asks for.
    /// Only session storage failures surface as errors.
    pub fn handle(&mut self, event: Event, now: SystemTime) -> Result<Vec<Command>> {
        if let Event::Resize(viewport) = event {
            // Applied in every phase so the layout stays right while paused.
            self.viewport = viewport;
            return Ok(Vec::new());
        }
        if let Event::Tick(tick) = event {
            if self.phase != Phase::Running || tick.generation() != self.generation {
                trace!(?tick, current = self.generation, "dropping stale tick");
                return Ok(Vec::new());
            }
        }

        match self.phase {
            Phase::Start => self.update_start(event, now),
            Phase::Running => self.update_running(event, now),
            Phase::Paused => self.update_paused(event),
            Phase::Lost => self.update_lost(event, now),
        }
    }

    fn update_start(&mut self, event: Event, now: SystemTime) -> Result<Vec<Command>> {
        match event {
            Event::Start => {
                if !self.store.exists()? {
                    self.new_session(now)?;
                    return Ok(self.enter_running(START_BLINK_DELAY));
                }
                self.menu = Menu::resume();
                Ok(Vec::new())
            }
            Event::Input(Input::Quit) => Ok(vec![Command::Quit]),
            Event::Input(Input::Direction(Direction::Up)) => {
                self.menu.up();
                Ok(Vec::new())
            }
            Event::Input(Input::Direction(Direction::Down)) => {
                self.menu.down();
                Ok(Vec::new())
            }
            Event::Input(Input::Select) => match self.menu.selected() {
                Some(MenuOption::Continue) => {
                    self.continue_session(now)?;
                    Ok(self.enter_running(START_BLINK_DELAY))
                }
                Some(MenuOption::StartOver) => {
                    self.new_session(now)?;
                    Ok(self.enter_running(START_BLINK_DELAY))
                }
                None => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }

    fn update_running(&mut self, event: Event, now: SystemTime) -> Result<Vec<Command>> {
        match event {
            Event::Tick(Tick::Move { generation }) => self.on_move(generation, now),
            Event::Tick(Tick::Hunger { generation }) => {
                if self.snake.hunger <= 0 {
                    info!(score = self.score, "starved");
                    self.lose()?;
                    return Ok(Vec::new());
                }
                self.snake.hunger -= 1;
                Ok(vec![Command::schedule(HUNGER_PERIOD, Tick::Hunger { generation })])
            }
            Event::Tick(Tick::Blink { generation }) => {
                let phase = self.food.blink_phase(now);
                match phase {
                    BlinkPhase::Expired => {
                        self.food = self.food.place(&self.snake, self.board(), now, self.config.food_ttl(), &mut self.rng);
                    }
                    _ if phase.toggles() => self.food.blink = !self.food.blink,
                    _ => {}
                }
                Ok(vec![Command::schedule(phase.period(), Tick::Blink { generation })])
            }
            Event::Input(Input::Direction(direction)) => {
                self.snake.steer(direction);
                Ok(Vec::new())
            }
            Event::Input(Input::Pause | Input::Quit) => {
                self.store.save(&self.session())?;
                self.phase = Phase::Paused;
                info!(score = self.score, "paused");
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn on_move(&mut self, generation: u64, now: SystemTime) -> Result<Vec<Command>> {
        let board = self.board();
        if !board.is_degenerate() {
            self.snake.freeze_direction();
            if self.snake.advance(self.food.position, &self.config) == Step::Ate {
                self.score += 1;
                self.food = self.food.place(&self.snake, board, now, self.config.food_ttl(), &mut self.rng);
                debug!(score = self.score, speed = self.snake.speed, "ate");
            }
            if check_loss(&self.snake, board) {
                info!(score = self.score, "crashed");
                self.lose()?;
                return Ok(Vec::new());
            }
            self.store.save(&self.session())?;
        }

        let interval = tick_interval(self.snake.speed, board, &self.config.timing);
        Ok(vec![Command::schedule(interval, Tick::Move { generation })])
    }

    fn update_paused(&mut self, event: Event) -> Result<Vec<Command>> {
        match event {
            Event::Input(Input::Quit) => Ok(vec![Command::Quit]),
            Event::Input(Input::Restart) => Ok(self.enter_running(RESUME_BLINK_DELAY)),
            _ => Ok(Vec::new()),
        }
    }

    fn update_lost(&mut self, event: Event, now: SystemTime) -> Result<Vec<Command>> {
        match event {
            Event::Input(Input::Quit) => Ok(vec![Command::Quit]),
            Event::Input(Input::Restart) => {
                self.new_session(now)?;
                Ok(self.enter_running(START_BLINK_DELAY))
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Starts a new running period with all three tick streams.
    fn enter_running(&mut self, first_blink: std::time::Duration) -> Vec<Command> {
        self.generation += 1;
        self.phase = Phase::Running;
        let generation = self.generation;
        info!(generation, "running");

        let interval = tick_interval(self.snake.speed, self.board(), &self.config.timing);
        vec![
            Command::schedule(first_blink, Tick::Blink { generation }),
            Command::schedule(interval, Tick::Move { generation }),
            Command::schedule(HUNGER_PERIOD, Tick::Hunger { generation }),
        ]
    }

    fn new_session(&mut self, now: SystemTime) -> Result<()> {
        self.snake = Snake::from_config(&self.config);
        self.score = 0;
        self.food = Food::unplaced(now, self.config.food_ttl()).place(
            &self.snake,
            self.board(),
            now,
            self.config.food_ttl(),
            &mut self.rng,
        );
        self.menu = Menu::default();
        self.store.save(&self.session())?;
        info!("new session");
        Ok(())
    }

    fn continue_session(&mut self, now: SystemTime) -> Result<()> {
        match self.store.load()? {
            Some(session) => {
                self.snake = session.snake;
                self.food = session.food;
                self.score = session.score;
                self.menu = Menu::default();
                info!(score = self.score, "continuing session");
                Ok(())
            }
            // vanished between the menu and the choice
            None => self.new_session(now),
        }
    }

    fn lose(&mut self) -> Result<()> {
        self.phase = Phase::Lost;
        self.store.archive_high_score(self.score)?;
        self.store.clear()
    }
}
