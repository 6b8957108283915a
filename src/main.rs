use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::terminal;
use gamics::{
    account, CliRenderer, Command, EngineConfig, Event, FileSessionStore, Game, RenderConfig, Renderer,
    Scheduler, SessionStore, Viewport,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};
use tracing_subscriber::EnvFilter;

// Longest the loop blocks on input when no tick is due sooner
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "gamics")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// Directory holding accounts, sessions, settings and the log
    #[arg(long, default_value = ".gamics")]
    data_dir: PathBuf,

    /// Play as this user instead of the logged-in one
    #[arg(long)]
    user: Option<String>,

    /// Color scheme
    #[arg(long, value_enum, default_value = "dark")]
    theme: Theme,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Create a user and log in as them
    Register { name: String },
}

#[derive(Clone, ValueEnum)]
enum Theme {
    Dark,
    Light,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Action::Register { name }) = &cli.action {
        account::register(&cli.data_dir, name).context("Failed to register user")?;
        println!("Registered and logged in as {}", name);
        return Ok(());
    }

    init_logging(&cli.data_dir)?;

    let user = match cli.user {
        Some(user) => user,
        None => account::logged_user(&cli.data_dir)?,
    };
    let store = FileSessionStore::open(&cli.data_dir, &user)?;
    let config = EngineConfig::load(&cli.data_dir.join("settings.json"))?;
    let render_config = match cli.theme {
        Theme::Dark => RenderConfig::dark(),
        Theme::Light => RenderConfig::light(),
    };

    let mut game = Game::new(config, store, SystemTime::now());
    let mut renderer = CliRenderer::new(render_config);

    renderer.init().context("Failed to set up terminal")?;
    let result = run(&mut game, &mut renderer);
    renderer.cleanup().context("Failed to restore terminal")?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "aborting");
    }
    result
}

/// Single-threaded loop: input and due timers are fed to the game one at a
/// time, then the screen is redrawn.
fn run<S: SessionStore>(game: &mut Game<S>, renderer: &mut impl Renderer) -> Result<()> {
    let mut scheduler = Scheduler::new();

    let (width, height) = terminal::size().context("Failed to read terminal size")?;
    let mut pending = game.handle(Event::Resize(Viewport::new(width, height)), SystemTime::now())?;
    pending.extend(game.handle(Event::Start, SystemTime::now())?);

    loop {
        for command in pending.drain(..) {
            match command {
                Command::Schedule { after, tick } => scheduler.schedule(Instant::now(), after, tick),
                Command::Quit => return Ok(()),
            }
        }

        renderer.render(game).context("Failed to draw frame")?;

        let timeout = scheduler
            .time_until_next(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        if let Some(event) = renderer.poll_event(timeout)? {
            pending.extend(game.handle(event, SystemTime::now())?);
        }

        while let Some(tick) = scheduler.pop_due(Instant::now()) {
            pending.extend(game.handle(Event::Tick(tick), SystemTime::now())?);
        }
    }
}

/// Logs go to a file; the terminal belongs to the game.
fn init_logging(data_dir: &Path) -> Result<()> {
    if !data_dir.is_dir() {
        return Ok(());
    }
    let path = data_dir.join("gamics.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
