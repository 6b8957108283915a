use crate::board::{Board, Viewport};
use crate::entity::Direction;
use crate::frame::{self, Glyph, RenderConfig, Rgb};
use crate::game::{Event, Game, Phase};
use crate::renderer::{Input, Renderer};
use crate::session::SessionStore;
use crossterm::{
    cursor,
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Stdout, Write};
use std::time::Duration;

const GAME_TITLE: &str = "Snake Game";

/// Maps a key press to what it means to the game.
pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Input::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Input::Direction(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::Direction(Direction::Right)),
        KeyCode::Enter => Some(Input::Select),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Input::Pause),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
        _ => None,
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// `pattern` repeated to exactly `n` characters.
fn repeat_to(pattern: &str, n: usize) -> String {
    pattern.chars().cycle().take(n).collect()
}

pub struct CliRenderer {
    config: RenderConfig,
    active: bool,
}

impl CliRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, active: false }
    }

    fn draw_title(&self, stdout: &mut Stdout, viewport: Viewport) -> io::Result<u16> {
        let inner = format!("  {}  ", GAME_TITLE);
        let n = inner.chars().count();
        let left = (viewport.width as usize).saturating_sub(n + 2) / 2;
        let lines = [
            format!("•{}•", repeat_to("-.-", n)),
            format!("‡{}‡", inner),
            format!("*{}*", repeat_to(".-.", n)),
        ];

        for (i, line) in lines.iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(left as u16, i as u16),
                SetForegroundColor(color(self.config.palette.border)),
                Print(line),
                ResetColor
            )?;
        }
        Ok(lines.len() as u16)
    }

    /// Bordered board starting at row `top`; returns the rows used.
    fn draw_board<S: SessionStore>(&self, stdout: &mut Stdout, top: u16, game: &Game<S>) -> io::Result<u16> {
        let board: Board = game.board();
        let frame = frame::render(&game.snake, &game.food, board, &self.config);
        let palette = &self.config.palette;
        let background = if game.phase == Phase::Lost {
            palette.lost
        } else {
            palette.background
        };
        let width = board.width.max(0) as usize;
        let height = board.height.max(0) as usize;

        queue!(
            stdout,
            cursor::MoveTo(0, top),
            SetForegroundColor(color(palette.border)),
            Print(format!("▟{}▙", "▄".repeat(width)))
        )?;
        for y in 0..height {
            queue!(
                stdout,
                cursor::MoveTo(0, top + 1 + y as u16),
                SetForegroundColor(color(palette.border)),
                Print('▐'),
                SetBackgroundColor(color(background))
            )?;
            for x in 0..width {
                let glyph = frame
                    .rows
                    .get(y)
                    .and_then(|row| row.get(x))
                    .copied()
                    .unwrap_or(Glyph::BLANK);
                if let Some(fg) = glyph.fg {
                    queue!(stdout, SetForegroundColor(color(fg)))?;
                }
                queue!(stdout, Print(glyph.ch))?;
            }
            queue!(
                stdout,
                ResetColor,
                SetForegroundColor(color(palette.border)),
                Print('▌')
            )?;
        }
        queue!(
            stdout,
            cursor::MoveTo(0, top + 1 + height as u16),
            Print(format!("▜{}▛", "▀".repeat(width))),
            ResetColor
        )?;
        Ok(height as u16 + 2)
    }

    fn draw_text(&self, stdout: &mut Stdout, top: u16, lines: &[String]) -> io::Result<()> {
        for (i, line) in lines.iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, top + i as u16),
                SetForegroundColor(color(self.config.palette.text)),
                Print(line),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn draw_start<S: SessionStore>(&self, stdout: &mut Stdout, game: &Game<S>) -> io::Result<()> {
        let viewport = game.viewport;
        if game.menu.options.is_empty() {
            let text = "LOADING...";
            queue!(
                stdout,
                cursor::MoveTo(
                    (viewport.width as usize).saturating_sub(text.len()) as u16 / 2,
                    viewport.height / 2
                ),
                SetForegroundColor(color(self.config.palette.head)),
                SetAttribute(Attribute::Bold),
                Print(text),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
            return Ok(());
        }

        let mut lines = vec![
            "You are already in a game session. What do you want to do?".to_string(),
            String::new(),
        ];
        lines.extend(game.menu.options.iter().map(|o| o.label().to_string()));

        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_width = inner + 4;
        let box_height = lines.len() + 2;
        let left = (viewport.width as usize).saturating_sub(box_width) / 2;
        let top = (viewport.height as usize).saturating_sub(box_height) / 2;

        for row in 0..box_height {
            let text = row
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .map(String::as_str)
                .unwrap_or("");
            let option_index = row.checked_sub(3).filter(|&i| i < game.menu.options.len());
            let selected = option_index == Some(game.menu.cursor);

            queue!(
                stdout,
                cursor::MoveTo(left as u16, (top + row) as u16),
                SetBackgroundColor(Color::Rgb { r: 0xAA, g: 0xAA, b: 0xAA }),
                SetForegroundColor(if selected {
                    Color::Rgb { r: 0x00, g: 0x66, b: 0x00 }
                } else if option_index.is_some() {
                    Color::Rgb { r: 0x55, g: 0x55, b: 0x55 }
                } else {
                    Color::Black
                })
            )?;
            if selected {
                queue!(stdout, SetAttribute(Attribute::Bold))?;
            }
            queue!(
                stdout,
                Print(format!("  {:<width$}  ", text, width = inner)),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn status_lines<S: SessionStore>(game: &Game<S>) -> Vec<String> {
        match game.phase {
            Phase::Running => {
                let hunger = game.snake.hunger.max(0);
                vec![
                    format!("Hunger: {}s: {}", hunger, "♥".repeat(hunger as usize)),
                    format!("Score: {}", game.score),
                ]
            }
            Phase::Paused => vec!["Game paused. Press 'q' to quit or 'r' to resume.".to_string()],
            Phase::Lost => vec![
                "You lost! Press 'q' to quit or 'r' to restart.".to_string(),
                format!("Score: {}", game.score),
            ],
            Phase::Start => Vec::new(),
        }
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        self.active = true;
        Ok(())
    }

    fn render<S: SessionStore>(&mut self, game: &Game<S>) -> io::Result<()> {
        let mut stdout = io::stdout();

        queue!(
            stdout,
            terminal::BeginSynchronizedUpdate,
            terminal::Clear(ClearType::All)
        )?;

        if game.phase == Phase::Start {
            self.draw_start(&mut stdout, game)?;
        } else {
            let mut top = self.draw_title(&mut stdout, game.viewport)? + 1;
            top += self.draw_board(&mut stdout, top, game)? + 1;
            self.draw_text(&mut stdout, top, &Self::status_lines(game))?;
        }

        queue!(stdout, terminal::EndSynchronizedUpdate)?;
        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(map_key(key).map(Event::Input)),
            TermEvent::Resize(width, height) => Ok(Some(Event::Resize(Viewport::new(width, height)))),
            _ => Ok(None),
        }
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
