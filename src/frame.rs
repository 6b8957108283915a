use crate::board::Board;
use crate::entity::Position;
use crate::food::Food;
use crate::snake::Snake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// `n` colors from `head` to `tail`, both ends included.
pub fn gradient(head: Rgb, tail: Rgb, n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![head],
        _ => (0..n).map(|i| head.lerp(tail, i as f64 / (n - 1) as f64)).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub head: Rgb,
    pub tail: Rgb,
    pub food: Rgb,
    pub background: Rgb,
    pub border: Rgb,
    pub text: Rgb,
    /// Board background once the game is lost.
    pub lost: Rgb,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            head: Rgb(0x49, 0xD4, 0x91),
            tail: Rgb(0x0C, 0x32, 0x1D),
            food: Rgb(0xF0, 0xD7, 0x00),
            background: Rgb(0x04, 0x11, 0x0A),
            border: Rgb(0x2F, 0xC6, 0x7D),
            text: Rgb(0x9B, 0xE8, 0xC3),
            lost: Rgb(0x66, 0x00, 0x00),
        }
    }

    pub fn light() -> Self {
        Self {
            head: Rgb(0x0B, 0x32, 0x1F),
            tail: Rgb(0x9B, 0xE8, 0xC3),
            food: Rgb(0x2F, 0xC6, 0x7D),
            background: Rgb(0xBC, 0xF0, 0xD7),
            border: Rgb(0x13, 0x53, 0x34),
            text: Rgb(0x13, 0x53, 0x34),
            lost: Rgb(0xFF, 0x99, 0x99),
        }
    }
}

/// Look and feel, handed to whoever draws. There is no global style state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub palette: Palette,
    pub snake_glyph: char,
    pub food_glyph: char,
}

impl RenderConfig {
    pub fn dark() -> Self {
        Self {
            palette: Palette::dark(),
            snake_glyph: '█',
            food_glyph: '█',
        }
    }

    pub fn light() -> Self {
        Self {
            palette: Palette::light(),
            ..Self::dark()
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::dark()
    }
}

/// One character cell; `fg` is `None` for background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Option<Rgb>,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph { ch: ' ', fg: None };
}

/// Board contents, one row per board line. An empty frame means nothing
/// could be drawn consistently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub rows: Vec<Vec<Glyph>>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Characters only, rows joined by newlines.
    pub fn to_plain_string(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|g| g.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy)]
enum Paint {
    Segment(usize),
    Food,
}

/// Projects snake and food onto the board. Pure: the same state always gives
/// the same frame. Any cell outside the board (e.g. right after a shrinking
/// resize) yields an empty frame.
pub fn render(snake: &Snake, food: &Food, board: Board, config: &RenderConfig) -> Frame {
    if board.is_degenerate() {
        return Frame::default();
    }

    let mut cells: Vec<(Position, Paint)> = snake
        .segments
        .iter()
        .map(|s| (s.position, Paint::Segment(s.order)))
        .chain(std::iter::once((food.position, Paint::Food)))
        .collect();
    if cells.iter().any(|(p, _)| !board.contains(*p)) {
        return Frame::default();
    }
    cells.sort_by_key(|(p, _)| (p.y, p.x));

    let colors = gradient(config.palette.head, config.palette.tail, snake.len());
    let width = board.width as usize;
    let height = board.height as usize;
    let mut rows = Vec::with_capacity(height);
    let mut row: Vec<Glyph> = Vec::with_capacity(width);

    for (p, paint) in cells {
        while rows.len() < p.y as usize {
            row.resize(width, Glyph::BLANK);
            rows.push(std::mem::replace(&mut row, Vec::with_capacity(width)));
        }
        // first paint of a cell wins
        if row.len() > p.x as usize {
            continue;
        }
        row.resize(p.x as usize, Glyph::BLANK);

        let glyph = match paint {
            Paint::Segment(order) => Glyph {
                ch: config.snake_glyph,
                fg: colors.get(order).or(colors.last()).copied(),
            },
            Paint::Food if food.blink => Glyph {
                ch: config.food_glyph,
                fg: Some(config.palette.food),
            },
            Paint::Food => Glyph::BLANK,
        };
        row.push(glyph);
    }
    while rows.len() < height {
        row.resize(width, Glyph::BLANK);
        rows.push(std::mem::replace(&mut row, Vec::with_capacity(width)));
    }

    Frame { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::entity::Direction;
    use proptest::prelude::*;
    use std::time::{Duration, SystemTime};

    fn food_at(x: i32, y: i32, blink: bool) -> Food {
        Food {
            position: Position::new(x, y),
            blink,
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(10),
        }
    }

    fn default_snake() -> Snake {
        Snake::from_config(&EngineConfig::default())
    }

    proptest! {
        #[test]
        fn prop_render_is_idempotent(
            hx in 0i32..20, hy in 0i32..10, len in 1usize..5,
            fx in 0i32..20, fy in 0i32..10, blink in any::<bool>()
        ) {
            let snake = Snake::new(Position::new(hx, hy), Direction::Down, len, 1.0, 30);
            let food = food_at(fx, fy, blink);
            let board = Board::new(20, 10);
            let config = RenderConfig::dark();

            let first = render(&snake, &food, board, &config);
            let second = render(&snake, &food, board, &config);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        let head = Rgb(0, 0, 0);
        let tail = Rgb(255, 100, 10);
        assert_eq!(gradient(head, tail, 0), vec![]);
        assert_eq!(gradient(head, tail, 1), vec![head]);

        let colors = gradient(head, tail, 3);
        assert_eq!(colors, vec![head, Rgb(128, 50, 5), tail]);
    }

    #[test]
    fn test_render_places_snake_and_food() {
        let frame = render(&default_snake(), &food_at(8, 5, true), Board::new(10, 7), &RenderConfig::dark());

        assert_eq!(frame.height(), 7);
        assert_eq!(frame.width(), 10);
        let text = frame.to_plain_string();
        let row5 = text.lines().nth(5).unwrap();
        assert_eq!(row5, "   ███  █ ");
        assert!(text.lines().take(5).all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_snake_colored_head_to_tail() {
        let config = RenderConfig::dark();
        let frame = render(&default_snake(), &food_at(0, 0, false), Board::new(10, 7), &config);
        let row = &frame.rows[5];

        assert_eq!(row[5].fg, Some(config.palette.head));
        assert_eq!(row[3].fg, Some(config.palette.tail));
        assert_ne!(row[4].fg, row[5].fg);
    }

    #[test]
    fn test_food_hidden_when_blink_off() {
        let config = RenderConfig::dark();
        let on = render(&default_snake(), &food_at(1, 1, true), Board::new(10, 7), &config);
        let off = render(&default_snake(), &food_at(1, 1, false), Board::new(10, 7), &config);

        assert_eq!(on.rows[1][1].fg, Some(config.palette.food));
        assert_eq!(off.rows[1][1], Glyph::BLANK);
    }

    #[test]
    fn test_out_of_bounds_gives_empty_frame() {
        let config = RenderConfig::dark();
        // head at x=5 does not fit a 5-wide board
        assert!(render(&default_snake(), &food_at(0, 0, true), Board::new(5, 7), &config).is_empty());
        // unplaced food
        assert!(render(&default_snake(), &food_at(-1, -1, true), Board::new(10, 7), &config).is_empty());
        assert!(render(&default_snake(), &food_at(0, 0, true), Board::new(0, 0), &config).is_empty());
    }
}
