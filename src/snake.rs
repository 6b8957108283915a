use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::entity::{Direction, Position};

/// One body cell. `order` is the distance from the head and is rewritten
/// on every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSegment {
    pub position: Position,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snake {
    /// Head first.
    #[serde(rename = "positions")]
    pub segments: Vec<SnakeSegment>,
    /// Last direction requested by the player.
    pub direction: Direction,
    /// Direction applied by the most recent move.
    pub rendered_direction: Direction,
    pub speed: f64,
    #[serde(rename = "hungerCounter")]
    pub hunger: i32,
}

/// What a single move did to the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
}

impl Snake {
    /// Lays `length` segments out behind `head`, opposite to `direction`.
    pub fn new(head: Position, direction: Direction, length: usize, speed: f64, hunger: i32) -> Self {
        let back = direction.opposite();
        let mut segments = Vec::with_capacity(length.max(1));
        let mut position = head;
        for order in 0..length.max(1) {
            segments.push(SnakeSegment { position, order });
            position = position.moved(back);
        }

        Self {
            segments,
            direction,
            rendered_direction: direction,
            speed,
            hunger,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.initial_head,
            config.initial_direction,
            config.initial_length,
            config.initial_speed,
            config.hunger_reset,
        )
    }

    /// # Panics
    ///
    /// If the snake has no segments. Constructors and session loading never
    /// produce one.
    pub fn head(&self) -> Position {
        self.segments[0].position
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.segments.iter().map(|s| s.position)
    }

    pub fn occupies(&self, p: Position) -> bool {
        self.positions().any(|q| q == p)
    }

    /// Records a requested direction. Reversing onto the body (relative to the
    /// direction actually applied last move) is ignored. Returns whether the
    /// request was accepted.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if direction == self.rendered_direction.opposite() {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Freezes the requested direction as the one the next move applies.
    pub fn freeze_direction(&mut self) {
        self.rendered_direction = self.direction;
    }

    /// Moves one cell along `rendered_direction`, growing instead of shifting
    /// when the new head lands on `food`.
    pub fn advance(&mut self, food: Position, config: &EngineConfig) -> Step {
        let Some(head) = self.segments.first().map(|s| s.position) else {
            return Step::Moved;
        };
        let new_head = head.moved(self.rendered_direction);
        let ate = new_head == food;

        if !ate {
            self.segments.pop();
        }
        self.segments.insert(0, SnakeSegment { position: new_head, order: 0 });
        for (order, segment) in self.segments.iter_mut().enumerate() {
            segment.order = order;
        }

        if !ate {
            return Step::Moved;
        }
        self.speed = (self.speed - config.speed_step).max(config.min_speed);
        self.hunger = config.hunger_reset;
        Step::Ate
    }
}

/// True when the head left the board or sits on another segment.
pub fn check_loss(snake: &Snake, board: Board) -> bool {
    let Some(head) = snake.segments.first().map(|s| s.position) else {
        return true;
    };
    !board.contains(head) || snake.segments[1..].iter().any(|s| s.position == head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    fn default_snake() -> Snake {
        Snake::from_config(&EngineConfig::default())
    }

    /// Drives a snake through `moves` without food, the way the game loop does.
    fn walk(moves: &[Direction]) -> Snake {
        let config = EngineConfig::default();
        let mut snake = default_snake();
        for &d in moves {
            snake.steer(d);
            snake.freeze_direction();
            snake.advance(Position::new(-100, -100), &config);
        }
        snake
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Without food, every segment takes the place of the one before it.
        #[test]
        fn prop_shift_law(moves in prop::collection::vec(direction_strategy(), 0..30), next in direction_strategy()) {
            let config = EngineConfig::default();
            let mut snake = walk(&moves);
            let before: Vec<Position> = snake.positions().collect();

            snake.steer(next);
            snake.freeze_direction();
            let step = snake.advance(Position::new(-100, -100), &config);

            prop_assert_eq!(step, Step::Moved);
            prop_assert_eq!(snake.len(), before.len());
            for i in 1..snake.len() {
                prop_assert_eq!(snake.segments[i].position, before[i - 1]);
            }
            for (i, segment) in snake.segments.iter().enumerate() {
                prop_assert_eq!(segment.order, i);
            }
        }

        /// Eating keeps every old segment and adds the new head.
        #[test]
        fn prop_growth_law(moves in prop::collection::vec(direction_strategy(), 0..30), speed in 0.0f64..2.0) {
            let config = EngineConfig::default();
            let mut snake = walk(&moves);
            snake.speed = speed;
            snake.hunger = 3;
            let before: Vec<Position> = snake.positions().collect();
            let food = snake.head().moved(snake.rendered_direction);

            let step = snake.advance(food, &config);

            prop_assert_eq!(step, Step::Ate);
            prop_assert_eq!(snake.len(), before.len() + 1);
            prop_assert_eq!(snake.head(), food);
            prop_assert_eq!(&snake.positions().skip(1).collect::<Vec<_>>(), &before);
            prop_assert_eq!(snake.speed, (speed - config.speed_step).max(config.min_speed));
            prop_assert!(snake.speed >= config.min_speed);
            prop_assert_eq!(snake.hunger, config.hunger_reset);
        }

        #[test]
        fn prop_reversal_never_accepted(moves in prop::collection::vec(direction_strategy(), 0..20), request in direction_strategy()) {
            let mut snake = walk(&moves);
            let before = snake.direction;
            let accepted = snake.steer(request);

            if request == snake.rendered_direction.opposite() {
                prop_assert!(!accepted);
                prop_assert_eq!(snake.direction, before);
            } else {
                prop_assert!(accepted);
                prop_assert_eq!(snake.direction, request);
            }
        }

        #[test]
        fn prop_check_loss_matches_definition(moves in prop::collection::vec(direction_strategy(), 0..40), w in 1i32..30, h in 1i32..30) {
            let snake = walk(&moves);
            let board = Board::new(w, h);
            let head = snake.head();
            let expected = !board.contains(head)
                || snake.positions().skip(1).any(|p| p == head);

            prop_assert_eq!(check_loss(&snake, board), expected);
        }
    }

    #[test]
    fn test_new_snake_layout() {
        let snake = default_snake();
        assert_eq!(
            snake.positions().collect::<Vec<_>>(),
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );
        assert_eq!(snake.rendered_direction, Direction::Right);
        assert_eq!(snake.hunger, 30);
    }

    #[test]
    fn test_advance_uses_rendered_direction() {
        let config = EngineConfig::default();
        let mut snake = default_snake();
        snake.steer(Direction::Up);

        // Not frozen yet: the move still goes right.
        snake.advance(Position::new(-1, -1), &config);
        assert_eq!(snake.head(), Position::new(6, 5));

        snake.freeze_direction();
        snake.advance(Position::new(-1, -1), &config);
        assert_eq!(snake.head(), Position::new(6, 4));
    }

    #[test]
    fn test_reverse_checked_against_rendered_direction() {
        let mut snake = default_snake();
        assert!(snake.steer(Direction::Up));
        // Rendered direction is still right, so left stays forbidden.
        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.direction, Direction::Up);
    }

    #[test]
    fn test_speed_is_floor_clamped() {
        let config = EngineConfig::default();
        let mut snake = default_snake();
        snake.speed = 0.07;
        snake.advance(Position::new(6, 5), &config);
        assert_eq!(snake.speed, config.min_speed);
    }

    #[test]
    fn test_eating_grows_to_four_segments() {
        let config = EngineConfig::default();
        let mut snake = default_snake();
        snake.hunger = 7;

        let step = snake.advance(Position::new(6, 5), &config);

        assert_eq!(step, Step::Ate);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(6, 5));
        assert_eq!(snake.hunger, config.hunger_reset);
        assert_eq!(snake.speed, 0.95);
    }

    #[test]
    fn test_head_leaving_board_loses() {
        let config = EngineConfig::default();
        let mut snake = Snake::new(Position::new(19, 5), Direction::Right, 3, 1.0, 30);
        let board = Board::new(20, 10);
        assert!(!check_loss(&snake, board));

        snake.advance(Position::new(0, 0), &config);
        assert_eq!(snake.head(), Position::new(20, 5));
        assert!(check_loss(&snake, board));
    }

    #[test]
    fn test_self_collision_loses() {
        let snake = Snake {
            segments: [(5, 5), (5, 6), (4, 6), (4, 5), (5, 5)]
                .iter()
                .enumerate()
                .map(|(order, &(x, y))| SnakeSegment { position: Position::new(x, y), order })
                .collect(),
            ..default_snake()
        };
        assert!(check_loss(&snake, Board::new(20, 10)));
    }
}
