use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::Board;
use crate::entity::Position;
use crate::snake::Snake;

/// Random draws before placement gives up on a crowded board.
pub const PLACEMENT_ATTEMPTS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub position: Position,
    /// Whether the food is currently painted in its flashing color.
    #[serde(rename = "colorFlag")]
    pub blink: bool,
    #[serde(rename = "expiry")]
    pub expires_at: SystemTime,
}

/// How urgently the food is blinking, based on the time it has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    Steady,
    Warning,
    Urgent,
    Expired,
}

impl BlinkPhase {
    /// Delay until the next blink tick.
    pub fn period(&self) -> Duration {
        match self {
            BlinkPhase::Steady | BlinkPhase::Expired => Duration::from_millis(500),
            BlinkPhase::Warning => Duration::from_millis(120),
            BlinkPhase::Urgent => Duration::from_millis(60),
        }
    }

    pub fn toggles(&self) -> bool {
        matches!(self, BlinkPhase::Warning | BlinkPhase::Urgent)
    }
}

impl Food {
    /// Off-board placeholder used until the first real placement.
    pub fn unplaced(now: SystemTime, ttl: Duration) -> Self {
        Self {
            position: Position::new(-1, -1),
            blink: true,
            expires_at: now + ttl,
        }
    }

    pub fn time_left(&self, now: SystemTime) -> Duration {
        self.expires_at.duration_since(now).unwrap_or(Duration::ZERO)
    }

    pub fn blink_phase(&self, now: SystemTime) -> BlinkPhase {
        let left = self.time_left(now);
        if left.is_zero() {
            BlinkPhase::Expired
        } else if left <= Duration::from_secs(3) {
            BlinkPhase::Urgent
        } else if left <= Duration::from_secs(5) {
            BlinkPhase::Warning
        } else {
            BlinkPhase::Steady
        }
    }

    /// Rejection-samples a free cell. When none turns up, the current food
    /// stays where it is and only its expiry is pushed back.
    pub fn place<R: Rng>(&self, snake: &Snake, board: Board, now: SystemTime, ttl: Duration, rng: &mut R) -> Food {
        if board.is_degenerate() {
            warn!(
                width = board.width,
                height = board.height,
                "board too small for food, keeping previous position"
            );
        } else if snake.len() >= board.cell_count() {
            warn!(
                cells = board.cell_count(),
                snake_len = snake.len(),
                "snake fills the board, keeping previous food position"
            );
        } else {
            let occupied: HashSet<Position> = snake.positions().collect();
            for _ in 0..PLACEMENT_ATTEMPTS {
                let candidate = Position::new(rng.gen_range(0..board.width), rng.gen_range(0..board.height));
                if !occupied.contains(&candidate) {
                    debug!(x = candidate.x, y = candidate.y, "placed food");
                    return Food {
                        position: candidate,
                        blink: true,
                        expires_at: now + ttl,
                    };
                }
            }
            warn!(
                attempts = PLACEMENT_ATTEMPTS,
                snake_len = snake.len(),
                "no free cell found for food, keeping previous position"
            );
        }

        Food {
            expires_at: now + ttl,
            ..self.clone()
        }
    }
}
