use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::TimingConfig;

/// Hunger decays once per second.
pub const HUNGER_PERIOD: Duration = Duration::from_secs(1);
/// First blink tick after a fresh start.
pub const START_BLINK_DELAY: Duration = Duration::from_millis(500);
/// First blink tick after resuming, so the food catches up immediately.
pub const RESUME_BLINK_DELAY: Duration = Duration::from_millis(10);

/// Used in place of a non-positive speed.
const SPEED_FALLBACK: f64 = 0.05;

/// Movement interval for a snake at `speed` on `board`. Larger boards and
/// lower speeds both shorten it.
///
/// `timing` must pass [`EngineConfig::validate`](crate::config::EngineConfig::validate).
pub fn tick_interval(speed: f64, board: Board, timing: &TimingConfig) -> Duration {
    let speed = if speed > 0.0 { speed } else { SPEED_FALLBACK };
    let ms = speed * timing.base_interval_ms / (1.0 + board.diagonal() / timing.reference_diagonal);
    let ms = ms.clamp(timing.min_interval_ms, timing.max_interval_ms);
    Duration::from_secs_f64(ms / 1000.0)
}

/// A timer completion. Every tick remembers the running period that
/// scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Move { generation: u64 },
    Hunger { generation: u64 },
    Blink { generation: u64 },
}

impl Tick {
    pub fn generation(&self) -> u64 {
        match *self {
            Tick::Move { generation } | Tick::Hunger { generation } | Tick::Blink { generation } => generation,
        }
    }
}

/// Requests the state machine hands back to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Schedule { after: Duration, tick: Tick },
    Quit,
}

impl Command {
    pub fn schedule(after: Duration, tick: Tick) -> Self {
        Command::Schedule { after, tick }
    }
}

#[derive(Debug)]
struct Entry {
    due: Instant,
    seq: u64,
    tick: Tick,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest due, then the first scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// One-shot timers multiplexed onto the event loop. There is no cancel:
/// stale ticks are delivered and dropped by generation.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, after: Duration, tick: Tick) {
        self.seq += 1;
        self.queue.push(Entry {
            due: now + after,
            seq: self.seq,
            tick,
        });
    }

    /// How long the loop may block before the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.queue.peek().map(|e| e.due.saturating_duration_since(now))
    }

    pub fn pop_due(&mut self, now: Instant) -> Option<Tick> {
        if self.queue.peek()?.due > now {
            return None;
        }
        self.queue.pop().map(|e| e.tick)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
