/// The serpent: body segments plus its own movement clock.
///
/// Movement is time-driven, not tick-driven. `refresh(now)` is called once
/// per simulation tick and advances the body only when the current
/// interval has elapsed since the last advance. Speed items swap the
/// interval for a fixed period, after which it snaps back to baseline.
///
/// Growth is deferred: `extend()` only raises a flag, and the flag is
/// consumed by the next advance (or gate placement), which keeps the tail.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use super::cell::Pos;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector in screen coordinates (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Gate exit candidates for a serpent entering while moving `self`:
    /// straight through, the two perpendiculars, then back.
    pub fn exit_priority(self) -> [Direction; 4] {
        match self {
            Direction::Up => [Direction::Up, Direction::Right, Direction::Left, Direction::Down],
            Direction::Down => [Direction::Down, Direction::Right, Direction::Left, Direction::Up],
            Direction::Left => [Direction::Left, Direction::Up, Direction::Down, Direction::Right],
            Direction::Right => [Direction::Right, Direction::Down, Direction::Up, Direction::Left],
        }
    }
}

/// A 180° turn request. Always fatal to the run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IllegalReversal {
    pub from: Direction,
    pub to: Direction,
}

impl fmt::Display for IllegalReversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot reverse from {:?} to {:?}", self.from, self.to)
    }
}

impl std::error::Error for IllegalReversal {}

/// Movement intervals and how long a speed item lasts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedProfile {
    pub base: Duration,
    pub boosted: Duration,
    pub slowed: Duration,
    pub effect: Duration,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        SpeedProfile {
            base: Duration::from_millis(200),
            boosted: Duration::from_millis(100),
            slowed: Duration::from_millis(400),
            effect: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpeedState {
    Normal,
    Boosted,
    Slowed,
}

#[derive(Clone, Debug)]
pub struct Serpent {
    segments: VecDeque<Pos>, // front = head
    direction: Direction,
    pending_growth: bool,
    last_advance: Instant,
    interval: Duration,
    speed: SpeedProfile,
    speed_state: SpeedState,
    speed_changed_at: Instant,
}

pub const INITIAL_LENGTH: usize = 3;

impl Serpent {
    /// Three segments in a horizontal line ending at `head`, moving Right.
    pub fn new(head: Pos, speed: SpeedProfile, now: Instant) -> Self {
        let segments = (0..INITIAL_LENGTH as i32)
            .map(|i| Pos::new(head.x - i, head.y))
            .collect();
        Serpent {
            segments,
            direction: Direction::Right,
            pending_growth: false,
            last_advance: now,
            interval: speed.base,
            speed,
            speed_state: SpeedState::Normal,
            speed_changed_at: now,
        }
    }

    /// Per-tick update: expire speed effects, then advance if due.
    /// Returns true when the body moved.
    pub fn refresh(&mut self, now: Instant) -> bool {
        if self.speed_state != SpeedState::Normal
            && now.saturating_duration_since(self.speed_changed_at) >= self.speed.effect
        {
            self.interval = self.speed.base;
            self.speed_state = SpeedState::Normal;
        }

        if now.saturating_duration_since(self.last_advance) >= self.interval {
            self.advance();
            self.last_advance = now;
            true
        } else {
            false
        }
    }

    /// Move one cell in the current direction.
    pub fn advance(&mut self) {
        let next = self.head().step(self.direction);
        self.push_head(next);
    }

    /// Same direction: no-op. Opposite direction: rejected.
    pub fn set_direction(&mut self, dir: Direction) -> Result<(), IllegalReversal> {
        if dir == self.direction {
            return Ok(());
        }
        if dir == self.direction.opposite() {
            return Err(IllegalReversal { from: self.direction, to: dir });
        }
        self.direction = dir;
        Ok(())
    }

    /// Force the head to `pos` (gate exit). Tail rule matches `advance`.
    pub fn assign_head(&mut self, pos: Pos, dir: Direction) {
        self.direction = dir;
        self.push_head(pos);
    }

    pub fn extend(&mut self) {
        self.pending_growth = true;
    }

    /// Drop the tail, never below one segment.
    pub fn shrink(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop_back();
        }
    }

    /// Does the head overlap any other segment?
    pub fn detect_collision(&self) -> bool {
        let head = self.head();
        self.segments.iter().skip(1).any(|&s| s == head)
    }

    pub fn occupies(&self, pos: Pos) -> bool {
        self.segments.contains(&pos)
    }

    pub fn boost_speed(&mut self, now: Instant) {
        self.interval = self.speed.boosted;
        self.speed_state = SpeedState::Boosted;
        self.speed_changed_at = now;
    }

    pub fn reduce_speed(&mut self, now: Instant) {
        self.interval = self.speed.slowed;
        self.speed_state = SpeedState::Slowed;
        self.speed_changed_at = now;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn speed_state(&self) -> SpeedState {
        self.speed_state
    }

    pub fn head(&self) -> Pos {
        // Length never drops below one, see `shrink`.
        self.segments.front().copied().unwrap_or(Pos::new(0, 0))
    }

    pub fn segments(&self) -> &VecDeque<Pos> {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn has_pending_growth(&self) -> bool {
        self.pending_growth
    }

    fn push_head(&mut self, pos: Pos) {
        self.segments.push_front(pos);
        if self.pending_growth {
            self.pending_growth = false;
        } else {
            self.segments.pop_back();
        }
    }
}
