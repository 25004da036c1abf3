//! Fling-to-skip on the compact player bar.

use std::time::{Duration, Instant};

use crate::player::Direction;

/// Turns horizontal flings into skips, at most one per cooldown.
#[derive(Debug, Clone)]
pub struct SwipeGate {
    min_velocity: f64,
    cooldown: Duration,
    last_skip: Option<Instant>,
}

impl SwipeGate {
    pub fn new(min_velocity: f64, cooldown: Duration) -> Self {
        Self {
            min_velocity,
            cooldown,
            last_skip: None,
        }
    }

    /// Returns the skip direction for a qualifying fling.
    ///
    /// Leftward flings go to the next track.
    pub fn on_fling(&mut self, vx: f64, vy: f64, now: Instant) -> Option<Direction> {
        if let Some(last) = self.last_skip
            && now.duration_since(last) < self.cooldown
        {
            return None;
        }
        if vx.abs() <= vy.abs() || vx.abs() <= self.min_velocity {
            return None;
        }
        self.last_skip = Some(now);
        Some(if vx < 0.0 {
            Direction::Next
        } else {
            Direction::Previous
        })
    }
}
