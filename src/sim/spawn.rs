//! Spawn/difficulty scheduler
//!
//! Three independent timers run on timeline time: regular shapes, companion
//! shapes at a shorter interval, and bombs at a longer one. The base interval
//! shrinks as the run progresses.

use crate::tuning::Tuning;

/// What the scheduler wants launched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnRequest {
    pub shapes: u32,
    pub bombs: u32,
}

impl SpawnRequest {
    pub fn is_empty(&self) -> bool {
        self.shapes == 0 && self.bombs == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnScheduler {
    pub shape_timer: f32,
    pub companion_timer: f32,
    pub bomb_timer: f32,
}

impl SpawnScheduler {
    /// Advance all timers by the timeline delta and report due spawns
    pub fn advance(&mut self, delta: f32, progress: f32, tuning: &Tuning) -> SpawnRequest {
        let interval = tuning.spawn_interval(progress);
        let mut request = SpawnRequest::default();

        self.shape_timer += delta;
        self.companion_timer += delta;
        self.bomb_timer += delta;

        if self.shape_timer >= interval {
            request.shapes += 1;
            self.shape_timer = 0.0;
        }

        if self.companion_timer >= interval * tuning.companion_interval_factor {
            request.shapes += 1;
            self.companion_timer = 0.0;
        }

        if self.bomb_timer >= interval * tuning.bomb_interval_factor {
            request.bombs += 1;
            self.bomb_timer = 0.0;
        }

        request
    }
}
