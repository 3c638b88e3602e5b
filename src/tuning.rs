//! Data-driven game balance
//!
//! Every field has a default so partial JSON overrides work.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum TuningError {
    /// Not valid JSON, or a field has the wrong type
    Parse(serde_json::Error),
    /// Parsed, but a value is out of range
    OutOfRange { field: &'static str, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid tuning JSON: {e}"),
            Self::OutOfRange { field, reason } => write!(f, "tuning field {field} {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::OutOfRange { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::OutOfRange { field, reason })
    }
}

/// Physics, spawning and scoring constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration (world units/s²)
    pub gravity: f32,
    /// Launch speed range (world units/s)
    pub launch_speed_min: f32,
    pub launch_speed_max: f32,
    /// Horizontal launch range
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    /// Launch height, also the removal line for falling shapes
    pub launch_y: f32,

    /// Seconds of timeline until difficulty peaks
    pub total_duration_secs: f32,
    /// Shape speed multiplier at peak difficulty
    pub max_speed_multiplier: f32,
    /// Spawn interval at the start and at peak difficulty (seconds)
    pub spawn_interval_start: f32,
    pub spawn_interval_end: f32,
    /// Companion spawns run on `interval * factor`
    pub companion_interval_factor: f32,
    /// Bombs run on `interval * factor`
    pub bomb_interval_factor: f32,

    /// Initial angular speed range per axis (rad/s, symmetric)
    pub angular_speed_max: f32,
    /// Angular damping per 60 Hz frame
    pub angular_damping_per_frame: f32,
    /// Chance per 60 Hz frame of a random spin kick
    pub angular_kick_chance_per_frame: f32,
    /// Spin kick range per axis (symmetric)
    pub angular_kick_strength: f32,

    /// Round length (seconds on the countdown)
    pub round_secs: u32,
    /// Points lost per bomb cut
    pub bomb_penalty: u64,
    /// Hit-stop after a successful cut (seconds)
    pub freeze_secs: f32,
    /// Strokes shorter than this are ignored (world units)
    pub min_stroke_length: f32,
    /// Particles per explosion
    pub explosion_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1500.0,
            launch_speed_min: 1400.0,
            launch_speed_max: 1600.0,
            spawn_x_min: -440.0,
            spawn_x_max: 440.0,
            launch_y: -640.0,

            total_duration_secs: 60.0,
            max_speed_multiplier: 1.2,
            spawn_interval_start: 2.0,
            spawn_interval_end: 0.7,
            companion_interval_factor: 0.6,
            bomb_interval_factor: 1.2,

            angular_speed_max: 1.0,
            angular_damping_per_frame: 0.995,
            angular_kick_chance_per_frame: 0.01,
            angular_kick_strength: 0.1,

            round_secs: 60,
            bomb_penalty: 10,
            freeze_secs: 0.1,
            min_stroke_length: 5.0,
            explosion_particles: 16,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with. NaN fails every check.
    pub fn validate(&self) -> Result<(), TuningError> {
        check(self.gravity > 0.0, "gravity", "must be positive")?;
        check(
            self.launch_speed_min > 0.0,
            "launch_speed_min",
            "must be positive",
        )?;
        check(
            self.launch_speed_min <= self.launch_speed_max,
            "launch_speed_max",
            "must not be below launch_speed_min",
        )?;
        check(
            self.spawn_x_min < self.spawn_x_max,
            "spawn_x_max",
            "must be above spawn_x_min",
        )?;
        check(self.launch_y.is_finite(), "launch_y", "must be finite")?;
        check(
            self.max_speed_multiplier > 0.0,
            "max_speed_multiplier",
            "must be positive",
        )?;
        check(
            self.spawn_interval_start > 0.0,
            "spawn_interval_start",
            "must be positive",
        )?;
        check(
            self.spawn_interval_end > 0.0,
            "spawn_interval_end",
            "must be positive",
        )?;
        check(
            self.companion_interval_factor > 0.0,
            "companion_interval_factor",
            "must be positive",
        )?;
        check(
            self.bomb_interval_factor > 0.0,
            "bomb_interval_factor",
            "must be positive",
        )?;
        check(
            self.angular_speed_max >= 0.0,
            "angular_speed_max",
            "must not be negative",
        )?;
        check(
            (0.0..=1.0).contains(&self.angular_damping_per_frame),
            "angular_damping_per_frame",
            "must be within [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.angular_kick_chance_per_frame),
            "angular_kick_chance_per_frame",
            "must be within [0, 1]",
        )?;
        check(
            self.angular_kick_strength >= 0.0,
            "angular_kick_strength",
            "must not be negative",
        )?;
        check(self.freeze_secs >= 0.0, "freeze_secs", "must not be negative")?;
        check(
            self.min_stroke_length >= 0.0,
            "min_stroke_length",
            "must not be negative",
        )?;
        Ok(())
    }

    /// Difficulty progress in [0, 1] for the given timeline seconds
    pub fn progress(&self, elapsed_secs: f32) -> f32 {
        if self.total_duration_secs <= 0.0 {
            return 1.0;
        }
        (elapsed_secs / self.total_duration_secs).clamp(0.0, 1.0)
    }

    /// Shape time scale at the given progress
    pub fn speed_multiplier(&self, progress: f32) -> f32 {
        1.0 + (self.max_speed_multiplier - 1.0) * progress
    }

    /// Base spawn interval at the given progress
    pub fn spawn_interval(&self, progress: f32) -> f32 {
        self.spawn_interval_start - (self.spawn_interval_start - self.spawn_interval_end) * progress
    }
}
