//! Shape Slicer - An arcade game about cutting flying shapes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, cutting, scoring)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser pointer/viewport mapping
//! - `persistence`: Last score storage
//! - `tuning`: Data-driven game balance
//! - `ui`: HUD text and overlays
//! - `audio`: Procedural sound effects

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use persistence::{MemoryStore, ScoreStore, StorageError};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame rate the per-frame tuning factors were authored against
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Viewport dimensions in world units (orthographic camera, origin at center)
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 640.0;
    pub const HALF_W: f32 = VIEW_WIDTH / 2.0;
    pub const HALF_H: f32 = VIEW_HEIGHT / 2.0;

    /// Shape geometry
    pub const CUBE_HALF_EXTENT: f32 = 45.0;
    pub const TETRA_RADIUS: f32 = 80.0;
    pub const SPHERE_RADIUS: f32 = 52.5;
    /// Glow shell scale; the shell counts for hit testing too
    pub const GLOW_SCALE: f32 = 1.15;

    /// Cut ribbon
    pub const RIBBON_SEGMENTS: usize = 100;
    pub const RIBBON_MAX_WIDTH: f32 = 10.0;
    pub const RIBBON_NOISE: f32 = 3.0;
    pub const SLASH_TTL: f32 = 0.2;

    /// Stroke sampling grid
    pub const SAMPLES_ALONG: usize = 40;
    pub const SAMPLES_ACROSS: usize = 3;

    /// Explosion particle radius at scale 1.0
    pub const PARTICLE_RADIUS: f32 = 10.0;
    /// Hard cap on live particles
    pub const MAX_PARTICLES: usize = 512;

    /// HUD feedback durations (seconds)
    pub const COMBO_TEXT_SECS: f32 = 0.3;
    pub const COMBO_RESET_FLASH_SECS: f32 = 0.4;
}

/// Convert world coordinates to normalized device coordinates
#[inline]
pub fn world_to_ndc(p: Vec2) -> Vec2 {
    Vec2::new(p.x / consts::HALF_W, p.y / consts::HALF_H)
}

/// Rescale a per-reference-frame factor (e.g. 0.995 damping at 60 Hz) to `dt` seconds
#[inline]
pub fn per_frame_factor(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * consts::REFERENCE_FPS)
}

/// Rescale a per-reference-frame probability to `dt` seconds
#[inline]
pub fn per_frame_chance(chance: f32, dt: f32) -> f32 {
    (chance * dt * consts::REFERENCE_FPS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_ndc_corners() {
        let ndc = world_to_ndc(Vec2::new(consts::HALF_W, -consts::HALF_H));
        assert!((ndc.x - 1.0).abs() < 1e-6);
        assert!((ndc.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_per_frame_factor_matches_reference_rate() {
        let one_frame = per_frame_factor(0.995, 1.0 / consts::REFERENCE_FPS);
        assert!((one_frame - 0.995).abs() < 1e-6);

        // Two half-frames compound to one full frame
        let half = per_frame_factor(0.995, 0.5 / consts::REFERENCE_FPS);
        assert!((half * half - 0.995).abs() < 1e-6);
    }

    #[test]
    fn test_per_frame_chance_clamped() {
        assert_eq!(per_frame_chance(0.5, 10.0), 1.0);
        assert!((per_frame_chance(0.01, consts::SIM_DT) - 0.005).abs() < 1e-6);
    }
}
