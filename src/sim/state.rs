//! Game state and core simulation types

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawn::SpawnScheduler;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused (stop menu open)
    Paused,
    /// Countdown ran out
    Over,
}

/// Shape variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Cube,
    Tetrahedron,
    Sphere,
    /// Sphere-shaped hazard; cutting it costs points and the combo
    Bomb,
}

impl ShapeKind {
    /// Kinds the regular spawner picks from
    pub const SLICEABLE: [ShapeKind; 3] =
        [ShapeKind::Tetrahedron, ShapeKind::Sphere, ShapeKind::Cube];

    pub fn is_bomb(self) -> bool {
        self == ShapeKind::Bomb
    }
}

/// Things that happened during a tick, for audio/HUD/persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ShapeSliced { kind: ShapeKind },
    BombSliced,
    ComboIncreased(u32),
    ComboBroken,
    ScoreChanged(u64),
    Paused,
    Resumed,
    TimeUp,
}

/// A launched shape
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: u32,
    pub kind: ShapeKind,
    pub pos: Vec3,
    /// Vertical velocity (world units/s, positive is up)
    pub vel_y: f32,
    /// Euler angles (XYZ order)
    pub rotation: Vec3,
    pub angular_vel: Vec3,
    /// Has been fully inside the view at least once
    pub entered_view: bool,
    /// Already broke the combo by leaving the view uncut
    pub combo_out: bool,
    /// Removed by a cut
    pub cut: bool,
    /// Marked for removal (cut, or fell below the launch line)
    pub destroyed: bool,
}

impl Shape {
    /// Launch a new shape from below the view
    pub fn launch(id: u32, kind: ShapeKind, rng: &mut Pcg32, tuning: &Tuning) -> Self {
        let x = rng.random_range(tuning.spawn_x_min..tuning.spawn_x_max);
        let vel_y = rng.random_range(tuning.launch_speed_min..=tuning.launch_speed_max);
        let spin = tuning.angular_speed_max;
        let angular_vel = Vec3::new(
            rng.random_range(-spin..=spin),
            rng.random_range(-spin..=spin),
            rng.random_range(-spin..=spin),
        );

        Self {
            id,
            kind,
            pos: Vec3::new(x, tuning.launch_y, 0.0),
            vel_y,
            rotation: Vec3::ZERO,
            angular_vel,
            entered_view: false,
            combo_out: false,
            cut: false,
            destroyed: false,
        }
    }

    pub fn is_bomb(&self) -> bool {
        self.kind.is_bomb()
    }

    /// Position on the cutting plane
    pub fn pos2(&self) -> Vec2 {
        self.pos.truncate()
    }

    /// Ballistic step; `dt` is already scaled by the difficulty speed multiplier
    pub fn update(&mut self, dt: f32, rng: &mut Pcg32, tuning: &Tuning) {
        self.vel_y -= tuning.gravity * dt;
        self.pos.y += self.vel_y * dt;

        self.rotation += self.angular_vel * dt;
        self.angular_vel *= crate::per_frame_factor(tuning.angular_damping_per_frame, dt);

        let kick_chance = crate::per_frame_chance(tuning.angular_kick_chance_per_frame, dt);
        if rng.random::<f32>() < kick_chance {
            let k = tuning.angular_kick_strength;
            self.angular_vel += Vec3::new(
                rng.random_range(-k..=k),
                rng.random_range(-k..=k),
                rng.random_range(-k..=k),
            );
        }

        if self.pos.y < tuning.launch_y && self.vel_y < 0.0 {
            self.destroyed = true;
        }
    }

    /// Center inside the visible area
    pub fn is_inside_view(&self) -> bool {
        self.pos.x.abs() <= HALF_W && self.pos.y.abs() <= HALF_H
    }
}

/// A short-lived explosion fragment
#[derive(Debug, Clone)]
pub struct ExplosionParticle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub age: f32,
    pub lifetime: f32,
    pub initial_scale: f32,
}

impl ExplosionParticle {
    pub fn new(pos: Vec3, rng: &mut Pcg32) -> Self {
        let speed = rng.random_range(200.0..600.0);
        let dir = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            (rng.random::<f32>() - 0.5) * 0.3,
        )
        .normalize_or(Vec3::Y);

        Self {
            pos,
            vel: dir * speed,
            age: 0.0,
            lifetime: rng.random_range(0.3..0.5),
            initial_scale: rng.random_range(1.0..1.5),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.age += dt;
        self.pos += self.vel * dt;
    }

    /// Current scale, shrinking linearly to zero over the lifetime
    pub fn scale(&self) -> f32 {
        (self.initial_scale * (1.0 - self.age / self.lifetime)).max(0.0)
    }

    pub fn is_dead(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// The visible ribbon left behind by a finished cut
#[derive(Debug, Clone)]
pub struct Slash {
    /// Triangle list in world space
    pub triangles: Vec<Vec2>,
    /// Seconds left on screen
    pub ttl: f32,
}

/// A stroke being drawn (mouse held down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub start: Vec2,
    pub current: Vec2,
    /// Guide line visibility (hidden when the pointer leaves the canvas)
    pub guide_visible: bool,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub combo: u32,
    /// Seconds shown on the countdown
    pub remaining_secs: i32,
    /// Real time accumulated toward the next countdown step
    pub clock_accum: f32,
    /// Timeline seconds (stops while frozen)
    pub elapsed: f32,
    /// Hit-stop seconds remaining
    pub freeze_secs: f32,
    pub scheduler: SpawnScheduler,
    /// Live shapes (sorted by id)
    pub shapes: Vec<Shape>,
    pub particles: Vec<ExplosionParticle>,
    pub slashes: Vec<Slash>,
    pub stroke: Option<Stroke>,
    /// Seconds the combo text stays visible
    pub combo_text_secs: f32,
    /// Seconds the combo-reset flash stays visible
    pub combo_reset_secs: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let remaining_secs = tuning.round_secs as i32;
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Playing,
            score: 0,
            combo: 0,
            remaining_secs,
            clock_accum: 0.0,
            elapsed: 0.0,
            freeze_secs: 0.0,
            scheduler: SpawnScheduler::default(),
            shapes: Vec::new(),
            particles: Vec::new(),
            slashes: Vec::new(),
            stroke: None,
            combo_text_secs: 0.0,
            combo_reset_secs: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Launch a shape of the given kind
    pub fn spawn_shape(&mut self, kind: ShapeKind) -> u32 {
        let id = self.next_entity_id();
        let shape = Shape::launch(id, kind, &mut self.rng, &self.tuning);
        log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, shape.pos.x);
        self.shapes.push(shape);
        id
    }

    /// Launch a random non-bomb shape
    pub fn spawn_random_shape(&mut self) -> u32 {
        let idx = self.rng.random_range(0..ShapeKind::SLICEABLE.len());
        self.spawn_shape(ShapeKind::SLICEABLE[idx])
    }

    pub fn spawn_bomb(&mut self) -> u32 {
        self.spawn_shape(ShapeKind::Bomb)
    }

    /// Burst of particles at a cut shape's position
    pub fn spawn_explosion(&mut self, pos: Vec3) {
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        let count = self.tuning.explosion_particles.min(room);
        for _ in 0..count {
            self.particles.push(ExplosionParticle::new(pos, &mut self.rng));
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_secs > 0.0
    }

    /// Start (or extend) the hit-stop
    pub fn freeze_for(&mut self, secs: f32) {
        self.freeze_secs = self.freeze_secs.max(secs);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure shapes are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.shapes.sort_by_key(|s| s.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert_eq!(state.remaining_secs, 60);
        assert!(state.shapes.is_empty());
    }

    #[test]
    fn test_launch_within_tuning_ranges() {
        let mut state = GameState::new(42);
        for _ in 0..50 {
            state.spawn_random_shape();
        }
        let t = Tuning::default();
        for shape in &state.shapes {
            assert!(shape.pos.x >= t.spawn_x_min && shape.pos.x < t.spawn_x_max);
            assert_eq!(shape.pos.y, t.launch_y);
            assert!(shape.vel_y >= t.launch_speed_min && shape.vel_y <= t.launch_speed_max);
            assert!(shape.angular_vel.abs().max_element() <= t.angular_speed_max);
            assert!(!shape.is_bomb());
        }
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(1);
        let a = state.spawn_random_shape();
        let b = state.spawn_bomb();
        assert!(b > a);
        assert!(state.shapes[1].is_bomb());
    }

    #[test]
    fn test_shape_rises_then_falls_and_is_destroyed() {
        let mut state = GameState::new(3);
        state.spawn_random_shape();
        let tuning = state.tuning.clone();
        let mut shape = state.shapes[0].clone();

        let mut peak = shape.pos.y;
        let mut ticks = 0;
        while !shape.destroyed && ticks < 10_000 {
            shape.update(SIM_DT, &mut state.rng, &tuning);
            peak = peak.max(shape.pos.y);
            ticks += 1;
        }

        assert!(shape.destroyed);
        assert!(peak > -HALF_H, "shape should become visible");
        assert!(shape.pos.y < tuning.launch_y);
        // Flight time is roughly 2 * v0 / g
        let flight = ticks as f32 * SIM_DT;
        let expected = 2.0 * state.shapes[0].vel_y / tuning.gravity;
        assert!((flight - expected).abs() < 0.05);
    }

    #[test]
    fn test_angular_velocity_decays() {
        let mut state = GameState::new(9);
        let tuning = Tuning {
            angular_kick_chance_per_frame: 0.0,
            ..Tuning::default()
        };
        let mut shape = Shape::launch(1, ShapeKind::Cube, &mut state.rng, &tuning);
        shape.angular_vel = Vec3::splat(1.0);
        for _ in 0..120 {
            shape.update(SIM_DT, &mut state.rng, &tuning);
        }
        // One second at 60 Hz reference: 0.995^60
        let expected = 0.995_f32.powi(60);
        assert!((shape.angular_vel.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_inside_view() {
        let mut state = GameState::new(5);
        state.spawn_random_shape();
        let shape = &mut state.shapes[0];
        assert!(!shape.is_inside_view());
        shape.pos.y = 0.0;
        assert!(shape.is_inside_view());
        shape.pos.x = HALF_W + 1.0;
        assert!(!shape.is_inside_view());
    }

    #[test]
    fn test_particle_lifecycle() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut p = ExplosionParticle::new(Vec3::ZERO, &mut rng);
        let speed = p.vel.length();
        assert!((200.0..600.0).contains(&speed));
        assert!(p.lifetime >= 0.3 && p.lifetime < 0.5);
        assert!(p.initial_scale >= 1.0 && p.initial_scale < 1.5);

        p.update(p.lifetime / 2.0);
        assert!((p.scale() - p.initial_scale * 0.5).abs() < 1e-4);
        assert!(!p.is_dead());

        p.update(p.lifetime);
        assert!(p.is_dead());
        assert_eq!(p.scale(), 0.0);
    }

    #[test]
    fn test_explosion_respects_particle_cap() {
        let mut state = GameState::new(2);
        for _ in 0..100 {
            state.spawn_explosion(Vec3::ZERO);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_events_drain() {
        let mut state = GameState::new(2);
        state.push_event(GameEvent::ComboBroken);
        state.push_event(GameEvent::ScoreChanged(3));
        let events = state.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GameEvent::ComboBroken);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_freeze_extends_not_shortens() {
        let mut state = GameState::new(2);
        state.freeze_for(0.3);
        state.freeze_for(0.1);
        assert!((state.freeze_secs - 0.3).abs() < 1e-6);
        assert!(state.is_frozen());
    }
}
