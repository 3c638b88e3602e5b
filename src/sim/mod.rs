//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod cutter;
pub mod hit;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use cutter::{PointerEvent, apply_cut, build_ribbon, collect_hits, handle_pointer, sample_stroke};
pub use hit::{Silhouette, convex_hull, shape_contains_point, silhouette};
pub use scoring::{register_cut, reset_combo, watch_out_of_bounds};
pub use spawn::{SpawnRequest, SpawnScheduler};
pub use state::{
    ExplosionParticle, GameEvent, GamePhase, GameState, Shape, ShapeKind, Slash, Stroke,
};
pub use tick::{TickInput, tick};
