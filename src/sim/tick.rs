//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::cutter::{PointerEvent, apply_cut, collect_hits, handle_pointer, sample_stroke};
use super::scoring::watch_out_of_bounds;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events since the last tick, oldest first
    pub pointer: Vec<PointerEvent>,
    /// Pause button
    pub pause: bool,
    /// Resume button (stop menu)
    pub resume: bool,
    /// Demo mode - the autopilot slices shapes
    pub autoplay: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause && state.phase == GamePhase::Playing {
        state.phase = GamePhase::Paused;
        // A stroke never survives a pause
        state.stroke = None;
        state.push_event(GameEvent::Paused);
        log::info!("Paused with {}s left", state.remaining_secs);
        return;
    }
    if input.resume && state.phase == GamePhase::Paused {
        state.phase = GamePhase::Playing;
        state.push_event(GameEvent::Resumed);
        log::info!("Resumed");
    }

    // Don't tick if paused or over
    match state.phase {
        GamePhase::Paused | GamePhase::Over => return,
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    // Countdown runs on real time, hit-stop included
    state.clock_accum += dt;
    while state.clock_accum >= 1.0 {
        state.clock_accum -= 1.0;
        state.remaining_secs -= 1;
        if state.remaining_secs < 0 {
            state.remaining_secs = 0;
            state.phase = GamePhase::Over;
            state.stroke = None;
            state.push_event(GameEvent::TimeUp);
            log::info!("Time up! Final score: {}", state.score);
            return;
        }
    }

    // Hit-stop freezes the timeline and all motion
    let frozen = state.is_frozen();
    state.freeze_secs = (state.freeze_secs - dt).max(0.0);
    let timeline_dt = if frozen { 0.0 } else { dt };

    state.elapsed += timeline_dt;
    let progress = state.tuning.progress(state.elapsed);
    let speed_multiplier = state.tuning.speed_multiplier(progress);

    let tuning = state.tuning.clone();
    let request = state.scheduler.advance(timeline_dt, progress, &tuning);
    if !request.is_empty() {
        log::trace!("Spawning {} shape(s), {} bomb(s)", request.shapes, request.bombs);
    }
    for _ in 0..request.shapes {
        state.spawn_random_shape();
    }
    for _ in 0..request.bombs {
        state.spawn_bomb();
    }

    if !frozen {
        let shape_dt = dt * speed_multiplier;
        for shape in &mut state.shapes {
            shape.update(shape_dt, &mut state.rng, &tuning);
        }
        for particle in &mut state.particles {
            particle.update(dt);
        }
    }
    state.shapes.retain(|s| !s.destroyed);
    state.particles.retain(|p| !p.is_dead());

    for slash in &mut state.slashes {
        slash.ttl -= dt;
    }
    state.slashes.retain(|s| s.ttl > 0.0);
    state.combo_text_secs = (state.combo_text_secs - dt).max(0.0);
    state.combo_reset_secs = (state.combo_reset_secs - dt).max(0.0);

    for &event in &input.pointer {
        handle_pointer(state, event);
    }

    if input.autoplay {
        autoplay(state);
    }

    watch_out_of_bounds(state);

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Half-length of autopilot strokes
const AUTOPLAY_REACH: f32 = 90.0;

/// Demo autopilot: slice the lowest visible shape with a stroke that avoids bombs
fn autoplay(state: &mut GameState) {
    if state.is_frozen() || state.stroke.is_some() || state.phase != GamePhase::Playing {
        return;
    }

    let mut targets: Vec<Vec2> = state
        .shapes
        .iter()
        .filter(|s| !s.is_bomb() && !s.cut && s.is_inside_view())
        .map(|s| s.pos2())
        .collect();
    targets.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));

    let directions = [Vec2::X, Vec2::Y, Vec2::new(1.0, 1.0).normalize()];
    for target in targets {
        for dir in directions {
            let p1 = target - dir * AUTOPLAY_REACH;
            let p2 = target + dir * AUTOPLAY_REACH;
            let hits = collect_hits(&state.shapes, &sample_stroke(p1, p2));
            let hits_bomb = hits.iter().any(|&i| state.shapes[i].is_bomb());
            if !hits.is_empty() && !hits_bomb {
                apply_cut(state, p1, p2);
                return;
            }
        }
    }
}
