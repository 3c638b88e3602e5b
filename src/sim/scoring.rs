//! Score and combo tracking
//!
//! A stroke that hits at least one regular shape extends the combo by one and
//! scores `regular hits * combo`. Every bomb in the stroke costs a fixed penalty
//! and breaks the combo first, so a mixed stroke restarts the chain at 1.
//! Regular shapes that leave the view uncut also break the combo.

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Resolve a cut that hit the shapes at `hits` (indices into `state.shapes`)
pub fn register_cut(state: &mut GameState, hits: &[usize]) {
    let mut regular_hits = 0u64;
    let mut bomb_hits = 0u32;

    for &idx in hits {
        let (pos, kind) = {
            let shape = &mut state.shapes[idx];
            shape.cut = true;
            shape.destroyed = true;
            (shape.pos, shape.kind)
        };
        state.spawn_explosion(pos);

        if kind.is_bomb() {
            bomb_hits += 1;
            state.push_event(GameEvent::BombSliced);
        } else {
            regular_hits += 1;
            state.push_event(GameEvent::ShapeSliced { kind });
        }
    }

    for _ in 0..bomb_hits {
        let penalty = state.tuning.bomb_penalty;
        state.score = state.score.saturating_sub(penalty);
        state.push_event(GameEvent::ScoreChanged(state.score));
        reset_combo(state);
    }

    if regular_hits > 0 {
        state.combo += 1;
        state.combo_text_secs = COMBO_TEXT_SECS;
        state.push_event(GameEvent::ComboIncreased(state.combo));

        state.score += regular_hits * state.combo as u64;
        state.push_event(GameEvent::ScoreChanged(state.score));

        let freeze = state.tuning.freeze_secs;
        state.freeze_for(freeze);
        log::debug!(
            "Sliced {} shape(s), combo x{}, score {}",
            regular_hits,
            state.combo,
            state.score
        );
    }
}

/// Break the combo and flash the play field
pub fn reset_combo(state: &mut GameState) {
    state.combo = 0;
    state.combo_reset_secs = COMBO_RESET_FLASH_SECS;
    state.push_event(GameEvent::ComboBroken);
}

/// Break the combo once for every regular shape that was seen and then left
/// the view without being cut
pub fn watch_out_of_bounds(state: &mut GameState) {
    let mut missed = 0;

    for shape in &mut state.shapes {
        let inside = shape.is_inside_view();
        if !shape.entered_view && inside {
            shape.entered_view = true;
        }

        if shape.is_bomb() {
            continue;
        }

        if shape.entered_view && !inside && !shape.cut && !shape.destroyed && !shape.combo_out {
            shape.combo_out = true;
            missed += 1;
        }
    }

    for _ in 0..missed {
        reset_combo(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ShapeKind;
    use glam::Vec3;

    fn state_with(kinds: &[ShapeKind]) -> GameState {
        let mut state = GameState::new(21);
        for (i, &kind) in kinds.iter().enumerate() {
            state.spawn_shape(kind);
            state.shapes[i].pos = Vec3::new(i as f32 * 150.0 - 300.0, 0.0, 0.0);
        }
        state
    }

    #[test]
    fn test_multi_hit_scales_with_combo() {
        let mut state = state_with(&[ShapeKind::Cube, ShapeKind::Sphere, ShapeKind::Tetrahedron]);
        state.combo = 2;
        register_cut(&mut state, &[0, 1, 2]);
        assert_eq!(state.combo, 3);
        assert_eq!(state.score, 9);
        assert!(state.shapes.iter().all(|s| s.cut && s.destroyed));
        assert_eq!(state.particles.len(), 3 * state.tuning.explosion_particles);
        assert!((state.combo_text_secs - COMBO_TEXT_SECS).abs() < 1e-6);
    }

    #[test]
    fn test_bomb_penalty_clamps_at_zero() {
        let mut state = state_with(&[ShapeKind::Bomb]);
        state.score = 4;
        state.combo = 5;
        register_cut(&mut state, &[0]);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert!(!state.is_frozen());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::BombSliced));
        assert!(events.contains(&GameEvent::ComboBroken));
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
    }

    #[test]
    fn test_bomb_penalty_subtracts() {
        let mut state = state_with(&[ShapeKind::Bomb, ShapeKind::Bomb]);
        state.score = 35;
        register_cut(&mut state, &[0, 1]);
        assert_eq!(state.score, 15);
    }

    #[test]
    fn test_mixed_stroke_restarts_combo() {
        let mut state = state_with(&[ShapeKind::Cube, ShapeKind::Bomb, ShapeKind::Sphere]);
        state.score = 50;
        state.combo = 4;
        register_cut(&mut state, &[0, 1, 2]);
        // Bomb: 50 - 10, combo reset; then 2 regular hits at combo 1
        assert_eq!(state.combo, 1);
        assert_eq!(state.score, 42);
        assert!(state.is_frozen());
    }

    #[test]
    fn test_out_of_bounds_breaks_combo_once() {
        let mut state = state_with(&[ShapeKind::Cube]);
        state.combo = 3;

        // Enters view
        watch_out_of_bounds(&mut state);
        assert!(state.shapes[0].entered_view);
        assert_eq!(state.combo, 3);

        // Falls out of view uncut
        state.shapes[0].pos.y = -HALF_H - 10.0;
        watch_out_of_bounds(&mut state);
        assert_eq!(state.combo, 0);
        assert!(state.shapes[0].combo_out);

        state.combo = 2;
        watch_out_of_bounds(&mut state);
        assert_eq!(state.combo, 2, "a shape only breaks the combo once");
    }

    #[test]
    fn test_unseen_shape_and_bombs_do_not_break_combo() {
        let mut state = state_with(&[ShapeKind::Sphere, ShapeKind::Bomb]);
        state.combo = 3;
        // Still below the view, never entered
        state.shapes[0].pos.y = -500.0;
        watch_out_of_bounds(&mut state);
        assert_eq!(state.combo, 3);

        // Bomb enters and leaves
        state.shapes[1].pos.y = 0.0;
        watch_out_of_bounds(&mut state);
        state.shapes[1].pos.y = -400.0;
        watch_out_of_bounds(&mut state);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_cut_shape_does_not_break_combo() {
        let mut state = state_with(&[ShapeKind::Cube]);
        watch_out_of_bounds(&mut state);
        state.shapes[0].cut = true;
        state.shapes[0].pos.y = -HALF_H - 10.0;
        state.combo = 2;
        watch_out_of_bounds(&mut state);
        assert_eq!(state.combo, 2);
    }
}
