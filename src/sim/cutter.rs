//! Pointer-driven cutter
//!
//! A stroke starts on pointer down, follows the pointer with a guide line, and
//! cuts on pointer up. The cut leaves a tapered ribbon on screen and tests a
//! grid of sample points along the stroke against every live shape.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::hit::silhouette;
use super::scoring::register_cut;
use super::state::{GamePhase, GameState, Shape, Slash, Stroke};
use crate::consts::*;

/// Pointer input in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed over the canvas
    Down(Vec2),
    Move(Vec2),
    /// Pointer left the canvas; the stroke stays armed but the guide hides
    Leave,
    /// Primary button released (anywhere)
    Up(Vec2),
}

/// Feed one pointer event through the stroke state machine
pub fn handle_pointer(state: &mut GameState, event: PointerEvent) {
    match event {
        PointerEvent::Down(p) => {
            if state.phase != GamePhase::Playing || state.is_frozen() {
                return;
            }
            state.stroke = Some(Stroke {
                start: p,
                current: p,
                guide_visible: true,
            });
        }
        PointerEvent::Move(p) => {
            if let Some(stroke) = state.stroke.as_mut() {
                if stroke.guide_visible {
                    stroke.current = p;
                }
            }
        }
        PointerEvent::Leave => {
            if let Some(stroke) = state.stroke.as_mut() {
                stroke.guide_visible = false;
            }
        }
        PointerEvent::Up(end) => {
            let Some(stroke) = state.stroke.take() else {
                return;
            };
            if stroke.start.distance(end) > state.tuning.min_stroke_length {
                apply_cut(state, stroke.start, end);
            }
        }
    }
}

/// Cut along `p1 -> p2`: leave a slash, collect hit shapes, score them.
/// Returns the number of shapes cut.
pub fn apply_cut(state: &mut GameState, p1: Vec2, p2: Vec2) -> usize {
    let triangles = build_ribbon(p1, p2, &mut state.rng);
    state.slashes.push(Slash {
        triangles,
        ttl: SLASH_TTL,
    });

    let samples = sample_stroke(p1, p2);
    let hits = collect_hits(&state.shapes, &samples);
    if hits.is_empty() {
        return 0;
    }

    log::debug!("Cut from {:?} to {:?} hit {} shape(s)", p1, p2, hits.len());
    register_cut(state, &hits);
    hits.len()
}

/// Unit direction of a stroke and its left-hand perpendicular
fn stroke_frame(p1: Vec2, p2: Vec2) -> (Vec2, Vec2) {
    let dir = (p2 - p1).normalize_or_zero();
    (dir, dir.perp())
}

/// Width of the ribbon at `t` along the stroke (0 at both ends, max in the middle)
#[inline]
pub fn ribbon_width(t: f32) -> f32 {
    RIBBON_MAX_WIDTH * (4.0 * t * (1.0 - t)).max(0.0)
}

/// Tapered ribbon along the stroke, two triangles per segment.
/// The leading edge of every segment is jittered for a hand-drawn look.
pub fn build_ribbon(p1: Vec2, p2: Vec2, rng: &mut Pcg32) -> Vec<Vec2> {
    let (_, perp) = stroke_frame(p1, p2);
    let half_noise = RIBBON_NOISE / 2.0;
    let mut tris = Vec::with_capacity(RIBBON_SEGMENTS * 6);

    for i in 0..RIBBON_SEGMENTS {
        let t0 = i as f32 / RIBBON_SEGMENTS as f32;
        let t1 = (i + 1) as f32 / RIBBON_SEGMENTS as f32;

        let w0 = ribbon_width(t0) / 2.0;
        let w1 = ribbon_width(t1) / 2.0;

        let noise = Vec2::new(
            rng.random_range(-half_noise..half_noise),
            rng.random_range(-half_noise..half_noise),
        );
        let center = p1.lerp(p2, t0) + noise;
        let next = p1.lerp(p2, t1);

        let v1 = center + perp * w0;
        let v2 = center - perp * w0;
        let v3 = next + perp * w1;
        let v4 = next - perp * w1;

        tris.extend_from_slice(&[v1, v2, v3, v2, v4, v3]);
    }

    tris
}

/// Sample grid along the stroke: `SAMPLES_ALONG + 1` stations, each with
/// `SAMPLES_ACROSS` points spread over the ribbon's full width
pub fn sample_stroke(p1: Vec2, p2: Vec2) -> Vec<Vec2> {
    let (_, perp) = stroke_frame(p1, p2);
    let half_width = RIBBON_MAX_WIDTH * 0.5;
    let mid = (SAMPLES_ACROSS / 2) as f32;
    let spread = mid.max(1.0);

    let mut samples = Vec::with_capacity((SAMPLES_ALONG + 1) * SAMPLES_ACROSS);
    for i in 0..=SAMPLES_ALONG {
        let center = p1.lerp(p2, i as f32 / SAMPLES_ALONG as f32);
        for a in 0..SAMPLES_ACROSS {
            let offset = (a as f32 - mid) / spread * half_width;
            samples.push(center + perp * offset);
        }
    }
    samples
}

/// Indices of uncut shapes touched by any sample, in shape order
pub fn collect_hits(shapes: &[Shape], samples: &[Vec2]) -> Vec<usize> {
    shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.cut)
        .filter(|(_, s)| {
            let footprint = silhouette(s);
            samples.iter().any(|&p| footprint.contains(p))
        })
        .map(|(i, _)| i)
        .collect()
}
