//! Shape generation for the scene
//!
//! Everything is flattened to a 2D triangle list in world units. Solids are
//! rotated on the CPU, back-face culled against the orthographic camera and
//! flat shaded; the glow shell reuses the culled back faces of a scaled copy.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::settings::{QualityPreset, Settings};
use crate::sim::hit::{rotation_matrix, tetrahedron_corners};
use crate::sim::{ExplosionParticle, GameState, Shape, ShapeKind, Slash, Stroke};

/// A triangle in model space, counter-clockwise seen from outside
pub type Triangle = [Vec3; 3];

/// Which side of a solid to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
}

const GUIDE_WIDTH: f32 = 3.0;

/// Flip any triangle whose normal points toward the origin
fn orient_outward(mut tri: Triangle) -> Triangle {
    let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
    let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
    if normal.dot(centroid) < 0.0 {
        tri.swap(1, 2);
    }
    tri
}

pub fn cube_mesh() -> Vec<Triangle> {
    let h = CUBE_HALF_EXTENT;
    let mut tris = Vec::with_capacity(12);

    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0, -1.0] {
            let n = axis * sign;
            let u = Vec3::new(axis.y, axis.z, axis.x);
            let v = n.cross(u);
            let quad = [
                (n - u - v) * h,
                (n + u - v) * h,
                (n + u + v) * h,
                (n - u + v) * h,
            ];
            tris.push(orient_outward([quad[0], quad[1], quad[2]]));
            tris.push(orient_outward([quad[0], quad[2], quad[3]]));
        }
    }
    tris
}

pub fn tetrahedron_mesh() -> Vec<Triangle> {
    let c = tetrahedron_corners();
    (0..4)
        .map(|skip| {
            let face: Vec<Vec3> = (0..4).filter(|&i| i != skip).map(|i| c[i]).collect();
            orient_outward([face[0], face[1], face[2]])
        })
        .collect()
}

/// UV sphere with `segments` around the Y axis and `rings` from pole to pole
pub fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> Vec<Triangle> {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let point = |ring: u32, seg: u32| {
        let theta = ring as f32 / rings as f32 * PI;
        let phi = seg as f32 / segments as f32 * 2.0 * PI;
        Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()) * radius
    };

    let mut tris = Vec::with_capacity((segments * rings * 2) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = point(ring, seg);
            let b = point(ring + 1, seg);
            let c = point(ring + 1, seg + 1);
            let d = point(ring, seg + 1);

            // Pole rows collapse one triangle of each quad
            if ring != rings - 1 {
                tris.push(orient_outward([a, b, c]));
            }
            if ring != 0 {
                tris.push(orient_outward([a, c, d]));
            }
        }
    }
    tris
}

/// Model-space meshes for every shape kind at one quality level
#[derive(Debug, Clone)]
pub struct MeshSet {
    cube: Vec<Triangle>,
    tetrahedron: Vec<Triangle>,
    sphere: Vec<Triangle>,
}

impl MeshSet {
    pub fn new(quality: QualityPreset) -> Self {
        let (segments, rings) = quality.sphere_segments();
        Self {
            cube: cube_mesh(),
            tetrahedron: tetrahedron_mesh(),
            sphere: sphere_mesh(SPHERE_RADIUS, segments, rings),
        }
    }

    pub fn get(&self, kind: ShapeKind) -> &[Triangle] {
        match kind {
            ShapeKind::Cube => &self.cube,
            ShapeKind::Tetrahedron => &self.tetrahedron,
            ShapeKind::Sphere | ShapeKind::Bomb => &self.sphere,
        }
    }
}

/// Directional key light plus a weaker back light
fn shade(normal: Vec3, base: [f32; 4]) -> [f32; 4] {
    let key = Vec3::new(-300.0, 500.0, 400.0).normalize();
    let back = Vec3::new(300.0, -400.0, -500.0).normalize();
    let light = 0.55 + 0.35 * normal.dot(key).max(0.0) + 0.1 * normal.dot(back).max(0.0);
    [
        (base[0] * light).min(1.0),
        (base[1] * light).min(1.0),
        (base[2] * light).min(1.0),
        base[3],
    ]
}

/// Rotate, cull and project a solid into `out`
pub fn push_solid(
    out: &mut Vec<Vertex>,
    mesh: &[Triangle],
    shape: &Shape,
    scale: f32,
    facing: Facing,
    color: [f32; 4],
    lit: bool,
) {
    let rot = rotation_matrix(shape.rotation);
    let center = shape.pos;

    for tri in mesh {
        let world = tri.map(|v| rot * (v * scale) + center);
        let normal = (world[1] - world[0]).cross(world[2] - world[0]);
        // Edge-on faces are skipped on both sides
        let keep = match facing {
            Facing::Front => normal.z > 0.0,
            Facing::Back => normal.z < 0.0,
        };
        if !keep {
            continue;
        }

        let c = if lit {
            shade(normal.normalize_or_zero(), color)
        } else {
            color
        };
        for v in world {
            out.push(Vertex::new(v.x, v.y, c));
        }
    }
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Straight quad of constant width between two points
pub fn line(p1: Vec2, p2: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (p2 - p1).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a = p1 + perp;
    let b = p1 - perp;
    let c = p2 + perp;
    let d = p2 - perp;

    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

pub fn slash(slash: &Slash) -> Vec<Vertex> {
    slash
        .triangles
        .iter()
        .map(|p| Vertex::new(p.x, p.y, colors::WHITE))
        .collect()
}

pub fn particle(p: &ExplosionParticle, segments: u32) -> Vec<Vertex> {
    circle(p.pos.truncate(), PARTICLE_RADIUS * p.scale(), colors::WHITE, segments)
}

/// Guide line shown while a stroke is held
pub fn guide(stroke: &Stroke) -> Vec<Vertex> {
    if !stroke.guide_visible {
        return Vec::new();
    }
    line(
        stroke.start,
        stroke.current,
        GUIDE_WIDTH,
        colors::with_alpha(colors::WHITE, colors::GUIDE_ALPHA),
    )
}

fn shape_color(kind: ShapeKind) -> [f32; 4] {
    if kind.is_bomb() {
        colors::BOMB
    } else {
        colors::NEON_BLUE
    }
}

/// Build the whole frame as a world-space triangle list, back to front
pub fn build_scene(state: &GameState, meshes: &MeshSet, settings: &Settings) -> Vec<Vertex> {
    let mut out = Vec::new();

    let live = state.shapes.iter().filter(|s| !s.destroyed);

    if settings.glow {
        for shape in live.clone() {
            let glow = colors::with_alpha(shape_color(shape.kind), colors::GLOW_ALPHA);
            push_solid(
                &mut out,
                meshes.get(shape.kind),
                shape,
                GLOW_SCALE,
                Facing::Back,
                glow,
                false,
            );
        }
    }

    for shape in live {
        push_solid(
            &mut out,
            meshes.get(shape.kind),
            shape,
            1.0,
            Facing::Front,
            shape_color(shape.kind),
            true,
        );
    }

    if settings.slash_trails {
        for s in &state.slashes {
            out.extend(slash(s));
        }
    }

    let segments = settings.quality.particle_segments();
    for p in state.particles.iter().take(settings.max_particles()) {
        out.extend(particle(p, segments));
    }

    if let Some(stroke) = &state.stroke {
        out.extend(guide(stroke));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward(mesh: &[Triangle]) -> bool {
        mesh.iter().all(|t| {
            let n = (t[1] - t[0]).cross(t[2] - t[0]);
            n.dot(t[0] + t[1] + t[2]) > 0.0
        })
    }

    fn test_shape(kind: ShapeKind) -> Shape {
        let mut state = GameState::new(3);
        state.spawn_shape(kind);
        let mut shape = state.shapes[0].clone();
        shape.pos = Vec3::ZERO;
        shape.rotation = Vec3::ZERO;
        shape
    }

    #[test]
    fn test_meshes_are_closed_and_outward() {
        let cube = cube_mesh();
        assert_eq!(cube.len(), 12);
        assert!(outward(&cube));

        let tetra = tetrahedron_mesh();
        assert_eq!(tetra.len(), 4);
        assert!(outward(&tetra));

        let sphere = sphere_mesh(SPHERE_RADIUS, 12, 6);
        // Two triangles per quad minus one per pole quad
        assert_eq!(sphere.len(), 12 * 6 * 2 - 2 * 12);
        assert!(outward(&sphere));
    }

    #[test]
    fn test_axis_aligned_cube_shows_one_face() {
        let shape = test_shape(ShapeKind::Cube);
        let mut out = Vec::new();
        push_solid(&mut out, &cube_mesh(), &shape, 1.0, Facing::Front, colors::WHITE, false);
        // Only the +Z face faces the camera
        assert_eq!(out.len(), 6);
        for v in &out {
            assert!(v.position[0].abs() <= CUBE_HALF_EXTENT + 1e-3);
        }

        let mut back = Vec::new();
        push_solid(&mut back, &cube_mesh(), &shape, GLOW_SCALE, Facing::Back, colors::WHITE, false);
        assert_eq!(back.len(), 6);
        let max_x = back.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_x - CUBE_HALF_EXTENT * GLOW_SCALE).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_front_and_back_partition() {
        let shape = test_shape(ShapeKind::Sphere);
        let mesh = sphere_mesh(SPHERE_RADIUS, 16, 8);
        let mut front = Vec::new();
        let mut back = Vec::new();
        push_solid(&mut front, &mesh, &shape, 1.0, Facing::Front, colors::WHITE, true);
        push_solid(&mut back, &mesh, &shape, 1.0, Facing::Back, colors::WHITE, false);
        assert!(!front.is_empty());
        assert!(front.len() + back.len() <= mesh.len() * 3);
    }

    #[test]
    fn test_guide_hidden_after_leave() {
        let stroke = Stroke {
            start: Vec2::ZERO,
            current: Vec2::new(100.0, 0.0),
            guide_visible: false,
        };
        assert!(guide(&stroke).is_empty());

        let stroke = Stroke {
            guide_visible: true,
            ..stroke
        };
        let quad = guide(&stroke);
        assert_eq!(quad.len(), 6);
        assert_eq!(quad[0].color[3], colors::GUIDE_ALPHA);
        assert!((quad[0].position[1] - GUIDE_WIDTH / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_scene_respects_settings() {
        let mut state = GameState::new(9);
        state.spawn_shape(ShapeKind::Cube);
        for s in &mut state.shapes {
            s.pos = Vec3::ZERO;
        }
        state.spawn_explosion(Vec3::ZERO);
        let meshes = MeshSet::new(QualityPreset::Low);

        let full = build_scene(&state, &meshes, &Settings::default());
        let bare = build_scene(
            &state,
            &meshes,
            &Settings {
                glow: false,
                particles: false,
                ..Settings::default()
            },
        );
        assert!(bare.len() < full.len());
        assert_eq!(full.len() % 3, 0);
        assert_eq!(bare.len() % 3, 0);
    }

    #[test]
    fn test_destroyed_shapes_not_drawn() {
        let mut state = GameState::new(9);
        state.spawn_shape(ShapeKind::Sphere);
        state.shapes[0].destroyed = true;
        let meshes = MeshSet::new(QualityPreset::Low);
        assert!(build_scene(&state, &meshes, &Settings::default()).is_empty());
    }
}
