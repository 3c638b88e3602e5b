//! Silhouette hit testing for cut samples
//!
//! The camera is orthographic and looks down -Z, so a sample point hits a
//! shape exactly when it lies inside the shape's projection onto the XY plane.
//! Polyhedra project to convex polygons (the hull of their rotated corners);
//! spheres project to circles. The glow shell is part of the hit volume.

use glam::{EulerRot, Mat3, Vec2, Vec3};

use super::state::{Shape, ShapeKind};
use crate::consts::*;

/// Corner positions of a unit-scale shape, before rotation
pub fn corners(kind: ShapeKind) -> Vec<Vec3> {
    match kind {
        ShapeKind::Cube => {
            let h = CUBE_HALF_EXTENT;
            let mut pts = Vec::with_capacity(8);
            for &x in &[-h, h] {
                for &y in &[-h, h] {
                    for &z in &[-h, h] {
                        pts.push(Vec3::new(x, y, z));
                    }
                }
            }
            pts
        }
        ShapeKind::Tetrahedron => tetrahedron_corners().to_vec(),
        ShapeKind::Sphere | ShapeKind::Bomb => Vec::new(),
    }
}

/// Regular tetrahedron inscribed in a sphere of `TETRA_RADIUS`
pub fn tetrahedron_corners() -> [Vec3; 4] {
    [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ]
    .map(|v| v.normalize() * TETRA_RADIUS)
}

/// Rotation matrix for a shape's Euler angles
#[inline]
pub fn rotation_matrix(rotation: Vec3) -> Mat3 {
    Mat3::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// 2D footprint of a shape on the cutting plane
#[derive(Debug, Clone, PartialEq)]
pub enum Silhouette {
    Circle { center: Vec2, radius: f32 },
    /// Convex polygon, counter-clockwise
    Polygon { hull: Vec<Vec2>, bound_center: Vec2, bound_radius: f32 },
}

impl Silhouette {
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Silhouette::Circle { center, radius } => p.distance_squared(*center) <= radius * radius,
            Silhouette::Polygon {
                hull,
                bound_center,
                bound_radius,
            } => {
                if p.distance_squared(*bound_center) > bound_radius * bound_radius {
                    return false;
                }
                convex_contains(hull, p)
            }
        }
    }
}

/// Build the silhouette of a shape in its current pose
pub fn silhouette(shape: &Shape) -> Silhouette {
    let center = shape.pos2();
    match shape.kind {
        ShapeKind::Sphere | ShapeKind::Bomb => Silhouette::Circle {
            center,
            radius: SPHERE_RADIUS * GLOW_SCALE,
        },
        ShapeKind::Cube | ShapeKind::Tetrahedron => {
            let rot = rotation_matrix(shape.rotation);
            let projected: Vec<Vec2> = corners(shape.kind)
                .into_iter()
                .map(|c| center + (rot * (c * GLOW_SCALE)).truncate())
                .collect();
            let bound_radius = projected
                .iter()
                .map(|p| p.distance(center))
                .fold(0.0_f32, f32::max);
            Silhouette::Polygon {
                hull: convex_hull(&projected),
                bound_center: center,
                bound_radius,
            }
        }
    }
}

/// Whether a sample point hits the shape
pub fn shape_contains_point(shape: &Shape, p: Vec2) -> bool {
    silhouette(shape).contains(p)
}

#[inline]
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

/// Convex hull (Andrew's monotone chain), counter-clockwise, no collinear points
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Vec2> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    // Last point of each chain is the first of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Point inside (or on the edge of) a counter-clockwise convex polygon
pub fn convex_contains(hull: &[Vec2], p: Vec2) -> bool {
    if hull.len() < 3 {
        return false;
    }
    (0..hull.len()).all(|i| {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        cross(a, b, p) >= -1e-3
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;
    use proptest::prelude::*;

    fn shape_at(kind: ShapeKind, pos: Vec2, rotation: Vec3) -> Shape {
        let mut state = GameState::new(1);
        state.spawn_shape(kind);
        let mut shape = state.shapes.remove(0);
        shape.pos = pos.extend(0.0);
        shape.rotation = rotation;
        shape
    }

    #[test]
    fn test_hull_of_square_with_interior_point() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.5),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Vec2::new(0.5, 0.5)));
        assert!(convex_contains(&hull, Vec2::new(0.5, 0.5)));
        assert!(convex_contains(&hull, Vec2::new(1.0, 0.5)));
        assert!(!convex_contains(&hull, Vec2::new(1.1, 0.5)));
    }

    #[test]
    fn test_degenerate_hull_contains_nothing() {
        let hull = convex_hull(&[Vec2::ZERO, Vec2::X]);
        assert!(!convex_contains(&hull, Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn test_axis_aligned_cube_footprint() {
        let cube = shape_at(ShapeKind::Cube, Vec2::new(100.0, 50.0), Vec3::ZERO);
        let half = CUBE_HALF_EXTENT * GLOW_SCALE;
        assert!(shape_contains_point(&cube, Vec2::new(100.0, 50.0)));
        assert!(shape_contains_point(&cube, Vec2::new(100.0 + half - 0.5, 50.0 + half - 0.5)));
        assert!(!shape_contains_point(&cube, Vec2::new(100.0 + half + 1.0, 50.0)));
    }

    #[test]
    fn test_rotated_cube_reaches_further_on_diagonal() {
        // Rotated 45° around Z the corners point along the axes
        let cube = shape_at(
            ShapeKind::Cube,
            Vec2::ZERO,
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_4),
        );
        let half = CUBE_HALF_EXTENT * GLOW_SCALE;
        let corner_reach = half * std::f32::consts::SQRT_2;
        assert!(shape_contains_point(&cube, Vec2::new(corner_reach - 1.0, 0.0)));
        assert!(!shape_contains_point(&cube, Vec2::new(half, half)));
    }

    #[test]
    fn test_sphere_and_bomb_are_circles() {
        for kind in [ShapeKind::Sphere, ShapeKind::Bomb] {
            let s = shape_at(kind, Vec2::new(-200.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
            let r = SPHERE_RADIUS * GLOW_SCALE;
            assert!(shape_contains_point(&s, Vec2::new(-200.0 + r - 0.1, 0.0)));
            assert!(!shape_contains_point(&s, Vec2::new(-200.0 + r + 0.1, 0.0)));
        }
    }

    #[test]
    fn test_tetrahedron_corners_on_circumsphere() {
        for c in tetrahedron_corners() {
            assert!((c.length() - TETRA_RADIUS).abs() < 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_silhouette_contains_center(
            rx in -6.3f32..6.3, ry in -6.3f32..6.3, rz in -6.3f32..6.3,
            x in -600.0f32..600.0, y in -300.0f32..300.0,
        ) {
            for kind in [ShapeKind::Cube, ShapeKind::Tetrahedron, ShapeKind::Sphere] {
                let s = shape_at(kind, Vec2::new(x, y), Vec3::new(rx, ry, rz));
                prop_assert!(shape_contains_point(&s, Vec2::new(x, y)));
            }
        }

        #[test]
        fn prop_silhouette_within_circumscribed_circle(
            rx in -6.3f32..6.3, ry in -6.3f32..6.3, rz in -6.3f32..6.3,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let cube = shape_at(ShapeKind::Cube, Vec2::ZERO, Vec3::new(rx, ry, rz));
            let outer = CUBE_HALF_EXTENT * GLOW_SCALE * 3.0_f32.sqrt() + 1.0;
            let far = Vec2::new(angle.cos(), angle.sin()) * outer;
            prop_assert!(!shape_contains_point(&cube, far));
        }
    }
}
