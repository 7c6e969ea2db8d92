//! Pairs involving circles and capsules.
//!
//! Each pair reduces to the closest features of the two shapes: a point against a point for
//! circles, a point or segment against a segment for capsules. Contacts between two round shapes
//! sit halfway through the overlap; contacts against a polygon sit on the polygon's surface.

use glam::Vec2;

use crate::geom::{
    Capsule, Circle, Polygon, Transform,
    collision::{
        EPSILON, Manifold, PARALLEL_TOLERANCE, clip_to_edge, closest_point_on_segment,
        closest_points_between_segments,
    },
};

/// Collide two circles. Concentric circles separate along +Y.
pub fn circle_to_circle(a: &Circle, b: &Circle) -> Manifold {
    let d = a.p - b.p;
    let r = a.r + b.r;
    let dist_sq = d.length_squared();
    if dist_sq > r * r {
        return Manifold::NONE;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON { d / dist } else { Vec2::Y };
    round_contact(b.p, b.r, normal, r - dist)
}

/// Collide a circle with a capsule.
pub fn circle_to_capsule(a: &Circle, b: &Capsule) -> Manifold {
    let axis_point = closest_point_on_segment(a.p, b.a, b.b);
    circle_to_circle(a, &Circle::new(axis_point, b.r))
}

/// Collide two capsules.
///
/// Parallel capsules whose axes overlap produce one contact at each end of the overlap.
/// Otherwise the closest points of the two axes give a single contact.
pub fn capsule_to_capsule(a: &Capsule, b: &Capsule) -> Manifold {
    let da = a.b - a.a;
    let db = b.b - b.a;
    let len_a = da.length();
    let len_b = db.length();
    let r = a.r + b.r;

    if len_a > EPSILON
        && len_b > EPSILON
        && da.perp_dot(db).abs() <= PARALLEL_TOLERANCE * len_a * len_b
    {
        let u = da / len_a;
        let along_0 = u.dot(b.a - a.a);
        let along_1 = u.dot(b.b - a.a);
        let lo = along_0.min(along_1).max(0.0);
        let hi = along_0.max(along_1).min(len_a);

        if hi - lo > EPSILON {
            let rel = a.a - b.a;
            let offset = rel - u * u.dot(rel);
            let dist = offset.length();
            if dist > r {
                return Manifold::NONE;
            }
            let normal = if dist > EPSILON {
                offset / dist
            } else {
                u.perp()
            };
            let depth = r - dist;
            let mut manifold = Manifold::with_normal(normal);
            for along in [lo, hi] {
                let on_a = a.a + u * along;
                manifold.push(on_a - normal * (a.r - depth * 0.5), depth);
            }
            return manifold;
        }
    }

    let (on_a, on_b) = closest_points_between_segments(a.a, a.b, b.a, b.b);
    let d = on_a - on_b;
    let dist_sq = d.length_squared();
    if dist_sq > r * r {
        return Manifold::NONE;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON {
        d / dist
    } else {
        // Crossing axes: push A off B's axis toward A's midpoint.
        let side = db.perp().normalize_or_zero();
        let toward = (a.a + a.b) * 0.5 - on_b;
        match side.dot(toward) {
            s if side == Vec2::ZERO || s == 0.0 => Vec2::Y,
            s if s < 0.0 => -side,
            _ => side,
        }
    };
    round_contact(on_b, b.r, normal, r - dist)
}

/// Collide a circle with a polygon placed by `bx`.
///
/// A center inside the polygon, or exactly on its boundary, is pushed out through the face of
/// least penetration. Outside, the nearest vertex or edge decides the normal.
pub fn circle_to_polygon(a: &Circle, b: &Polygon, bx: &Transform) -> Manifold {
    debug_assert!(b.len() >= 3, "polygons need at least 3 vertices");
    let center = bx.apply_inverse(a.p);
    let verts = b.vertices();
    let norms = b.normals();

    let mut face = 0;
    let mut separation = f32::MIN;
    for (i, (n, v)) in norms.iter().zip(verts).enumerate() {
        let s = n.dot(center - *v);
        if s > a.r {
            return Manifold::NONE;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let n = norms[face];
    if separation <= 0.0 {
        return Manifold::single(n, center - n * separation, a.r - separation).to_world(bx);
    }

    let v1 = verts[face];
    let v2 = verts[(face + 1) % verts.len()];
    let u1 = (center - v1).dot(v2 - v1);
    let u2 = (center - v2).dot(v1 - v2);

    let manifold = if u1 <= 0.0 || u2 <= 0.0 {
        let corner = if u1 <= 0.0 { v1 } else { v2 };
        let d = center - corner;
        let dist_sq = d.length_squared();
        if dist_sq > a.r * a.r {
            return Manifold::NONE;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > EPSILON { d / dist } else { n };
        Manifold::single(normal, corner, a.r - dist)
    } else {
        Manifold::single(n, center - n * separation, a.r - separation)
    };
    manifold.to_world(bx)
}

/// Collide a capsule with a polygon placed by `bx`.
///
/// A capsule resting flat against a face yields two contacts. When the capsule axis reaches into
/// the polygon, the axis of least penetration among the polygon faces and the capsule side decides
/// the normal.
pub fn capsule_to_polygon(a: &Capsule, b: &Polygon, bx: &Transform) -> Manifold {
    debug_assert!(b.len() >= 3, "polygons need at least 3 vertices");
    let start = bx.apply_inverse(a.a);
    let end = bx.apply_inverse(a.b);
    let verts = b.vertices();
    let norms = b.normals();
    let count = verts.len();

    let inside = |p: Vec2| norms.iter().zip(verts).all(|(n, v)| n.dot(p - *v) <= 0.0);

    let mut nearest = (f32::MAX, 0, Vec2::ZERO, Vec2::ZERO);
    for i in 0..count {
        let (on_axis, on_poly) =
            closest_points_between_segments(start, end, verts[i], verts[(i + 1) % count]);
        let dist_sq = (on_axis - on_poly).length_squared();
        if dist_sq < nearest.0 {
            nearest = (dist_sq, i, on_axis, on_poly);
        }
    }

    let (dist_sq, edge, on_axis, on_poly) = nearest;
    let deep = inside(start) || inside(end) || dist_sq <= EPSILON * EPSILON;
    let manifold = if deep {
        deep_capsule_contact(start, end, a.r, b)
    } else {
        if dist_sq > a.r * a.r {
            return Manifold::NONE;
        }
        let dist = dist_sq.sqrt();
        let normal = (on_axis - on_poly) / dist;
        flat_face_contacts(start, end, a.r, b, edge, normal)
            .unwrap_or_else(|| Manifold::single(normal, on_poly, a.r - dist))
    };
    manifold.to_world(bx)
}

/// Both contacts of a capsule lying parallel to, and facing, polygon edge `face`.
fn flat_face_contacts(
    start: Vec2,
    end: Vec2,
    r: f32,
    polygon: &Polygon,
    face: usize,
    normal: Vec2,
) -> Option<Manifold> {
    let n = polygon.normals()[face];
    let axis = end - start;
    let length = axis.length();
    if length <= EPSILON
        || n.dot(normal) < 1.0 - PARALLEL_TOLERANCE
        || n.dot(axis).abs() > PARALLEL_TOLERANCE * length
    {
        return None;
    }
    face_contacts(start, end, r, polygon, face)
}

/// Clip the capsule axis to the side planes of `face` and emit every end within `r` of the face.
fn face_contacts(start: Vec2, end: Vec2, r: f32, polygon: &Polygon, face: usize) -> Option<Manifold> {
    let n = polygon.normals()[face];
    let v1 = polygon.vertices()[face];
    let v2 = polygon.vertices()[(face + 1) % polygon.len()];

    let mut segment = [start, end];
    if !clip_to_edge(&mut segment, v1, v2) {
        return None;
    }

    let mut manifold = Manifold::with_normal(n);
    for point in segment {
        let height = n.dot(point - v1);
        let depth = r - height;
        if depth >= 0.0 {
            manifold.push(point - n * height, depth);
        }
    }
    (manifold.count > 0).then_some(manifold)
}

/// Separating axis test between a polygon and a capsule whose axis reaches into it.
fn deep_capsule_contact(start: Vec2, end: Vec2, r: f32, polygon: &Polygon) -> Manifold {
    let verts = polygon.vertices();
    let norms = polygon.normals();

    // Polygon faces: how far the capsule sits beyond each face plane.
    let mut best_face = 0;
    let mut best = f32::MIN;
    for (i, (n, v)) in norms.iter().zip(verts).enumerate() {
        let separation = n.dot(start - *v).min(n.dot(end - *v)) - r;
        if separation > best {
            best = separation;
            best_face = i;
        }
    }

    // Capsule side: both orientations of the axis perpendicular.
    let mut side_axis = None;
    let side = (end - start).perp().normalize_or_zero();
    if side != Vec2::ZERO {
        for n in [side, -side] {
            let polygon_max = verts.iter().map(|v| n.dot(*v)).fold(f32::MIN, f32::max);
            let separation = n.dot(start) - r - polygon_max;
            if separation > best {
                best = separation;
                side_axis = Some(n);
            }
        }
    }

    let depth = -best;
    match side_axis {
        Some(n) => {
            let deepest = verts
                .iter()
                .copied()
                .max_by(|x, y| n.dot(*x).total_cmp(&n.dot(*y)))
                .unwrap_or(start);
            Manifold::single(n, deepest, depth)
        }
        None => face_contacts(start, end, r, polygon, best_face).unwrap_or_else(|| {
            let n = norms[best_face];
            let v = verts[best_face];
            let lowest = if n.dot(start) <= n.dot(end) { start } else { end };
            Manifold::single(n, lowest - n * n.dot(lowest - v), depth)
        }),
    }
}

/// One contact between round surfaces: `normal` points toward A, `depth` is the overlap and the
/// contact sits halfway through it, measured from B's surface at `b_center + normal * b_radius`.
fn round_contact(b_center: Vec2, b_radius: f32, normal: Vec2, depth: f32) -> Manifold {
    Manifold::single(normal, b_center + normal * (b_radius - depth * 0.5), depth)
}
