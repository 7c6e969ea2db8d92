use std::cmp::Ordering;

use glam::Vec2;

use crate::geom::{
    Polygon, Transform,
    collision::{Manifold, clip_to_edge},
};

/// Collide two convex polygons placed by their transforms.
///
/// Separating axis test over the face normals of both polygons. On overlap, the face of least
/// penetration becomes the reference face, the most anti-parallel face of the other polygon is
/// clipped to the reference face's side planes, and every clipped point behind the reference face
/// becomes a contact (at most two).
///
/// The reference face depends only on the two placed shapes, never on which is passed first, so
/// swapping the arguments yields the same contacts with the normal reversed.
pub fn polygon_to_polygon(a: &Polygon, ax: &Transform, b: &Polygon, bx: &Transform) -> Manifold {
    debug_assert!(
        a.len() >= 3 && b.len() >= 3,
        "polygons need at least 3 vertices"
    );
    let a = a.transformed(ax);
    let b = b.transformed(bx);

    let (face_a, sep_a) = max_separation(&a, &b);
    if sep_a > 0.0 {
        return Manifold::NONE;
    }
    let (face_b, sep_b) = max_separation(&b, &a);
    if sep_b > 0.0 {
        return Manifold::NONE;
    }

    let flip = match sep_b.total_cmp(&sep_a) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => precedes(b.normals()[face_b], a.normals()[face_a]),
    };
    let (reference, face, incident) = if flip {
        (&b, face_b, &a)
    } else {
        (&a, face_a, &b)
    };

    let n = reference.normals()[face];
    let v1 = reference.vertices()[face];
    let v2 = reference.vertices()[(face + 1) % reference.len()];

    let k = incident_face(incident, n);
    let mut segment = [
        incident.vertices()[k],
        incident.vertices()[(k + 1) % incident.len()],
    ];
    if !clip_to_edge(&mut segment, v1, v2) {
        return Manifold::NONE;
    }

    // The reference normal points out of the reference polygon; B toward A is its reverse when A
    // is the reference.
    let mut manifold = Manifold::with_normal(if flip { n } else { -n });
    let offset = n.dot(v1);
    for point in segment {
        let depth = offset - n.dot(point);
        if depth >= 0.0 {
            manifold.push(point, depth);
        }
    }

    if manifold.count == 0 {
        Manifold::NONE
    } else {
        manifold
    }
}

/// Collide two unrotated polygons placed at `a_pos` and `b_pos`.
pub fn intersect_polygons(a: &Polygon, a_pos: Vec2, b: &Polygon, b_pos: Vec2) -> Manifold {
    polygon_to_polygon(
        a,
        &Transform::from_translation(a_pos),
        b,
        &Transform::from_translation(b_pos),
    )
}

/// The face of `a` along whose normal `b` is furthest out, and that separation. Both polygons are
/// in the same space. Negative separation means overlap along every face of `a`.
fn max_separation(a: &Polygon, b: &Polygon) -> (usize, f32) {
    let mut best = (0, f32::MIN);
    for (i, (n, v)) in a.normals().iter().zip(a.vertices()).enumerate() {
        let separation = b
            .vertices()
            .iter()
            .map(|w| n.dot(*w - *v))
            .fold(f32::MAX, f32::min);
        if separation > best.1 {
            best = (i, separation);
        }
    }
    best
}

/// Tie-break between two candidate reference normals: lower `x` first, then lower `y`.
fn precedes(n: Vec2, m: Vec2) -> bool {
    n.x.total_cmp(&m.x).then(n.y.total_cmp(&m.y)) == Ordering::Less
}

/// The face of `polygon` whose normal is most opposed to `n`.
fn incident_face(polygon: &Polygon, n: Vec2) -> usize {
    let mut best = (0, f32::MAX);
    for (i, normal) in polygon.normals().iter().enumerate() {
        let d = normal.dot(n);
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0
}
