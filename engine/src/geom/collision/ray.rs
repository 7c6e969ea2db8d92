use glam::Vec2;

use crate::geom::{
    Capsule, Circle, Polygon, Ray, Raycast, Transform,
    collision::{EPSILON, closest_point_on_segment},
};

/// Origins within this fraction of the working scale of a capsule's surface count as on it. The
/// scale is the larger of the radius and the origin's largest coordinate, at least 1.
const SURFACE_TOLERANCE: f32 = 1.0e-5;

/// Cast a ray against a circle.
///
/// A ray starting inside or on the circle hits at `t == 0` with the normal pointing from the
/// center toward the origin.
///
/// A zero-length ray (direction zero) only hits when it starts inside, at `t == 0`.
pub fn ray_to_circle(ray: &Ray, circle: &Circle) -> Option<Raycast> {
    debug_assert_normalized(ray);
    let m = ray.p - circle.p;
    let c = m.length_squared() - circle.r * circle.r;
    if c <= 0.0 {
        let n = m.normalize_or_zero();
        let n = if n == Vec2::ZERO { -ray.d } else { n };
        return Some(Raycast { t: 0.0, n });
    }

    let b = m.dot(ray.d);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t <= ray.t).then(|| Raycast {
        t,
        n: (ray.at(t) - circle.p).normalize_or_zero(),
    })
}

/// Cast a ray against a capsule.
pub fn ray_to_capsule(ray: &Ray, capsule: &Capsule) -> Option<Raycast> {
    debug_assert_normalized(ray);
    let on_axis = closest_point_on_segment(ray.p, capsule.a, capsule.b);
    let offset = ray.p - on_axis;
    let scale = capsule.r.max(ray.p.abs().max_element()).max(1.0);
    if offset.length() <= capsule.r + SURFACE_TOLERANCE * scale {
        let n = offset.normalize_or_zero();
        let n = if n == Vec2::ZERO { -ray.d } else { n };
        return Some(Raycast { t: 0.0, n });
    }

    let mut best: Option<Raycast> = None;
    let mut consider = |hit: Option<Raycast>| {
        if let Some(hit) = hit {
            if best.is_none_or(|b| hit.t < b.t) {
                best = Some(hit);
            }
        }
    };

    consider(ray_to_circle(ray, &Circle::new(capsule.a, capsule.r)));
    consider(ray_to_circle(ray, &Circle::new(capsule.b, capsule.r)));

    let axis = capsule.b - capsule.a;
    let length = axis.length();
    if length > EPSILON {
        let u = axis / length;
        for n in [u.perp(), -u.perp()] {
            let denom = n.dot(ray.d);
            if denom >= 0.0 {
                continue;
            }
            // The side plane sits `r` out from the axis along `n`.
            let t = (capsule.r - n.dot(ray.p - capsule.a)) / denom;
            if !(0.0..=ray.t).contains(&t) {
                continue;
            }
            let along = u.dot(ray.at(t) - capsule.a);
            if (0.0..=length).contains(&along) {
                consider(Some(Raycast { t, n }));
            }
        }
    }

    best
}

/// Cast a ray against a polygon placed by `transform`.
///
/// Clips the ray against every face plane in the polygon's local space. An origin inside or on the
/// polygon hits at `t == 0` on the face it is closest to.
pub fn ray_to_polygon(ray: &Ray, polygon: &Polygon, transform: &Transform) -> Option<Raycast> {
    debug_assert_normalized(ray);
    let p = transform.apply_inverse(ray.p);
    let d = transform.r.apply_inverse(ray.d);
    let verts = polygon.vertices();
    let norms = polygon.normals();

    let mut lo = 0.0;
    let mut hi = ray.t;
    let mut entered = None;
    for (i, (n, v)) in norms.iter().zip(verts).enumerate() {
        let num = n.dot(*v - p);
        let den = n.dot(d);
        if den == 0.0 && num < 0.0 {
            return None;
        }
        if den < 0.0 && num < lo * den {
            lo = num / den;
            entered = Some(i);
        } else if den > 0.0 && num < hi * den {
            hi = num / den;
        }
        if hi < lo {
            return None;
        }
    }

    let (t, face) = match entered {
        Some(face) => (lo, face),
        None => {
            let face = norms
                .iter()
                .zip(verts)
                .map(|(n, v)| n.dot(p - *v))
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(0, |(i, _)| i);
            (0.0, face)
        }
    };

    Some(Raycast {
        t,
        n: transform.r.apply(norms[face]),
    })
}

/// Directions must be unit length or exactly zero.
#[inline]
fn debug_assert_normalized(ray: &Ray) {
    debug_assert!(
        ray.d == Vec2::ZERO || ray.d.is_normalized(),
        "ray direction must be normalised, got {:?}",
        ray.d
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn ray_hits_circle() {
        // Given
        let circle = Circle::new(Vec2::new(5.0, 0.0), 1.0);
        let ray = Ray::new(Vec2::ZERO, Vec2::X, 10.0);

        // When
        let hit = ray_to_circle(&ray, &circle).unwrap();

        // Then
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!(close(hit.n, -Vec2::X));
    }

    #[test]
    fn ray_misses_circle() {
        let circle = Circle::new(Vec2::new(5.0, 0.0), 1.0);

        // Pointing away, passing wide, and falling short
        assert!(ray_to_circle(&Ray::new(Vec2::ZERO, -Vec2::X, 10.0), &circle).is_none());
        assert!(ray_to_circle(&Ray::new(Vec2::new(0.0, 2.0), Vec2::X, 10.0), &circle).is_none());
        assert!(ray_to_circle(&Ray::new(Vec2::ZERO, Vec2::X, 3.5), &circle).is_none());
    }

    #[test]
    fn ray_inside_circle_hits_at_zero() {
        // When
        let hit = ray_to_circle(
            &Ray::new(Vec2::new(5.5, 0.0), Vec2::Y, 1.0),
            &Circle::new(Vec2::new(5.0, 0.0), 1.0),
        )
        .unwrap();
        let centered = ray_to_circle(
            &Ray::new(Vec2::new(5.0, 0.0), Vec2::Y, 1.0),
            &Circle::new(Vec2::new(5.0, 0.0), 1.0),
        )
        .unwrap();

        // Then
        assert_eq!(hit.t, 0.0);
        assert!(close(hit.n, Vec2::X));
        assert_eq!(centered.t, 0.0);
        assert!(close(centered.n, -Vec2::Y));
    }

    #[test]
    fn ray_hits_capsule_side_and_cap() {
        // Given
        let capsule = Capsule::new(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0);

        // When
        let down = Ray::new(Vec2::new(2.0, 5.0), -Vec2::Y, 10.0);
        let left = Ray::new(Vec2::new(8.0, 0.0), -Vec2::X, 10.0);
        let side = ray_to_capsule(&down, &capsule).unwrap();
        let cap = ray_to_capsule(&left, &capsule).unwrap();

        // Then
        assert!((side.t - 4.0).abs() < 1e-5);
        assert!(close(side.n, Vec2::Y));
        assert!((cap.t - 3.0).abs() < 1e-5);
        assert!(close(cap.n, Vec2::X));
    }

    #[test]
    fn ray_starting_on_capsule_surface() {
        // When
        let hit = ray_to_capsule(
            &Ray::new(Vec2::new(2.0, 1.0), Vec2::Y, 5.0),
            &Capsule::new(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0),
        )
        .unwrap();

        // Then
        assert_eq!(hit.t, 0.0);
        assert!(close(hit.n, Vec2::Y));
    }

    #[test]
    fn ray_starting_on_distant_capsule_surface() {
        // Given - A tilted capsule far from the origin, and a point on its side
        let capsule = Capsule::new(Vec2::new(1000.0, 1000.0), Vec2::new(1003.0, 1004.0), 0.7);
        let axis = (capsule.b - capsule.a).normalize();
        let side = axis.perp();
        let origin = capsule.a.lerp(capsule.b, 0.37) + side * capsule.r;

        // When
        let hit = ray_to_capsule(&Ray::new(origin, side, 5.0), &capsule).unwrap();

        // Then
        assert_eq!(hit.t, 0.0);
        assert!(close(hit.n, side));
    }

    #[test]
    fn zero_length_ray() {
        // Given
        let polygon = Polygon::rect(Vec2::splat(0.5)).unwrap();
        let at = Transform::new(Vec2::new(5.0, 0.0), 0.3);
        let capsule = Capsule::new(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0);
        let circle = Circle::new(Vec2::new(5.0, 0.0), 1.0);
        let inside = Vec2::new(5.1, 0.1);
        let outside = Vec2::new(-3.0, 3.0);

        // Then - Inside hits at the origin
        let ray = Ray::between(inside, inside);
        assert_eq!(ray_to_polygon(&ray, &polygon, &at).map(|h| h.t), Some(0.0));
        assert_eq!(ray_to_circle(&ray, &circle).map(|h| h.t), Some(0.0));

        // Then - Outside misses
        let ray = Ray::new(outside, Vec2::ZERO, 10.0);
        assert!(ray_to_polygon(&ray, &polygon, &at).is_none());
        assert!(ray_to_circle(&ray, &circle).is_none());
        assert!(ray_to_capsule(&ray, &capsule).is_none());
    }

    #[test]
    fn ray_misses_capsule() {
        let capsule = Capsule::new(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0);
        let ray = Ray::new(Vec2::new(-3.0, 3.0), Vec2::X, 20.0);
        assert!(ray_to_capsule(&ray, &capsule).is_none());
    }

    #[test]
    fn ray_hits_rotated_polygon() {
        // Given - A unit box turned a quarter turn at (5, 0)
        let polygon = Polygon::rect(Vec2::splat(0.5)).unwrap();
        let at = Transform::new(Vec2::new(5.0, 0.0), std::f32::consts::FRAC_PI_2);

        // When
        let hit = ray_to_polygon(&Ray::new(Vec2::ZERO, Vec2::X, 10.0), &polygon, &at).unwrap();

        // Then
        assert!((hit.t - 4.5).abs() < 1e-5);
        assert!(close(hit.n, -Vec2::X));

        // Then - A ray ending before the face misses
        let short = Ray::between(Vec2::ZERO, Vec2::new(4.0, 0.0));
        assert!(ray_to_polygon(&short, &polygon, &at).is_none());
    }

    #[test]
    fn ray_polygon_misses_and_falls_short() {
        let polygon = Polygon::rect(Vec2::splat(0.5)).unwrap();
        let at = Transform::from_translation(Vec2::new(5.0, 0.0));

        assert!(ray_to_polygon(&Ray::new(Vec2::ZERO, Vec2::X, 4.0), &polygon, &at).is_none());
        assert!(ray_to_polygon(&Ray::new(Vec2::ZERO, -Vec2::X, 10.0), &polygon, &at).is_none());
        let wide = Ray::new(Vec2::new(0.0, 1.0), Vec2::X, 10.0);
        assert!(ray_to_polygon(&wide, &polygon, &at).is_none());
    }

    #[test]
    fn ray_inside_polygon_hits_at_zero() {
        // Given - Origin nearer the right face
        let polygon = Polygon::rect(Vec2::splat(1.0)).unwrap();

        // When
        let hit = ray_to_polygon(
            &Ray::new(Vec2::new(0.8, 0.1), Vec2::Y, 3.0),
            &polygon,
            &Transform::IDENTITY,
        )
        .unwrap();

        // Then
        assert_eq!(hit.t, 0.0);
        assert!(close(hit.n, Vec2::X));
    }
}
