use glam::Vec2;

/// An axis-aligned bounding box. `min` is component-wise less than or equal to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box spanning two corners given in any order.
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box centered on `center` extending `half_extents` each way.
    #[inline]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        }))
    }

    /// Whether the boxes share any point, edges included.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Whether `point` lies inside or on the box.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The box grown by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Whether both corners are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_and_containment() {
        // Given
        let a = Aabb::new(Vec2::new(1.0, 1.0), Vec2::ZERO);
        let b = Aabb::from_center(Vec2::new(1.5, 0.5), Vec2::splat(0.5));
        let c = Aabb::from_center(Vec2::new(5.0, 5.0), Vec2::ONE);

        // Then
        assert_eq!(a.min, Vec2::ZERO);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(a.contains(Vec2::new(1.0, 0.5)));
        assert!(!a.contains(Vec2::new(1.1, 0.5)));
    }

    #[test]
    fn from_points_and_union() {
        // Given
        let points = [Vec2::new(-1.0, 2.0), Vec2::new(3.0, -4.0), Vec2::ZERO];

        // When
        let bounds = Aabb::from_points(points).unwrap();
        let merged = bounds.union(&Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::ONE));

        // Then
        assert_eq!(bounds, Aabb::new(Vec2::new(-1.0, -4.0), Vec2::new(3.0, 2.0)));
        assert_eq!(merged.max, Vec2::new(11.0, 2.0));
        assert_eq!(bounds.center(), Vec2::new(1.0, -1.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
