//! Ray/triangle hit record.

use crate::FaceIndex;

/// Result of a ray/triangle intersection.
///
/// A transient per-query record. [`HitResult::miss`] is the starting value
/// for closest-hit searches: its distance is `+inf`, so any real hit
/// replaces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Whether the ray hit anything.
    pub hit: bool,
    /// Parameter along the ray where the hit occurs (`+inf` on a miss).
    pub distance: f64,
    /// Barycentric weight of the triangle's second vertex.
    pub u: f64,
    /// Barycentric weight of the triangle's third vertex.
    pub v: f64,
    /// Face that was hit, if any.
    pub face_index: Option<FaceIndex>,
}

impl HitResult {
    /// A record describing no hit.
    pub const fn miss() -> Self {
        Self {
            hit: false,
            distance: f64::INFINITY,
            u: 0.0,
            v: 0.0,
            face_index: None,
        }
    }

    /// A hit on `face_index` at ray parameter `distance`.
    pub fn new(distance: f64, u: f64, v: f64, face_index: FaceIndex) -> Self {
        Self {
            hit: true,
            distance,
            u,
            v,
            face_index: Some(face_index),
        }
    }

    /// Keep whichever of `self` and `other` is closer along the ray.
    pub fn closer(self, other: Self) -> Self {
        if other.hit && other.distance < self.distance {
            other
        } else {
            self
        }
    }
}

impl Default for HitResult {
    fn default() -> Self {
        Self::miss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_is_infinitely_far() {
        let miss = HitResult::miss();
        assert!(!miss.hit);
        assert_eq!(miss.distance, f64::INFINITY);
        assert_eq!(miss.face_index, None);
        assert_eq!(HitResult::default(), miss);
    }

    #[test]
    fn test_closer_keeps_nearest() {
        let far = HitResult::new(5.0, 0.1, 0.2, 3);
        let near = HitResult::new(2.0, 0.3, 0.3, 7);

        assert_eq!(HitResult::miss().closer(far).face_index, Some(3));
        assert_eq!(far.closer(near).face_index, Some(7));
        assert_eq!(near.closer(far).face_index, Some(7));
        assert_eq!(near.closer(HitResult::miss()).face_index, Some(7));
    }
}
