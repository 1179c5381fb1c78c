use crate::structs::{ClarityScore, FeaturePoint};
use std::f64::consts::PI;

impl ClarityScore {
    /// Combine center separation with the two cluster ellipse areas
    ///
    /// `binary_clarity = separation² / avg_spread`, defined as 0 when the
    /// average spread is 0.
    #[must_use]
    pub fn calculate(centers: &[FeaturePoint; 2], areas: [f64; 2]) -> Self {
        let separation = centers[0].distance(&centers[1]);
        let avg_area = (areas[0] + areas[1]) / 2.0;
        let avg_spread = if avg_area > 0.0 {
            (avg_area / PI).sqrt()
        } else {
            0.0
        };
        let binary_clarity = if avg_spread > 0.0 {
            separation * separation / avg_spread
        } else {
            0.0
        };

        Self {
            separation,
            avg_area,
            avg_spread,
            binary_clarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_clarity_formula() {
        let centers = [FeaturePoint::new(0.0, 0.0), FeaturePoint::new(3.0, 4.0)];
        // avg_area = π·4 gives avg_spread = 2
        let score = ClarityScore::calculate(&centers, [4.0 * PI, 4.0 * PI]);

        assert_abs_diff_eq!(score.separation, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(score.avg_spread, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(score.binary_clarity, 12.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_spread_gives_zero_clarity() {
        let centers = [FeaturePoint::new(0.0, 0.0), FeaturePoint::new(900.0, 0.0)];
        let score = ClarityScore::calculate(&centers, [0.0, 0.0]);

        assert_eq!(score.avg_spread, 0.0);
        assert_eq!(score.binary_clarity, 0.0);
        assert_abs_diff_eq!(score.separation, 900.0);
    }

    #[test]
    fn test_one_degenerate_cluster_counts_as_zero() {
        let centers = [FeaturePoint::new(0.0, 0.0), FeaturePoint::new(1.0, 0.0)];
        let score = ClarityScore::calculate(&centers, [8.0, 0.0]);
        assert_abs_diff_eq!(score.avg_area, 4.0);
    }

    proptest! {
        #[test]
        fn prop_clarity_non_negative(
            x0 in -1e4f64..1e4, y0 in -1e3f64..1e3,
            x1 in -1e4f64..1e4, y1 in -1e3f64..1e3,
            a0 in 0.0f64..1e8, a1 in 0.0f64..1e8
        ) {
            let centers = [FeaturePoint::new(x0, y0), FeaturePoint::new(x1, y1)];
            let score = ClarityScore::calculate(&centers, [a0, a1]);
            prop_assert!(score.binary_clarity >= 0.0);
            if score.avg_spread == 0.0 {
                prop_assert_eq!(score.binary_clarity, 0.0);
            }
        }
    }
}
