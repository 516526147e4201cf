//! Comprehensive tests for the statistics library
//!
//! Property-based tests and edge cases for the sample reductions.

use super::*;
use proptest::collection::vec;
use proptest::prelude::*;

/// Property-based test generators
mod generators {
    use super::*;

    /// Latency-like or throughput-like sample values
    pub fn positive_floats() -> impl Strategy<Value = f64> {
        0.001f64..1_000_000.0
    }

    /// Non-empty sample sequences
    pub fn number_vectors() -> impl Strategy<Value = Vec<f64>> {
        vec(positive_floats(), 1..500)
    }
}

mod property_tests {
    use super::*;

    proptest! {
        /// Mean should always be between min and max
        #[test]
        fn mean_between_min_max(numbers in generators::number_vectors()) {
            let mean = mean(&numbers).unwrap();
            let min = min(&numbers).unwrap();
            let max = max(&numbers).unwrap();

            // Allow for floating point accumulation error
            let tolerance = 1e-9 * max.abs().max(1.0);
            prop_assert!(mean >= min - tolerance);
            prop_assert!(mean <= max + tolerance);
        }

        /// Median does not depend on the order samples arrived in
        #[test]
        fn median_is_permutation_invariant(numbers in generators::number_vectors()) {
            let mut reversed = numbers.clone();
            reversed.reverse();
            let mut rotated = numbers.clone();
            rotated.rotate_left(numbers.len() / 2);

            let expected = median(&numbers).unwrap();
            prop_assert_eq!(median(&reversed).unwrap(), expected);
            prop_assert_eq!(median(&rotated).unwrap(), expected);
        }

        /// The 0th and 100th percentiles are the extremes
        #[test]
        fn percentile_endpoints_are_extremes(numbers in generators::number_vectors()) {
            prop_assert_eq!(percentile(&numbers, 0.0).unwrap(), min(&numbers).unwrap());
            prop_assert_eq!(percentile(&numbers, 1.0).unwrap(), max(&numbers).unwrap());
        }

        /// Percentiles never decrease as p grows
        #[test]
        fn percentile_is_monotonic(numbers in generators::number_vectors(), a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let lower = percentile(&numbers, low).unwrap();
            let upper = percentile(&numbers, high).unwrap();
            prop_assert!(lower <= upper + 1e-9 * upper.abs().max(1.0));
        }

        /// Jitter is non-negative and bounded by the sample range
        #[test]
        fn jitter_bounded_by_range(numbers in generators::number_vectors()) {
            let jitter = jitter(&numbers).unwrap();
            let range = max(&numbers).unwrap() - min(&numbers).unwrap();

            prop_assert!(jitter >= 0.0);
            prop_assert!(jitter <= range + 1e-9 * range.max(1.0));
        }

        /// One second transfers need no unit conversion beyond bits per megabit
        #[test]
        fn mbps_at_one_second(bytes in 1u64..10_000_000_000) {
            prop_assert_eq!(mbps_from_bytes_and_millis(bytes, 1000.0), bytes as f64 * 8.0 / 1e6);
        }

        /// Any positive duration yields positive throughput
        #[test]
        fn mbps_positive_for_positive_duration(bytes in 1u64..10_000_000_000, millis in 0.001f64..1_000_000.0) {
            prop_assert!(mbps_from_bytes_and_millis(bytes, millis) > 0.0);
        }
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn test_constant_samples() {
        let values = vec![7.5; 20];
        assert_eq!(mean(&values).unwrap(), 7.5);
        assert_eq!(median(&values).unwrap(), 7.5);
        assert_eq!(percentile(&values, 0.9).unwrap(), 7.5);
        assert_eq!(jitter(&values).unwrap(), 0.0);
    }

    #[test]
    fn test_two_samples() {
        let values = [10.0, 20.0];
        assert_eq!(median(&values).unwrap(), 15.0);
        assert_eq!(percentile(&values, 0.9).unwrap(), 19.0);
        assert_eq!(jitter(&values).unwrap(), 10.0);
    }

    #[test]
    fn test_zero_samples_are_kept() {
        // zero-duration throughput samples land at 0.0 and still count
        let values = [0.0, 0.0, 100.0, 200.0];
        assert_eq!(mean(&values).unwrap(), 75.0);
        assert_eq!(median(&values).unwrap(), 50.0);
    }

    #[test]
    fn test_nan_sorts_last() {
        let values = [3.0, f64::NAN, 1.0];
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(median(&values).unwrap(), 3.0);
    }
}
