//! Interval jitter, so cards learned together do not stay due together.
//!
//! Fuzz only moves a Review interval inside a band around the computed one.
//! The band grows with the interval: 15% of the part between 2.5 and 7 days,
//! 10% between 7 and 20, 5% above that, plus one day.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BANDS: [(f64, f64, f64); 3] = [(2.5, 7.0, 0.15), (7.0, 20.0, 0.1), (20.0, f64::INFINITY, 0.05)];

/// Intervals shorter than this are never fuzzed.
pub const MIN_FUZZ_INTERVAL: f64 = 2.5;

/// Inclusive bounds, in days, that a fuzzed `interval` may land in.
pub fn fuzz_range(interval: f64, maximum_interval: u32) -> (u32, u32) {
    let delta = BANDS.iter().fold(1.0, |delta, &(start, end, factor)| {
        delta + factor * (interval.min(end) - start).max(0.0)
    });
    let max_ivl = (interval + delta).round().min(maximum_interval as f64) as u32;
    let min_ivl = ((interval - delta).round().max(2.0) as u32).min(max_ivl);
    (min_ivl, max_ivl)
}

/// Applies fuzz to a rounded and clamped interval.
pub fn fuzz_interval<R: Rng + ?Sized>(interval: u32, maximum_interval: u32, rng: &mut R) -> u32 {
    if (interval as f64) < MIN_FUZZ_INTERVAL {
        return interval;
    }
    let (min_ivl, max_ivl) = fuzz_range(interval as f64, maximum_interval);
    rng.random_range(min_ivl..=max_ivl)
}

/// Seed for a review's fuzz: the review time in milliseconds, the prior rep
/// count and the bits of the prior stability (0 for a new card), each xored
/// into the running value and passed through the splitmix64 finalizer.
/// Stored states are replayed with this, so it must never change.
pub fn review_seed(reviewed_at: DateTime<Utc>, reps: u32, stability: Option<f64>) -> u64 {
    [
        reviewed_at.timestamp_millis() as u64,
        u64::from(reps),
        stability.map_or(0, f64::to_bits),
    ]
    .into_iter()
    .fold(0, |acc, word| splitmix64(acc ^ word))
}

/// A generator seeded from the review itself, so the same review always
/// fuzzes the same way. ChaCha8 has a stable output stream across releases.
pub fn review_rng(reviewed_at: DateTime<Utc>, reps: u32, stability: Option<f64>) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(review_seed(reviewed_at, reps, stability))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;

    #[test]
    fn short_intervals_untouched() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(fuzz_interval(1, 36500, &mut rng), 1);
        assert_eq!(fuzz_interval(2, 36500, &mut rng), 2);
    }

    #[test]
    fn range_grows_with_interval() {
        assert_eq!(fuzz_range(3.0, 36500), (2, 4));
        let (lo, hi) = fuzz_range(100.0, 36500);
        assert!(lo < 100 && hi > 100);
        let (lo_small, hi_small) = fuzz_range(10.0, 36500);
        assert!(hi_small - lo_small < hi - lo);
    }

    #[test]
    fn range_respects_maximum() {
        let (lo, hi) = fuzz_range(100.0, 100);
        assert_eq!(hi, 100);
        assert!(lo <= hi);
    }

    #[test]
    fn fuzz_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for interval in [3, 8, 25, 400, 36500] {
            let (lo, hi) = fuzz_range(interval as f64, 36500);
            for _ in 0..50 {
                let fuzzed = fuzz_interval(interval, 36500, &mut rng);
                assert!((lo..=hi).contains(&fuzzed), "{fuzzed} outside {lo}..={hi}");
            }
        }
    }

    #[test]
    fn review_seed_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap();
        let a = fuzz_interval(40, 36500, &mut review_rng(at, 3, Some(12.5)));
        let b = fuzz_interval(40, 36500, &mut review_rng(at, 3, Some(12.5)));
        assert_eq!(a, b);
    }

    #[test]
    fn splitmix64_reference_output() {
        assert_eq!(splitmix64(0), 0xE220_A839_7B1D_CDAF);
    }

    #[test]
    fn review_seed_is_pinned() {
        let at = Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap();
        assert_eq!(at.timestamp_millis(), 1_746_360_000_000);
        assert_eq!(review_seed(at, 3, Some(12.5)), 0xBB10_E273_D87A_E363);
        assert_eq!(review_seed(at, 0, None), 0xB316_6346_1310_D38B);
    }
}
