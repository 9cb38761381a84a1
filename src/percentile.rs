//! Percentile-window heuristic for compressing high-precision samples into
//! a displayable range.
//!
//! [`percentile_range`] returns the stored samples nearest to the 10th and
//! 90th percentile *positions* of the value range. It is a nearest-sample
//! pick, not an interpolated percentile, and on equal distances the first
//! sample in buffer order wins.

use alloc::vec::Vec;

/// Numeric sample type the normalizer can scan.
pub trait Sample: Copy + PartialOrd + Default + Into<f64> {}

impl<T: Copy + PartialOrd + Default + Into<f64>> Sample for T {}

const LOW: f64 = 0.1;
const HIGH: f64 = 0.9;

/// Pick the samples nearest the 10th and 90th percentile positions.
///
/// Returns `(0, 0)` for an empty buffer or a buffer of identical values.
pub fn percentile_range<T: Sample>(samples: &[T]) -> (T, T) {
    let Some((&first, rest)) = samples.split_first() else {
        return (T::default(), T::default());
    };

    let mut lo = first;
    let mut hi = first;
    for &v in rest {
        if v > hi {
            hi = v;
        }
        if v < lo {
            lo = v;
        }
    }

    let min: f64 = lo.into();
    let range = hi.into() - min;
    if range == 0.0 {
        return (T::default(), T::default());
    }

    let mut out = (first, first);
    let mut closest_low = f64::MAX;
    let mut closest_high = f64::MAX;
    for &v in samples {
        let p = (v.into() - min) / range;
        let d_low = distance(p, LOW);
        let d_high = distance(p, HIGH);
        if d_low < closest_low {
            out.0 = v;
            closest_low = d_low;
        }
        if d_high < closest_high {
            out.1 = v;
            closest_high = d_high;
        }
    }
    out
}

fn distance(a: f64, b: f64) -> f64 {
    if a > b { a - b } else { b - a }
}

/// Map samples linearly from `lo..=hi` onto `0..=255`, clamping outside values.
///
/// A degenerate window (`hi <= lo`) maps everything to 0.
pub fn normalize_to_gray8<T: Sample>(samples: &[T], lo: T, hi: T) -> Vec<u8> {
    let lo: f64 = lo.into();
    let hi: f64 = hi.into();
    let span = hi - lo;
    samples
        .iter()
        .map(|&v| {
            if span <= 0.0 {
                return 0;
            }
            let t = ((v.into() - lo) / span).clamp(0.0, 1.0);
            (t * 255.0 + 0.5) as u8
        })
        .collect()
}
