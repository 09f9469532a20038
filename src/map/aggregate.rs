//! Aggregates over a map's samples.
//!
//! Every aggregate walks entries in buffer order and samples in emission
//! order, so results are deterministic for identical buffers. `sum` and
//! `mean` accumulate in f64 before narrowing; results are f32. An empty map
//! yields NaN (`sum` yields 0 and `count` 0), never an error.

use super::header::Header;
use super::Map;
use crate::array;

impl Map {
    /// First sample of the first non-empty entry; NaN for an empty map.
    pub fn first(&self) -> f32 {
        self.samples().next().unwrap_or(f32::NAN)
    }

    /// Last sample of the last non-empty entry; NaN for an empty map.
    pub fn last(&self) -> f32 {
        self.samples().last().unwrap_or(f32::NAN)
    }

    /// Sum of all samples; 0.0 for an empty map.
    pub fn sum(&self) -> f32 {
        self.samples().fold(0f64, |acc, v| acc + f64::from(v)) as f32
    }

    /// Smallest sample; NaN when there are none.
    pub fn min(&self) -> f32 {
        let mut result = f32::INFINITY;
        let mut any = false;
        for v in self.samples() {
            any = true;
            if v < result {
                result = v;
            }
        }
        if any {
            result
        } else {
            f32::NAN
        }
    }

    /// Largest sample; NaN when there are none.
    pub fn max(&self) -> f32 {
        let mut result = f32::NEG_INFINITY;
        let mut any = false;
        for v in self.samples() {
            any = true;
            if v > result {
                result = v;
            }
        }
        if any {
            result
        } else {
            f32::NAN
        }
    }

    /// Arithmetic mean; NaN when there are no samples.
    pub fn mean(&self) -> f32 {
        let mut sum = 0f64;
        let mut count = 0u64;
        for v in self.samples() {
            sum += f64::from(v);
            count += 1;
        }
        if count == 0 {
            return f32::NAN;
        }
        (sum / count as f64) as f32
    }

    /// Σ(x − mean)² with f64 accumulation.
    pub fn sum_of_squares(&self, mean: f32) -> f32 {
        self.samples()
            .fold(0f64, |acc, v| {
                let d = f64::from(v - mean);
                acc + d * d
            }) as f32
    }

    /// Population standard deviation; NaN when there are no samples.
    pub fn stddev(&self) -> f32 {
        let mut sum = 0f64;
        let mut count = 0u64;
        for v in self.samples() {
            sum += f64::from(v);
            count += 1;
        }
        if count == 0 {
            return f32::NAN;
        }
        let mean = (sum / count as f64) as f32;
        (f64::from(self.sum_of_squares(mean)) / count as f64).sqrt() as f32
    }

    /// Total sample count, as a float.
    pub fn count(&self) -> f32 {
        self.entries().map(|e| e.len()).sum::<usize>() as f32
    }

    /// Percentile with linear interpolation between the closest ranks.
    ///
    /// Returns NaN when the map is empty or `p` is NaN or outside
    /// `0.0..=100.0`.
    ///
    /// This drains the map: the sample words are compacted over the headers
    /// inside the map's own buffer, sorted there, and the map is left empty.
    /// Clone the map first if it is needed afterwards.
    pub fn percentile(&mut self, p: f32) -> f32 {
        if self.is_empty() || p.is_nan() || !(0.0..=100.0).contains(&p) {
            return f32::NAN;
        }
        let mut words = core::mem::take(&mut self.words);

        // Slide each entry's sample words down over its header; what is left
        // is the bare sample multiset, reusing the same allocation.
        let mut write = 0;
        let mut read = 0;
        while read < words.len() {
            let header = Header::decode(&words[read..]);
            read += header.words();
            let len = header.len();
            words.copy_within(read..read + len, write);
            write += len;
            read += len;
        }
        words.truncate(write);
        if words.is_empty() {
            return f32::NAN;
        }

        array::sort_bits(&mut words);

        let rank = (words.len() - 1) as f32 * p / 100.0;
        let lower = rank.floor();
        let idx = lower as usize;
        if rank.ceil() == lower {
            f32::from_bits(words[idx])
        } else {
            let lo = f32::from_bits(words[idx]);
            let hi = f32::from_bits(words[idx + 1]);
            lo + (rank - lower) * (hi - lo)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Array;

    fn sample_map() -> Map {
        let mut map = Map::new();
        map.append(10, &Array::from_values(&[0.0, 10.0, 20.0]));
        map.append(13, &Array::from_values(&[5.5, -8.0, 14.5]));
        map
    }

    #[test]
    fn aggregates_over_two_entries() {
        let map = sample_map();
        assert_eq!(map.first(), 0.0);
        assert_eq!(map.last(), 14.5);
        assert_eq!(map.sum(), 42.0);
        assert_eq!(map.min(), -8.0);
        assert_eq!(map.max(), 20.0);
        assert_eq!(map.mean(), 7.0);
        assert!((map.stddev() - 9.224_062_7).abs() < 1e-6);
        assert_eq!(map.count(), 6.0);
    }

    #[test]
    fn empty_map_aggregates() {
        let map = Map::new();
        assert!(map.first().is_nan());
        assert!(map.last().is_nan());
        assert_eq!(map.sum(), 0.0);
        assert!(map.min().is_nan());
        assert!(map.max().is_nan());
        assert!(map.mean().is_nan());
        assert!(map.stddev().is_nan());
        assert_eq!(map.count(), 0.0);
    }

    #[test]
    fn sum_of_squares_about_the_mean() {
        let map = sample_map();
        assert_eq!(map.sum_of_squares(7.0), 510.5);
    }

    #[test]
    fn percentile_interpolates() {
        // sorted samples: -8, 0, 5.5, 10, 14.5, 20
        assert_eq!(sample_map().percentile(0.0), -8.0);
        assert_eq!(sample_map().percentile(40.0), 5.5);
        assert_eq!(sample_map().percentile(50.0), 7.75);
        assert_eq!(sample_map().percentile(75.0), 13.375);
        assert_eq!(sample_map().percentile(90.0), 17.25);
        assert_eq!(sample_map().percentile(100.0), 20.0);
    }

    #[test]
    fn percentile_rejects_out_of_range_ranks() {
        assert!(sample_map().percentile(-10.0).is_nan());
        assert!(sample_map().percentile(100.1).is_nan());
        assert!(sample_map().percentile(f32::NAN).is_nan());
        assert!(Map::new().percentile(50.0).is_nan());
    }

    #[test]
    fn percentile_drains_the_map() {
        let mut map = sample_map();
        map.percentile(50.0);
        assert!(map.is_empty());
    }

    #[test]
    fn percentile_on_invalid_rank_leaves_the_map_intact() {
        let mut map = sample_map();
        map.percentile(-1.0);
        assert_eq!(map.count(), 6.0);
    }

    #[test]
    fn percentile_matches_extrema() {
        let mut map = Map::new();
        let mut array = Array::new();
        for i in (1..=1000).rev() {
            array.push(i as f32);
        }
        map.append(10, &array);
        let p99 = map.percentile(99.0);
        assert!((p99 - 990.01).abs() < 1e-4);
    }
}
