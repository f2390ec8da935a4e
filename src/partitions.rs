//! Random partitions of an integer total into non-negative parts.
//!
//! Parts are proportional to Kumaraswamy weights, rounded, then nudged one
//! unit at a time at random positions until the sum is exact. A part is never
//! decremented below zero.

use log::debug;
use rand::distributions::Distribution;
use rand::Rng;

use crate::distributions::ShapeParams;
use crate::error::{AutotestError, AutotestResult};
use crate::scope::Scope;

/// Generator declaring `partition/loga` and `partition/logb`.
#[derive(Debug, Clone)]
pub struct PartitionGen {
    shape: ShapeParams,
}

impl PartitionGen {
    pub const PREFIX: &'static str = "partition";

    pub fn new(scope: &mut Scope) -> AutotestResult<Self> {
        Ok(Self {
            shape: ShapeParams::new(scope, Self::PREFIX)?,
        })
    }

    /// Split `total` into `n` non-negative parts summing exactly to `total`.
    pub fn generate(&self, scope: &mut Scope, n: usize, total: u64) -> AutotestResult<Vec<u64>> {
        if n == 0 {
            return if total == 0 {
                Ok(Vec::new())
            } else {
                Err(AutotestError::EmptyPartition { total })
            };
        }

        let dist = self.shape.distribution(scope)?;
        let rng = scope.random();

        let samples: Vec<f64> = (0..n).map(|_| dist.sample(&mut *rng)).collect();
        let sum: f64 = samples.iter().sum();

        // Each part is at most `total`; the running sum is kept wide enough for
        // `n` of them.
        let mut values: Vec<u64> = samples
            .iter()
            .map(|sample| ((sample * total as f64 / sum).round() as u64).min(total))
            .collect();
        let mut check_sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
        let total_wide = u128::from(total);
        debug!("Partition of {} rounded to {} before repair", total, check_sum);

        while check_sum != total_wide {
            let idx = rng.gen_range(0..n);
            if check_sum < total_wide {
                values[idx] += 1;
                check_sum += 1;
            } else if values[idx] > 0 {
                values[idx] -= 1;
                check_sum -= 1;
            }
        }
        Ok(values)
    }
}
