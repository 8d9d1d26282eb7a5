use rand::Rng;

use crate::MatrixError;

/// Half-open interval `[low, high)` used for random initialization and mutation.
///
/// A degenerate range (`low == high`) is allowed and always samples `low`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueRange {
    pub low: f32,
    pub high: f32,
}

impl ValueRange {
    #[must_use]
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Checks that both bounds are finite, `low <= high` and the width `high - low`
    /// is itself finite.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.low <= self.high && (self.high - self.low).is_finite() {
            Ok(())
        } else {
            Err(MatrixError::InvalidRange {
                low: self.low,
                high: self.high,
            })
        }
    }

    /// Returns `true` if `value` lies within `[low, high]`.
    ///
    /// The upper bound is inclusive because floating point sampling may round up to it.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        self.low <= value && value <= self.high
    }

    /// Draws a value uniformly from the range.
    pub fn sample<R>(&self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        if self.low < self.high {
            rng.random_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

/// Combines one gene from each parent into an offspring gene.
///
/// `roll` is a uniform draw from `[0, 1)` made by the caller for this gene:
///
/// - `roll < mutation_rate`: a fresh gene sampled from `range` (mutation)
/// - `roll < 0.5 + mutation_rate / 2`: `element` (first parent)
/// - otherwise: `other` (second parent)
///
/// Each parent is therefore inherited with probability `(1 - mutation_rate) / 2`.
///
/// # Examples
///
/// ```
/// use neuroflap_nn::{ValueRange, crossover_gene};
///
/// let mut rng = rand::rng();
/// let range = ValueRange::new(-1.0, 1.0);
/// assert_eq!(crossover_gene(0.5, 0.8, 0.3, 0.2, range, &mut rng), 0.5);
/// assert_eq!(crossover_gene(0.5, 0.8, 0.9, 0.2, range, &mut rng), 0.8);
/// ```
pub fn crossover_gene<R>(
    element: f32,
    other: f32,
    roll: f32,
    mutation_rate: f32,
    range: ValueRange,
    rng: &mut R,
) -> f32
where
    R: Rng + ?Sized,
{
    if roll < mutation_rate {
        range.sample(rng)
    } else if roll < 0.5 + mutation_rate / 2.0 {
        element
    } else {
        other
    }
}
