//! Read-only dataset access consumed by the panel binder and plot driver.

use crate::coords::Coordinates;
use crate::error::Result;

/// A (possibly ensemble) forecast from one model.
///
/// Values are indexed `[member][lead_time][point]`. Implementations must be
/// safe to read from several threads at once because panels are fetched in
/// parallel.
pub trait ForecastSource: Send + Sync {
    /// Number of ensemble members held by the dataset.
    fn num_members(&self) -> usize;

    /// Number of lead time steps held by the dataset.
    fn num_lead_times(&self) -> usize;

    fn coordinates(&self) -> &Coordinates;

    /// Field values for one member at one lead time step.
    fn select(&self, field: &str, member: usize, lead_time: usize) -> Result<Vec<f32>>;

    /// Whether `field` is present in the dataset.
    fn has_field(&self, field: &str) -> bool;

    fn regular(&self) -> bool {
        self.coordinates().regular()
    }

    /// Average over the member axis at one lead time step. NaN in any member
    /// propagates to the mean at that point.
    fn ensemble_mean(&self, field: &str, lead_time: usize) -> Result<Vec<f32>> {
        let members = self.num_members();
        let mut sum = self.select(field, 0, lead_time)?;
        for member in 1..members {
            let values = self.select(field, member, lead_time)?;
            for (acc, v) in sum.iter_mut().zip(values) {
                *acc += v;
            }
        }
        let n = members.max(1) as f32;
        for acc in sum.iter_mut() {
            *acc /= n;
        }
        Ok(sum)
    }
}

/// Reference data (analysis or observations) for a single run, indexed only
/// by lead time step.
pub trait ReferenceSource: Send + Sync {
    fn num_lead_times(&self) -> usize;

    fn coordinates(&self) -> &Coordinates;

    fn select(&self, field: &str, lead_time: usize) -> Result<Vec<f32>>;

    fn has_field(&self, field: &str) -> bool;

    fn regular(&self) -> bool {
        self.coordinates().regular()
    }
}
