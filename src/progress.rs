//! Weighted progress state for one upload attempt.

/// Fractional completion per file, weighted by byte size into one percentage.
///
/// Rebuilt for every submit attempt. Each in-flight file owns exactly one
/// index, so writers never collide on a slot; the worker still wraps this in
/// a mutex so the percentage always reads a consistent snapshot.
#[derive(Debug)]
pub struct UploadProgress {
    /// Original byte size per file, fixed for the whole attempt.
    sizes: Vec<u64>,
    /// Estimated completion per file in [0, 1].
    fractions: Vec<f64>,
    /// Files whose transmit has resolved; their fraction stays pinned at 1.0.
    done: Vec<bool>,
}

impl UploadProgress {
    /// Start an attempt over files of the given sizes, all at fraction 0.
    pub fn new(sizes: Vec<u64>) -> Self {
        let n = sizes.len();
        Self {
            sizes,
            fractions: vec![0.0; n],
            done: vec![false; n],
        }
    }

    /// Update a file's estimated fraction, clamped to [0, 1].
    ///
    /// Once a file has finished its slot is pinned and later estimates are
    /// ignored, so a straggling ticker can never move progress backwards.
    pub fn set_fraction(&mut self, index: usize, fraction: f64) {
        if index >= self.fractions.len() || self.done[index] {
            return;
        }
        self.fractions[index] = fraction.clamp(0.0, 1.0);
    }

    /// Pin a file at 1.0 once its transmit resolved, success or failure.
    pub fn finish(&mut self, index: usize) {
        if index >= self.fractions.len() {
            return;
        }
        self.fractions[index] = 1.0;
        self.done[index] = true;
    }

    /// Byte-size weighted overall percentage.
    ///
    /// round(100 × Σ(fraction·size) / Σ size), rounding half away from zero,
    /// clamped to 0..=100. An attempt with zero total bytes reports 0.
    pub fn percentage(&self) -> u8 {
        let total: u64 = self.sizes.iter().sum();
        if total == 0 {
            return 0;
        }
        let weighted: f64 = self
            .fractions
            .iter()
            .zip(&self.sizes)
            .map(|(f, s)| f * *s as f64)
            .sum();
        (100.0 * weighted / total as f64).round().clamp(0.0, 100.0) as u8
    }
}
