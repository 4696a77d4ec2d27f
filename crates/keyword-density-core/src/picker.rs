//! Candidate selection strategies.
//!
//! The optimizer and the insertion suggester choose among several valid
//! paragraph starts and synonyms. The choice is delegated to a [`Picker`]
//! owned by the caller, so analysis objects stay immutable and tests can
//! substitute a deterministic strategy.

/// Chooses one index out of `len` candidates.
pub trait Picker {
    /// Return an index in `0..len`. Only called with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform pseudo-random choice backed by [`fastrand`].
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: fastrand::Rng,
}

impl RandomPicker {
    /// Seed from the environment.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Seeded when `seed` is set, environment-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.usize(..len)
    }
}

/// Always the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl Picker for FirstPicker {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// Always the last candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastPicker;

impl Picker for LastPicker {
    fn pick(&mut self, len: usize) -> usize {
        len - 1
    }
}
