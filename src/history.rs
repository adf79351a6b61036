//! Fixed-capacity sample history with strided reads

/// Circular history of the last `N` samples
///
/// Writes go through an explicit cursor; reads visit every `stride`-th
/// slot walking back from the newest entry, so a 12-slot history read at
/// stride 2 yields six evenly spaced samples including the latest one.
#[derive(Debug, Clone, Copy)]
pub struct SampleHistory<T: Copy + Default, const N: usize> {
    slots: [T; N],
    cursor: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> SampleHistory<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            cursor: 0,
            len: 0,
        }
    }

    /// Overwrite the oldest slot with `sample`
    pub fn push(&mut self, sample: T) {
        self.slots[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of slots written so far, saturating at `N`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterate over every `stride`-th written sample, newest first
    pub fn strided(&self, stride: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.len)
            .step_by(stride.max(1))
            .map(move |back| self.slots[(self.cursor + N - 1 - back) % N])
    }
}

impl<T: Copy + Default, const N: usize> Default for SampleHistory<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
