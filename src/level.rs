use crate::util::Range;

/// Walks the ranges of one level of the bottom-up merge sort.
///
/// Only power-of-two sizes divide evenly, so the iterator scales the level down to the largest
/// power of two not above `size` and spreads the remainder with a running fraction. Every
/// level tiles `0..size` exactly with ranges whose lengths differ by at most one.
#[derive(Clone, Copy, Debug)]
pub struct Levels {
    size: usize,
    decimal: usize,
    numerator: usize,
    denominator: usize,
    decimal_step: usize,
    numerator_step: usize,
}

impl Levels {
    /// Start at the level whose ranges hold between `min_level` and `2 * min_level - 1`
    /// elements. Requires `size >= min_level > 0`.
    pub fn new(size: usize, min_level: usize) -> Self {
        let power_of_two = 1 << size.ilog2();
        let denominator = power_of_two / min_level;

        Self {
            size,
            decimal: 0,
            numerator: 0,
            denominator,
            decimal_step: size / denominator,
            numerator_step: size % denominator,
        }
    }

    /// Restart the current level.
    pub fn begin(&mut self) {
        self.decimal = 0;
        self.numerator = 0;
    }

    pub fn finished(&self) -> bool {
        self.decimal >= self.size
    }

    pub fn next_range(&mut self) -> Range {
        let start = self.decimal;

        self.decimal += self.decimal_step;
        self.numerator += self.numerator_step;

        if self.numerator >= self.denominator {
            self.numerator -= self.denominator;
            self.decimal += 1;
        }

        Range::new(start, self.decimal)
    }

    /// Return the next two adjacent ranges of this level.
    pub fn next_pair(&mut self) -> Option<(Range, Range)> {
        Some((self.next()?, self.next()?))
    }

    /// Double the range length. Return `false` once a single range would cover everything.
    pub fn next_level(&mut self) -> bool {
        self.decimal_step += self.decimal_step;
        self.numerator_step += self.numerator_step;

        if self.numerator_step >= self.denominator {
            self.numerator_step -= self.denominator;
            self.decimal_step += 1;
        }

        self.decimal_step < self.size
    }

    /// Length of the shorter ranges of this level; the others are one longer.
    pub fn length(&self) -> usize {
        self.decimal_step
    }
}

impl Iterator for Levels {
    type Item = Range;

    fn next(&mut self) -> Option<Range> {
        (!self.finished()).then(|| self.next_range())
    }
}
