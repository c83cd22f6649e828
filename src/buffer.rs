use crate::{
    level::Levels,
    util::{
        find_first_backward, find_first_forward, find_last_backward, find_last_forward,
        rotate_range, Less, Range,
    },
};

/// Records a run of `count` distinct values pulled out of the pair `range` to serve as an
/// internal buffer.
///
/// The values are moved from around `from` to the edge `to`, which is either the start of the
/// pair (A side) or its end (B side).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pull {
    pub from: usize,
    pub to: usize,
    pub count: usize,
    pub range: Range,
}

impl Pull {
    fn pulled_left(&self) -> bool {
        self.from > self.to
    }

    fn pulled_right(&self) -> bool {
        self.from < self.to
    }
}

/// Holds the state of the internal buffers of one merge level
#[derive(Clone, Copy, Debug, Default)]
pub struct Buffers {
    /// Tags the A blocks. Never empty once found.
    pub first: Range,

    /// Scratch space for local merges. Empty if not enough distinct values exist.
    pub second: Range,

    pub pulls: [Pull; 2],
}

impl Buffers {
    /// Search the pairs of the current level for two buffers of `buffer_size` distinct values.
    ///
    /// If the blocks fit into a cache of `cache_len` elements the second buffer is not needed.
    /// If no pair has enough distinct values the largest run found becomes the first buffer.
    pub unsafe fn find<T, F: Less<T>>(
        s: *mut T,
        levels: &mut Levels,
        buffer_size: usize,
        block_size: usize,
        cache_len: usize,
        less: &mut F,
    ) -> Self {
        let mut buffers = Self::default();
        let mut pull_index = 0;

        // Try to find both buffers at once in a single subarray
        let mut find = 2 * buffer_size;
        let mut find_separately = false;

        if block_size <= cache_len {
            find = buffer_size;
        } else if find > levels.length() {
            find = buffer_size;
            find_separately = true;
        }

        levels.begin();

        while let Some((a, b)) = levels.next_pair() {
            let range = Range::new(a.start, b.end);

            // Count distinct values from the start of A
            let (mut last, mut count) = (a.start, 1);

            while count < find {
                let rest = Range::new(last + 1, a.end);
                let index = find_last_forward(s, s.add(last), rest, less, find - count);

                if index == a.end {
                    break;
                }

                (last, count) = (index, count + 1);
            }

            let pull = Pull {
                from: last,
                to: a.start,
                count,
                range,
            };

            if count >= buffer_size {
                buffers.pulls[pull_index] = pull;
                pull_index = 1;

                if count == 2 * buffer_size {
                    buffers.first = Range::new(a.start, a.start + buffer_size);
                    buffers.second = Range::new(a.start + buffer_size, a.start + count);
                    break;
                } else if find == 2 * buffer_size {
                    // Still need a separate second buffer
                    buffers.first = Range::new(a.start, a.start + count);
                    find = buffer_size;
                } else if block_size <= cache_len {
                    buffers.first = Range::new(a.start, a.start + count);
                    break;
                } else if find_separately {
                    buffers.first = Range::new(a.start, a.start + count);
                    find_separately = false;
                } else {
                    buffers.second = Range::new(a.start, a.start + count);
                    break;
                }
            } else if pull_index == 0 && count > buffers.first.len() {
                buffers.first = Range::new(a.start, a.start + count);
                buffers.pulls[0] = pull;
            }

            // Count distinct values from the end of B
            let (mut last, mut count) = (b.end - 1, 1);

            while count < find {
                let rest = Range::new(b.start, last);
                let index = find_first_backward(s, s.add(last), rest, less, find - count);

                if index == b.start {
                    break;
                }

                (last, count) = (index - 1, count + 1);
            }

            let pull = Pull {
                from: last,
                to: b.end,
                count,
                range,
            };

            if count >= buffer_size {
                buffers.pulls[pull_index] = pull;
                pull_index = 1;

                if count == 2 * buffer_size {
                    buffers.first = Range::new(b.end - count, b.end - buffer_size);
                    buffers.second = Range::new(b.end - buffer_size, b.end);
                    break;
                } else if find == 2 * buffer_size {
                    buffers.first = Range::new(b.end - count, b.end);
                    find = buffer_size;
                } else if block_size <= cache_len {
                    buffers.first = Range::new(b.end - count, b.end);
                    break;
                } else if find_separately {
                    buffers.first = Range::new(b.end - count, b.end);
                    find_separately = false;
                } else {
                    // The first buffer's A side must stop redistributing before this one
                    if buffers.pulls[0].range.start == a.start {
                        buffers.pulls[0].range.end -= buffers.pulls[1].count;
                    }

                    buffers.second = Range::new(b.end - count, b.end);
                    break;
                }
            } else if pull_index == 0 && count > buffers.first.len() {
                buffers.first = Range::new(b.end - count, b.end);
                buffers.pulls[0] = pull;
            }
        }

        buffers
    }

    /// Gather the recorded distinct values at the edges of their pairs.
    pub unsafe fn pull_out<T, F: Less<T>>(&mut self, s: *mut T, less: &mut F) {
        for pull in &mut self.pulls {
            let length = pull.count;

            if pull.pulled_left() {
                let mut index = pull.from;

                for count in 1..length {
                    assert!(index > pull.to, "Ord violated");

                    let range = Range::new(pull.to, pull.from - (count - 1));
                    index = find_first_backward(s, s.add(index - 1), range, less, length - count);

                    let range = Range::new(index + 1, pull.from + 1);
                    rotate_range(s, range.len().wrapping_sub(count), range);
                    pull.from = index + count;
                }
            } else if pull.pulled_right() {
                let mut index = pull.from + 1;

                for count in 1..length {
                    assert!(index < pull.to, "Ord violated");

                    let range = Range::new(index, pull.to);
                    index = find_last_forward(s, s.add(index), range, less, length - count);

                    let range = Range::new(pull.from, index - 1);
                    rotate_range(s, count, range);
                    pull.from = index - 1 - count;
                }
            }
        }
    }

    /// Shrink the pair `a`, `b` starting at `start` by any buffer pulled into it.
    ///
    /// Return `false` if one side is left empty, in which case there is nothing to merge.
    pub fn trim(&self, start: usize, a: &mut Range, b: &mut Range) -> bool {
        for pull in &self.pulls {
            if start != pull.range.start {
                continue;
            }

            if pull.pulled_left() {
                a.start += pull.count;

                if a.is_empty() {
                    return false;
                }
            } else if pull.pulled_right() {
                b.end -= pull.count;

                if b.is_empty() {
                    return false;
                }
            }
        }

        true
    }

    /// Move the buffer values back to their sorted positions. Requires both buffers sorted.
    pub unsafe fn redistribute<T, F: Less<T>>(&self, s: *mut T, less: &mut F) {
        for pull in &self.pulls {
            let mut unique = pull.count * 2;

            if pull.pulled_left() {
                let mut buffer = Range::new(pull.range.start, pull.range.start + pull.count);

                while !buffer.is_empty() {
                    let range = Range::new(buffer.end, pull.range.end);
                    let index = find_first_forward(s, s.add(buffer.start), range, less, unique);

                    let amount = index - buffer.end;
                    rotate_range(s, buffer.len(), Range::new(buffer.start, index));

                    buffer.start += amount + 1;
                    buffer.end += amount;
                    unique -= 2;
                }
            } else if pull.pulled_right() {
                let mut buffer = Range::new(pull.range.end - pull.count, pull.range.end);

                while !buffer.is_empty() {
                    let range = Range::new(pull.range.start, buffer.start);
                    let index = find_last_backward(s, s.add(buffer.end - 1), range, less, unique);

                    let amount = buffer.start - index;
                    rotate_range(s, amount, Range::new(index, buffer.end));

                    buffer.start -= amount;
                    buffer.end -= amount + 1;
                    unique -= 2;
                }
            }
        }
    }
}
