use core::ptr;

/// A trait alias for comparators
pub trait Less<T>: FnMut(&T, &T) -> bool {}
impl<T, F: FnMut(&T, &T) -> bool> Less<T> for F {}

/// A half-open range of indices `start..end` into the array being sorted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Represents a hole created when moving an element into stack space
pub struct Hole<T> {
    /// Pointer to the position of the hole in memory
    pub pos: *mut T,

    // Pointer to the value that should be dropped back into the hole
    src: *const T,
}

impl<T> Hole<T> {
    /// Create a new hole at position `pos` with value pointed to by `src`.
    pub const unsafe fn new(pos: *mut T, src: *const T) -> Self {
        Self { pos, src }
    }
}

impl<T> Drop for Hole<T> {
    fn drop(&mut self) {
        unsafe {
            self.pos.write(self.src.read());
        }
    }
}

/// A run of `len` array slots starting at `dst` whose values currently live in the cache at
/// `src`. The slots themselves hold stale copies.
///
/// Dropping the gap moves the cached values back into the slots, so a panicking comparator
/// never leaves an element duplicated or lost.
pub struct Gap<T> {
    pub src: *const T,
    pub dst: *mut T,
    pub len: usize,
}

impl<T> Gap<T> {
    pub const fn empty() -> Self {
        Self {
            src: ptr::null(),
            dst: ptr::null_mut(),
            len: 0,
        }
    }

    /// Move the `len` values at `dst` into `cache`, which must not overlap them.
    pub unsafe fn open(cache: *mut T, dst: *mut T, len: usize) -> Self {
        ptr::copy_nonoverlapping(dst, cache, len);
        Self { src: cache, dst, len }
    }

    /// Move the values back into the slots, closing the gap.
    pub unsafe fn close(&mut self) {
        ptr::copy_nonoverlapping(self.src, self.dst, self.len);
        self.len = 0;
    }
}

impl<T> Drop for Gap<T> {
    fn drop(&mut self) {
        if self.len > 0 {
            unsafe { self.close() }
        }
    }
}

/// Return the number of elements `r` is offset by from `l`, assuming `r >= l`.
pub unsafe fn ptr_sub<T>(r: *const T, l: *const T) -> usize {
    core::hint::assert_unchecked(l <= r);
    r.offset_from(l) as usize
}

/// Return `b` if `is_b` or `a` otherwise.
#[inline(always)]
pub fn conditional<T: Copy>(a: T, b: T, is_b: bool) -> T {
    [a, b][is_b as usize]
}

/// Shift the element at `s` to the left by `cnt` elements.
pub unsafe fn insert_left<T>(s: *mut T, cnt: usize) {
    let tmp = s.read();
    ptr::copy(s.sub(cnt), s.add(1).sub(cnt), cnt);
    s.sub(cnt).write(tmp);
}

/// Shift the element at `s` to the right by `cnt` elements.
pub unsafe fn insert_right<T>(s: *mut T, cnt: usize) {
    let tmp = s.read();
    ptr::copy(s.add(1), s, cnt);
    s.add(cnt).write(tmp);
}

/// Exchange the regions `s..n1` and `s + n1..s + n1 + n2` in-place.
pub unsafe fn rotate<T>(mut s: *mut T, mut n1: usize, mut n2: usize) {
    while n1 > 1 && n2 > 1 {
        if n1 > n2 {
            ptr::swap_nonoverlapping(s.add(n1 - n2), s.add(n1), n2);
            n1 -= n2;
        } else {
            ptr::swap_nonoverlapping(s, s.add(n1), n1);
            n2 -= n1;
            s = s.add(n1);
        }
    }

    if n1 == 1 {
        insert_right(s, n2);
    } else if n2 == 1 {
        insert_left(s.add(n1), n1);
    }
}

/// Rotate `range` left by `amount`, so `[0 1 2 3]` rotated by 1 becomes `[1 2 3 0]`.
///
/// Panics instead of touching memory outside `range` when `amount` was derived from an
/// inconsistent comparator.
pub unsafe fn rotate_range<T>(s: *mut T, amount: usize, range: Range) {
    if range.start > range.end || amount > range.len() {
        panic!("Ord violated");
    }

    rotate(s.add(range.start), amount, range.len() - amount);
}

/// Swap the `cnt` elements starting at index `i` with those starting at index `j`.
pub unsafe fn block_swap<T>(s: *mut T, i: usize, j: usize, cnt: usize) {
    if i != j {
        ptr::swap_nonoverlapping(s.add(i), s.add(j), cnt);
    }
}

/// Return the value `i` in `0..=n` such that for all `j` in `0..i`, `f(j)` and for all `j` in
/// `i..n`, `!f(j)`. The caller guarantees `f` is partitioned in such a manner.
fn lower_bound(mut n: usize, mut f: impl FnMut(usize) -> bool) -> usize {
    let mut i = 0;

    while n > 0 {
        let h = n / 2;
        i += conditional(0, n - h, f(i + h));
        n = h;
    }

    i
}

/// Return the number of elements in the region `s..s + n` which are `less` than `val`.
pub unsafe fn search_left<T, F: Less<T>>(
    s: *const T,
    n: usize,
    val: *const T,
    less: &mut F,
) -> usize {
    lower_bound(n, |x| less(&*s.add(x), &*val))
}

/// Return the number of elements in the region `s..s + n` which `val` is not `less` than.
pub unsafe fn search_right<T, F: Less<T>>(
    s: *const T,
    n: usize,
    val: *const T,
    less: &mut F,
) -> usize {
    lower_bound(n, |x| !less(&*val, &*s.add(x)))
}

/// Return the index of the first element of `range` that is not `less` than `val`.
pub unsafe fn binary_first<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
) -> usize {
    range.start + search_left(s.add(range.start), range.len(), val, less)
}

/// Return the index of the first element of `range` that `val` is `less` than.
pub unsafe fn binary_last<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
) -> usize {
    range.start + search_right(s.add(range.start), range.len(), val, less)
}

// The hybrid searches below step linearly through `range` in strides sized by the number of
// distinct values still expected, then finish with a binary search inside one stride. When the
// caller knows roughly how many distinct values remain this beats a plain binary search.

/// Like [`binary_first`], scanning `range` from the left.
pub unsafe fn find_first_forward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = usize::max(range.len() / unique, 1);
    let mut index = range.start + skip;

    while less(&*s.add(index - 1), &*val) {
        if index >= range.end - skip {
            return binary_first(s, val, Range::new(index, range.end), less);
        }

        index += skip;
    }

    binary_first(s, val, Range::new(index - skip, index), less)
}

/// Like [`binary_last`], scanning `range` from the left.
pub unsafe fn find_last_forward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = usize::max(range.len() / unique, 1);
    let mut index = range.start + skip;

    while !less(&*val, &*s.add(index - 1)) {
        if index >= range.end - skip {
            return binary_last(s, val, Range::new(index, range.end), less);
        }

        index += skip;
    }

    binary_last(s, val, Range::new(index - skip, index), less)
}

/// Like [`binary_first`], scanning `range` from the right.
pub unsafe fn find_first_backward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = usize::max(range.len() / unique, 1);
    let mut index = range.end - skip;

    while index > range.start && !less(&*s.add(index - 1), &*val) {
        if index < range.start + skip {
            return binary_first(s, val, Range::new(range.start, index), less);
        }

        index -= skip;
    }

    binary_first(s, val, Range::new(index, index + skip), less)
}

/// Like [`binary_last`], scanning `range` from the right.
pub unsafe fn find_last_backward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = usize::max(range.len() / unique, 1);
    let mut index = range.end - skip;

    while index > range.start && less(&*val, &*s.add(index - 1)) {
        if index < range.start + skip {
            return binary_last(s, val, Range::new(range.start, index), less);
        }

        index -= skip;
    }

    binary_last(s, val, Range::new(index, index + skip), less)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn less(a: &i32, b: &i32) -> bool {
        a < b
    }

    #[test]
    fn rotate_range_moves_prefix_to_back() {
        let mut v = [0, 1, 2, 3, 4, 5, 6];
        unsafe { rotate_range(v.as_mut_ptr(), 2, Range::new(1, 6)) };
        assert_eq!(v, [0, 3, 4, 5, 1, 2, 6]);

        unsafe { rotate_range(v.as_mut_ptr(), 0, Range::new(0, 7)) };
        assert_eq!(v, [0, 3, 4, 5, 1, 2, 6]);
    }

    #[test]
    #[should_panic(expected = "Ord violated")]
    fn rotate_range_rejects_oversized_amount() {
        let mut v = [0, 1, 2];
        unsafe { rotate_range(v.as_mut_ptr(), 3, Range::new(1, 3)) };
    }

    #[test]
    fn hybrid_searches_agree_with_binary_searches() {
        let v = [0, 0, 1, 1, 1, 2, 4, 4, 5, 7, 7, 7, 7, 9];
        let s = v.as_ptr();
        let full = Range::new(0, v.len());

        for val in -1..11 {
            for unique in 1..6 {
                for start in 0..v.len() {
                    let range = Range::new(start, v.len());
                    let part = Range::new(0, v.len() - start);

                    unsafe {
                        let first = binary_first(s, &val, range, &mut less);
                        let last = binary_last(s, &val, range, &mut less);
                        assert_eq!(find_first_forward(s, &val, range, &mut less, unique), first);
                        assert_eq!(find_last_forward(s, &val, range, &mut less, unique), last);

                        let first = binary_first(s, &val, part, &mut less);
                        let last = binary_last(s, &val, part, &mut less);
                        assert_eq!(find_first_backward(s, &val, part, &mut less, unique), first);
                        assert_eq!(find_last_backward(s, &val, part, &mut less, unique), last);
                    }
                }
            }

            let expected = v.partition_point(|x| *x < val);
            assert_eq!(unsafe { binary_first(s, &val, full, &mut less) }, expected);
        }
    }

    #[test]
    fn gap_restores_cached_values_on_drop() {
        let mut v = [1, 2, 3, 4];
        let mut cache = [0; 4];

        unsafe {
            let s = v.as_mut_ptr();
            let gap = Gap::open(cache.as_mut_ptr(), s.add(1), 2);
            s.add(1).write(0);
            s.add(2).write(0);
            drop(gap);
        }

        assert_eq!(v, [1, 2, 3, 4]);
    }
}
