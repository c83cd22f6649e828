#![cfg_attr(not(test), no_std)]

//! Stable in-place block merge sort.
//!
//! Sorts in `O(n log n)` comparisons using a fixed amount of stack space and no allocation. Runs
//! are merged bottom-up; once they outgrow the stack cache, distinct values are pulled out of the
//! array to tag blocks and serve as scratch space, and put back in place after every level.

use core::cmp::Ordering;

mod block_sort;
mod blocks;
mod buffer;
mod level;
mod merge;
mod small;
mod util;

pub use block_sort::{CACHE_SIZE, MAX_STACK_CACHE};

/// Sort `v`.
#[inline(always)]
pub fn sort<T: Ord>(v: &mut [T]) {
    sort_common::<T, _, CACHE_SIZE>(v, &mut T::lt);
}

/// Sort `v` with a comparator `compare`.
#[inline(always)]
pub fn sort_by<T, F: FnMut(&T, &T) -> Ordering>(v: &mut [T], mut compare: F) {
    sort_common::<T, _, CACHE_SIZE>(v, &mut |x, y| compare(x, y) == Ordering::Less);
}

/// Sort `v` with a key extraction function `f`.
#[inline(always)]
pub fn sort_by_key<T, K: Ord, F: FnMut(&T) -> K>(v: &mut [T], mut f: F) {
    sort_common::<T, _, CACHE_SIZE>(v, &mut |x, y| f(x).lt(&f(y)));
}

/// Sort `v` by the keys `projection` extracts, ordered by the strict weak order `less`.
#[inline(always)]
pub fn sort_by_projection<T, K, P, F>(v: &mut [T], mut projection: P, mut less: F)
where
    P: FnMut(&T) -> K,
    F: FnMut(&K, &K) -> bool,
{
    sort_common::<T, _, CACHE_SIZE>(v, &mut |x, y| less(&projection(x), &projection(y)));
}

/// Sort `v` by the strict weak order `less`, with `CACHE` elements of stack space.
///
/// A cache of zero elements sorts purely in place. The cache never takes more than
/// [`MAX_STACK_CACHE`] bytes: for larger elements a smaller cache is used instead.
#[inline(always)]
pub fn sort_with_cache<const CACHE: usize, T, F>(v: &mut [T], mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    sort_common::<T, _, CACHE>(v, &mut less);
}

#[inline(always)]
fn sort_common<T, F: FnMut(&T, &T) -> bool, const CACHE: usize>(v: &mut [T], less: &mut F) {
    // Ignore ZSTs
    if core::mem::size_of::<T>() == 0 {
        return;
    }

    let (s, n) = (v.as_mut_ptr(), v.len());
    let bytes = |len: usize| core::mem::size_of::<T>().saturating_mul(len);
    let fits = |len: usize| len <= CACHE && bytes(len) <= MAX_STACK_CACHE;

    unsafe {
        if fits(CACHE) {
            block_sort::sort::<T, F, CACHE>(s, n, less);
        } else if fits(64) {
            block_sort::sort::<T, F, 64>(s, n, less);
        } else if fits(8) {
            block_sort::sort::<T, F, 8>(s, n, less);
        } else {
            block_sort::sort::<T, F, 0>(s, n, less);
        }
    }
}
