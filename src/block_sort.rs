use core::mem::MaybeUninit;
use core::ptr;

use crate::{
    blocks::block_merge,
    buffer::Buffers,
    level::Levels,
    merge::{merge_external, merge_into},
    small::{insert_sort, network_sort, sort_tiny},
    util::{rotate_range, Gap, Less, Range},
};

/// Number of elements of stack space used to speed up merging.
pub const CACHE_SIZE: usize = 512;

/// Upper bound on the stack cache in bytes. Elements too large for a full cache get a smaller one,
/// down to none at all, so large types cannot overflow the stack.
pub const MAX_STACK_CACHE: usize = 4096;

// Ranges of the first level hold between this many and twice this many elements.
const MIN_LEVEL: usize = 4;

// Write the adjacent runs `a` and `b` of `from` to `into` in sorted order. A pair in reverse order
// is copied over swapped instead of merged.
unsafe fn merge_or_copy_into<T, F: Less<T>>(
    from: *const T,
    a: Range,
    b: Range,
    into: *mut T,
    less: &mut F,
) {
    if less(&*from.add(b.end - 1), &*from.add(a.start)) {
        ptr::copy_nonoverlapping(from.add(a.start), into.add(b.len()), a.len());
        ptr::copy_nonoverlapping(from.add(b.start), into, b.len());
    } else if less(&*from.add(b.start), &*from.add(a.end - 1)) {
        merge_into(from, a, b, into, less);
    } else {
        ptr::copy_nonoverlapping(from.add(a.start), into, a.len() + b.len());
    }
}

// Merge two levels at once, four ranges at a time: each pair is merged into the cache, then the
// two results are merged back into the array.
//
// The array is only written by the final merge, and the cache only ever holds copies, so a panic
// before it leaves the array untouched.
unsafe fn merge_levels_fused<T, F: Less<T>>(
    s: *mut T,
    levels: &mut Levels,
    cache: *mut T,
    less: &mut F,
) {
    levels.begin();

    while !levels.finished() {
        let (a1, b1) = (levels.next_range(), levels.next_range());
        let (a2, b2) = (levels.next_range(), levels.next_range());

        if !less(&*s.add(b1.start), &*s.add(a1.end - 1))
            && !less(&*s.add(a2.start), &*s.add(b1.end - 1))
            && !less(&*s.add(b2.start), &*s.add(a2.end - 1))
        {
            continue;
        }

        let n1 = a1.len() + b1.len();
        let n2 = a2.len() + b2.len();

        merge_or_copy_into(s, a1, b1, cache, less);
        merge_or_copy_into(s, a2, b2, cache.add(n1), less);
        let (a3, b3) = (Range::new(0, n1), Range::new(n1, n1 + n2));
        merge_or_copy_into(cache, a3, b3, s.add(a1.start), less);
    }
}

// Merge each pair of the level by parking A in the cache.
unsafe fn merge_level_cached<T, F: Less<T>>(
    s: *mut T,
    levels: &mut Levels,
    cache: *mut T,
    less: &mut F,
) {
    levels.begin();

    while let Some((a, b)) = levels.next_pair() {
        if less(&*s.add(b.end - 1), &*s.add(a.start)) {
            rotate_range(s, a.len(), Range::new(a.start, b.end));
        } else if less(&*s.add(b.start), &*s.add(a.end - 1)) {
            let mut gap = Gap::open(cache, s.add(a.start), a.len());
            merge_external(&mut gap, b.len(), less);
        }
    }
}

// Merge each pair of the level with block merges, using internal buffers pulled out of the
// array itself.
unsafe fn merge_level_blocks<T, F: Less<T>>(
    s: *mut T,
    levels: &mut Levels,
    cache: &mut [MaybeUninit<T>],
    less: &mut F,
) {
    let length = levels.length();
    let block_size = length.isqrt();
    let buffer_size = length / block_size + 1;

    let mut buffers = Buffers::find(s, levels, buffer_size, block_size, cache.len(), less);
    buffers.pull_out(s, less);

    // Every full A block needs its own tag
    let block_size = length / buffers.first.len() + 1;

    levels.begin();

    while let Some((mut a, mut b)) = levels.next_pair() {
        if !buffers.trim(a.start, &mut a, &mut b) {
            continue;
        }

        if less(&*s.add(b.end - 1), &*s.add(a.start)) {
            rotate_range(s, a.len(), Range::new(a.start, b.end));
        } else if less(&*s.add(b.start), &*s.add(a.end - 1)) {
            let (tags, scratch) = (buffers.first, buffers.second);
            block_merge(s, a, b, block_size, tags, scratch, cache, less);
        }
    }

    // Local merges leave the second buffer shuffled; the first one is restored in order
    insert_sort(s.add(buffers.second.start), buffers.second.len(), less);
    buffers.redistribute(s, less);
}

/// Sort `s..s + n` with a block merge sort using `CACHE` elements of stack space.
pub unsafe fn sort<T, F: Less<T>, const CACHE: usize>(s: *mut T, n: usize, less: &mut F) {
    if n < MIN_LEVEL {
        return sort_tiny(s, n, less);
    }

    let mut levels = Levels::new(n, MIN_LEVEL);

    for range in &mut levels {
        network_sort(s.add(range.start), range.len(), less);
    }

    if n < 2 * MIN_LEVEL {
        return;
    }

    let mut cache = [const { MaybeUninit::<T>::uninit() }; CACHE];

    loop {
        let length = levels.length();

        if length < CACHE {
            let cache = cache.as_mut_ptr().cast::<T>();

            if (length + 1) * 4 <= CACHE && length * 4 <= n {
                merge_levels_fused(s, &mut levels, cache, less);
                levels.next_level();
            } else {
                merge_level_cached(s, &mut levels, cache, less);
            }
        } else {
            merge_level_blocks(s, &mut levels, &mut cache, less);
        }

        if !levels.next_level() {
            break;
        }
    }
}
