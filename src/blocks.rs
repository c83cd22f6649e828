use core::mem::MaybeUninit;
use core::ptr;

use crate::{
    merge::{merge_external, merge_in_place, merge_internal},
    util::{binary_first, block_swap, rotate_range, Gap, Less, Range},
};

// Merge `a` with the following `b` using the best strategy available: the cache if `a` was
// parked there, the second buffer if `a` was swapped into it, rotations otherwise.
unsafe fn local_merge<T, F: Less<T>>(
    s: *mut T,
    gap: &mut Gap<T>,
    cache_len: usize,
    a: Range,
    b: Range,
    buffer: Range,
    less: &mut F,
) {
    if a.len() <= cache_len {
        merge_external(gap, b.len(), less);
    } else if !buffer.is_empty() {
        merge_internal(s, a, b, buffer, less);
    } else {
        merge_in_place(s, a, b, less);
    }
}

/// Merge runs `a` and `b` into `a.start..b.end` using a block merge. Blocks are of length
/// `block_size`; `tags` must hold at least one distinct value per full block of `a`, and
/// `buffer` is either empty or at least `block_size` long.
///
/// Full A blocks are tagged by swapping their first value with a value of `tags`, so the
/// minimum A block can be picked by comparing tags alone. The A blocks are then rolled through
/// the B blocks, dropping each one behind as soon as the B values preceding it have passed,
/// and merging it locally with those values.
pub unsafe fn block_merge<T, F: Less<T>>(
    s: *mut T,
    a: Range,
    b: Range,
    block_size: usize,
    tags: Range,
    buffer: Range,
    cache: &mut [MaybeUninit<T>],
    less: &mut F,
) {
    let cache_len = cache.len();
    let cache = cache.as_mut_ptr().cast::<T>();

    // The uneven first A block is merged first and never rolls
    let mut block_a = a;
    let first_a = Range::new(a.start, a.start + a.len() % block_size);

    let mut tag = tags.start;
    let mut index = first_a.end;

    while index < block_a.end {
        ptr::swap(s.add(tag), s.add(index));
        tag += 1;
        index += block_size;
    }

    let mut last_a = first_a;
    let mut last_b = Range::default();
    let mut block_b = Range::new(b.start, b.start + usize::min(block_size, b.len()));
    block_a.start += first_a.len();

    let mut tag = tags.start;
    let mut gap = Gap::empty();

    // Move the first A block to where its local merge expects it
    if last_a.len() <= cache_len {
        gap = Gap::open(cache, s.add(last_a.start), last_a.len());
    } else if !buffer.is_empty() {
        ptr::swap_nonoverlapping(s.add(last_a.start), s.add(buffer.start), last_a.len());
    }

    while !block_a.is_empty() {
        let drop_a = block_b.is_empty()
            || (!last_b.is_empty() && !less(&*s.add(last_b.end - 1), &*s.add(tag)));

        if drop_a {
            // Split the previous B block where the minimum A block belongs
            let b_split = binary_first(s, s.add(tag), last_b, less);
            let b_remaining = last_b.end - b_split;

            let mut min_a = block_a.start;
            let mut find_a = min_a + block_size;

            while find_a < block_a.end {
                if less(&*s.add(find_a), &*s.add(min_a)) {
                    min_a = find_a;
                }

                find_a += block_size;
            }

            block_swap(s, block_a.start, min_a, block_size);

            // Untag the dropped block
            ptr::swap(s.add(block_a.start), s.add(tag));
            tag += 1;

            let prev_b = Range::new(last_a.end, b_split);
            local_merge(s, &mut gap, cache_len, last_a, prev_b, buffer, less);

            if block_size <= cache_len || !buffer.is_empty() {
                // The dropped block goes to the cache or the second buffer anyway, which frees its
                // slots: the B remainder can be block swapped into place instead of rotated.
                if block_size <= cache_len {
                    gap = Gap::open(cache, s.add(block_a.start), block_size);
                } else {
                    ptr::swap_nonoverlapping(s.add(block_a.start), s.add(buffer.start), block_size);
                }

                block_swap(s, b_split, block_a.start + block_size - b_remaining, b_remaining);
                gap.dst = s.add(b_split);
            } else {
                let range = Range::new(b_split, block_a.start + block_size);
                rotate_range(s, block_a.start - b_split, range);
            }

            last_a = Range::new(b_split, b_split + block_size);
            last_b = Range::new(last_a.end, last_a.end + b_remaining);

            block_a.start += block_size;
        } else if block_b.len() < block_size {
            // Move the short last B block in front of the remaining A blocks
            let range = Range::new(block_a.start, block_b.end);
            rotate_range(s, block_b.start - block_a.start, range);

            last_b = Range::new(block_a.start, block_a.start + block_b.len());
            block_a.start += block_b.len();
            block_a.end += block_b.len();
            block_b.end = block_b.start;
        } else {
            // Roll the leftmost A block past the next B block
            ptr::swap_nonoverlapping(s.add(block_a.start), s.add(block_b.start), block_size);
            last_b = Range::new(block_a.start, block_a.start + block_size);

            block_a.start += block_size;
            block_a.end += block_size;
            block_b.start += block_size;
            block_b.end = usize::min(block_b.end + block_size, b.end);
        }
    }

    local_merge(s, &mut gap, cache_len, last_a, Range::new(last_a.end, b.end), buffer, less);
}
