use core::ptr;

use crate::util::{binary_first, binary_last, conditional, ptr_sub, rotate_range, Gap, Less, Range};

// The unmerged tails of both runs of a `merge_into`. Dropping it copies them to `dst` in order,
// which finishes the merge once either run is exhausted and keeps every element accounted for if
// the comparator panics midway.
struct Tails<T> {
    a: *const T,
    a_end: *const T,
    b: *const T,
    b_end: *const T,
    dst: *mut T,
}

impl<T> Drop for Tails<T> {
    fn drop(&mut self) {
        unsafe {
            let n1 = ptr_sub(self.a_end, self.a);
            ptr::copy_nonoverlapping(self.a, self.dst, n1);
            ptr::copy_nonoverlapping(self.b, self.dst.add(n1), ptr_sub(self.b_end, self.b));
        }
    }
}

/// Merge the runs `a` and `b` of `from` into `into..into + a.len() + b.len()`, which must not
/// overlap either run.
pub unsafe fn merge_into<T, F: Less<T>>(
    from: *const T,
    a: Range,
    b: Range,
    into: *mut T,
    less: &mut F,
) {
    let mut tails = Tails {
        a: from.add(a.start),
        a_end: from.add(a.end),
        b: from.add(b.start),
        b_end: from.add(b.end),
        dst: into,
    };

    while tails.a < tails.a_end && tails.b < tails.b_end {
        let is_b = less(&*tails.b, &*tails.a);
        ptr::copy_nonoverlapping(conditional(tails.a, tails.b, is_b), tails.dst, 1);

        tails.a = tails.a.add(!is_b as usize);
        tails.b = tails.b.add(is_b as usize);
        tails.dst = tails.dst.add(1);
    }
}

/// Merge the run parked in `gap` with the `n2` elements that follow the gap in the array, filling
/// the gap from the left.
pub unsafe fn merge_external<T, F: Less<T>>(gap: &mut Gap<T>, n2: usize, less: &mut F) {
    let mut b = gap.dst.add(gap.len);
    let b_end = b.add(n2);

    // Invariant: the gap ends where the unmerged part of B begins
    while gap.len > 0 && b < b_end {
        if less(&*b, &*gap.src) {
            ptr::copy_nonoverlapping(b, gap.dst, 1);
            b = b.add(1);
        } else {
            ptr::copy_nonoverlapping(gap.src, gap.dst, 1);
            gap.src = gap.src.add(1);
            gap.len -= 1;
        }

        gap.dst = gap.dst.add(1);
    }

    gap.close();
}

/// Merge `a` and `b` into `a.start..b.end`, where the values of `a` have already been swapped
/// into `buffer` and `a` holds buffer values.
///
/// Every move is a swap, so afterwards `buffer` holds its original values in some order.
pub unsafe fn merge_internal<T, F: Less<T>>(
    s: *mut T,
    a: Range,
    b: Range,
    buffer: Range,
    less: &mut F,
) {
    let mut i1 = s.add(buffer.start);
    let e1 = i1.add(a.len());
    let mut i2 = s.add(b.start);
    let e2 = s.add(b.end);
    let mut dst = s.add(a.start);

    while i1 < e1 && i2 < e2 {
        let is_b = less(&*i2, &*i1);
        ptr::swap(dst, conditional(i1, i2, is_b));

        i1 = i1.add(!is_b as usize);
        i2 = i2.add(is_b as usize);
        dst = dst.add(1);
    }

    ptr::swap_nonoverlapping(i1, dst, ptr_sub(e1, i1));
}

/// Merge `a` and `b` into `a.start..b.end` without any scratch space.
///
/// Each round binary searches the head of A in B and rotates the smaller B prefix in front of A.
/// The number of rounds is bounded by the number of distinct values in A, which is only small
/// enough for this to be efficient when the caller could not find an internal buffer.
pub unsafe fn merge_in_place<T, F: Less<T>>(s: *mut T, mut a: Range, mut b: Range, less: &mut F) {
    if a.is_empty() || b.is_empty() {
        return;
    }

    loop {
        let mid = binary_first(s, s.add(a.start), b, less);

        let amount = mid - a.end;
        rotate_range(s, a.len(), Range::new(a.start, mid));

        if b.end == mid {
            break;
        }

        b.start = mid;
        a = Range::new(a.start + amount, b.start);

        // The head always moves past itself; stepping at least one keeps a bad comparator from
        // stalling the loop.
        a.start = usize::max(binary_last(s, s.add(a.start), a, less), a.start + 1);

        if a.is_empty() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::MaybeUninit;
    use proptest::prelude::*;

    type Tagged = (i32, usize);

    fn by_key(a: &Tagged, b: &Tagged) -> bool {
        a.0 < b.0
    }

    // Two sorted runs of tagged keys laid out back to back, tags in input order.
    fn runs(mut a: Vec<i32>, mut b: Vec<i32>) -> (Vec<Tagged>, Range, Range) {
        a.sort();
        b.sort();

        let split = a.len();
        let v: Vec<Tagged> = a.into_iter().chain(b).zip(0..).collect();
        let len = v.len();

        (v, Range::new(0, split), Range::new(split, len))
    }

    fn expected(v: &[Tagged]) -> Vec<Tagged> {
        let mut expected = v.to_vec();
        expected.sort_by_key(|x| x.0);
        expected
    }

    fn run_vec() -> impl Strategy<Value = Vec<i32>> {
        proptest::collection::vec(0i32..20, 0..40)
    }

    #[test]
    fn merge_into_destination() {
        let (v, a, b) = runs(vec![1, 3, 3, 8], vec![0, 3, 4, 9, 9]);
        let mut out = vec![(0, 0); v.len()];

        unsafe { merge_into(v.as_ptr(), a, b, out.as_mut_ptr(), &mut by_key) };
        assert_eq!(out, expected(&v));
    }

    #[test]
    fn merge_external_refills_gap() {
        let (mut v, a, b) = runs(vec![2, 2, 5, 7], vec![1, 2, 6]);
        let want = expected(&v);
        let mut cache = [MaybeUninit::<Tagged>::uninit(); 8];

        unsafe {
            let dst = v.as_mut_ptr().add(a.start);
            let mut gap = Gap::open(cache.as_mut_ptr().cast(), dst, a.len());
            merge_external(&mut gap, b.len(), &mut by_key);
        }

        assert_eq!(v, want);
    }

    #[test]
    fn merge_internal_keeps_buffer_values() {
        // Layout: four buffer values, then A, then B.
        let mut v: Vec<Tagged> = vec![(-4, 100), (-3, 101), (-2, 102), (-1, 103)];
        let (merged, a, b) = runs(vec![1, 4, 4], vec![0, 4, 5, 6]);
        let want = expected(&merged);
        v.extend(merged);

        let shift = |r: Range| Range::new(r.start + 4, r.end + 4);
        let (a, b, buffer) = (shift(a), shift(b), Range::new(0, a.len()));

        unsafe {
            ptr::swap_nonoverlapping(v.as_mut_ptr().add(a.start), v.as_mut_ptr(), a.len());
            merge_internal(v.as_mut_ptr(), a, b, buffer, &mut by_key);
        }

        assert_eq!(v[4..], want[..]);

        let mut buf = v[..4].to_vec();
        buf.sort();
        assert_eq!(buf, [(-4, 100), (-3, 101), (-2, 102), (-1, 103)]);
    }

    #[test]
    fn merge_in_place_few_distinct() {
        let (mut v, a, b) = runs(vec![1, 1, 1, 2, 2, 3, 3, 3], vec![0, 1, 1, 2, 3, 3, 4]);
        let want = expected(&v);

        unsafe { merge_in_place(v.as_mut_ptr(), a, b, &mut by_key) };
        assert_eq!(v, want);
    }

    proptest! {
        #[test]
        fn merge_into_is_stable(a in run_vec(), b in run_vec()) {
            let (v, a, b) = runs(a, b);
            let mut out = vec![(0, 0); v.len()];

            unsafe { merge_into(v.as_ptr(), a, b, out.as_mut_ptr(), &mut by_key) };
            prop_assert_eq!(out, expected(&v));
        }

        #[test]
        fn merge_external_is_stable(a in run_vec(), b in run_vec()) {
            let (mut v, a, b) = runs(a, b);
            let want = expected(&v);
            let mut cache = [MaybeUninit::<Tagged>::uninit(); 40];

            unsafe {
                let mut gap =
                    Gap::open(cache.as_mut_ptr().cast(), v.as_mut_ptr().add(a.start), a.len());
                merge_external(&mut gap, b.len(), &mut by_key);
            }

            prop_assert_eq!(v, want);
        }

        #[test]
        fn merge_internal_is_stable(a in run_vec(), b in run_vec()) {
            // Layout: one buffer value per element of A, then A, then B.
            let (merged, a, b) = runs(a, b);
            let want = expected(&merged);

            let n = a.len();
            let scratch: Vec<Tagged> = (0..n).map(|i| (-1 - i as i32, 1_000 + i)).collect();
            let mut v = scratch.clone();
            v.extend(merged);

            let shift = |r: Range| Range::new(r.start + n, r.end + n);
            let (a, b, buffer) = (shift(a), shift(b), Range::new(0, n));

            unsafe {
                ptr::swap_nonoverlapping(v.as_mut_ptr().add(a.start), v.as_mut_ptr(), n);
                merge_internal(v.as_mut_ptr(), a, b, buffer, &mut by_key);
            }

            prop_assert_eq!(&v[n..], &want[..]);

            let mut buf = v[..n].to_vec();
            buf.sort_by_key(|x| x.1);
            prop_assert_eq!(buf, scratch);
        }

        #[test]
        fn merge_in_place_is_stable(a in run_vec(), b in run_vec()) {
            let (mut v, a, b) = runs(a, b);
            let want = expected(&v);

            unsafe { merge_in_place(v.as_mut_ptr(), a, b, &mut by_key) };
            prop_assert_eq!(v, want);
        }
    }
}
