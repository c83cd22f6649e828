use core::mem::ManuallyDrop;
use core::ptr;

use crate::util::{Hole, Less};

// Optimal compare-exchange networks for 4 to 8 elements, one pair per exchange.
const NETWORK_4: &[(u8, u8)] = &[(0, 1), (2, 3), (0, 2), (1, 3), (1, 2)];

const NETWORK_5: &[(u8, u8)] = &[
    (0, 1), (3, 4), (2, 4), (2, 3), (1, 4), (0, 3), (0, 2), (1, 3), (1, 2),
];

const NETWORK_6: &[(u8, u8)] = &[
    (1, 2), (4, 5), (0, 2), (3, 5), (0, 1), (3, 4), (2, 5), (0, 3), (1, 4), (2, 4), (1, 3),
    (2, 3),
];

const NETWORK_7: &[(u8, u8)] = &[
    (1, 2), (3, 4), (5, 6), (0, 2), (3, 5), (4, 6), (0, 1), (4, 5), (2, 6), (0, 4), (1, 5),
    (0, 3), (2, 5), (1, 3), (2, 4), (2, 3),
];

const NETWORK_8: &[(u8, u8)] = &[
    (0, 1), (2, 3), (4, 5), (6, 7), (0, 2), (1, 3), (4, 6), (5, 7), (1, 2), (5, 6), (0, 4),
    (3, 7), (1, 5), (2, 6), (1, 4), (3, 6), (2, 4), (3, 5), (3, 4),
];

/// Sort `s..s + n` for `n < 4` with at most three comparisons.
pub unsafe fn sort_tiny<T, F: Less<T>>(s: *mut T, n: usize, less: &mut F) {
    let swap_if_less = |i: usize, j: usize, less: &mut F| {
        let out_of_order = less(&*s.add(j), &*s.add(i));

        if out_of_order {
            ptr::swap(s.add(i), s.add(j));
        }

        out_of_order
    };

    match n {
        2 => {
            swap_if_less(0, 1, less);
        }
        3 => {
            swap_if_less(0, 1, less);

            if swap_if_less(1, 2, less) {
                swap_if_less(0, 1, less);
            }
        }
        _ => {}
    }
}

/// Sort `s..s + n` for `4 <= n <= 8` with a sorting network.
///
/// Networks exchange equal elements freely, so each slot carries its original position and
/// ties are broken by it.
pub unsafe fn network_sort<T, F: Less<T>>(s: *mut T, n: usize, less: &mut F) {
    let network = match n {
        4 => NETWORK_4,
        5 => NETWORK_5,
        6 => NETWORK_6,
        7 => NETWORK_7,
        8 => NETWORK_8,
        _ => return,
    };

    let mut order: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

    for &(x, y) in network {
        let (x, y) = (x as usize, y as usize);
        let (a, b) = (s.add(x), s.add(y));

        if less(&*b, &*a) || (order[x] > order[y] && !less(&*a, &*b)) {
            ptr::swap(a, b);
            order.swap(x, y);
        }
    }
}

/// Sort `s..s + n` with a stable insertion sort. Cheap for short or nearly sorted regions.
pub unsafe fn insert_sort<T, F: Less<T>>(s: *mut T, n: usize, less: &mut F) {
    for i in 1..n {
        if !less(&*s.add(i), &*s.add(i - 1)) {
            continue;
        }

        let tmp = ManuallyDrop::new(s.add(i).read());
        let mut hole = Hole::new(s.add(i), &*tmp);

        hole.pos.write(hole.pos.sub(1).read());
        hole.pos = hole.pos.sub(1);

        while hole.pos > s && less(&*tmp, &*hole.pos.sub(1)) {
            hole.pos.write(hole.pos.sub(1).read());
            hole.pos = hole.pos.sub(1);
        }
    }
}
