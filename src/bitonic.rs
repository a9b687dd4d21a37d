//! Vectorized bitonic sorting network for ranges up to `SMALL_SORT_THRESHOLD` elements.
//!
//! The range is copied into an aligned stack buffer, padded to whole vectors with `Lane::MAX`,
//! and sorted by an all-ascending bitonic network. The network is laid out for the next power of
//! two of the vector count, the virtual vectors beyond the buffer hold `+inf` and every
//! comparator that would touch them is a no-op, so it is skipped. The comparator pattern only
//! depends on the rounded up vector count.

use core::mem::MaybeUninit;
use core::ptr;

use crate::vector::{Lane, VectorOps};

/// Lanes the stack buffer can hold, enough for every backend's `SMALL_SORT_THRESHOLD`.
const MAX_NETWORK_LANES: usize = 160;

#[repr(C, align(32))]
struct NetworkScratch<L>(MaybeUninit<[L; MAX_NETWORK_LANES]>);

/// Sorts the `len` elements starting at `v`.
///
/// # Safety
///
/// `v` must be valid for reads and writes of `len` elements and
/// `len <= V::SMALL_SORT_THRESHOLD`.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) unsafe fn sort<V: VectorOps>(v: *mut V::Lane, len: usize) {
    debug_assert!(len <= V::SMALL_SORT_THRESHOLD);
    debug_assert!(V::SMALL_SORT_THRESHOLD <= MAX_NETWORK_LANES);

    if len < 2 {
        return;
    }

    let n = V::N;
    let vectors = (len + n - 1) / n;

    let mut scratch = NetworkScratch::<V::Lane>(MaybeUninit::uninit());
    let buf = scratch.0.as_mut_ptr() as *mut V::Lane;

    ptr::copy_nonoverlapping(v, buf, len);
    for i in len..vectors * n {
        buf.add(i).write(V::Lane::MAX);
    }

    // SAFETY: `buf[..vectors * n]` is initialized and vector aligned.
    let padded_lanes = vectors.next_power_of_two() * n;
    let mut k = 2;
    while k <= padded_lanes {
        flip::<V>(buf, vectors, k);

        let mut j = k / 4;
        while j > 0 {
            half_clean::<V>(buf, vectors, j);
            j /= 2;
        }

        k *= 2;
    }

    ptr::copy_nonoverlapping(buf, v, len);
}

/// Compares lane `i` with lane `i ^ (k - 1)` inside every block of `k` lanes, smaller value to
/// the lower index. Turns two sorted halves of a block into a bitonic sequence and performs its
/// first half-cleaning step.
#[inline(always)]
unsafe fn flip<V: VectorOps>(buf: *mut V::Lane, vectors: usize, k: usize) {
    let n = V::N;

    if k <= n {
        let upper = V::lane_mask(k / 2);
        for i in 0..vectors {
            let p = buf.add(i * n);
            let a = V::load_aligned(p);
            let b = a.shuffle_xor(k - 1);
            a.min(b).blend(a.max(b), upper).store_aligned(p);
        }
        return;
    }

    let block = k / n;
    let mut start = 0;
    while start < vectors {
        for q in 0..block / 2 {
            let hi = start + block - 1 - q;
            if hi >= vectors {
                // Partner is padding.
                continue;
            }

            let pa = buf.add((start + q) * n);
            let pb = buf.add(hi * n);
            let a = V::load_aligned(pa);
            let b = V::load_aligned(pb).reverse();
            a.min(b).store_aligned(pa);
            a.max(b).reverse().store_aligned(pb);
        }
        start += block;
    }
}

/// Compares lane `i` with lane `i + j` for every `i` with `i & j == 0`.
#[inline(always)]
unsafe fn half_clean<V: VectorOps>(buf: *mut V::Lane, vectors: usize, j: usize) {
    let n = V::N;

    if j < n {
        let upper = V::lane_mask(j);
        for i in 0..vectors {
            let p = buf.add(i * n);
            let a = V::load_aligned(p);
            let b = a.shuffle_xor(j);
            a.min(b).blend(a.max(b), upper).store_aligned(p);
        }
        return;
    }

    let dist = j / n;
    for lo in 0..vectors {
        let hi = lo + dist;
        if lo & dist != 0 || hi >= vectors {
            continue;
        }

        let pa = buf.add(lo * n);
        let pb = buf.add(hi * n);
        let a = V::load_aligned(pa);
        let b = V::load_aligned(pb);
        a.min(b).store_aligned(pa);
        a.max(b).store_aligned(pb);
    }
}
