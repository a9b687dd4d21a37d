//! Double-ended vectorized partitioning.
//!
//! The range `[lo, hi)` is partitioned around `split`, `hi` holds the pivot. Elements `<= split`
//! end up on the left, elements `> split` on the right. Every vector is compacted through the
//! permutation table and stored twice, once at the left write cursor and once ending at the
//! right write cursor, and the cursors advance by the sizes of both groups. Reads come from
//! whichever side has less free space left, so neither write ever overtakes an unread vector.
//!
//! To make that possible the partitioner first moves the unaligned edges and `UNROLL` aligned
//! vectors from each side into the scratch buffer. That opens a gap of at least
//! `2 * UNROLL * N` lanes, the scratch contents are copied back into it at the end.
//!
//! Scratch layout, `low` grows up from the start and `high` grows down from the end:
//!
//! ```text
//! [forced | <= split ... ) free ( ... > split | forced]
//!  0       low_start    low     high      high_end   PARTITION_TMP_SIZE
//! ```

use core::mem;
use core::ptr;

use crate::vector::{lanes_reach_vector_boundary, Lane, VectorOps, VECTOR_BYTES};

/// Where the vectorized part of a partition starts and ends, relative to the range boundaries.
///
/// Cached across recursion levels: a child range shares one boundary with its parent and only
/// needs the other one recomputed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AlignHint {
    /// `<= 0`: read the aligned vector starting `-left` lanes before `lo`.
    /// `> 0`: route the first `left` elements one by one, the vector loop starts at `lo + left`.
    pub(crate) left: isize,
    /// `>= 0`: read the aligned vector ending `right` lanes after `hi`.
    /// `< 0`: route the last `-right` elements one by one, the vector loop ends at `hi + right`.
    pub(crate) right: isize,
    pub(crate) realign_left: bool,
    pub(crate) realign_right: bool,
}

impl AlignHint {
    pub(crate) const UNKNOWN: Self = Self {
        left: 0,
        right: 0,
        realign_left: true,
        realign_right: true,
    };

    /// Computes the offsets flagged for realignment. `len` is the length of the whole slice
    /// starting at `base`, vectors straddling a boundary never reach outside of it.
    pub(crate) fn realigned<V: VectorOps>(
        mut self,
        base: *const V::Lane,
        len: usize,
        lo: usize,
        hi: usize,
    ) -> Self {
        if self.realign_left {
            self.left = left_offset::<V>(base, lo);
            self.realign_left = false;
        }

        if self.realign_right {
            self.right = right_offset::<V>(base, len, hi);
            self.realign_right = false;
        }

        self
    }

    #[inline]
    pub(crate) fn for_left_child(self) -> Self {
        Self {
            realign_right: true,
            ..self
        }
    }

    #[inline]
    pub(crate) fn for_right_child(self) -> Self {
        Self {
            realign_left: true,
            ..self
        }
    }
}

/// Lanes between index `i` and the previous vector boundary.
///
/// Lanes that can't reach an address boundary use boundaries every `N` lanes from `base`, the
/// backend's aligned loads then only need lane alignment.
#[inline]
fn misalignment<V: VectorOps>(base: *const V::Lane, i: usize) -> usize {
    let ptr = base.wrapping_add(i);
    if lanes_reach_vector_boundary(ptr) {
        (ptr as usize % VECTOR_BYTES) / mem::size_of::<V::Lane>()
    } else {
        i % V::N
    }
}

fn left_offset<V: VectorOps>(base: *const V::Lane, lo: usize) -> isize {
    let mis = misalignment::<V>(base, lo);
    if mis == 0 {
        0
    } else if mis <= lo {
        -(mis as isize)
    } else {
        (V::N - mis) as isize
    }
}

fn right_offset<V: VectorOps>(base: *const V::Lane, len: usize, hi: usize) -> isize {
    let mis = misalignment::<V>(base, hi);
    if mis == 0 {
        0
    } else if hi - mis + V::N <= len {
        (V::N - mis) as isize
    } else {
        -(mis as isize)
    }
}

struct Scratch<V: VectorOps> {
    ptr: *mut V::Lane,
    low: usize,
    high: usize,
}

impl<V: VectorOps> Scratch<V> {
    /// Keeps the first `count` lanes of `v` on the low side.
    #[inline(always)]
    unsafe fn store_low(&mut self, v: V, count: usize) {
        debug_assert!(self.low + V::N <= self.high);
        v.store(self.ptr.add(self.low));
        self.low += count;
    }

    /// Keeps the last `count` lanes of `v` on the high side.
    #[inline(always)]
    unsafe fn store_high(&mut self, v: V, count: usize) {
        debug_assert!(self.low + V::N <= self.high);
        v.store(self.ptr.add(self.high - V::N));
        self.high -= count;
    }

    #[inline(always)]
    unsafe fn push(&mut self, v: V, split: V) {
        let mask = v.cmpgt_mask(split);
        let compacted = v.compact(mask);
        let gt = V::popcnt(mask);
        self.store_low(compacted, V::N - gt);
        self.store_high(compacted, gt);
    }

    #[inline(always)]
    unsafe fn route(&mut self, x: V::Lane, split: V::Lane) {
        debug_assert!(self.low < self.high);
        if x <= split {
            self.ptr.add(self.low).write(x);
            self.low += 1;
        } else {
            self.high -= 1;
            self.ptr.add(self.high).write(x);
        }
    }
}

struct Cursors {
    read_left: usize,
    read_right: usize,
    write_left: usize,
    write_right: usize,
}

/// Partitions `U` vectors per iteration until fewer than `U` vectors are left unread.
#[inline(always)]
unsafe fn partition_blocks<V: VectorOps, const U: usize>(
    base: *mut V::Lane,
    cur: &mut Cursors,
    split: V,
) {
    let n = V::N;

    while cur.read_right - cur.read_left >= U * n {
        let src = if cur.write_right - cur.read_right < U * n {
            cur.read_right -= U * n;
            cur.read_right
        } else {
            let src = cur.read_left;
            cur.read_left += U * n;
            src
        };

        // Load the whole block first, its lanes are free space for the stores below.
        let mut block = [split; U];
        for (i, v) in block.iter_mut().enumerate() {
            *v = V::load_aligned(base.add(src + i * n));
        }

        for v in block {
            debug_assert!(cur.write_left + n <= cur.read_left);
            debug_assert!(cur.read_right + n <= cur.write_right);

            let mask = v.cmpgt_mask(split);
            let compacted = v.compact(mask);
            let gt = V::popcnt(mask);

            compacted.store(base.add(cur.write_left));
            compacted.store(base.add(cur.write_right - n));
            cur.write_left += n - gt;
            cur.write_right -= gt;
        }
    }
}

/// Partitions `[lo, hi)` around `split` and moves the pivot found at `hi` to the boundary.
///
/// Returns the final index of the pivot. Afterwards every element before it is `<= split` and
/// every element after it up to `hi` is `> split`.
///
/// # Safety
///
/// `base` must be valid for reads and writes of the whole slice the hint was computed for,
/// `hi - lo >= V::SMALL_SORT_THRESHOLD`, `hint` must be fully realigned for `lo` and `hi` and
/// `tmp` must be valid for `V::PARTITION_TMP_SIZE` lanes and not overlap the slice.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) unsafe fn partition<V: VectorOps>(
    base: *mut V::Lane,
    lo: usize,
    hi: usize,
    split: V::Lane,
    hint: AlignHint,
    tmp: *mut V::Lane,
) -> usize {
    let n = V::N;
    debug_assert!(hi - lo >= V::SMALL_SORT_THRESHOLD);
    debug_assert!(!hint.realign_left && !hint.realign_right);
    // The main loop starts with blocks of 8 vectors and relies on the gap opened below.
    debug_assert!(V::UNROLL >= 8);

    let pivot = base.add(hi).read();
    base.add(hi).write(V::Lane::MAX);

    let p = V::broadcast(split);
    let mut scratch = Scratch::<V> {
        ptr: tmp,
        low: 0,
        high: V::PARTITION_TMP_SIZE,
    };
    let mut low_start = 0;
    let mut high_end = V::PARTITION_TMP_SIZE;
    let mut read_left = lo;
    let mut read_right = hi;

    // The right edge vector goes first so its forced lanes sit at the very end of the high side.
    let mut right_low = None;
    if hint.right > 0 {
        let beyond = hint.right as usize;
        read_right = hi + beyond - n;

        let v = V::load_aligned(base.add(read_right));
        let forced = ((1u32 << beyond) - 1) << (n - beyond);
        let mask = v.cmpgt_mask(p) | forced;
        let compacted = v.compact(mask);
        let gt = V::popcnt(mask);

        scratch.store_high(compacted, gt);
        high_end -= beyond;
        right_low = Some((compacted, n - gt));
    }

    if hint.left < 0 {
        let before = (-hint.left) as usize;
        let start = lo - before;

        let v = V::load_aligned(base.add(start));
        let forced = (1u32 << before) - 1;
        let mask = v.cmpgt_mask(p) & !forced;
        let compacted = v.compact(mask);
        let gt = V::popcnt(mask);

        debug_assert_eq!(scratch.low, 0);
        scratch.store_low(compacted, n - gt);
        scratch.store_high(compacted, gt);
        low_start = before;
        read_left = start + n;
    } else if hint.left > 0 {
        let count = hint.left as usize;
        for i in lo..lo + count {
            scratch.route(base.add(i).read(), split);
        }
        read_left = lo + count;
    }

    if let Some((compacted, le)) = right_low {
        scratch.store_low(compacted, le);
    } else if hint.right < 0 {
        let count = (-hint.right) as usize;
        read_right = hi - count;
        for i in read_right..hi {
            scratch.route(base.add(i).read(), split);
        }
    }

    debug_assert_eq!(misalignment::<V>(base, read_left), 0);
    debug_assert_eq!(misalignment::<V>(base, read_right), 0);
    debug_assert!(read_right - read_left >= 2 * V::UNROLL * n);

    for i in 0..V::UNROLL {
        scratch.push(V::load_aligned(base.add(read_left + i * n)), p);
    }
    read_left += V::UNROLL * n;

    for i in 1..=V::UNROLL {
        scratch.push(V::load_aligned(base.add(read_right - i * n)), p);
    }
    read_right -= V::UNROLL * n;

    let mut cur = Cursors {
        read_left,
        read_right,
        write_left: lo,
        write_right: hi,
    };
    partition_blocks::<V, 8>(base, &mut cur, p);
    partition_blocks::<V, 4>(base, &mut cur, p);
    partition_blocks::<V, 1>(base, &mut cur, p);
    debug_assert_eq!(cur.read_left, cur.read_right);

    let low_len = scratch.low - low_start;
    let high_len = high_end - scratch.high;
    debug_assert_eq!(cur.write_left + low_len + high_len, cur.write_right);

    ptr::copy_nonoverlapping(tmp.add(low_start), base.add(cur.write_left), low_len);
    let sep = cur.write_left + low_len;
    ptr::copy_nonoverlapping(tmp.add(scratch.high), base.add(sep), high_len);

    base.add(hi).write(base.add(sep).read());
    base.add(sep).write(pivot);

    sep
}
