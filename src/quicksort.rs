//! Introsort driver: picks a strategy per sub-range, partitions and recurses.

use core::ptr;
use core::slice;

use log::trace;

use crate::bitonic;
use crate::heapsort::heapsort;
use crate::partition::{self, AlignHint};
use crate::vector::{Lane, VectorOps};

/// Counters collected during one top-level sort.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Vectorized partition steps.
    pub partitions: usize,
    /// Ranges finished by the sorting network.
    pub bitonic_sorts: usize,
    /// Ranges finished by heapsort after running out of recursion budget.
    pub heapsort_fallbacks: usize,
    /// Ranges skipped because their value bounds proved all elements equal.
    pub uniform_skips: usize,
    /// Deepest recursion level reached, the top-level range is level 1.
    pub max_depth: u32,
}

/// What to do with one sub-range, decided once on entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    Done,
    Swap2,
    Swap3,
    Bitonic,
    HeapSort,
    Partition,
}

impl Strategy {
    pub(crate) fn choose<L: Lane>(
        len: usize,
        small_sort_threshold: usize,
        depth_limit: u32,
        bounds: &ValueBounds<L>,
    ) -> Self {
        match len {
            0 | 1 => Strategy::Done,
            _ if bounds.is_uniform() => Strategy::Done,
            2 => Strategy::Swap2,
            3 => Strategy::Swap3,
            _ if len <= small_sort_threshold => Strategy::Bitonic,
            _ if depth_limit == 0 => Strategy::HeapSort,
            _ => Strategy::Partition,
        }
    }
}

/// Value range of a sub-range inherited from the pivots of its ancestors: every element is
/// `> lower` and `<= upper`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ValueBounds<L> {
    pub(crate) lower: Option<L>,
    pub(crate) upper: Option<L>,
}

impl<L: Lane> ValueBounds<L> {
    pub(crate) const UNKNOWN: Self = Self {
        lower: None,
        upper: None,
    };

    /// Only a single value fits the bounds.
    pub(crate) fn is_uniform(&self) -> bool {
        match self.upper {
            Some(upper) => match upper.checked_dec() {
                Some(below) => self.lower.map_or(false, |lower| lower >= below),
                None => true,
            },
            None => false,
        }
    }

    /// The value to partition around for `pivot`.
    ///
    /// A pivot equal to the upper bound means the range holds a run of copies of it. Splitting by
    /// `< pivot` moves them all to the right side, which is then known to be uniform.
    pub(crate) fn split_for(&self, pivot: L) -> L {
        match (self.upper, pivot.checked_dec()) {
            (Some(upper), Some(below)) if upper == pivot => below,
            _ => pivot,
        }
    }
}

/// `2 * (floor(log2(len)) + 1)`, the number of partition levels before falling back to heapsort.
pub(crate) fn depth_limit(len: usize) -> u32 {
    if len < 2 {
        return 0;
    }

    2 * (len.ilog2() + 1)
}

pub(crate) fn sort<V: VectorOps>(v: &mut [V::Lane]) -> SortStats {
    sort_with_limit::<V>(v, depth_limit(v.len()))
}

pub(crate) fn sort_with_limit<V: VectorOps>(v: &mut [V::Lane], depth_limit: u32) -> SortStats {
    let len = v.len();
    let scratch = if len > V::SMALL_SORT_THRESHOLD {
        vec![V::Lane::default(); V::PARTITION_TMP_SIZE]
    } else {
        Vec::new()
    };

    let mut sorter = Sorter::<V> {
        base: v.as_mut_ptr(),
        len,
        scratch,
        stats: SortStats::default(),
    };

    // SAFETY: `base` and `len` describe `v`, which stays exclusively borrowed until we return.
    unsafe {
        sorter.sort_range(
            0,
            len,
            ValueBounds::UNKNOWN,
            AlignHint::UNKNOWN,
            depth_limit,
            1,
        );
    }

    sorter.stats
}

struct Sorter<V: VectorOps> {
    base: *mut V::Lane,
    len: usize,
    scratch: Vec<V::Lane>,
    stats: SortStats,
}

impl<V: VectorOps> Sorter<V> {
    /// Sorts `[lo, end)`.
    unsafe fn sort_range(
        &mut self,
        lo: usize,
        end: usize,
        bounds: ValueBounds<V::Lane>,
        hint: AlignHint,
        depth_limit: u32,
        depth: u32,
    ) {
        let len = end - lo;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        match Strategy::choose(len, V::SMALL_SORT_THRESHOLD, depth_limit, &bounds) {
            Strategy::Done => {
                if len > 1 {
                    trace!("skipping {len} copies of {:?}", bounds.upper);
                    self.stats.uniform_skips += 1;
                }
            }
            Strategy::Swap2 => {
                self.swap_if_greater(lo, lo + 1);
            }
            Strategy::Swap3 => {
                self.swap_if_greater(lo, lo + 1);
                self.swap_if_greater(lo, lo + 2);
                self.swap_if_greater(lo + 1, lo + 2);
            }
            Strategy::Bitonic => {
                self.stats.bitonic_sorts += 1;
                bitonic::sort::<V>(self.base.add(lo), len);
            }
            Strategy::HeapSort => {
                trace!("depth limit reached at level {depth}, heapsort for {len} elements");
                self.stats.heapsort_fallbacks += 1;
                heapsort(slice::from_raw_parts_mut(self.base.add(lo), len));
            }
            Strategy::Partition => {
                self.partition_and_recurse(lo, end, bounds, hint, depth_limit, depth);
            }
        }
    }

    unsafe fn partition_and_recurse(
        &mut self,
        lo: usize,
        end: usize,
        bounds: ValueBounds<V::Lane>,
        hint: AlignHint,
        depth_limit: u32,
        depth: u32,
    ) {
        let hi = end - 1;
        let hint = hint.realigned::<V>(self.base, self.len, lo, hi);

        // Median of three, moved into the pivot slot.
        let mid = lo + (hi - lo) / 2;
        self.swap_if_greater(lo, mid);
        self.swap_if_greater(lo, hi - 1);
        self.swap_if_greater(mid, hi - 1);
        ptr::swap(self.base.add(mid), self.base.add(hi));

        let pivot = self.base.add(hi).read();
        let split = bounds.split_for(pivot);

        self.stats.partitions += 1;
        let sep = partition::partition::<V>(
            self.base,
            lo,
            hi,
            split,
            hint,
            self.scratch.as_mut_ptr(),
        );

        let left = ValueBounds {
            lower: bounds.lower,
            upper: Some(split),
        };
        let right = ValueBounds {
            lower: Some(split),
            upper: bounds.upper,
        };

        self.sort_range(
            lo,
            sep,
            left,
            hint.for_left_child(),
            depth_limit - 1,
            depth + 1,
        );
        self.sort_range(
            sep + 1,
            end,
            right,
            hint.for_right_child(),
            depth_limit - 1,
            depth + 1,
        );
    }

    #[inline(always)]
    unsafe fn swap_if_greater(&mut self, i: usize, j: usize) {
        let a = self.base.add(i);
        let b = self.base.add(j);
        if *a > *b {
            ptr::swap(a, b);
        }
    }
}
