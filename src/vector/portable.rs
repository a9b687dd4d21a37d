//! Array backed register model, used when AVX2 is not enabled at compile time.
//!
//! Follows the exact semantics of the AVX2 backend, including the permutation table lookups, so
//! both backends exercise the same partition and network code paths.

use core::array;
use core::ptr;

use crate::perm_table;
use crate::vector::{is_vector_aligned, lanes_reach_vector_boundary, VectorOps};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Portable<L, const N: usize>([L; N]);

macro_rules! portable_impl {
    ($lane:ty, $n:literal) => {
        impl VectorOps for Portable<$lane, $n> {
            type Lane = $lane;

            const N: usize = $n;
            const NAME: &'static str = concat!("portable-", stringify!($lane), "x", $n);

            #[inline(always)]
            unsafe fn load(ptr: *const $lane) -> Self {
                Self(ptr::read_unaligned(ptr.cast::<[$lane; $n]>()))
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $lane) -> Self {
                debug_assert!(is_vector_aligned(ptr) || !lanes_reach_vector_boundary(ptr));
                Self(ptr::read(ptr.cast::<[$lane; $n]>()))
            }

            #[inline(always)]
            unsafe fn store(self, ptr: *mut $lane) {
                ptr::write_unaligned(ptr.cast::<[$lane; $n]>(), self.0);
            }

            #[inline(always)]
            unsafe fn store_aligned(self, ptr: *mut $lane) {
                debug_assert!(is_vector_aligned(ptr) || !lanes_reach_vector_boundary(ptr));
                ptr::write(ptr.cast::<[$lane; $n]>(), self.0);
            }

            #[inline(always)]
            fn broadcast(value: $lane) -> Self {
                Self([value; $n])
            }

            #[inline(always)]
            fn cmpgt_mask(self, other: Self) -> u32 {
                let mut mask = 0;
                for i in 0..$n {
                    mask |= ((self.0[i] > other.0[i]) as u32) << i;
                }
                mask
            }

            #[inline(always)]
            fn compact(self, mask: u32) -> Self {
                let entry = perm_table::entry($n, mask);
                let sub_lanes = perm_table::ENTRY_BYTES / $n;
                Self(array::from_fn(|i| self.0[entry[i * sub_lanes] as usize / sub_lanes]))
            }

            #[inline(always)]
            fn add(self, other: Self) -> Self {
                Self(array::from_fn(|i| self.0[i].wrapping_add(other.0[i])))
            }

            #[inline(always)]
            fn sub(self, other: Self) -> Self {
                Self(array::from_fn(|i| self.0[i].wrapping_sub(other.0[i])))
            }

            #[inline(always)]
            fn min(self, other: Self) -> Self {
                Self(array::from_fn(|i| Ord::min(self.0[i], other.0[i])))
            }

            #[inline(always)]
            fn max(self, other: Self) -> Self {
                Self(array::from_fn(|i| Ord::max(self.0[i], other.0[i])))
            }

            #[inline(always)]
            fn shuffle_xor(self, x: usize) -> Self {
                debug_assert!(x < $n);
                Self(array::from_fn(|i| self.0[i ^ x]))
            }

            #[inline(always)]
            fn blend(self, other: Self, mask: u32) -> Self {
                Self(array::from_fn(|i| {
                    if (mask >> i) & 1 == 1 {
                        other.0[i]
                    } else {
                        self.0[i]
                    }
                }))
            }
        }
    };
}

portable_impl!(i32, 8);
portable_impl!(i64, 4);
