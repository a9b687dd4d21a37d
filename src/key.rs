//! Order preserving maps from the supported element types onto signed vector lanes.
//!
//! The sort itself only ever compares `i32` or `i64` lanes. Unsigned integers flip their sign
//! bit, floats use the IEEE 754 total order key, the same order as `f32::total_cmp`. Both maps
//! are applied in place before sorting and undone afterwards.

use core::mem;
use core::slice;

use crate::quicksort::{self, SortStats};
use crate::vector::{I32x8, I64x4, Lane, VectorOps};
use crate::ElementKind;

mod sealed {
    pub trait Sealed {}
}

/// Element types `vxsort` can sort.
///
/// Sealed, implemented for `i32`, `u32`, `f32`, `i64`, `u64` and `f64`.
pub trait VxSortable: sealed::Sealed + Copy + 'static {
    const KIND: ElementKind;

    #[doc(hidden)]
    fn sort_in_place(v: &mut [Self]) -> SortStats;
}

/// Reinterprets `v` as a slice of another type with the same size and alignment.
///
/// # Safety
///
/// Every bit pattern of `T` must be a valid `L` and the other way around.
unsafe fn cast_slice_mut<T, L>(v: &mut [T]) -> &mut [L] {
    debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<L>());
    debug_assert_eq!(mem::align_of::<T>(), mem::align_of::<L>());
    slice::from_raw_parts_mut(v.as_mut_ptr().cast::<L>(), v.len())
}

/// Adds (or, when decoding, subtracts) `Lane::MIN`, which flips the sign bit of every key.
fn flip_sign_bit<V: VectorOps>(keys: &mut [V::Lane], decode: bool) {
    let bias = V::broadcast(V::Lane::MIN);

    let mut chunks = keys.chunks_exact_mut(V::N);
    for chunk in &mut chunks {
        // SAFETY: every chunk holds exactly `N` lanes.
        unsafe {
            let v = V::load(chunk.as_ptr());
            let v = if decode { v.sub(bias) } else { v.add(bias) };
            v.store(chunk.as_mut_ptr());
        }
    }

    for key in chunks.into_remainder() {
        *key = if decode {
            key.wrapping_sub(V::Lane::MIN)
        } else {
            key.wrapping_add(V::Lane::MIN)
        };
    }
}

// Negative floats compare reversed as integers, flipping all bits but the sign fixes that.
// The sign bit is left alone, so the map is its own inverse.
#[inline(always)]
fn total_order_32(bits: i32) -> i32 {
    bits ^ (((bits >> 31) as u32) >> 1) as i32
}

#[inline(always)]
fn total_order_64(bits: i64) -> i64 {
    bits ^ (((bits >> 63) as u64) >> 1) as i64
}

macro_rules! signed_impl {
    ($t:ty, $kind:ident, $vec:ty) => {
        impl sealed::Sealed for $t {}

        impl VxSortable for $t {
            const KIND: ElementKind = ElementKind::$kind;

            fn sort_in_place(v: &mut [Self]) -> SortStats {
                quicksort::sort::<$vec>(v)
            }
        }
    };
}

macro_rules! unsigned_impl {
    ($t:ty, $lane:ty, $kind:ident, $vec:ty) => {
        impl sealed::Sealed for $t {}

        impl VxSortable for $t {
            const KIND: ElementKind = ElementKind::$kind;

            fn sort_in_place(v: &mut [Self]) -> SortStats {
                // SAFETY: same width integers, every bit pattern is valid for both.
                let keys = unsafe { cast_slice_mut::<$t, $lane>(v) };

                flip_sign_bit::<$vec>(keys, false);
                let stats = quicksort::sort::<$vec>(keys);
                flip_sign_bit::<$vec>(keys, true);

                stats
            }
        }
    };
}

macro_rules! float_impl {
    ($t:ty, $lane:ty, $kind:ident, $vec:ty, $total_order:ident) => {
        impl sealed::Sealed for $t {}

        impl VxSortable for $t {
            const KIND: ElementKind = ElementKind::$kind;

            fn sort_in_place(v: &mut [Self]) -> SortStats {
                // SAFETY: floats and same width integers share size, alignment and validity of
                // all bit patterns.
                let keys = unsafe { cast_slice_mut::<$t, $lane>(v) };

                keys.iter_mut().for_each(|k| *k = $total_order(*k));
                let stats = quicksort::sort::<$vec>(keys);
                keys.iter_mut().for_each(|k| *k = $total_order(*k));

                stats
            }
        }
    };
}

signed_impl!(i32, I32, I32x8);
signed_impl!(i64, I64, I64x4);
unsigned_impl!(u32, i32, U32, I32x8);
unsigned_impl!(u64, i64, U64, I64x4);
float_impl!(f32, i32, F32, I32x8, total_order_32);
float_impl!(f64, i64, F64, I64x4, total_order_64);
