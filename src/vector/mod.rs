//! 256-bit vector register model shared by the partitioner and the sorting network.
//!
//! Every backend implements [`VectorOps`] for one lane type. The backend used by the sort is fixed
//! at compile time through the [`I32x8`] and [`I64x4`] aliases, there is no runtime dispatch.

use core::fmt::Debug;
use core::mem;

// Only reachable from tests when the AVX2 backend is selected.
#[allow(dead_code)]
mod portable;

#[cfg(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    not(feature = "portable_only")
))]
mod avx2;

#[allow(unused_imports)]
pub(crate) use portable::Portable;

#[cfg(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    not(feature = "portable_only")
))]
pub(crate) use avx2::{I32x8, I64x4};

#[cfg(not(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    not(feature = "portable_only")
)))]
pub(crate) type I32x8 = Portable<i32, 8>;

#[cfg(not(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    not(feature = "portable_only")
)))]
pub(crate) type I64x4 = Portable<i64, 4>;

/// Width of every vector register in bytes.
pub(crate) const VECTOR_BYTES: usize = 32;

/// Scalar element type held by a vector lane.
pub trait Lane: Copy + Ord + Debug + Default + Send + Sync + 'static {
    const MIN: Self;
    const MAX: Self;

    fn wrapping_add(self, other: Self) -> Self;

    fn wrapping_sub(self, other: Self) -> Self;

    /// The next smaller value, `None` for `MIN`.
    fn checked_dec(self) -> Option<Self>;
}

macro_rules! lane_impl {
    ($($t:ty),*) => {
        $(
            impl Lane for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                #[inline(always)]
                fn wrapping_add(self, other: Self) -> Self {
                    <$t>::wrapping_add(self, other)
                }

                #[inline(always)]
                fn wrapping_sub(self, other: Self) -> Self {
                    <$t>::wrapping_sub(self, other)
                }

                #[inline(always)]
                fn checked_dec(self) -> Option<Self> {
                    self.checked_sub(1)
                }
            }
        )*
    };
}

lane_impl!(i32, i64);

/// Operations on a full vector register of `N` lanes.
///
/// Pointer based operations are `unsafe`: the caller guarantees that `N` lanes starting at `ptr`
/// are valid for the access, and for the aligned variants that `ptr` is [`VECTOR_BYTES`] aligned.
/// Masks are `N` bit values, bit `i` describes lane `i`.
pub trait VectorOps: Copy {
    type Lane: Lane;

    /// Lanes per register.
    const N: usize;

    /// Vectors handled per iteration of the widest partition loop.
    const UNROLL: usize = 8;

    /// Largest input of the sorting network, measured in vectors.
    const MAX_BITONIC_SORT_VECTORS: usize = 20;

    /// Ranges up to this length are sorted by the network instead of being partitioned.
    const SMALL_SORT_THRESHOLD: usize = Self::MAX_BITONIC_SORT_VECTORS * Self::N;

    /// Lanes of scratch space one partition call may use.
    const PARTITION_TMP_SIZE: usize = 2 * (Self::UNROLL * Self::N) + Self::N + 4 * Self::N;

    /// Human readable backend name, used in log output.
    const NAME: &'static str;

    unsafe fn load(ptr: *const Self::Lane) -> Self;

    unsafe fn load_aligned(ptr: *const Self::Lane) -> Self;

    unsafe fn store(self, ptr: *mut Self::Lane);

    unsafe fn store_aligned(self, ptr: *mut Self::Lane);

    fn broadcast(value: Self::Lane) -> Self;

    /// Bit `i` is set iff `self[i] > other[i]`.
    fn cmpgt_mask(self, other: Self) -> u32;

    /// Moves the lanes with a clear `mask` bit to the front and the lanes with a set bit to the
    /// back, keeping the relative order inside both groups.
    fn compact(self, mask: u32) -> Self;

    #[inline(always)]
    fn popcnt(mask: u32) -> usize {
        mask.count_ones() as usize
    }

    /// Lane-wise wrapping addition.
    fn add(self, other: Self) -> Self;

    /// Lane-wise wrapping subtraction.
    fn sub(self, other: Self) -> Self;

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;

    /// Lane `i` of the result is lane `i ^ x` of `self`, `x < N`.
    fn shuffle_xor(self, x: usize) -> Self;

    /// Lane `i` of the result is lane `N - 1 - i` of `self`.
    #[inline(always)]
    fn reverse(self) -> Self {
        self.shuffle_xor(Self::N - 1)
    }

    /// Lane `i` of the result is taken from `other` if bit `i` of `mask` is set, otherwise from
    /// `self`.
    fn blend(self, other: Self, mask: u32) -> Self;

    /// Mask with the bits of all lanes `i` for which `i & bit != 0`.
    #[inline(always)]
    fn lane_mask(bit: usize) -> u32 {
        let mut mask = 0;
        for i in 0..Self::N {
            if i & bit != 0 {
                mask |= 1 << i;
            }
        }
        mask
    }

    /// Copies the lanes out.
    #[cfg(test)]
    fn to_vec(self) -> Vec<Self::Lane> {
        let mut buf = [Self::Lane::default(); VECTOR_BYTES];
        // SAFETY: `buf` holds at least `N` lanes.
        unsafe { self.store(buf.as_mut_ptr()) };
        buf[..Self::N].to_vec()
    }
}

#[inline(always)]
pub(crate) fn is_vector_aligned<T>(ptr: *const T) -> bool {
    (ptr as usize) % VECTOR_BYTES == 0
}

/// Whether lanes starting at `ptr` ever reach a vector boundary.
///
/// False for lanes that are less aligned than they are wide and sit between two multiples of
/// their size, e.g. `i64` on 32-bit x86. Callers then count vector boundaries in lanes from the
/// start of the slice.
#[inline(always)]
pub(crate) fn lanes_reach_vector_boundary<T>(ptr: *const T) -> bool {
    (ptr as usize) % mem::size_of::<T>() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::perm_table;

    #[repr(C, align(32))]
    struct Aligned<L>([L; 16]);

    fn lanes<V: VectorOps>(vals: &[V::Lane]) -> V {
        assert_eq!(vals.len(), V::N);
        unsafe { V::load(vals.as_ptr()) }
    }

    fn check_backend<V: VectorOps>(sample: &[V::Lane], other: &[V::Lane]) {
        let n = V::N;
        let a = lanes::<V>(sample);
        let b = lanes::<V>(other);

        assert_eq!(a.to_vec(), sample);
        assert_eq!(V::broadcast(V::Lane::MAX).to_vec(), vec![V::Lane::MAX; n]);

        let mut aligned = Aligned([V::Lane::default(); 16]);
        unsafe {
            a.store_aligned(aligned.0.as_mut_ptr());
            assert_eq!(V::load_aligned(aligned.0.as_ptr()).to_vec(), sample);
            b.store(aligned.0.as_mut_ptr().add(1));
        }
        assert_eq!(&aligned.0[1..=n], other);

        let mask = a.cmpgt_mask(b);
        for i in 0..n {
            assert_eq!((mask >> i) & 1 == 1, sample[i] > other[i]);
        }
        assert_eq!(mask >> n, 0);
        assert_eq!(V::popcnt(mask), (0..n).filter(|&i| sample[i] > other[i]).count());

        for m in 0..(1u32 << n) {
            let compacted = a.compact(m).to_vec();
            let expected = perm_table::model_compact(sample, m);
            assert_eq!(compacted, expected, "mask {m:#b}");

            let blended = a.blend(b, m).to_vec();
            for i in 0..n {
                let want = if (m >> i) & 1 == 1 { other[i] } else { sample[i] };
                assert_eq!(blended[i], want);
            }
        }

        let mins = a.min(b).to_vec();
        let maxs = a.max(b).to_vec();
        for i in 0..n {
            assert_eq!(mins[i], sample[i].min(other[i]));
            assert_eq!(maxs[i], sample[i].max(other[i]));
        }

        for x in 1..n {
            let shuffled = a.shuffle_xor(x).to_vec();
            for i in 0..n {
                assert_eq!(shuffled[i], sample[i ^ x]);
            }
        }
        let reversed = a.reverse().to_vec();
        for i in 0..n {
            assert_eq!(reversed[i], sample[n - 1 - i]);
        }

        let bias = V::broadcast(V::Lane::MIN);
        let added = a.add(bias).to_vec();
        for i in 0..n {
            assert_eq!(added[i], sample[i].wrapping_add(V::Lane::MIN));
        }
        assert_eq!(a.add(bias).sub(bias).to_vec(), sample);

        assert_eq!(V::lane_mask(1), (0..n).filter(|i| i & 1 != 0).fold(0, |m, i| m | 1 << i));
        assert_eq!(V::lane_mask(n / 2), ((1u32 << n) - 1) & !((1 << (n / 2)) - 1));
    }

    macro_rules! backend_tests {
        ($($name:ident: $vec:ty, $lane:ty, [$($a:expr),*], [$($b:expr),*];)*) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<backend_ $name>]() {
                        let sample: Vec<$lane> = vec![$($a),*];
                        let other: Vec<$lane> = vec![$($b),*];
                        check_backend::<$vec>(&sample, &other);
                    }
                )*
            }
        };
    }

    backend_tests! {
        i32x8: I32x8, i32,
            [5, -3, i32::MAX, 0, i32::MIN, 7, 7, -1],
            [4, -3, i32::MIN, 1, i32::MIN, 8, 6, i32::MAX];
        i64x4: I64x4, i64,
            [i64::MAX, -9, 0, i64::MIN],
            [3, -9, i64::MIN + 1, i64::MIN];
        portable_i32x8: Portable<i32, 8>, i32,
            [1, 2, 3, 4, -5, -6, -7, -8],
            [8, 7, 6, 5, -4, -3, -2, -1];
        portable_i64x4: Portable<i64, 4>, i64,
            [-2, 99, i64::MAX, 4],
            [-1, 98, i64::MAX, 5];
    }

    #[test]
    fn machine_parameters() {
        assert_eq!(I32x8::SMALL_SORT_THRESHOLD, 160);
        assert_eq!(I64x4::SMALL_SORT_THRESHOLD, 80);
        assert_eq!(I32x8::PARTITION_TMP_SIZE, 2 * 8 * 8 + 8 + 4 * 8);
        assert_eq!(I64x4::PARTITION_TMP_SIZE, 2 * 8 * 4 + 4 + 4 * 4);
    }
}
