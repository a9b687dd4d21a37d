//! AVX2 backend. Only compiled when the crate is built with `target_feature = "avx2"`, so the
//! intrinsics below are always supported by the executing CPU.

use core::arch::x86_64::*;

use crate::perm_table::{ENTRY_BYTES, PERM_TABLE_32, PERM_TABLE_64};
use crate::vector::{is_vector_aligned, VectorOps};

#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub(crate) struct I32x8(__m256i);

#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub(crate) struct I64x4(__m256i);

/// Sub-lane indices `0..8`.
#[inline(always)]
unsafe fn iota32() -> __m256i {
    _mm256_setr_epi32(0, 1, 2, 3, 4, 5, 6, 7)
}

/// Widens the 8 byte table entry for `mask` into a `vpermd` index vector.
#[inline(always)]
unsafe fn load_permutation(table: &'static [u8], mask: u32) -> __m256i {
    debug_assert!(mask as usize * ENTRY_BYTES + 16 <= table.len());
    let entry = table.as_ptr().add(mask as usize * ENTRY_BYTES);
    _mm256_cvtepu8_epi32(_mm_loadu_si128(entry as *const __m128i))
}

macro_rules! avx2_common {
    () => {
        #[inline(always)]
        unsafe fn load(ptr: *const Self::Lane) -> Self {
            Self(_mm256_loadu_si256(ptr as *const __m256i))
        }

        #[inline(always)]
        unsafe fn load_aligned(ptr: *const Self::Lane) -> Self {
            debug_assert!(is_vector_aligned(ptr));
            Self(_mm256_load_si256(ptr as *const __m256i))
        }

        #[inline(always)]
        unsafe fn store(self, ptr: *mut Self::Lane) {
            _mm256_storeu_si256(ptr as *mut __m256i, self.0);
        }

        #[inline(always)]
        unsafe fn store_aligned(self, ptr: *mut Self::Lane) {
            debug_assert!(is_vector_aligned(ptr));
            _mm256_store_si256(ptr as *mut __m256i, self.0);
        }
    };
}

// SAFETY (both impls): AVX2 is statically enabled for this module, see the module docs.

impl VectorOps for I32x8 {
    type Lane = i32;

    const N: usize = 8;
    const NAME: &'static str = "avx2-i32x8";

    avx2_common!();

    #[inline(always)]
    fn broadcast(value: i32) -> Self {
        unsafe { Self(_mm256_set1_epi32(value)) }
    }

    #[inline(always)]
    fn cmpgt_mask(self, other: Self) -> u32 {
        unsafe {
            let gt = _mm256_cmpgt_epi32(self.0, other.0);
            _mm256_movemask_ps(_mm256_castsi256_ps(gt)) as u32
        }
    }

    #[inline(always)]
    fn compact(self, mask: u32) -> Self {
        unsafe {
            let perm = load_permutation(&PERM_TABLE_32, mask);
            Self(_mm256_permutevar8x32_epi32(self.0, perm))
        }
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        unsafe { Self(_mm256_add_epi32(self.0, other.0)) }
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        unsafe { Self(_mm256_sub_epi32(self.0, other.0)) }
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        unsafe { Self(_mm256_min_epi32(self.0, other.0)) }
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        unsafe { Self(_mm256_max_epi32(self.0, other.0)) }
    }

    #[inline(always)]
    fn shuffle_xor(self, x: usize) -> Self {
        debug_assert!(x < Self::N);
        unsafe {
            let idx = _mm256_xor_si256(iota32(), _mm256_set1_epi32(x as i32));
            Self(_mm256_permutevar8x32_epi32(self.0, idx))
        }
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: u32) -> Self {
        unsafe {
            let bits = _mm256_setr_epi32(1, 2, 4, 8, 16, 32, 64, 128);
            let sel = _mm256_and_si256(_mm256_set1_epi32(mask as i32), bits);
            let sel = _mm256_cmpeq_epi32(sel, bits);
            Self(_mm256_blendv_epi8(self.0, other.0, sel))
        }
    }
}

impl VectorOps for I64x4 {
    type Lane = i64;

    const N: usize = 4;
    const NAME: &'static str = "avx2-i64x4";

    avx2_common!();

    #[inline(always)]
    fn broadcast(value: i64) -> Self {
        unsafe { Self(_mm256_set1_epi64x(value)) }
    }

    #[inline(always)]
    fn cmpgt_mask(self, other: Self) -> u32 {
        unsafe {
            let gt = _mm256_cmpgt_epi64(self.0, other.0);
            _mm256_movemask_pd(_mm256_castsi256_pd(gt)) as u32
        }
    }

    #[inline(always)]
    fn compact(self, mask: u32) -> Self {
        unsafe {
            let perm = load_permutation(&PERM_TABLE_64, mask);
            Self(_mm256_permutevar8x32_epi32(self.0, perm))
        }
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        unsafe { Self(_mm256_add_epi64(self.0, other.0)) }
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        unsafe { Self(_mm256_sub_epi64(self.0, other.0)) }
    }

    // AVX2 has no 64-bit min/max, select through the signed comparison instead.
    #[inline(always)]
    fn min(self, other: Self) -> Self {
        unsafe {
            let gt = _mm256_cmpgt_epi64(self.0, other.0);
            Self(_mm256_blendv_epi8(self.0, other.0, gt))
        }
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        unsafe {
            let gt = _mm256_cmpgt_epi64(self.0, other.0);
            Self(_mm256_blendv_epi8(other.0, self.0, gt))
        }
    }

    #[inline(always)]
    fn shuffle_xor(self, x: usize) -> Self {
        debug_assert!(x < Self::N);
        unsafe {
            // 64-bit lane `i ^ x` is the sub-lane pair `(2i + s) ^ 2x`.
            let idx = _mm256_xor_si256(iota32(), _mm256_set1_epi32(2 * x as i32));
            Self(_mm256_permutevar8x32_epi32(self.0, idx))
        }
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: u32) -> Self {
        unsafe {
            let bits = _mm256_setr_epi64x(1, 2, 4, 8);
            let sel = _mm256_and_si256(_mm256_set1_epi64x(mask as i64), bits);
            let sel = _mm256_cmpeq_epi64(sel, bits);
            Self(_mm256_blendv_epi8(self.0, other.0, sel))
        }
    }
}
