//! Vectorized quicksort for slices of 32-bit and 64-bit primitives.
//!
//! Ranges are partitioned with 256-bit vector registers from both ends at once, small ranges are
//! finished by a vectorized bitonic network and heapsort bounds the worst case. The vector
//! backend is chosen at compile time: AVX2 when the crate is built with
//! `-C target-feature=+avx2` (or a `target-cpu` that implies it), otherwise an array backed
//! fallback with identical semantics.
//!
//! The sort is unstable, in-place and allocates a single scratch buffer of a few hundred bytes
//! for inputs that need partitioning.

use std::any::{type_name, TypeId};
use std::fmt;
use std::mem;
use std::slice;

use log::debug;

mod bitonic;
mod error;
mod heapsort;
mod key;
mod partition;
mod perm_table;
mod quicksort;
mod vector;

pub use error::{Result, SortError};
pub use key::VxSortable;
pub use quicksort::SortStats;

use vector::{I32x8, I64x4, VectorOps};

/// Inputs up to this length are sorted by the sorting network alone, 32-bit element types.
pub const SMALL_SORT_THRESHOLD_32: usize = <I32x8 as VectorOps>::SMALL_SORT_THRESHOLD;

/// Inputs up to this length are sorted by the sorting network alone, 64-bit element types.
pub const SMALL_SORT_THRESHOLD_64: usize = <I64x4 as VectorOps>::SMALL_SORT_THRESHOLD;

/// Element types with a vector implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    I32,
    U32,
    F32,
    I64,
    U64,
    F64,
}

impl ElementKind {
    /// The kind of `T`, `None` if `T` can't be sorted.
    pub fn of<T: 'static>() -> Option<Self> {
        let id = TypeId::of::<T>();
        [
            (TypeId::of::<i32>(), ElementKind::I32),
            (TypeId::of::<u32>(), ElementKind::U32),
            (TypeId::of::<f32>(), ElementKind::F32),
            (TypeId::of::<i64>(), ElementKind::I64),
            (TypeId::of::<u64>(), ElementKind::U64),
            (TypeId::of::<f64>(), ElementKind::F64),
        ]
        .into_iter()
        .find_map(|(kind_id, kind)| (kind_id == id).then_some(kind))
    }

    /// Element size in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 => 8,
        }
    }

    /// Lanes per vector register.
    pub const fn lanes(self) -> usize {
        32 / self.size()
    }

    pub const fn small_sort_threshold(self) -> usize {
        match self.size() {
            4 => SMALL_SORT_THRESHOLD_32,
            _ => SMALL_SORT_THRESHOLD_64,
        }
    }

    /// Name of the vector backend compiled in for this kind.
    pub fn backend(self) -> &'static str {
        match self.size() {
            4 => <I32x8 as VectorOps>::NAME,
            _ => <I64x4 as VectorOps>::NAME,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::I32 => "i32",
            ElementKind::U32 => "u32",
            ElementKind::F32 => "f32",
            ElementKind::I64 => "i64",
            ElementKind::U64 => "u64",
            ElementKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Sorts the slice, but might not preserve the order of equal elements.
///
/// This sort is unstable (i.e., may reorder equal elements), in-place and
/// *O*(*n* \* log(*n*)) worst-case. Floats are ordered like [`f32::total_cmp`]:
/// `-NaN < -inf < .. < -0.0 < +0.0 < .. < +inf < NaN`.
///
/// # Current implementation
///
/// An introsort over vector registers: median-of-three pivots, a double-ended vectorized
/// partition, a bitonic sorting network for ranges of up to [`SMALL_SORT_THRESHOLD_32`] or
/// [`SMALL_SORT_THRESHOLD_64`] elements and heapsort once the recursion gets too deep.
#[inline]
pub fn sort<T: VxSortable>(v: &mut [T]) {
    sort_with_stats(v);
}

/// Like [`sort`], and returns what the sort did.
pub fn sort_with_stats<T: VxSortable>(v: &mut [T]) -> SortStats {
    if v.len() < 2 {
        return SortStats::default();
    }

    debug!(
        "sorting {} {} elements with {}",
        v.len(),
        T::KIND,
        T::KIND.backend()
    );
    let stats = T::sort_in_place(v);
    debug!("sorted {} {} elements: {:?}", v.len(), T::KIND, stats);

    stats
}

/// Sorts `len` elements starting at `ptr`, for callers that only know their element type at
/// runtime.
///
/// Fails with [`SortError::InvalidArgument`] if `ptr` is null and `len > 0`, and with
/// [`SortError::UnsupportedType`] if `T` is not one of the [`ElementKind`]s. Both are checked
/// before any element is touched.
///
/// # Safety
///
/// Unless `len == 0`, `ptr` must be valid for reads and writes of `len` elements of `T` and not
/// be accessed through any other pointer for the duration of the call.
pub unsafe fn sort_raw<T: 'static>(ptr: *mut T, len: usize) -> Result<()> {
    if ptr.is_null() && len > 0 {
        return Err(SortError::InvalidArgument { len });
    }

    let kind = ElementKind::of::<T>().ok_or(SortError::UnsupportedType {
        type_name: type_name::<T>(),
        size: mem::size_of::<T>(),
    })?;

    if len < 2 {
        return Ok(());
    }

    match kind {
        ElementKind::I32 => sort(slice::from_raw_parts_mut(ptr.cast::<i32>(), len)),
        ElementKind::U32 => sort(slice::from_raw_parts_mut(ptr.cast::<u32>(), len)),
        ElementKind::F32 => sort(slice::from_raw_parts_mut(ptr.cast::<f32>(), len)),
        ElementKind::I64 => sort(slice::from_raw_parts_mut(ptr.cast::<i64>(), len)),
        ElementKind::U64 => sort(slice::from_raw_parts_mut(ptr.cast::<u64>(), len)),
        ElementKind::F64 => sort(slice::from_raw_parts_mut(ptr.cast::<f64>(), len)),
    }

    Ok(())
}
