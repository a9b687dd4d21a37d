use std::mem;
use std::ptr;

/// Reinterprets the fuzzer input as values of `T`, trailing bytes that don't fill a whole value
/// are dropped.
///
/// `T` must be a plain integer or float type, every bit pattern has to be valid.
pub fn values_from_bytes<T: Copy>(data: &[u8]) -> Vec<T> {
    data.chunks_exact(mem::size_of::<T>())
        // SAFETY: each chunk holds exactly `size_of::<T>()` bytes and `T` is valid for any bits.
        .map(|chunk| unsafe { ptr::read_unaligned(chunk.as_ptr().cast::<T>()) })
        .collect()
}
