use std::cmp::Ordering;
use std::fmt::Debug;

/// A sort implementation under test.
pub trait Sort {
    fn name() -> String;

    fn sort<T: Primitive>(arr: &mut [T]);
}

/// Fixed width primitives the test suite generates inputs for.
///
/// `total_cmp` is the order the sort under test is expected to produce, for floats that is the
/// IEEE 754 total order. Elements compare equal under it iff they are bitwise identical.
pub trait Primitive: Copy + Debug + PartialEq + 'static {
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Maps an `i32` pattern value into `Self`, never reversing the order of two values.
    fn from_pattern(val: i32) -> Self;
}

macro_rules! int_primitive {
    ($($t:ty => |$v:ident| $map:expr),* $(,)?) => {
        $(
            impl Primitive for $t {
                fn total_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn from_pattern($v: i32) -> Self {
                    $map
                }
            }
        )*
    };
}

int_primitive! {
    i32 => |val| val,
    u32 => |val| (val as u32) ^ (1 << 31),
    // Extends the value into the 64 bit range, while preserving input order.
    i64 => |val| (val as i64) * (i32::MAX as i64 + 7),
    u64 => |val| ((val as i64) + (i32::MAX as i64) + 1) as u64 * (i32::MAX as u64),
}

impl Primitive for f32 {
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn from_pattern(val: i32) -> Self {
        val as f32 / 8.0
    }
}

impl Primitive for f64 {
    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }

    fn from_pattern(val: i32) -> Self {
        val as f64 * -0.25
    }
}

pub mod patterns;
