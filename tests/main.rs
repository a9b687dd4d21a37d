use sort_test_tools::instantiate_sort_tests;
use sort_test_tools::{patterns, Primitive, Sort};

use vxsort::{ElementKind, SortError, SMALL_SORT_THRESHOLD_32, SMALL_SORT_THRESHOLD_64};

struct SortImpl {}

// Goes through the runtime typed entry point, so the generic suite covers the element kind
// dispatch as well.
impl Sort for SortImpl {
    fn name() -> String {
        format!(
            "vxsort_{}_{}",
            ElementKind::I32.backend(),
            ElementKind::I64.backend()
        )
    }

    fn sort<T: Primitive>(arr: &mut [T]) {
        unsafe { vxsort::sort_raw(arr.as_mut_ptr(), arr.len()) }.unwrap();
    }
}

instantiate_sort_tests!(SortImpl);

fn is_sorted<T: PartialOrd>(v: &[T]) -> bool {
    v.windows(2).all(|w| w[0] <= w[1])
}

#[test]
fn example_input() {
    let mut v = [5, 3, 8, 1, 9, 2];
    vxsort::sort(&mut v);
    assert_eq!(v, [1, 2, 3, 5, 8, 9]);
}

#[test]
fn random_100_000_matches_reference() {
    let mut v = patterns::random(100_000);
    let mut expected = v.clone();
    expected.sort_unstable();

    vxsort::sort(&mut v);
    assert_eq!(v, expected);
}

#[test]
fn descending_past_network_threshold() {
    let mut v = (0..=SMALL_SORT_THRESHOLD_32 as i32).rev().collect::<Vec<_>>();
    vxsort::sort(&mut v);
    assert_eq!(v, (0..=SMALL_SORT_THRESHOLD_32 as i32).collect::<Vec<_>>());

    let mut v = (0..=SMALL_SORT_THRESHOLD_64 as u64).rev().collect::<Vec<_>>();
    vxsort::sort(&mut v);
    assert_eq!(v, (0..=SMALL_SORT_THRESHOLD_64 as u64).collect::<Vec<_>>());
}

#[test]
fn large_descending_recursion_is_bounded() {
    let len: usize = 1 << 18;
    let mut v = (0..len as i64).rev().collect::<Vec<_>>();
    let stats = vxsort::sort_with_stats(&mut v);

    assert!(is_sorted(&v));
    assert!(stats.partitions > 0);
    // One level past the depth limit is the heapsort fallback.
    assert!(stats.max_depth <= 2 * (len.ilog2() + 1) + 1);
}

#[test]
fn trivial_lengths() {
    let mut empty: [f32; 0] = [];
    vxsort::sort(&mut empty);

    let mut single = [-7i64];
    vxsort::sort(&mut single);
    assert_eq!(single, [-7]);

    let mut pair = [u32::MAX, 0];
    vxsort::sort(&mut pair);
    assert_eq!(pair, [0, u32::MAX]);
}

#[test]
fn idempotent() {
    let mut v = patterns::random_uniform(5_000, 0..100)
        .into_iter()
        .map(|x| x as f32 - 50.0)
        .collect::<Vec<_>>();
    vxsort::sort(&mut v);
    let once = v.clone();

    vxsort::sort(&mut v);
    assert_eq!(v, once);
    assert!(is_sorted(&v));
}

#[test]
fn all_equal_keeps_values() {
    for len in [2, SMALL_SORT_THRESHOLD_64, 10_000] {
        let mut v = vec![u64::MAX; len];
        let stats = vxsort::sort_with_stats(&mut v);
        assert!(v.iter().all(|&x| x == u64::MAX));
        assert_eq!(stats.heapsort_fallbacks, 0);
    }
}

#[test]
fn floats_total_order() {
    let mut v = vec![f64::NAN, 1.0, -0.0, f64::NEG_INFINITY, 0.0, -f64::NAN, -1.0];
    vxsort::sort(&mut v);

    let expected = [-f64::NAN, f64::NEG_INFINITY, -1.0, -0.0, 0.0, 1.0, f64::NAN];
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&v), bits(&expected));
}

#[test]
fn raw_errors() {
    let err = unsafe { vxsort::sort_raw::<u32>(std::ptr::null_mut(), 10) }.unwrap_err();
    assert_eq!(err, SortError::InvalidArgument { len: 10 });
    assert_eq!(
        err.to_string(),
        "invalid argument: null buffer with length 10"
    );

    let mut v = [(1u8, 2u8), (0, 0)];
    let err = unsafe { vxsort::sort_raw(v.as_mut_ptr(), v.len()) }.unwrap_err();
    assert!(matches!(err, SortError::UnsupportedType { size: 2, .. }));
    assert_eq!(v, [(1, 2), (0, 0)]);

    let mut v = [3i128, 1];
    assert!(unsafe { vxsort::sort_raw(v.as_mut_ptr(), v.len()) }.is_err());
}
