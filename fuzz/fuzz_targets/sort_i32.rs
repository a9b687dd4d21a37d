#![no_main]

use libfuzzer_sys::fuzz_target;

use vxsort_fuzz::values_from_bytes;

fuzz_target!(|data: &[u8]| {
    let mut v = values_from_bytes::<i32>(data);
    let mut expected = v.clone();
    expected.sort_unstable();

    vxsort::sort(&mut v);
    assert_eq!(v, expected);
});
