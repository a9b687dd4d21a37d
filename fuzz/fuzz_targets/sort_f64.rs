#![no_main]

use libfuzzer_sys::fuzz_target;

use vxsort_fuzz::values_from_bytes;

fuzz_target!(|data: &[u8]| {
    let mut v = values_from_bytes::<f64>(data);
    let mut expected = v.clone();
    expected.sort_unstable_by(f64::total_cmp);

    vxsort::sort(&mut v);

    // NaN payloads and signed zeros have to come out bit identical.
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&v), bits(&expected));
});
