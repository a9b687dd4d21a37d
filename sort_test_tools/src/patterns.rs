//! Input patterns for testing and benchmarking, generated as `i32` values.
//!
//! Every random pattern draws from a seed that is fixed per process unless `OVERRIDE_SEED` is
//! set or [`use_random_seed_each_time`] was called, so a failing run can be repeated.

use std::cmp::Reverse;
use std::env;
use std::ops::Range;
use std::sync::Mutex;

use rand::distributions::Uniform;
use rand::prelude::*;

use zipf::ZipfDistribution;

// --- Public ---

pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    let mut rng = seeded_rng();
    (0..len).map(|_| rng.gen::<i32>()).collect()
}

pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<Uniform<i32>>,
{
    // :.:.:.::

    let dist: Uniform<i32> = range.into();
    seeded_rng().sample_iter(dist).take(len).collect()
}

pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law

    if len == 0 {
        return Vec::new();
    }

    let dist = ZipfDistribution::new(len, exponent).unwrap();
    let mut rng = seeded_rng();
    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    // sorted prefix, then unsorted values from the same distribution.

    let mut v = random(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;
    v[..sorted_len.min(len)].sort_unstable();

    v
}

/// Random values drawn only from the extremes of the value range and zero.
pub fn extremes(len: usize) -> Vec<i32> {
    // :   :
    // : . :
    // :.:::

    const VALUES: [i32; 5] = [i32::MIN, i32::MIN + 1, 0, i32::MAX - 1, i32::MAX];

    random_uniform(len, 0..VALUES.len() as i32)
        .into_iter()
        .map(|i| VALUES[i as usize])
        .collect()
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; len]
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect()
}

pub fn saw_ascending(len: usize, saw_count: usize) -> Vec<i32> {
    //   .:  .:
    // .:::.:::

    saw(len, saw_count, |_| true)
}

pub fn saw_descending(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.
    // :::.:::.

    saw(len, saw_count, |_| false)
}

pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    let directions = random_uniform(saw_count.max(1) + 1, 0..=1);
    saw(len, saw_count, |i| directions[i.min(directions.len() - 1)] == 0)
}

pub fn saw_mixed_range(len: usize, range: Range<usize>) -> Vec<i32> {
    //     :.
    // :.  :::.    .::.      .:
    // :::.:::::..::::::..:.:::
    // Runs of random direction, each with a length in `range`.

    let mut v = random(len);
    let mut rng = seeded_rng();

    let mut start = 0;
    while start < len {
        let end = (start + rng.gen_range(range.clone())).min(len);
        sort_run(&mut v[start..end], rng.gen::<bool>());
        start = end;
    }

    v
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut v = random(len);
    let (first_half, second_half) = v.split_at_mut(len / 2);
    sort_run(first_half, true);
    sort_run(second_half, false);

    v
}

/// Overwrites the default behavior so that each call to a random derived pattern yields new random
/// values.
///
/// By default `patterns::random(4)` will yield the same values per process invocation.
/// Benchmarks should call this.
pub fn use_random_seed_each_time() {
    let mut seed = SEED.lock().unwrap();
    if let Some(Seed::Override(_)) = *seed {
        panic!("Using use_random_seed_each_time conflicts with the external seed override.");
    }

    *seed = Some(Seed::EachTime);
}

/// The seed the next random pattern is generated from.
pub fn random_init_seed() -> u64 {
    let mut seed = SEED.lock().unwrap();
    let seed = seed.get_or_insert_with(|| match env::var("OVERRIDE_SEED") {
        Ok(val) => Seed::Override(val.parse().expect("OVERRIDE_SEED must be a u64")),
        Err(_) => Seed::PerProcess(thread_rng().gen()),
    });

    match *seed {
        Seed::EachTime => thread_rng().gen(),
        Seed::PerProcess(val) | Seed::Override(val) => val,
    }
}

// --- Private ---

#[derive(Copy, Clone)]
enum Seed {
    EachTime,
    PerProcess(u64),
    Override(u64),
}

static SEED: Mutex<Option<Seed>> = Mutex::new(None);

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}

fn sort_run(run: &mut [i32], ascending: bool) {
    if ascending {
        run.sort_unstable();
    } else {
        run.sort_unstable_by_key(|&e| Reverse(e));
    }
}

fn saw(len: usize, saw_count: usize, ascending: impl Fn(usize) -> bool) -> Vec<i32> {
    let mut v = random(len);
    if len == 0 {
        return v;
    }

    let run_len = (len / saw_count.max(1)).max(1);
    for (i, run) in v.chunks_mut(run_len).enumerate() {
        sort_run(run, ascending(i));
    }

    v
}
