//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::collections::HashMap;
use std::fmt::Debug;

use crate::bits::mask_from_prefix_len;
use crate::test::validate;
use crate::*;
use quickcheck::Arbitrary;

mod basic;

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 10000;
const DEFAULT_GEN_SIZE: usize = 100;

/// Read a numeric setting from the environment, falling back to `default`.
fn env_setting(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(default)
}

fn proptest_runner<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: F) {
    let num_tests = env_setting("QUICKCHECK_TESTS", DEFAULT_NUM_TESTS);
    let mut gen = quickcheck::Gen::new(env_setting("QUICKCHECK_GENERATOR_SIZE", DEFAULT_GEN_SIZE));

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        if !f(input.clone()) {
            shrink_failure(&f, input)
        }
    }
}

/// Shrink a failing input until none of its shrunken forms fails any more, then panic with it.
fn shrink_failure<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: &F, mut input: A) -> ! {
    while let Some(smaller) = input.shrink().find(|i| !f(i.clone())) {
        input = smaller;
    }
    panic!("[QUICKCHECK] Test case failed!\n  Minimal input:\n    {input:?}");
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// A masked 128-bit prefix. Keys are derived from a handful of base patterns so that random
/// prefixes frequently share leading bits, diverge inside compressed runs, and cross the
/// boundary between the two key words.
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
struct TestPrefix(u128, u8);

impl TestPrefix {
    fn new(key: u128, len: u8) -> Self {
        Self(key & mask_from_prefix_len::<u128>(len), len)
    }

    fn contains(&self, other: &Self) -> bool {
        self.1 <= other.1 && other.0 & mask_from_prefix_len::<u128>(self.1) == self.0
    }
}

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}/{}", self.0, self.1)
    }
}

impl RoutePrefix for TestPrefix {
    fn key(&self) -> u128 {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}

const BASES: [u128; 5] = [
    0,
    u128::MAX,
    0x2001_0db8_0000_0000_0000_0000_0000_0000,
    0xaaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa,
    0x0123_4567_89ab_cdef_fedc_ba98_7654_3210,
];

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let base = *g.choose(&BASES).unwrap();
        let noise_from: u32 = *g
            .choose(&[0, 8, 16, 32, 48, 60, 63, 64, 65, 70, 96, 120, 127, 128])
            .unwrap();
        let noise = u128::arbitrary(g).checked_shr(noise_from).unwrap_or(0);
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 2, 7, 8, 9,
                16, 24, 31, 32, 33,
                40, 48, 48, 56, 60, 63,
                64, 64, 64, 65, 66, 70,
                72, 80, 96, 100, 112,
                120, 126, 127, 128, 128,
            ])
            .unwrap();
        Self::new(base ^ noise, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self::new(self.0, self.1 - 1))
        }
    }
}

/// Reference longest-prefix match by scanning every configured prefix.
fn oracle_lpm(entries: &HashMap<TestPrefix, PopId>, query: &TestPrefix) -> (PopId, u8) {
    entries
        .iter()
        .filter(|(p, _)| p.contains(query))
        .max_by_key(|(p, _)| p.1)
        .map(|(p, pop)| (*pop, p.1))
        .unwrap_or((0, 0))
}
