//! MT19937 Mersenne Twister, seeded the way CPython seeds `random.Random`.
//!
//! CPython's `random.seed(n)` for a non-negative integer splits `n` into
//! 32-bit little-endian words and feeds them to `init_by_array`. Matching
//! that exactly lets fold files produced here line up with fold files
//! produced by Python tooling for the same seed.

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// 32-bit Mersenne Twister generator.
#[derive(Clone)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    /// Seed from an integer the way CPython's `random.seed(int)` does.
    pub fn from_python_seed(seed: u64) -> Self {
        let low = seed as u32;
        let high = (seed >> 32) as u32;
        if high == 0 {
            Self::from_key(&[low])
        } else {
            Self::from_key(&[low, high])
        }
    }

    /// Seed with `init_by_array`. An empty key is treated as `[0]`.
    pub fn from_key(key: &[u32]) -> Self {
        let key: &[u32] = if key.is_empty() { &[0] } else { key };
        let mut rng = Self::from_u32(19_650_218);
        let mt = &mut rng.state;

        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_566_083_941)).wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        mt[0] = UPPER_MASK;
        rng.index = N;
        rng
    }

    /// Seed with the classic `init_genrand` routine.
    pub fn from_u32(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1] ^ (state[i - 1] >> 30);
            state[i] = 1_812_433_253u32.wrapping_mul(prev).wrapping_add(i as u32);
        }
        Self { state, index: N }
    }

    /// Next tempered 32-bit output (`genrand_uint32`).
    pub fn next_word(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    /// CPython `getrandbits(k)` for `k <= 32`.
    pub fn getrandbits(&mut self, k: u32) -> u32 {
        debug_assert!(k <= 32);
        if k == 0 {
            return 0;
        }
        self.next_word() >> (32 - k)
    }

    /// CPython `_randbelow_with_getrandbits(n)`: uniform in `[0, n)` by
    /// rejection sampling on `n.bit_length()` bits.
    pub fn randbelow(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let k = u32::BITS - n.leading_zeros();
        loop {
            let r = self.getrandbits(k);
            if r < n {
                return r;
            }
        }
    }

    fn twist(&mut self) {
        let mt = &mut self.state;
        for kk in 0..N {
            let y = (mt[kk] & UPPER_MASK) | (mt[(kk + 1) % N] & LOWER_MASK);
            let mag = if y & 1 == 1 { MATRIX_A } else { 0 };
            mt[kk] = mt[(kk + M) % N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_cpython_getrandbits_for_seed_42() {
        let mut rng = Mt19937::from_python_seed(42);
        let words: Vec<u32> = (0..3).map(|_| rng.getrandbits(32)).collect();
        assert_eq!(words, vec![2_746_317_213, 478_163_327, 107_420_369]);
    }

    #[test]
    fn matches_cpython_getrandbits_for_seed_0() {
        let mut rng = Mt19937::from_python_seed(0);
        assert_eq!(rng.next_word(), 3_626_764_237);
        assert_eq!(rng.next_word(), 1_654_615_998);
    }

    #[test]
    fn matches_reference_init_by_array_vector() {
        // First output of mt19937ar.c's own test driver.
        let mut rng = Mt19937::from_key(&[0x123, 0x234, 0x345, 0x456]);
        assert_eq!(rng.next_word(), 1_067_595_299);
    }

    #[test]
    fn randbelow_stays_in_range() {
        let mut rng = Mt19937::from_python_seed(9);
        for n in [1u32, 2, 3, 7, 8, 1000] {
            for _ in 0..50 {
                assert!(rng.randbelow(n) < n);
            }
        }
        assert_eq!(rng.randbelow(0), 0);
    }
}
