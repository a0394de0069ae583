//! Deterministic RNG streams.
//!
//! Every consumer of randomness asks for its own named stream with
//! [`create_rng`]. A stream is fully determined by `(seed, stream_id)`: the
//! pair is hashed with SHA-256 and the first 16 digest bytes become the four
//! 32-bit state words of a xoshiro128** generator. Two streams never share
//! state, so the draws of one subsystem cannot shift the draws of another
//! and replays stay bit-identical regardless of what else ran that tick.
//!
//! No stream ever consults the wall clock or the OS entropy pool.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Separator byte between seed and stream id in the digest input.
const STREAM_SEPARATOR: u8 = 0x1f;

/// Replacement state used if a digest ever yields all-zero words
/// (xoshiro cannot leave the zero state).
const FALLBACK_STATE: [u32; 4] = [0x9e37_79b9, 0x243f_6a88, 0xb7e1_5162, 0x85a3_08d3];

/// 2^32 as a float, for mapping a `u32` into [0, 1).
const TWO_POW_32: f64 = 4_294_967_296.0;

/// A deterministic random stream (xoshiro128**).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    s0: u32,
    s1: u32,
    s2: u32,
    s3: u32,
}

/// Derive the stream for `(seed, stream_id)`.
pub fn create_rng(seed: &str, stream_id: &str) -> SimRng {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update([STREAM_SEPARATOR]);
    hasher.update(stream_id.as_bytes());
    let digest = hasher.finalize();

    let mut words = [0_u32; 4];
    for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(4)) {
        let bytes: [u8; 4] = chunk.try_into().unwrap_or([0; 4]);
        *word = u32::from_le_bytes(bytes);
    }
    SimRng::from_state(words)
}

impl SimRng {
    /// Build a stream from raw state words.
    pub const fn from_state(state: [u32; 4]) -> Self {
        let [s0, s1, s2, s3] = if state[0] == 0 && state[1] == 0 && state[2] == 0 && state[3] == 0 {
            FALLBACK_STATE
        } else {
            state
        };
        Self { s0, s1, s2, s3 }
    }

    /// Current state words (for diagnostics and tests).
    pub const fn state(&self) -> [u32; 4] {
        [self.s0, self.s1, self.s2, self.s3]
    }

    /// Advance the permutation and return the next 32-bit output.
    const fn step(&mut self) -> u32 {
        let result = self.s1.wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s1 << 9;

        self.s2 ^= self.s0;
        self.s3 ^= self.s1;
        self.s1 ^= self.s2;
        self.s0 ^= self.s3;

        self.s2 ^= t;
        self.s3 = self.s3.rotate_left(11);

        result
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / TWO_POW_32
    }

    /// Sixteen random bytes, e.g. for deterministic ids.
    pub fn next_bytes16(&mut self) -> [u8; 16] {
        let mut out = [0_u8; 16];
        self.fill_bytes(&mut out);
        out
    }

    /// Consume the stream into a `() -> f64` generator.
    pub fn into_fn(mut self) -> impl FnMut() -> f64 {
        move || self.next_f64()
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.step());
        let hi = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            for (d, s) in chunk.iter_mut().zip(bytes) {
                *d = s;
            }
        }
    }
}
