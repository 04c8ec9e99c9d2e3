//! Mulberry32: a 32-bit state generator with a fixed mixing function.
//!
//! The output sequence for a given seed is stable across releases and matches the
//! widely used JavaScript formulation bit for bit, so point layouts reproduce exactly.
use rand::RngCore;

const INCREMENT: u32 = 0x6D2B_79F5;

/// Seeded generator whose whole state is a single `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current internal state; feeding it back into [`Mulberry32::new`] resumes the sequence.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
