/// Deterministic SplitMix64 generator used by seeded layout strategies.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `[0, bound]` (inclusive).
    pub(crate) fn next_inclusive(&mut self, bound: u64) -> u64 {
        if bound == u64::MAX {
            return self.next_u64();
        }
        self.next_u64() % (bound + 1)
    }
}

/// `ceil(a * b / c)` in 128-bit space, saturating to `u32`.
pub(crate) fn mul_div_ceil(a: u32, b: u32, c: u32) -> u32 {
    let c = u128::from(c.max(1));
    let v = (u128::from(a) * u128::from(b)).div_ceil(c);
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// `a * b / c` rounded half-up, saturating to `u32`.
pub(crate) fn mul_div_round(a: u32, b: u32, c: u32) -> u32 {
    let c = u128::from(c.max(1));
    let v = (u128::from(a) * u128::from(b) + c / 2) / c;
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Integer square root rounded up.
pub(crate) fn isqrt_ceil(v: u64) -> u64 {
    let mut r = (v as f64).sqrt() as u64;
    while r.saturating_mul(r) > v {
        r -= 1;
    }
    while r.saturating_mul(r) < v {
        r += 1;
    }
    r
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
