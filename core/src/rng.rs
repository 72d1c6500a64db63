//! Deterministic random number generation for the sample-data generator.
//!
//! RULE: The generator never touches a platform RNG. All randomness
//! flows through SamplerRng streams derived from the single master
//! seed, one stream per sampler slot. This means:
//!   - Same seed ⇒ byte-identical generated dataset.
//!   - Adding a new sampler never changes existing samplers' streams.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single sampler.
pub struct SamplerRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SamplerRng {
    /// Derive a sampler RNG from the master seed and a stable slot
    /// index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// Pick an index from cumulative weights; weights need not sum to 1.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || weights.is_empty() {
            return 0;
        }
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return i;
            }
        }
        weights.len() - 1
    }
}

/// All sampler RNGs for a single generator run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_sampler(&self, slot: SamplerSlot) -> SamplerRng {
        SamplerRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable sampler slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every sampler's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SamplerSlot {
    Customers = 0,
    Orders = 1,
    Amounts = 2,
    Attributes = 3,
    // Add new samplers here — append only.
}

impl SamplerSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Amounts => "amounts",
            Self::Attributes => "attributes",
        }
    }
}
