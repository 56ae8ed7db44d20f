use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Get the serde-serialized name of a unit enum variant.
/// Uses serde's own rules (rename_all, rename, etc.) as the single source of truth.
/// Returns `None` for non-string variants (data-carrying variants).
pub fn serde_variant_name<T: Serialize>(val: &T) -> Option<String> {
    match serde_json::to_value(val) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Get serde-serialized names for all variants of an enum.
pub fn serde_variant_names<T: Serialize>(variants: &[T]) -> Vec<String> {
    variants.iter().filter_map(serde_variant_name).collect()
}

/// Deserialize a string into an enum variant using serde's own rules.
pub fn from_serde_str<T: for<'de> serde::Deserialize<'de>>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

// ── Jitter ───────────────────────────────────────────────────────

/// Small splitmix64 generator. Providers take `&mut Jitter` so a fixed
/// seed gives fully reproducible output.
#[derive(Debug, Clone)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0.0, 1.0).
    #[allow(clippy::cast_precision_loss)]
    pub fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// True with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }

    pub fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform integer in `0..n`. Returns 0 when `n == 0`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.next_u64() % n as u64) as usize
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let i = self.below(items.len());
        items.get(i)
    }
}

/// Hands out a fresh [`Jitter`] per request. With a configured seed the
/// sequence of generators is deterministic; otherwise it is clock-seeded.
#[derive(Debug)]
pub struct JitterSource {
    seed: Option<u64>,
    counter: AtomicU64,
}

impl JitterSource {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }

    pub fn draw(&self) -> Jitter {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let base = self.seed.unwrap_or_else(clock_seed);
        Jitter::seeded(base ^ n.wrapping_mul(0xA24B_AED4_963E_E407))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0x5EED, |d| d.as_nanos() as u64)
}
