//! Strategy selection and the per-family strategy cache.

use core::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    cpufeatures::new!(avx2_cpuid, "avx2");
    cpufeatures::new!(sse2_cpuid, "sse2");

    pub(crate) fn has_avx2() -> bool {
        avx2_cpuid::get()
    }

    pub(crate) fn has_sse2() -> bool {
        sse2_cpuid::get()
    }
}

/// A hardware-specific implementation of a cipher family's core function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Strategy {
    /// Portable implementation, available everywhere.
    Soft = 0,
    /// 128-bit SSE2 lanes (x86/x86_64).
    Sse2 = 1,
    /// 256-bit AVX2 lanes (x86/x86_64).
    Avx2 = 2,
    /// 128-bit NEON lanes (aarch64).
    Neon = 3,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Soft,
        Strategy::Sse2,
        Strategy::Avx2,
        Strategy::Neon,
    ];

    /// Static ranking used when several strategies are supported.
    /// Higher wins.
    pub const fn priority(self) -> u8 {
        match self {
            Strategy::Avx2 => 30,
            Strategy::Neon => 20,
            Strategy::Sse2 => 10,
            Strategy::Soft => 0,
        }
    }

    /// Short lowercase name, matching the `velocipher_backend` cfg values.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Soft => "soft",
            Strategy::Sse2 => "sse2",
            Strategy::Avx2 => "avx2",
            Strategy::Neon => "neon",
        }
    }

    /// Returns `true` if this strategy may run on the current CPU and is not
    /// excluded by compile-time configuration.
    pub fn is_supported(self) -> bool {
        if !self.allowed_by_config() {
            return false;
        }

        match self {
            Strategy::Soft => true,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Sse2 => x86::has_sse2(),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Strategy::Avx2 => x86::has_avx2(),
            #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
            Strategy::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    const fn allowed_by_config(self) -> bool {
        if cfg!(velocipher_force_soft) {
            return matches!(self, Strategy::Soft);
        }

        let only = if cfg!(velocipher_backend = "soft") {
            Some(Strategy::Soft)
        } else if cfg!(velocipher_backend = "sse2") {
            Some(Strategy::Sse2)
        } else if cfg!(velocipher_backend = "avx2") {
            Some(Strategy::Avx2)
        } else if cfg!(velocipher_backend = "neon") {
            Some(Strategy::Neon)
        } else {
            None
        };

        match only {
            Some(only) => matches!(self, Strategy::Soft) || only as u8 == self as u8,
            None => true,
        }
    }

    const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Strategy::Soft),
            1 => Some(Strategy::Sse2),
            2 => Some(Strategy::Avx2),
            3 => Some(Strategy::Neon),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a strategy is requested which the running CPU (or the
/// compile-time configuration) cannot provide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedStrategy(pub Strategy);

impl fmt::Display for UnsupportedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the {} backend is not supported on this CPU", self.0)
    }
}

impl core::error::Error for UnsupportedStrategy {}

const UNINITIALIZED: u8 = 0xff;
const PROBING: u8 = 0xfe;

/// Process-wide cache of the selected strategy for one cipher family.
///
/// The cache moves through `Uninitialized -> Probing -> Cached`. Reads after
/// population are a single atomic load; the populate path is claimed by
/// exactly one thread through a compare-and-swap while others spin until
/// the selection is published.
#[derive(Debug)]
pub struct StrategyCache {
    family: &'static str,
    candidates: &'static [Strategy],
    state: AtomicU8,
}

impl StrategyCache {
    /// Create an empty cache for `family`, which implements `candidates`.
    ///
    /// [`Strategy::Soft`] is always considered even if absent from
    /// `candidates`.
    pub const fn new(family: &'static str, candidates: &'static [Strategy]) -> Self {
        Self {
            family,
            candidates,
            state: AtomicU8::new(UNINITIALIZED),
        }
    }

    /// Name of the cipher family this cache serves.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Strategies of this family which the current CPU supports.
    pub fn supported(&self) -> impl Iterator<Item = Strategy> + '_ {
        let soft_missing = !self.candidates.contains(&Strategy::Soft);
        self.candidates
            .iter()
            .copied()
            .filter(|s| s.is_supported())
            .chain(soft_missing.then_some(Strategy::Soft))
    }

    /// Returns the highest-priority supported strategy, probing the CPU on
    /// first call.
    #[inline]
    pub fn get(&self) -> Strategy {
        match Strategy::from_u8(self.state.load(Ordering::Acquire)) {
            Some(strategy) => strategy,
            None => self.populate(),
        }
    }

    #[cold]
    fn populate(&self) -> Strategy {
        loop {
            match self.state.compare_exchange(
                UNINITIALIZED,
                PROBING,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let selected = self.probe();
                    self.state.store(selected as u8, Ordering::Release);
                    log::debug!("{}: selected {} backend", self.family, selected);
                    return selected;
                }
                Err(current) => {
                    if let Some(strategy) = Strategy::from_u8(current) {
                        return strategy;
                    }
                    core::hint::spin_loop();
                }
            }
        }
    }

    fn probe(&self) -> Strategy {
        let mut best = Strategy::Soft;
        for strategy in self.supported() {
            log::debug!("{}: {} backend available", self.family, strategy);
            if strategy.priority() > best.priority() {
                best = strategy;
            }
        }
        best
    }

    /// Bypass detection and pin `strategy` for this family.
    ///
    /// # Errors
    /// Returns [`UnsupportedStrategy`] if the strategy is not implemented by
    /// this family or cannot run on the current CPU.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn force(&self, strategy: Strategy) -> Result<(), UnsupportedStrategy> {
        if !self.supported().any(|s| s == strategy) {
            return Err(UnsupportedStrategy(strategy));
        }
        self.state.store(strategy as u8, Ordering::Release);
        log::info!("{}: forced {} backend", self.family, strategy);
        Ok(())
    }

    /// Clear the cached selection; the next [`StrategyCache::get`] probes
    /// again.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&self) {
        self.state.store(UNINITIALIZED, Ordering::Release);
        log::info!("{}: strategy cache reset", self.family);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::{thread, vec::Vec};

    static ALL_FAMILY: StrategyCache = StrategyCache::new(
        "all",
        &[Strategy::Avx2, Strategy::Neon, Strategy::Sse2, Strategy::Soft],
    );

    #[test]
    fn soft_is_always_supported() {
        assert!(Strategy::Soft.is_supported());
        let cache = StrategyCache::new("empty", &[]);
        assert_eq!(cache.get(), Strategy::Soft);
        assert_eq!(cache.supported().count(), 1);
    }

    #[test]
    fn selects_highest_priority() {
        let cache = StrategyCache::new(
            "priority",
            &[Strategy::Soft, Strategy::Sse2, Strategy::Avx2, Strategy::Neon],
        );
        let expected = cache
            .supported()
            .max_by_key(|s| s.priority())
            .unwrap();
        assert_eq!(cache.get(), expected);
        // second call is served from the cache
        assert_eq!(cache.get(), expected);
    }

    #[test]
    fn force_and_reset() {
        let cache = StrategyCache::new("hooks", &[Strategy::Soft, Strategy::Sse2]);
        let probed = cache.get();

        cache.force(Strategy::Soft).unwrap();
        assert_eq!(cache.get(), Strategy::Soft);

        assert_eq!(
            cache.force(Strategy::Avx2),
            Err(UnsupportedStrategy(Strategy::Avx2))
        );

        cache.reset();
        assert_eq!(cache.get(), probed);
    }

    #[test]
    fn concurrent_first_use_agrees() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| ALL_FAMILY.get()))
            .collect();
        let first = ALL_FAMILY.get();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    }

    #[test]
    fn roundtrip_u8() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_u8(strategy as u8), Some(strategy));
        }
        assert_eq!(Strategy::from_u8(PROBING), None);
        assert_eq!(Strategy::from_u8(UNINITIALIZED), None);
    }
}
