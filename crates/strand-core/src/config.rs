//! Runtime configuration surface.
//!
//! # Design background (Why)
//! - A small explicit struct with named fields and a `const fn` constructor for the default
//!   profile, rather than a dynamic key-value bag. A concurrency kernel has a handful of
//!   knobs; a typed struct catches a misspelled key at compile time where a map would not.

/// Tie-break strategy [`crate::combinators::race`] uses when more than one child becomes
/// ready in the same poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceTieBreak {
    /// First child in declaration order wins (`left_race` semantics).
    FirstReady,
    /// A seeded LCG decides among the tied children, for fuzz/property coverage that wants to
    /// explore every ordering instead of always favoring the first.
    Random { seed: u64 },
}

impl Default for RaceTieBreak {
    fn default() -> Self {
        RaceTieBreak::FirstReady
    }
}

/// Default capacities for unbounded-looking constructors (`channel()` with no explicit
/// capacity, the internal rendezvous used by [`crate::generator::Generator`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelDefaults {
    /// Capacity used by `Channel::<T>::unbounded_default()`-style convenience constructors.
    pub default_capacity: usize,
}

impl ChannelDefaults {
    pub const fn new(default_capacity: usize) -> Self {
        Self { default_capacity }
    }
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Sizing for the executor's run-queue trampoline (how many immediately-ready continuations
/// it drains per `run_one()` before yielding control back to the host poll loop).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrampolineConfig {
    /// Scratch buffer size, in bytes, reserved for the executor's inline ready-queue storage
    /// before it spills to heap allocation.
    pub inline_scratch_bytes: usize,
}

impl TrampolineConfig {
    pub const fn new(inline_scratch_bytes: usize) -> Self {
        Self { inline_scratch_bytes }
    }
}

impl Default for TrampolineConfig {
    fn default() -> Self {
        // Matches the ~1 KiB scratch buffer budget used for the single-threaded trampoline.
        Self::new(1024)
    }
}

/// Top-level runtime configuration, threaded through [`crate::executor::LocalExecutor::with_config`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub channels: ChannelDefaults,
    pub race_tie_break: RaceTieBreak,
    pub trampoline: TrampolineConfig,
}

impl RuntimeConfig {
    pub const fn new(
        channels: ChannelDefaults,
        race_tie_break: RaceTieBreak,
        trampoline: TrampolineConfig,
    ) -> Self {
        Self {
            channels,
            race_tie_break,
            trampoline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_first_ready_tie_break() {
        let config = RuntimeConfig::default();
        assert_eq!(config.race_tie_break, RaceTieBreak::FirstReady);
        assert_eq!(config.channels.default_capacity, 1);
        assert_eq!(config.trampoline.inline_scratch_bytes, 1024);
    }
}
