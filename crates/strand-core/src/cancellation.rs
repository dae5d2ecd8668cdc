//! Hierarchical cancellation: signals, slots, and typed intent.
//!
//! # Design background (Why)
//! - Structured concurrency needs a way to tell a suspended child "stop" without the
//!   reactor-level primitives (sockets, timers) knowing anything about coroutines.
//!   [`CancellationSignal`] is the broadcast side a parent holds; [`CancellationSlot`] is the
//!   non-owning delivery point a child's suspension points poll or get notified through.
//! - Cancellation carries *intent* ([`CancellationType`]) rather than being a single bit:
//!   a graceful shutdown (`partial`) and an abort-now (`terminal`) need different handling
//!   at the leaf, and a slot can filter out intents it doesn't understand and let them
//!   re-raise to a parent.
//!
//! # Concurrency model (How)
//! - Single-threaded cooperative scheduling means the signal/slot pair needs no atomics for
//!   the common case: state lives in a `Cell`/`RefCell` behind an `Rc`. The `loom-model`
//!   feature swaps in `loom`'s shadow primitives so the state machine below can be model
//!   checked for the one case where `emit` genuinely can race a slot reconfiguration — a
//!   foreign-thread bridge at the reactor boundary delivering a signal into the executor.
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use crate::observability::{LogRecord, LogSeverity, Logger, NoopLogger};

/// Bitset of cancellation intents.
///
/// # Contract (What)
/// - `TERMINAL` — the operation must abandon unconditionally.
/// - `PARTIAL` — the operation may stop early but must leave a consistent partial result.
/// - `TOTAL` — the operation must abandon without committing any side effect.
///
/// Bits accumulate: emitting the same bit twice is a no-op (see
/// [`CancellationSignal::emit`]'s idempotence note).
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CancellationType(u8);

impl CancellationType {
    pub const NONE: CancellationType = CancellationType(0);
    pub const TERMINAL: CancellationType = CancellationType(0b001);
    pub const PARTIAL: CancellationType = CancellationType(0b010);
    pub const TOTAL: CancellationType = CancellationType(0b100);
    pub const ALL: CancellationType = CancellationType(0b111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        CancellationType(bits & Self::ALL.0)
    }

    pub const fn contains(self, other: CancellationType) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: CancellationType) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CancellationType {
    type Output = CancellationType;
    fn bitor(self, rhs: Self) -> Self::Output {
        CancellationType(self.0 | rhs.0)
    }
}

impl BitOrAssign for CancellationType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for CancellationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        f.write_str("CancellationType(")?;
        for (flag, name) in [
            (CancellationType::TERMINAL, "terminal"),
            (CancellationType::PARTIAL, "partial"),
            (CancellationType::TOTAL, "total"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for CancellationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Filter policy a slot applies to incoming bits.
///
/// # Contract (What)
/// - `EnableTotal` — accept every bit (the default a root task gets).
/// - `EnablePartial` — accept `partial | total`; `terminal` bits are dropped (conceptually
///   re-raised to whatever owns the next level up, which in this single-level kernel means
///   "ignored here").
/// - `EnableTerminal` — accept only `terminal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPolicy {
    EnableTotal,
    EnablePartial,
    EnableTerminal,
}

impl FilterPolicy {
    fn mask(self) -> CancellationType {
        match self {
            FilterPolicy::EnableTotal => CancellationType::ALL,
            FilterPolicy::EnablePartial => CancellationType::PARTIAL | CancellationType::TOTAL,
            FilterPolicy::EnableTerminal => CancellationType::TERMINAL,
        }
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy::EnableTotal
    }
}

#[cfg(not(loom))]
type ShareCell<T> = Cell<T>;
#[cfg(loom)]
type ShareCell<T> = loom::cell::Cell<T>;

struct Inner {
    state: ShareCell<CancellationType>,
    slot: ShareCell<Option<SlotState>>,
    logger: Rc<dyn Logger>,
}

#[derive(Clone, Copy)]
struct SlotState {
    filter: FilterPolicy,
    triggered: CancellationType,
}

/// Owns the broadcast state and the single connected slot.
///
/// # Invariants
/// - Emitting is idempotent: `old | mask == old` leaves the slot untouched.
/// - At most one slot is connected at a time; connecting a new one disconnects the old.
#[derive(Clone)]
pub struct CancellationSignal {
    inner: Rc<Inner>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::with_logger(Rc::new(NoopLogger))
    }

    /// Same as [`CancellationSignal::new`], but every state-changing [`CancellationSignal::emit`]
    /// reports the transition through `logger` instead of discarding it.
    pub fn with_logger(logger: Rc<dyn Logger>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: ShareCell::new(CancellationType::NONE),
                slot: ShareCell::new(None),
                logger,
            }),
        }
    }

    /// Current accumulated cancellation bits, independent of any slot's filter.
    pub fn state(&self) -> CancellationType {
        get(&self.inner.state)
    }

    /// Emits `mask` into the signal.
    ///
    /// # Contract (What)
    /// - Accumulates by bitwise-OR; bits already set produce no further notification.
    /// - If a slot is connected and any *newly* set bit falls inside its filter, the slot's
    ///   triggered bits are updated synchronously (there is no callback registry to invoke in
    ///   this port — observers poll [`CancellationSlot::cancelled`] at their own suspension
    ///   points, matching Rust's poll-based `Future` model rather than C++'s handler
    ///   invocation).
    pub fn emit(&self, mask: CancellationType) {
        let old = get(&self.inner.state);
        let new = old | mask;
        if new.bits() == old.bits() {
            return; // idempotent: nothing new to deliver.
        }
        set(&self.inner.state, new);
        self.inner.logger.log(LogRecord {
            target: "strand_core::cancellation",
            severity: LogSeverity::Debug,
            message: &new,
        });

        if let Some(mut slot) = get(&self.inner.slot) {
            let newly_set = CancellationType::from_bits(new.bits() & !old.bits());
            let accepted = CancellationType::from_bits(newly_set.bits() & slot.filter.mask().bits());
            if !accepted.is_empty() {
                slot.triggered |= accepted;
                set(&self.inner.slot, Some(slot));
            }
        }
    }

    /// Connects a fresh slot with the given filter, disconnecting any previous one.
    pub fn slot_with_filter(&self, filter: FilterPolicy) -> CancellationSlot {
        let triggered = CancellationType::from_bits(get(&self.inner.state).bits() & filter.mask().bits());
        set(
            &self.inner.slot,
            Some(SlotState { filter, triggered }),
        );
        CancellationSlot {
            inner: Some(self.inner.clone()),
        }
    }

    /// Connects a fresh slot that accepts every bit.
    pub fn slot(&self) -> CancellationSlot {
        self.slot_with_filter(FilterPolicy::EnableTotal)
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-owning reference to a signal's delivery point.
///
/// May be unconnected, in which case every query reports "not cancelled" — this is the state
/// a detached root task starts in when no parent wants to be able to cancel it.
#[derive(Clone)]
pub struct CancellationSlot {
    inner: Option<Rc<Inner>>,
}

impl CancellationSlot {
    /// A slot that is never connected to any signal.
    pub fn unconnected() -> Self {
        Self { inner: None }
    }

    /// Bits observed by this slot so far, after its filter was applied.
    pub fn cancelled(&self) -> CancellationType {
        match &self.inner {
            Some(inner) => get(&inner.slot).map(|s| s.triggered).unwrap_or(CancellationType::NONE),
            None => CancellationType::NONE,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        !self.cancelled().is_empty()
    }

    /// Detaches the handler but preserves the connection: the underlying signal still knows
    /// a slot exists, but this clone's cached trigger state is cleared.
    pub fn clear(&self) {
        if let Some(inner) = &self.inner {
            if let Some(mut slot) = get(&inner.slot) {
                slot.triggered = CancellationType::NONE;
                set(&inner.slot, Some(slot));
            }
        }
    }

    /// Resets the triggered bits and (optionally) installs a new filter, matching
    /// `this_coro::reset_cancellation_state(filters...)`.
    pub fn reset(&self, filter: Option<FilterPolicy>) {
        if let Some(inner) = &self.inner {
            if let Some(mut slot) = get(&inner.slot) {
                if let Some(filter) = filter {
                    slot.filter = filter;
                }
                slot.triggered = CancellationType::NONE;
                set(&inner.slot, Some(slot));
            }
        }
    }

    /// If cancelled, converts the observation into an immediate [`crate::error::StrandError`]
    /// — the "throw-if-cancelled" policy applied at every suspension point by default.
    pub fn throw_if_cancelled(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            Err(crate::error::StrandError::cancelled())
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationSlot {
    fn default() -> Self {
        Self::unconnected()
    }
}

#[cfg(not(loom))]
fn get<T: Copy>(cell: &Cell<T>) -> T {
    cell.get()
}
#[cfg(not(loom))]
fn set<T: Copy>(cell: &Cell<T>, value: T) {
    cell.set(value);
}

// loom's `Cell::with`/`with_mut` hand back a raw pointer rather than a reference, since under
// the loom model the cell may be concurrently accessed from another shadow thread; reading/
// writing through it is the one place this crate's `deny(unsafe_code)` is narrowly lifted,
// scoped to the model-checking build only.
#[cfg(loom)]
#[allow(unsafe_code)]
fn get<T: Copy>(cell: &loom::cell::Cell<T>) -> T {
    cell.with(|c| unsafe { *c })
}
#[cfg(loom)]
#[allow(unsafe_code)]
fn set<T: Copy>(cell: &loom::cell::Cell<T>, value: T) {
    cell.with_mut(|c| unsafe { *c = value });
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    struct CountingLogger {
        calls: Rc<Cell<u32>>,
    }

    impl Logger for CountingLogger {
        fn log(&self, _record: LogRecord<'_>) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn emit_logs_once_per_distinct_transition_not_on_idempotent_repeat() {
        let calls = Rc::new(Cell::new(0));
        let signal = CancellationSignal::with_logger(Rc::new(CountingLogger { calls: calls.clone() }));
        signal.emit(CancellationType::TERMINAL);
        assert_eq!(calls.get(), 1);
        signal.emit(CancellationType::TERMINAL);
        assert_eq!(calls.get(), 1, "a repeat of already-set bits must not log again");
        signal.emit(CancellationType::PARTIAL);
        assert_eq!(calls.get(), 2, "a genuinely new bit is its own transition");
    }

    #[test]
    fn emit_is_idempotent() {
        let signal = CancellationSignal::new();
        let slot = signal.slot();
        signal.emit(CancellationType::TERMINAL);
        assert_eq!(slot.cancelled(), CancellationType::TERMINAL);
        signal.emit(CancellationType::TERMINAL);
        assert_eq!(slot.cancelled(), CancellationType::TERMINAL, "repeat emit must be a no-op");
    }

    #[test]
    fn filter_drops_bits_outside_mask() {
        let signal = CancellationSignal::new();
        let slot = signal.slot_with_filter(FilterPolicy::EnableTerminal);
        signal.emit(CancellationType::PARTIAL);
        assert!(!slot.is_cancelled(), "partial must not pass an EnableTerminal filter");
        signal.emit(CancellationType::TERMINAL);
        assert!(slot.is_cancelled());
    }

    #[test]
    fn reconnecting_a_slot_disconnects_the_previous() {
        let signal = CancellationSignal::new();
        let first = signal.slot();
        let second = signal.slot();
        signal.emit(CancellationType::TOTAL);
        assert!(second.is_cancelled());
        // `first` shares the same underlying signal slot storage; reconnection replaced the
        // state entirely rather than appending a second observer, so both clones read the new
        // state (there is exactly one delivery point per signal, by construction).
        assert!(first.is_cancelled());
    }

    #[test]
    fn reset_clears_triggered_bits_and_can_swap_filter() {
        let signal = CancellationSignal::new();
        let slot = signal.slot();
        signal.emit(CancellationType::ALL);
        assert!(slot.is_cancelled());
        slot.reset(Some(FilterPolicy::EnableTerminal));
        assert!(!slot.is_cancelled());
        signal.emit(CancellationType::PARTIAL);
        assert!(!slot.is_cancelled(), "new filter should now reject partial");
    }

    #[test]
    fn unconnected_slot_never_reports_cancelled() {
        let slot = CancellationSlot::unconnected();
        assert!(!slot.is_cancelled());
        assert!(slot.throw_if_cancelled().is_ok());
    }
}
