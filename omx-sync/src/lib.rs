//! Readiness rendezvous for the RV32 mixed AMP/SMP workload
//!
//! Three execution contexts (two AMP cores and one SMP cluster) finish their
//! workload phases independently and then meet at a barrier built on plain
//! shared memory. Every context owns one 32-bit slot and publishes a role
//! signature into it with a release-store; the coordinating context
//! acquire-loads all slots and waits, bounded by a retry budget, for the
//! aggregate mask to reach the target.
//!
//! No locks and no compare-and-swap: no context ever writes another's slot,
//! so the publish side has no write-write races by construction. The
//! release/acquire pairing on each slot makes everything a context did
//! before [`SlotTable::mark_ready`] visible to the coordinator once that
//! context's bit is observed. There is no ordering guarantee *between*
//! different slots; each one is an independent happens-before edge.

#![cfg_attr(not(test), no_std)]

use core::fmt;
use core::time::Duration;

use portable_atomic::{AtomicU32, Ordering};

/// Signature of `cluster0-amp-cpu0` ("APC0")
pub const SIG_AMP_CPU0: u32 = 0x4150_4330;
/// Signature of `cluster0-amp-cpu1` ("APC1")
pub const SIG_AMP_CPU1: u32 = 0x4150_4331;
/// Signature of `cluster1-smp` ("SMP2")
pub const SIG_CLUSTER_SMP: u32 = 0x534d_5032;

/// Default barrier poll interval
pub const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Default barrier retry budget (300 * 10 ms ~= 3 s)
pub const SYNC_MAX_ATTEMPTS: u32 = 300;

// a slot holding anything other than its role's exact signature must never
// read as ready, so the signatures have to be non-zero and pairwise distinct
const _: () = {
    assert!(SIG_AMP_CPU0 != 0 && SIG_AMP_CPU1 != 0 && SIG_CLUSTER_SMP != 0);
    assert!(SIG_AMP_CPU0 != SIG_AMP_CPU1);
    assert!(SIG_AMP_CPU0 != SIG_CLUSTER_SMP);
    assert!(SIG_AMP_CPU1 != SIG_CLUSTER_SMP);
};

/// One fixed participant identity in the multi-core workload
///
/// The set is closed; identity is established once at boot from the
/// devicetree role string and never changes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    AmpCpu0 = 0,
    AmpCpu1 = 1,
    ClusterSmp = 2,
}

/// All participants, in slot order
pub const ROLES: [Role; 3] = [Role::AmpCpu0, Role::AmpCpu1, Role::ClusterSmp];

impl Role {
    /// Looks up a role by its devicetree role string
    ///
    /// Exact, case-sensitive match; anything else is `None`.
    pub fn from_dt_role(dt_role: &str) -> Option<Role> {
        match dt_role {
            "cluster0-amp-cpu0" => Some(Role::AmpCpu0),
            "cluster0-amp-cpu1" => Some(Role::AmpCpu1),
            "cluster1-smp" => Some(Role::ClusterSmp),
            _ => None,
        }
    }

    pub const fn dt_role(self) -> &'static str {
        match self {
            Role::AmpCpu0 => "cluster0-amp-cpu0",
            Role::AmpCpu1 => "cluster0-amp-cpu1",
            Role::ClusterSmp => "cluster1-smp",
        }
    }

    /// The non-zero marker value this role stores to prove that *it*, and
    /// not arbitrary memory noise, reached the ready state
    pub const fn signature(self) -> u32 {
        match self {
            Role::AmpCpu0 => SIG_AMP_CPU0,
            Role::AmpCpu1 => SIG_AMP_CPU1,
            Role::ClusterSmp => SIG_CLUSTER_SMP,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn bit(self) -> u32 {
        1 << self.index()
    }

    /// The SMP cluster drives the barrier; the AMP cores only publish
    pub const fn is_coordinator(self) -> bool {
        matches!(self, Role::ClusterSmp)
    }
}

/// Aggregate readiness, one bit per role
///
/// Bit *i* is set iff slot *i* currently holds exactly signature *i*.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadyMask(u32);

impl ReadyMask {
    pub const EMPTY: ReadyMask = ReadyMask(0);

    /// The target mask: union of all role bits
    pub const fn all() -> ReadyMask {
        let mut bits = 0;
        let mut i = 0;
        while i < ROLES.len() {
            bits |= ROLES[i].bit();
            i += 1;
        }
        ReadyMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    const fn with(self, role: Role) -> ReadyMask {
        ReadyMask(self.0 | role.bit())
    }
}

impl fmt::Display for ReadyMask {
    /// Fixed-width hex, the form the console markers carry
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::LowerHex for ReadyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// How a bounded wait at the barrier resolved
///
/// Both variants carry the last observed mask. `Timeout` is a degraded
/// status, not an error: the caller logs it and proceeds regardless.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BarrierOutcome {
    Ready(ReadyMask),
    Timeout(ReadyMask),
}

impl BarrierOutcome {
    pub const fn mask(self) -> ReadyMask {
        match self {
            BarrierOutcome::Ready(mask) | BarrierOutcome::Timeout(mask) => mask,
        }
    }

    pub const fn is_ready(self) -> bool {
        matches!(self, BarrierOutcome::Ready(_))
    }

    /// Exact status token; downstream log parsers depend on this pair
    pub const fn token(self) -> &'static str {
        match self {
            BarrierOutcome::Ready(_) => "READY",
            BarrierOutcome::Timeout(_) => "TIMEOUT",
        }
    }
}

/// The shared slot region: one dedicated cell per role
///
/// Distinct cells give every role exclusive write ownership of its own
/// address; readers only ever observe whole published signatures. Slots
/// start at zero, are written once per run, and are never reset -- the
/// barrier is single-use per process lifetime.
pub struct SlotTable {
    slots: [AtomicU32; ROLES.len()],
}

impl SlotTable {
    pub const fn new() -> SlotTable {
        SlotTable {
            slots: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    /// Publishes readiness for `dt_role`
    ///
    /// Unknown role strings have no slot and no signature, so they are
    /// silently skipped; that is a normal outcome, not an error.
    pub fn mark_ready(&self, dt_role: &str) {
        if let Some(role) = Role::from_dt_role(dt_role) {
            self.publish(role);
        }
    }

    /// Release-stores `role`'s signature into its own slot
    ///
    /// Idempotent: a second publish stores the same value again.
    pub fn publish(&self, role: Role) {
        self.slots[role.index()].store(role.signature(), Ordering::Release);
    }

    /// Acquire-loads every slot and aggregates the readiness bits
    ///
    /// Pure observation; safe to call concurrently with any number of
    /// in-flight publishes. A partial or foreign value never sets a bit.
    pub fn poll_mask(&self) -> ReadyMask {
        let mut mask = ReadyMask::EMPTY;
        for role in ROLES {
            if self.slots[role.index()].load(Ordering::Acquire) == role.signature() {
                mask = mask.with(role);
            }
        }
        mask
    }

    /// Waits, bounded, for the mask to reach `target`
    ///
    /// Polls up to `max_attempts` times, handing `poll_interval` to `idle`
    /// between attempts so the caller decides how the context yields the
    /// processor (`thread::sleep` on a host, a counter in tests). Returns
    /// `Ready` the moment the target is observed; exhaustion returns
    /// `Timeout` carrying the last observed mask. There is no cancellation.
    pub fn await_all(
        &self,
        target: ReadyMask,
        max_attempts: u32,
        poll_interval: Duration,
        mut idle: impl FnMut(Duration),
    ) -> BarrierOutcome {
        let mut seen = ReadyMask::EMPTY;
        for attempt in 1..=max_attempts {
            seen = self.poll_mask();
            if seen == target {
                return BarrierOutcome::Ready(seen);
            }
            if attempt != max_attempts {
                idle(poll_interval);
            }
        }
        BarrierOutcome::Timeout(seen)
    }
}

impl Default for SlotTable {
    fn default() -> SlotTable {
        SlotTable::new()
    }
}

/// The slot region shared by every context in the process
pub static SLOTS: SlotTable = SlotTable::new();
