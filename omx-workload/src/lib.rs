//! Synthetic workload profiles for the RV32 mixed AMP/SMP test firmware
//!
//! Each execution context resolves its devicetree role string to a fixed
//! profile and runs a deterministic phase/loop checksum. The numbers carry
//! no meaning beyond being measurable and reproducible across runs; what
//! matters to the rest of the system is only that the computation finishes
//! before the context publishes its readiness.

#![cfg_attr(not(test), no_std)]

use heapless::Vec;

/// Upper bound on phases a report can itemize
pub const MAX_PHASES: usize = 8;

/// Immutable per-role workload parameters
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WorkloadProfile {
    /// Devicetree role string this profile belongs to
    pub dt_role: &'static str,
    /// Label carried by the console markers
    pub marker_role: &'static str,
    pub phases: u32,
    pub loops_per_phase: u32,
}

/// One profile per known role; resolved by exact string match
pub const PROFILES: [WorkloadProfile; 3] = [
    WorkloadProfile {
        dt_role: "cluster0-amp-cpu0",
        marker_role: "AMP CPU0",
        phases: 4,
        loops_per_phase: 1600,
    },
    WorkloadProfile {
        dt_role: "cluster0-amp-cpu1",
        marker_role: "AMP CPU1",
        phases: 4,
        loops_per_phase: 1700,
    },
    WorkloadProfile {
        dt_role: "cluster1-smp",
        marker_role: "CLUSTER1 SMP",
        phases: 5,
        loops_per_phase: 2400,
    },
];

/// What an unrecognized role falls back to
pub const DEFAULT_PROFILE: WorkloadProfile = WorkloadProfile {
    dt_role: "",
    marker_role: "UNKNOWN",
    phases: 3,
    loops_per_phase: 1200,
};

/// Maps a role string to its workload profile
///
/// Exact, case-sensitive equality against the fixed table; any other string
/// (the empty string included) yields [`DEFAULT_PROFILE`]. Absence of a
/// match is a normal outcome, not an error.
pub fn resolve(dt_role: &str) -> WorkloadProfile {
    PROFILES
        .iter()
        .find(|profile| profile.dt_role == dt_role)
        .copied()
        .unwrap_or(DEFAULT_PROFILE)
}

/// Checksum and per-phase partials of one finished workload run
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkloadReport {
    pub total: u32,
    /// Partial per phase, itemized up to [`MAX_PHASES`] entries; `total`
    /// always covers every phase
    pub phase_totals: Vec<u32, MAX_PHASES>,
}

/// Runs the deterministic phase/loop arithmetic for `profile`
///
/// The per-iteration term mixes the loop index, the phase number and the
/// first byte of the marker label, masked to five bits; same profile, same
/// report, every run.
pub fn run(profile: &WorkloadProfile) -> WorkloadReport {
    let label_byte = profile.marker_role.as_bytes().first().copied().unwrap_or(0) as u32;

    let mut total = 0u32;
    let mut phase_totals = Vec::new();
    for phase in 0..profile.phases {
        let mut phase_acc = 0u32;
        for i in 0..profile.loops_per_phase {
            let term = i
                .wrapping_add(phase.wrapping_mul(3))
                .wrapping_add(label_byte);
            phase_acc = phase_acc.wrapping_add(term & 0x1F);
        }

        total = total.wrapping_add(phase_acc);
        let _ = phase_totals.push(phase_acc);
    }

    WorkloadReport { total, phase_totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_resolve_to_their_documented_triples() {
        let p = resolve("cluster0-amp-cpu0");
        assert_eq!((p.phases, p.loops_per_phase, p.marker_role), (4, 1600, "AMP CPU0"));

        let p = resolve("cluster0-amp-cpu1");
        assert_eq!((p.phases, p.loops_per_phase, p.marker_role), (4, 1700, "AMP CPU1"));

        let p = resolve("cluster1-smp");
        assert_eq!((p.phases, p.loops_per_phase, p.marker_role), (5, 2400, "CLUSTER1 SMP"));
    }

    #[test]
    fn anything_else_resolves_to_the_default_triple() {
        for dt_role in ["", "cluster2-smp", "CLUSTER1-SMP", "cluster1-smp "] {
            let p = resolve(dt_role);
            assert_eq!((p.phases, p.loops_per_phase, p.marker_role), (3, 1200, "UNKNOWN"));
        }
    }

    #[test]
    fn checksum_is_deterministic() {
        for profile in &PROFILES {
            assert_eq!(run(profile), run(profile));
        }
    }

    #[test]
    fn report_itemizes_every_phase() {
        for profile in PROFILES.iter().chain([&DEFAULT_PROFILE]) {
            let report = run(profile);
            assert_eq!(report.phase_totals.len(), profile.phases as usize);
            let sum: u32 = report.phase_totals.iter().fold(0, |acc, p| acc.wrapping_add(*p));
            assert_eq!(sum, report.total);
        }
    }

    #[test]
    fn checksum_matches_a_hand_computed_case() {
        // 'A' = 65; (i + 65) & 0x1F for i in 0..4 is 1 + 2 + 3 + 4
        let tiny = WorkloadProfile {
            dt_role: "tiny",
            marker_role: "A",
            phases: 1,
            loops_per_phase: 4,
        };
        let report = run(&tiny);
        assert_eq!(report.total, 10);
        assert_eq!(report.phase_totals.as_slice(), &[10]);
    }
}
