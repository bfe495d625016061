//! End-to-end barrier scenarios with one OS thread per execution context.

use std::thread;
use std::time::{Duration, Instant};

use omx_sync::{
    BarrierOutcome, ReadyMask, Role, SlotTable, ROLES, SLOTS, SYNC_MAX_ATTEMPTS,
    SYNC_POLL_INTERVAL,
};

// NOTE the only test that touches the process-wide `SLOTS`; the barrier is
// single-use, so every other scenario runs on its own table
#[test]
fn all_contexts_rendezvous_within_the_budget() {
    let started = Instant::now();

    let outcome = thread::scope(|s| {
        for role in [Role::AmpCpu0, Role::AmpCpu1] {
            s.spawn(move || {
                // stagger the peers the way unequal workloads do
                thread::sleep(Duration::from_millis(5 * (role.index() as u64 + 1)));
                SLOTS.mark_ready(role.dt_role());
            });
        }

        // the coordinator publishes its own slot before waiting on the rest
        SLOTS.publish(Role::ClusterSmp);
        SLOTS.await_all(
            ReadyMask::all(),
            SYNC_MAX_ATTEMPTS,
            SYNC_POLL_INTERVAL,
            thread::sleep,
        )
    });

    assert_eq!(outcome, BarrierOutcome::Ready(ReadyMask::all()));
    assert_eq!(outcome.token(), "READY");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn missing_peer_times_out_with_a_partial_mask() {
    let table = SlotTable::new();

    let outcome = thread::scope(|s| {
        s.spawn(|| table.publish(Role::AmpCpu0));

        table.publish(Role::ClusterSmp);
        // cluster0-amp-cpu1 never comes up; keep the retry budget small so
        // the exhaustion path stays fast
        table.await_all(
            ReadyMask::all(),
            20,
            Duration::from_millis(1),
            thread::sleep,
        )
    });

    match outcome {
        BarrierOutcome::Timeout(mask) => {
            assert_eq!(mask.bits(), 0b101);
            assert!(mask.contains(Role::AmpCpu0));
            assert!(!mask.contains(Role::AmpCpu1));
            assert!(mask.contains(Role::ClusterSmp));
        }
        BarrierOutcome::Ready(_) => panic!("barrier resolved without all peers"),
    }
}

#[test]
fn every_role_round_trips_through_its_dt_string() {
    for role in ROLES {
        assert_eq!(Role::from_dt_role(role.dt_role()), Some(role));
    }
    assert_eq!(Role::from_dt_role("cluster1-smp"), Some(Role::ClusterSmp));
    assert!(Role::ClusterSmp.is_coordinator());
    assert!(!Role::AmpCpu0.is_coordinator());
}
