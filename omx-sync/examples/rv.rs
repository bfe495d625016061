//! Minimal two-party rendezvous on a fresh slot table
//!
//! Expected output:
//!
//! ```text
//! $ cargo run --example rv
//! mask before peers 0x00000004
//! mask=0x00000007 status=READY
//! ```

use std::thread;
use std::time::Duration;

use omx_sync::{ReadyMask, Role, SlotTable, SYNC_MAX_ATTEMPTS, SYNC_POLL_INTERVAL};

fn main() {
    let table = SlotTable::new();

    let outcome = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(25));
            table.publish(Role::AmpCpu0);
            table.publish(Role::AmpCpu1);
        });

        table.publish(Role::ClusterSmp);
        println!("mask before peers {}", table.poll_mask());

        table.await_all(
            ReadyMask::all(),
            SYNC_MAX_ATTEMPTS,
            SYNC_POLL_INTERVAL,
            thread::sleep,
        )
    });

    println!("mask={} status={}", outcome.mask(), outcome.token());
}
