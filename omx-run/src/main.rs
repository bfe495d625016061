//! Host-side rendition of the RV32 mixed AMP/SMP test workload
//!
//! One OS thread stands in for each execution context: the two AMP cores
//! and the SMP cluster each resolve their role, run the deterministic
//! checksum phases, publish readiness, and settle into the idle heartbeat.
//! The cluster coordinates the rendezvous before it idles. The `--role`
//! flag stands in for the devicetree `omx-role` property and runs a single
//! context instead.
//!
//! The `RISCV32 MIXED ...` marker lines are an output contract: downstream
//! tooling greps them off the console, so they go to stdout verbatim while
//! everything else goes through `tracing` (`RUST_LOG=debug` is the verbose
//! switch).
//!
//! Expected output:
//!
//! ```text
//! RISCV32 MIXED AMP CPU0 WORKLOAD START role=cluster0-amp-cpu0
//! RISCV32 MIXED AMP CPU0 WORKLOAD DONE total=99200
//! ...
//! RISCV32 MIXED CLUSTER1 SMP SYNC mask=0x00000007 status=READY
//! ```

use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use omx_sync::{ReadyMask, Role, SLOTS};
use omx_workload as workload;

const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(about = "Runs the mixed AMP/SMP workload with one thread per execution context")]
struct Args {
    /// Devicetree role of a single context to run; default is all three
    #[arg(long)]
    role: Option<String>,

    /// Barrier retry budget
    #[arg(long, default_value_t = omx_sync::SYNC_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Barrier poll interval in milliseconds
    #[arg(long, default_value_t = 10)]
    poll_interval_ms: u64,

    /// Heartbeats each context emits before exiting; 0 never stops, like
    /// the device
    #[arg(long, default_value_t = 5)]
    heartbeats: u32,
}

#[derive(Clone, Copy)]
struct Timing {
    max_attempts: u32,
    poll_interval: Duration,
    heartbeats: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let timing = Timing {
        max_attempts: args.max_attempts,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        heartbeats: args.heartbeats,
    };

    match &args.role {
        Some(dt_role) => context_main(dt_role, timing),
        None => thread::scope(|s| {
            for role in [Role::AmpCpu0, Role::AmpCpu1] {
                s.spawn(move || context_main(role.dt_role(), timing));
            }

            // the coordinator runs on the main thread
            context_main(Role::ClusterSmp.dt_role(), timing);
        }),
    }
}

/// Everything one execution context does from boot to heartbeat
fn context_main(dt_role: &str, timing: Timing) {
    let profile = workload::resolve(dt_role);
    let marker = profile.marker_role;

    println!("RISCV32 MIXED {marker} WORKLOAD START role={dt_role}");
    info!(
        role = dt_role,
        marker,
        phases = profile.phases,
        loops_per_phase = profile.loops_per_phase,
        "workload start"
    );

    let report = workload::run(&profile);
    for (phase, phase_acc) in report.phase_totals.iter().enumerate() {
        debug!(marker, phase, phase_acc, "phase finished");
    }

    println!("RISCV32 MIXED {marker} WORKLOAD DONE total={}", report.total);
    info!(marker, total = report.total, "workload completed");

    // release-store: the finished checksum above is visible to whoever
    // observes our ready bit
    SLOTS.mark_ready(dt_role);

    if Role::from_dt_role(dt_role).is_some_and(Role::is_coordinator) {
        // own slot is already published, so the target includes our bit
        let outcome = SLOTS.await_all(
            ReadyMask::all(),
            timing.max_attempts,
            timing.poll_interval,
            thread::sleep,
        );

        println!(
            "RISCV32 MIXED {marker} SYNC mask={} status={}",
            outcome.mask(),
            outcome.token()
        );
        if !outcome.is_ready() {
            // degraded, not fatal; the device heartbeats regardless
            warn!(marker, mask = %outcome.mask(), "peers missed the rendezvous window");
        }
    }

    heartbeat(marker, report.total, timing.heartbeats);
}

/// Post-barrier idle loop; `beats == 0` selects the device behavior and
/// never returns
fn heartbeat(marker: &str, total: u32, beats: u32) {
    if beats == 0 {
        heartbeat_forever(marker, total);
    }

    for heartbeat in 0..beats {
        if heartbeat % 5 == 0 {
            debug!(marker, heartbeat, total, "heartbeat");
        }
        thread::sleep(HEARTBEAT_INTERVAL);
    }
}

fn heartbeat_forever(marker: &str, total: u32) -> ! {
    let mut heartbeat = 0u32;
    loop {
        if heartbeat % 5 == 0 {
            debug!(marker, heartbeat, total, "heartbeat");
        }
        thread::sleep(HEARTBEAT_INTERVAL);
        heartbeat = heartbeat.wrapping_add(1);
    }
}
