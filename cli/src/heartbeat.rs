//! Heartbeat loop.
//!
//! Prints one line per tick of an [`IntervalRunner`]. Half way to the tick
//! limit the runner is re-configured with a fresh action at the same delay;
//! the following lines show the new phase while the runner's stats still show
//! a single timer registration.

use std::fmt;
use std::future::Future;
use std::io::{self, Write};

use cadence_core::{Action, Delay, IntervalRunner, RunnerStats};
use cadence_runtime::TokioTimer;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Warmup,
    Steady,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Warmup => "warmup",
            Phase::Steady => "steady",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub beats: u64,
    /// True if `shutdown` fired before the tick limit was reached.
    pub interrupted: bool,
    pub stats: RunnerStats,
}

fn beat_action(phase: Phase, tx: mpsc::UnboundedSender<Phase>) -> Action {
    Action::new(move || {
        // Receiver outlives the runner; a send error only means we are shutting down.
        let _ = tx.send(phase);
    })
}

/// Run the heartbeat until `max_ticks` beats or until `shutdown` completes.
///
/// Must run inside a `LocalSet`. A disabled `delay` or a limit of zero returns
/// immediately without registering a timer.
pub async fn run<W, S>(
    delay: Delay,
    max_ticks: Option<u64>,
    out: &mut W,
    shutdown: S,
) -> io::Result<Summary>
where
    W: Write,
    S: Future<Output = ()>,
{
    let mut runner = IntervalRunner::new(TokioTimer::new());
    if delay.is_disabled() || max_ticks == Some(0) {
        return Ok(Summary {
            beats: 0,
            interrupted: false,
            stats: runner.teardown(),
        });
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    runner.configure(beat_action(Phase::Warmup, tx.clone()), delay);
    info!(%delay, ?max_ticks, "heartbeat started");

    let switch_at = max_ticks.map(|max| max / 2).filter(|&beat| beat > 0);
    tokio::pin!(shutdown);

    let mut beats = 0_u64;
    let interrupted = loop {
        tokio::select! {
            () = &mut shutdown => break true,
            Some(phase) = rx.recv() => {
                beats += 1;
                writeln!(out, "beat {beats} [{phase}]")?;
                out.flush()?;

                if Some(beats) == switch_at {
                    debug!(beats, "switching heartbeat action");
                    runner.configure(beat_action(Phase::Steady, tx.clone()), delay);
                }
                if max_ticks.is_some_and(|max| beats >= max) {
                    break false;
                }
            }
        }
    };

    let stats = runner.teardown();
    info!(
        beats,
        interrupted,
        registrations = stats.registrations,
        releases = stats.releases,
        ticks = stats.ticks,
        "heartbeat stopped"
    );
    Ok(Summary {
        beats,
        interrupted,
        stats,
    })
}
