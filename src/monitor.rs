use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::prober::HttpProber;
use crate::report;
use crate::resolver::Resolve;
use crate::tally::Tally;
use crate::types::Outcome;

/// Settings for one monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub hostname: String,
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Stop after this many cycles. `None` runs until cancelled.
    pub max_cycles: Option<u64>,
}

/// Result of one resolve → probe-all → aggregate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// Addresses were probed and tallied; `line` is the report to print.
    Reported { outcomes: Vec<Outcome>, line: String },
    /// The hostname resolved to no addresses.
    Empty,
    /// Resolution failed; nothing was probed or counted.
    Unresolved,
}

/// Drives the probe loop and owns the cumulative tally.
///
/// Cycles run strictly one after another, so the tally is only ever
/// touched from `run_cycle` and needs no lock.
pub struct Monitor<R> {
    resolver: R,
    prober: HttpProber,
    tally: Tally,
}

impl<R: Resolve> Monitor<R> {
    pub fn new(resolver: R, prober: HttpProber) -> Self {
        Self {
            resolver,
            prober,
            tally: Tally::new(),
        }
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Resolve `hostname`, probe every address concurrently, fold the
    /// outcomes into the tally, and build the report line.
    pub async fn run_cycle(&mut self, hostname: &str) -> Cycle {
        let ips = match self.resolver.resolve(hostname).await {
            Ok(ips) => ips,
            Err(e) => {
                warn!(error = %e, hostname, "resolution failed; skipping cycle");
                return Cycle::Unresolved;
            }
        };
        if ips.is_empty() {
            debug!(hostname, "no addresses resolved");
            return Cycle::Empty;
        }

        let outcomes = self.prober.probe_all(&ips).await;
        self.tally.record_all(&outcomes);

        let clock = report::clock(OffsetDateTime::now_utc());
        let line = report::format_line(&clock, &outcomes, &self.tally);
        Cycle::Reported { outcomes, line }
    }

    /// Run cycles until `cancel` fires or `max_cycles` is reached, writing
    /// one line to `out` per reported cycle. Returns the number of cycles run.
    ///
    /// Each tick sleeps first and then runs a full cycle; the next sleep
    /// starts only after that cycle has finished. Cancellation is observed
    /// during the sleep.
    pub async fn run<W: Write>(
        &mut self,
        config: &MonitorConfig,
        out: &mut W,
        cancel: CancellationToken,
    ) -> Result<u64> {
        let mut cycles = 0u64;
        loop {
            if config.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(config.interval) => {}
            }

            if let Cycle::Reported { line, .. } = self.run_cycle(&config.hostname).await {
                writeln!(out, "{line}").context("failed to write report line")?;
                out.flush().context("failed to flush report output")?;
            }
            cycles += 1;
        }
        debug!(cycles, "monitor stopped");
        Ok(cycles)
    }
}

/// Cancel `cancel` once `signal` fires.
///
/// If the signal handler could not be installed, the error is logged and the
/// token is left alone, so the monitor keeps running until killed.
pub async fn cancel_on_signal<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => cancel.cancel(),
        Err(e) => warn!(error = %e, "ctrl-c handler unavailable; run until killed"),
    }
}
