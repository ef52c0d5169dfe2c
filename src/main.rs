use std::time::Duration;

use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lb_probe_rs::monitor::{cancel_on_signal, Monitor, MonitorConfig};
use lb_probe_rs::prober::HttpProber;
use lb_probe_rs::resolver::SystemResolver;

/// lb-probe-rs: continuously probe every address behind a hostname over plain HTTP.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lb-probe-rs",
    version,
    about = "Continuously probe every address behind a hostname and tally HTTP outcomes per address.",
    long_about = None
)]
struct Cli {
    /// Hostname to resolve and probe each cycle.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    hostname: String,

    /// Pause between cycles in milliseconds.
    #[arg(long = "interval-ms", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Per-probe deadline in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// TCP port probed on every resolved address.
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Stop after this many cycles (default: run until interrupted).
    #[arg(long)]
    count: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,lb_probe_rs=info")),
        )
        .init();

    let cli = Cli::parse();
    info!(
        hostname = %cli.hostname,
        interval_ms = cli.interval_ms,
        timeout_ms = cli.timeout_ms,
        port = cli.port,
        count = ?cli.count,
        "starting probe"
    );

    let config = MonitorConfig {
        hostname: cli.hostname,
        interval: Duration::from_millis(cli.interval_ms),
        max_cycles: cli.count,
    };
    let prober = HttpProber::new(cli.port, Duration::from_millis(cli.timeout_ms));
    let mut monitor = Monitor::new(SystemResolver, prober);

    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel_ctrlc));

    let mut stdout = std::io::stdout();
    let cycles = monitor.run(&config, &mut stdout, cancel).await?;
    info!(cycles, keys = monitor.tally().len(), "probe stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn missing_hostname_fails_to_parse() {
        let err = Cli::try_parse_from(["lb-probe-rs"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn empty_hostname_is_rejected() {
        assert!(Cli::try_parse_from(["lb-probe-rs", ""]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["lb-probe-rs", "lb.example.com"]).unwrap();
        assert_eq!(cli.hostname, "lb.example.com");
        assert_eq!(cli.interval_ms, 1000);
        assert_eq!(cli.timeout_ms, 5000);
        assert_eq!(cli.port, 80);
        assert_eq!(cli.count, None);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["lb-probe-rs", "h", "--interval-ms", "0"]).is_err());
    }
}
