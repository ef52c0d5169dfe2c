//! Rendering of the per-cycle report line.

use time::OffsetDateTime;

use crate::tally::Tally;
use crate::types::Outcome;

/// Column width for the address; fits any dotted-quad IPv4 address.
pub const ADDRESS_WIDTH: usize = 15;
/// Column width for the `-> status text` segment.
pub const STATUS_WIDTH: usize = 20;

/// `HH:MM:SS` wall-clock stamp. Callers pass UTC so the whole run is consistent.
pub fn clock(now: OffsetDateTime) -> String {
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

/// One report line: clock, each probed address with its status in probe
/// order, then the full cumulative tally in key order.
pub fn format_line(clock: &str, outcomes: &[Outcome], tally: &Tally) -> String {
    let mut line = String::from(clock);
    for outcome in outcomes {
        let status = format!("-> {}", outcome.status);
        line.push(' ');
        line.push_str(&format!(
            "{:<aw$} {:<sw$}",
            outcome.ip.to_string(),
            status,
            aw = ADDRESS_WIDTH,
            sw = STATUS_WIDTH
        ));
    }
    let tokens = tally.render();
    if !tokens.is_empty() {
        line.push(' ');
        line.push_str(&tokens);
    }
    line
}
