//! Library crate for lb-probe-rs exposing reusable modules.
pub mod monitor;
pub mod prober;
pub mod report;
pub mod resolver;
pub mod tally;
pub mod types;
