//! Process configuration, from flags or environment.

use clap::Parser;
use std::net::SocketAddr;

use crate::solver::MAX_COMBINATIONS;

/// HTTP service generating conflict-free timetable combinations.
#[derive(Debug, Clone, Parser)]
#[command(name = "timetable_solver", version, about, long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "TIMETABLE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "TIMETABLE_LOG", default_value = "info")]
    pub log_level: String,

    /// Ceiling for the per-request exploration cap.
    #[arg(long, env = "TIMETABLE_MAX_COMBINATIONS", default_value_t = MAX_COMBINATIONS)]
    pub max_combinations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            max_combinations: MAX_COMBINATIONS,
        }
    }
}
