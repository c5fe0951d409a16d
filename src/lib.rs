//! gridwatch — terminal dashboard for grid carbon intensity,
//! carbon-aware task runs, and CO2 reports.
//!
//! All functionality lives in the library so integration tests can
//! exercise it directly; the binary is a thin clap dispatcher.

pub mod api;
pub mod carbon;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod reports;
pub mod series;
pub mod task;
pub mod util;
pub mod zones;
