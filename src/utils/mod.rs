//! Helpers shared by the simulated host.

pub mod exec;
