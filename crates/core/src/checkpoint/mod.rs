//! Checkpoints of suspended runs.
//!
//! A suspended run is written to disk together with the index of the step to
//! resume from and any interruption that arrived while it was parked.

pub mod error;
pub mod store;
