//! Interrupting a flow from the inside.
//!
//! - [`signal`]: the [`FlowInterrupted`](signal::FlowInterrupted) signal
//! - [`cause`]: the [`Cause`](cause::Cause) capability and built-in causes
//! - [`listener`]: output sinks the causes explain themselves to

pub mod cause;
pub mod listener;
pub mod signal;
