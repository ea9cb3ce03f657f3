//! The cause abstraction carried by interruption signals.
//!
//! A [`Cause`] explains one reason a run was interrupted. Some causes can be
//! persisted and some cannot; persistability is a capability a cause opts
//! into through [`Cause::persisted_form`], and it is always checked, never
//! assumed.

use crate::interrupt::listener::TaskListener;
use sk_protocol::cause_models::CauseOfInterruption;
use std::fmt;
use std::sync::Arc;

/// One reason for an interruption.
pub trait Cause: fmt::Debug + Send + Sync {
    /// One-line, human-readable explanation.
    fn short_description(&self) -> String;

    /// Write this cause's explanation to an output sink.
    fn print(&self, listener: &mut dyn TaskListener) {
        listener.println(&self.short_description());
    }

    /// The durable form of this cause, if it has one.
    ///
    /// Causes returning `None` are kept in memory only and are dropped when
    /// the signal carrying them crosses a persistence boundary.
    fn persisted_form(&self) -> Option<CauseOfInterruption> {
        None
    }

    /// Concrete type name, used when reporting on a cause.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Cause for CauseOfInterruption {
    fn short_description(&self) -> String {
        CauseOfInterruption::short_description(self)
    }

    fn persisted_form(&self) -> Option<CauseOfInterruption> {
        Some(self.clone())
    }
}

/// A cause wrapping a live error, such as the failure of something the
/// interrupted step depended on.
///
/// The error object cannot be written to a checkpoint, so this cause only
/// survives as long as the signal stays in memory.
#[derive(Debug, Clone)]
pub struct ErrorCause {
    error: Arc<anyhow::Error>,
}

impl ErrorCause {
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            error: Arc::new(error),
        }
    }
}

impl Cause for ErrorCause {
    fn short_description(&self) -> String {
        format!("Interrupted by error: {:#}", self.error)
    }

    fn print(&self, listener: &mut dyn TaskListener) {
        listener.println(&self.short_description());
        for source in self.error.chain().skip(1) {
            listener.println(&format!("  caused by: {source}"));
        }
    }
}
