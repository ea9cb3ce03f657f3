//! Output sinks for human-readable interruption reports.

use std::io::{self, Write};

/// A sink accepting lines of human-readable text.
///
/// Writing is infallible from the caller's side: a sink that cannot deliver
/// its output deals with that itself.
pub trait TaskListener: Send {
    fn println(&mut self, line: &str);
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferListener {
    lines: Vec<String>,
}

impl BufferListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drain everything collected so far.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl TaskListener for BufferListener {
    fn println(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Writes lines to any [`Write`] implementation.
///
/// Write failures are remembered instead of returned; the first one can be
/// inspected with [`StreamListener::check_error`]. Later lines are still
/// attempted.
#[derive(Debug)]
pub struct StreamListener<W: Write + Send> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write + Send> StreamListener<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// The first write error seen, if any.
    pub fn check_error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TaskListener for StreamListener<W> {
    fn println(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }
}
