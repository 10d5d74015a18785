//! Console notifications.

use std::cell::RefCell;
use std::io::{self, Write};

use crate::services::Notifier;

/// Writes notifications to a terminal stream, one per line.
///
/// Progress lines from [`Notifier::status`] are only shown when enabled.
pub struct ConsoleNotifier<W: Write> {
    out: RefCell<W>,
    show_status: bool,
}

impl ConsoleNotifier<io::Stdout> {
    /// Creates a notifier printing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    /// Creates a notifier writing to `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            show_status: false,
        }
    }

    /// Also prints progress lines.
    #[must_use]
    pub const fn with_status(mut self, show: bool) -> Self {
        self.show_status = show;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, message: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
            tracing::debug!("Failed to write notification: {e}");
        }
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&self, message: &str) {
        tracing::info!(text = message, "notification");
        self.write_line(message);
    }

    fn status(&self, message: &str) {
        tracing::debug!(text = message, "status");
        if self.show_status {
            self.write_line(message);
        }
    }
}
