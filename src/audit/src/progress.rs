//! Progress reporting for long running scans.

use std::io::{self, Write};

/// Receives progress of a scan.
///
/// `done` never decreases between two `progress` calls of the same scan and
/// the last update has `done == total`.
pub trait ProgressReporter {
    /// Free text status message
    fn message(&mut self, message: &str);

    /// Progress update with an optional trailing message
    fn progress(&mut self, done: usize, total: usize, message: Option<&str>);

    /// Non-fatal problem that the operator should know about
    fn notice(&mut self, message: &str);
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for &mut T {
    fn message(&mut self, message: &str) {
        (**self).message(message)
    }

    fn progress(&mut self, done: usize, total: usize, message: Option<&str>) {
        (**self).progress(done, total, message)
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message)
    }
}

const BAR_WIDTH: usize = 40;

/// Interactive progress bar, redrawn in place on a terminal.
///
/// Write errors are ignored, progress output is best effort.
pub struct ConsoleProgress<W: Write> {
    out: W,
    bar_open: bool,
}

impl ConsoleProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            bar_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn close_bar(&mut self) {
        if self.bar_open {
            let _ = writeln!(self.out);
            self.bar_open = false;
        }
    }
}

/// Render one progress line, without carriage return or newline.
pub fn render_bar(done: usize, total: usize, message: Option<&str>) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        done.min(total) as f64 / total as f64
    };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    let percent = (ratio * 100.0).floor() as usize;

    let mut line = format!(
        "[{}{}] {:>3}% ({done}/{total})",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        percent
    );
    if let Some(message) = message {
        line.push(' ');
        line.push_str(message);
    }
    line
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    fn message(&mut self, message: &str) {
        self.close_bar();
        let _ = writeln!(self.out, "{message}");
    }

    fn progress(&mut self, done: usize, total: usize, message: Option<&str>) {
        // \x1b[K clears leftovers of a longer previous line
        let _ = write!(self.out, "\r{}\x1b[K", render_bar(done, total, message));
        self.bar_open = true;
        if done >= total {
            self.close_bar();
        }
        let _ = self.out.flush();
    }

    fn notice(&mut self, message: &str) {
        self.close_bar();
        let _ = writeln!(self.out, "{message}");
    }
}

/// Reports progress as structured log events, for non-interactive runs.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn message(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn progress(&mut self, done: usize, total: usize, message: Option<&str>) {
        if done >= total {
            tracing::info!(done, total, summary = message.unwrap_or_default(), "Scan finished");
        } else {
            tracing::debug!(done, total, summary = message.unwrap_or_default(), "Scan progress");
        }
    }

    fn notice(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}
