//! CLI console utilities

use academy_core::{ApiErrorKind, Notification, Notifier};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// Marker error for failures the user has already been shown
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("already reported")
    }
}

impl std::error::Error for Reported {}

/// CLI console for formatted output
#[derive(Debug, Clone, Copy)]
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print a `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        println!("  {} {}", format!("{label}:").dimmed(), value);
    }
}

/// Renders notifications as they are published
///
/// Progress notifications drive a single spinner; anything else clears it
/// first so messages never interleave with the spinner line.
pub struct ConsoleNotifier {
    console: CliConsole,
    spinner: Mutex<Option<(String, ProgressBar)>>,
}

impl ConsoleNotifier {
    pub fn new(console: CliConsole) -> Self {
        Self {
            console,
            spinner: Mutex::new(None),
        }
    }

    fn show_progress(&self, id: String, message: String) {
        let mut slot = self.spinner.lock();
        if let Some((current, bar)) = slot.as_ref() {
            if *current == id {
                bar.set_message(message);
                return;
            }
            bar.finish_and_clear();
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        *slot = Some((id, bar));
    }

    fn clear_progress(&self, id: Option<&str>) {
        let mut slot = self.spinner.lock();
        let matches = match (slot.as_ref(), id) {
            (Some(_), None) => true,
            (Some((current, _)), Some(id)) => current == id,
            (None, _) => false,
        };
        if matches {
            if let Some((_, bar)) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Progress { id, message } => self.show_progress(id, message),
            Notification::Dismiss { id } => self.clear_progress(Some(&id)),
            Notification::Error { kind, message } => {
                self.clear_progress(None);
                self.console.error(&message);
                if kind == Some(ApiErrorKind::Unauthorized) {
                    self.console.info("Run `academy login` to sign in");
                }
            }
            Notification::Success { message } => {
                self.clear_progress(None);
                self.console.success(&message);
            }
        }
    }
}

impl fmt::Debug for ConsoleNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleNotifier")
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}
