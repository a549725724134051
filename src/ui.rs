//! Terminal output for the CLI
//!
//! Renders pipeline progress with indicatif and prints the colored final message.

use std::cell::RefCell;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use newest_ge::ProgressEvent;

pub fn print_ok(message: &str) {
    println!("{}", style(message).bold().blue());
}

pub fn print_info(message: &str) {
    println!("{}", style(message).magenta());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("warning:").bold().yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("error:").bold().red(), message);
}

/// Maps [`ProgressEvent`]s onto a single bar/spinner that is replaced per phase.
pub struct TerminalProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    pub fn handle(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::CompatDirCreated { path } => {
                print_info(&format!("{} was not found and has been created.", path.display()));
            }
            ProgressEvent::TargetLocated { .. } => {
                self.spinner("Looking up the latest release");
            }
            ProgressEvent::ReleaseResolved { name } => {
                self.clear();
                print_info(&format!("Latest release: {}", name));
            }
            ProgressEvent::AlreadyPresent { .. } => self.clear(),
            ProgressEvent::DownloadStarted {
                filename,
                total_bytes,
            } => self.download_bar(&filename, total_bytes),
            ProgressEvent::DownloadProgress {
                bytes_downloaded, ..
            } => {
                if let Some(bar) = self.bar.borrow().as_ref() {
                    bar.set_position(bytes_downloaded);
                }
            }
            ProgressEvent::DownloadFinished { .. } => self.clear(),
            ProgressEvent::Verified { filename } => {
                print_info(&format!("Checksum OK for {}", filename));
            }
            // Reported once in the final summary.
            ProgressEvent::Pruned { .. } => {}
            ProgressEvent::Extracting { .. } => {
                self.spinner("Unpacking into the relevant Steam folder");
            }
            ProgressEvent::CleaningUp { .. } => {
                self.spinner("Deleting the downloaded archive file");
            }
        }
    }

    pub fn clear(&self) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }

    fn spinner(&self, message: &str) {
        self.clear();
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            bar.set_style(spinner_style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.bar.borrow_mut() = Some(bar);
    }

    fn download_bar(&self, filename: &str, total_bytes: Option<u64>) {
        self.clear();
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(bar_style) = ProgressStyle::with_template(
                    "  {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec} ETA {eta}",
                ) {
                    bar.set_style(bar_style.progress_chars("#>-"));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(spinner_style) =
                    ProgressStyle::with_template("{spinner:.blue} {msg} {bytes} ({bytes_per_sec})")
                {
                    bar.set_style(spinner_style);
                }
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(format!("Downloading {}", filename));
        *self.bar.borrow_mut() = Some(bar);
    }
}
