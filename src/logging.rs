//! newest-ge logging
//!
//! One timestamped log file per run under `<data dir>/logs`, opened with a short
//! header describing the machine and the Steam installs found on it.
//! Nothing is written until [`init_logger`] has been called, so library users and
//! tests never create log files by accident.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::SteamMode;
use crate::steam::root_path;

/// Run logs kept in the log directory; older ones are deleted at startup.
pub const MAX_RUN_LOGS: usize = 10;

const LOG_PREFIX: &str = "newest-ge_";

static LOGGER: OnceLock<Mutex<GeLogger>> = OnceLock::new();

/// Context written at the top of every run log.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub app_version: String,
    pub distro: String,
    pub kernel: String,
    /// Steam clients whose root exists under the home directory
    pub steam_clients: Vec<SteamMode>,
}

impl RunHeader {
    pub fn detect(home: Option<&Path>) -> Self {
        let steam_clients = home
            .map(|home| {
                [SteamMode::Native, SteamMode::Flatpak]
                    .into_iter()
                    .filter(|mode| root_path(home, *mode).is_dir())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            distro: os_pretty_name().unwrap_or_else(|| "Unknown".to_string()),
            kernel: kernel_release().unwrap_or_else(|| "Unknown".to_string()),
            steam_clients,
        }
    }

    pub fn render(&self) -> String {
        let clients = if self.steam_clients.is_empty() {
            "none found".to_string()
        } else {
            self.steam_clients
                .iter()
                .map(|mode| mode.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let rule = "-".repeat(72);

        format!(
            "{rule}\nnewest-ge v{} run started {}\n  OS:     {}\n  Kernel: {}\n  Steam:  {}\n{rule}",
            self.app_version,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.distro,
            self.kernel,
            clients,
        )
    }
}

fn os_pretty_name() -> Option<String> {
    let content = fs::read_to_string("/etc/os-release").ok()?;
    content.lines().find_map(|line| {
        line.strip_prefix("PRETTY_NAME=")
            .map(|name| name.trim_matches('"').to_string())
    })
}

fn kernel_release() -> Option<String> {
    fs::read_to_string("/proc/sys/kernel/osrelease")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Download,
    Install,
    Warning,
    Error,
}

impl LogLevel {
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Download => "DOWNLOAD",
            LogLevel::Install => "INSTALL",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Appends lines to a single run log. Write failures are swallowed.
pub struct GeLogger {
    file: Option<File>,
    path: PathBuf,
}

impl GeLogger {
    /// Open a fresh run log in `log_dir`, dropping all but the newest earlier ones.
    pub fn new(log_dir: &Path, header: &RunHeader) -> Self {
        let _ = fs::create_dir_all(log_dir);
        prune_old_logs(log_dir, MAX_RUN_LOGS.saturating_sub(1));

        let path = log_dir.join(format!(
            "{}{}.log",
            LOG_PREFIX,
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let file = OpenOptions::new().create(true).append(true).open(&path).ok();

        let mut logger = Self { file, path };
        logger.write_line(&header.render());
        logger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let line = format!(
            "[{}] [{}] {}",
            Local::now().format("%H:%M:%S"),
            level.tag(),
            message
        );
        self.write_line(&line);
    }

    fn write_line(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut() {
            let _ = writeln!(file, "{}", line).and_then(|_| file.flush());
        }
    }
}

/// Delete run logs in `log_dir` beyond the `keep` newest. Returns how many were removed.
///
/// File names embed a sortable timestamp, so name order is age order.
pub fn prune_old_logs(log_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut logs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|ext| ext == "log")
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_PREFIX))
        })
        .collect();
    if logs.len() <= keep {
        return 0;
    }

    logs.sort();
    let excess = logs.len() - keep;
    logs.iter()
        .take(excess)
        .filter(|path| fs::remove_file(path).is_ok())
        .count()
}

/// Initialize the global logger in `<data dir>/logs` (call once at startup).
///
/// Returns the path of the log file for this run.
pub fn init_logger() -> PathBuf {
    LOGGER
        .get_or_init(|| {
            let header = RunHeader::detect(dirs::home_dir().as_deref());
            Mutex::new(GeLogger::new(&crate::data_path!("logs"), &header))
        })
        .lock()
        .path()
        .to_path_buf()
}

fn log(level: LogLevel, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.lock().log(level, message);
    }
}

pub fn log_info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn log_download(message: &str) {
    log(LogLevel::Download, message);
}

pub fn log_install(message: &str) {
    log(LogLevel::Install, message);
}

pub fn log_warning(message: &str) {
    log(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log(LogLevel::Error, message);
}
