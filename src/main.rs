//! newest-ge - installs the newest GE-Proton release for Steam
//!
//! Exits 0 when the newest release is installed (now or already), 1 on failure.

use std::process::ExitCode;

use clap::Parser;
use newest_ge::logging::{init_logger, log_info};
use newest_ge::{update_ge_proton, InstallConfig, SteamMode, UpdateOutcome};

mod ui;

use ui::TerminalProgress;

/// Install the newest GE-Proton into Steam's compatibilitytools.d
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Install for the Flatpak Steam client (com.valvesoftware.Steam)
    #[arg(long)]
    flatpak: bool,

    /// Delete previously installed GE-Proton versions
    #[arg(long)]
    remove_old: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = init_logger();
    log_info(&format!("newest-ge starting up, logging to {}", log_path.display()));

    let mode = SteamMode::from_flatpak_flag(cli.flatpak);
    let result = InstallConfig::from_env(mode, cli.remove_old).and_then(|config| {
        let progress = TerminalProgress::new();
        let outcome = update_ge_proton(&config, &|event| progress.handle(event));
        progress.clear();
        outcome
    });

    match result {
        Ok(UpdateOutcome::AlreadyPresent {
            release,
            compat_tools_path,
        }) => {
            ui::print_info(&format!(
                "{} appears the newest and is already in {}, exiting.",
                release,
                compat_tools_path.display()
            ));
            ExitCode::SUCCESS
        }
        Ok(UpdateOutcome::Installed {
            release,
            pruned,
            warnings,
            ..
        }) => {
            if !pruned.is_empty() {
                ui::print_info(&format!("Removed previous versions: {}", pruned.join(", ")));
            }
            for warning in &warnings {
                ui::print_warning(&warning.to_string());
            }
            ui::print_ok(&format!("{} was installed, please (re)start Steam.", release));
            ExitCode::SUCCESS
        }
        Err(e) => {
            ui::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
