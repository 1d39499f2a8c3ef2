//! Code related to CLI commands for the program settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::Result;
use clap::Subcommand;

/// Subcommands for managing the settings file
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show the default contents of the settings file.
    ShowDefault,
    /// Show the path to the settings file.
    ShowPath,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::ShowDefault => handle_show_default_command(),
            Self::ShowPath => handle_show_path_command(),
        }

        Ok(())
    }
}

/// Handle the `settings show-default` command
fn handle_show_default_command() {
    print!("{}", Settings::default_file_contents());
}

/// Handle the `settings show-path` command
fn handle_show_path_command() {
    println!("{}", get_settings_file_path().display());
}
