//! The `log` module provides initialisation and configuration of the application's logging system.
//!
//! Log messages are written to the console with coloured level names and, when an output directory
//! is given, to log files in that directory: one for messages at `info` level and above and one for
//! everything down to `debug`.
//!
//! The log level can be set with the `SODRA_LOG_LEVEL` environment variable, which takes
//! precedence over the program settings.
use anyhow::{Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `SODRA_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The file name for the log file containing messages at `info` level and above
const LOG_INFO_FILE_NAME: &str = "sodra_info.log";

/// The file name for the log file containing all messages down to `debug`
const LOG_DEBUG_FILE_NAME: &str = "sodra_debug.log";

/// Used to ensure that the logger is only initialised once
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a log level from a string, ignoring case
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(filter)
}

/// Initialise the program logger using the `fern` logging library with colourised output.
///
/// The user can specify their preferred logging level via the `settings.toml` file (defaults to
/// `info` if not present) or with the `SODRA_LOG_LEVEL` environment variable. If both are
/// provided, the environment variable takes precedence.
///
/// Possible log level options are:
///
/// * `error`
/// * `warn`
/// * `info`
/// * `debug`
/// * `trace`
/// * `off`
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `settings.toml`
/// * `log_file_path`: The folder to write log files to, if any
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    // Retrieve the log level from the environment variable or settings, or use the default
    let log_level = env::var("SODRA_LOG_LEVEL").unwrap_or_else(|_| {
        if log_level_from_settings.is_empty() {
            DEFAULT_LOG_LEVEL.to_string()
        } else {
            log_level_from_settings.to_string()
        }
    });
    let log_level = parse_log_level(&log_level)?;

    // Set up colours for log levels
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    // Automatically apply colours only if the output is a terminal
    let use_colour_stdout = std::io::stdout().is_terminal();
    let use_colour_stderr = std::io::stderr().is_terminal();

    // Configure the logger: info and below go to stdout, warnings and errors to stderr
    let mut dispatch = Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stdout, &colours);
                })
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stderr, &colours);
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    // Write log messages to file, regardless of the console log level
    if let Some(log_file_path) = log_file_path {
        let info_log_file = fern::log_file(log_file_path.join(LOG_INFO_FILE_NAME))?;
        let debug_log_file = fern::log_file(log_file_path.join(LOG_DEBUG_FILE_NAME))?;
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .level(LevelFilter::Info)
                    .format(write_log_plain)
                    .chain(info_log_file),
            )
            .chain(
                Dispatch::new()
                    .level(LevelFilter::Debug)
                    .format(write_log_plain)
                    .chain(debug_log_file),
            );
    }

    // Apply the logger configuration. Fails if a logger has already been set.
    dispatch.apply()?;

    // Mark the logger as initialised
    let _ = LOGGER_INIT.set(());

    Ok(())
}

/// Write to the log in the format we want
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

/// Write to the log with no colours
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

/// Write to the log with optional colours
fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    // Format output with or without colour based on `use_colour`
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("error", LevelFilter::Error)]
    #[case("WARN", LevelFilter::Warn)]
    #[case("Info", LevelFilter::Info)]
    #[case("debug", LevelFilter::Debug)]
    #[case("trace", LevelFilter::Trace)]
    fn parse_log_level_valid(#[case] level: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(level).unwrap(), expected);
    }

    #[test]
    fn parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
    }
}
